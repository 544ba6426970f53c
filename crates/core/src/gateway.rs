//! Persistence gateway: the remote record store for reviews, coupons,
//! businesses and FSR accounts.
//!
//! Flows talk to the store only through [`PersistenceGateway`]. The
//! Postgres implementation lives in `rankbag-db`; [`MemoryGateway`] keeps
//! everything in process for local runs without a database and for tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::coupon::Coupon;
use crate::feedback::{
    FeedbackSubmission, MembershipDetails, PrivateFeedback, ReviewRoute, ReviewUpdate,
};
use crate::fsr::{Business, FsrAccount, NewBusiness, Onboarding, POINTS_PER_ONBOARDING};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The store could not be reached or failed the operation.
    #[error("Persistence gateway unavailable: {0}")]
    Unavailable(String),

    /// The write collides with an existing record.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Store an issued coupon. Re-sending an identical record succeeds, so
    /// callers may retry freely; a different record under the same code is
    /// a conflict.
    async fn create_coupon(&self, coupon: &Coupon) -> Result<(), GatewayError>;

    async fn find_coupon(&self, code: &str) -> Result<Option<Coupon>, GatewayError>;

    /// Store a rating step and return its record id.
    async fn create_review(&self, submission: &FeedbackSubmission) -> Result<DbId, GatewayError>;

    /// Patch a stored review. `None` fields are left untouched.
    async fn update_review(&self, id: DbId, fields: &ReviewUpdate) -> Result<(), GatewayError>;

    async fn create_private_feedback(
        &self,
        feedback: &PrivateFeedback,
    ) -> Result<DbId, GatewayError>;

    async fn find_business(&self, slug: &str) -> Result<Option<Business>, GatewayError>;

    async fn find_fsr(&self, id: DbId) -> Result<Option<FsrAccount>, GatewayError>;

    /// Create a business under `slug` and credit the FSR in one step.
    async fn onboard_business(
        &self,
        fsr_id: DbId,
        slug: &str,
        business: &NewBusiness,
    ) -> Result<Onboarding, GatewayError>;

    async fn health_check(&self) -> bool;
}

// ---------------------------------------------------------------------------
// In-memory gateway
// ---------------------------------------------------------------------------

/// A stored rating step as kept by [`MemoryGateway`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoredReview {
    pub submission: FeedbackSubmission,
    pub route: ReviewRoute,
    pub coupon_code: Option<String>,
    pub customer: Option<MembershipDetails>,
}

#[derive(Debug, Default)]
struct Tables {
    next_id: DbId,
    coupons: HashMap<String, Coupon>,
    reviews: BTreeMap<DbId, StoredReview>,
    private_feedback: BTreeMap<DbId, PrivateFeedback>,
    businesses: BTreeMap<DbId, Business>,
    fsrs: BTreeMap<DbId, FsrAccount>,
}

impl Tables {
    fn allocate_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }
}

/// Gateway holding every table in process memory.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    tables: RwLock<Tables>,
    failing_writes: AtomicUsize,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` write operations fail with
    /// [`GatewayError::Unavailable`].
    pub fn fail_next_writes(&self, n: usize) {
        self.failing_writes.store(n, Ordering::SeqCst);
    }

    /// Injected failures not yet consumed.
    pub fn pending_write_failures(&self) -> usize {
        self.failing_writes.load(Ordering::SeqCst)
    }

    fn take_injected_failure(&self) -> Result<(), GatewayError> {
        let failed = self
            .failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            Err(GatewayError::Unavailable("injected write failure".into()))
        } else {
            Ok(())
        }
    }

    /// Seed an FSR account.
    pub async fn add_fsr(&self, name: &str, email: &str) -> FsrAccount {
        let mut tables = self.tables.write().await;
        let id = tables.allocate_id();
        let account = FsrAccount {
            id,
            name: name.to_string(),
            email: email.to_string(),
            points: 0,
        };
        tables.fsrs.insert(id, account.clone());
        account
    }

    /// Seed a business not tied to any FSR.
    pub async fn add_business(
        &self,
        slug: &str,
        name: &str,
        google_place_id: Option<&str>,
    ) -> Business {
        let mut tables = self.tables.write().await;
        let id = tables.allocate_id();
        let business = Business {
            id,
            slug: slug.to_string(),
            name: name.to_string(),
            google_place_id: google_place_id.map(str::to_string),
            owner_name: name.to_string(),
            owner_phone: None,
            onboarded_by: None,
            created_at: Utc::now(),
        };
        tables.businesses.insert(id, business.clone());
        business
    }

    pub async fn coupons(&self) -> Vec<Coupon> {
        self.tables.read().await.coupons.values().cloned().collect()
    }

    pub async fn review(&self, id: DbId) -> Option<StoredReview> {
        self.tables.read().await.reviews.get(&id).cloned()
    }

    pub async fn private_feedback(&self) -> Vec<PrivateFeedback> {
        self.tables
            .read()
            .await
            .private_feedback
            .values()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn create_coupon(&self, coupon: &Coupon) -> Result<(), GatewayError> {
        self.take_injected_failure()?;
        let mut tables = self.tables.write().await;
        match tables.coupons.get(&coupon.code) {
            Some(existing) if existing == coupon => Ok(()),
            Some(_) => Err(GatewayError::Conflict(format!(
                "Coupon code {} is already taken",
                coupon.code
            ))),
            None => {
                tables.coupons.insert(coupon.code.clone(), coupon.clone());
                Ok(())
            }
        }
    }

    async fn find_coupon(&self, code: &str) -> Result<Option<Coupon>, GatewayError> {
        Ok(self.tables.read().await.coupons.get(code).cloned())
    }

    async fn create_review(&self, submission: &FeedbackSubmission) -> Result<DbId, GatewayError> {
        self.take_injected_failure()?;
        let mut tables = self.tables.write().await;
        let id = tables.allocate_id();
        tables.reviews.insert(
            id,
            StoredReview {
                submission: submission.clone(),
                route: submission.route(),
                coupon_code: None,
                customer: submission.customer.clone(),
            },
        );
        Ok(id)
    }

    async fn update_review(&self, id: DbId, fields: &ReviewUpdate) -> Result<(), GatewayError> {
        self.take_injected_failure()?;
        let mut tables = self.tables.write().await;
        let review = tables
            .reviews
            .get_mut(&id)
            .ok_or_else(|| GatewayError::NotFound {
                entity: "Review",
                key: id.to_string(),
            })?;
        if let Some(code) = &fields.coupon_code {
            review.coupon_code = Some(code.clone());
        }
        if let Some(customer) = &fields.customer {
            review.customer = Some(customer.clone());
        }
        Ok(())
    }

    async fn create_private_feedback(
        &self,
        feedback: &PrivateFeedback,
    ) -> Result<DbId, GatewayError> {
        self.take_injected_failure()?;
        let mut tables = self.tables.write().await;
        let id = tables.allocate_id();
        tables.private_feedback.insert(id, feedback.clone());
        Ok(id)
    }

    async fn find_business(&self, slug: &str) -> Result<Option<Business>, GatewayError> {
        let tables = self.tables.read().await;
        Ok(tables.businesses.values().find(|b| b.slug == slug).cloned())
    }

    async fn find_fsr(&self, id: DbId) -> Result<Option<FsrAccount>, GatewayError> {
        Ok(self.tables.read().await.fsrs.get(&id).cloned())
    }

    async fn onboard_business(
        &self,
        fsr_id: DbId,
        slug: &str,
        business: &NewBusiness,
    ) -> Result<Onboarding, GatewayError> {
        self.take_injected_failure()?;
        let mut tables = self.tables.write().await;

        if !tables.fsrs.contains_key(&fsr_id) {
            return Err(GatewayError::NotFound {
                entity: "FsrAccount",
                key: fsr_id.to_string(),
            });
        }
        if tables.businesses.values().any(|b| b.slug == slug) {
            return Err(GatewayError::Conflict(format!(
                "Business slug '{slug}' is already registered"
            )));
        }

        let id = tables.allocate_id();
        let record = Business {
            id,
            slug: slug.to_string(),
            name: business.name.trim().to_string(),
            google_place_id: business.google_place_id.clone(),
            owner_name: business.owner_name.trim().to_string(),
            owner_phone: business.owner_phone.clone(),
            onboarded_by: Some(fsr_id),
            created_at: Utc::now(),
        };
        tables.businesses.insert(id, record.clone());

        let account = tables
            .fsrs
            .get_mut(&fsr_id)
            .ok_or_else(|| GatewayError::NotFound {
                entity: "FsrAccount",
                key: fsr_id.to_string(),
            })?;
        account.points += POINTS_PER_ONBOARDING;

        Ok(Onboarding {
            business: record,
            points_awarded: POINTS_PER_ONBOARDING,
            total_points: account.points,
        })
    }

    async fn health_check(&self) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
