//! [`PersistenceGateway`] backed by PostgreSQL.

use async_trait::async_trait;
use rankbag_core::coupon::Coupon;
use rankbag_core::feedback::{FeedbackSubmission, PrivateFeedback, ReviewUpdate};
use rankbag_core::fsr::{Business, FsrAccount, NewBusiness, Onboarding, POINTS_PER_ONBOARDING};
use rankbag_core::gateway::{GatewayError, PersistenceGateway};
use rankbag_core::types::DbId;

use crate::repositories::{
    BusinessRepo, CouponRepo, FsrAccountRepo, PrivateFeedbackRepo, ReviewRepo,
};
use crate::DbPool;

/// Gateway over a Postgres connection pool.
#[derive(Debug, Clone)]
pub struct PgGateway {
    pool: DbPool,
}

impl PgGateway {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map a sqlx error onto the gateway's vocabulary.
///
/// Unique violations on a `uq_` constraint become conflicts; everything
/// else is treated as the store being unavailable.
fn gateway_error(err: sqlx::Error) -> GatewayError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            let constraint = db_err.constraint().unwrap_or("unknown");
            if constraint.starts_with("uq_") {
                return GatewayError::Conflict(format!(
                    "Duplicate value violates unique constraint: {constraint}"
                ));
            }
        }
    }
    tracing::warn!(error = %err, "Database operation failed");
    GatewayError::Unavailable(err.to_string())
}

#[async_trait]
impl PersistenceGateway for PgGateway {
    async fn create_coupon(&self, coupon: &Coupon) -> Result<(), GatewayError> {
        if CouponRepo::create(&self.pool, coupon)
            .await
            .map_err(gateway_error)?
            .is_some()
        {
            return Ok(());
        }

        // The code already exists. Only a retry of the same issuance is fine;
        // issuance truncates timestamps to microseconds so they compare equal.
        let existing = CouponRepo::find_by_code(&self.pool, &coupon.code)
            .await
            .map_err(gateway_error)?
            .map(Coupon::from);
        match existing {
            Some(stored) if stored == *coupon => {
                tracing::debug!(code = %coupon.code, "Coupon already stored");
                Ok(())
            }
            _ => Err(GatewayError::Conflict(format!(
                "Coupon code {} is already taken",
                coupon.code
            ))),
        }
    }

    async fn find_coupon(&self, code: &str) -> Result<Option<Coupon>, GatewayError> {
        let row = CouponRepo::find_by_code(&self.pool, code)
            .await
            .map_err(gateway_error)?;
        Ok(row.map(Coupon::from))
    }

    async fn create_review(&self, submission: &FeedbackSubmission) -> Result<DbId, GatewayError> {
        let row = ReviewRepo::create(&self.pool, submission)
            .await
            .map_err(gateway_error)?;
        Ok(row.id)
    }

    async fn update_review(&self, id: DbId, fields: &ReviewUpdate) -> Result<(), GatewayError> {
        ReviewRepo::update(&self.pool, id, fields)
            .await
            .map_err(gateway_error)?
            .map(|_| ())
            .ok_or_else(|| GatewayError::NotFound {
                entity: "Review",
                key: id.to_string(),
            })
    }

    async fn create_private_feedback(
        &self,
        feedback: &PrivateFeedback,
    ) -> Result<DbId, GatewayError> {
        let row = PrivateFeedbackRepo::create(&self.pool, feedback)
            .await
            .map_err(gateway_error)?;
        Ok(row.id)
    }

    async fn find_business(&self, slug: &str) -> Result<Option<Business>, GatewayError> {
        let row = BusinessRepo::find_by_slug(&self.pool, slug)
            .await
            .map_err(gateway_error)?;
        Ok(row.map(Business::from))
    }

    async fn find_fsr(&self, id: DbId) -> Result<Option<FsrAccount>, GatewayError> {
        let row = FsrAccountRepo::find_by_id(&self.pool, id)
            .await
            .map_err(gateway_error)?;
        Ok(row.map(FsrAccount::from))
    }

    async fn onboard_business(
        &self,
        fsr_id: DbId,
        slug: &str,
        business: &NewBusiness,
    ) -> Result<Onboarding, GatewayError> {
        let (business_row, account_row) =
            BusinessRepo::onboard(&self.pool, fsr_id, slug, business, POINTS_PER_ONBOARDING)
                .await
                .map_err(gateway_error)?
                .ok_or_else(|| GatewayError::NotFound {
                    entity: "FsrAccount",
                    key: fsr_id.to_string(),
                })?;

        tracing::info!(
            fsr_id,
            business_id = business_row.id,
            slug = %business_row.slug,
            total_points = account_row.points,
            "Business onboarded",
        );

        Ok(Onboarding {
            business: business_row.into(),
            points_awarded: POINTS_PER_ONBOARDING,
            total_points: account_row.points,
        })
    }

    async fn health_check(&self) -> bool {
        crate::health_check(&self.pool).await.is_ok()
    }
}
