//! Repository for the `reviews` table.

use rankbag_core::feedback::{FeedbackSubmission, ReviewUpdate};
use rankbag_core::types::DbId;
use sqlx::PgPool;

use crate::models::review::ReviewRow;

/// Column list for `reviews` queries.
const COLUMNS: &str = "\
    id, business_id, business_name, rating, service, staff, qualities, feelings, \
    additional, source, route, coupon_code, customer_name, customer_phone, \
    customer_email, created_at, updated_at";

/// Provides CRUD operations for reviews.
pub struct ReviewRepo;

impl ReviewRepo {
    /// Store a rating step, returning the full row.
    pub async fn create(
        pool: &PgPool,
        submission: &FeedbackSubmission,
    ) -> Result<ReviewRow, sqlx::Error> {
        let customer = submission.customer.as_ref();
        let query = format!(
            "INSERT INTO reviews \
                (business_id, business_name, rating, service, staff, qualities, feelings, \
                 additional, source, route, customer_name, customer_phone, customer_email) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ReviewRow>(&query)
            .bind(&submission.business_id)
            .bind(&submission.business_name)
            .bind(i16::from(submission.rating))
            .bind(&submission.service)
            .bind(&submission.staff)
            .bind(&submission.qualities)
            .bind(&submission.feelings)
            .bind(&submission.additional)
            .bind(submission.source.as_str())
            .bind(submission.route().as_str())
            .bind(customer.map(|c| c.name.as_str()))
            .bind(customer.and_then(|c| c.phone.as_deref()))
            .bind(customer.and_then(|c| c.email.as_deref()))
            .fetch_one(pool)
            .await
    }

    /// Find a review by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ReviewRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reviews WHERE id = $1");
        sqlx::query_as::<_, ReviewRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Patch a review. `None` fields keep their stored value.
    /// Returns the updated row, or `None` if not found.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        fields: &ReviewUpdate,
    ) -> Result<Option<ReviewRow>, sqlx::Error> {
        let customer = fields.customer.as_ref();
        let query = format!(
            "UPDATE reviews SET \
                coupon_code = COALESCE($1, coupon_code), \
                customer_name = COALESCE($2, customer_name), \
                customer_phone = COALESCE($3, customer_phone), \
                customer_email = COALESCE($4, customer_email), \
                updated_at = NOW() \
             WHERE id = $5 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ReviewRow>(&query)
            .bind(&fields.coupon_code)
            .bind(customer.map(|c| c.name.as_str()))
            .bind(customer.and_then(|c| c.phone.as_deref()))
            .bind(customer.and_then(|c| c.email.as_deref()))
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
