//! Repository for the `private_feedback` table.

use rankbag_core::feedback::PrivateFeedback;
use sqlx::PgPool;

use crate::models::private_feedback::PrivateFeedbackRow;

/// Column list for `private_feedback` queries.
const COLUMNS: &str = "\
    id, business_id, business_name, rating, message, \
    contact_name, contact_phone, contact_email, created_at";

/// Stores private feedback messages.
pub struct PrivateFeedbackRepo;

impl PrivateFeedbackRepo {
    /// Store a private feedback message, returning the full row.
    pub async fn create(
        pool: &PgPool,
        feedback: &PrivateFeedback,
    ) -> Result<PrivateFeedbackRow, sqlx::Error> {
        let contact = feedback.contact.as_ref();
        let query = format!(
            "INSERT INTO private_feedback \
                (business_id, business_name, rating, message, \
                 contact_name, contact_phone, contact_email) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PrivateFeedbackRow>(&query)
            .bind(&feedback.business_id)
            .bind(&feedback.business_name)
            .bind(i16::from(feedback.rating))
            .bind(&feedback.message)
            .bind(contact.map(|c| c.name.as_str()))
            .bind(contact.and_then(|c| c.phone.as_deref()))
            .bind(contact.and_then(|c| c.email.as_deref()))
            .fetch_one(pool)
            .await
    }
}
