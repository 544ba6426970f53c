//! Private feedback row model.

use rankbag_core::feedback::{MembershipDetails, PrivateFeedback};
use rankbag_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `private_feedback` table.
#[derive(Debug, Clone, FromRow)]
pub struct PrivateFeedbackRow {
    pub id: DbId,
    pub business_id: String,
    pub business_name: Option<String>,
    pub rating: i16,
    pub message: String,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub created_at: Timestamp,
}

impl From<PrivateFeedbackRow> for PrivateFeedback {
    fn from(row: PrivateFeedbackRow) -> Self {
        let contact = row.contact_name.map(|name| MembershipDetails {
            name,
            phone: row.contact_phone,
            email: row.contact_email,
        });
        PrivateFeedback {
            business_id: row.business_id,
            business_name: row.business_name,
            rating: u8::try_from(row.rating).unwrap_or_default(),
            message: row.message,
            contact,
        }
    }
}
