//! Review row model.

use rankbag_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `reviews` table.
#[derive(Debug, Clone, FromRow)]
pub struct ReviewRow {
    pub id: DbId,
    pub business_id: String,
    pub business_name: Option<String>,
    pub rating: i16,
    pub service: Option<String>,
    pub staff: Option<String>,
    pub qualities: Vec<String>,
    pub feelings: Vec<String>,
    pub additional: Option<String>,
    pub source: String,
    pub route: String,
    pub coupon_code: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
