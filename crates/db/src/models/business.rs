//! Business row model.

use rankbag_core::fsr::Business;
use rankbag_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `businesses` table.
#[derive(Debug, Clone, FromRow)]
pub struct BusinessRow {
    pub id: DbId,
    pub slug: String,
    pub name: String,
    pub google_place_id: Option<String>,
    pub owner_name: String,
    pub owner_phone: Option<String>,
    pub onboarded_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<BusinessRow> for Business {
    fn from(row: BusinessRow) -> Self {
        Business {
            id: row.id,
            slug: row.slug,
            name: row.name,
            google_place_id: row.google_place_id,
            owner_name: row.owner_name,
            owner_phone: row.owner_phone,
            onboarded_by: row.onboarded_by,
            created_at: row.created_at,
        }
    }
}
