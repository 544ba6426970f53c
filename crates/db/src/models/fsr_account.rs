//! FSR account row model.

use rankbag_core::fsr::FsrAccount;
use rankbag_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `fsr_accounts` table.
#[derive(Debug, Clone, FromRow)]
pub struct FsrAccountRow {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub points: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<FsrAccountRow> for FsrAccount {
    fn from(row: FsrAccountRow) -> Self {
        FsrAccount {
            id: row.id,
            name: row.name,
            email: row.email,
            points: row.points,
        }
    }
}
