//! Repository for the `fsr_accounts` table.

use rankbag_core::types::DbId;
use sqlx::PgPool;

use crate::models::fsr_account::FsrAccountRow;

/// Column list for `fsr_accounts` queries.
pub(crate) const COLUMNS: &str = "id, name, email, points, created_at, updated_at";

/// Provides CRUD operations for FSR accounts.
pub struct FsrAccountRepo;

impl FsrAccountRepo {
    /// Create an FSR account with a zero balance.
    pub async fn create(
        pool: &PgPool,
        name: &str,
        email: &str,
    ) -> Result<FsrAccountRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO fsr_accounts (name, email) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FsrAccountRow>(&query)
            .bind(name)
            .bind(email)
            .fetch_one(pool)
            .await
    }

    /// Find an FSR account by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<FsrAccountRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM fsr_accounts WHERE id = $1");
        sqlx::query_as::<_, FsrAccountRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
