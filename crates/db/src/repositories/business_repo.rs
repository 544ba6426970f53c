//! Repository for the `businesses` table.

use rankbag_core::fsr::NewBusiness;
use rankbag_core::types::DbId;
use sqlx::PgPool;

use crate::models::business::BusinessRow;
use crate::models::fsr_account::FsrAccountRow;
use crate::repositories::fsr_account_repo;

/// Column list for `businesses` queries.
const COLUMNS: &str = "\
    id, slug, name, google_place_id, owner_name, owner_phone, \
    onboarded_by, created_at, updated_at";

/// Provides CRUD operations for businesses.
pub struct BusinessRepo;

impl BusinessRepo {
    /// Find a business by its slug.
    pub async fn find_by_slug(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<BusinessRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM businesses WHERE slug = $1");
        sqlx::query_as::<_, BusinessRow>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Create a business on behalf of an FSR and credit their points.
    ///
    /// Runs in a transaction: lock the FSR row, insert the business, then
    /// add `points` to the balance. Returns `None` if the FSR does not
    /// exist. A duplicate slug surfaces as the `uq_businesses_slug`
    /// unique violation.
    pub async fn onboard(
        pool: &PgPool,
        fsr_id: DbId,
        slug: &str,
        input: &NewBusiness,
        points: i64,
    ) -> Result<Option<(BusinessRow, FsrAccountRow)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM fsr_accounts WHERE id = $1 FOR UPDATE")
                .bind(fsr_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Ok(None);
        }

        let insert = format!(
            "INSERT INTO businesses \
                (slug, name, google_place_id, owner_name, owner_phone, onboarded_by) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        let business = sqlx::query_as::<_, BusinessRow>(&insert)
            .bind(slug)
            .bind(input.name.trim())
            .bind(&input.google_place_id)
            .bind(input.owner_name.trim())
            .bind(&input.owner_phone)
            .bind(fsr_id)
            .fetch_one(&mut *tx)
            .await?;

        let credit = format!(
            "UPDATE fsr_accounts SET points = points + $1, updated_at = NOW() \
             WHERE id = $2 \
             RETURNING {}",
            fsr_account_repo::COLUMNS
        );
        let account = sqlx::query_as::<_, FsrAccountRow>(&credit)
            .bind(points)
            .bind(fsr_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some((business, account)))
    }
}
