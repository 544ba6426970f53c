//! Repository for the `coupons` table.

use rankbag_core::coupon::Coupon;
use sqlx::PgPool;

use crate::models::coupon::CouponRow;

/// Column list for `coupons` queries.
const COLUMNS: &str = "\
    id, code, business_id, business_name, offer_title, description, terms, \
    source, issued_at, expiry_date, created_at";

/// Provides create and lookup operations for coupons.
pub struct CouponRepo;

impl CouponRepo {
    /// Insert a coupon. Returns `None` when the code already exists.
    pub async fn create(
        pool: &PgPool,
        coupon: &Coupon,
    ) -> Result<Option<CouponRow>, sqlx::Error> {
        let query = format!(
            "INSERT INTO coupons \
                (code, business_id, business_name, offer_title, description, terms, \
                 source, issued_at, expiry_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (code) DO NOTHING \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CouponRow>(&query)
            .bind(&coupon.code)
            .bind(&coupon.business_id)
            .bind(&coupon.business_name)
            .bind(&coupon.offer_title)
            .bind(&coupon.description)
            .bind(&coupon.terms)
            .bind(coupon.source.as_str())
            .bind(coupon.issued_at)
            .bind(coupon.expiry_date)
            .fetch_optional(pool)
            .await
    }

    /// Find a coupon by its code.
    pub async fn find_by_code(
        pool: &PgPool,
        code: &str,
    ) -> Result<Option<CouponRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM coupons WHERE code = $1");
        sqlx::query_as::<_, CouponRow>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }
}
