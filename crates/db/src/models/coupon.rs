//! Coupon row model.

use rankbag_core::coupon::Coupon;
use rankbag_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use super::parse_source;

/// A row from the `coupons` table.
#[derive(Debug, Clone, FromRow)]
pub struct CouponRow {
    pub id: DbId,
    pub code: String,
    pub business_id: String,
    pub business_name: String,
    pub offer_title: String,
    pub description: String,
    pub terms: String,
    pub source: String,
    pub issued_at: Timestamp,
    pub expiry_date: Timestamp,
    pub created_at: Timestamp,
}

impl From<CouponRow> for Coupon {
    fn from(row: CouponRow) -> Self {
        Coupon {
            code: row.code,
            business_id: row.business_id,
            business_name: row.business_name,
            offer_title: row.offer_title,
            description: row.description,
            terms: row.terms,
            source: parse_source(&row.source),
            issued_at: row.issued_at,
            expiry_date: row.expiry_date,
        }
    }
}
