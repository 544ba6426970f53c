//! RankBag domain core.
//!
//! Pure domain logic for the review-to-coupon funnel: offer selection,
//! coupon codes, the issuance and redemption flows, the session relay
//! contract, and the persistence gateway trait that the database and API
//! crates plug into.

pub mod coupon;
pub mod error;
pub mod feedback;
pub mod fsr;
pub mod gateway;
pub mod issuance;
pub mod offer;
pub mod redemption;
pub mod session;
pub mod types;
