//! Database row structs.
//!
//! Each submodule contains a `FromRow` struct matching its table and the
//! conversion into the matching `rankbag_core` domain type.

pub mod business;
pub mod coupon;
pub mod fsr_account;
pub mod private_feedback;
pub mod review;

use rankbag_core::feedback::FeedbackSource;

/// Parse a stored `source` column. Unknown values read as `review`.
pub(crate) fn parse_source(source: &str) -> FeedbackSource {
    match source {
        "instagram" => FeedbackSource::Instagram,
        _ => FeedbackSource::Review,
    }
}
