//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod business_repo;
pub mod coupon_repo;
pub mod fsr_account_repo;
pub mod private_feedback_repo;
pub mod review_repo;

pub use business_repo::BusinessRepo;
pub use coupon_repo::CouponRepo;
pub use fsr_account_repo::FsrAccountRepo;
pub use private_feedback_repo::PrivateFeedbackRepo;
pub use review_repo::ReviewRepo;
