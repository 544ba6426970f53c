pub mod business;
pub mod coupons;
pub mod fsr;
pub mod private_feedback;
pub mod redemption;
pub mod reviews;
