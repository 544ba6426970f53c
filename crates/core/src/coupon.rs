//! Coupon codes, coupon records, and the URLs printed on a coupon.
//!
//! Codes look like `PIZ-7K2QD`: up to three uppercase letters or digits
//! taken from the business name, a dash, and five random base-36
//! characters. Codes are lookup keys for display and redemption, not
//! security tokens, so the thread-local (non-cryptographic) RNG is used.

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::feedback::{FeedbackSource, FeedbackSubmission};
use crate::offer::Offer;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum characters taken from the business name.
pub const CODE_PREFIX_LENGTH: usize = 3;
/// Random characters after the dash.
pub const CODE_SUFFIX_LENGTH: usize = 5;
/// Prefix used when the business name yields no usable characters.
pub const FALLBACK_CODE_PREFIX: &str = "BIZ";
/// Separator between prefix and suffix.
pub const CODE_SEPARATOR: char = '-';

/// Shape of every generated code.
pub const CODE_PATTERN: &str = r"^[A-Z0-9]{1,3}-[A-Z0-9]{5}$";

const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(CODE_PATTERN).expect("valid regex"));

/// Default edge length in pixels of the rendered QR image.
pub const QR_IMAGE_SIZE: u32 = 240;

// ---------------------------------------------------------------------------
// Code generation
// ---------------------------------------------------------------------------

/// Prefix for a business: its first three ASCII letters or digits,
/// uppercased. Shorter names give shorter prefixes; a name with no usable
/// characters (or no name) gives [`FALLBACK_CODE_PREFIX`].
pub fn code_prefix(business_name: Option<&str>) -> String {
    let prefix: String = business_name
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(CODE_PREFIX_LENGTH)
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if prefix.is_empty() {
        FALLBACK_CODE_PREFIX.to_string()
    } else {
        prefix
    }
}

/// Generate a fresh coupon code for a business.
pub fn generate_code(business_name: Option<&str>) -> String {
    generate_code_with(business_name, &mut rand::rng())
}

/// Generate a coupon code drawing the suffix from `rng`.
pub fn generate_code_with<R: Rng + ?Sized>(business_name: Option<&str>, rng: &mut R) -> String {
    let suffix: String = (0..CODE_SUFFIX_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..SUFFIX_ALPHABET.len());
            char::from(SUFFIX_ALPHABET[idx]).to_ascii_uppercase()
        })
        .collect();

    format!("{}{CODE_SEPARATOR}{suffix}", code_prefix(business_name))
}

/// Whether a code has the shape produced by [`generate_code`].
pub fn is_well_formed_code(code: &str) -> bool {
    CODE_RE.is_match(code)
}

/// The first dash-delimited segment of a code.
pub fn prefix_of(code: &str) -> &str {
    code.split(CODE_SEPARATOR).next().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Expiry
// ---------------------------------------------------------------------------

/// Expiry instant for a coupon issued at `issued_at`.
///
/// Timestamps are UTC, so a day is always 24 hours and local DST
/// transitions never shift the count.
pub fn compute_expiry(issued_at: Timestamp, validity_days: u32) -> Timestamp {
    issued_at + chrono::Duration::days(i64::from(validity_days))
}

// ---------------------------------------------------------------------------
// Coupon record
// ---------------------------------------------------------------------------

/// An issued coupon, as persisted through the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub code: String,
    pub business_id: String,
    pub business_name: String,
    pub offer_title: String,
    pub description: String,
    pub terms: String,
    pub source: FeedbackSource,
    pub issued_at: Timestamp,
    pub expiry_date: Timestamp,
}

impl Coupon {
    /// Build the coupon for a submission. Pure: the same inputs always
    /// give the same coupon.
    pub fn issue(
        submission: &FeedbackSubmission,
        offer: &Offer,
        code: String,
        issued_at: Timestamp,
    ) -> Self {
        let business_name = submission
            .display_name()
            .unwrap_or(&submission.business_id)
            .to_string();

        Self {
            code,
            business_id: submission.business_id.clone(),
            business_name,
            offer_title: offer.title.clone(),
            description: offer.description.clone(),
            terms: offer.terms.clone(),
            source: submission.source,
            issued_at,
            expiry_date: compute_expiry(issued_at, offer.validity_days),
        }
    }

    /// Reconstruct the offer the coupon was issued with.
    pub fn offer(&self) -> Offer {
        let days = (self.expiry_date - self.issued_at).num_days().max(0);
        Offer {
            title: self.offer_title.clone(),
            description: self.description.clone(),
            terms: self.terms.clone(),
            validity_days: u32::try_from(days).unwrap_or(u32::MAX),
        }
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expiry_date
    }
}

// ---------------------------------------------------------------------------
// URLs
// ---------------------------------------------------------------------------

/// Absolute redemption URL encoded into the QR image.
pub fn redeem_url(origin: &str, code: &str) -> String {
    format!(
        "{}/redeem/{}",
        origin.trim_end_matches('/'),
        urlencoding::encode(code)
    )
}

/// URL of the third-party QR image rendering `payload`.
pub fn qr_image_url(service_url: &str, payload: &str) -> String {
    let separator = if service_url.contains('?') { '&' } else { '?' };
    format!(
        "{service_url}{separator}size={QR_IMAGE_SIZE}x{QR_IMAGE_SIZE}&data={}",
        urlencoding::encode(payload)
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
