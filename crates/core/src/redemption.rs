//! Coupon redemption flow: `verifying -> valid | invalid`.
//!
//! A code is looked up in the persistence gateway first. When no stored
//! record exists the code's prefix is matched against the offer catalog,
//! and unmatched prefixes get the generic partner offer. Every non-empty
//! code therefore redeems as valid; only an absent code is invalid.
//! Whether unknown, expired, or already-used codes should be rejected is
//! still undecided, so expiry is reported but not enforced.

use std::time::Duration;

use serde::Serialize;

use crate::coupon::{self, Coupon};
use crate::gateway::{GatewayError, PersistenceGateway};
use crate::offer::{catalog_entry_for_prefix, default_offer, Offer};
use crate::types::Timestamp;

/// Pause shown on the verifying screen before the result appears.
pub const DEFAULT_VERIFY_DELAY: Duration = Duration::from_millis(1500);

/// Business name reported for codes with an unknown prefix.
pub const FALLBACK_BUSINESS_NAME: &str = "Partner Business";

/// User-facing message for the invalid state.
pub const MISSING_CODE_MESSAGE: &str =
    "No coupon code was provided. Please scan the QR code on your coupon again.";

/// Where a valid result's offer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupBasis {
    /// A persisted coupon record.
    Stored,
    /// The catalog entry for the code's prefix.
    Catalog,
    /// The generic partner offer.
    Fallback,
}

/// Terminal state of a redemption.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Redemption {
    #[serde(rename_all = "camelCase")]
    Valid {
        code: String,
        business_name: String,
        offer: Offer,
        basis: LookupBasis,
        /// Known only for stored coupons.
        expiry_date: Option<Timestamp>,
        expired: bool,
        /// Whether the code has the generated `XXX-XXXXX` shape.
        well_formed: bool,
    },
    Invalid {
        reason: String,
    },
}

impl Redemption {
    pub fn is_valid(&self) -> bool {
        matches!(self, Redemption::Valid { .. })
    }
}

/// Trimmed code, or `None` when absent or blank.
pub fn normalize_code(code: Option<&str>) -> Option<&str> {
    code.map(str::trim).filter(|c| !c.is_empty())
}

/// Decide the redemption result from the code and the stored record, if any.
pub fn resolve(code: Option<&str>, stored: Option<&Coupon>, now: Timestamp) -> Redemption {
    let Some(code) = normalize_code(code) else {
        return Redemption::Invalid {
            reason: MISSING_CODE_MESSAGE.to_string(),
        };
    };
    let well_formed = coupon::is_well_formed_code(code);

    if let Some(record) = stored {
        return Redemption::Valid {
            code: code.to_string(),
            business_name: record.business_name.clone(),
            offer: record.offer(),
            basis: LookupBasis::Stored,
            expiry_date: Some(record.expiry_date),
            expired: record.is_expired(now),
            well_formed,
        };
    }

    let (business_name, offer, basis) = match catalog_entry_for_prefix(coupon::prefix_of(code)) {
        Some(entry) => (
            entry.business_name.to_string(),
            entry.offer(),
            LookupBasis::Catalog,
        ),
        None => (
            FALLBACK_BUSINESS_NAME.to_string(),
            default_offer(),
            LookupBasis::Fallback,
        ),
    };

    Redemption::Valid {
        code: code.to_string(),
        business_name,
        offer,
        basis,
        expiry_date: None,
        expired: false,
        well_formed,
    }
}

/// Result of [`redeem`] plus any lookup failure that was absorbed.
#[derive(Debug)]
pub struct RedemptionReport {
    pub redemption: Redemption,
    /// Set when the stored lookup failed and the catalog was used instead.
    pub lookup_error: Option<GatewayError>,
}

/// Run the verifying state: hold for `delay` while looking the code up,
/// then resolve.
///
/// Issued codes are uppercase, so a hand-typed code is uppercased before
/// the stored lookup.
pub async fn redeem(
    gateway: &dyn PersistenceGateway,
    code: Option<&str>,
    delay: Duration,
    now: Timestamp,
) -> RedemptionReport {
    let Some(trimmed) = normalize_code(code) else {
        tokio::time::sleep(delay).await;
        return RedemptionReport {
            redemption: resolve(None, None, now),
            lookup_error: None,
        };
    };

    let code = trimmed.to_ascii_uppercase();
    let (lookup, ()) = tokio::join!(gateway.find_coupon(&code), tokio::time::sleep(delay));

    let (stored, lookup_error) = match lookup {
        Ok(stored) => (stored, None),
        Err(e) => (None, Some(e)),
    };

    RedemptionReport {
        redemption: resolve(Some(code.as_str()), stored.as_ref(), now),
        lookup_error,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
