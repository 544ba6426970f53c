//! Offer catalog and selection.
//!
//! Maps a business (by id or by a keyword in its name) to the reward a
//! customer receives after leaving feedback. The same catalog backs the
//! redemption prefix lookup, and a name whose code prefix belongs to an
//! entry always selects that entry, so a code with a catalog prefix
//! redeems to the offer it was issued with.

use serde::{Deserialize, Serialize};

use crate::coupon::code_prefix;

/// Reward terms attached to a coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub title: String,
    pub description: String,
    pub terms: String,
    /// Days the coupon stays valid after issuance. Always > 0.
    pub validity_days: u32,
}

/// A business-specific offer in the fixed catalog.
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    /// Exact business id that selects this entry.
    pub business_id: &'static str,
    /// Display name of the partner business.
    pub business_name: &'static str,
    /// Lowercase keyword matched against the business name.
    pub keyword: &'static str,
    /// Code prefix minted for this business (first 3 letters of its name).
    pub code_prefix: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub terms: &'static str,
    pub validity_days: u32,
}

impl CatalogEntry {
    pub fn offer(&self) -> Offer {
        Offer {
            title: self.title.to_string(),
            description: self.description.to_string(),
            terms: self.terms.to_string(),
            validity_days: self.validity_days,
        }
    }
}

/// Ordered catalog; the first matching entry wins.
pub const OFFER_CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        business_id: "pizza-corner",
        business_name: "Pizza Corner",
        keyword: "pizza",
        code_prefix: "PIZ",
        title: "FREE Garlic Bread",
        description: "Enjoy a free portion of garlic bread with any large pizza.",
        terms: "Valid on dine-in and takeaway orders. One coupon per order.",
        validity_days: 14,
    },
    CatalogEntry {
        business_id: "rajs-salon",
        business_name: "Raj's Salon",
        keyword: "salon",
        code_prefix: "RAJ",
        title: "20% Off Hair Spa",
        description: "Get 20% off your next hair spa treatment.",
        terms: "Valid Monday to Thursday. Prior appointment required.",
        validity_days: 30,
    },
    CatalogEntry {
        business_id: "brew-haven-cafe",
        business_name: "Brew Haven Cafe",
        keyword: "cafe",
        code_prefix: "BRE",
        title: "Buy 1 Get 1 Coffee",
        description: "Order any coffee and get a second one on the house.",
        terms: "Valid before 11 AM. Second coffee of equal or lesser value.",
        validity_days: 7,
    },
    CatalogEntry {
        business_id: "fitzone-gym",
        business_name: "FitZone Gym",
        keyword: "gym",
        code_prefix: "FIT",
        title: "1 Week Free Pass",
        description: "Train free for a full week, all equipment included.",
        terms: "New members only. Valid ID required at the front desk.",
        validity_days: 21,
    },
];

/// Fallback offer for businesses with no catalog entry.
pub const DEFAULT_OFFER_TITLE: &str = "10% Off Your Next Visit";
pub const DEFAULT_OFFER_DESCRIPTION: &str = "Show this coupon to get 10% off your next purchase.";
pub const DEFAULT_OFFER_TERMS: &str = "Cannot be combined with other offers.";
pub const DEFAULT_VALIDITY_DAYS: u32 = 30;

pub fn default_offer() -> Offer {
    Offer {
        title: DEFAULT_OFFER_TITLE.to_string(),
        description: DEFAULT_OFFER_DESCRIPTION.to_string(),
        terms: DEFAULT_OFFER_TERMS.to_string(),
        validity_days: DEFAULT_VALIDITY_DAYS,
    }
}

/// Find the catalog entry for a business.
///
/// A name whose code prefix belongs to a catalog entry selects that entry,
/// since redemption without a stored record reads the offer back from the
/// prefix. Otherwise an exact id match or a case-insensitive keyword hit in
/// the business name selects an entry; the catalog is scanned in order.
pub fn find_catalog_entry(
    business_id: Option<&str>,
    business_name: Option<&str>,
) -> Option<&'static CatalogEntry> {
    let id = business_id.map(str::trim).filter(|s| !s.is_empty());
    let name = business_name
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    if let Some(entry) = name
        .as_deref()
        .and_then(|n| catalog_entry_for_prefix(&code_prefix(Some(n))))
    {
        return Some(entry);
    }

    OFFER_CATALOG.iter().find(|entry| {
        id.is_some_and(|id| id == entry.business_id)
            || name.as_deref().is_some_and(|n| n.contains(entry.keyword))
    })
}

/// Select the offer for a business. Pure and deterministic.
pub fn select_offer(business_id: Option<&str>, business_name: Option<&str>) -> Offer {
    find_catalog_entry(business_id, business_name)
        .map(CatalogEntry::offer)
        .unwrap_or_else(default_offer)
}

/// Look up a catalog entry by the prefix segment of a coupon code.
pub fn catalog_entry_for_prefix(prefix: &str) -> Option<&'static CatalogEntry> {
    OFFER_CATALOG
        .iter()
        .find(|entry| entry.code_prefix.eq_ignore_ascii_case(prefix))
}
