//! Field sales representatives and business onboarding.
//!
//! An FSR onboards a business client and earns [`POINTS_PER_ONBOARDING`]
//! points for it. Businesses are addressed by a URL-safe slug, which is
//! also the `businessId` customers carry through the feedback wizard.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::feedback::{validate_membership, MembershipDetails};
use crate::types::{DbId, Timestamp};

/// Points credited to an FSR per onboarded business.
pub const POINTS_PER_ONBOARDING: i64 = 100;

/// Maximum length of a business slug.
pub const MAX_SLUG_LENGTH: usize = 64;

/// Google "write a review" deep link; the place id is appended.
pub const GOOGLE_WRITE_REVIEW_URL: &str = "https://search.google.com/local/writereview?placeid=";

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FsrAccount {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    pub id: DbId,
    pub slug: String,
    pub name: String,
    pub google_place_id: Option<String>,
    pub owner_name: String,
    pub owner_phone: Option<String>,
    pub onboarded_by: Option<DbId>,
    pub created_at: Timestamp,
}

impl Business {
    /// Link that opens Google's review dialog for this business.
    pub fn google_review_url(&self) -> Option<String> {
        self.google_place_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .map(google_review_url)
    }
}

/// Body of an onboarding request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewBusiness {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 255))]
    pub google_place_id: Option<String>,
    #[validate(length(min = 1, max = 120))]
    pub owner_name: String,
    #[serde(default)]
    pub owner_phone: Option<String>,
}

/// Result of a successful onboarding.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Onboarding {
    pub business: Business,
    pub points_awarded: i64,
    pub total_points: i64,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn google_review_url(place_id: &str) -> String {
    format!(
        "{GOOGLE_WRITE_REVIEW_URL}{}",
        urlencoding::encode(place_id.trim())
    )
}

/// Derive a slug from a business name: lowercase ASCII words joined by
/// single dashes. Apostrophes vanish, so "Raj's" becomes "rajs".
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if c != '\'' && !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug.truncate(MAX_SLUG_LENGTH);
    slug.trim_end_matches('-').to_string()
}

pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if slug.len() > MAX_SLUG_LENGTH || !SLUG_RE.is_match(slug) {
        return Err(CoreError::Validation(format!(
            "Invalid business slug '{slug}'. Use lowercase letters, digits and single dashes"
        )));
    }
    Ok(())
}

impl NewBusiness {
    /// Validate the request and return the slug to store.
    pub fn check(&self) -> Result<String, CoreError> {
        self.validate()?;

        if let Some(phone) = &self.owner_phone {
            validate_membership(&MembershipDetails {
                name: self.owner_name.clone(),
                phone: Some(phone.clone()),
                email: None,
            })?;
        }

        let slug = match self.slug.as_deref().map(str::trim) {
            Some(explicit) if !explicit.is_empty() => explicit.to_string(),
            _ => slugify(&self.name),
        };
        validate_slug(&slug)?;
        Ok(slug)
    }
}
