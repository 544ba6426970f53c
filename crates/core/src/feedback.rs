//! Customer feedback wizard payloads and routing.
//!
//! A [`FeedbackSubmission`] is created by the rating step and carried
//! through the session relay to the membership and coupon steps. Ratings
//! of [`POSITIVE_RATING_THRESHOLD`] and above are routed to a public
//! Google review; anything lower goes to the private feedback channel.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::offer::Offer;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Lowest accepted star rating.
pub const MIN_RATING: u8 = 1;
/// Highest accepted star rating.
pub const MAX_RATING: u8 = 5;
/// Ratings at or above this go to Google.
pub const POSITIVE_RATING_THRESHOLD: u8 = 4;

/// Longest accepted free-text field, in characters.
pub const MAX_TEXT_LENGTH: usize = 2000;
/// Most qualities or feelings a submission may carry.
pub const MAX_TAGS: usize = 20;

// `validator` length bounds are `u64`.
const MAX_TEXT_LENGTH_U64: u64 = MAX_TEXT_LENGTH as u64;
const MAX_TAGS_U64: u64 = MAX_TAGS as u64;

/// Minimum digits in a captured phone number.
pub const MIN_PHONE_DIGITS: usize = 7;
/// Maximum digits in a captured phone number.
pub const MAX_PHONE_DIGITS: usize = 15;

/// Fallback wording when the business name is not known.
const UNNAMED_BUSINESS: &str = "this place";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Where the customer arrived from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackSource {
    #[default]
    Review,
    Instagram,
}

impl FeedbackSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackSource::Review => "review",
            FeedbackSource::Instagram => "instagram",
        }
    }
}

/// Which channel a rating is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewRoute {
    /// Public review on Google, followed by membership capture and a coupon.
    Google,
    /// Private feedback form visible only to the business owner.
    Private,
}

impl ReviewRoute {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewRoute::Google => "google",
            ReviewRoute::Private => "private",
        }
    }
}

/// Contact details captured between the rating and the coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MembershipDetails {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
}

/// A completed feedback wizard step, plus the coupon fields cached on it
/// once a coupon has been issued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSubmission {
    #[validate(length(min = 1, max = 200))]
    pub business_id: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub business_name: Option<String>,
    #[validate(range(min = MIN_RATING, max = MAX_RATING))]
    pub rating: u8,
    #[serde(default)]
    #[validate(length(max = MAX_TEXT_LENGTH_U64))]
    pub service: Option<String>,
    #[serde(default)]
    #[validate(length(max = MAX_TEXT_LENGTH_U64))]
    pub staff: Option<String>,
    #[serde(default)]
    #[validate(length(max = MAX_TAGS_U64))]
    pub qualities: Vec<String>,
    #[serde(default)]
    #[validate(length(max = MAX_TAGS_U64))]
    pub feelings: Vec<String>,
    #[serde(default)]
    #[validate(length(max = MAX_TEXT_LENGTH_U64))]
    pub additional: Option<String>,
    #[serde(default)]
    pub source: FeedbackSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer: Option<Offer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub customer: Option<MembershipDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_issued_at: Option<Timestamp>,
    #[serde(default)]
    pub coupon_persisted: bool,
}

impl FeedbackSubmission {
    /// Validate the submission and the captured membership details.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()?;
        let too_long = self
            .qualities
            .iter()
            .chain(&self.feelings)
            .any(|tag| tag.chars().count() > MAX_TEXT_LENGTH);
        if too_long {
            return Err(CoreError::Validation(format!(
                "Qualities and feelings must be at most {MAX_TEXT_LENGTH} characters each"
            )));
        }
        if let Some(customer) = &self.customer {
            validate_membership(customer)?;
        }
        Ok(())
    }

    /// Drop any coupon state a client tried to carry into a fresh rating.
    pub fn clear_coupon_fields(&mut self) {
        self.coupon_code = None;
        self.coupon_issued_at = None;
        self.coupon_persisted = false;
    }

    /// Business name if present and non-blank.
    pub fn display_name(&self) -> Option<&str> {
        self.business_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn route(&self) -> ReviewRoute {
        route_for_rating(self.rating)
    }
}

/// What gets written to the review record after the rating step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<MembershipDetails>,
}

/// Relay payload stored under `privateFeedback` by the rating step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateFeedbackDraft {
    pub business_id: String,
    #[serde(default)]
    pub business_name: Option<String>,
    pub rating: u8,
}

/// Body of the private feedback form.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PrivateFeedbackInput {
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
    #[serde(default)]
    #[validate(nested)]
    pub contact: Option<MembershipDetails>,
}

/// A negative-path feedback message ready to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateFeedback {
    pub business_id: String,
    pub business_name: Option<String>,
    pub rating: u8,
    pub message: String,
    pub contact: Option<MembershipDetails>,
}

impl PrivateFeedbackDraft {
    pub fn from_submission(submission: &FeedbackSubmission) -> Self {
        Self {
            business_id: submission.business_id.clone(),
            business_name: submission.business_name.clone(),
            rating: submission.rating,
        }
    }

    /// Combine the draft with the form body, validating the result.
    pub fn complete(self, input: PrivateFeedbackInput) -> Result<PrivateFeedback, CoreError> {
        input.validate()?;
        if let Some(contact) = &input.contact {
            validate_membership(contact)?;
        }
        let message = input.message.trim().to_string();
        if message.is_empty() {
            return Err(CoreError::Validation(
                "Feedback message must not be blank".to_string(),
            ));
        }
        Ok(PrivateFeedback {
            business_id: self.business_id,
            business_name: self.business_name,
            rating: self.rating,
            message,
            contact: input.contact,
        })
    }
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Decide which channel a rating goes to.
pub fn route_for_rating(rating: u8) -> ReviewRoute {
    if rating >= POSITIVE_RATING_THRESHOLD {
        ReviewRoute::Google
    } else {
        ReviewRoute::Private
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate membership details beyond what the derive covers.
///
/// Phone numbers may contain spaces, dashes, parentheses and a leading
/// `+`, but must carry between 7 and 15 digits.
pub fn validate_membership(details: &MembershipDetails) -> Result<(), CoreError> {
    details.validate()?;

    if details.name.trim().is_empty() {
        return Err(CoreError::Validation("Name must not be blank".to_string()));
    }

    if let Some(phone) = &details.phone {
        let allowed = phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')' | '+'));
        let digits = phone.chars().filter(char::is_ascii_digit).count();
        if !allowed || !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits) {
            return Err(CoreError::Validation(format!(
                "Invalid phone number '{phone}'"
            )));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Suggested review text
// ---------------------------------------------------------------------------

/// Build the review text offered to the customer to paste into Google.
pub fn compose_review_text(submission: &FeedbackSubmission) -> String {
    let name = submission.display_name().unwrap_or(UNNAMED_BUSINESS);
    let adjective = if submission.rating >= MAX_RATING {
        "fantastic"
    } else {
        "great"
    };

    let mut sentences = vec![format!("Had a {adjective} experience at {name}!")];

    if let Some(service) = non_blank(submission.service.as_deref()) {
        sentences.push(format!("The {service} was excellent."));
    }
    if let Some(qualities) = join_human(&submission.qualities) {
        sentences.push(format!("Really appreciated the {qualities}."));
    }
    if let Some(staff) = non_blank(submission.staff.as_deref()) {
        sentences.push(format!("Special thanks to {staff} for looking after me."));
    }
    if let Some(feelings) = join_human(&submission.feelings) {
        sentences.push(format!("I left feeling {feelings}."));
    }
    if let Some(additional) = non_blank(submission.additional.as_deref()) {
        sentences.push(additional.to_string());
    }
    sentences.push("Highly recommended!".to_string());

    sentences.join(" ")
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Join items as "a", "a and b", or "a, b and c". Blank items are skipped.
fn join_human(items: &[String]) -> Option<String> {
    let items: Vec<&str> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    match items.as_slice() {
        [] => None,
        [only] => Some((*only).to_string()),
        [head @ .., last] => Some(format!("{} and {last}", head.join(", "))),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(rating: u8) -> FeedbackSubmission {
        FeedbackSubmission {
            business_id: "pizza-corner".to_string(),
            business_name: Some("Pizza Corner".to_string()),
            rating,
            service: None,
            staff: None,
            qualities: Vec::new(),
            feelings: Vec::new(),
            additional: None,
            source: FeedbackSource::Review,
            offer: None,
            customer: None,
            coupon_code: None,
            coupon_issued_at: None,
            coupon_persisted: false,
        }
    }

    #[test]
    fn high_ratings_route_to_google() {
        assert_eq!(route_for_rating(5), ReviewRoute::Google);
        assert_eq!(route_for_rating(4), ReviewRoute::Google);
    }

    #[test]
    fn low_ratings_route_to_private() {
        assert_eq!(route_for_rating(3), ReviewRoute::Private);
        assert_eq!(route_for_rating(1), ReviewRoute::Private);
    }

    #[test]
    fn rating_out_of_range_fails() {
        assert!(submission(0).check().is_err());
        assert!(submission(6).check().is_err());
        assert!(submission(3).check().is_ok());
    }

    #[test]
    fn oversized_tag_fails() {
        let mut s = submission(5);
        s.qualities = vec!["friendly".to_string(), "x".repeat(MAX_TEXT_LENGTH)];
        assert!(s.check().is_ok());

        s.feelings = vec!["y".repeat(MAX_TEXT_LENGTH + 1)];
        assert!(matches!(s.check(), Err(CoreError::Validation(_))));
    }

    #[test]
    fn empty_business_id_fails() {
        let mut s = submission(5);
        s.business_id = String::new();
        assert!(s.check().is_err());
    }

    #[test]
    fn deserializes_camel_case_payload() {
        let json = serde_json::json!({
            "businessId": "rajs-salon",
            "businessName": "Raj's Salon",
            "rating": 5,
            "qualities": ["friendly staff"],
            "feelings": ["relaxed"],
            "source": "instagram"
        });
        let s: FeedbackSubmission = serde_json::from_value(json).unwrap();
        assert_eq!(s.business_id, "rajs-salon");
        assert_eq!(s.source, FeedbackSource::Instagram);
        assert!(s.coupon_code.is_none());
        assert!(!s.coupon_persisted);
    }

    #[test]
    fn source_defaults_to_review() {
        let json = serde_json::json!({ "businessId": "x", "rating": 4 });
        let s: FeedbackSubmission = serde_json::from_value(json).unwrap();
        assert_eq!(s.source, FeedbackSource::Review);
    }

    #[test]
    fn clear_coupon_fields_resets_cache() {
        let mut s = submission(5);
        s.coupon_code = Some("PIZ-AAAAA".to_string());
        s.coupon_persisted = true;
        s.clear_coupon_fields();
        assert!(s.coupon_code.is_none());
        assert!(s.coupon_issued_at.is_none());
        assert!(!s.coupon_persisted);
    }

    #[test]
    fn membership_phone_validation() {
        let mut details = MembershipDetails {
            name: "Asha".to_string(),
            phone: Some("+91 98765-43210".to_string()),
            email: Some("asha@example.com".to_string()),
        };
        assert!(validate_membership(&details).is_ok());

        details.phone = Some("12ab".to_string());
        assert!(validate_membership(&details).is_err());

        details.phone = Some("123".to_string());
        assert!(validate_membership(&details).is_err());
    }

    #[test]
    fn membership_rejects_bad_email_and_blank_name() {
        let details = MembershipDetails {
            name: "Asha".to_string(),
            phone: None,
            email: Some("not-an-email".to_string()),
        };
        assert!(validate_membership(&details).is_err());

        let details = MembershipDetails {
            name: "   ".to_string(),
            phone: None,
            email: None,
        };
        assert!(validate_membership(&details).is_err());
    }

    #[test]
    fn review_text_minimal() {
        assert_eq!(
            compose_review_text(&submission(4)),
            "Had a great experience at Pizza Corner! Highly recommended!"
        );
    }

    #[test]
    fn review_text_full() {
        let mut s = submission(5);
        s.service = Some("wood-fired pizza".to_string());
        s.staff = Some("Marco".to_string());
        s.qualities = vec![
            "quick service".to_string(),
            "clean tables".to_string(),
            "fair prices".to_string(),
        ];
        s.feelings = vec!["happy".to_string(), "full".to_string()];
        s.additional = Some("  Will be back soon.  ".to_string());

        assert_eq!(
            compose_review_text(&s),
            "Had a fantastic experience at Pizza Corner! \
             The wood-fired pizza was excellent. \
             Really appreciated the quick service, clean tables and fair prices. \
             Special thanks to Marco for looking after me. \
             I left feeling happy and full. \
             Will be back soon. \
             Highly recommended!"
        );
    }

    #[test]
    fn review_text_without_name() {
        let mut s = submission(4);
        s.business_name = Some("  ".to_string());
        assert!(compose_review_text(&s).starts_with("Had a great experience at this place!"));
    }

    #[test]
    fn join_human_skips_blanks() {
        let items = vec!["a".to_string(), " ".to_string(), "b".to_string()];
        assert_eq!(join_human(&items).as_deref(), Some("a and b"));
        assert_eq!(join_human(&[]), None);
    }

    #[test]
    fn private_draft_completes() {
        let draft = PrivateFeedbackDraft::from_submission(&submission(2));
        let input = PrivateFeedbackInput {
            message: "  Cold food.  ".to_string(),
            contact: None,
        };
        let feedback = draft.complete(input).unwrap();
        assert_eq!(feedback.message, "Cold food.");
        assert_eq!(feedback.rating, 2);
        assert_eq!(feedback.business_id, "pizza-corner");
    }

    #[test]
    fn private_draft_rejects_blank_message() {
        let draft = PrivateFeedbackDraft::from_submission(&submission(2));
        let input = PrivateFeedbackInput {
            message: "   ".to_string(),
            contact: None,
        };
        assert!(draft.complete(input).is_err());
    }
}
