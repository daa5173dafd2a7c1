//! Request and response shapes exchanged with callers of the lifecycle
//! engine.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::{KycStatus, MerchantId, ReviewerId, Submission, SubmissionId};

/// Raw KYC submission as sent by a merchant.
///
/// Values are validated and normalized by
/// [`crate::kyc::validate_submission`]; nothing here is trusted. Missing
/// keys and explicit `null`s both read as empty.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionRequest {
    /// Merchant submitting KYC. Required (non-zero).
    #[serde(deserialize_with = "null_as_default")]
    pub merchant_id: MerchantId,
    /// `registered` or `startup`; empty means `registered`.
    #[serde(deserialize_with = "null_as_default")]
    pub business_type: String,
    /// Business name. Required.
    #[serde(deserialize_with = "null_as_default")]
    pub business_name: String,
    /// Corporate registry number.
    #[serde(deserialize_with = "null_as_default")]
    pub cac_number: String,
    /// Tax identification number.
    #[serde(deserialize_with = "null_as_default")]
    pub tin_number: String,
    /// Street address.
    #[serde(deserialize_with = "null_as_default")]
    pub business_address: String,
    /// City.
    #[serde(deserialize_with = "null_as_default")]
    pub city: String,
    /// State or region.
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
    /// Postal code.
    #[serde(deserialize_with = "null_as_default")]
    pub postal_code: String,
    /// Incorporation date as `YYYY-MM-DD`.
    #[serde(deserialize_with = "null_as_default")]
    pub incorporation_date: String,
    /// Merchant category.
    #[serde(deserialize_with = "null_as_default")]
    pub business_category: String,
    /// Director full name.
    #[serde(deserialize_with = "null_as_default")]
    pub director_name: String,
    /// Director bank verification number.
    #[serde(deserialize_with = "null_as_default")]
    pub director_bvn: String,
    /// Director phone number.
    #[serde(deserialize_with = "null_as_default")]
    pub director_phone: String,
    /// Director email address.
    #[serde(deserialize_with = "null_as_default")]
    pub director_email: String,
    /// Document-type label to storage reference.
    #[serde(deserialize_with = "null_as_default")]
    pub documents: BTreeMap<String, String>,
}

/// Reads `null` as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Acknowledgement returned after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    /// Identifier assigned by the store.
    pub submission_id: SubmissionId,
    /// Initial status (always pending).
    pub status: KycStatus,
    /// Human-readable acknowledgement.
    pub message: String,
}

/// Administrative status change for a merchant's latest submission.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewRequest {
    /// Merchant whose latest submission is reviewed.
    #[serde(deserialize_with = "null_as_default")]
    pub merchant_id: MerchantId,
    /// Target status, matched case-insensitively.
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    /// Reviewer making the change. Zero counts as absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_id: Option<ReviewerId>,
    /// Review notes. Blank counts as absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,
}

/// Current KYC state of a merchant as seen through one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusView {
    /// Merchant identifier.
    pub merchant_id: MerchantId,
    /// Submission this view was built from.
    pub submission_id: SubmissionId,
    /// Current status.
    pub status: KycStatus,
    /// When the submission was created.
    pub submitted_at: DateTime<Utc>,
    /// When it was last reviewed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Who last reviewed it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_id: Option<ReviewerId>,
    /// Notes from the last review.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,
}

impl From<&Submission> for StatusView {
    #[inline]
    fn from(submission: &Submission) -> Self {
        let review = submission.review.as_ref();
        Self {
            merchant_id: submission.merchant_id,
            submission_id: submission.id,
            status: submission.status,
            submitted_at: submission.created_at,
            reviewed_at: review.map(|stamp| stamp.reviewed_at),
            reviewer_id: review.and_then(|stamp| stamp.reviewer_id),
            review_notes: review.and_then(|stamp| stamp.notes.clone()),
        }
    }
}

/// Page of submissions filtered by status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusList {
    /// Matching submissions, most recent first.
    pub submissions: Vec<StatusView>,
    /// Number of entries in `submissions`.
    pub total: usize,
}

impl StatusList {
    /// Builds a list from stored submissions.
    #[inline]
    #[must_use]
    pub fn from_submissions(submissions: &[Submission]) -> Self {
        let views: Vec<StatusView> = submissions.iter().map(StatusView::from).collect();
        Self {
            total: views.len(),
            submissions: views,
        }
    }
}

/// Result-size cap for status listings.
///
/// Any requested value that is zero, negative or above
/// [`PageLimit::MAX`] is coerced to [`PageLimit::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageLimit(usize);

impl PageLimit {
    /// Largest (and default) page size.
    pub const MAX: usize = 100;

    /// Clamps a caller-supplied limit.
    #[inline]
    #[must_use]
    pub fn new(requested: i64) -> Self {
        match usize::try_from(requested) {
            Ok(value) if (1..=Self::MAX).contains(&value) => Self(value),
            Ok(_) | Err(_) => Self(Self::MAX),
        }
    }

    /// Returns the effective limit.
    #[inline]
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl Default for PageLimit {
    #[inline]
    fn default() -> Self {
        Self(Self::MAX)
    }
}
