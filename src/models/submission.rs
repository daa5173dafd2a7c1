//! KYC submission record and the values used to create and review it.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{BusinessType, KycStatus, MerchantId, ReviewerId, SubmissionId};

/// Business and director details captured at intake.
///
/// Everything except `business_name` is optional and stored as an empty
/// string when the merchant did not provide it.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessProfile {
    /// Legal form of the business.
    pub business_type: BusinessType,
    /// Registered or trading name.
    pub business_name: String,
    /// Corporate Affairs Commission registration number.
    #[serde(default)]
    pub cac_number: String,
    /// Tax identification number.
    #[serde(default)]
    pub tin_number: String,
    /// Street address.
    #[serde(default)]
    pub business_address: String,
    /// City.
    #[serde(default)]
    pub city: String,
    /// State or region.
    #[serde(default)]
    pub state: String,
    /// Postal code.
    #[serde(default)]
    pub postal_code: String,
    /// Date of incorporation, if known and well-formed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incorporation_date: Option<NaiveDate>,
    /// Merchant category.
    #[serde(default)]
    pub business_category: String,
    /// Director full name.
    #[serde(default)]
    pub director_name: String,
    /// Director bank verification number.
    #[serde(default)]
    pub director_bvn: String,
    /// Director phone number.
    #[serde(default)]
    pub director_phone: String,
    /// Director email address.
    #[serde(default)]
    pub director_email: String,
    /// Document-type label to storage reference (URL or path).
    #[serde(default)]
    pub documents: BTreeMap<String, String>,
}

/// Validated submission that has not been stored yet.
///
/// Produced by the lifecycle engine and handed to
/// [`crate::storage::Storage::create`], which assigns the identifier and
/// timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmission {
    /// Merchant the submission belongs to.
    pub merchant_id: MerchantId,
    /// Captured business details.
    pub profile: BusinessProfile,
}

/// Review metadata, present only once a submission has been reviewed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewStamp {
    /// When the review transition happened.
    pub reviewed_at: DateTime<Utc>,
    /// Reviewer who made the change, if identified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_id: Option<ReviewerId>,
    /// Free-text notes attached to the review.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Status change requested by a reviewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    /// Target status.
    pub status: KycStatus,
    /// Reviewer making the change.
    pub reviewer_id: Option<ReviewerId>,
    /// Review notes.
    pub notes: Option<String>,
}

/// One KYC attempt by a merchant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// Store-assigned identifier.
    pub id: SubmissionId,
    /// Merchant the submission belongs to.
    pub merchant_id: MerchantId,
    /// Captured business details.
    #[serde(flatten)]
    pub profile: BusinessProfile,
    /// Current review state.
    pub status: KycStatus,
    /// Review metadata; `None` until the first review.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<ReviewStamp>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Time of the last mutation.
    pub updated_at: DateTime<Utc>,
}

impl Submission {
    /// Materializes a new pending submission with store-assigned values.
    #[inline]
    #[must_use]
    pub fn create(id: SubmissionId, new: NewSubmission, now: DateTime<Utc>) -> Self {
        Self {
            id,
            merchant_id: new.merchant_id,
            profile: new.profile,
            status: KycStatus::Pending,
            review: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a review transition, stamping `reviewed_at` and
    /// `updated_at` with the same instant.
    ///
    /// Any status may move to any other, including itself.
    #[inline]
    pub fn apply_review(&mut self, update: StatusUpdate, now: DateTime<Utc>) {
        self.status = update.status;
        self.review = Some(ReviewStamp {
            reviewed_at: now,
            reviewer_id: update.reviewer_id,
            notes: update.notes,
        });
        self.updated_at = now;
    }

    /// Ordering key for "latest submission" resolution: creation time,
    /// then identifier to break ties.
    #[inline]
    #[must_use]
    pub const fn recency_key(&self) -> (DateTime<Utc>, SubmissionId) {
        (self.created_at, self.id)
    }
}
