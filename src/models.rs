//! Data models for KYC submissions.
//!
//! This module contains the stored submission record, newtype ID
//! wrappers, enumeration types for constrained values, and the request
//! and response shapes of the lifecycle engine.

mod enums;
mod ids;
mod requests;
mod submission;

pub use chrono::NaiveDate;
pub use enums::{BusinessType, IncorporationDatePolicy, KycStatus};
pub use ids::{AuditId, MerchantId, ReviewerId, SubmissionId};
pub use requests::{
    PageLimit, ReviewRequest, StatusList, StatusView, SubmissionReceipt, SubmissionRequest,
};
pub use submission::{BusinessProfile, NewSubmission, ReviewStamp, StatusUpdate, Submission};
