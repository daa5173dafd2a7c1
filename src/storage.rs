//! Pluggable storage backends for KYC submissions.
//!
//! This module defines the [`Storage`] (async) and [`BlockingStorage`]
//! (blocking) traits via a shared macro, mirroring the client generation
//! pattern in [`crate::client`].
//!
//! Every backend must honour the same contract: `create` and
//! `update_status` are atomic single-record operations, "latest" means
//! greatest `(created_at, id)`, and listings are most recent first.

#[cfg(feature = "storage-file")]
mod file;
mod memory;
#[cfg(feature = "server")]
mod offload;

#[cfg(feature = "storage-file")]
pub use file::FileStorage;
pub use memory::InMemoryStorage;
#[cfg(feature = "server")]
pub use offload::OffloadedStorage;

use crate::error::KycError;
use crate::models::{KycStatus, MerchantId, PageLimit, Submission, SubmissionId};

/// Generates a storage trait (async or blocking) with all submission
/// methods.
///
/// Uses `@methods` to define the method list once, and `@method` to render
/// each method in async (`impl Future + Send`) or blocking (`fn`) style.
macro_rules! define_storage {
    // ── Entry points ────────────────────────────────────────────────
    (
        trait_name: $trait_name:ident,
        trait_doc: $trait_doc:expr,
        mode: async_mode,
    ) => {
        #[doc = $trait_doc]
        pub trait $trait_name: core::fmt::Debug + Send + Sync {
            define_storage!(@methods async_mode);
        }
    };
    (
        trait_name: $trait_name:ident,
        trait_doc: $trait_doc:expr,
        mode: blocking,
    ) => {
        #[doc = $trait_doc]
        pub trait $trait_name: core::fmt::Debug + Send + Sync {
            define_storage!(@methods blocking);
        }
    };

    // ── Single method list (shared between both variants) ───────────
    (@methods $mode:ident) => {
        define_storage!(@method $mode, create,
            "Stores a new pending submission, assigning its identifier and\ntimestamps.\n\n# Errors\n\nReturns a persistence error if the backend fails to write.",
            submission: NewSubmission, -> Result<Submission>);
        define_storage!(@method $mode, submission,
            "Returns the submission with the given identifier, if any.\n\n# Errors\n\nReturns a persistence error if the backend fails to read.",
            id: SubmissionId, -> Result<Option<Submission>>);
        define_storage!(@method $mode, latest_for_merchant,
            "Returns the merchant's most recently created submission (ties\nbroken by highest identifier), or `None` if it never submitted.\n\n# Errors\n\nReturns a persistence error if the backend fails to read.",
            merchant_id: MerchantId, -> Result<Option<Submission>>);
        define_storage!(@method $mode, update_status,
            "Applies a review transition, stamping `reviewed_at` and\n`updated_at` with the current time, and returns the updated record.\n\n# Errors\n\nReturns [`crate::error::KycError::NotFound`] if no submission has the given\nidentifier, or a persistence error if the backend fails.",
            id: SubmissionId, update: StatusUpdate, -> Result<Submission>);
        define_storage!(@method $mode, list_by_status,
            "Returns submissions in the given status, most recent first,\ncapped at `limit`.\n\n# Errors\n\nReturns a persistence error if the backend fails to read.",
            status: KycStatus, limit: PageLimit, -> Result<Vec<Submission>>);
    };

    // ── Blocking method renderer ────────────────────────────────────
    (@method blocking, $name:ident, $doc:expr,
     $($param:ident: $param_ty:ty,)* -> $ret:ty) => {
        #[doc = $doc]
        fn $name(&self $(, $param: $param_ty)*) -> $ret;
    };

    // ── Async method renderer (returns impl Future + Send) ──────────
    (@method async_mode, $name:ident, $doc:expr,
     $($param:ident: $param_ty:ty,)* -> $ret:ty) => {
        #[doc = $doc]
        fn $name(&self $(, $param: $param_ty)*)
            -> impl core::future::Future<Output = $ret> + Send;
    };
}

#[cfg(feature = "async")]
mod async_storage {
    //! Async storage trait definition.

    use crate::error::Result;
    use crate::models::{
        KycStatus, MerchantId, NewSubmission, PageLimit, StatusUpdate, Submission, SubmissionId,
    };

    define_storage! {
        trait_name: Storage,
        trait_doc: "Async storage backend for KYC submissions.\n\nAll methods take `&self`; implementations use interior mutability\n(e.g. `Mutex`) for thread-safe mutation.",
        mode: async_mode,
    }
}

#[cfg(feature = "blocking")]
mod blocking_storage {
    //! Blocking storage trait definition.

    use crate::error::Result;
    use crate::models::{
        KycStatus, MerchantId, NewSubmission, PageLimit, StatusUpdate, Submission, SubmissionId,
    };

    define_storage! {
        trait_name: BlockingStorage,
        trait_doc: "Blocking storage backend for KYC submissions.\n\nAll methods take `&self`; implementations use interior mutability\n(e.g. `Mutex`) for thread-safe mutation.",
        mode: blocking,
    }
}

#[cfg(feature = "async")]
pub use async_storage::Storage;
#[cfg(feature = "blocking")]
pub use blocking_storage::BlockingStorage;

// ── Query helpers shared by every backend ───────────────────────────────

/// Picks the merchant's latest submission by [`Submission::recency_key`].
fn select_latest<'sub, I>(submissions: I, merchant_id: MerchantId) -> Option<&'sub Submission>
where
    I: IntoIterator<Item = &'sub Submission>,
{
    submissions
        .into_iter()
        .filter(|sub| sub.merchant_id == merchant_id)
        .max_by_key(|sub| sub.recency_key())
}

/// Filters by status, orders most recent first and applies the limit.
fn select_by_status<'sub, I>(submissions: I, status: KycStatus, limit: PageLimit) -> Vec<Submission>
where
    I: IntoIterator<Item = &'sub Submission>,
{
    let mut matching: Vec<&Submission> = submissions
        .into_iter()
        .filter(|sub| sub.status == status)
        .collect();
    matching.sort_by_key(|sub| core::cmp::Reverse(sub.recency_key()));
    matching.into_iter().take(limit.get()).cloned().collect()
}

/// Next identifier after the highest one in use (starting at 1).
fn next_id<'sub, I>(submissions: I) -> SubmissionId
where
    I: IntoIterator<Item = &'sub Submission>,
{
    let highest = submissions
        .into_iter()
        .map(|sub| sub.id.into_inner())
        .max()
        .unwrap_or(0);
    SubmissionId::new(highest.saturating_add(1))
}

/// Error returned when `update_status` targets a missing submission.
fn submission_not_found(id: SubmissionId) -> KycError {
    KycError::NotFound(format!("kyc submission {id} not found"))
}
