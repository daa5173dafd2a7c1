//! In-memory storage backend.
//!
//! Provides [`InMemoryStorage`], a thread-safe in-memory implementation of
//! the storage traits. Ideal for unit and integration tests where file I/O
//! is undesirable.

use std::sync::Mutex;

use chrono::Utc;

#[cfg(feature = "async")]
use core::future::{self, Future};

use super::{next_id, select_by_status, select_latest, submission_not_found};
use crate::error::{KycError, Result};
use crate::models::{
    KycStatus, MerchantId, NewSubmission, PageLimit, StatusUpdate, Submission, SubmissionId,
};

/// Thread-safe in-memory submission store.
///
/// This type implements both [`super::Storage`] (async) and
/// [`super::BlockingStorage`] (blocking) traits. Data lives only as long
/// as the value does.
///
/// # Example
///
/// ```rust
/// use merchant_kyc::storage::InMemoryStorage;
///
/// let storage = InMemoryStorage::new();
/// // Use with the KycService or KycServiceBlocking builders:
/// // KycServiceBlocking::builder().storage(storage).directory_url("...").build()
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    /// All state behind a single mutex for thread-safe interior mutability.
    inner: Mutex<Inner>,
}

/// Inner mutable state.
#[derive(Debug, Default)]
struct Inner {
    /// Stored submissions in insertion order.
    submissions: Vec<Submission>,
}

impl InMemoryStorage {
    /// Creates a new empty in-memory storage.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the inner lock and applies a closure.
    fn with_lock<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> Result<R> {
        let mut inner = self.inner.lock().map_err(|err| lock_error(&err))?;
        Ok(f(&mut inner))
    }

    /// Inserts a new submission under the next free identifier.
    fn create_submission(&self, new: NewSubmission) -> Result<Submission> {
        self.with_lock(|inner| {
            let submission = Submission::create(next_id(&inner.submissions), new, Utc::now());
            inner.submissions.push(submission.clone());
            submission
        })
    }

    /// Looks up a submission by identifier.
    fn find(&self, id: SubmissionId) -> Result<Option<Submission>> {
        self.with_lock(|inner| inner.submissions.iter().find(|sub| sub.id == id).cloned())
    }

    /// Resolves the merchant's latest submission.
    fn latest(&self, merchant_id: MerchantId) -> Result<Option<Submission>> {
        self.with_lock(|inner| select_latest(&inner.submissions, merchant_id).cloned())
    }

    /// Applies a review transition in place.
    fn review(&self, id: SubmissionId, update: StatusUpdate) -> Result<Submission> {
        self.with_lock(|inner| {
            let submission = inner
                .submissions
                .iter_mut()
                .find(|sub| sub.id == id)
                .ok_or_else(|| submission_not_found(id))?;
            submission.apply_review(update, Utc::now());
            Ok(submission.clone())
        })?
    }

    /// Lists submissions in a status.
    fn by_status(&self, status: KycStatus, limit: PageLimit) -> Result<Vec<Submission>> {
        self.with_lock(|inner| select_by_status(&inner.submissions, status, limit))
    }
}

/// Wraps a mutex poison error.
fn lock_error<T>(err: &std::sync::PoisonError<T>) -> KycError {
    KycError::Storage(err.to_string().into())
}

// ── BlockingStorage implementation ──────────────────────────────────────

#[cfg(feature = "blocking")]
impl super::BlockingStorage for InMemoryStorage {
    #[inline]
    fn create(&self, submission: NewSubmission) -> Result<Submission> {
        self.create_submission(submission)
    }

    #[inline]
    fn submission(&self, id: SubmissionId) -> Result<Option<Submission>> {
        self.find(id)
    }

    #[inline]
    fn latest_for_merchant(&self, merchant_id: MerchantId) -> Result<Option<Submission>> {
        self.latest(merchant_id)
    }

    #[inline]
    fn update_status(&self, id: SubmissionId, update: StatusUpdate) -> Result<Submission> {
        self.review(id, update)
    }

    #[inline]
    fn list_by_status(&self, status: KycStatus, limit: PageLimit) -> Result<Vec<Submission>> {
        self.by_status(status, limit)
    }
}

// ── Storage (async) implementation ──────────────────────────────────────

#[cfg(feature = "async")]
impl super::Storage for InMemoryStorage {
    #[inline]
    fn create(&self, submission: NewSubmission) -> impl Future<Output = Result<Submission>> + Send {
        future::ready(self.create_submission(submission))
    }

    #[inline]
    fn submission(
        &self,
        id: SubmissionId,
    ) -> impl Future<Output = Result<Option<Submission>>> + Send {
        future::ready(self.find(id))
    }

    #[inline]
    fn latest_for_merchant(
        &self,
        merchant_id: MerchantId,
    ) -> impl Future<Output = Result<Option<Submission>>> + Send {
        future::ready(self.latest(merchant_id))
    }

    #[inline]
    fn update_status(
        &self,
        id: SubmissionId,
        update: StatusUpdate,
    ) -> impl Future<Output = Result<Submission>> + Send {
        future::ready(self.review(id, update))
    }

    #[inline]
    fn list_by_status(
        &self,
        status: KycStatus,
        limit: PageLimit,
    ) -> impl Future<Output = Result<Vec<Submission>>> + Send {
        future::ready(self.by_status(status, limit))
    }
}
