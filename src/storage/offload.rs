//! Async adapter that runs a blocking backend on tokio's blocking pool.

use core::future::Future;
use std::sync::Arc;

use super::BlockingStorage;
use crate::error::{KycError, Result};
use crate::models::{
    KycStatus, MerchantId, NewSubmission, PageLimit, StatusUpdate, Submission, SubmissionId,
};

/// Exposes a [`BlockingStorage`] as an async [`super::Storage`].
///
/// Every call runs on [`tokio::task::spawn_blocking`], so file I/O and
/// advisory lock waits never stall an async worker thread. Requires a
/// tokio runtime.
///
/// # Examples
///
/// ```no_run
/// use std::path::PathBuf;
///
/// use merchant_kyc::storage::{FileStorage, OffloadedStorage};
///
/// # fn demo() -> merchant_kyc::error::Result<()> {
/// let dir = PathBuf::from("/var/lib/merchant-kyc");
/// let storage = OffloadedStorage::new(FileStorage::new(dir)?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct OffloadedStorage<S> {
    /// Shared backend, cloned into each blocking task.
    inner: Arc<S>,
}

impl<S: BlockingStorage + 'static> OffloadedStorage<S> {
    /// Wraps a blocking backend.
    #[inline]
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Returns the wrapped backend.
    #[inline]
    #[must_use]
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Runs `op` against the backend on the blocking pool.
    async fn offload<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&S) -> Result<T> + Send + 'static,
    {
        let backend = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || op(&backend))
            .await
            .map_err(|err| KycError::Storage(Box::new(err)))?
    }
}

impl<S: BlockingStorage + 'static> super::Storage for OffloadedStorage<S> {
    #[inline]
    fn create(&self, submission: NewSubmission) -> impl Future<Output = Result<Submission>> + Send {
        self.offload(move |store| BlockingStorage::create(store, submission))
    }

    #[inline]
    fn submission(
        &self,
        id: SubmissionId,
    ) -> impl Future<Output = Result<Option<Submission>>> + Send {
        self.offload(move |store| BlockingStorage::submission(store, id))
    }

    #[inline]
    fn latest_for_merchant(
        &self,
        merchant_id: MerchantId,
    ) -> impl Future<Output = Result<Option<Submission>>> + Send {
        self.offload(move |store| BlockingStorage::latest_for_merchant(store, merchant_id))
    }

    #[inline]
    fn update_status(
        &self,
        id: SubmissionId,
        update: StatusUpdate,
    ) -> impl Future<Output = Result<Submission>> + Send {
        self.offload(move |store| BlockingStorage::update_status(store, id, update))
    }

    #[inline]
    fn list_by_status(
        &self,
        status: KycStatus,
        limit: PageLimit,
    ) -> impl Future<Output = Result<Vec<Submission>>> + Send {
        self.offload(move |store| BlockingStorage::list_by_status(store, status, limit))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::mpsc::{self, Receiver};

    use super::*;
    use crate::models::BusinessProfile;
    use crate::storage::{InMemoryStorage, Storage};

    fn new_submission(merchant: i64) -> NewSubmission {
        NewSubmission {
            merchant_id: MerchantId::new(merchant),
            profile: BusinessProfile {
                business_name: "Acme".to_owned(),
                ..BusinessProfile::default()
            },
        }
    }

    /// Backend whose `create` blocks until the test opens the gate.
    #[derive(Debug)]
    struct GatedStorage {
        /// Opened by sending `()`.
        gate: Mutex<Receiver<()>>,
        /// Backend doing the real work.
        inner: InMemoryStorage,
    }

    impl BlockingStorage for GatedStorage {
        fn create(&self, submission: NewSubmission) -> Result<Submission> {
            self.gate.lock().unwrap().recv().unwrap();
            BlockingStorage::create(&self.inner, submission)
        }

        fn submission(&self, id: SubmissionId) -> Result<Option<Submission>> {
            BlockingStorage::submission(&self.inner, id)
        }

        fn latest_for_merchant(&self, merchant_id: MerchantId) -> Result<Option<Submission>> {
            BlockingStorage::latest_for_merchant(&self.inner, merchant_id)
        }

        fn update_status(&self, id: SubmissionId, update: StatusUpdate) -> Result<Submission> {
            BlockingStorage::update_status(&self.inner, id, update)
        }

        fn list_by_status(&self, status: KycStatus, limit: PageLimit) -> Result<Vec<Submission>> {
            BlockingStorage::list_by_status(&self.inner, status, limit)
        }
    }

    #[tokio::test]
    async fn delegates_every_operation() {
        let storage = OffloadedStorage::new(InMemoryStorage::new());
        let created = Storage::create(&storage, new_submission(42)).await.unwrap();
        assert_eq!(created.status, KycStatus::Pending);

        let found = Storage::submission(&storage, created.id).await.unwrap();
        assert_eq!(found.map(|sub| sub.id), Some(created.id));

        let latest = Storage::latest_for_merchant(&storage, MerchantId::new(42))
            .await
            .unwrap();
        assert_eq!(latest.map(|sub| sub.id), Some(created.id));

        let updated = Storage::update_status(
            &storage,
            created.id,
            StatusUpdate {
                status: KycStatus::Approved,
                reviewer_id: None,
                notes: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.status, KycStatus::Approved);
        assert!(updated.review.is_some());

        let approved = Storage::list_by_status(&storage, KycStatus::Approved, PageLimit::default())
            .await
            .unwrap();
        assert_eq!(approved.len(), 1);

        let pending =
            BlockingStorage::list_by_status(storage.get_ref(), KycStatus::Pending, PageLimit::default())
                .unwrap();
        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn propagates_backend_errors() {
        let storage = OffloadedStorage::new(InMemoryStorage::new());
        let err = Storage::update_status(
            &storage,
            SubmissionId::new(9),
            StatusUpdate {
                status: KycStatus::Rejected,
                reviewer_id: None,
                notes: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, KycError::NotFound(_)));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn blocked_backend_does_not_stall_the_runtime() {
        let (open, gate) = mpsc::channel();
        let storage = OffloadedStorage::new(GatedStorage {
            gate: Mutex::new(gate),
            inner: InMemoryStorage::new(),
        });

        // On a single-threaded runtime the second branch can only run if
        // the first one yielded instead of blocking in `recv`.
        let (created, ()) = tokio::join!(Storage::create(&storage, new_submission(7)), async {
            open.send(()).unwrap();
        });
        assert_eq!(created.unwrap().merchant_id, MerchantId::new(7));
    }
}
