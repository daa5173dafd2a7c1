//! JSON-file-based storage backend.
//!
//! Stores every submission in a single JSON document under a configurable
//! directory (default: `$XDG_DATA_HOME/merchant-kyc/`).

use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use serde::Serialize;

#[cfg(feature = "async")]
use core::future::Future;

use super::{next_id, select_by_status, select_latest, submission_not_found};
use crate::error::{KycError, Result};
use crate::models::{
    KycStatus, MerchantId, NewSubmission, PageLimit, StatusUpdate, Submission, SubmissionId,
};

/// Application name used for the XDG data directory.
const APP_NAME: &str = "merchant-kyc";

/// File holding every submission.
const SUBMISSIONS_FILE: &str = "submissions.json";
/// Sentinel file used for cross-process file locking.
const LOCK_FILE: &str = "storage.lock";

/// File-backed storage that persists submissions as JSON.
///
/// # Concurrency
///
/// Thread safety within a single process is provided by an in-process
/// [`Mutex`]. Cross-process safety is achieved via an advisory file lock
/// on `storage.lock` (using [`std::fs::File::lock`] /
/// [`std::fs::File::lock_shared`]).
///
/// Read operations acquire a shared lock (allowing concurrent readers),
/// while write operations acquire an exclusive lock. Each write replaces
/// the document atomically (write-to-tmp then rename), so a submission is
/// either fully created or updated, or not at all.
///
/// # File layout
///
/// ```text
/// <dir>/
///   storage.lock          (cross-process lock sentinel)
///   submissions.json
/// ```
#[derive(Debug)]
pub struct FileStorage {
    /// Root directory containing the JSON document.
    dir: PathBuf,
    /// Mutex serializing concurrent in-process access.
    lock: Mutex<()>,
    /// Sentinel file for cross-process advisory locking.
    lock_file: fs::File,
}

impl FileStorage {
    /// Creates a new file storage rooted at the given directory.
    ///
    /// Creates the directory (and parents) if it does not exist. Also
    /// opens (or creates) the `storage.lock` sentinel file used for
    /// cross-process advisory locking.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the lock
    /// file cannot be opened.
    #[inline]
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).map_err(storage_io_error)?;
        let lock_file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(dir.join(LOCK_FILE))
            .map_err(storage_io_error)?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
            lock_file,
        })
    }

    /// Returns the default XDG-compliant data directory for this application.
    ///
    /// On Linux: `$XDG_DATA_HOME/merchant-kyc/` (typically
    /// `~/.local/share/merchant-kyc/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the platform data directory cannot be determined.
    #[inline]
    pub fn default_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|data_path| data_path.join(APP_NAME))
            .ok_or_else(|| {
                KycError::Storage("could not determine platform data directory".into())
            })
    }

    // ── Private helpers ─────────────────────────────────────────────

    /// Returns the full path for a given file name.
    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Acquires an in-process mutex guard and a shared (read) file lock,
    /// executes `op`, then releases the file lock.
    fn with_shared_lock<R, F: FnOnce() -> Result<R>>(&self, op: F) -> Result<R> {
        let _guard: MutexGuard<'_, ()> = self.lock.lock().map_err(|err| lock_poison_error(&err))?;
        self.lock_file.lock_shared().map_err(storage_io_error)?;
        let result = op();
        // Only surface the unlock error when the operation succeeded;
        // otherwise the original error is more useful.
        if let Err(err) = self.lock_file.unlock()
            && result.is_ok()
        {
            return Err(storage_io_error(err));
        }
        result
    }

    /// Acquires an in-process mutex guard and an exclusive (write) file
    /// lock, executes `op`, then releases the file lock.
    fn with_exclusive_lock<R, F: FnOnce() -> Result<R>>(&self, op: F) -> Result<R> {
        let _guard: MutexGuard<'_, ()> = self.lock.lock().map_err(|err| lock_poison_error(&err))?;
        self.lock_file.lock().map_err(storage_io_error)?;
        let result = op();
        if let Err(err) = self.lock_file.unlock()
            && result.is_ok()
        {
            return Err(storage_io_error(err));
        }
        result
    }

    /// Reads every stored submission. Returns an empty `Vec` if the file
    /// does not exist yet.
    fn read_submissions(&self) -> Result<Vec<Submission>> {
        let path = self.path(SUBMISSIONS_FILE);
        match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(KycError::from),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(storage_io_error(err)),
        }
    }

    /// Atomically writes the submissions document (write-to-tmp then rename).
    fn write_submissions<T: Serialize>(&self, items: &[T]) -> Result<()> {
        let path = self.path(SUBMISSIONS_FILE);
        let tmp_path = self.path(&format!("{SUBMISSIONS_FILE}.tmp"));
        let json = serde_json::to_string_pretty(items).map_err(KycError::from)?;
        fs::write(&tmp_path, json).map_err(storage_io_error)?;
        fs::rename(&tmp_path, &path).map_err(storage_io_error)?;
        Ok(())
    }

    /// Appends a new submission under the next free identifier.
    fn create_submission(&self, new: NewSubmission) -> Result<Submission> {
        self.with_exclusive_lock(|| {
            let mut existing = self.read_submissions()?;
            let submission = Submission::create(next_id(&existing), new, Utc::now());
            existing.push(submission.clone());
            self.write_submissions(&existing)?;
            tracing::debug!(submission_id = %submission.id, "stored submission");
            Ok(submission)
        })
    }

    /// Looks up a submission by identifier (with lock).
    fn find(&self, id: SubmissionId) -> Result<Option<Submission>> {
        self.with_shared_lock(|| {
            Ok(self
                .read_submissions()?
                .into_iter()
                .find(|sub| sub.id == id))
        })
    }

    /// Resolves the merchant's latest submission (with lock).
    fn latest(&self, merchant_id: MerchantId) -> Result<Option<Submission>> {
        self.with_shared_lock(|| {
            let existing = self.read_submissions()?;
            Ok(select_latest(&existing, merchant_id).cloned())
        })
    }

    /// Applies a review transition and rewrites the document (with lock).
    fn review(&self, id: SubmissionId, update: StatusUpdate) -> Result<Submission> {
        self.with_exclusive_lock(|| {
            let mut existing = self.read_submissions()?;
            let submission = existing
                .iter_mut()
                .find(|sub| sub.id == id)
                .ok_or_else(|| submission_not_found(id))?;
            submission.apply_review(update, Utc::now());
            let updated = submission.clone();
            self.write_submissions(&existing)?;
            Ok(updated)
        })
    }

    /// Lists submissions in a status (with lock).
    fn by_status(&self, status: KycStatus, limit: PageLimit) -> Result<Vec<Submission>> {
        self.with_shared_lock(|| {
            let existing = self.read_submissions()?;
            Ok(select_by_status(&existing, status, limit))
        })
    }
}

// ── Free-standing helpers ───────────────────────────────────────────────

/// Wraps an I/O error into a [`KycError::Storage`].
fn storage_io_error(err: std::io::Error) -> KycError {
    KycError::Storage(Box::new(err))
}

/// Wraps a mutex poison error into a [`KycError::Storage`].
fn lock_poison_error<T>(err: &std::sync::PoisonError<T>) -> KycError {
    KycError::Storage(err.to_string().into())
}

// ── BlockingStorage implementation ──────────────────────────────────────

#[cfg(feature = "blocking")]
impl super::BlockingStorage for FileStorage {
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
impl super::Storage for FileStorage {
    #[inline]
    fn create(&self, submission: NewSubmission) -> impl Future<Output = Result<Submission>> + Send {
        core::future::ready(self.create_submission(submission))
    }

    #[inline]
    fn submission(
        &self,
        id: SubmissionId,
    ) -> impl Future<Output = Result<Option<Submission>>> + Send {
        core::future::ready(self.find(id))
    }

    #[inline]
    fn latest_for_merchant(
        &self,
        merchant_id: MerchantId,
    ) -> impl Future<Output = Result<Option<Submission>>> + Send {
        core::future::ready(self.latest(merchant_id))
    }

    #[inline]
    fn update_status(
        &self,
        id: SubmissionId,
        update: StatusUpdate,
    ) -> impl Future<Output = Result<Submission>> + Send {
        core::future::ready(self.review(id, update))
    }

    #[inline]
    fn list_by_status(
        &self,
        status: KycStatus,
        limit: PageLimit,
    ) -> impl Future<Output = Result<Vec<Submission>>> + Send {
        core::future::ready(self.by_status(status, limit))
    }
}
