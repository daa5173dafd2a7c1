//! KYC submission lifecycle engine.
//!
//! Combines a [`Storage`](crate::storage::Storage) /
//! [`BlockingStorage`](crate::storage::BlockingStorage) backend with the
//! merchant directory client. Every successful submission or review is
//! followed by a best-effort status push to the directory; a failed push
//! is logged and never changes the outcome of the primary operation.

use chrono::NaiveDate;

use crate::error::{KycError, Result};
use crate::models::{
    BusinessProfile, BusinessType, IncorporationDatePolicy, KycStatus, MerchantId, NewSubmission,
    ReviewRequest, StatusUpdate, SubmissionRequest,
};

/// Acknowledgement message returned with every accepted submission.
pub const SUBMISSION_RECEIVED: &str = "KYC submission received and is under review";

/// Wire format of `incorporation_date`.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validates and normalizes a raw submission.
///
/// # Errors
///
/// Returns [`KycError::Validation`] if `merchant_id` is zero, the business
/// name is blank, the business type is unknown, or (under
/// [`IncorporationDatePolicy::Strict`]) the incorporation date is
/// malformed.
#[inline]
pub fn validate_submission(
    request: &SubmissionRequest,
    policy: IncorporationDatePolicy,
) -> Result<NewSubmission> {
    if request.merchant_id.is_unset() {
        return Err(KycError::Validation("merchant_id is required".to_owned()));
    }
    let business_name = request.business_name.trim();
    if business_name.is_empty() {
        return Err(KycError::Validation("business_name is required".to_owned()));
    }
    let business_type = BusinessType::normalize(&request.business_type)?;
    let incorporation_date = parse_incorporation_date(&request.incorporation_date, policy)?;

    Ok(NewSubmission {
        merchant_id: request.merchant_id,
        profile: BusinessProfile {
            business_type,
            business_name: business_name.to_owned(),
            cac_number: request.cac_number.clone(),
            tin_number: request.tin_number.clone(),
            business_address: request.business_address.clone(),
            city: request.city.clone(),
            state: request.state.clone(),
            postal_code: request.postal_code.clone(),
            incorporation_date,
            business_category: request.business_category.clone(),
            director_name: request.director_name.clone(),
            director_bvn: request.director_bvn.clone(),
            director_phone: request.director_phone.clone(),
            director_email: request.director_email.clone(),
            documents: request.documents.clone(),
        },
    })
}

/// Parses the optional incorporation date according to `policy`.
fn parse_incorporation_date(
    raw: &str,
    policy: IncorporationDatePolicy,
) -> Result<Option<NaiveDate>> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(None);
    }
    match NaiveDate::parse_from_str(value, DATE_FORMAT) {
        Ok(date) => Ok(Some(date)),
        Err(err) => match policy {
            IncorporationDatePolicy::Lenient => {
                tracing::warn!(value, error = %err, "dropping malformed incorporation_date");
                Ok(None)
            }
            IncorporationDatePolicy::Strict => Err(KycError::Validation(format!(
                "incorporation_date must be YYYY-MM-DD, got '{value}'"
            ))),
        },
    }
}

/// Validates a review request and turns it into a store update.
///
/// A `reviewer_id` of zero and blank notes are treated as absent.
///
/// # Errors
///
/// Returns [`KycError::Validation`] if `merchant_id` is zero or the status
/// is not one of `approved`, `rejected` or `pending`.
#[inline]
pub fn parse_review(request: &ReviewRequest) -> Result<StatusUpdate> {
    if request.merchant_id.is_unset() {
        return Err(KycError::Validation("merchant_id is required".to_owned()));
    }
    if request.status.trim().is_empty() {
        return Err(KycError::Validation("status is required".to_owned()));
    }
    let status: KycStatus = request.status.parse()?;
    let reviewer_id = request
        .reviewer_id
        .filter(|reviewer| *reviewer.as_inner() != 0);
    let notes = request
        .review_notes
        .as_deref()
        .map(str::trim)
        .filter(|notes| !notes.is_empty())
        .map(str::to_owned);
    Ok(StatusUpdate {
        status,
        reviewer_id,
        notes,
    })
}

/// Error returned when a merchant has no submission to review.
fn no_submission(merchant_id: MerchantId) -> KycError {
    KycError::NotFound(format!("no KYC submission found for merchant {merchant_id}"))
}

/// Generates a lifecycle engine (async or blocking).
macro_rules! define_kyc_service {
    (
        service_name: $service:ident,
        builder_name: $builder:ident,
        directory_client: $directory:ty,
        storage_trait: $storage_trait:ident,
        service_doc: $service_doc:expr,
        builder_doc: $builder_doc:expr,
        $(async_kw: $async_kw:tt,)?
        $(await_kw: $await_ext:tt,)?
    ) => {
        #[doc = $builder_doc]
        #[derive(Debug)]
        pub struct $builder<S: $storage_trait> {
            /// Storage backend.
            storage: Option<S>,
            /// Merchant directory base URL override.
            directory_url: Option<String>,
            /// Directory request timeout override.
            timeout: Option<Duration>,
            /// Handling of malformed incorporation dates.
            incorporation_dates: IncorporationDatePolicy,
        }

        impl<S: $storage_trait> $builder<S> {
            /// Sets the storage backend.
            #[inline]
            #[must_use]
            pub fn storage(mut self, storage: S) -> Self {
                self.storage = Some(storage);
                self
            }

            /// Overrides the merchant directory base URL.
            #[inline]
            #[must_use]
            pub fn directory_url<T: Into<String>>(mut self, url: T) -> Self {
                self.directory_url = Some(url.into());
                self
            }

            /// Overrides the directory request timeout.
            #[inline]
            #[must_use]
            pub const fn timeout(mut self, timeout: Duration) -> Self {
                self.timeout = Some(timeout);
                self
            }

            /// Chooses how malformed incorporation dates are handled.
            #[inline]
            #[must_use]
            pub const fn incorporation_dates(mut self, policy: IncorporationDatePolicy) -> Self {
                self.incorporation_dates = policy;
                self
            }

            /// Builds the engine.
            ///
            /// # Errors
            ///
            /// Returns [`KycError::Config`] if no storage was provided.
            /// Returns [`KycError::Http`] if the HTTP client fails to build.
            #[inline]
            pub fn build(self) -> Result<$service<S>> {
                let storage = self.storage.ok_or_else(|| {
                    KycError::Config("storage backend is required".to_owned())
                })?;

                let mut directory_builder = <$directory>::builder();
                if let Some(url) = self.directory_url {
                    directory_builder = directory_builder.base_url(url);
                }
                if let Some(timeout) = self.timeout {
                    directory_builder = directory_builder.timeout(timeout);
                }
                let directory = directory_builder.build()?;

                Ok($service {
                    storage,
                    directory,
                    incorporation_dates: self.incorporation_dates,
                })
            }
        }

        #[doc = $service_doc]
        #[derive(Debug)]
        pub struct $service<S: $storage_trait> {
            /// Storage backend.
            storage: S,
            /// Merchant directory client.
            directory: $directory,
            /// Handling of malformed incorporation dates.
            incorporation_dates: IncorporationDatePolicy,
        }

        impl<S: $storage_trait> $service<S> {
            /// Creates a new builder for configuring the engine.
            #[inline]
            #[must_use]
            pub const fn builder() -> $builder<S> {
                $builder {
                    storage: None,
                    directory_url: None,
                    timeout: None,
                    incorporation_dates: IncorporationDatePolicy::Lenient,
                }
            }

            /// Validates and stores a new submission in `pending` state,
            /// then pushes `pending` to the merchant directory.
            ///
            /// # Errors
            ///
            /// Returns [`KycError::Validation`] for invalid input (nothing
            /// is stored) and a persistence error if the store fails.
            #[tracing::instrument(skip_all, fields(merchant_id = %request.merchant_id))]
            pub $($async_kw)? fn submit(
                &self,
                request: &SubmissionRequest,
            ) -> Result<SubmissionReceipt> {
                let new = validate_submission(request, self.incorporation_dates)?;
                let submission = self.storage.create(new) $( .$await_ext )? ?;
                tracing::info!(submission_id = %submission.id, "kyc submission stored");
                self.notify(submission.merchant_id, submission.status) $( .$await_ext )?;
                Ok(SubmissionReceipt {
                    submission_id: submission.id,
                    status: submission.status,
                    message: SUBMISSION_RECEIVED.to_owned(),
                })
            }

            /// Returns the merchant's current KYC state, read from its
            /// latest submission.
            ///
            /// `Ok(None)` means the merchant never submitted.
            ///
            /// # Errors
            ///
            /// Returns a persistence error if the lookup fails.
            #[inline]
            #[tracing::instrument(skip_all, fields(merchant_id = %merchant_id))]
            pub $($async_kw)? fn status(
                &self,
                merchant_id: MerchantId,
            ) -> Result<Option<StatusView>> {
                let latest = self.storage.latest_for_merchant(merchant_id) $( .$await_ext )? ?;
                Ok(latest.as_ref().map(StatusView::from))
            }

            /// Sets the status of the merchant's latest submission and
            /// pushes the new status to the merchant directory.
            ///
            /// Every call stamps fresh review metadata, even when the
            /// status does not change.
            ///
            /// # Errors
            ///
            /// Returns [`KycError::Validation`] for an unknown status,
            /// [`KycError::NotFound`] if the merchant has no submission,
            /// and a persistence error if the store fails.
            #[tracing::instrument(skip_all, fields(merchant_id = %request.merchant_id))]
            pub $($async_kw)? fn review(&self, request: &ReviewRequest) -> Result<StatusView> {
                let update = parse_review(request)?;
                let latest = self
                    .storage
                    .latest_for_merchant(request.merchant_id)
                    $( .$await_ext )?
                    ?
                    .ok_or_else(|| no_submission(request.merchant_id))?;
                let updated = self
                    .storage
                    .update_status(latest.id, update)
                    $( .$await_ext )?
                    ?;
                tracing::info!(
                    submission_id = %updated.id,
                    status = %updated.status,
                    "kyc submission reviewed"
                );
                self.notify(updated.merchant_id, updated.status) $( .$await_ext )?;
                Ok(StatusView::from(&updated))
            }

            /// Lists submissions in the given status, most recent first.
            ///
            /// `limit` is clamped through [`PageLimit::new`].
            ///
            /// # Errors
            ///
            /// Returns [`KycError::Validation`] for an unknown status and a
            /// persistence error if the store fails.
            #[inline]
            #[tracing::instrument(skip_all, fields(status = %status, limit = limit))]
            pub $($async_kw)? fn list_by_status(&self, status: &str, limit: i64) -> Result<StatusList> {
                let wanted: KycStatus = status.parse()?;
                let submissions = self
                    .storage
                    .list_by_status(wanted, PageLimit::new(limit))
                    $( .$await_ext )?
                    ?;
                Ok(StatusList::from_submissions(&submissions))
            }

            /// Returns the full stored record of a submission.
            ///
            /// # Errors
            ///
            /// Returns a persistence error if the lookup fails.
            #[inline]
            pub $($async_kw)? fn submission(&self, id: SubmissionId) -> Result<Option<Submission>> {
                self.storage.submission(id) $( .$await_ext )?
            }

            /// Returns a reference to the storage backend.
            #[inline]
            #[must_use]
            pub const fn storage(&self) -> &S {
                &self.storage
            }

            /// Returns a reference to the merchant directory client.
            #[inline]
            #[must_use]
            pub const fn directory(&self) -> &$directory {
                &self.directory
            }

            /// Returns the configured incorporation date policy.
            #[inline]
            #[must_use]
            pub const fn incorporation_dates(&self) -> IncorporationDatePolicy {
                self.incorporation_dates
            }

            /// Pushes a status to the merchant directory, logging and
            /// discarding any failure.
            $($async_kw)? fn notify(&self, merchant_id: MerchantId, status: KycStatus) {
                match self.directory.update_kyc_status(merchant_id, status) $( .$await_ext )? {
                    Ok(()) => tracing::debug!(%merchant_id, %status, "merchant directory updated"),
                    Err(err) => tracing::warn!(
                        %merchant_id,
                        %status,
                        error = %err,
                        "failed to sync kyc status to merchant directory"
                    ),
                }
            }
        }
    };
}

// ── Async variant ───────────────────────────────────────────────────────

#[cfg(feature = "async")]
mod async_kyc {
    //! Async lifecycle engine.

    use core::time::Duration;

    use crate::client::DirectoryClient;
    use crate::error::{KycError, Result};
    use crate::models::{
        IncorporationDatePolicy, KycStatus, MerchantId, PageLimit, ReviewRequest, StatusList,
        StatusView, Submission, SubmissionId, SubmissionReceipt, SubmissionRequest,
    };
    use crate::storage::Storage;

    use super::{SUBMISSION_RECEIVED, no_submission, parse_review, validate_submission};

    define_kyc_service! {
        service_name: KycService,
        builder_name: KycServiceBuilder,
        directory_client: DirectoryClient,
        storage_trait: Storage,
        service_doc: "Async KYC lifecycle engine.\n\nUse [`KycService::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`KycService`].",
        async_kw: async,
        await_kw: await,
    }
}

// ── Blocking variant ────────────────────────────────────────────────────

#[cfg(feature = "blocking")]
mod blocking_kyc {
    //! Blocking lifecycle engine.

    use core::time::Duration;

    use crate::client::DirectoryBlockingClient;
    use crate::error::{KycError, Result};
    use crate::models::{
        IncorporationDatePolicy, KycStatus, MerchantId, PageLimit, ReviewRequest, StatusList,
        StatusView, Submission, SubmissionId, SubmissionReceipt, SubmissionRequest,
    };
    use crate::storage::BlockingStorage;

    use super::{SUBMISSION_RECEIVED, no_submission, parse_review, validate_submission};

    define_kyc_service! {
        service_name: KycServiceBlocking,
        builder_name: KycServiceBlockingBuilder,
        directory_client: DirectoryBlockingClient,
        storage_trait: BlockingStorage,
        service_doc: "Blocking KYC lifecycle engine.\n\nUse [`KycServiceBlocking::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`KycServiceBlocking`].",
    }
}

#[cfg(feature = "async")]
pub use async_kyc::{KycService, KycServiceBuilder};
#[cfg(feature = "blocking")]
pub use blocking_kyc::{KycServiceBlocking, KycServiceBlockingBuilder};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReviewerId;

    fn request(merchant: i64, name: &str, business_type: &str) -> SubmissionRequest {
        SubmissionRequest {
            merchant_id: MerchantId::new(merchant),
            business_name: name.to_owned(),
            business_type: business_type.to_owned(),
            ..SubmissionRequest::default()
        }
    }

    fn review(merchant: i64, status: &str) -> ReviewRequest {
        ReviewRequest {
            merchant_id: MerchantId::new(merchant),
            status: status.to_owned(),
            ..ReviewRequest::default()
        }
    }

    #[test]
    fn empty_business_type_defaults_to_registered() {
        let new = validate_submission(&request(42, "Acme", ""), IncorporationDatePolicy::Lenient)
            .unwrap();
        assert_eq!(new.profile.business_type, BusinessType::Registered);
        assert_eq!(new.merchant_id, MerchantId::new(42));
    }

    #[test]
    fn business_type_is_normalized() {
        let new = validate_submission(
            &request(42, "Acme", "  StartUp "),
            IncorporationDatePolicy::Lenient,
        )
        .unwrap();
        assert_eq!(new.profile.business_type, BusinessType::Startup);
    }

    #[test]
    fn unknown_business_type_is_rejected() {
        let err = validate_submission(
            &request(42, "Acme", "Invalid"),
            IncorporationDatePolicy::Lenient,
        )
        .unwrap_err();
        assert!(matches!(err, KycError::Validation(_)));
    }

    #[test]
    fn zero_merchant_is_rejected() {
        let err = validate_submission(&request(0, "Acme", ""), IncorporationDatePolicy::Lenient)
            .unwrap_err();
        assert!(err.to_string().contains("merchant_id is required"));
    }

    #[test]
    fn blank_business_name_is_rejected() {
        let err = validate_submission(&request(42, "   ", ""), IncorporationDatePolicy::Lenient)
            .unwrap_err();
        assert!(err.to_string().contains("business_name is required"));
    }

    #[test]
    fn well_formed_date_is_parsed() {
        let mut req = request(42, "Acme", "");
        req.incorporation_date = "2019-03-01".to_owned();
        let new = validate_submission(&req, IncorporationDatePolicy::Strict).unwrap();
        assert_eq!(
            new.profile.incorporation_date,
            NaiveDate::from_ymd_opt(2019, 3, 1)
        );
    }

    #[test]
    fn malformed_date_depends_on_policy() {
        let mut req = request(42, "Acme", "");
        req.incorporation_date = "01/03/2019".to_owned();

        let lenient = validate_submission(&req, IncorporationDatePolicy::Lenient).unwrap();
        assert!(lenient.profile.incorporation_date.is_none());

        let err = validate_submission(&req, IncorporationDatePolicy::Strict).unwrap_err();
        assert!(matches!(err, KycError::Validation(_)));
    }

    #[test]
    fn documents_are_carried_over() {
        let mut req = request(42, "Acme", "");
        let _previous = req
            .documents
            .insert("utility_bill".to_owned(), "https://cdn/bill.pdf".to_owned());
        let new = validate_submission(&req, IncorporationDatePolicy::Lenient).unwrap();
        assert_eq!(new.profile.documents, req.documents);
    }

    #[test]
    fn review_status_is_case_insensitive() {
        let update = parse_review(&review(42, " REJECTED ")).unwrap();
        assert_eq!(update.status, KycStatus::Rejected);
    }

    #[test]
    fn review_rejects_unknown_status() {
        let err = parse_review(&review(42, "archived")).unwrap_err();
        assert!(err.to_string().contains("invalid status"));
        assert!(parse_review(&review(42, "")).is_err());
        assert!(parse_review(&review(0, "approved")).is_err());
    }

    #[test]
    fn review_treats_zero_reviewer_and_blank_notes_as_absent() {
        let mut req = review(42, "approved");
        req.reviewer_id = Some(ReviewerId::new(0));
        req.review_notes = Some("   ".to_owned());
        let update = parse_review(&req).unwrap();
        assert!(update.reviewer_id.is_none());
        assert!(update.notes.is_none());

        req.reviewer_id = Some(ReviewerId::new(7));
        req.review_notes = Some("missing BVN".to_owned());
        let update = parse_review(&req).unwrap();
        assert_eq!(update.reviewer_id, Some(ReviewerId::new(7)));
        assert_eq!(update.notes.as_deref(), Some("missing BVN"));
    }

    #[cfg(feature = "blocking")]
    mod blocking {
        use std::time::Duration;

        use chrono::Utc;

        use super::*;
        use crate::models::SubmissionId;
        use crate::storage::{BlockingStorage, InMemoryStorage};

        /// Address nothing listens on, so every directory push fails fast.
        const UNREACHABLE: &str = "http://127.0.0.1:9";

        fn service() -> KycServiceBlocking<InMemoryStorage> {
            KycServiceBlocking::builder()
                .storage(InMemoryStorage::new())
                .directory_url(UNREACHABLE)
                .timeout(Duration::from_millis(200))
                .build()
                .unwrap()
        }

        #[test]
        fn builder_requires_storage() {
            let result = KycServiceBlocking::<InMemoryStorage>::builder().build();
            assert!(matches!(result, Err(KycError::Config(_))));
        }

        #[test]
        fn builder_defaults_to_lenient_dates() {
            let engine = KycServiceBlocking::builder()
                .storage(InMemoryStorage::new())
                .build()
                .unwrap();
            assert_eq!(engine.incorporation_dates(), IncorporationDatePolicy::Lenient);
            assert_eq!(engine.directory().base_url(), crate::client::DEFAULT_DIRECTORY_URL);
        }

        #[test]
        fn submit_survives_directory_outage() {
            let engine = service();
            let receipt = engine.submit(&request(42, "Acme", "")).unwrap();
            assert_eq!(receipt.status, KycStatus::Pending);
            assert_eq!(receipt.message, SUBMISSION_RECEIVED);
            assert_eq!(receipt.submission_id, SubmissionId::new(1));

            let stored = engine.submission(receipt.submission_id).unwrap().unwrap();
            assert_eq!(stored.profile.business_type, BusinessType::Registered);
        }

        #[test]
        fn invalid_submission_writes_nothing() {
            let engine = service();
            assert!(engine.submit(&request(42, "Acme", "Invalid")).is_err());
            assert!(
                engine
                    .storage()
                    .latest_for_merchant(MerchantId::new(42))
                    .unwrap()
                    .is_none()
            );
        }

        #[test]
        fn status_of_unknown_merchant_is_none() {
            let engine = service();
            assert!(engine.status(MerchantId::new(5)).unwrap().is_none());
        }

        #[test]
        fn review_without_submission_is_not_found() {
            let engine = service();
            let err = engine.review(&review(42, "approved")).unwrap_err();
            assert!(matches!(err, KycError::NotFound(_)));
            assert!(err.to_string().contains("merchant 42"));
            assert!(engine.status(MerchantId::new(42)).unwrap().is_none());
        }

        #[test]
        fn submit_review_status_scenario() {
            let engine = service();
            let _receipt = engine.submit(&request(42, "Acme", "")).unwrap();

            let before = engine.status(MerchantId::new(42)).unwrap().unwrap();
            assert_eq!(before.status, KycStatus::Pending);
            assert!(before.reviewed_at.is_none());

            let mut req = review(42, "REJECTED");
            req.reviewer_id = Some(ReviewerId::new(7));
            req.review_notes = Some("missing BVN".to_owned());
            let started = Utc::now();
            let reviewed = engine.review(&req).unwrap();
            let finished = Utc::now();
            assert_eq!(reviewed.status, KycStatus::Rejected);

            let after = engine.status(MerchantId::new(42)).unwrap().unwrap();
            assert_eq!(after, reviewed);
            assert_eq!(after.reviewer_id, Some(ReviewerId::new(7)));
            assert_eq!(after.review_notes.as_deref(), Some("missing BVN"));
            let reviewed_at = after.reviewed_at.unwrap();
            assert!(started <= reviewed_at && reviewed_at <= finished);
        }

        #[test]
        fn review_targets_latest_submission_only() {
            let engine = service();
            let first = engine.submit(&request(42, "Acme v1", "")).unwrap();
            let second = engine.submit(&request(42, "Acme v2", "")).unwrap();

            let view = engine.review(&review(42, "approved")).unwrap();
            assert_eq!(view.submission_id, second.submission_id);

            let untouched = engine.submission(first.submission_id).unwrap().unwrap();
            assert_eq!(untouched.status, KycStatus::Pending);
            assert!(untouched.review.is_none());
        }

        #[test]
        fn repeated_review_restamps() {
            let engine = service();
            let _receipt = engine.submit(&request(42, "Acme", "")).unwrap();
            let first = engine.review(&review(42, "approved")).unwrap();
            let mut again = review(42, "approved");
            again.reviewer_id = Some(ReviewerId::new(9));
            let second = engine.review(&again).unwrap();
            assert_eq!(second.status, KycStatus::Approved);
            assert_eq!(second.reviewer_id, Some(ReviewerId::new(9)));
            assert!(second.reviewed_at >= first.reviewed_at);
        }

        #[test]
        fn list_by_status_clamps_and_filters() {
            let engine = service();
            for merchant in 1..=3 {
                let _receipt = engine.submit(&request(merchant, "M", "")).unwrap();
            }
            let _view = engine.review(&review(2, "approved")).unwrap();

            let pending = engine.list_by_status("pending", 500).unwrap();
            assert_eq!(pending.total, 2);
            assert_eq!(pending.submissions.len(), 2);

            let approved = engine.list_by_status("Approved", 0).unwrap();
            assert_eq!(approved.total, 1);
            assert_eq!(approved.submissions[0].merchant_id, MerchantId::new(2));

            let rejected = engine.list_by_status("rejected", 10).unwrap();
            assert_eq!(rejected.total, 0);

            assert!(matches!(
                engine.list_by_status("archived", 10),
                Err(KycError::Validation(_))
            ));
        }
    }

    #[cfg(feature = "async")]
    mod async_tests {
        use std::time::Duration;

        use super::*;
        use crate::storage::InMemoryStorage;

        fn service() -> KycService<InMemoryStorage> {
            KycService::builder()
                .storage(InMemoryStorage::new())
                .directory_url("http://127.0.0.1:9")
                .timeout(Duration::from_millis(200))
                .incorporation_dates(IncorporationDatePolicy::Strict)
                .build()
                .unwrap()
        }

        #[tokio::test]
        async fn submit_then_review() {
            let engine = service();
            let receipt = engine.submit(&request(42, "Acme", "startup")).await.unwrap();
            assert_eq!(receipt.status, KycStatus::Pending);

            let view = engine.review(&review(42, "approved")).await.unwrap();
            assert_eq!(view.submission_id, receipt.submission_id);
            assert_eq!(view.status, KycStatus::Approved);
            assert!(view.reviewed_at.is_some());
        }

        #[tokio::test]
        async fn strict_policy_rejects_bad_date() {
            let engine = service();
            let mut req = request(42, "Acme", "");
            req.incorporation_date = "2019-13-45".to_owned();
            let err = engine.submit(&req).await.unwrap_err();
            assert!(matches!(err, KycError::Validation(_)));
            assert!(engine.status(MerchantId::new(42)).await.unwrap().is_none());
        }
    }
}
