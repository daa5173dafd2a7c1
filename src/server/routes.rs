//! Route handlers.
//!
//! - POST `/kyc/submit`: store a submission
//! - GET  `/kyc/status/{merchant_id}`: current status of a merchant
//! - POST `/kyc/update`: review the merchant's latest submission
//! - GET  `/kyc/pending`: pending submissions
//! - GET  `/kyc/list`: submissions in any status
//! - POST `/audit`, GET `/audit`: audit trail
//! - GET  `/health/liveness`: liveness probe

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState};
use crate::audit::{AuditEvent, AuditRecord};
use crate::models::{
    KycStatus, MerchantId, PageLimit, ReviewRequest, ReviewerId, StatusList, StatusView,
    SubmissionId, SubmissionReceipt, SubmissionRequest,
};
use crate::storage::Storage;

/// Status reported for merchants that never submitted.
const NOT_STARTED: &str = "not_started";

/// Acknowledgement attached to a successful review.
const STATUS_UPDATED: &str = "KYC status updated successfully";

/// Query parameters of `/kyc/pending` and `GET /audit`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct LimitQuery {
    /// Requested page size; unparseable values fall back to the maximum.
    limit: Option<String>,
}

/// Query parameters of `/kyc/list`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct ListQuery {
    /// Status filter; defaults to `pending`.
    status: Option<String>,
    /// Requested page size; unparseable values fall back to the maximum.
    limit: Option<String>,
}

/// Body returned for a merchant with no submission.
#[derive(Debug, Serialize)]
struct NotStarted {
    /// Merchant that was looked up.
    merchant_id: MerchantId,
    /// Always `not_started`.
    status: &'static str,
    /// Human-readable explanation.
    message: &'static str,
}

/// Body returned after a review.
///
/// Unlike [`StatusView`], the review fields are always present and read
/// `null` when unset.
#[derive(Debug, Serialize)]
pub(super) struct ReviewAck {
    /// Merchant that was reviewed.
    merchant_id: MerchantId,
    /// Submission the review was applied to.
    submission_id: SubmissionId,
    /// The new status.
    status: KycStatus,
    /// Reviewer, if one was given.
    reviewer_id: Option<ReviewerId>,
    /// Review notes, if any were given.
    review_notes: Option<String>,
    /// When the review was applied.
    reviewed_at: Option<DateTime<Utc>>,
    /// Human-readable acknowledgement.
    message: &'static str,
}

impl From<StatusView> for ReviewAck {
    #[inline]
    fn from(view: StatusView) -> Self {
        Self {
            merchant_id: view.merchant_id,
            submission_id: view.submission_id,
            status: view.status,
            reviewer_id: view.reviewer_id,
            review_notes: view.review_notes,
            reviewed_at: view.reviewed_at,
            message: STATUS_UPDATED,
        }
    }
}

/// Body returned by `GET /audit`.
#[derive(Debug, Serialize)]
pub(super) struct AuditList {
    /// Most recent records, oldest first.
    entries: Vec<AuditRecord>,
    /// Number of records.
    total: usize,
}

/// Turns a raw `limit` parameter into the value handed to the engine.
///
/// Anything that is not an integer becomes `0`, which the engine clamps
/// to the maximum page size.
fn parse_limit(raw: Option<&str>) -> i64 {
    raw.and_then(|value| value.trim().parse().ok()).unwrap_or(0)
}

/// `POST /kyc/submit`
pub(super) async fn submit<S: Storage>(
    State(state): State<AppState<S>>,
    body: Result<Json<SubmissionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmissionReceipt>), ApiError> {
    let Json(request) = body?;
    let receipt = state.engine().submit(&request).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// `GET /kyc/status/{merchant_id}`
pub(super) async fn status<S: Storage>(
    State(state): State<AppState<S>>,
    merchant_id: Result<Path<MerchantId>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(merchant_id) = merchant_id?;
    let response = match state.engine().status(merchant_id).await? {
        Some(view) => Json(view).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(NotStarted {
                merchant_id,
                status: NOT_STARTED,
                message: "No KYC submission found",
            }),
        )
            .into_response(),
    };
    Ok(response)
}

/// `POST /kyc/update`
pub(super) async fn update<S: Storage>(
    State(state): State<AppState<S>>,
    body: Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<Json<ReviewAck>, ApiError> {
    let Json(request) = body?;
    let view = state.engine().review(&request).await?;
    Ok(Json(ReviewAck::from(view)))
}

/// `GET /kyc/pending`
pub(super) async fn pending<S: Storage>(
    State(state): State<AppState<S>>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> Result<Json<StatusList>, ApiError> {
    let Query(params) = query?;
    let list = state
        .engine()
        .list_by_status(KycStatus::Pending.as_str(), parse_limit(params.limit.as_deref()))
        .await?;
    Ok(Json(list))
}

/// `GET /kyc/list`
pub(super) async fn list<S: Storage>(
    State(state): State<AppState<S>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<StatusList>, ApiError> {
    let Query(params) = query?;
    let status = params
        .status
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(KycStatus::Pending.as_str());
    let list = state
        .engine()
        .list_by_status(status, parse_limit(params.limit.as_deref()))
        .await?;
    Ok(Json(list))
}

/// `POST /audit`
///
/// Fills in the client IP from `X-Forwarded-For` when the caller left it
/// empty.
pub(super) async fn record_audit<S: Storage>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    body: Result<Json<AuditEvent>, JsonRejection>,
) -> Result<(StatusCode, Json<AuditRecord>), ApiError> {
    let Json(mut event) = body?;
    if event.ip.trim().is_empty()
        && let Some(forwarded) = headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
    {
        forwarded.trim().clone_into(&mut event.ip);
    }
    let record = state.audit().record(event)?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /audit`
pub(super) async fn audit_entries<S: Storage>(
    State(state): State<AppState<S>>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> Result<Json<AuditList>, ApiError> {
    let Query(params) = query?;
    let limit = PageLimit::new(parse_limit(params.limit.as_deref()));
    let entries = state.audit().entries(limit)?;
    Ok(Json(AuditList {
        total: entries.len(),
        entries,
    }))
}

/// `GET /health/liveness`
pub(super) async fn liveness() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_limit_falls_back_to_zero() {
        assert_eq!(parse_limit(None), 0);
        assert_eq!(parse_limit(Some("abc")), 0);
        assert_eq!(parse_limit(Some(" 25 ")), 25);
        assert_eq!(parse_limit(Some("-4")), -4);
    }

    #[test]
    fn review_ack_always_carries_review_fields() {
        let view = StatusView {
            merchant_id: MerchantId::new(42),
            submission_id: SubmissionId::new(1),
            status: KycStatus::Approved,
            submitted_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            reviewed_at: None,
            reviewer_id: None,
            review_notes: None,
        };
        let value = serde_json::to_value(ReviewAck::from(view)).unwrap();
        assert_eq!(value["merchant_id"], 42);
        assert_eq!(value["submission_id"], 1);
        assert_eq!(value["status"], "approved");
        assert_eq!(value["message"], STATUS_UPDATED);
        for key in ["reviewer_id", "review_notes", "reviewed_at"] {
            assert!(value.get(key).is_some_and(serde_json::Value::is_null), "{key}");
        }
        assert!(value.get("submitted_at").is_none());
    }

    #[test]
    fn review_ack_copies_review_stamp() {
        let reviewed = DateTime::from_timestamp(1_700_000_100, 0).unwrap();
        let view = StatusView {
            merchant_id: MerchantId::new(42),
            submission_id: SubmissionId::new(3),
            status: KycStatus::Rejected,
            submitted_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            reviewed_at: Some(reviewed),
            reviewer_id: Some(ReviewerId::new(7)),
            review_notes: Some("missing BVN".to_owned()),
        };
        let value = serde_json::to_value(ReviewAck::from(view)).unwrap();
        assert_eq!(value["reviewer_id"], 7);
        assert_eq!(value["review_notes"], "missing BVN");
        assert_eq!(value["reviewed_at"], serde_json::to_value(reviewed).unwrap());
    }
}
