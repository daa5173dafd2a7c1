//! Merchant directory sync tests.
//!
//! Runs the directory clients and the lifecycle engine against a wiremock
//! server standing in for the merchant directory.
#![cfg(feature = "async")]

use core::time::Duration;

use merchant_kyc::client::DirectoryClient;
use merchant_kyc::error::KycError;
use merchant_kyc::kyc::KycService;
use merchant_kyc::models::{KycStatus, MerchantId, ReviewRequest, ReviewerId, SubmissionRequest};
use merchant_kyc::storage::InMemoryStorage;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> DirectoryClient {
    DirectoryClient::builder()
        .base_url(server.uri())
        .timeout(Duration::from_millis(300))
        .build()
        .unwrap()
}

fn engine(server: &MockServer) -> KycService<InMemoryStorage> {
    KycService::builder()
        .storage(InMemoryStorage::new())
        .directory_url(server.uri())
        .timeout(Duration::from_millis(300))
        .build()
        .unwrap()
}

fn submission(merchant: i64) -> SubmissionRequest {
    SubmissionRequest {
        merchant_id: MerchantId::new(merchant),
        business_name: "Acme".to_owned(),
        ..SubmissionRequest::default()
    }
}

/// Mounts a status push expectation for one merchant and status.
async fn expect_push(server: &MockServer, merchant: i64, status: &str, code: u16, times: u64) {
    Mock::given(method("PUT"))
        .and(path(format!("/merchants/{merchant}/kyc-status")))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "kyc_status": status })))
        .respond_with(ResponseTemplate::new(code))
        .expect(times)
        .mount(server)
        .await;
}

// ── Directory client ────────────────────────────────────────────────────

#[tokio::test]
async fn client_accepts_200_and_204() {
    let server = MockServer::start().await;
    expect_push(&server, 42, "approved", 200, 1).await;
    expect_push(&server, 43, "rejected", 204, 1).await;

    let directory = client(&server);
    directory
        .update_kyc_status(MerchantId::new(42), KycStatus::Approved)
        .await
        .unwrap();
    directory
        .update_kyc_status(MerchantId::new(43), KycStatus::Rejected)
        .await
        .unwrap();
}

#[tokio::test]
async fn client_maps_other_statuses_to_directory_error() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/merchants/42/kyc-status"))
        .respond_with(ResponseTemplate::new(503).set_body_string("directory down"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .update_kyc_status(MerchantId::new(42), KycStatus::Pending)
        .await
        .unwrap_err();
    assert!(err.is_network());
    match err {
        KycError::Directory { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "directory down");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn client_treats_created_as_failure() {
    let server = MockServer::start().await;
    expect_push(&server, 42, "pending", 201, 1).await;

    let err = client(&server)
        .update_kyc_status(MerchantId::new(42), KycStatus::Pending)
        .await
        .unwrap_err();
    assert!(matches!(err, KycError::Directory { status: 201, .. }));
}

#[tokio::test]
async fn client_times_out_as_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let err = client(&server)
        .update_kyc_status(MerchantId::new(42), KycStatus::Pending)
        .await
        .unwrap_err();
    assert!(matches!(err, KycError::Http(_)));
    assert!(err.is_network());
}

// ── Engine side effects ─────────────────────────────────────────────────

#[tokio::test]
async fn submit_pushes_pending() {
    let server = MockServer::start().await;
    expect_push(&server, 42, "pending", 204, 1).await;

    let receipt = engine(&server).submit(&submission(42)).await.unwrap();
    assert_eq!(receipt.status, KycStatus::Pending);
}

#[tokio::test]
async fn review_pushes_new_status() {
    let server = MockServer::start().await;
    expect_push(&server, 42, "pending", 200, 1).await;
    expect_push(&server, 42, "rejected", 200, 1).await;

    let kyc = engine(&server);
    let _receipt = kyc.submit(&submission(42)).await.unwrap();
    let view = kyc
        .review(&ReviewRequest {
            merchant_id: MerchantId::new(42),
            status: "REJECTED".to_owned(),
            reviewer_id: Some(ReviewerId::new(7)),
            review_notes: Some("missing BVN".to_owned()),
        })
        .await
        .unwrap();
    assert_eq!(view.status, KycStatus::Rejected);
    assert_eq!(view.review_notes.as_deref(), Some("missing BVN"));
}

#[tokio::test]
async fn directory_failure_does_not_change_outcome() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let kyc = engine(&server);
    let receipt = kyc.submit(&submission(42)).await.unwrap();
    let view = kyc
        .review(&ReviewRequest {
            merchant_id: MerchantId::new(42),
            status: "approved".to_owned(),
            ..ReviewRequest::default()
        })
        .await
        .unwrap();
    assert_eq!(view.submission_id, receipt.submission_id);

    let current = kyc.status(MerchantId::new(42)).await.unwrap().unwrap();
    assert_eq!(current.status, KycStatus::Approved);
}

#[tokio::test]
async fn slow_directory_does_not_change_outcome() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let kyc = engine(&server);
    let receipt = kyc.submit(&submission(42)).await.unwrap();
    let stored = kyc.submission(receipt.submission_id).await.unwrap();
    assert!(stored.is_some());
}

#[tokio::test]
async fn rejected_operations_never_call_directory() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let kyc = engine(&server);
    let mut invalid = submission(42);
    invalid.business_type = "Invalid".to_owned();
    assert!(matches!(
        kyc.submit(&invalid).await,
        Err(KycError::Validation(_))
    ));

    let err = kyc
        .review(&ReviewRequest {
            merchant_id: MerchantId::new(42),
            status: "approved".to_owned(),
            ..ReviewRequest::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, KycError::NotFound(_)));
}

// ── Blocking client ─────────────────────────────────────────────────────

#[cfg(feature = "blocking")]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn blocking_client_pushes_status() {
    use merchant_kyc::client::DirectoryBlockingClient;

    let server = MockServer::start().await;
    expect_push(&server, 42, "approved", 204, 1).await;

    let uri = server.uri();
    let result = tokio::task::spawn_blocking(move || {
        DirectoryBlockingClient::builder()
            .base_url(uri)
            .build()
            .and_then(|directory| {
                directory.update_kyc_status(MerchantId::new(42), KycStatus::Approved)
            })
    })
    .await
    .unwrap();
    result.unwrap();
}
