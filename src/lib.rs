//! Merchant KYC intake, review and status sync.
//!
//! Merchants submit business and director details for Know-Your-Customer
//! verification; reviewers approve or reject them; every status change is
//! pushed to the merchant directory on a best-effort basis.
//!
//! # Layers
//!
//! - [`models`]: submission records, identifiers and request shapes
//! - [`storage`]: pluggable submission stores (in-memory, JSON file)
//! - [`client`]: merchant directory HTTP client
//! - [`kyc`]: the lifecycle engine tying storage and client together
//! - [`server`]: axum HTTP API (feature `server`)
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "blocking")]
//! # fn demo() -> merchant_kyc::error::Result<()> {
//! use merchant_kyc::kyc::KycServiceBlocking;
//! use merchant_kyc::models::{MerchantId, SubmissionRequest};
//! use merchant_kyc::storage::InMemoryStorage;
//!
//! let engine = KycServiceBlocking::builder()
//!     .storage(InMemoryStorage::new())
//!     .directory_url("http://localhost:7002")
//!     .build()?;
//! let receipt = engine.submit(&SubmissionRequest {
//!     merchant_id: MerchantId::new(42),
//!     business_name: "Acme".to_owned(),
//!     ..SubmissionRequest::default()
//! })?;
//! assert_eq!(receipt.status.as_str(), "pending");
//! # Ok(())
//! # }
//! ```

pub mod audit;
#[cfg(any(feature = "async", feature = "blocking"))]
pub mod client;
#[cfg(any(feature = "async", feature = "blocking"))]
pub mod config;
pub mod error;
#[cfg(any(feature = "async", feature = "blocking"))]
pub mod kyc;
pub mod models;
#[cfg(feature = "server")]
pub mod server;
pub mod storage;
