//! HTTP client for the merchant directory.
//!
//! The directory keeps a denormalized copy of each merchant's KYC status.
//! This client pushes status changes to it. Both async and blocking client
//! variants are provided behind feature flags.

use core::time::Duration;

use serde::Serialize;

use crate::models::{KycStatus, MerchantId};

/// Default base URL of the merchant directory service.
pub const DEFAULT_DIRECTORY_URL: &str = "http://merchant-service:7002";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Body of a KYC status push.
#[derive(Debug, Serialize)]
struct KycStatusBody {
    /// New status value.
    kyc_status: KycStatus,
}

/// Returns the status-update URL for a merchant.
fn kyc_status_url(base_url: &str, merchant_id: MerchantId) -> String {
    format!(
        "{}/merchants/{merchant_id}/kyc-status",
        base_url.trim_end_matches('/')
    )
}

/// Generates a directory client (async or blocking) with builder, methods, and tests.
macro_rules! define_client {
    (
        client_name: $client:ident,
        builder_name: $builder:ident,
        http_type: $http_type:ty,
        client_doc: $client_doc:expr,
        builder_doc: $builder_doc:expr,
        $(async_kw: $async_kw:tt,)?
        $(await_kw: $await_ext:tt,)?
    ) => {
        #[doc = $builder_doc]
        #[derive(Debug)]
        pub struct $builder {
            /// Base URL override.
            base_url: Option<String>,
            /// Per-request timeout override.
            timeout: Option<Duration>,
        }

        impl $builder {
            /// Overrides the base URL (useful for testing with a mock server).
            #[inline]
            #[must_use]
            pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
                self.base_url = Some(url.into());
                self
            }

            /// Overrides the per-request timeout.
            #[inline]
            #[must_use]
            pub const fn timeout(mut self, timeout: Duration) -> Self {
                self.timeout = Some(timeout);
                self
            }

            /// Builds the client.
            ///
            /// # Errors
            ///
            /// Returns [`KycError::Http`] if the HTTP client fails to build.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub fn build(self) -> Result<$client> {
                let base_url = self
                    .base_url
                    .unwrap_or_else(|| DEFAULT_DIRECTORY_URL.to_owned());
                let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
                tracing::debug!(base_url = %base_url, ?timeout, "building directory client");
                let http = <$http_type>::builder().timeout(timeout).build()?;

                Ok($client { http, base_url })
            }
        }

        #[doc = $client_doc]
        #[derive(Debug)]
        pub struct $client {
            /// Underlying HTTP client.
            http: $http_type,
            /// Directory base URL.
            base_url: String,
        }

        impl $client {
            /// Creates a new builder for configuring the client.
            #[inline]
            #[must_use]
            pub const fn builder() -> $builder {
                $builder {
                    base_url: None,
                    timeout: None,
                }
            }

            /// Returns the configured base URL.
            #[inline]
            #[must_use]
            pub fn base_url(&self) -> &str {
                &self.base_url
            }

            /// Pushes a merchant's KYC status via
            /// `PUT /merchants/{merchant_id}/kyc-status`.
            ///
            /// A `200 OK` or `204 No Content` answer counts as success.
            ///
            /// # Errors
            ///
            /// Returns [`KycError::Http`] if the request cannot be sent or
            /// times out, and [`KycError::Directory`] for any other status.
            #[tracing::instrument(skip_all, fields(merchant_id = %merchant_id, status = %status))]
            pub $($async_kw)? fn update_kyc_status(
                &self,
                merchant_id: MerchantId,
                status: KycStatus,
            ) -> Result<()> {
                let url = kyc_status_url(&self.base_url, merchant_id);
                tracing::trace!(url = %url, "sending PUT request");
                let response = self
                    .http
                    .put(&url)
                    .header(CONTENT_TYPE, "application/json")
                    .json(&KycStatusBody { kyc_status: status })
                    .send()
                    $( .$await_ext )?
                    ?;

                let code = response.status();
                tracing::debug!(status = %code, "received response");
                if code == StatusCode::OK || code == StatusCode::NO_CONTENT {
                    Ok(())
                } else {
                    let message = response
                        .text()
                        $( .$await_ext )?
                        .unwrap_or_else(|_| "unknown error".to_owned());
                    Err(KycError::Directory {
                        status: code.as_u16(),
                        message,
                    })
                }
            }
        }

    };
}

#[cfg(feature = "async")]
mod async_client {
    //! Async HTTP client for the merchant directory.

    use core::time::Duration;

    use reqwest::StatusCode;
    use reqwest::header::CONTENT_TYPE;

    use super::{DEFAULT_DIRECTORY_URL, DEFAULT_TIMEOUT, KycStatusBody, kyc_status_url};
    use crate::error::{KycError, Result};
    use crate::models::{KycStatus, MerchantId};

    define_client! {
        client_name: DirectoryClient,
        builder_name: DirectoryClientBuilder,
        http_type: reqwest::Client,
        client_doc: "Async client for the merchant directory.\n\nUse [`DirectoryClient::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`DirectoryClient`].",
        async_kw: async,
        await_kw: await,
    }
}

#[cfg(feature = "blocking")]
mod blocking_client {
    //! Blocking (synchronous) HTTP client for the merchant directory.

    use core::time::Duration;

    use reqwest::StatusCode;
    use reqwest::header::CONTENT_TYPE;

    use super::{DEFAULT_DIRECTORY_URL, DEFAULT_TIMEOUT, KycStatusBody, kyc_status_url};
    use crate::error::{KycError, Result};
    use crate::models::{KycStatus, MerchantId};

    define_client! {
        client_name: DirectoryBlockingClient,
        builder_name: DirectoryBlockingClientBuilder,
        http_type: reqwest::blocking::Client,
        client_doc: "Blocking (synchronous) client for the merchant directory.\n\nUse [`DirectoryBlockingClient::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`DirectoryBlockingClient`].",
    }
}

#[cfg(feature = "async")]
pub use async_client::{DirectoryClient, DirectoryClientBuilder};
#[cfg(feature = "blocking")]
pub use blocking_client::{DirectoryBlockingClient, DirectoryBlockingClientBuilder};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_url_joins_path() {
        assert_eq!(
            kyc_status_url("http://merchant-service:7002", MerchantId::new(42)),
            "http://merchant-service:7002/merchants/42/kyc-status"
        );
        assert_eq!(
            kyc_status_url("http://localhost:9000/", MerchantId::new(7)),
            "http://localhost:9000/merchants/7/kyc-status"
        );
    }

    #[test]
    fn body_serializes_status_lowercase() {
        let body = serde_json::to_value(KycStatusBody {
            kyc_status: KycStatus::Approved,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"kyc_status": "approved"}));
    }
}
