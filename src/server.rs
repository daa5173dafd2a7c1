//! Intake and review HTTP API.
//!
//! Assembles the KYC routes into a single axum [`Router`] over a shared
//! [`AppState`]. Every request gets an `x-request-id` (kept if the caller
//! sent one, otherwise a fresh UUID) that is echoed on the response, is
//! traced through [`tower_http::trace::TraceLayer`], and a panicking
//! handler answers 500 instead of dropping the connection.
//!
//! | Method | Path | Purpose |
//! |---|---|---|
//! | POST | `/kyc/submit` | store a submission (201) |
//! | GET | `/kyc/status/{merchant_id}` | current status (404 `not_started` if none) |
//! | POST | `/kyc/update` | review the latest submission |
//! | GET | `/kyc/pending?limit=` | pending submissions |
//! | GET | `/kyc/list?status=&limit=` | submissions by status |
//! | POST, GET | `/audit?limit=` | audit trail (newest records) |
//! | GET | `/health/liveness` | liveness probe |

mod error;
mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ErrorBody, ErrorDetail};

use crate::audit::InMemoryAuditTrail;
use crate::kyc::KycService;
use crate::storage::Storage;

/// Shared state handed to every handler.
#[derive(Debug)]
pub struct AppState<S: Storage> {
    /// Lifecycle engine.
    engine: Arc<KycService<S>>,
    /// Audit trail.
    audit: Arc<InMemoryAuditTrail>,
}

impl<S: Storage> Clone for AppState<S> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            audit: Arc::clone(&self.audit),
        }
    }
}

impl<S: Storage> AppState<S> {
    /// Creates state around an engine with an empty audit trail.
    #[inline]
    #[must_use]
    pub fn new(engine: KycService<S>) -> Self {
        Self {
            engine: Arc::new(engine),
            audit: Arc::new(InMemoryAuditTrail::new()),
        }
    }

    /// Returns the lifecycle engine.
    #[inline]
    #[must_use]
    pub fn engine(&self) -> &KycService<S> {
        &self.engine
    }

    /// Returns the audit trail.
    #[inline]
    #[must_use]
    pub fn audit(&self) -> &InMemoryAuditTrail {
        &self.audit
    }
}

/// Builds the application router.
#[inline]
pub fn app<S: Storage + 'static>(state: AppState<S>) -> Router {
    let router = Router::new()
        .route("/kyc/submit", post(routes::submit::<S>))
        .route("/kyc/status/{merchant_id}", get(routes::status::<S>))
        .route("/kyc/update", post(routes::update::<S>))
        .route("/kyc/pending", get(routes::pending::<S>))
        .route("/kyc/list", get(routes::list::<S>))
        .route(
            "/audit",
            post(routes::record_audit::<S>).get(routes::audit_entries::<S>),
        )
        .route("/health/liveness", get(routes::liveness));
    with_middleware(router.with_state(state))
}

/// Wraps a router in request-id, tracing and panic-recovery layers.
///
/// Outermost first: assign `x-request-id`, trace, echo the id, catch
/// panics.
fn with_middleware(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::new())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Runs the HTTP API on a file-backed store until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the store cannot be opened, the engine cannot be
/// built, or the listener fails.
#[cfg(feature = "storage-file")]
pub async fn serve(config: &crate::config::Config) -> crate::error::Result<()> {
    use crate::storage::{FileStorage, OffloadedStorage};

    let data_dir = match config.data_dir.clone() {
        Some(dir) => dir,
        None => FileStorage::default_dir()?,
    };
    tracing::info!(data_dir = %data_dir.display(), "opening submission store");
    let engine = KycService::builder()
        .storage(OffloadedStorage::new(FileStorage::new(data_dir)?))
        .directory_url(config.directory_url.clone())
        .timeout(config.sync_timeout)
        .incorporation_dates(config.incorporation_dates)
        .build()?;

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "merchant kyc api listening");
    axum::serve(listener, app(AppState::new(engine)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("merchant kyc api stopped");
    Ok(())
}

/// Resolves when the process receives Ctrl-C.
#[cfg(feature = "storage-file")]
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
    }
}
