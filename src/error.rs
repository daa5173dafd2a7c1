//! Error types for the merchant KYC library.

/// All errors that can occur while handling KYC submissions.
#[derive(Debug, thiserror::Error)]
pub enum KycError {
    /// Caller input failed validation. Nothing was written.
    #[error("validation error: {0}")]
    Validation(String),

    /// No submission matched the lookup.
    #[error("not found: {0}")]
    NotFound(String),

    /// Submission storage backend failed.
    #[error("persistence error: {0}")]
    Storage(Box<dyn core::error::Error + Send + Sync>),

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP transport to the merchant directory failed or timed out.
    #[cfg(any(feature = "async", feature = "blocking"))]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The merchant directory answered with a non-success status.
    #[error("merchant directory returned status {status}: {message}")]
    Directory {
        /// HTTP status code.
        status: u16,
        /// Response body, or a placeholder when it could not be read.
        message: String,
    },

    /// Configuration value is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network listener or other process-level I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl KycError {
    /// Returns `true` for failures talking to the merchant directory.
    ///
    /// These are absorbed by the lifecycle engine and never fail a
    /// submission or review.
    #[inline]
    #[must_use]
    pub const fn is_network(&self) -> bool {
        match *self {
            #[cfg(any(feature = "async", feature = "blocking"))]
            Self::Http(_) => true,
            Self::Directory { .. } => true,
            Self::Validation(_)
            | Self::NotFound(_)
            | Self::Storage(_)
            | Self::Serialization(_)
            | Self::Config(_)
            | Self::Io(_) => false,
        }
    }

    /// Returns `true` for failures of the submission store.
    #[inline]
    #[must_use]
    pub const fn is_persistence(&self) -> bool {
        matches!(*self, Self::Storage(_) | Self::Serialization(_))
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, KycError>;
