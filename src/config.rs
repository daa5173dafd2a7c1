//! Runtime configuration read from environment variables.

use core::net::{Ipv4Addr, SocketAddr};
use core::time::Duration;
use std::path::PathBuf;

use crate::client::{DEFAULT_DIRECTORY_URL, DEFAULT_TIMEOUT};
use crate::error::{KycError, Result};
use crate::models::IncorporationDatePolicy;

/// Listen port used when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 7015;

/// Environment variable names.
mod var {
    /// HTTP listen port.
    pub(super) const PORT: &str = "PORT";
    /// Storage directory.
    pub(super) const DATA_DIR: &str = "KYC_DATA_DIR";
    /// Merchant directory base URL.
    pub(super) const DIRECTORY_URL: &str = "MERCHANT_DIRECTORY_URL";
    /// Directory request timeout in seconds.
    pub(super) const SYNC_TIMEOUT_SECS: &str = "KYC_SYNC_TIMEOUT_SECS";
    /// Reject malformed incorporation dates instead of dropping them.
    pub(super) const STRICT_INCORPORATION_DATE: &str = "KYC_STRICT_INCORPORATION_DATE";
}

/// Service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address the HTTP API binds to (`0.0.0.0:$PORT`).
    pub listen_addr: SocketAddr,
    /// Storage directory; `None` means the platform data directory.
    pub data_dir: Option<PathBuf>,
    /// Merchant directory base URL.
    pub directory_url: String,
    /// Timeout for each merchant directory request.
    pub sync_timeout: Duration,
    /// Handling of malformed incorporation dates.
    pub incorporation_dates: IncorporationDatePolicy,
}

impl Default for Config {
    #[inline]
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            data_dir: None,
            directory_url: DEFAULT_DIRECTORY_URL.to_owned(),
            sync_timeout: DEFAULT_TIMEOUT,
            incorporation_dates: IncorporationDatePolicy::Lenient,
        }
    }
}

impl Config {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`KycError::Config`] if a variable is set to a malformed
    /// value.
    #[inline]
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary key lookup.
    ///
    /// Unset or blank variables fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`KycError::Config`] if a variable is set to a malformed
    /// value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(raw) = get(var::PORT) {
            let port: u16 = raw
                .parse()
                .map_err(|err| invalid(var::PORT, &raw, &format!("a port number ({err})")))?;
            config.listen_addr.set_port(port);
        }
        if let Some(raw) = get(var::DATA_DIR) {
            config.data_dir = Some(PathBuf::from(raw));
        }
        if let Some(raw) = get(var::DIRECTORY_URL) {
            config.directory_url = raw;
        }
        if let Some(raw) = get(var::SYNC_TIMEOUT_SECS) {
            let secs: u64 = raw.parse().map_err(|err| {
                invalid(var::SYNC_TIMEOUT_SECS, &raw, &format!("a positive integer ({err})"))
            })?;
            if secs == 0 {
                return Err(invalid(var::SYNC_TIMEOUT_SECS, &raw, "a positive integer"));
            }
            config.sync_timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = get(var::STRICT_INCORPORATION_DATE) {
            config.incorporation_dates = match raw.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => IncorporationDatePolicy::Strict,
                "0" | "false" | "no" | "off" => IncorporationDatePolicy::Lenient,
                _ => return Err(invalid(var::STRICT_INCORPORATION_DATE, &raw, "a boolean")),
            };
        }

        tracing::debug!(?config, "configuration loaded");
        Ok(config)
    }
}

/// Builds the error for a malformed variable.
fn invalid(key: &str, raw: &str, expected: &str) -> KycError {
    KycError::Config(format!("{key} must be {expected}, got '{raw}'"))
}
