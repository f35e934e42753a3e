//! Configuration for the certificate trust store
//!
//! System lease ceilings and the storage location, loaded from the
//! environment:
//! - `CERT_AUTH_DEFAULT_LEASE_TTL`: default lease TTL (`3600`, `768h`)
//! - `CERT_AUTH_MAX_LEASE_TTL`: maximum lease TTL
//! - `CERT_AUTH_STORAGE_PATH`: root directory for file storage

use crate::duration::parse_duration_seconds;
use crate::error::{CertAuthError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_LEASE_TTL_ENV: &str = "CERT_AUTH_DEFAULT_LEASE_TTL";
pub const MAX_LEASE_TTL_ENV: &str = "CERT_AUTH_MAX_LEASE_TTL";
pub const STORAGE_PATH_ENV: &str = "CERT_AUTH_STORAGE_PATH";

/// 32 days, the usual mount default for both ceilings
const DEFAULT_CEILING: Duration = Duration::from_secs(32 * 24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertAuthConfig {
    /// System-wide default lease TTL
    #[serde(with = "crate::duration::seconds")]
    pub default_lease_ttl: Duration,

    /// System-wide maximum lease TTL
    #[serde(with = "crate::duration::seconds")]
    pub max_lease_ttl: Duration,

    /// Root directory for file-backed storage
    pub storage_path: PathBuf,
}

impl Default for CertAuthConfig {
    fn default() -> Self {
        Self {
            default_lease_ttl: DEFAULT_CEILING,
            max_lease_ttl: DEFAULT_CEILING,
            storage_path: PathBuf::from("./cert-auth-data"),
        }
    }
}

impl CertAuthConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(DEFAULT_LEASE_TTL_ENV) {
            config.default_lease_ttl = parse_ceiling(DEFAULT_LEASE_TTL_ENV, &raw)?;
        }

        if let Some(raw) = lookup(MAX_LEASE_TTL_ENV) {
            config.max_lease_ttl = parse_ceiling(MAX_LEASE_TTL_ENV, &raw)?;
        }

        if let Some(path) = lookup(STORAGE_PATH_ENV) {
            config.storage_path = PathBuf::from(path);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_lease_ttl > self.max_lease_ttl {
            return Err(CertAuthError::Configuration(format!(
                "default lease TTL ({}s) cannot exceed max lease TTL ({}s)",
                self.default_lease_ttl.as_secs(),
                self.max_lease_ttl.as_secs()
            )));
        }
        Ok(())
    }
}

fn parse_ceiling(var: &str, raw: &str) -> Result<Duration> {
    let secs = parse_duration_seconds(raw)
        .map_err(|e| CertAuthError::Configuration(format!("{} is invalid: {}", var, e)))?;

    u64::try_from(secs)
        .map(Duration::from_secs)
        .map_err(|_| CertAuthError::Configuration(format!("{} cannot be negative", var)))
}
