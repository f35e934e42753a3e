//! Trust entry registry
//!
//! Owns the lifecycle of named trust entries: validation and normalization on
//! write, and lookup, listing and removal over the injected [`Storage`].
//!
//! Deleting an entry does not revoke credentials already issued through it.
//! Those remain valid until their lease expires or is revoked separately.

use crate::certificate::parse_pem;
use crate::error::{CertAuthError, Result};
use crate::models::{CertWriteRequest, TrustEntry, WriteOutcome};
use crate::policy::sanitize_policies;
use crate::storage::{Storage, StorageEntry};
use crate::system::SystemView;
use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

lazy_static! {
    static ref NAME_REGEX: Regex = name_pattern();
}

#[allow(clippy::expect_used)]
fn name_pattern() -> Regex {
    Regex::new(r"^\w(([\w.-]+)?\w)?$").expect("certificate name pattern compiles")
}

/// Storage prefix under which every trust entry lives
pub const CERT_PREFIX: &str = "cert/";

pub const ERR_NEGATIVE_TTL: &str = "ttl cannot be negative";
pub const ERR_NEGATIVE_MAX_TTL: &str = "max_ttl cannot be negative";
pub const ERR_TTL_EXCEEDS_MAX_TTL: &str = "ttl should be shorter than max_ttl";
pub const ERR_PARSE_CERTIFICATE: &str = "failed to parse certificate";
pub const ERR_MISSING_CLIENT_AUTH: &str =
    "non-CA certificates should have TLS client authentication set as an extended key usage";
pub const ERR_MISSING_NAME: &str = "missing certificate name";
pub const ERR_INVALID_NAME: &str = "invalid certificate name";

/// Names are case-insensitive; every storage access goes through this.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
}

/// Word characters, with `.` and `-` allowed between the first and last one.
pub fn is_valid_name(name: &str) -> bool {
    NAME_REGEX.is_match(name)
}

/// Normalize `name` and check it can be stored and listed as a single key.
fn checked_name(name: &str) -> Result<String> {
    let name = normalize_name(name);
    if name.is_empty() {
        return Err(CertAuthError::invalid_argument(ERR_MISSING_NAME));
    }
    if !is_valid_name(&name) {
        return Err(CertAuthError::invalid_argument(format!(
            "{}: {}",
            ERR_INVALID_NAME, name
        )));
    }
    Ok(name)
}

fn storage_key(normalized_name: &str) -> String {
    format!("{}{}", CERT_PREFIX, normalized_name)
}

fn ceiling_secs(ceiling: Duration) -> i64 {
    i64::try_from(ceiling.as_secs()).unwrap_or(i64::MAX)
}

pub struct CertRegistry {
    storage: Arc<dyn Storage>,
    system: Arc<dyn SystemView>,
}

impl CertRegistry {
    pub fn new(storage: Arc<dyn Storage>, system: Arc<dyn SystemView>) -> Self {
        Self { storage, system }
    }

    /// Names of all stored entries
    pub async fn list(&self) -> Result<Vec<String>> {
        self.storage.list(CERT_PREFIX).await
    }

    /// Look up an entry by name. A missing entry is `Ok(None)`.
    pub async fn read(&self, name: &str) -> Result<Option<TrustEntry>> {
        let key = storage_key(&checked_name(name)?);

        match self.storage.get(&key).await? {
            Some(entry) => Ok(Some(entry.decode_json()?)),
            None => Ok(None),
        }
    }

    /// Remove an entry. Removing a missing entry succeeds.
    pub async fn delete(&self, name: &str) -> Result<()> {
        let name = checked_name(name)?;
        self.storage.delete(&storage_key(&name)).await?;
        info!(name = %name, "Deleted trusted certificate");
        Ok(())
    }

    /// Validate and store an entry, replacing any previous entry of that name.
    ///
    /// Every check runs before storage is touched, so a rejected request
    /// leaves the store unchanged. TTLs above the system ceilings are accepted
    /// with a warning in the returned [`WriteOutcome`].
    pub async fn write(&self, request: CertWriteRequest) -> Result<WriteOutcome> {
        let name = checked_name(&request.name)?;
        let policies = sanitize_policies(request.policies.iter().map(String::as_str));

        let mut outcome = WriteOutcome::default();

        let system_default_ttl = ceiling_secs(self.system.default_lease_ttl());
        let system_max_ttl = ceiling_secs(self.system.max_lease_ttl());

        let ttl = request.ttl;
        if ttl < 0 {
            return Err(CertAuthError::invalid_argument(ERR_NEGATIVE_TTL));
        }
        if ttl > system_default_ttl {
            outcome.warnings.push(format!(
                "Given ttl of {} seconds is greater than current mount/system default of {} seconds",
                ttl, system_default_ttl
            ));
        }

        let max_ttl = request.max_ttl;
        if max_ttl < 0 {
            return Err(CertAuthError::invalid_argument(ERR_NEGATIVE_MAX_TTL));
        }
        if max_ttl > system_max_ttl {
            outcome.warnings.push(format!(
                "Given max_ttl of {} seconds is greater than current mount/system default of {} seconds",
                max_ttl, system_max_ttl
            ));
        }

        if max_ttl != 0 && ttl > max_ttl {
            return Err(CertAuthError::invalid_argument(ERR_TTL_EXCEEDS_MAX_TTL));
        }

        let display_name = if request.display_name.is_empty() {
            name.clone()
        } else {
            request.display_name
        };

        let parsed = parse_pem(request.certificate.as_bytes());
        let Some(leaf) = parsed.first() else {
            warn!(name = %name, "Rejected trusted certificate: no parseable certificate");
            return Err(CertAuthError::invalid_argument(ERR_PARSE_CERTIFICATE));
        };
        debug!(
            name = %name,
            subject = %leaf.subject,
            is_ca = leaf.is_ca,
            bundle_size = parsed.len(),
            "Parsed trusted certificate"
        );

        // Only the leading certificate of a bundle is checked
        if !leaf.allows_client_auth() {
            warn!(name = %name, subject = %leaf.subject, "Rejected trusted certificate: client auth not permitted");
            return Err(CertAuthError::invalid_argument(ERR_MISSING_CLIENT_AUTH));
        }

        // Both values were checked non-negative above
        let entry = TrustEntry {
            name: name.clone(),
            certificate: request.certificate,
            display_name,
            policies,
            ttl: Duration::from_secs(ttl.unsigned_abs()),
            max_ttl: Duration::from_secs(max_ttl.unsigned_abs()),
        };

        self.storage
            .put(StorageEntry::json(storage_key(&name), &entry)?)
            .await?;

        for warning in &outcome.warnings {
            warn!(name = %name, "{}", warning);
        }
        info!(name = %name, policies = ?entry.policies, "Stored trusted certificate");

        Ok(outcome)
    }
}
