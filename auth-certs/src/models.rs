use crate::certificate::{parse_pem, ParsedCertificate};
use crate::duration::{self, DurationInput};
use crate::policy::PolicyInput;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Duration;

/// A named certificate trusted for client authentication.
///
/// Only the PEM text is persisted. Anything that needs the parsed form must
/// decode it again via [`TrustEntry::parsed_certificates`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustEntry {
    pub name: String,
    pub certificate: String,
    pub display_name: String,
    pub policies: Vec<String>,
    #[serde(with = "duration::seconds")]
    pub ttl: Duration,
    #[serde(with = "duration::seconds")]
    pub max_ttl: Duration,
}

impl TrustEntry {
    pub fn parsed_certificates(&self) -> Vec<ParsedCertificate> {
        parse_pem(self.certificate.as_bytes())
    }

    /// Fields exposed on read. The name is the request path, so it is omitted.
    pub fn to_response_data(&self) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert("certificate".to_string(), json!(self.certificate));
        data.insert("display_name".to_string(), json!(self.display_name));
        data.insert("policies".to_string(), json!(self.policies));
        data.insert("ttl".to_string(), json!(self.ttl.as_secs()));
        data.insert("max_ttl".to_string(), json!(self.max_ttl.as_secs()));
        data
    }
}

/// Raw fields of a trust entry write, exactly as the caller supplied them.
///
/// Every field falls back to its default when omitted: a write replaces the
/// whole entry and never merges with a previously stored one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CertWriteFields {
    pub certificate: String,
    pub display_name: String,
    pub policies: PolicyInput,
    pub ttl: DurationInput,
    pub max_ttl: DurationInput,
}

/// Validated write request handed to the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertWriteRequest {
    pub name: String,
    pub certificate: String,
    pub display_name: String,
    pub policies: Vec<String>,
    /// Requested lease TTL in seconds
    pub ttl: i64,
    /// Maximum lease TTL in seconds, `0` for no bound
    pub max_ttl: i64,
}

impl CertWriteRequest {
    pub fn new(name: impl Into<String>, certificate: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            certificate: certificate.into(),
            ..Default::default()
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_policies(mut self, policies: impl Into<PolicyInput>) -> Self {
        self.policies = policies.into().resolve();
        self
    }

    pub fn with_ttl(mut self, ttl: i64) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_max_ttl(mut self, max_ttl: i64) -> Self {
        self.max_ttl = max_ttl;
        self
    }

    /// Resolve raw fields into a registry request. Fails only when a
    /// duration field cannot be read as seconds.
    pub fn from_fields(name: impl Into<String>, fields: CertWriteFields) -> crate::Result<Self> {
        Ok(Self {
            name: name.into(),
            certificate: fields.certificate,
            display_name: fields.display_name,
            policies: fields.policies.resolve(),
            ttl: fields.ttl.to_seconds()?,
            max_ttl: fields.max_ttl.to_seconds()?,
        })
    }
}

/// Outcome of a successful write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOutcome {
    /// Advisory warnings; the entry was stored regardless.
    pub warnings: Vec<String>,
}

impl WriteOutcome {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
