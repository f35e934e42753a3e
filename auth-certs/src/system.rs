use crate::config::CertAuthConfig;
use std::time::Duration;

/// Read-only view of the host's lease ceilings, consulted on every write.
pub trait SystemView: Send + Sync {
    fn default_lease_ttl(&self) -> Duration;
    fn max_lease_ttl(&self) -> Duration;
}

/// Fixed ceilings, typically taken from [`CertAuthConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticSystemView {
    default_lease_ttl: Duration,
    max_lease_ttl: Duration,
}

impl StaticSystemView {
    pub fn new(default_lease_ttl: Duration, max_lease_ttl: Duration) -> Self {
        Self {
            default_lease_ttl,
            max_lease_ttl,
        }
    }
}

impl From<&CertAuthConfig> for StaticSystemView {
    fn from(config: &CertAuthConfig) -> Self {
        Self::new(config.default_lease_ttl, config.max_lease_ttl)
    }
}

impl SystemView for StaticSystemView {
    fn default_lease_ttl(&self) -> Duration {
        self.default_lease_ttl
    }

    fn max_lease_ttl(&self) -> Duration {
        self.max_lease_ttl
    }
}
