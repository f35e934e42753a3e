//! Client-certificate trust store for mTLS authentication
//!
//! Administrators register certificates (or CA certificates) under a name,
//! together with the policies and lease bounds granted to clients that later
//! authenticate with a matching certificate chain. This crate provides:
//! - PEM/X.509 decoding of registered certificates
//! - Write-time validation (client-auth key usage, TTL bounds)
//! - Case-insensitive CRUD and listing over pluggable storage
//! - A typed request surface for administrative tooling
//!
//! # Example
//!
//! ```rust,no_run
//! use auth_certs::{CertRegistry, CertWriteRequest, InMemoryStorage, StaticSystemView};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = CertRegistry::new(
//!         Arc::new(InMemoryStorage::new()),
//!         Arc::new(StaticSystemView::new(Duration::from_secs(3600), Duration::from_secs(86400))),
//!     );
//!
//!     let pem = std::fs::read_to_string("client.pem")?;
//!     let outcome = registry
//!         .write(
//!             CertWriteRequest::new("web-client", pem)
//!                 .with_policies("web,ops")
//!                 .with_ttl(1800),
//!         )
//!         .await?;
//!     for warning in outcome.warnings {
//!         eprintln!("warning: {}", warning);
//!     }
//!
//!     let entry = registry.read("WEB-CLIENT").await?;
//!     assert!(entry.is_some());
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod certificate;
pub mod config;
pub mod duration;
pub mod error;
pub mod models;
pub mod policy;
pub mod registry;
pub mod storage;
pub mod system;

pub use backend::{CertBackend, Operation, Request, Response};
pub use certificate::{parse_pem, KeyUsagePurpose, ParsedCertificate};
pub use config::CertAuthConfig;
pub use duration::DurationInput;
pub use error::*;
pub use models::*;
pub use policy::PolicyInput;
pub use registry::{normalize_name, CertRegistry, CERT_PREFIX};
pub use storage::{FileStorage, InMemoryStorage, Storage, StorageEntry};
pub use system::{StaticSystemView, SystemView};
