//! Operator CLI for the client certificate trust store
//!
//! Every subcommand is translated into an administrative request and handed
//! to [`CertBackend`], so the CLI applies exactly the same validation as any
//! other caller of the store.
//!
//! # Example Usage
//!
//! ```bash
//! certctl write web --certificate-file client.pem --policies ops,dev --ttl 30m
//! certctl read web
//! certctl list
//! certctl delete web
//! ```

use anyhow::Context;
use auth_certs::{
    CertAuthConfig, CertBackend, CertRegistry, FileStorage, Operation, Request, Response,
    StaticSystemView,
};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "certctl")]
#[command(about = "Manage trusted client certificates")]
pub struct Cli {
    /// Root directory of the trust store
    #[arg(long, global = true, env = "CERT_AUTH_STORAGE_PATH")]
    pub storage_path: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// List registered certificate names
    List,

    /// Show a registered certificate entry
    Read { name: String },

    /// Register or replace a certificate entry
    Write {
        name: String,

        /// PEM file holding the certificate or CA bundle
        #[arg(long)]
        certificate_file: PathBuf,

        #[arg(long)]
        display_name: Option<String>,

        /// Comma-separated policy names
        #[arg(long)]
        policies: Option<String>,

        /// Lease TTL, e.g. `3600` or `1h`
        #[arg(long, allow_hyphen_values = true)]
        ttl: Option<String>,

        /// Lease upper bound, e.g. `7200` or `2h`
        #[arg(long, allow_hyphen_values = true)]
        max_ttl: Option<String>,
    },

    /// Remove a certificate entry
    Delete { name: String },
}

impl Command {
    /// Build the administrative request for this subcommand
    ///
    /// # Errors
    ///
    /// Fails when the certificate file for `write` cannot be read.
    pub fn to_request(&self) -> anyhow::Result<Request> {
        let request = match self {
            Command::List => Request::new(Operation::List, "certs/"),
            Command::Read { name } => Request::new(Operation::Read, cert_path(name)),
            Command::Delete { name } => Request::new(Operation::Delete, cert_path(name)),
            Command::Write {
                name,
                certificate_file,
                display_name,
                policies,
                ttl,
                max_ttl,
            } => {
                let certificate = std::fs::read_to_string(certificate_file).with_context(|| {
                    format!("failed to read {}", certificate_file.display())
                })?;

                let mut data = Map::new();
                data.insert("certificate".to_string(), Value::String(certificate));
                let optional = [
                    ("display_name", display_name),
                    ("policies", policies),
                    ("ttl", ttl),
                    ("max_ttl", max_ttl),
                ];
                for (field, value) in optional {
                    if let Some(value) = value {
                        data.insert(field.to_string(), Value::String(value.clone()));
                    }
                }

                Request::new(Operation::Update, cert_path(name)).with_data(data)
            }
        };
        Ok(request)
    }
}

fn cert_path(name: &str) -> String {
    format!("certs/{}", name)
}

/// Apply command-line overrides on top of environment configuration
#[must_use]
pub fn resolve_config(cli: &Cli, mut config: CertAuthConfig) -> CertAuthConfig {
    if let Some(path) = &cli.storage_path {
        config.storage_path.clone_from(path);
    }
    config
}

/// Build a file-backed backend for the given configuration
#[must_use]
pub fn open_backend(config: &CertAuthConfig) -> CertBackend {
    debug!(path = %config.storage_path.display(), "Opening trust store");
    let storage = FileStorage::new(&config.storage_path);
    let system = StaticSystemView::from(config);
    CertBackend::new(CertRegistry::new(Arc::new(storage), Arc::new(system)))
}

/// Run a parsed command line against the configured trust store
///
/// # Errors
///
/// Returns configuration, I/O and validation failures from the store.
pub async fn run(cli: &Cli) -> anyhow::Result<Option<Response>> {
    let config = CertAuthConfig::from_env().context("invalid configuration")?;
    run_with_config(cli, config).await
}

/// Run a parsed command line with an explicit base configuration
///
/// # Errors
///
/// Returns I/O and validation failures from the store.
pub async fn run_with_config(
    cli: &Cli,
    config: CertAuthConfig,
) -> anyhow::Result<Option<Response>> {
    let config = resolve_config(cli, config);
    let backend = open_backend(&config);
    let request = cli.command.to_request()?;

    info!(operation = %request.operation, path = %request.path, "Submitting request");
    let response = backend.handle_request(request).await?;
    Ok(response)
}

/// Print response data as pretty JSON to `out` and each warning to `err`.
///
/// Warnings are written unconditionally, independent of the log filter.
///
/// # Errors
///
/// Fails when either stream cannot be written.
pub fn render_response<O, E>(response: &Response, out: &mut O, err: &mut E) -> anyhow::Result<()>
where
    O: Write,
    E: Write,
{
    for warning in &response.warnings {
        writeln!(err, "WARNING: {}", warning)?;
    }
    if !response.data.is_empty() {
        writeln!(out, "{}", serde_json::to_string_pretty(&response.data)?)?;
    }
    Ok(())
}
