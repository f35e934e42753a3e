//! Typed administrative surface over the registry
//!
//! Requests carry an operation kind, a path and a JSON field map. Paths are
//! `certs/` (list) and `certs/<name>` (read, update, delete). Field maps are
//! decoded once into typed structs so the registry never sees loosely typed
//! input.

use crate::error::{CertAuthError, Result};
use crate::models::{CertWriteFields, CertWriteRequest};
use crate::registry::{is_valid_name, CertRegistry};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use tracing::debug;

pub const CERTS_PATH: &str = "certs/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Read,
    List,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Read => "read",
            Operation::List => "list",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub operation: Operation,
    pub path: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Request {
    pub fn new(operation: Operation, path: impl Into<String>) -> Self {
        Self {
            operation,
            path: path.into(),
            data: Map::new(),
        }
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Response {
    pub fn list(keys: Vec<String>) -> Self {
        let mut data = Map::new();
        data.insert("keys".to_string(), json!(keys));
        Self {
            data,
            warnings: Vec::new(),
        }
    }
}

enum Route<'a> {
    Certs,
    Cert(&'a str),
}

pub struct CertBackend {
    registry: CertRegistry,
}

impl CertBackend {
    pub fn new(registry: CertRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CertRegistry {
        &self.registry
    }

    /// Dispatch a request. `Ok(None)` means success with nothing to report.
    pub async fn handle_request(&self, request: Request) -> Result<Option<Response>> {
        debug!(operation = %request.operation, path = %request.path, "Handling request");

        match (Self::route(&request.path)?, request.operation) {
            (Route::Certs, Operation::List) => {
                let keys = self.registry.list().await?;
                Ok(Some(Response::list(keys)))
            }
            (Route::Cert(name), Operation::Read) => {
                let entry = self.registry.read(name).await?;
                Ok(entry.map(|entry| Response {
                    data: entry.to_response_data(),
                    warnings: Vec::new(),
                }))
            }
            (Route::Cert(name), Operation::Update) => {
                let fields: CertWriteFields = serde_json::from_value(Value::Object(request.data))
                    .map_err(|e| CertAuthError::InvalidRequest(e.to_string()))?;
                let outcome = self
                    .registry
                    .write(CertWriteRequest::from_fields(name, fields)?)
                    .await?;

                if outcome.has_warnings() {
                    Ok(Some(Response {
                        data: Map::new(),
                        warnings: outcome.warnings,
                    }))
                } else {
                    Ok(None)
                }
            }
            (Route::Cert(name), Operation::Delete) => {
                self.registry.delete(name).await?;
                Ok(None)
            }
            (_, operation) => Err(CertAuthError::UnsupportedOperation {
                operation: operation.to_string(),
                path: request.path.clone(),
            }),
        }
    }

    fn route(path: &str) -> Result<Route<'_>> {
        let rest = path
            .strip_prefix(CERTS_PATH)
            .or_else(|| (path == "certs").then_some(""))
            .ok_or_else(|| CertAuthError::InvalidRequest(format!("unknown path: {}", path)))?;

        if rest.is_empty() {
            return Ok(Route::Certs);
        }

        if !is_valid_name(rest) {
            return Err(CertAuthError::InvalidRequest(format!(
                "invalid certificate name: {}",
                rest
            )));
        }

        Ok(Route::Cert(rest))
    }
}
