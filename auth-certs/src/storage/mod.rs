//! Storage abstraction for trust entries
//!
//! Keys are `/`-separated strings, values are opaque serialized blobs. The
//! registry only needs get, put, delete and a one-level prefix listing.

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::InMemoryStorage;

use crate::error::Result;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

/// A single stored record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEntry {
    pub key: String,
    pub value: Vec<u8>,
}

impl StorageEntry {
    /// Serialize `value` as JSON under `key`.
    pub fn json<T: Serialize>(key: impl Into<String>, value: &T) -> Result<Self> {
        Ok(Self {
            key: key.into(),
            value: serde_json::to_vec(value)?,
        })
    }

    pub fn decode_json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.value)?)
    }
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Fetch the entry stored under `key`, if any
    async fn get(&self, key: &str) -> Result<Option<StorageEntry>>;

    /// Store an entry, replacing any previous value for its key
    async fn put(&self, entry: StorageEntry) -> Result<()>;

    /// Remove `key`; removing a missing key succeeds
    async fn delete(&self, key: &str) -> Result<()>;

    /// Direct children of `prefix`, relative to it and sorted.
    /// Nested keys collapse to a single `child/` element.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Reduce a full key to its listing element under `prefix`.
pub(crate) fn child_of(prefix: &str, key: &str) -> Option<String> {
    let rest = key.strip_prefix(prefix)?;
    if rest.is_empty() {
        return None;
    }
    match rest.split_once('/') {
        Some((dir, _)) => Some(format!("{}/", dir)),
        None => Some(rest.to_string()),
    }
}
