use super::{Storage, StorageEntry};
use crate::error::{CertAuthError, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// File-backed storage: one file per key beneath a root directory.
///
/// `cert/web` is stored at `<root>/cert/web`. Record files are created with
/// owner-only permissions on unix.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let is_plain = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));

        if key.is_empty() || !is_plain {
            return Err(CertAuthError::Storage(format!("invalid storage key: {}", key)));
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<StorageEntry>> {
        let path = self.path_for(key)?;
        match fs::read(&path).await {
            Ok(value) => Ok(Some(StorageEntry {
                key: key.to_string(),
                value,
            })),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, entry: StorageEntry) -> Result<()> {
        let path = self.path_for(&entry.key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Stage next to the target so readers never observe a partial record
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| CertAuthError::Storage(format!("invalid storage key: {}", entry.key)))?;
        let staging = path.with_file_name(format!(".{}.tmp", file_name));
        fs::write(&staging, &entry.value).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&staging, std::fs::Permissions::from_mode(0o600)).await?;
        }

        fs::rename(&staging, &path).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let dir = match prefix.trim_end_matches('/') {
            "" => self.root.clone(),
            trimmed => self.path_for(trimmed)?,
        };

        let mut reader = match fs::read_dir(&dir).await {
            Ok(reader) => reader,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut children = Vec::new();
        while let Some(item) = reader.next_entry().await? {
            let Some(name) = item.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if item.file_type().await?.is_dir() {
                children.push(format!("{}/", name));
            } else if !name.starts_with('.') {
                children.push(name);
            }
        }

        children.sort();
        Ok(children)
    }
}
