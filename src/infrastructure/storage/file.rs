//! File-backed storage implementation
//!
//! Each entry lives in `<root>/<name>.json`. Writes land in a temporary
//! sibling first and are renamed into place, so a crash mid-write leaves the
//! previous contents intact.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::domain::storage::KeyValueStorage;
use crate::domain::DomainError;

#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn entry_path(&self, name: &str) -> Result<PathBuf, DomainError> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(DomainError::validation(format!(
                "Invalid storage entry name '{}'",
                name
            )));
        }

        Ok(self.root.join(format!("{}.json", name)))
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn get(&self, name: &str) -> Result<Option<String>, DomainError> {
        let path = self.entry_path(name)?;

        match fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DomainError::storage(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn set(&self, name: &str, value: &str) -> Result<(), DomainError> {
        let path = self.entry_path(name)?;
        let tmp = path.with_extension("json.tmp");

        fs::create_dir_all(&self.root).await.map_err(|e| {
            DomainError::storage(format!(
                "Failed to create {}: {}",
                self.root.display(),
                e
            ))
        })?;

        fs::write(&tmp, value).await.map_err(|e| {
            DomainError::storage(format!("Failed to write {}: {}", tmp.display(), e))
        })?;

        fs::rename(&tmp, &path).await.map_err(|e| {
            DomainError::storage(format!("Failed to replace {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), bytes = value.len(), "Storage entry written");
        Ok(())
    }
}
