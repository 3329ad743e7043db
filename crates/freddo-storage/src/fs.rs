//! Directory-backed image store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use freddo_core::config::ImagesConfig;

use crate::error::StorageError;
use crate::store::{validate_name, ImageStore};

/// Images stored as plain files in one directory.
#[derive(Debug, Clone)]
pub struct FsImageStore {
    root: PathBuf,
}

impl FsImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted at `dir/prefix`.
    pub fn from_config(config: &ImagesConfig) -> Self {
        Self::new(Path::new(&config.dir).join(config.prefix.trim_matches('/')))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn list_images(&self) -> Result<Vec<String>, StorageError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(root = %self.root.display(), "Image directory does not exist");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        tracing::debug!(root = %self.root.display(), count = names.len(), "Listed images");
        Ok(names)
    }

    async fn fetch(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        validate_name(name)?;
        match tokio::fs::read(self.root.join(name)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
