//! In-memory image store.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::store::{validate_name, ImageStore};

#[derive(Debug, Default)]
pub struct MemoryImageStore {
    images: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_images<I, N>(images: I) -> Self
    where
        I: IntoIterator<Item = (N, Vec<u8>)>,
        N: Into<String>,
    {
        let store = Self::new();
        for (name, bytes) in images {
            store.insert(name, bytes);
        }
        store
    }

    pub fn insert(&self, name: impl Into<String>, bytes: Vec<u8>) {
        let mut images = self.images.write().unwrap_or_else(|p| p.into_inner());
        images.insert(name.into(), bytes);
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn list_images(&self) -> Result<Vec<String>, StorageError> {
        let images = self.images.read().unwrap_or_else(|p| p.into_inner());
        Ok(images.keys().cloned().collect())
    }

    async fn fetch(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        validate_name(name)?;
        let images = self.images.read().unwrap_or_else(|p| p.into_inner());
        images
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryImageStore::with_images([("b.png", vec![2]), ("a.png", vec![1])]);
        assert_eq!(store.list_images().await.unwrap(), vec!["a.png", "b.png"]);
        assert_eq!(store.fetch("a.png").await.unwrap(), vec![1]);
        assert!(matches!(
            store.fetch("c.png").await,
            Err(StorageError::NotFound(_))
        ));

        store.insert("c.png", vec![3]);
        assert_eq!(store.fetch("c.png").await.unwrap(), vec![3]);
    }
}
