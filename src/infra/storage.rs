//! Object storage for uploaded images.
//!
//! The application addresses a single disk named "public"; the disk
//! implementation writes to the local filesystem under the configured
//! storage root. Stored references are bare object names.

use std::path::PathBuf;

use async_trait::async_trait;
use rand::{distributions::Alphanumeric, Rng};

use crate::config::{Config, OBJECT_NAME_LENGTH, PUBLIC_DISK};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Object storage trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store bytes under the given object name; returns the stored
    /// reference recorded on the owning record.
    async fn put(&self, object_name: &str, bytes: &[u8]) -> AppResult<String>;
}

/// Filesystem-backed implementation of the "public" disk.
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    /// Create storage rooted at `<storage_root>/public`.
    pub fn new(config: &Config) -> Self {
        Self {
            root: PathBuf::from(&config.storage_root).join(PUBLIC_DISK),
        }
    }

    /// Create storage rooted at an explicit path.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ObjectStorage for DiskStorage {
    async fn put(&self, object_name: &str, bytes: &[u8]) -> AppResult<String> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| AppError::Storage(format!("failed to prepare storage dir: {}", e)))?;

        let path = self.root.join(object_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Storage(format!("failed to store {}: {}", object_name, e)))?;

        tracing::debug!(object = %object_name, "object stored");
        Ok(object_name.to_string())
    }
}

/// Random object name with the given extension, e.g. `aZ3k9QwX1p.png`.
pub fn random_object_name(extension: &str) -> String {
    let name: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(OBJECT_NAME_LENGTH)
        .map(char::from)
        .collect();

    format!("{}.{}", name, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_names_are_random_and_carry_extension() {
        let a = random_object_name("png");
        let b = random_object_name("png");

        assert!(a.ends_with(".png"));
        assert_eq!(a.len(), OBJECT_NAME_LENGTH + 4);
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn disk_storage_writes_object_bytes() {
        let root = std::env::temp_dir().join(format!("wallet-api-test-{}", uuid::Uuid::new_v4()));
        let storage = DiskStorage::with_root(&root);

        let reference = storage.put("avatar.png", b"fake image bytes").await.unwrap();
        assert_eq!(reference, "avatar.png");

        let stored = tokio::fs::read(root.join("avatar.png")).await.unwrap();
        assert_eq!(stored, b"fake image bytes");

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }
}
