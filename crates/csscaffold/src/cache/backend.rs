//! Storage backends for the asset cache.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::{Error, Result};

/// A stored asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Namespaced key, e.g. `gradients/vertical_100_fff_000.png`.
    pub key: String,
    /// Where the asset lives.
    pub asset_path: PathBuf,
    /// When the asset was created.
    pub created_at: DateTime<Utc>,
}

/// Existence checks and path resolution for cached assets.
///
/// Keys are `namespace/name` strings. The asset cache only needs to know
/// whether a key is present and where its bytes belong; how entries are
/// stored is up to the implementation.
pub trait CacheBackend: Send + Sync {
    /// Whether an asset is stored under `key`.
    fn exists(&self, key: &str) -> bool;

    /// Make sure a namespace can receive new entries.
    fn ensure_namespace(&self, namespace: &str) -> Result<()>;

    /// The location of the asset stored (or to be stored) under `key`.
    fn resolve_path(&self, key: &str) -> PathBuf;

    /// Look up the entry stored under `key`.
    fn entry(&self, key: &str) -> Option<CacheEntry>;

    /// Remove every entry of a namespace.
    fn clear_namespace(&self, namespace: &str) -> Result<()>;
}

/// Stores assets as files below a root directory, one subdirectory per namespace.
#[derive(Debug, Clone)]
pub struct FileCacheBackend {
    root: PathBuf,
}

impl FileCacheBackend {
    /// Create a backend rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl CacheBackend for FileCacheBackend {
    fn exists(&self, key: &str) -> bool {
        self.resolve_path(key).is_file()
    }

    fn ensure_namespace(&self, namespace: &str) -> Result<()> {
        let dir = self.root.join(namespace);
        std::fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))
    }

    fn resolve_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    fn entry(&self, key: &str) -> Option<CacheEntry> {
        let path = self.resolve_path(key);
        let metadata = std::fs::metadata(&path).ok().filter(|m| m.is_file())?;
        let created_at = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        Some(CacheEntry {
            key: key.to_string(),
            asset_path: path,
            created_at,
        })
    }

    fn clear_namespace(&self, namespace: &str) -> Result<()> {
        let dir = self.root.join(namespace);
        match std::fs::remove_dir_all(&dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(&dir, e)),
        }
    }
}
