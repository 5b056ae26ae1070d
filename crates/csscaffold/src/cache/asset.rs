//! Content-addressed asset cache.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use csscaffold_render::RenderResult;
use parking_lot::Mutex;

use super::backend::{CacheBackend, CacheEntry, FileCacheBackend};
use crate::logging::targets;
use crate::{Error, Result};

/// Result of [`AssetCache::get_or_create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedAsset {
    /// The stored entry.
    pub entry: CacheEntry,
    /// Whether this call generated the asset.
    pub generated: bool,
}

/// Cache of generated assets keyed by their generation parameters.
///
/// Callers derive a file name from everything that determines the asset.
/// The first request for a name runs the generator; later requests reuse the
/// stored file. Generation is serialized per key, so concurrent rewrite
/// passes sharing one cache generate each asset at most once.
pub struct AssetCache {
    backend: Box<dyn CacheBackend>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl AssetCache {
    /// Create a cache over any backend.
    pub fn new(backend: impl CacheBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Create a cache storing files below `root`.
    pub fn on_disk(root: impl Into<PathBuf>) -> Self {
        Self::new(FileCacheBackend::new(root))
    }

    /// Build the namespaced key for a file name.
    pub fn key(namespace: &str, file_name: &str) -> String {
        format!("{namespace}/{file_name}")
    }

    /// Whether an asset exists under the namespaced `key`.
    pub fn exists(&self, key: &str) -> bool {
        self.backend.exists(key)
    }

    /// Access the storage backend.
    pub fn backend(&self) -> &dyn CacheBackend {
        self.backend.as_ref()
    }

    /// Return the asset stored under `namespace/file_name`, generating it first if absent.
    ///
    /// `generate` receives the target path and must leave a complete file there.
    /// A generator failure is returned as [`Error::AssetGeneration`] and leaves
    /// the key absent, so the next request tries again.
    pub fn get_or_create<F>(
        &self,
        namespace: &str,
        file_name: &str,
        generate: F,
    ) -> Result<CachedAsset>
    where
        F: FnOnce(&Path) -> RenderResult<()>,
    {
        let key = Self::key(namespace, file_name);
        let lock = self.key_lock(&key);
        let result = {
            let _guard = lock.lock();
            self.lookup_or_generate(namespace, key.clone(), generate)
        };
        self.release_key_lock(&key, lock);
        result
    }

    fn lookup_or_generate<F>(&self, namespace: &str, key: String, generate: F) -> Result<CachedAsset>
    where
        F: FnOnce(&Path) -> RenderResult<()>,
    {
        if self.backend.exists(&key) {
            tracing::debug!(target: targets::CACHE, key = %key, "asset cache hit");
            let entry = self.backend.entry(&key).unwrap_or_else(|| CacheEntry {
                key: key.clone(),
                asset_path: self.backend.resolve_path(&key),
                created_at: Utc::now(),
            });
            return Ok(CachedAsset {
                entry,
                generated: false,
            });
        }

        self.backend.ensure_namespace(namespace)?;
        let path = self.backend.resolve_path(&key);
        generate(&path).map_err(|source| Error::AssetGeneration {
            key: key.clone(),
            source,
        })?;

        tracing::info!(target: targets::CACHE, key = %key, path = %path.display(), "generated asset");

        Ok(CachedAsset {
            entry: CacheEntry {
                key,
                asset_path: path,
                created_at: Utc::now(),
            },
            generated: true,
        })
    }

    /// Remove every asset of a namespace.
    pub fn clear(&self, namespace: &str) -> Result<()> {
        self.backend.clear_namespace(namespace)
    }

    fn key_lock(&self, key: &str) -> Arc<Mutex<()>> {
        self.locks.lock().entry(key.to_string()).or_default().clone()
    }

    /// Drop the lock for `key` from the map unless another request holds it.
    fn release_key_lock(&self, key: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock();
        // One reference in the map, one in `lock`.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(key);
        }
    }
}

impl std::fmt::Debug for AssetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetCache")
            .field("locked_keys", &self.locks.lock().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csscaffold_render::RenderError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn generates_once_per_key() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AssetCache::on_disk(dir.path());
        let calls = AtomicUsize::new(0);

        let generate = |path: &Path| -> RenderResult<()> {
            calls.fetch_add(1, Ordering::SeqCst);
            std::fs::write(path, b"png")?;
            Ok(())
        };

        let first = cache.get_or_create("gradients", "a.png", generate).unwrap();
        let second = cache.get_or_create("gradients", "a.png", generate).unwrap();

        assert!(first.generated);
        assert!(!second.generated);
        assert_eq!(first.entry.asset_path, second.entry.asset_path);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.exists("gradients/a.png"));
    }

    #[test]
    fn distinct_keys_generate_separately() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AssetCache::on_disk(dir.path());
        let calls = AtomicUsize::new(0);

        for name in ["a.png", "b.png", "a.png"] {
            cache
                .get_or_create("gradients", name, |path| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    std::fs::write(path, name)?;
                    Ok(())
                })
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failed_generation_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AssetCache::on_disk(dir.path());

        let err = cache
            .get_or_create("gradients", "a.png", |_| Err(RenderError::EmptyStops))
            .unwrap_err();
        assert!(matches!(err, Error::AssetGeneration { ref key, .. } if key == "gradients/a.png"));
        assert!(!cache.exists("gradients/a.png"));

        let retry = cache
            .get_or_create("gradients", "a.png", |path| {
                std::fs::write(path, b"png")?;
                Ok(())
            })
            .unwrap();
        assert!(retry.generated);
    }

    #[test]
    fn concurrent_requests_generate_once() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(AssetCache::on_disk(dir.path()));
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                std::thread::spawn(move || {
                    cache
                        .get_or_create("gradients", "shared.png", |path| {
                            calls.fetch_add(1, Ordering::SeqCst);
                            std::thread::sleep(std::time::Duration::from_millis(5));
                            std::fs::write(path, b"png")?;
                            Ok(())
                        })
                        .unwrap()
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn key_locks_are_released() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AssetCache::on_disk(dir.path());

        for i in 0..16 {
            cache
                .get_or_create("gradients", &format!("{i}.png"), |path| {
                    std::fs::write(path, b"png")?;
                    Ok(())
                })
                .unwrap();
        }
        cache
            .get_or_create("gradients", "broken.png", |_| Err(RenderError::EmptyStops))
            .unwrap_err();
        cache.get_or_create("gradients", "0.png", |_| Ok(())).unwrap();

        assert!(cache.locks.lock().is_empty());
    }

    #[test]
    fn key_locks_are_released_after_concurrent_requests() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AssetCache::on_disk(dir.path());

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    cache
                        .get_or_create("gradients", "shared.png", |path| {
                            std::thread::sleep(std::time::Duration::from_millis(5));
                            std::fs::write(path, b"png")?;
                            Ok(())
                        })
                        .unwrap()
                });
            }
        });

        assert!(cache.locks.lock().is_empty());
    }

    #[test]
    fn clear_removes_namespace() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AssetCache::on_disk(dir.path());
        cache
            .get_or_create("gradients", "a.png", |path| {
                std::fs::write(path, b"png")?;
                Ok(())
            })
            .unwrap();

        cache.clear("gradients").unwrap();
        assert!(!cache.exists("gradients/a.png"));
    }
}
