//! File-backed cache of processed stylesheet output.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::ScaffoldConfig;
use crate::logging::targets;
use crate::{Error, Result};

/// A cached stylesheet together with its bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedStylesheet {
    /// Id the stylesheet was stored under.
    pub id: String,
    /// The processed stylesheet text.
    pub contents: String,
    /// When the source stylesheet was last modified, if known.
    pub last_modified: Option<DateTime<Utc>>,
    /// When this record stops being served.
    pub expires: DateTime<Utc>,
}

impl CachedStylesheet {
    /// Whether the record has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires <= now
    }
}

/// Stores processed stylesheets as JSON records, one file per id.
///
/// Record files are named `{prefix}{digest}.json`, where the digest is derived
/// from the id. [`StylesheetCache::delete_all`] removes every record with the
/// prefix, which is how a forced recache is performed.
#[derive(Debug, Clone)]
pub struct StylesheetCache {
    dir: PathBuf,
    prefix: String,
    max_age: Duration,
}

impl StylesheetCache {
    /// Create a cache in `dir`.
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>, max_age: Duration) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            max_age,
        }
    }

    /// Create the cache described by `config`, below `{cache_dir}/output`.
    pub fn from_config(config: &ScaffoldConfig) -> Self {
        Self::new(
            config.cache_dir.join("output"),
            config.output_cache_prefix.clone(),
            config.output_max_age(),
        )
    }

    /// The directory records are stored in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Fetch a record that has not expired.
    pub fn get(&self, id: &str) -> Result<Option<CachedStylesheet>> {
        self.get_at(id, Utc::now())
    }

    /// Fetch a record that has not expired at `now`. Expired records are removed.
    pub fn get_at(&self, id: &str, now: DateTime<Utc>) -> Result<Option<CachedStylesheet>> {
        let path = self.record_path(id);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::io(&path, e)),
        };

        let record: CachedStylesheet =
            serde_json::from_str(&text).map_err(|source| Error::CacheEntry {
                id: id.to_string(),
                source,
            })?;

        if record.is_expired_at(now) {
            tracing::debug!(target: targets::CACHE, id, "stylesheet cache entry expired");
            self.delete(id)?;
            return Ok(None);
        }

        Ok(Some(record))
    }

    /// Store `contents` under `id` and return the record path.
    pub fn set(
        &self,
        id: &str,
        contents: &str,
        last_modified: Option<DateTime<Utc>>,
    ) -> Result<PathBuf> {
        self.set_at(id, contents, last_modified, Utc::now())
    }

    /// Store `contents` under `id`, computing the expiry from `now`.
    pub fn set_at(
        &self,
        id: &str,
        contents: &str,
        last_modified: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<PathBuf> {
        let fallback = TimeDelta::days(365);
        let lifetime = TimeDelta::from_std(self.max_age).unwrap_or(fallback);
        let expires = now
            .checked_add_signed(lifetime)
            .unwrap_or_else(|| now + fallback);

        let record = CachedStylesheet {
            id: id.to_string(),
            contents: contents.to_string(),
            last_modified,
            expires,
        };
        let json = serde_json::to_vec(&record).map_err(|source| Error::CacheEntry {
            id: id.to_string(),
            source,
        })?;

        std::fs::create_dir_all(&self.dir).map_err(|e| Error::io(&self.dir, e))?;
        let path = self.record_path(id);

        let mut temp = tempfile::NamedTempFile::new_in(&self.dir).map_err(|e| Error::io(&self.dir, e))?;
        temp.write_all(&json).map_err(|e| Error::io(temp.path(), e))?;
        temp.persist(&path).map_err(|e| Error::io(&path, e.error))?;

        tracing::debug!(target: targets::CACHE, id, path = %path.display(), "stored stylesheet output");
        Ok(path)
    }

    /// Remove the record stored under `id`, if any.
    pub fn delete(&self, id: &str) -> Result<()> {
        let path = self.record_path(id);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(&path, e)),
        }
    }

    /// Remove every record carrying this cache's prefix. Returns how many were removed.
    pub fn delete_all(&self) -> Result<usize> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(Error::io(&self.dir, e)),
        };

        let mut removed = 0;
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(&self.dir, e))?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(&self.prefix) && name.ends_with(".json") {
                let path = entry.path();
                std::fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;
                removed += 1;
            }
        }

        tracing::info!(target: targets::CACHE, removed, "cleared stylesheet cache");
        Ok(removed)
    }

    fn record_path(&self, id: &str) -> PathBuf {
        let digest = Sha256::digest(id.as_bytes());
        let hex: String = digest[..12].iter().map(|b| format!("{b:02x}")).collect();
        self.dir.join(format!("{}{}.json", self.prefix, hex))
    }
}

impl Default for StylesheetCache {
    fn default() -> Self {
        Self::from_config(&ScaffoldConfig::default())
    }
}
