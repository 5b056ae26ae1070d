//! Preprocessor configuration.
//!
//! Every handler receives the configuration through its context; nothing is
//! looked up from process-wide state.
//!
//! # Example
//!
//! ```
//! use csscaffold::ScaffoldConfig;
//!
//! let config = ScaffoldConfig::from_toml_str(r#"
//! system_url = "/wp-content/plugins/pd-styles/scaffold/"
//! cache_dir = "/var/cache/csscaffold"
//! "#).unwrap();
//!
//! assert_eq!(
//!     config.behavior_url("border-radius.htc"),
//!     "/wp-content/plugins/pd-styles/scaffold/extensions/CSS3/behaviors/border-radius.htc"
//! );
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Lifetime of cached output when no maximum age is configured.
pub const ONE_YEAR: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// Settings shared by the rewriter, its handlers and the caches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaffoldConfig {
    /// Public base URL of the preprocessor installation, used for behavior shims.
    pub system_url: String,
    /// Root directory of the file-system cache.
    pub cache_dir: PathBuf,
    /// Anchor that marks the public part of an asset path.
    pub public_root: String,
    /// Cache namespace for generated gradient images.
    pub gradient_namespace: String,
    /// Maximum age of cached stylesheet output, in seconds.
    pub output_max_age_secs: Option<u64>,
    /// Prefix for stylesheet cache records.
    pub output_cache_prefix: String,
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self {
            system_url: "/scaffold/".to_string(),
            cache_dir: default_cache_dir(),
            public_root: "/wp-content".to_string(),
            gradient_namespace: "gradients".to_string(),
            output_max_age_secs: None,
            output_cache_prefix: "scaffold_".to_string(),
        }
    }
}

impl ScaffoldConfig {
    /// Create a configuration with the given cache directory and defaults otherwise.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            ..Self::default()
        }
    }

    /// Parse a configuration from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Set the system URL.
    pub fn with_system_url(mut self, url: impl Into<String>) -> Self {
        self.system_url = url.into();
        self
    }

    /// Set the public root anchor.
    pub fn with_public_root(mut self, anchor: impl Into<String>) -> Self {
        self.public_root = anchor.into();
        self
    }

    /// URL of a behavior shim shipped with the CSS3 extension.
    pub fn behavior_url(&self, file: &str) -> String {
        let base = self.system_url.trim_end_matches('/');
        format!("{base}/extensions/CSS3/behaviors/{file}")
    }

    /// Make an asset path public by cutting everything before the public root anchor.
    ///
    /// Paths that do not contain the anchor are returned whole.
    pub fn public_path(&self, path: &Path) -> String {
        let path = path.to_string_lossy().replace('\\', "/");
        if self.public_root.is_empty() {
            return path;
        }
        match path.find(&self.public_root) {
            Some(index) => path[index..].to_string(),
            None => path,
        }
    }

    /// Maximum age of cached stylesheet output.
    pub fn output_max_age(&self) -> Duration {
        self.output_max_age_secs
            .map(Duration::from_secs)
            .unwrap_or(ONE_YEAR)
    }
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("csscaffold")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_keys() {
        let config = ScaffoldConfig::from_toml_str("public_root = \"/public\"").unwrap();
        assert_eq!(config.public_root, "/public");
        assert_eq!(config.gradient_namespace, "gradients");
        assert_eq!(config.output_max_age(), ONE_YEAR);
        assert!(config.cache_dir.ends_with("csscaffold"));
    }

    #[test]
    fn invalid_toml_is_reported() {
        let err = ScaffoldConfig::from_toml_str("cache_dir = [").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ScaffoldConfig::from_file("/nonexistent/csscaffold.toml").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn behavior_url_tolerates_missing_slash() {
        let with = ScaffoldConfig::default().with_system_url("/sys/");
        let without = ScaffoldConfig::default().with_system_url("/sys");
        assert_eq!(with.behavior_url("a.htc"), "/sys/extensions/CSS3/behaviors/a.htc");
        assert_eq!(without.behavior_url("a.htc"), with.behavior_url("a.htc"));
    }

    #[test]
    fn public_path_cuts_at_anchor() {
        let config = ScaffoldConfig::default();
        let path = Path::new("/srv/site/wp-content/cache/gradients/a.png");
        assert_eq!(config.public_path(path), "/wp-content/cache/gradients/a.png");

        let elsewhere = Path::new("/tmp/gradients/a.png");
        assert_eq!(config.public_path(elsewhere), "/tmp/gradients/a.png");

        let no_anchor = ScaffoldConfig::default().with_public_root("");
        assert_eq!(no_anchor.public_path(path), "/srv/site/wp-content/cache/gradients/a.png");
    }

    #[test]
    fn max_age_from_seconds() {
        let config = ScaffoldConfig::from_toml_str("output_max_age_secs = 60").unwrap();
        assert_eq!(config.output_max_age(), Duration::from_secs(60));
    }
}
