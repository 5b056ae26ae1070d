//! Error types for the preprocessor.

use std::path::PathBuf;

use csscaffold_render::RenderError;

/// Result type alias for preprocessor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while expanding a stylesheet.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A color is neither 3- nor 6-digit hex nor a recognized `rgba()` form.
    #[error("Invalid color format '{value}'")]
    InvalidColorFormat { value: String },

    /// A value does not have the shape its property handler expects.
    #[error("Invalid value for property '{property}': {message}")]
    MalformedPropertyValue {
        property: String,
        value: String,
        message: String,
    },

    /// A `background-gradient` value is missing required tokens.
    #[error("Malformed gradient '{value}': {message}")]
    MalformedGradient { value: String, message: String },

    /// Generating a cached asset failed.
    #[error("Failed to generate asset '{key}': {source}")]
    AssetGeneration {
        key: String,
        #[source]
        source: RenderError,
    },

    /// File I/O error.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be loaded.
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// A stylesheet cache record could not be encoded or decoded.
    #[error("Corrupt stylesheet cache entry '{id}': {source}")]
    CacheEntry {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Create a color format error.
    pub fn invalid_color(value: impl Into<String>) -> Self {
        Self::InvalidColorFormat {
            value: value.into(),
        }
    }

    /// Create a property value error.
    pub fn malformed_value(
        property: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::MalformedPropertyValue {
            property: property.into(),
            value: value.into(),
            message: message.into(),
        }
    }

    /// Create a gradient error.
    pub fn malformed_gradient(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedGradient {
            value: value.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error must be reported to the caller of a rewrite pass.
    ///
    /// Asset failures are user-visible (a stylesheet would reference a missing
    /// image); every other handler error only affects its own declaration.
    pub fn is_asset_failure(&self) -> bool {
        matches!(self, Self::AssetGeneration { .. } | Self::Io { .. })
    }
}
