//! Tracing integration.
//!
//! The preprocessor logs through the `tracing` crate and never installs a
//! subscriber itself. Applications choose one, for example:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("csscaffold::cache=debug")
//!     .init();
//! ```

/// Target names for log filtering.
pub mod targets {
    /// Stylesheet rewrite passes.
    pub const REWRITE: &str = "csscaffold::rewrite";
    /// Handler registration and dispatch.
    pub const REGISTRY: &str = "csscaffold::registry";
    /// Asset and stylesheet caches.
    pub const CACHE: &str = "csscaffold::cache";
    /// Gradient parsing and generation.
    pub const GRADIENT: &str = "csscaffold::gradient";
}
