//! CSS preprocessor for cross-browser CSS3.
//!
//! CSScaffold scans a stylesheet for declarations of high-level properties
//! and replaces each one with the declarations older browsers understand:
//!
//! - **Vendor prefixes** for `border-radius`, `box-shadow` and `transition`
//! - **Legacy filters** for `opacity` and `rgba()` background colors
//! - **Behavior shims** (`.htc`) for corners and shadows in old Internet Explorer
//! - **Generated gradients**: `background-gradient` renders a cached PNG
//!
//! Everything else in the stylesheet is copied through byte for byte.
//!
//! # Example
//!
//! ```no_run
//! use csscaffold::prelude::*;
//!
//! let config = ScaffoldConfig::from_file("csscaffold.toml")?;
//! let rewriter = StylesheetRewriter::new(config);
//!
//! let output = rewriter.rewrite_file("themes/site/style.css")?;
//! for failure in &output.failures {
//!     eprintln!("{} in '{}': {}", failure.property, failure.selector, failure.error);
//! }
//! println!("{}", output.css);
//! # Ok::<(), csscaffold::Error>(())
//! ```

pub mod cache;
pub mod config;
pub mod handlers;
pub mod logging;
pub mod parser;
pub mod registry;
pub mod rewriter;
pub mod types;

mod error;

#[cfg(test)]
mod testing;

pub use config::ScaffoldConfig;
pub use error::{Error, Result};
pub use rewriter::{DeclarationFailure, RewriteOutput, StylesheetRewriter};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::cache::{AssetCache, CacheBackend, FileCacheBackend, StylesheetCache};
    pub use crate::config::ScaffoldConfig;
    pub use crate::handlers::{GeneratedGradient, GradientDirection, GradientSpec};
    pub use crate::registry::{HandlerContext, PropertyHandler, PropertyRegistry};
    pub use crate::rewriter::{DeclarationFailure, RewriteOutput, StylesheetRewriter};
    pub use crate::types::{ColorTriple, PolarOffset};
    pub use crate::{Error, Result};
}
