//! Property handler registry.
//!
//! Extensions register one handler per property name before a rewrite pass
//! starts. Registering a name again replaces the earlier handler, so an
//! extension can override a built-in expansion.
//!
//! # Example
//!
//! ```
//! use csscaffold::registry::PropertyRegistry;
//!
//! let mut registry = PropertyRegistry::with_defaults();
//! registry.register_fn("zoom", |value, _ctx| Ok(format!("zoom:{value};*zoom:{value};")));
//! assert!(registry.contains("zoom"));
//! ```

use std::collections::HashMap;

use csscaffold_render::GradientRenderer;

use crate::Result;
use crate::cache::AssetCache;
use crate::config::ScaffoldConfig;
use crate::handlers::GeneratedGradient;
use crate::logging::targets;

/// Per-pass state shared by all handlers of one rewrite.
#[derive(Debug, Clone, Default)]
pub struct RewriteSession {
    /// Gradients requested during the pass, in encounter order.
    pub gradients: Vec<GeneratedGradient>,
}

/// Everything a handler may consult while expanding one declaration.
pub struct HandlerContext<'a> {
    /// Lowercased property name.
    pub property: &'a str,
    /// Selector of the enclosing rule.
    pub selector: &'a str,
    /// The declaration as written, including its semicolon.
    pub raw_declaration: &'a str,
    /// Preprocessor configuration.
    pub config: &'a ScaffoldConfig,
    /// Cache for generated assets.
    pub assets: &'a AssetCache,
    /// Image generation backend.
    pub renderer: &'a dyn GradientRenderer,
    /// State of the current rewrite pass.
    pub session: &'a mut RewriteSession,
}

/// Expands one declaration value into replacement CSS.
///
/// The returned text replaces the whole declaration, so handlers re-emit the
/// base property themselves when it should be kept.
pub trait PropertyHandler: Send + Sync {
    /// Expand `value` into replacement declarations.
    fn expand(&self, value: &str, ctx: &mut HandlerContext<'_>) -> Result<String>;
}

impl<F> PropertyHandler for F
where
    F: Fn(&str, &mut HandlerContext<'_>) -> Result<String> + Send + Sync,
{
    fn expand(&self, value: &str, ctx: &mut HandlerContext<'_>) -> Result<String> {
        self(value, ctx)
    }
}

/// Mapping from property name to handler.
#[derive(Default)]
pub struct PropertyRegistry {
    handlers: HashMap<String, Box<dyn PropertyHandler>>,
}

impl PropertyRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every built-in handler registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        crate::handlers::register_defaults(&mut registry);
        registry
    }

    /// Register `handler` for `name`, replacing any earlier registration.
    pub fn register(&mut self, name: &str, handler: impl PropertyHandler + 'static) {
        let name = name.trim().to_ascii_lowercase();
        if self.handlers.insert(name.clone(), Box::new(handler)).is_some() {
            tracing::debug!(target: targets::REGISTRY, "Replaced handler for '{}'", name);
        }
    }

    /// Register a closure for `name`.
    pub fn register_fn<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&str, &mut HandlerContext<'_>) -> Result<String> + Send + Sync + 'static,
    {
        self.register(name, handler);
    }

    /// Expand a declaration with the handler registered for `name`.
    ///
    /// Returns `None` when no handler is registered; the declaration should
    /// then be left untouched.
    pub fn dispatch(
        &self,
        name: &str,
        value: &str,
        ctx: &mut HandlerContext<'_>,
    ) -> Option<Result<String>> {
        let handler = self.handlers.get(name.to_ascii_lowercase().as_str())?;
        tracing::debug!(target: targets::REGISTRY, "Dispatching '{}' in '{}'", name, ctx.selector);
        Some(handler.expand(value, ctx))
    }

    /// Whether a handler is registered for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name.to_ascii_lowercase().as_str())
    }

    /// Number of registered properties.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no property is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered property names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for PropertyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyRegistry")
            .field("properties", &self.names())
            .finish()
    }
}
