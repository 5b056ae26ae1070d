//! Whole-stylesheet rewrite passes.

use std::path::Path;

use csscaffold_render::{GradientRenderer, ImageGradientRenderer};

use crate::cache::{AssetCache, StylesheetCache};
use crate::config::ScaffoldConfig;
use crate::handlers::GeneratedGradient;
use crate::logging::targets;
use crate::parser::scan_declarations;
use crate::registry::{HandlerContext, PropertyRegistry, RewriteSession};
use crate::{Error, Result};

/// A declaration whose expansion failed in a way the caller must know about.
#[derive(Debug)]
pub struct DeclarationFailure {
    /// Property name, lowercased.
    pub property: String,
    /// Selector of the enclosing rule.
    pub selector: String,
    /// What went wrong.
    pub error: Error,
}

/// Result of one rewrite pass.
#[derive(Debug, Default)]
pub struct RewriteOutput {
    /// The rewritten stylesheet.
    pub css: String,
    /// Gradients requested during the pass, in encounter order.
    pub gradients: Vec<GeneratedGradient>,
    /// Asset generation failures. The affected declarations were left as written.
    pub failures: Vec<DeclarationFailure>,
    /// Whether `css` came from the stylesheet output cache.
    pub from_cache: bool,
}

impl RewriteOutput {
    /// Whether every declaration was processed without an asset failure.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Rewrites stylesheets by expanding every declaration that has a registered handler.
///
/// Declarations without a handler, comments, whitespace and everything
/// outside declarations are copied through untouched.
///
/// # Example
///
/// ```no_run
/// use csscaffold::{ScaffoldConfig, StylesheetRewriter};
///
/// let rewriter = StylesheetRewriter::new(ScaffoldConfig::new("/var/www/wp-content/cache"));
/// let output = rewriter.rewrite(".box { border-radius: 4px; }");
/// assert!(output.css.contains("-moz-border-radius:4px;"));
/// ```
pub struct StylesheetRewriter {
    registry: PropertyRegistry,
    config: ScaffoldConfig,
    assets: AssetCache,
    renderer: Box<dyn GradientRenderer>,
}

impl StylesheetRewriter {
    /// Create a rewriter with the built-in handlers, an on-disk asset cache
    /// below `config.cache_dir` and the PNG gradient renderer.
    pub fn new(config: ScaffoldConfig) -> Self {
        let assets = AssetCache::on_disk(&config.cache_dir);
        Self::with_parts(
            config,
            PropertyRegistry::with_defaults(),
            assets,
            ImageGradientRenderer::new(),
        )
    }

    /// Create a rewriter from custom collaborators.
    pub fn with_parts(
        config: ScaffoldConfig,
        registry: PropertyRegistry,
        assets: AssetCache,
        renderer: impl GradientRenderer + 'static,
    ) -> Self {
        Self {
            registry,
            config,
            assets,
            renderer: Box::new(renderer),
        }
    }

    /// The handler registry.
    pub fn registry(&self) -> &PropertyRegistry {
        &self.registry
    }

    /// Mutable access to the handler registry, for registering extensions.
    pub fn registry_mut(&mut self) -> &mut PropertyRegistry {
        &mut self.registry
    }

    /// The configuration handlers see.
    pub fn config(&self) -> &ScaffoldConfig {
        &self.config
    }

    /// The asset cache generated images are stored in.
    pub fn assets(&self) -> &AssetCache {
        &self.assets
    }

    /// Rewrite one stylesheet.
    ///
    /// A failing declaration never stops the pass: its original text is kept
    /// and, for asset generation failures, it is reported in
    /// [`RewriteOutput::failures`].
    pub fn rewrite(&self, css: &str) -> RewriteOutput {
        let declarations = scan_declarations(css);
        let mut session = RewriteSession::default();
        let mut failures = Vec::new();
        let mut out = String::with_capacity(css.len());
        let mut cursor = 0;

        for declaration in &declarations {
            let mut ctx = HandlerContext {
                property: &declaration.name,
                selector: &declaration.selector,
                raw_declaration: declaration.raw(css),
                config: &self.config,
                assets: &self.assets,
                renderer: self.renderer.as_ref(),
                session: &mut session,
            };
            let Some(result) = self
                .registry
                .dispatch(&declaration.name, &declaration.value, &mut ctx)
            else {
                continue;
            };

            match result {
                Ok(replacement) => {
                    out.push_str(&css[cursor..declaration.span.start]);
                    out.push_str(&replacement);
                    cursor = declaration.span.end;
                }
                Err(error) if error.is_asset_failure() => {
                    tracing::warn!(
                        target: targets::REWRITE,
                        property = %declaration.name,
                        selector = %declaration.selector,
                        "asset generation failed, keeping declaration: {}",
                        error
                    );
                    failures.push(DeclarationFailure {
                        property: declaration.name.clone(),
                        selector: declaration.selector.clone(),
                        error,
                    });
                }
                Err(error) => {
                    tracing::warn!(
                        target: targets::REWRITE,
                        property = %declaration.name,
                        selector = %declaration.selector,
                        "keeping declaration unchanged: {}",
                        error
                    );
                }
            }
        }
        out.push_str(&css[cursor..]);

        tracing::debug!(
            target: targets::REWRITE,
            declarations = declarations.len(),
            gradients = session.gradients.len(),
            failures = failures.len(),
            "rewrite pass finished"
        );

        RewriteOutput {
            css: out,
            gradients: session.gradients,
            failures,
            from_cache: false,
        }
    }

    /// Read and rewrite the stylesheet at `path`.
    pub fn rewrite_file(&self, path: impl AsRef<Path>) -> Result<RewriteOutput> {
        let path = path.as_ref();
        let css = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Ok(self.rewrite(&css))
    }

    /// Rewrite `css`, serving and storing the result through `cache` under `id`.
    ///
    /// Output is only stored when the pass had no failures, so a broken asset
    /// is retried on the next request. A corrupt cache record is discarded and
    /// the stylesheet rewritten.
    pub fn rewrite_cached(&self, id: &str, css: &str, cache: &StylesheetCache) -> Result<RewriteOutput> {
        match cache.get(id) {
            Ok(Some(record)) => {
                tracing::debug!(target: targets::CACHE, id, "serving cached stylesheet");
                return Ok(RewriteOutput {
                    css: record.contents,
                    from_cache: true,
                    ..RewriteOutput::default()
                });
            }
            Ok(None) => {}
            Err(error @ Error::CacheEntry { .. }) => {
                tracing::warn!(target: targets::CACHE, id, "discarding cache record: {}", error);
                cache.delete(id)?;
            }
            Err(error) => return Err(error),
        }

        let output = self.rewrite(css);
        if output.is_clean() {
            cache.set(id, &output.css, None)?;
        }
        Ok(output)
    }
}

impl std::fmt::Debug for StylesheetRewriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StylesheetRewriter")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .field("assets", &self.assets)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testing::CountingRenderer;

    fn rewriter(dir: &Path, renderer: CountingRenderer) -> StylesheetRewriter {
        let cache_dir = dir.join("wp-content/cache");
        StylesheetRewriter::with_parts(
            ScaffoldConfig::new(&cache_dir).with_system_url("/scaffold/"),
            PropertyRegistry::with_defaults(),
            AssetCache::on_disk(&cache_dir),
            renderer,
        )
    }

    #[test]
    fn untouched_text_is_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let rewriter = rewriter(dir.path(), CountingRenderer::default());
        let css = "/* header */\n#a { color: red; transition: all 1s; }\n\n.b{margin:0}\n";

        let output = rewriter.rewrite(css);

        assert_eq!(
            output.css,
            "/* header */\n#a { color: red; -moz-transition:all 1s;-webkit-transition:all 1s;\
             -o-transition:all 1s;transition:all 1s; }\n\n.b{margin:0}\n"
        );
        assert!(output.is_clean());
        assert!(!output.from_cache);
    }

    #[test]
    fn malformed_gradient_keeps_declaration() {
        let dir = tempfile::tempdir().unwrap();
        let rewriter = rewriter(dir.path(), CountingRenderer::default());
        let css = "#a { background-gradient: sideways, 10px; opacity: 0.5; }";

        let output = rewriter.rewrite(css);

        assert!(output.css.contains("background-gradient: sideways, 10px;"));
        assert!(output.css.contains("Alpha(opacity=50);"));
        assert!(output.is_clean());
    }

    #[test]
    fn oversized_gradient_does_not_stop_the_pass() {
        let dir = tempfile::tempdir().unwrap();
        let rewriter = rewriter(dir.path(), CountingRenderer::default());
        let css = ".a { background-gradient: vertical, 4000000000px, from(#fff), to(#000); } .b { opacity: 0.5; }";

        let output = rewriter.rewrite(css);

        assert!(output.css.contains("background-gradient: vertical, 4000000000px, from(#fff), to(#000);"));
        assert!(output.css.contains(".b { opacity: 0.5;filter: progid:DXImageTransform.Microsoft.Alpha(opacity=50); }"));
        assert!(output.gradients.is_empty());
        assert!(output.is_clean());
    }

    #[test]
    fn asset_failures_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let rewriter = rewriter(dir.path(), CountingRenderer::failing());
        let css = "#a { background-gradient: vertical, 10px, from(#fff), to(#000); border-radius: 2px; }";

        let output = rewriter.rewrite(css);

        assert_eq!(output.failures.len(), 1);
        assert_eq!(output.failures[0].property, "background-gradient");
        assert_eq!(output.failures[0].selector, "#a");
        assert!(output.failures[0].error.is_asset_failure());
        assert!(output.css.contains("background-gradient: vertical, 10px, from(#fff), to(#000);"));
        assert!(output.css.contains("border-radius:2px;"));
    }

    #[test]
    fn custom_handlers_take_part() {
        let dir = tempfile::tempdir().unwrap();
        let mut rewriter = rewriter(dir.path(), CountingRenderer::default());
        rewriter
            .registry_mut()
            .register_fn("zoom", |value, _ctx| Ok(format!("zoom:{value};*zoom:{value};")));

        let output = rewriter.rewrite(".a { zoom: 1 }");
        assert_eq!(output.css, ".a { zoom:1;*zoom:1; }");
    }

    #[test]
    fn rewrite_file_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let rewriter = rewriter(dir.path(), CountingRenderer::default());

        let err = rewriter.rewrite_file(dir.path().join("missing.css")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn rewrite_file_reads_stylesheet() {
        let dir = tempfile::tempdir().unwrap();
        let rewriter = rewriter(dir.path(), CountingRenderer::default());
        let path = dir.path().join("style.css");
        std::fs::write(&path, ".a { text-shadow: 1px 1px #000; }").unwrap();

        let output = rewriter.rewrite_file(&path).unwrap();
        assert!(output.css.contains("behavior:url('/scaffold/extensions/CSS3/behaviors/text-shadow.htc');"));
    }

    #[test]
    fn cached_output_is_served() {
        let dir = tempfile::tempdir().unwrap();
        let rewriter = rewriter(dir.path(), CountingRenderer::default());
        let cache = StylesheetCache::new(dir.path().join("output"), "scaffold_", Duration::from_secs(60));

        let first = rewriter.rewrite_cached("style.css", ".a { opacity: 0.5; }", &cache).unwrap();
        assert!(!first.from_cache);

        // Source changes are not seen until the record is dropped.
        let second = rewriter.rewrite_cached("style.css", ".a { opacity: 0.9; }", &cache).unwrap();
        assert!(second.from_cache);
        assert_eq!(second.css, first.css);

        cache.delete_all().unwrap();
        let third = rewriter.rewrite_cached("style.css", ".a { opacity: 0.9; }", &cache).unwrap();
        assert!(!third.from_cache);
        assert!(third.css.contains("Alpha(opacity=90);"));
    }

    #[test]
    fn failed_passes_are_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let rewriter = rewriter(dir.path(), CountingRenderer::failing());
        let cache = StylesheetCache::new(dir.path().join("output"), "scaffold_", Duration::from_secs(60));
        let css = "#a { background-gradient: vertical, 10px, from(#fff), to(#000); }";

        let output = rewriter.rewrite_cached("style.css", css, &cache).unwrap();
        assert!(!output.is_clean());
        assert!(cache.get("style.css").unwrap().is_none());
    }

    #[test]
    fn corrupt_cache_record_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let rewriter = rewriter(dir.path(), CountingRenderer::default());
        let cache = StylesheetCache::new(dir.path().join("output"), "scaffold_", Duration::from_secs(60));

        let path = cache.set("style.css", "stale", None).unwrap();
        std::fs::write(&path, b"{").unwrap();

        let output = rewriter.rewrite_cached("style.css", ".a { opacity: 0.5; }", &cache).unwrap();
        assert!(!output.from_cache);
        assert_eq!(cache.get("style.css").unwrap().unwrap().contents, output.css);
    }
}
