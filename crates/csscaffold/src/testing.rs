//! Shared fixtures for unit tests.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use csscaffold_render::{
    GradientRenderer, ImageGradientRenderer, LinearGradient, RenderError, RenderResult,
};
use tempfile::TempDir;

use crate::cache::AssetCache;
use crate::config::ScaffoldConfig;
use crate::registry::{HandlerContext, RewriteSession};

/// Renders real PNGs and counts how often it was asked to.
#[derive(Debug, Default)]
pub(crate) struct CountingRenderer {
    calls: AtomicUsize,
    fail: bool,
}

impl CountingRenderer {
    pub(crate) fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl GradientRenderer for CountingRenderer {
    fn render(&self, gradient: &LinearGradient, path: &Path) -> RenderResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RenderError::Io(std::io::Error::other("render failed")));
        }
        ImageGradientRenderer::new().render(gradient, path)
    }
}

/// Owns everything a [`HandlerContext`] borrows.
pub(crate) struct Harness {
    pub(crate) dir: TempDir,
    pub(crate) config: ScaffoldConfig,
    pub(crate) assets: AssetCache,
    pub(crate) renderer: CountingRenderer,
    pub(crate) session: RewriteSession,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self::with_renderer(CountingRenderer::default())
    }

    pub(crate) fn failing() -> Self {
        Self::with_renderer(CountingRenderer::failing())
    }

    fn with_renderer(renderer: CountingRenderer) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let cache_dir = dir.path().join("site/wp-content/cache");
        let config = ScaffoldConfig::new(&cache_dir).with_system_url("/scaffold/");
        let assets = AssetCache::on_disk(&cache_dir);

        Self {
            dir,
            config,
            assets,
            renderer,
            session: RewriteSession::default(),
        }
    }

    pub(crate) fn context<'a>(&'a mut self, property: &'a str, selector: &'a str) -> HandlerContext<'a> {
        HandlerContext {
            property,
            selector,
            raw_declaration: "",
            config: &self.config,
            assets: &self.assets,
            renderer: &self.renderer,
            session: &mut self.session,
        }
    }
}
