//! Asset and stylesheet caches.

mod asset;
mod backend;
mod output;

pub use asset::{AssetCache, CachedAsset};
pub use backend::{CacheBackend, CacheEntry, FileCacheBackend};
pub use output::{CachedStylesheet, StylesheetCache};
