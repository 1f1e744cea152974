//! Template caching.
//!
//! [`TemplateCache`] layers a bounded in-memory LRU ([`MemoryCache`]) over a
//! persistent [`DiskStore`] and a [`RemoteSource`](crate::registry::RemoteSource).
//! The catalog on disk is refreshed once it is older than the configured TTL.
//!
//! # Example
//!
//! ```no_run
//! use memeplot::cache::TemplateCache;
//!
//! let cache = TemplateCache::default();
//! let image = cache.resolve("buzz")?;
//! println!("{} bytes of {}", image.len(), image.format());
//! # Ok::<(), memeplot::MemeError>(())
//! ```

pub mod entry;
pub mod key;
pub mod memory;
pub mod payload;
pub mod store;
pub mod template_cache;
pub mod validation;

pub use entry::CatalogDocument;
pub use key::{TemplateKey, IMAGE_EXTENSIONS};
pub use memory::{MemoryCache, DEFAULT_MEMORY_CAPACITY};
pub use payload::{ImageFormat, ImagePayload};
pub use store::{CachedImage, DiskStore};
pub use template_cache::TemplateCache;
pub use validation::{
    format_duration, freshness_at, parse_ttl, Freshness, DEFAULT_CATALOG_TTL_SECS,
};

/// Get the default cache directory.
pub fn default_cache_dir() -> std::path::PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("memeplot")
        .join("templates")
}
