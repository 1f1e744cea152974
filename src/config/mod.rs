//! Configuration for the template cache.
//!
//! - Schema definitions in [`schema`]
//! - File discovery, loading and environment overrides in [`loader`]
//!
//! # Example
//!
//! ```
//! use memeplot::config::{parse_config, CorruptCatalogPolicy};
//! use std::path::Path;
//!
//! let config = parse_config("catalog_ttl: 1h\non_corrupt_catalog: refetch", Path::new("config.yml")).unwrap();
//! assert_eq!(config.catalog_ttl, chrono::Duration::hours(1));
//! assert_eq!(config.on_corrupt_catalog, CorruptCatalogPolicy::Refetch);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{
    apply_env_overrides, default_config_path, load_config, load_config_file, parse_config,
};
pub use schema::{CacheConfig, CorruptCatalogPolicy};
