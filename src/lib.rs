//! memeplot - meme template catalog with a two-tier image cache.
//!
//! Templates come from a memegen-compatible HTTP API. Images are kept in a
//! bounded in-memory LRU and in a persistent disk cache, and the catalog is
//! refreshed once it is older than a configurable TTL.
//!
//! # Modules
//!
//! - [`cache`] - Template keys, memory and disk tiers, and [`cache::TemplateCache`]
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading and environment overrides
//! - [`error`] - Error types and result aliases
//! - [`registry`] - Template metadata, remote sources and catalog search
//! - [`ui`] - Styled terminal output
//!
//! # Example
//!
//! ```
//! use memeplot::cache::TemplateKey;
//! use memeplot::registry::TemplateMetadata;
//!
//! let key = TemplateKey::classify("https://example.com/cat.png");
//! assert_eq!(key.kind(), "url");
//!
//! let meta = TemplateMetadata::from_image("https://example.com/cat.png", 3, None).unwrap();
//! assert_eq!(meta.id, "cat");
//! assert_eq!(meta.line_count(), 3);
//! ```
//!
//! For network-backed behavior, see the integration tests.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod registry;
pub mod ui;

pub use error::{MemeError, Result};
