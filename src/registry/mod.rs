//! Meme template registry.
//!
//! - [`template`]: metadata, text positions and the API record format
//! - [`source`]: the [`RemoteSource`] seam and its HTTP implementation
//! - [`resolver`]: [`TemplateRegistry`], the catalog-facing API
//!
//! # Example
//!
//! ```no_run
//! use memeplot::registry::TemplateRegistry;
//!
//! let registry = TemplateRegistry::default();
//! for template in registry.search("cat")? {
//!     println!("{}: {}", template.id, template.name);
//! }
//! # Ok::<(), memeplot::MemeError>(())
//! ```

pub mod fetch;
pub mod resolver;
pub mod source;
pub mod template;

// Re-exports
pub use fetch::HttpFetcher;
pub use resolver::TemplateRegistry;
pub use source::{HttpSource, RemoteSource, DEFAULT_API_BASE};
pub use template::{
    Alignment, ApiExample, ApiTemplate, Template, TemplateMetadata, TextPosition, TextStyle,
    MAX_TEXT_LINES,
};
