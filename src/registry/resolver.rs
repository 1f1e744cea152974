//! Catalog-facing template lookup.
//!
//! [`TemplateRegistry`] answers "which templates exist" questions. All data
//! goes through its [`TemplateCache`], so listings obey the same TTL and
//! stale-fallback rules as image lookups.

use crate::cache::{TemplateCache, TemplateKey};
use crate::config::CacheConfig;
use crate::error::{MemeError, Result};
use crate::registry::template::{Template, TemplateMetadata};

/// Template registry over a template cache.
pub struct TemplateRegistry {
    cache: TemplateCache,
}

impl TemplateRegistry {
    /// Create a registry over an existing cache.
    pub fn new(cache: TemplateCache) -> Self {
        Self { cache }
    }

    /// Create a registry with its own cache built from `config`.
    pub fn from_config(config: CacheConfig) -> Self {
        Self::new(TemplateCache::new(config))
    }

    /// The underlying cache.
    pub fn cache(&self) -> &TemplateCache {
        &self.cache
    }

    /// All catalog templates, in catalog order.
    pub fn list_all(&self) -> Result<Vec<TemplateMetadata>> {
        self.cache.catalog()
    }

    /// Templates whose id, name or keywords contain `query`, ignoring case.
    pub fn search(&self, query: &str) -> Result<Vec<TemplateMetadata>> {
        let query = query.trim().to_lowercase();
        Ok(self
            .cache
            .catalog()?
            .into_iter()
            .filter(|t| t.matches(&query))
            .collect())
    }

    /// Metadata for one catalog id.
    pub fn get(&self, id: &str) -> Result<TemplateMetadata> {
        self.cache.template(id)
    }

    /// Re-fetch the catalog regardless of age; returns the template count.
    pub fn refresh(&self) -> Result<usize> {
        let templates = self.cache.refresh()?;
        tracing::info!("Catalog refreshed: {} templates", templates.len());
        Ok(templates.len())
    }

    /// Load metadata and image for any key.
    ///
    /// Paths and URLs get synthesized metadata with the default two-line
    /// layout; use [`TemplateRegistry::load_image`] to pick the line count.
    pub fn load(&self, key: &str) -> Result<Template> {
        match TemplateKey::classify(key) {
            TemplateKey::CatalogId(id) => self.load_catalog_template(&id),
            _ => self.load_image(key, 2, None),
        }
    }

    /// Load a path or URL as a template with `lines` evenly spaced slots.
    pub fn load_image(&self, path_or_url: &str, lines: usize, name: Option<&str>) -> Result<Template> {
        let metadata = TemplateMetadata::from_image(path_or_url, lines, name)?;
        let key = TemplateKey::classify(path_or_url);
        if key.catalog_id().is_some() {
            return Err(MemeError::InvalidInput {
                message: format!("'{}' is not a path or URL", path_or_url),
            });
        }

        let image = self.cache.resolve_with(&key, false)?;
        Ok(Template { metadata, image })
    }

    fn load_catalog_template(&self, id: &str) -> Result<Template> {
        let metadata = self.cache.template(id)?;

        let image = match self.cache.resolve(id) {
            // Served by a direct lookup but absent from the listing: fetch
            // the image from the URL the lookup returned.
            Err(MemeError::TemplateNotFound { .. }) => {
                tracing::debug!("'{}' not listed, loading {}", id, metadata.image_url);
                self.cache
                    .resolve_with(&TemplateKey::classify(&metadata.image_url), false)?
            }
            other => other?,
        };

        Ok(Template { metadata, image })
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new(TemplateCache::default())
    }
}
