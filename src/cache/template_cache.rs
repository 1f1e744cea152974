//! Two-tier template cache.
//!
//! A lookup walks memory, then disk, then the remote source; a hit in a
//! lower tier populates the tiers above it.
//!
//! # Failure policy
//!
//! - A transient error ([`MemeError::is_transient`]) while refreshing data
//!   that is already on disk is logged and the stale data is served.
//! - With nothing to fall back on, errors reach the caller unchanged.
//! - [`MemeError::TemplateNotFound`] always reaches the caller.
//! - Disk write failures only cost future hits; they are logged, not raised.
//! - A corrupt catalog follows [`CorruptCatalogPolicy`].

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, info, warn};

use super::entry::CatalogDocument;
use super::key::TemplateKey;
use super::memory::MemoryCache;
use super::payload::ImagePayload;
use super::store::DiskStore;
use super::validation::Freshness;
use crate::config::{CacheConfig, CorruptCatalogPolicy};
use crate::error::{MemeError, Result};
use crate::registry::source::{HttpSource, RemoteSource};
use crate::registry::TemplateMetadata;

/// Template cache over a memory tier, a disk tier and a remote source.
///
/// `Send + Sync`: share it behind an `Arc` to resolve from several threads.
pub struct TemplateCache {
    config: CacheConfig,
    disk: DiskStore,
    memory: Option<Mutex<MemoryCache>>,
    remote: Box<dyn RemoteSource>,
}

impl TemplateCache {
    /// Create a cache that fetches from the HTTP API named in `config`.
    pub fn new(config: CacheConfig) -> Self {
        let remote = HttpSource::new(config.api_base.clone(), config.request_timeout_std());
        Self::with_source(config, Box::new(remote))
    }

    /// Create a cache over a custom remote source.
    pub fn with_source(config: CacheConfig, remote: Box<dyn RemoteSource>) -> Self {
        let disk = DiskStore::new(config.resolved_cache_dir());
        let memory = NonZeroUsize::new(config.memory_capacity)
            .map(|capacity| Mutex::new(MemoryCache::new(capacity)));

        Self {
            config,
            disk,
            memory,
            remote,
        }
    }

    /// The configuration this cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// The disk tier.
    pub fn disk(&self) -> &DiskStore {
        &self.disk
    }

    /// Number of images currently held in memory.
    pub fn memory_len(&self) -> usize {
        self.memory.as_ref().map_or(0, |m| lock(m).len())
    }

    /// Resolve a caller-supplied key to its image.
    pub fn resolve(&self, key: &str) -> Result<ImagePayload> {
        self.resolve_with(&TemplateKey::classify(key), false)
    }

    /// Resolve a classified key, optionally bypassing both cache tiers.
    pub fn resolve_with(&self, key: &TemplateKey, force_refresh: bool) -> Result<ImagePayload> {
        if !force_refresh {
            if let Some(payload) = self.memory_get(key) {
                debug!("Memory hit for {}", key);
                return Ok(payload);
            }
        }

        match key {
            TemplateKey::CatalogId(id) => self.resolve_catalog_id(key, id, force_refresh),
            TemplateKey::LocalPath(_) | TemplateKey::RemoteUrl(_) => {
                self.resolve_external(key, force_refresh)
            }
        }
    }

    /// The current catalog, refreshed if stale.
    ///
    /// A stale catalog is still returned when the refresh fails transiently.
    pub fn catalog(&self) -> Result<Vec<TemplateMetadata>> {
        Ok(self.current_catalog(false)?.templates)
    }

    /// Metadata for one catalog id.
    ///
    /// Falls back to a direct lookup when the listing does not contain it.
    pub fn template(&self, id: &str) -> Result<TemplateMetadata> {
        if let Some(found) = self.current_catalog(false)?.find(id) {
            return Ok(found.clone());
        }

        debug!("'{}' not in catalog listing, trying direct lookup", id);
        self.remote.fetch_template(id)
    }

    /// Fetch the catalog regardless of age and replace the cached copy.
    pub fn refresh(&self) -> Result<Vec<TemplateMetadata>> {
        Ok(self.fetch_catalog()?.templates)
    }

    /// Empty the memory tier and delete everything on disk.
    ///
    /// Returns the number of image files removed from disk.
    pub fn clear(&self) -> Result<usize> {
        if let Some(memory) = &self.memory {
            lock(memory).clear();
        }
        let removed = self.disk.clear()?;
        info!("Cleared template cache ({} images on disk)", removed);
        Ok(removed)
    }

    fn resolve_catalog_id(
        &self,
        key: &TemplateKey,
        id: &str,
        force_refresh: bool,
    ) -> Result<ImagePayload> {
        if !force_refresh && self.config.cache_enabled {
            if let Some(bytes) = self.disk_image(key) {
                debug!("Disk hit for {}", key);
                match self.current_catalog(false) {
                    Ok(catalog) if catalog.find(id).is_none() => {
                        return Err(MemeError::TemplateNotFound { id: id.to_string() });
                    }
                    Ok(_) => {}
                    Err(e) if e.is_transient() => {
                        warn!("Serving cached image for '{}' without a catalog: {}", id, e);
                    }
                    Err(e) => return Err(e),
                }

                if let Some(payload) = self.decode_cached(key, bytes) {
                    self.memory_put(&payload);
                    return Ok(payload);
                }
            }
        }

        let catalog = self.current_catalog(force_refresh)?;
        let bytes = self.remote.fetch_image(id, &catalog.templates)?;
        self.store_fetched(key, bytes)
    }

    fn resolve_external(&self, key: &TemplateKey, force_refresh: bool) -> Result<ImagePayload> {
        if !force_refresh && self.persists(key) {
            if let Some(bytes) = self.disk_image(key) {
                debug!("Disk hit for {}", key);
                if let Some(payload) = self.decode_cached(key, bytes) {
                    self.memory_put(&payload);
                    return Ok(payload);
                }
            }
        }

        let bytes = self.remote.fetch_external(key)?;
        self.store_fetched(key, bytes)
    }

    /// Decode freshly fetched bytes and populate both tiers.
    fn store_fetched(&self, key: &TemplateKey, bytes: Vec<u8>) -> Result<ImagePayload> {
        let payload = ImagePayload::decode(key.clone(), bytes)?;

        if self.persists(key) {
            if let Err(e) = self.disk.save_image(key, payload.bytes()) {
                warn!("Could not write {} to the disk cache: {}", key, e);
            }
        }
        self.memory_put(&payload);

        Ok(payload)
    }

    /// Whether images for `key` go to disk. Local files are already on disk,
    /// so only catalog and URL images are persisted.
    fn persists(&self, key: &TemplateKey) -> bool {
        self.config.cache_enabled && !matches!(key, TemplateKey::LocalPath(_))
    }

    fn disk_image(&self, key: &TemplateKey) -> Option<Vec<u8>> {
        match self.disk.load_image(key) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Ignoring unreadable disk cache entry for {}: {}", key, e);
                None
            }
        }
    }

    fn decode_cached(&self, key: &TemplateKey, bytes: Vec<u8>) -> Option<ImagePayload> {
        match ImagePayload::decode(key.clone(), bytes) {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!("Discarding cached image for {}: {}", key, e);
                None
            }
        }
    }

    /// The catalog to use right now, honoring TTL and the fallback policy.
    fn current_catalog(&self, force_refresh: bool) -> Result<CatalogDocument> {
        if !self.config.cache_enabled || force_refresh {
            return self.fetch_catalog();
        }

        let Some(cached) = self.cached_catalog()? else {
            return self.fetch_catalog();
        };

        if cached.freshness(self.config.catalog_ttl) == Freshness::Fresh {
            return Ok(cached);
        }

        debug!(
            "Catalog is stale (fetched {}), refreshing",
            cached.timestamp.to_rfc3339()
        );
        match self.fetch_catalog() {
            Ok(fresh) => Ok(fresh),
            Err(e) if e.is_transient() => {
                warn!("Catalog refresh failed, using stale copy: {}", e);
                Ok(cached)
            }
            Err(e) => Err(e),
        }
    }

    /// The catalog on disk, if any, with the corrupt-catalog policy applied.
    fn cached_catalog(&self) -> Result<Option<CatalogDocument>> {
        match self.disk.load_catalog() {
            Ok(doc) => Ok(doc),
            Err(parse_err @ MemeError::CatalogParse { .. }) => match self.config.on_corrupt_catalog
            {
                CorruptCatalogPolicy::Fail => Err(parse_err),
                CorruptCatalogPolicy::Refetch => {
                    warn!("{}; rebuilding from the network", parse_err);
                    self.fetch_catalog().map(Some).map_err(|fetch_err| {
                        warn!("Catalog rebuild failed: {}", fetch_err);
                        parse_err
                    })
                }
            },
            Err(e) => {
                warn!("Ignoring unreadable catalog: {}", e);
                Ok(None)
            }
        }
    }

    /// Fetch the catalog from the remote source and persist it.
    fn fetch_catalog(&self) -> Result<CatalogDocument> {
        let doc = CatalogDocument::new(self.remote.fetch_catalog()?, Utc::now());

        if self.config.cache_enabled {
            if let Err(e) = self.disk.save_catalog(&doc.templates, doc.timestamp) {
                warn!("Could not write the catalog to the disk cache: {}", e);
            }
        }
        info!("Fetched catalog with {} templates", doc.len());

        Ok(doc)
    }

    fn memory_get(&self, key: &TemplateKey) -> Option<ImagePayload> {
        self.memory.as_ref().and_then(|m| lock(m).get(key))
    }

    fn memory_put(&self, payload: &ImagePayload) {
        if let Some(memory) = &self.memory {
            lock(memory).put(payload.origin().clone(), payload.clone());
        }
    }
}

impl Default for TemplateCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

/// Lock the memory tier, recovering from a poisoned mutex: the LRU holds
/// plain data, so a panic mid-operation cannot leave it inconsistent.
fn lock(memory: &Mutex<MemoryCache>) -> MutexGuard<'_, MemoryCache> {
    memory.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
