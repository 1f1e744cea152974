//! Configuration schema for memeplot.
//!
//! Maps to the YAML file at `~/.memeplot/config.yml`:
//!
//! ```yaml
//! cache_enabled: true
//! cache_dir: /var/cache/memeplot
//! api_base: https://api.memegen.link
//! catalog_ttl: 24h
//! request_timeout: 15s
//! memory_capacity: 50
//! on_corrupt_catalog: fail
//! ```

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::cache::{default_cache_dir, DEFAULT_CATALOG_TTL_SECS, DEFAULT_MEMORY_CAPACITY};
use crate::registry::source::DEFAULT_API_BASE;

/// What to do when the on-disk catalog exists but does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorruptCatalogPolicy {
    /// Surface the parse error to the caller.
    #[default]
    Fail,
    /// Rebuild the catalog from the network, overwriting the corrupt file.
    /// The parse error is still surfaced if the rebuild fails.
    Refetch,
}

/// Template cache configuration.
///
/// Each [`TemplateCache`](crate::cache::TemplateCache) owns one of these;
/// there is no global configuration state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Read and write the disk tier. When false, every lookup that misses
    /// the memory tier goes to the network.
    pub cache_enabled: bool,

    /// Cache root; the platform cache directory when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// Base URL of the template API.
    pub api_base: String,

    /// Age after which the cached catalog is refreshed.
    #[serde(with = "duration_str")]
    pub catalog_ttl: Duration,

    /// Per-request network timeout.
    #[serde(with = "duration_str")]
    pub request_timeout: Duration,

    /// Images kept in memory; 0 disables the memory tier.
    pub memory_capacity: usize,

    /// What to do when the cached catalog cannot be parsed.
    pub on_corrupt_catalog: CorruptCatalogPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_dir: None,
            api_base: DEFAULT_API_BASE.to_string(),
            catalog_ttl: Duration::seconds(DEFAULT_CATALOG_TTL_SECS),
            request_timeout: Duration::seconds(15),
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
            on_corrupt_catalog: CorruptCatalogPolicy::Fail,
        }
    }
}

impl CacheConfig {
    /// The cache root to use: the configured one or the platform default.
    pub fn resolved_cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(default_cache_dir)
    }

    /// The request timeout as a std duration; negative values clamp to zero.
    pub fn request_timeout_std(&self) -> std::time::Duration {
        self.request_timeout.to_std().unwrap_or_default()
    }

    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_catalog_ttl(mut self, ttl: Duration) -> Self {
        self.catalog_ttl = ttl;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_memory_capacity(mut self, capacity: usize) -> Self {
        self.memory_capacity = capacity;
        self
    }

    pub fn with_corrupt_catalog_policy(mut self, policy: CorruptCatalogPolicy) -> Self {
        self.on_corrupt_catalog = policy;
        self
    }
}

/// Durations written as "24h", "30m", "7d", "15s" or bare seconds.
mod duration_str {
    use chrono::Duration;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::cache::parse_ttl;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Seconds(i64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        let secs = d.num_seconds();
        let text = if secs != 0 && secs % 86400 == 0 {
            format!("{}d", secs / 86400)
        } else if secs != 0 && secs % 3600 == 0 {
            format!("{}h", secs / 3600)
        } else if secs != 0 && secs % 60 == 0 {
            format!("{}m", secs / 60)
        } else {
            format!("{}s", secs)
        };
        s.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        match Raw::deserialize(d)? {
            Raw::Seconds(n) => Duration::try_seconds(n)
                .ok_or_else(|| D::Error::custom(format!("duration out of range: {}s", n))),
            Raw::Text(text) => parse_ttl(&text)
                .map_err(|e| D::Error::custom(format!("invalid duration '{}': {}", text, e))),
        }
    }
}
