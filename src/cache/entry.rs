//! The cached catalog document.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{freshness_at, Freshness};
use crate::registry::TemplateMetadata;

/// The full template catalog as persisted on disk.
///
/// One timestamp covers every entry: the catalog is fetched and replaced as
/// a unit, never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogDocument {
    /// When the catalog was fetched from the remote source.
    pub timestamp: DateTime<Utc>,
    /// Template metadata in the order the remote source listed it.
    pub templates: Vec<TemplateMetadata>,
}

impl CatalogDocument {
    /// Wrap a freshly fetched template list.
    pub fn new(templates: Vec<TemplateMetadata>, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            templates,
        }
    }

    /// Age of the catalog relative to now.
    pub fn age(&self) -> Duration {
        Utc::now().signed_duration_since(self.timestamp)
    }

    /// Freshness as of now.
    pub fn freshness(&self, ttl: Duration) -> Freshness {
        self.freshness_at(Utc::now(), ttl)
    }

    /// Freshness as of `now`.
    pub fn freshness_at(&self, now: DateTime<Utc>, ttl: Duration) -> Freshness {
        freshness_at(self.timestamp, now, ttl)
    }

    /// Whether the catalog is fresh as of now.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.freshness(ttl) == Freshness::Fresh
    }

    /// Look up a template by id.
    pub fn find(&self, id: &str) -> Option<&TemplateMetadata> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Number of templates in the catalog.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the catalog lists no templates.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
