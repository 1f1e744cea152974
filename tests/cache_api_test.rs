//! Integration tests for the template cache against a mock template API.

use chrono::{Duration, Utc};
use httpmock::prelude::*;
use memeplot::cache::{DiskStore, Freshness, ImageFormat, TemplateCache, TemplateKey};
use memeplot::config::CacheConfig;
use memeplot::registry::TemplateMetadata;
use memeplot::MemeError;
use std::fs;
use tempfile::TempDir;

/// Header of a 4x2 GIF; the cache only needs the format to be recognizable.
const GIF_4X2: &[u8] = &[
    b'G', b'I', b'F', b'8', b'9', b'a', 0x04, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x3B,
];

struct Api {
    server: MockServer,
}

impl Api {
    fn start() -> Self {
        Self {
            server: MockServer::start(),
        }
    }

    fn catalog(&self, ids: &[&str]) -> httpmock::Mock<'_> {
        let body: Vec<_> = ids
            .iter()
            .map(|id| {
                serde_json::json!({
                    "id": id,
                    "name": id.to_uppercase(),
                    "blank": self.server.url(format!("/images/{}.gif", id)),
                })
            })
            .collect();
        self.server.mock(move |when, then| {
            when.method(GET).path("/templates/");
            then.status(200).json_body(serde_json::Value::Array(body));
        })
    }

    fn image(&self, id: &str) -> httpmock::Mock<'_> {
        let path = format!("/images/{}.gif", id);
        self.server.mock(move |when, then| {
            when.method(GET).path(path);
            then.status(200).body(GIF_4X2);
        })
    }

    fn config(&self, temp: &TempDir) -> CacheConfig {
        CacheConfig::default()
            .with_api_base(self.server.base_url())
            .with_cache_dir(temp.path().join("cache"))
    }
}

#[test]
fn resolve_round_trips_through_all_tiers() {
    let api = Api::start();
    let catalog = api.catalog(&["buzz", "doge"]);
    let image = api.image("buzz");
    let temp = TempDir::new().unwrap();

    let cache = TemplateCache::new(api.config(&temp));
    let first = cache.resolve("buzz").unwrap();
    let second = cache.resolve("buzz").unwrap();

    assert_eq!(first, second);
    assert_eq!(first.format(), ImageFormat::Gif);
    assert_eq!(first.dimensions(), Some((4, 2)));
    catalog.assert_calls(1);
    image.assert_calls(1);

    // A second cache over the same directory is served from disk.
    let cache = TemplateCache::new(api.config(&temp));
    assert_eq!(cache.resolve("buzz").unwrap(), first);
    catalog.assert_calls(1);
    image.assert_calls(1);
}

#[test]
fn catalog_document_on_disk_is_readable() {
    let api = Api::start();
    api.catalog(&["buzz", "doge"]);
    let temp = TempDir::new().unwrap();

    let cache = TemplateCache::new(api.config(&temp));
    cache.catalog().unwrap();

    let doc = DiskStore::new(temp.path().join("cache"))
        .load_catalog()
        .unwrap()
        .unwrap();
    assert_eq!(doc.len(), 2);
    assert_eq!(doc.freshness(Duration::hours(24)), Freshness::Fresh);
    assert_eq!(doc.find("doge").unwrap().name, "DOGE");

    let raw = fs::read_to_string(temp.path().join("cache").join("catalog.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(json["timestamp"].is_string());
    assert_eq!(json["templates"][0]["id"], "buzz");
}

#[test]
fn stale_catalog_survives_service_outage() {
    let api = Api::start();
    let image = api.image("buzz");
    let temp = TempDir::new().unwrap();
    let config = api.config(&temp);

    // Seed the disk as an earlier process would have left it.
    let store = DiskStore::new(config.resolved_cache_dir());
    let meta = TemplateMetadata::from_image(&api.server.url("/images/buzz.gif"), 2, None).unwrap();
    assert_eq!(meta.id, "buzz");
    let fetched_at = Utc::now() - Duration::days(3);
    store.save_catalog(&[meta], fetched_at).unwrap();
    store
        .save_image(&TemplateKey::classify("buzz"), GIF_4X2)
        .unwrap();

    let outage = api.server.mock(|when, then| {
        when.method(GET).path("/templates/");
        then.status(503);
    });

    let cache = TemplateCache::new(config);
    let payload = cache.resolve("buzz").unwrap();

    assert_eq!(payload.bytes(), GIF_4X2);
    outage.assert_calls(1);
    image.assert_calls(0);
    assert_eq!(store.load_catalog().unwrap().unwrap().timestamp, fetched_at);
}

#[test]
fn cold_cache_outage_is_an_error() {
    let api = Api::start();
    api.server.mock(|when, then| {
        when.method(GET).path("/templates/");
        then.status(500);
    });
    let temp = TempDir::new().unwrap();

    let cache = TemplateCache::new(api.config(&temp).with_cache_enabled(false));
    let err = cache.resolve("buzz").unwrap_err();

    assert!(matches!(err, MemeError::Service { status: 500, .. }));
    assert_eq!(cache.memory_len(), 0);
    assert!(!temp.path().join("cache").exists());
}

#[test]
fn unreachable_api_is_a_network_error() {
    let temp = TempDir::new().unwrap();
    let config = CacheConfig::default()
        .with_api_base("http://127.0.0.1:1")
        .with_request_timeout(Duration::seconds(2))
        .with_cache_dir(temp.path());

    let err = TemplateCache::new(config).resolve("buzz").unwrap_err();
    assert!(matches!(err, MemeError::Network { .. }));
}

#[test]
fn clear_forces_remote_round_trip() {
    let api = Api::start();
    let catalog = api.catalog(&["buzz"]);
    let image = api.image("buzz");
    let temp = TempDir::new().unwrap();
    let cache = TemplateCache::new(api.config(&temp));

    cache.resolve("buzz").unwrap();
    assert_eq!(cache.clear().unwrap(), 1);
    cache.resolve("buzz").unwrap();

    catalog.assert_calls(2);
    image.assert_calls(2);
}

#[test]
fn url_keys_are_cached_without_catalog() {
    let api = Api::start();
    let catalog = api.catalog(&[]);
    let image = api.image("external");
    let temp = TempDir::new().unwrap();
    let url = api.server.url("/images/external.gif");

    TemplateCache::new(api.config(&temp)).resolve(&url).unwrap();
    TemplateCache::new(api.config(&temp)).resolve(&url).unwrap();

    catalog.assert_calls(0);
    image.assert_calls(1);
}

#[test]
fn memory_tier_evicts_least_recently_used() {
    let api = Api::start();
    let ids: Vec<String> = (0..4).map(|i| format!("t{}", i)).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    api.catalog(&id_refs);
    for id in &ids {
        api.image(id);
    }
    let temp = TempDir::new().unwrap();
    let cache = TemplateCache::new(
        api.config(&temp)
            .with_memory_capacity(2)
            .with_cache_enabled(false),
    );

    for id in &ids {
        cache.resolve(id).unwrap();
    }

    assert_eq!(cache.memory_len(), 2);
}
