//! Disk tier of the template cache.
//!
//! Layout under the cache root:
//!
//! ```text
//! <root>/catalog.json      one document: {"timestamp": ..., "templates": [...]}
//! <root>/images/<name>     raw image bytes, one file per key
//! ```
//!
//! Image file names are derived from the key alone, so lookups never scan
//! the directory. Every write lands in a temp file next to its target and is
//! renamed into place, so readers see either the old file or the new one.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::entry::CatalogDocument;
use super::key::TemplateKey;
use crate::error::{MemeError, Result};
use crate::registry::TemplateMetadata;

/// Catalog document file name.
pub const CATALOG_FILE: &str = "catalog.json";

/// Subdirectory holding image files.
pub const IMAGES_DIR: &str = "images";

/// Encoded keys longer than this are stored under their hash instead.
const MAX_ENCODED_NAME: usize = 180;

/// A cached image file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedImage {
    /// File name inside the images directory.
    pub name: String,
    /// Size in bytes.
    pub size_bytes: u64,
}

/// Storage for cached images and the catalog document.
#[derive(Debug, Clone)]
pub struct DiskStore {
    /// Root directory for cache.
    root: PathBuf,
}

impl DiskStore {
    /// Create a new disk store rooted at `root`. Nothing is created until the
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the catalog document.
    pub fn catalog_path(&self) -> PathBuf {
        self.root.join(CATALOG_FILE)
    }

    fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    /// File name for a key's image.
    ///
    /// `<kind>-<percent-encoded key>` for ordinary keys, `<kind>+<sha256>`
    /// for keys too long to encode or containing uppercase letters. Readable
    /// names are therefore all lowercase apart from `%XX` escapes, so keys
    /// differing only in case never share a file on case-insensitive
    /// filesystems. Percent-encoding never emits `+`, so the two forms
    /// cannot collide.
    pub fn image_file_name(key: &TemplateKey) -> String {
        let raw = key.as_str();
        let encoded = urlencoding::encode(&raw);

        if encoded.len() <= MAX_ENCODED_NAME && !raw.chars().any(char::is_uppercase) {
            format!("{}-{}", key.kind(), encoded)
        } else {
            let hash = Sha256::digest(raw.as_bytes());
            format!("{}+{}", key.kind(), hex::encode(&hash[..]))
        }
    }

    /// Path where a key's image is stored.
    pub fn image_path(&self, key: &TemplateKey) -> PathBuf {
        self.images_dir().join(Self::image_file_name(key))
    }

    /// Read a key's image bytes, or `None` if nothing is cached for it.
    pub fn load_image(&self, key: &TemplateKey) -> Result<Option<Vec<u8>>> {
        match fs::read(self.image_path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Store a key's image bytes, replacing any previous bytes for that key.
    pub fn save_image(&self, key: &TemplateKey, bytes: &[u8]) -> Result<()> {
        let path = self.image_path(key);
        write_atomic(&path, bytes)?;
        debug!("Stored {} bytes for {} at {:?}", bytes.len(), key, path);
        Ok(())
    }

    /// Read the catalog document.
    ///
    /// A missing file is `Ok(None)`. A file that exists but does not parse is
    /// [`MemeError::CatalogParse`], never a silent miss.
    pub fn load_catalog(&self) -> Result<Option<CatalogDocument>> {
        let path = self.catalog_path();

        let json = match fs::read(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&json)
            .map(Some)
            .map_err(|e| MemeError::CatalogParse {
                path,
                message: e.to_string(),
            })
    }

    /// Replace the catalog document with `entries` fetched at `timestamp`.
    pub fn save_catalog(&self, entries: &[TemplateMetadata], timestamp: DateTime<Utc>) -> Result<()> {
        let doc = CatalogDocument::new(entries.to_vec(), timestamp);
        let json = serde_json::to_vec_pretty(&doc).context("Failed to serialize catalog")?;

        write_atomic(&self.catalog_path(), &json)?;
        debug!("Stored catalog with {} templates", entries.len());
        Ok(())
    }

    /// List cached image files, sorted by name.
    pub fn list_images(&self) -> Result<Vec<CachedImage>> {
        let dir = match fs::read_dir(self.images_dir()) {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut images = Vec::new();
        for entry in dir {
            let entry = entry?;
            let meta = entry.metadata()?;
            if !meta.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            // Leftovers from interrupted writes.
            if name.starts_with(".tmp") {
                continue;
            }
            images.push(CachedImage {
                name,
                size_bytes: meta.len(),
            });
        }

        images.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(images)
    }

    /// Total size of cached images plus the catalog, in bytes.
    pub fn total_size(&self) -> Result<u64> {
        let images: u64 = self.list_images()?.iter().map(|i| i.size_bytes).sum();
        let catalog = match fs::metadata(self.catalog_path()) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == ErrorKind::NotFound => 0,
            Err(e) => return Err(e.into()),
        };
        Ok(images + catalog)
    }

    /// Delete every cached image and the catalog document.
    ///
    /// Returns the number of image files removed.
    pub fn clear(&self) -> Result<usize> {
        let count = self.list_images()?.len();

        match fs::remove_dir_all(self.images_dir()) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        match fs::remove_file(self.catalog_path()) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        Ok(count)
    }
}

/// Write `data` to a temp file beside `path`, then rename it over `path`.
fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create cache directory {:?}", parent))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temp file in {:?}", parent))?;
    tmp.write_all(data)
        .with_context(|| format!("Failed to write cache file {:?}", path))?;
    tmp.persist(path)
        .with_context(|| format!("Failed to persist cache file {:?}", path))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::payload::fixtures::PNG_1X1;
    use chrono::Duration;
    use tempfile::TempDir;

    fn setup() -> (TempDir, DiskStore) {
        let temp = TempDir::new().unwrap();
        let store = DiskStore::new(temp.path().join("cache"));
        (temp, store)
    }

    fn catalog() -> Vec<TemplateMetadata> {
        vec![
            TemplateMetadata::from_image("https://api.test/images/buzz.png", 2, Some("Buzz"))
                .unwrap(),
            TemplateMetadata::from_image("https://api.test/images/drake.png", 4, None).unwrap(),
        ]
    }

    #[test]
    fn image_miss_when_empty() {
        let (_temp, store) = setup();
        let key = TemplateKey::classify("buzz");
        assert!(store.load_image(&key).unwrap().is_none());
    }

    #[test]
    fn save_and_load_image() {
        let (_temp, store) = setup();
        let key = TemplateKey::classify("https://example.com/test.png");

        store.save_image(&key, PNG_1X1).unwrap();

        assert_eq!(store.load_image(&key).unwrap().as_deref(), Some(PNG_1X1));
    }

    #[test]
    fn save_image_overwrites_same_key() {
        let (_temp, store) = setup();
        let key = TemplateKey::classify("buzz");

        store.save_image(&key, b"old").unwrap();
        store.save_image(&key, b"new").unwrap();

        assert_eq!(store.load_image(&key).unwrap().unwrap(), b"new");
        assert_eq!(store.list_images().unwrap().len(), 1);
    }

    #[test]
    fn image_path_is_deterministic() {
        let (_temp, store) = setup();
        let key = TemplateKey::classify("/tmp/img.png");
        assert_eq!(store.image_path(&key), store.image_path(&key));
    }

    #[test]
    fn similar_keys_get_distinct_names() {
        let keys = [
            TemplateKey::classify("a/b.png"),
            TemplateKey::classify("a_b.png"),
            TemplateKey::classify("a%2Fb.png"),
            TemplateKey::classify("https://x.io/a/b.png"),
            TemplateKey::classify("https://x.io/a%2Fb.png"),
            TemplateKey::CatalogId("buzz".into()),
            TemplateKey::LocalPath("buzz".into()),
        ];

        let mut names: Vec<_> = keys.iter().map(DiskStore::image_file_name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), keys.len());
    }

    #[test]
    fn file_names_have_no_separators() {
        let name = DiskStore::image_file_name(&TemplateKey::classify("d:\\memes\\cat.png"));
        assert!(!name.contains('/'));
        assert!(!name.contains('\\'));
        assert!(name.starts_with("path-"));
    }

    #[test]
    fn keys_differing_in_case_get_distinct_names() {
        let pairs = [
            ("Buzz", "buzz"),
            ("/tmp/Cat.PNG", "/tmp/cat.png"),
            ("https://x.io/A.png", "https://x.io/a.png"),
        ];

        for (upper, lower) in pairs {
            let a = DiskStore::image_file_name(&TemplateKey::classify(upper));
            let b = DiskStore::image_file_name(&TemplateKey::classify(lower));
            assert!(!a.eq_ignore_ascii_case(&b), "{} vs {}", a, b);
        }
    }

    #[test]
    fn mixed_case_keys_round_trip_on_disk() {
        let (_temp, store) = setup();
        let upper = TemplateKey::classify("Buzz");
        let lower = TemplateKey::classify("buzz");

        store.save_image(&upper, b"upper").unwrap();
        store.save_image(&lower, b"lower").unwrap();

        assert_eq!(store.load_image(&upper).unwrap().unwrap(), b"upper");
        assert_eq!(store.load_image(&lower).unwrap().unwrap(), b"lower");
    }

    #[test]
    fn long_keys_are_hashed() {
        let url = format!("https://example.com/{}.png", "x".repeat(300));
        let name = DiskStore::image_file_name(&TemplateKey::classify(&url));
        assert!(name.starts_with("url+"));
        assert_eq!(name.len(), "url+".len() + 64);
    }

    #[test]
    fn catalog_miss_when_absent() {
        let (_temp, store) = setup();
        assert!(store.load_catalog().unwrap().is_none());
    }

    #[test]
    fn catalog_round_trip() {
        let (_temp, store) = setup();
        let entries = catalog();
        let t = Utc::now() - Duration::minutes(5);

        store.save_catalog(&entries, t).unwrap();
        let loaded = store.load_catalog().unwrap().unwrap();

        assert_eq!(loaded.templates, entries);
        assert_eq!(loaded.timestamp, t);
    }

    #[test]
    fn corrupt_catalog_is_an_error_not_a_miss() {
        let (_temp, store) = setup();
        fs::create_dir_all(store.root()).unwrap();
        fs::write(store.catalog_path(), "not valid json{{{").unwrap();

        let err = store.load_catalog().unwrap_err();
        assert!(matches!(err, MemeError::CatalogParse { .. }));
    }

    #[test]
    fn catalog_with_wrong_shape_is_an_error() {
        let (_temp, store) = setup();
        fs::create_dir_all(store.root()).unwrap();
        fs::write(store.catalog_path(), r#"[{"id": "buzz"}]"#).unwrap();

        assert!(matches!(
            store.load_catalog(),
            Err(MemeError::CatalogParse { .. })
        ));
    }

    #[test]
    fn save_catalog_replaces_previous_document() {
        let (_temp, store) = setup();
        let entries = catalog();

        store.save_catalog(&entries, Utc::now()).unwrap();
        store.save_catalog(&entries[..1], Utc::now()).unwrap();

        assert_eq!(store.load_catalog().unwrap().unwrap().templates.len(), 1);
    }

    #[test]
    fn writes_leave_no_temp_files() {
        let (_temp, store) = setup();
        store.save_catalog(&catalog(), Utc::now()).unwrap();
        store
            .save_image(&TemplateKey::classify("buzz"), PNG_1X1)
            .unwrap();

        let root_files: Vec<_> = fs::read_dir(store.root())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(root_files.len(), 2, "unexpected files: {:?}", root_files);
        assert_eq!(store.list_images().unwrap().len(), 1);
    }

    #[test]
    fn total_size_counts_images_and_catalog() {
        let (_temp, store) = setup();
        store.save_image(&TemplateKey::classify("a"), b"12345").unwrap();
        store.save_image(&TemplateKey::classify("b"), b"1234567890").unwrap();
        assert_eq!(store.total_size().unwrap(), 15);

        store.save_catalog(&[], Utc::now()).unwrap();
        assert!(store.total_size().unwrap() > 15);
    }

    #[test]
    fn clear_removes_everything() {
        let (_temp, store) = setup();
        store.save_catalog(&catalog(), Utc::now()).unwrap();
        store.save_image(&TemplateKey::classify("a"), b"1").unwrap();
        store.save_image(&TemplateKey::classify("b"), b"2").unwrap();

        assert_eq!(store.clear().unwrap(), 2);

        assert!(store.load_catalog().unwrap().is_none());
        assert!(store.load_image(&TemplateKey::classify("a")).unwrap().is_none());
        assert!(store.list_images().unwrap().is_empty());
    }

    #[test]
    fn clear_on_missing_root_is_ok() {
        let (_temp, store) = setup();
        assert_eq!(store.clear().unwrap(), 0);
    }
}
