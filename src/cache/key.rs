//! Template key classification.
//!
//! A caller identifies a template by a plain string. The string is classified
//! exactly once into a [`TemplateKey`], and the variant is carried from then
//! on instead of being re-inspected.

use std::fmt;
use std::path::{Path, PathBuf};

/// File extensions that mark a bare string as a local image path.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "tiff", "webp"];

/// A classified template identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TemplateKey {
    /// An id from the remote template catalog (e.g. `buzz`).
    CatalogId(String),
    /// An image on the local filesystem.
    LocalPath(PathBuf),
    /// An absolute HTTP(S) image URL.
    RemoteUrl(String),
}

impl TemplateKey {
    /// Classify a caller-supplied identifier.
    ///
    /// URLs are recognized before paths, so `https://host/x.png` is a URL even
    /// though it contains slashes and an image extension.
    ///
    /// ```
    /// use memeplot::cache::TemplateKey;
    ///
    /// assert!(matches!(TemplateKey::classify("buzz"), TemplateKey::CatalogId(_)));
    /// assert!(matches!(TemplateKey::classify("/tmp/img.png"), TemplateKey::LocalPath(_)));
    /// assert!(matches!(
    ///     TemplateKey::classify("https://example.com/x.png"),
    ///     TemplateKey::RemoteUrl(_)
    /// ));
    /// ```
    pub fn classify(raw: &str) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return Self::RemoteUrl(raw.to_string());
        }

        if raw.contains('/') || raw.contains('\\') || has_image_extension(raw) {
            return Self::LocalPath(PathBuf::from(raw));
        }

        Self::CatalogId(raw.to_string())
    }

    /// Short name for the key's kind, used in disk file names and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CatalogId(_) => "id",
            Self::LocalPath(_) => "path",
            Self::RemoteUrl(_) => "url",
        }
    }

    /// The identifier as the caller wrote it.
    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        match self {
            Self::CatalogId(id) => id.as_str().into(),
            Self::LocalPath(path) => path.to_string_lossy(),
            Self::RemoteUrl(url) => url.as_str().into(),
        }
    }

    /// The catalog id, if this key is one.
    pub fn catalog_id(&self) -> Option<&str> {
        match self {
            Self::CatalogId(id) => Some(id),
            _ => None,
        }
    }

    /// Whether this key refers to something outside the catalog.
    pub fn is_external(&self) -> bool {
        !matches!(self, Self::CatalogId(_))
    }

    /// A short identifier derived from the key: the catalog id itself, or
    /// the file stem of a path or URL.
    pub fn stem(&self) -> String {
        match self {
            Self::CatalogId(id) => id.clone(),
            Self::LocalPath(path) => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            Self::RemoteUrl(url) => {
                let without_query = url.split(['?', '#']).next().unwrap_or(url);
                let last = without_query
                    .trim_end_matches('/')
                    .rsplit('/')
                    .next()
                    .unwrap_or_default();
                Path::new(last)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default()
            }
        }
    }
}

impl From<&str> for TemplateKey {
    fn from(raw: &str) -> Self {
        Self::classify(raw)
    }
}

impl fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn has_image_extension(raw: &str) -> bool {
    Path::new(raw)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_word_is_catalog_id() {
        assert_eq!(
            TemplateKey::classify("buzz"),
            TemplateKey::CatalogId("buzz".to_string())
        );
    }

    #[test]
    fn absolute_path_is_local_path() {
        assert_eq!(
            TemplateKey::classify("/tmp/img.png"),
            TemplateKey::LocalPath(PathBuf::from("/tmp/img.png"))
        );
    }

    #[test]
    fn https_url_is_remote_url() {
        assert_eq!(
            TemplateKey::classify("https://example.com/x.png"),
            TemplateKey::RemoteUrl("https://example.com/x.png".to_string())
        );
    }

    #[test]
    fn http_url_without_extension_is_remote_url() {
        assert!(matches!(
            TemplateKey::classify("http://example.com/templates/buzz"),
            TemplateKey::RemoteUrl(_)
        ));
    }

    #[test]
    fn bare_filename_with_image_extension_is_path() {
        assert!(matches!(
            TemplateKey::classify("photo.JPG"),
            TemplateKey::LocalPath(_)
        ));
    }

    #[test]
    fn backslash_is_path() {
        assert!(matches!(
            TemplateKey::classify(r"C:\memes\cat"),
            TemplateKey::LocalPath(_)
        ));
    }

    #[test]
    fn dotted_id_without_image_extension_is_catalog_id() {
        assert!(matches!(
            TemplateKey::classify("mr.krabs"),
            TemplateKey::CatalogId(_)
        ));
    }

    #[test]
    fn stem_of_each_kind() {
        assert_eq!(TemplateKey::classify("buzz").stem(), "buzz");
        assert_eq!(TemplateKey::classify("/tmp/test_image.png").stem(), "test_image");
        assert_eq!(
            TemplateKey::classify("https://example.com/meme.png?size=2").stem(),
            "meme"
        );
        assert_eq!(
            TemplateKey::classify("https://example.com/templates/buzz").stem(),
            "buzz"
        );
    }

    #[test]
    fn kind_names_are_distinct() {
        assert_eq!(TemplateKey::classify("buzz").kind(), "id");
        assert_eq!(TemplateKey::classify("./a.png").kind(), "path");
        assert_eq!(TemplateKey::classify("https://x.io/a").kind(), "url");
    }

    #[test]
    fn display_round_trips_the_raw_string() {
        for raw in ["buzz", "/tmp/img.png", "https://example.com/x.png"] {
            assert_eq!(TemplateKey::classify(raw).to_string(), raw);
        }
    }
}
