//! Remote template sources.
//!
//! [`RemoteSource`] is the seam between the template cache and the outside
//! world. It fetches, and nothing else: no caching, no retries.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::fetch::HttpFetcher;
use super::template::{ApiTemplate, TemplateMetadata};
use crate::cache::TemplateKey;
use crate::error::{MemeError, Result};

/// Default memegen-compatible API.
pub const DEFAULT_API_BASE: &str = "https://api.memegen.link";

/// Where template metadata and images come from.
pub trait RemoteSource: Send + Sync {
    /// Fetch the full template catalog.
    fn fetch_catalog(&self) -> Result<Vec<TemplateMetadata>>;

    /// Fetch the metadata of a single template, bypassing the listing.
    fn fetch_template(&self, template_id: &str) -> Result<TemplateMetadata>;

    /// Download the image of `template_id` as listed in `catalog`.
    ///
    /// Fails with [`MemeError::TemplateNotFound`] if the id is not in the
    /// catalog.
    fn fetch_image(&self, template_id: &str, catalog: &[TemplateMetadata]) -> Result<Vec<u8>>;

    /// Read a local image or download a URL directly, without the catalog.
    fn fetch_external(&self, key: &TemplateKey) -> Result<Vec<u8>>;
}

/// [`RemoteSource`] backed by a memegen-style HTTP API.
#[derive(Debug, Clone)]
pub struct HttpSource {
    api_base: String,
    http: HttpFetcher,
}

impl HttpSource {
    /// Create a source for `api_base` with the given request timeout.
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            http: HttpFetcher::with_timeout(timeout),
        }
    }

    /// The API base URL, without a trailing slash.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn catalog_url(&self) -> String {
        format!("{}/templates/", self.api_base)
    }

    fn template_url(&self, template_id: &str) -> String {
        format!(
            "{}/templates/{}",
            self.api_base,
            urlencoding::encode(template_id)
        )
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE, super::fetch::http::DEFAULT_TIMEOUT)
    }
}

impl RemoteSource for HttpSource {
    fn fetch_catalog(&self) -> Result<Vec<TemplateMetadata>> {
        let url = self.catalog_url();
        tracing::info!("Fetching template catalog from {}", url);

        let records: Vec<ApiTemplate> = self.http.fetch_json(&url)?;
        Ok(records
            .into_iter()
            .map(|r| r.into_metadata(&self.api_base))
            .collect())
    }

    fn fetch_template(&self, template_id: &str) -> Result<TemplateMetadata> {
        let url = self.template_url(template_id);

        match self.http.fetch_json::<ApiTemplate>(&url) {
            Ok(record) => Ok(record.into_metadata(&self.api_base)),
            Err(MemeError::Service { status: 404, .. }) => Err(MemeError::TemplateNotFound {
                id: template_id.to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    fn fetch_image(&self, template_id: &str, catalog: &[TemplateMetadata]) -> Result<Vec<u8>> {
        let template = catalog
            .iter()
            .find(|t| t.id == template_id)
            .ok_or_else(|| MemeError::TemplateNotFound {
                id: template_id.to_string(),
            })?;

        tracing::info!("Downloading image for '{}'", template_id);
        self.fetch_external(&TemplateKey::classify(&template.image_url))
    }

    fn fetch_external(&self, key: &TemplateKey) -> Result<Vec<u8>> {
        match key {
            TemplateKey::RemoteUrl(url) => self.http.fetch_bytes(url),
            TemplateKey::LocalPath(path) => read_local(path),
            TemplateKey::CatalogId(id) => Err(MemeError::InvalidInput {
                message: format!("'{}' is a catalog id, not a path or URL", id),
            }),
        }
    }
}

/// Read a local image file, expanding a leading `~/`.
fn read_local(path: &Path) -> Result<Vec<u8>> {
    let path = expand_home(path);
    fs::read(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => MemeError::FileNotFound { path },
        _ => MemeError::Io(e),
    })
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::payload::fixtures::PNG_1X1;
    use httpmock::prelude::*;
    use tempfile::TempDir;

    fn source(server: &MockServer) -> HttpSource {
        HttpSource::new(server.base_url(), Duration::from_secs(5))
    }

    fn catalog_json(server: &MockServer) -> serde_json::Value {
        serde_json::json!([
            {
                "id": "buzz",
                "name": "Buzz Lightyear",
                "lines": 2,
                "blank": server.url("/images/buzz.png"),
                "keywords": ["toy story"],
                "example": { "text": ["memes", "memes everywhere"] }
            },
            { "id": "doge", "name": "Doge", "lines": 3 }
        ])
    }

    #[test]
    fn default_points_at_memegen() {
        assert_eq!(HttpSource::default().api_base(), "https://api.memegen.link");
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let source = HttpSource::new("https://api.test/", Duration::from_secs(1));
        assert_eq!(source.catalog_url(), "https://api.test/templates/");
    }

    #[test]
    fn fetch_catalog_maps_records() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/templates/");
            then.status(200).json_body(catalog_json(&server));
        });

        let catalog = source(&server).fetch_catalog().unwrap();

        mock.assert_calls(1);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].id, "buzz");
        assert_eq!(catalog[0].example, vec!["memes", "memes everywhere"]);
        assert_eq!(catalog[1].text_positions.len(), 3);
        assert_eq!(catalog[1].image_url, server.url("/images/doge.png"));
    }

    #[test]
    fn fetch_catalog_service_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/templates/");
            then.status(500);
        });

        let err = source(&server).fetch_catalog().unwrap_err();
        assert!(matches!(err, MemeError::Service { status: 500, .. }));
    }

    #[test]
    fn fetch_template_404_is_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/templates/nope");
            then.status(404);
        });

        let err = source(&server).fetch_template("nope").unwrap_err();
        assert!(matches!(err, MemeError::TemplateNotFound { ref id } if id == "nope"));
    }

    #[test]
    fn fetch_template_direct() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/templates/hidden");
            then.status(200)
                .json_body(serde_json::json!({ "id": "hidden", "name": "Hidden" }));
        });

        let meta = source(&server).fetch_template("hidden").unwrap();
        assert_eq!(meta.name, "Hidden");
    }

    #[test]
    fn fetch_image_downloads_listed_url() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/templates/");
            then.status(200).json_body(catalog_json(&server));
        });
        let image = server.mock(|when, then| {
            when.method(GET).path("/images/buzz.png");
            then.status(200).body(PNG_1X1);
        });

        let source = source(&server);
        let catalog = source.fetch_catalog().unwrap();
        let bytes = source.fetch_image("buzz", &catalog).unwrap();

        image.assert_calls(1);
        assert_eq!(bytes, PNG_1X1);
    }

    #[test]
    fn fetch_image_unknown_id_is_not_found_without_network() {
        let server = MockServer::start();
        let any = server.mock(|when, then| {
            when.method(GET);
            then.status(200);
        });

        let err = source(&server).fetch_image("drake", &[]).unwrap_err();

        assert!(matches!(err, MemeError::TemplateNotFound { .. }));
        any.assert_calls(0);
    }

    #[test]
    fn fetch_external_reads_local_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("img.png");
        fs::write(&path, PNG_1X1).unwrap();

        let key = TemplateKey::LocalPath(path);
        let bytes = HttpSource::default().fetch_external(&key).unwrap();
        assert_eq!(bytes, PNG_1X1);
    }

    #[test]
    fn fetch_external_missing_file() {
        let key = TemplateKey::classify("/definitely/not/here.png");
        let err = HttpSource::default().fetch_external(&key).unwrap_err();
        assert!(matches!(err, MemeError::FileNotFound { .. }));
    }

    #[test]
    fn fetch_external_rejects_catalog_ids() {
        let key = TemplateKey::classify("buzz");
        let err = HttpSource::default().fetch_external(&key).unwrap_err();
        assert!(matches!(err, MemeError::InvalidInput { .. }));
    }

    #[test]
    fn expand_home_only_touches_tilde_prefix() {
        assert_eq!(expand_home(Path::new("/a/b.png")), PathBuf::from("/a/b.png"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/b.png")), home.join("b.png"));
        }
    }
}
