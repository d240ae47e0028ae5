use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::OnceCell;

/// Root catalog document, `data/manga.json` on the site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Series {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    pub cover: String,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

/// Chapters have no id of their own; they are addressed by position.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Chapter {
    pub name: String,
    #[serde(default)]
    pub pages: Vec<String>,
}

impl Catalog {
    pub fn parse(raw: &str) -> Result<Self, CatalogLoadError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn series(&self, id: &str) -> Option<&Series> {
        self.series.iter().find(|series| series.id == id)
    }
}

impl Series {
    pub fn author_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.author
            .as_deref()
            .filter(|author| !author.is_empty())
            .unwrap_or(fallback)
    }

    pub fn page_counts(&self) -> Vec<usize> {
        self.chapters
            .iter()
            .map(|chapter| chapter.pages.len())
            .collect()
    }
}

/// The HTTP client error behind a failed request.
#[cfg(not(target_arch = "wasm32"))]
pub type TransportError = reqwest::Error;
#[cfg(target_arch = "wasm32")]
pub type TransportError = gloo_net::Error;

#[derive(Debug, thiserror::Error)]
pub enum CatalogLoadError {
    #[error("failed to load catalog (HTTP {status})")]
    Status { status: u16 },

    #[error("failed to load catalog: {0}")]
    Transport(#[source] TransportError),

    #[error("failed to read catalog {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Where the catalog document comes from.
#[async_trait(?Send)]
pub trait CatalogSource {
    async fn fetch(&self) -> Result<Catalog, CatalogLoadError>;

    fn describe(&self) -> String;
}

/// Fetches the catalog at most once per session.
///
/// Concurrent callers share one in-flight fetch. A failed fetch is not
/// memoised, so the next call tries again.
pub struct CatalogLoader {
    source: Box<dyn CatalogSource>,
    catalog: OnceCell<Catalog>,
}

impl CatalogLoader {
    pub fn new(source: Box<dyn CatalogSource>) -> Self {
        Self {
            source,
            catalog: OnceCell::new(),
        }
    }

    pub async fn load(&self) -> Result<&Catalog, CatalogLoadError> {
        self.catalog
            .get_or_try_init(|| async {
                let source = self.source.describe();
                match self.source.fetch().await {
                    Ok(catalog) => {
                        tracing::info!(%source, series = catalog.series.len(), "catalog loaded");
                        Ok(catalog)
                    }
                    Err(err) => {
                        tracing::warn!(%source, %err, "catalog load failed");
                        Err(err)
                    }
                }
            })
            .await
    }

    pub fn is_loaded(&self) -> bool {
        self.catalog.initialized()
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use self::native::{FileCatalogSource, HttpCatalogSource, source_for};

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use async_trait::async_trait;
    use reqwest::header::{CACHE_CONTROL, PRAGMA, USER_AGENT};

    use super::{Catalog, CatalogLoadError, CatalogSource};

    /// Fetches the catalog over HTTP, asking every cache on the way to revalidate.
    #[derive(Debug, Clone)]
    pub struct HttpCatalogSource {
        client: reqwest::Client,
        url: url::Url,
    }

    impl HttpCatalogSource {
        pub fn new(url: url::Url) -> Self {
            Self {
                client: reqwest::Client::new(),
                url,
            }
        }
    }

    #[async_trait(?Send)]
    impl CatalogSource for HttpCatalogSource {
        async fn fetch(&self) -> Result<Catalog, CatalogLoadError> {
            let response = self
                .client
                .get(self.url.clone())
                .header(USER_AGENT, "mangashelf/0.1")
                .header(CACHE_CONTROL, "no-cache, no-store")
                .header(PRAGMA, "no-cache")
                .send()
                .await
                .map_err(CatalogLoadError::Transport)?;

            let status = response.status();
            if !status.is_success() {
                return Err(CatalogLoadError::Status {
                    status: status.as_u16(),
                });
            }

            let raw = response
                .text()
                .await
                .map_err(CatalogLoadError::Transport)?;
            Catalog::parse(&raw)
        }

        fn describe(&self) -> String {
            self.url.to_string()
        }
    }

    #[derive(Debug, Clone)]
    pub struct FileCatalogSource {
        path: PathBuf,
    }

    impl FileCatalogSource {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }
    }

    #[async_trait(?Send)]
    impl CatalogSource for FileCatalogSource {
        async fn fetch(&self) -> Result<Catalog, CatalogLoadError> {
            let raw = tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|source| CatalogLoadError::Read {
                    path: self.path.display().to_string(),
                    source,
                })?;
            Catalog::parse(&raw)
        }

        fn describe(&self) -> String {
            self.path.display().to_string()
        }
    }

    /// `http(s)://` locations are fetched; anything else is a local path.
    pub fn source_for(location: &str) -> Box<dyn CatalogSource> {
        match url::Url::parse(location) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
                Box::new(HttpCatalogSource::new(url))
            }
            _ => Box::new(FileCatalogSource::new(location)),
        }
    }
}
