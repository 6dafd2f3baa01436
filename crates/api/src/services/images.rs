//! Product image mirroring.
//!
//! When enabled, the image behind a new ice cream's `img_url` is downloaded
//! into the static directory and the record points at the local copy
//! (`{public_url}/icecream/{id}{ext}`) instead of the remote host.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;
use url::Url;

use icecream_core::IceCreamId;

use crate::config::StaticConfig;

/// Sub-directory of the static root holding product images.
const IMAGE_DIR: &str = "icecream";

/// Extension used when the URL path does not carry a usable one.
const DEFAULT_EXTENSION: &str = ".jpg";

/// Longest extension taken from a URL, without the dot.
const MAX_EXTENSION_LEN: usize = 5;

/// Errors that can occur while mirroring an image.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The image URL cannot be parsed or is not http(s).
    #[error("invalid image URL '{0}'")]
    InvalidUrl(String),

    /// The remote host could not be reached or answered with an error.
    #[error("image fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The image could not be written to disk.
    #[error("image write failed: {0}")]
    Write(#[from] std::io::Error),
}

/// Copies remote product images somewhere the API serves them from.
#[async_trait]
pub trait ImageMirror: Send + Sync {
    /// Mirror the image at `url` for ice cream `id` and return its new URL.
    async fn persist_remote_image(&self, url: &str, id: IceCreamId) -> Result<String, ImageError>;
}

/// Downloads images over HTTP into the static directory.
pub struct HttpImageMirror {
    client: reqwest::Client,
    root: PathBuf,
    public_url: String,
}

impl HttpImageMirror {
    /// Create a mirror writing under `config.root`.
    ///
    /// # Errors
    ///
    /// Returns `ImageError::Fetch` if the HTTP client cannot be built.
    pub fn new(config: &StaticConfig) -> Result<Self, ImageError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            root: config.root.clone(),
            public_url: config.public_url.clone(),
        })
    }

    /// Write image bytes and return the public URL of the file.
    async fn store(&self, id: IceCreamId, extension: &str, bytes: &[u8]) -> Result<String, ImageError> {
        let path = image_path(&self.root, id, extension);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::write(&path, bytes).await?;

        Ok(format!("{}/{IMAGE_DIR}/{id}{extension}", self.public_url))
    }
}

#[async_trait]
impl ImageMirror for HttpImageMirror {
    async fn persist_remote_image(&self, url: &str, id: IceCreamId) -> Result<String, ImageError> {
        let parsed = parse_image_url(url)?;
        let extension = extension_for(&parsed);

        let bytes = self
            .client
            .get(parsed)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let public = self.store(id, &extension, &bytes).await?;
        info!(ice_cream_id = %id, source = %url, size = bytes.len(), "Image mirrored");
        Ok(public)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an http(s) image URL.
fn parse_image_url(raw: &str) -> Result<Url, ImageError> {
    let url = Url::parse(raw).map_err(|_| ImageError::InvalidUrl(raw.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ImageError::InvalidUrl(raw.to_string())),
    }
}

/// File extension (with dot) taken from the last path segment of `url`.
fn extension_for(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map_or_else(
            || DEFAULT_EXTENSION.to_string(),
            |ext| format!(".{}", ext.to_ascii_lowercase()),
        )
}

fn image_path(root: &Path, id: IceCreamId, extension: &str) -> PathBuf {
    root.join(IMAGE_DIR).join(format!("{id}{extension}"))
}
