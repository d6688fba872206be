/*!
 * Image resolver backed by a local download cache.
 *
 * Local paths resolve to themselves. `http(s)` references are downloaded
 * once into a cache directory under a name derived from the SHA-256 of the
 * reference, so later sessions find them without a network round trip.
 * Downloads are written to a temporary file and renamed into place.
 */

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use super::ImageResolver;
use crate::errors::ImageError;

/// Default cache directory name under the user's cache directory
const DEFAULT_CACHE_DIRNAME: &str = "pagetext/images";

/// Resolves image references, downloading remote ones into a cache
#[derive(Debug, Clone)]
pub struct CachingImageResolver {
    cache_dir: PathBuf,
    client: Client,
}

impl CachingImageResolver {
    /// Create a resolver caching into `cache_dir`
    pub fn new<P: AsRef<Path>>(cache_dir: P, timeout_secs: u64) -> Result<Self> {
        let cache_dir = cache_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create image cache directory: {:?}", cache_dir))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { cache_dir, client })
    }

    /// Create a resolver caching into the default location
    pub fn new_default(timeout_secs: u64) -> Result<Self> {
        Self::new(Self::default_cache_dir()?, timeout_secs)
    }

    /// Get the default cache directory
    pub fn default_cache_dir() -> Result<PathBuf> {
        let base_dir = dirs::cache_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
            .ok_or_else(|| anyhow::anyhow!("Could not determine cache directory"))?;
        Ok(base_dir.join(DEFAULT_CACHE_DIRNAME))
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// File the given remote reference is cached under
    pub fn cache_path_for(&self, url: &Url) -> PathBuf {
        let digest = Sha256::digest(url.as_str().as_bytes());
        let name: String = digest.iter().map(|b| format!("{:02x}", b)).collect();

        let extension = Path::new(url.path())
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| e.len() <= 5)
            .unwrap_or("img");

        self.cache_dir.join(format!("{}.{}", name, extension))
    }

    async fn download(&self, url: &Url, target: &Path) -> Result<(), ImageError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ImageError::Network(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::GONE => {
                return Err(ImageError::NotFound(url.to_string()));
            }
            status if !status.is_success() => {
                return Err(ImageError::Network(format!("{} returned {}", url, status)));
            }
            _ => {}
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImageError::Network(e.to_string()))?;

        let cache_dir = self.cache_dir.clone();
        let target = target.to_path_buf();
        tokio::task::spawn_blocking(move || -> Result<(), ImageError> {
            let mut file = tempfile::NamedTempFile::new_in(&cache_dir)?;
            file.write_all(&bytes)?;
            file.persist(&target).map_err(|e| ImageError::Io(e.error))?;
            Ok(())
        })
        .await
        .map_err(|e| ImageError::Io(std::io::Error::other(e.to_string())))?
    }
}

#[async_trait]
impl ImageResolver for CachingImageResolver {
    async fn resolve(&self, image_ref: &str) -> Result<PathBuf, ImageError> {
        match Url::parse(image_ref) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
                let target = self.cache_path_for(&url);
                if tokio::fs::try_exists(&target).await.unwrap_or(false) {
                    debug!("Image cache hit for {}", url);
                    return Ok(target);
                }

                debug!("Downloading image {}", url);
                self.download(&url, &target).await?;
                Ok(target)
            }
            Ok(url) if url.scheme() == "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| ImageError::NotFound(image_ref.to_string()))?;
                existing_file(path, image_ref).await
            }
            _ => existing_file(PathBuf::from(image_ref), image_ref).await,
        }
    }
}

async fn existing_file(path: PathBuf, image_ref: &str) -> Result<PathBuf, ImageError> {
    if tokio::fs::try_exists(&path).await? {
        Ok(path)
    } else {
        Err(ImageError::NotFound(image_ref.to_string()))
    }
}
