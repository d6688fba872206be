/*!
 * Page image resolution.
 *
 * - `resolver`: turns an image reference into a local file
 * - `prefetcher`: resolves page images in navigation priority order
 */

use async_trait::async_trait;
use std::path::PathBuf;

use crate::errors::ImageError;

/// Resolves an image reference to a file on local disk
#[async_trait]
pub trait ImageResolver: Send + Sync {
    async fn resolve(&self, image_ref: &str) -> Result<PathBuf, ImageError>;
}

pub mod prefetcher;
pub mod resolver;

pub use self::prefetcher::{ImagePrefetcher, PrefetchOutcome};
pub use self::resolver::CachingImageResolver;
