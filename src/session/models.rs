/*!
 * Session-specific models.
 *
 * The collaborators a note session is built from and the view of a page
 * the presentation layer reads after opening it.
 */

use std::sync::Arc;

use crate::app_config::Config;
use crate::images::ImageResolver;
use crate::note::{DisplayMode, ImageSlot, Page, ProcessedText};
use crate::page_store::PageStore;
use crate::providers::Translator;
use crate::translation::Transliterator;

/// External services a session talks to
#[derive(Clone)]
pub struct SessionServices {
    /// Remote page store
    pub page_store: Arc<dyn PageStore>,
    /// Translation provider
    pub translator: Arc<dyn Translator>,
    /// Reading generator for CJK text
    pub transliterator: Arc<dyn Transliterator>,
    /// Page image resolver
    pub image_resolver: Arc<dyn ImageResolver>,
}

/// Settings of one session
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Target language code
    pub target_language: String,
    /// Display mode of pages without a user override
    pub default_display: DisplayMode,
    /// Whether translations are cached
    pub cache_enabled: bool,
}

impl SessionOptions {
    pub fn new(target_language: impl Into<String>) -> Self {
        Self {
            target_language: target_language.into(),
            default_display: DisplayMode::default(),
            cache_enabled: true,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            target_language: config.target_language.clone(),
            default_display: config.display,
            cache_enabled: config.translation.cache_enabled,
        }
    }
}

/// A page as shown after opening it
#[derive(Debug, Clone)]
pub struct PageView {
    /// The page record
    pub page: Page,
    /// Image slot once the current-page resolution finished
    pub image: ImageSlot,
    /// Processed text, `None` when the page has neither text nor an image
    pub processed: Option<ProcessedText>,
}
