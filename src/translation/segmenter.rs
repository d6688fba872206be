/*!
 * Sentence segmentation of page text.
 *
 * A page's OCR text is cut after every run of sentence terminators (CJK and
 * Latin), each piece is translated through the translation cache and, when
 * it contains CJK characters, transliterated. Provider failures never stop
 * the pipeline: the source text stands in for its own translation.
 */

use futures::future::join_all;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use super::cache::TranslationCache;
use super::transliteration::Transliterator;
use crate::note::{DisplayMode, Page, ProcessedText, TextSegment};
use crate::page_store::PageStore;
use crate::providers::Translator;

/// A run of sentence terminators and the whitespace after it
static SENTENCE_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"[。！？!?.,，、]+\s*").unwrap());

/// Characters from the CJK scripts
static CJK_CHARACTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{Han}\p{Hiragana}\p{Katakana}\p{Hangul}]").unwrap());

/// Split text into sentence pieces, keeping terminators and trailing
/// whitespace attached to the piece they end. Whitespace-only pieces are
/// dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut start = 0;

    let mut push = |piece: &str| {
        if !piece.trim().is_empty() {
            pieces.push(piece.to_string());
        }
    };

    for boundary in SENTENCE_BOUNDARY.find_iter(text) {
        push(&text[start..boundary.end()]);
        start = boundary.end();
    }
    push(&text[start..]);

    pieces
}

/// Whether the text contains any CJK character
pub fn contains_cjk(text: &str) -> bool {
    CJK_CHARACTER.is_match(text)
}

/// The CJK characters of a text, in order
pub fn extract_cjk(text: &str) -> String {
    CJK_CHARACTER.find_iter(text).map(|m| m.as_str()).collect()
}

/// Builds `ProcessedText` from page text
pub struct TextSegmenter {
    translator: Arc<dyn Translator>,
    transliterator: Arc<dyn Transliterator>,
    cache: TranslationCache,
    target_language: String,
    default_display: DisplayMode,
    page_store: Option<Arc<dyn PageStore>>,
}

impl TextSegmenter {
    pub fn new(
        translator: Arc<dyn Translator>,
        transliterator: Arc<dyn Transliterator>,
        cache: TranslationCache,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            translator,
            transliterator,
            cache,
            target_language: target_language.into(),
            default_display: DisplayMode::default(),
            page_store: None,
        }
    }

    /// Write full texts back to this store after processing
    pub fn with_page_store(mut self, page_store: Arc<dyn PageStore>) -> Self {
        self.page_store = Some(page_store);
        self
    }

    /// Display mode given to freshly processed pages
    pub fn with_default_display(mut self, display: DisplayMode) -> Self {
        self.default_display = display;
        self
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    /// Translate one piece of text, cache-aside. Falls back to the source
    /// text when the provider fails; fallbacks are not cached so the next
    /// processing pass asks the provider again.
    pub async fn translate_segment(&self, text: &str) -> String {
        let key = text.trim();
        if key.is_empty() {
            return text.to_string();
        }

        if let Some(cached) = self.cache.get(key, &self.target_language) {
            return cached;
        }

        match self.translator.translate(key, &self.target_language).await {
            Ok(translation) => {
                self.cache.store(key, &self.target_language, &translation);
                translation
            }
            Err(e) => {
                warn!(
                    "Translation via {} failed, keeping source text: {}",
                    self.translator.name(),
                    e
                );
                key.to_string()
            }
        }
    }

    async fn build_segment(&self, piece: &str) -> TextSegment {
        let transliteration = if contains_cjk(piece) {
            Some(self.transliterator.generate(&extract_cjk(piece)))
        } else {
            None
        };

        TextSegment {
            original_text: piece.to_string(),
            translated_text: Some(self.translate_segment(piece).await),
            transliteration,
        }
    }

    /// Segment text; segment translations run concurrently and keep order
    pub async fn segment(&self, text: &str) -> Vec<TextSegment> {
        let pieces = split_sentences(text);
        join_all(pieces.iter().map(|piece| self.build_segment(piece))).await
    }

    /// Derive the processed text of a page and write the full texts back to
    /// the page store.
    ///
    /// Returns `None` when the page has neither text nor an image. A page
    /// with an image but no text yet gets an empty, unsegmented record.
    pub async fn process(&self, page: &Page, image_available: bool) -> Option<ProcessedText> {
        let processed = self.derive(page, image_available).await?;
        self.persist(page, &processed).await;
        Some(processed)
    }

    /// Derive the processed text of a page without touching the page store
    pub async fn derive(&self, page: &Page, image_available: bool) -> Option<ProcessedText> {
        if !page.has_text() {
            if !image_available {
                debug!("Page {} has no text and no image, nothing to process", page.id);
                return None;
            }
            // Keeps the raw text so the page counts as up to date next time
            let mut placeholder = ProcessedText::empty(self.default_display);
            placeholder.full_original_text = page.original_text.clone();
            return Some(placeholder);
        }

        let segments = self.segment(&page.original_text).await;
        let full_translated_text = if segments.is_empty() {
            None
        } else {
            Some(
                segments
                    .iter()
                    .filter_map(|s| s.translated_text.as_deref())
                    .collect::<Vec<_>>()
                    .join("\n"),
            )
        };

        debug!("Page {} split into {} segments", page.id, segments.len());

        Some(ProcessedText::new(
            page.original_text.clone(),
            full_translated_text,
            segments,
            self.default_display,
        ))
    }

    /// Best-effort write-back of the full texts. Unsegmented records and
    /// texts equal to the stored ones are not written.
    pub async fn persist(&self, page: &Page, processed: &ProcessedText) {
        let Some(store) = &self.page_store else {
            return;
        };
        if processed.segments.is_none() {
            return;
        }

        let translated = processed.full_translated_text.as_deref().unwrap_or_default();
        if page.original_text == processed.full_original_text && page.translated_text == translated {
            return;
        }

        if let Err(e) = store
            .update_page_content(&page.id, &processed.full_original_text, translated)
            .await
        {
            warn!("Failed to cache processed text of page {}: {}", page.id, e);
        }
    }
}
