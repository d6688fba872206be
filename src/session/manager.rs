/*!
 * Note session lifecycle.
 *
 * A `NoteSession` owns the page book, the processed text store, the
 * translation cache and the components working on them for as long as one
 * note is open. Nothing is shared between sessions: two notes opened side by
 * side get independent caches and stores.
 *
 * This module handles:
 * - Syncing pages from the page store
 * - Opening a page (image first, then text processing)
 * - Display mode changes and segment deletion
 * - Waiting for and cancelling background image work
 */

use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::errors::{EditError, StoreError};
use crate::images::ImagePrefetcher;
use crate::note::{DisplayMode, ImageSlot, Page, PageBook, PageMerger, ProcessedText, SharedPageBook};
use crate::page_store::PageStore;
use crate::processed_store::ProcessedTextStore;
use crate::segment_editor::SegmentEditor;
use crate::translation::{TextSegmenter, TranslationCache};

use super::models::{PageView, SessionOptions, SessionServices};

/// State and components of one open note
pub struct NoteSession {
    note_id: String,
    page_store: Arc<dyn PageStore>,
    book: SharedPageBook,
    processed: ProcessedTextStore,
    segmenter: TextSegmenter,
    prefetcher: ImagePrefetcher,
    editor: SegmentEditor,
    default_display: RwLock<DisplayMode>,
    background: Mutex<Vec<JoinHandle<()>>>,
}

impl NoteSession {
    /// Create a session for `note_id` with an empty page book
    pub fn new(note_id: impl Into<String>, services: SessionServices, options: SessionOptions) -> Self {
        let note_id = note_id.into();
        let book = PageBook::new().into_shared();
        let processed = ProcessedTextStore::new();
        let cache = TranslationCache::new(options.cache_enabled);

        let segmenter = TextSegmenter::new(
            services.translator,
            services.transliterator,
            cache,
            options.target_language,
        )
        .with_page_store(services.page_store.clone())
        .with_default_display(options.default_display);

        let prefetcher = ImagePrefetcher::new(services.image_resolver, book.clone());
        let editor = SegmentEditor::new(processed.clone(), services.page_store.clone());

        info!("Opened session for note {}", note_id);

        Self {
            note_id,
            page_store: services.page_store,
            book,
            processed,
            segmenter,
            prefetcher,
            editor,
            default_display: RwLock::new(options.default_display),
            background: Mutex::new(Vec::new()),
        }
    }

    pub fn note_id(&self) -> &str {
        &self.note_id
    }

    // =========================================================================
    // Pages
    // =========================================================================

    /// Fetch the note's pages and merge them into the book.
    ///
    /// On failure the book keeps its last good state and the error is
    /// returned. Returns the page count after the merge.
    pub async fn sync_pages(&self) -> Result<usize, StoreError> {
        match self.page_store.fetch_pages(&self.note_id).await {
            Ok(server_pages) => {
                let count = PageMerger::merge_into(&self.book, &server_pages);
                info!("Synced note {}: {} pages", self.note_id, count);
                Ok(count)
            }
            Err(e) => {
                warn!("Failed to fetch pages of note {}, keeping {} local pages: {}", self.note_id, self.page_count(), e);
                Err(e)
            }
        }
    }

    /// Add a page created locally; it stays in the book until a sync
    /// returns the server copy
    pub fn add_local_page(&self, page: Page) -> bool {
        let added = self.book.write().insert_local(page);
        if !added {
            warn!("Rejected local page with malformed id in note {}", self.note_id);
        }
        added
    }

    /// Pages in display order
    pub fn pages(&self) -> Vec<Page> {
        self.book.read().pages()
    }

    pub fn page_count(&self) -> usize {
        self.book.read().len()
    }

    pub fn page(&self, page_id: &str) -> Option<Page> {
        self.book.read().get(page_id).map(|e| e.page.clone())
    }

    pub fn image_slot(&self, page_id: &str) -> ImageSlot {
        self.prefetcher.slot(page_id)
    }

    /// Open the page at `index`: resolve its image, schedule the other
    /// images in the background, then derive its processed text
    pub async fn open_page(&self, index: usize) -> Option<PageView> {
        let page_id = self.book.read().entry_at(index)?.page.id.clone();

        let outcome = self.prefetcher.prefetch(index).await;
        if let Some(handle) = outcome.background {
            let mut background = self.background.lock();
            background.retain(|h| !h.is_finished());
            background.push(handle);
        }

        let processed = self.process_page(&page_id).await;
        let page = self.page(&page_id)?;

        Some(PageView {
            page,
            image: outcome.current,
            processed,
        })
    }

    /// Retry the image of one page
    pub async fn reload_image(&self, page_id: &str) -> ImageSlot {
        self.prefetcher.ensure_loaded(page_id).await
    }

    // =========================================================================
    // Processed Text
    // =========================================================================

    /// Derive the processed text of a page unless an up to date one exists
    pub async fn process_page(&self, page_id: &str) -> Option<ProcessedText> {
        let (page, slot) = {
            let book = self.book.read();
            let entry = book.get(page_id)?;
            (entry.page.clone(), entry.image.clone())
        };

        if let Some(existing) = self.processed.get(page_id) {
            if existing.full_original_text == page.original_text {
                debug!("Processed text of page {} is up to date", page_id);
                return Some(existing);
            }
        }

        let image_available = slot.local_file().is_some() || page.image_ref.is_some();
        let generation = self.processed.begin_processing(page_id);

        let mut processed = self.segmenter.derive(&page, image_available).await?;
        processed.display = *self.default_display.read();

        if !self.processed.commit_processed(page_id, generation, processed.clone()) {
            debug!("Newer processed text of page {} already stored", page_id);
            return self.processed.get(page_id);
        }

        // Only the pass that committed may write back
        if self.processed.is_current(page_id, generation) {
            self.segmenter.persist(&page, &processed).await;
        }
        self.processed.get(page_id)
    }

    pub fn processed_text(&self, page_id: &str) -> Option<ProcessedText> {
        self.processed.get(page_id)
    }

    pub fn processed_store(&self) -> &ProcessedTextStore {
        &self.processed
    }

    pub fn translation_cache(&self) -> &TranslationCache {
        self.segmenter.cache()
    }

    // =========================================================================
    // Display
    // =========================================================================

    pub fn toggle_full_text(&self, page_id: &str) -> Option<ProcessedText> {
        self.processed.toggle_full_text(page_id)
    }

    pub fn toggle_transliteration(&self, page_id: &str) -> Option<ProcessedText> {
        self.processed.toggle_transliteration(page_id)
    }

    pub fn toggle_translation(&self, page_id: &str) -> Option<ProcessedText> {
        self.processed.toggle_translation(page_id)
    }

    pub fn set_display_mode(&self, page_id: &str, display: DisplayMode) -> Option<ProcessedText> {
        self.processed.set_display_mode(page_id, display)
    }

    pub fn default_display(&self) -> DisplayMode {
        *self.default_display.read()
    }

    /// Change the note-level display default. Pages the user adjusted keep
    /// their own mode. Returns the number of pages changed.
    pub fn set_default_display(&self, display: DisplayMode) -> usize {
        *self.default_display.write() = display;
        let changed = self.processed.apply_note_default(display);
        debug!("Applied note display default to {} pages of note {}", changed, self.note_id);
        changed
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Delete one segment of a page and refresh the book with the stored page
    pub async fn delete_segment(&self, page_id: &str, segment_index: usize) -> Result<Page, EditError> {
        let page = self
            .page(page_id)
            .ok_or_else(|| EditError::NotProcessed(page_id.to_string()))?;

        let stored = self.editor.delete_segment(&self.note_id, &page, segment_index).await?;
        self.book.write().update_page(stored.clone());
        Ok(stored)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Number of background image tasks not yet known to be finished
    pub fn background_task_count(&self) -> usize {
        let mut background = self.background.lock();
        background.retain(|h| !h.is_finished());
        background.len()
    }

    /// Wait until every scheduled background image task finished
    pub async fn wait_for_background(&self) {
        let handles = std::mem::take(&mut *self.background.lock());
        for handle in handles {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!("Background image task failed: {}", e);
                }
            }
        }
    }

    /// Cancel background work and drop the processed texts
    pub fn shutdown(&self) {
        let handles = std::mem::take(&mut *self.background.lock());
        for handle in &handles {
            handle.abort();
        }
        self.processed.clear();

        let (hits, misses, hit_rate) = self.translation_cache().stats();
        info!(
            "Closed session for note {} (cache hits: {}, misses: {}, hit rate: {:.1}%)",
            self.note_id,
            hits,
            misses,
            hit_rate * 100.0
        );
    }
}

impl Drop for NoteSession {
    fn drop(&mut self) {
        for handle in self.background.get_mut().drain(..) {
            handle.abort();
        }
    }
}
