/*!
 * Remote page store seam.
 *
 * A note session only ever needs two things from the store backing its
 * pages: the current page list of a note, and a way to write back the full
 * texts of one page. `Repository` (SQLite) and `InMemoryPageStore` implement it.
 */

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::StoreError;
use crate::note::Page;

/// Store holding the authoritative copy of a note's pages
#[async_trait]
pub trait PageStore: Send + Sync {
    /// Fetch the pages of a note ordered by page number
    async fn fetch_pages(&self, note_id: &str) -> Result<Vec<Page>, StoreError>;

    /// Replace the full texts of one page and return the stored page
    async fn update_page_content(
        &self,
        page_id: &str,
        original_text: &str,
        translated_text: &str,
    ) -> Result<Page, StoreError>;
}

/// Page store kept in process memory
#[derive(Clone, Default)]
pub struct InMemoryPageStore {
    /// note id -> pages
    notes: Arc<RwLock<HashMap<String, Vec<Page>>>>,
}

impl InMemoryPageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a page of a note
    pub fn upsert_page(&self, note_id: &str, page: Page) {
        let mut notes = self.notes.write();
        let pages = notes.entry(note_id.to_string()).or_default();
        match pages.iter_mut().find(|p| p.id == page.id) {
            Some(existing) => *existing = page,
            None => pages.push(page),
        }
    }

    /// Look up a page by id across all notes
    pub fn page(&self, page_id: &str) -> Option<Page> {
        self.notes
            .read()
            .values()
            .flat_map(|pages| pages.iter())
            .find(|p| p.id == page_id)
            .cloned()
    }
}

#[async_trait]
impl PageStore for InMemoryPageStore {
    async fn fetch_pages(&self, note_id: &str) -> Result<Vec<Page>, StoreError> {
        let mut pages = self
            .notes
            .read()
            .get(note_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("note {}", note_id)))?;
        pages.sort_by_key(|p| p.page_number);
        Ok(pages)
    }

    async fn update_page_content(
        &self,
        page_id: &str,
        original_text: &str,
        translated_text: &str,
    ) -> Result<Page, StoreError> {
        let mut notes = self.notes.write();
        let page = notes
            .values_mut()
            .flat_map(|pages| pages.iter_mut())
            .find(|p| p.id == page_id)
            .ok_or_else(|| StoreError::NotFound(page_id.to_string()))?;

        page.original_text = original_text.to_string();
        page.translated_text = translated_text.to_string();
        Ok(page.clone())
    }
}
