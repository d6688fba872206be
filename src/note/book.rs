/*!
 * Ordered page collection keyed by page id.
 *
 * Each entry pairs a page with its image slot so the two can never drift
 * apart when pages are reordered or merged.
 */

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::model::{ImageSlot, Page};

/// Handle to the page book shared inside one session
pub type SharedPageBook = Arc<RwLock<PageBook>>;

/// A page together with its image resolution state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    pub page: Page,
    pub image: ImageSlot,
}

/// Pages sorted by `(page_number, id)` with lookup by id
#[derive(Debug, Clone, Default)]
pub struct PageBook {
    entries: Vec<PageEntry>,
    index: HashMap<String, usize>,
}

impl PageBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a book from entries; entries with malformed ids are dropped and
    /// later duplicates replace earlier ones
    pub fn from_entries(entries: impl IntoIterator<Item = PageEntry>) -> Self {
        let mut by_id: HashMap<String, PageEntry> = HashMap::new();
        for entry in entries {
            if entry.page.has_valid_id() {
                by_id.insert(entry.page.id.clone(), entry);
            }
        }

        let mut entries: Vec<PageEntry> = by_id.into_values().collect();
        entries.sort_by(|a, b| {
            a.page
                .page_number
                .cmp(&b.page.page_number)
                .then_with(|| a.page.id.cmp(&b.page.id))
        });

        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.page.id.clone(), i))
            .collect();

        Self { entries, index }
    }

    /// Build a book of pages that have no image state yet
    pub fn from_pages(pages: impl IntoIterator<Item = Page>) -> Self {
        Self::from_entries(pages.into_iter().map(|page| PageEntry {
            page,
            image: ImageSlot::NotLoaded,
        }))
    }

    /// Wrap the book for sharing inside a session
    pub fn into_shared(self) -> SharedPageBook {
        Arc::new(RwLock::new(self))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PageEntry] {
        &self.entries
    }

    /// Pages in display order
    pub fn pages(&self) -> Vec<Page> {
        self.entries.iter().map(|e| e.page.clone()).collect()
    }

    /// Page ids in display order
    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.page.id.clone()).collect()
    }

    pub fn get(&self, page_id: &str) -> Option<&PageEntry> {
        self.index.get(page_id).map(|&i| &self.entries[i])
    }

    pub fn entry_at(&self, position: usize) -> Option<&PageEntry> {
        self.entries.get(position)
    }

    pub fn position(&self, page_id: &str) -> Option<usize> {
        self.index.get(page_id).copied()
    }

    pub fn contains(&self, page_id: &str) -> bool {
        self.index.contains_key(page_id)
    }

    /// Image slot of a page, `NotLoaded` for unknown ids
    pub fn slot(&self, page_id: &str) -> ImageSlot {
        self.get(page_id)
            .map(|e| e.image.clone())
            .unwrap_or_default()
    }

    /// Replace the image slot of a page. Returns false if the page is gone.
    pub(crate) fn set_slot(&mut self, page_id: &str, slot: ImageSlot) -> bool {
        match self.index.get(page_id) {
            Some(&i) => {
                self.entries[i].image = slot;
                true
            }
            None => false,
        }
    }

    /// Replace the stored copy of a page, keeping its image slot.
    /// A changed page number re-sorts the book.
    pub fn update_page(&mut self, page: Page) -> bool {
        let Some(&i) = self.index.get(&page.id) else {
            return false;
        };

        let reorder = self.entries[i].page.page_number != page.page_number;
        self.entries[i].page = page;
        if reorder {
            *self = Self::from_entries(std::mem::take(&mut self.entries));
        }
        true
    }

    /// Insert a page created locally, pending the next sync
    pub fn insert_local(&mut self, page: Page) -> bool {
        if !page.has_valid_id() {
            return false;
        }
        let image = self.slot(&page.id);
        let mut entries = std::mem::take(&mut self.entries);
        entries.push(PageEntry { page, image });
        *self = Self::from_entries(entries);
        true
    }
}

impl PartialEq for PageBook {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for PageBook {}
