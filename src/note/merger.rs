/*!
 * Reconciliation of local pages with pages fetched from the store.
 *
 * The server copy of a page always wins over the local copy (last write by
 * source, not by timestamp). Output order depends only on page numbers, so
 * merging is idempotent and independent of arrival order.
 */

use log::debug;
use std::collections::HashMap;

use super::book::{PageBook, PageEntry, SharedPageBook};
use super::model::{ImageSlot, Page};

/// Merge local and server pages into one list sorted by page number
pub fn merge_pages(local: &[Page], server: &[Page]) -> Vec<Page> {
    let mut by_id: HashMap<&str, &Page> = HashMap::new();
    for page in local.iter().chain(server.iter()) {
        if page.has_valid_id() {
            by_id.insert(page.id.as_str(), page);
        }
    }

    let mut merged: Vec<Page> = by_id.into_values().cloned().collect();
    merged.sort_by(|a, b| a.page_number.cmp(&b.page_number).then_with(|| a.id.cmp(&b.id)));
    merged
}

/// Merges freshly fetched pages into a page book
pub struct PageMerger;

impl PageMerger {
    /// Merge server pages over the previous book. Pages that already existed
    /// with the same image reference keep their image slot; new pages and
    /// pages whose image changed start out `NotLoaded`.
    pub fn merge(previous: &PageBook, server: &[Page]) -> PageBook {
        let merged = merge_pages(&previous.pages(), server);

        let mut carried = 0usize;
        let entries: Vec<PageEntry> = merged
            .into_iter()
            .map(|page| {
                let image = match previous.get(&page.id) {
                    Some(entry) if entry.page.image_ref == page.image_ref => {
                        carried += 1;
                        entry.image.clone()
                    }
                    _ => ImageSlot::NotLoaded,
                };
                PageEntry { page, image }
            })
            .collect();

        debug!(
            "Merged {} server pages into {} local pages ({} image slots carried over)",
            server.len(),
            previous.len(),
            carried
        );

        PageBook::from_entries(entries)
    }

    /// Apply a merge to a shared book under its write lock
    pub fn merge_into(book: &SharedPageBook, server: &[Page]) -> usize {
        let mut guard = book.write();
        let merged = Self::merge(&guard, server);
        let len = merged.len();
        *guard = merged;
        len
    }
}
