/*!
 * Priority-ordered image prefetching.
 *
 * Opening a page resolves its image before returning so the visible page is
 * never shown without it; the next page, the previous page and then every
 * other page follow in a background task. The prefetcher is the only writer
 * of image slots in the page book.
 */

use log::{debug, warn};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use super::ImageResolver;
use crate::note::{ImageSlot, SharedPageBook};

/// Result of a prefetch call
#[derive(Debug)]
pub struct PrefetchOutcome {
    /// Slot of the current page once its resolution finished
    pub current: ImageSlot,
    /// Background task resolving the other pages, if any
    pub background: Option<JoinHandle<()>>,
}

/// What a caller does with a page after looking at its slot
enum Claim {
    Done(ImageSlot),
    Wait,
    Resolve(String),
}

/// Resolves page images into the shared page book
#[derive(Clone)]
pub struct ImagePrefetcher {
    resolver: Arc<dyn ImageResolver>,
    book: SharedPageBook,
    /// Signalled whenever a `Loading` slot settles
    settled: Arc<Notify>,
}

impl ImagePrefetcher {
    pub fn new(resolver: Arc<dyn ImageResolver>, book: SharedPageBook) -> Self {
        Self {
            resolver,
            book,
            settled: Arc::new(Notify::new()),
        }
    }

    /// Resolve the image of the page at `current_index`, then spawn the
    /// resolution of next, previous and remaining pages in the background.
    pub async fn prefetch(&self, current_index: usize) -> PrefetchOutcome {
        let (current_id, order) = {
            let book = self.book.read();
            let Some(entry) = book.entry_at(current_index) else {
                debug!("Prefetch index {} out of range ({} pages)", current_index, book.len());
                return PrefetchOutcome {
                    current: ImageSlot::NotLoaded,
                    background: None,
                };
            };
            (entry.page.id.clone(), background_order(&book.ids(), current_index))
        };

        let current = self.ensure_loaded(&current_id).await;

        let background = if order.is_empty() {
            None
        } else {
            let prefetcher = self.clone();
            Some(tokio::spawn(async move {
                for page_id in order {
                    prefetcher.resolve_page(&page_id, false).await;
                }
            }))
        };

        PrefetchOutcome { current, background }
    }

    /// Explicit access to one page image. Retries a failed slot and waits
    /// for a resolution already in flight instead of starting another.
    pub async fn ensure_loaded(&self, page_id: &str) -> ImageSlot {
        self.resolve_page(page_id, true).await
    }

    /// Current slot of a page
    pub fn slot(&self, page_id: &str) -> ImageSlot {
        self.book.read().slot(page_id)
    }

    async fn resolve_page(&self, page_id: &str, explicit: bool) -> ImageSlot {
        loop {
            // Registered before the slot is read so a settle in between is not missed
            let settled = self.settled.notified();

            match self.claim(page_id, explicit) {
                Claim::Done(slot) => return slot,
                Claim::Resolve(image_ref) => return self.resolve_claimed(page_id, &image_ref).await,
                Claim::Wait => {
                    debug!("Waiting for in-flight image of page {}", page_id);
                    settled.await;
                }
            }
        }
    }

    /// Look at a slot and, if it needs resolving, mark it `Loading` under the
    /// write lock so a page is only resolved once at a time
    fn claim(&self, page_id: &str, explicit: bool) -> Claim {
        let mut book = self.book.write();
        let Some(entry) = book.get(page_id) else {
            return Claim::Done(ImageSlot::NotLoaded);
        };

        match &entry.image {
            ImageSlot::Loaded(_) => return Claim::Done(entry.image.clone()),
            ImageSlot::Loading if explicit => return Claim::Wait,
            ImageSlot::Loading => return Claim::Done(ImageSlot::Loading),
            ImageSlot::Failed if !explicit => return Claim::Done(ImageSlot::Failed),
            _ => {}
        }

        let Some(image_ref) = entry.page.image_ref.clone() else {
            debug!("Page {} has no image reference", page_id);
            return Claim::Done(entry.image.clone());
        };

        book.set_slot(page_id, ImageSlot::Loading);
        Claim::Resolve(image_ref)
    }

    async fn resolve_claimed(&self, page_id: &str, image_ref: &str) -> ImageSlot {
        let mut guard = LoadingGuard {
            prefetcher: self,
            page_id,
            image_ref,
            armed: true,
        };

        let slot = match self.resolver.resolve(image_ref).await {
            Ok(path) => {
                debug!("Resolved image of page {} to {:?}", page_id, path);
                ImageSlot::Loaded(path)
            }
            Err(e) => {
                warn!("Failed to resolve image of page {}: {}", page_id, e);
                ImageSlot::Failed
            }
        };

        guard.armed = false;
        if !self.settle(page_id, image_ref, slot.clone()) {
            debug!("Dropping image result of page {}: page or image changed meanwhile", page_id);
            return self.slot(page_id);
        }
        slot
    }

    /// Store the result of a resolution if the page still exists, still
    /// references the same image and is still `Loading`. Wakes waiters either way.
    fn settle(&self, page_id: &str, image_ref: &str, slot: ImageSlot) -> bool {
        let applied = {
            let mut book = self.book.write();
            let current = book
                .get(page_id)
                .is_some_and(|e| e.image == ImageSlot::Loading && e.page.image_ref.as_deref() == Some(image_ref));
            current && book.set_slot(page_id, slot)
        };
        self.settled.notify_waiters();
        applied
    }
}

/// Releases a `Loading` claim when its resolution is cancelled
struct LoadingGuard<'a> {
    prefetcher: &'a ImagePrefetcher,
    page_id: &'a str,
    image_ref: &'a str,
    armed: bool,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.prefetcher.settle(self.page_id, self.image_ref, ImageSlot::NotLoaded);
        }
    }
}

/// Background order: next, previous, then all other pages ascending
fn background_order(ids: &[String], current: usize) -> Vec<String> {
    let mut order = Vec::with_capacity(ids.len().saturating_sub(1));
    if let Some(next) = ids.get(current + 1) {
        order.push(next.clone());
    }
    if let Some(previous) = current.checked_sub(1).and_then(|i| ids.get(i)) {
        order.push(previous.clone());
    }
    for (i, id) in ids.iter().enumerate() {
        if i + 1 != current && i != current && i != current + 1 {
            order.push(id.clone());
        }
    }
    order
}
