/*!
 * Segment deletion.
 *
 * Removing a segment rebuilds the page's full texts from the remaining
 * segments, updates the processed text store and writes the texts back to
 * the page store. The store update is applied first; if the write-back fails
 * the store entry is rolled back to its previous value, unless something else
 * replaced it in the meantime.
 */

use log::{info, warn};
use std::sync::Arc;

use crate::errors::EditError;
use crate::note::{Page, ProcessedText};
use crate::page_store::PageStore;
use crate::processed_store::ProcessedTextStore;

/// Deletes segments from processed pages
pub struct SegmentEditor {
    store: ProcessedTextStore,
    page_store: Arc<dyn PageStore>,
}

impl SegmentEditor {
    pub fn new(store: ProcessedTextStore, page_store: Arc<dyn PageStore>) -> Self {
        Self { store, page_store }
    }

    /// Remove the segment at `segment_index` from `page` and persist the
    /// rebuilt texts. Returns the page as stored afterwards.
    pub async fn delete_segment(
        &self,
        note_id: &str,
        page: &Page,
        segment_index: usize,
    ) -> Result<Page, EditError> {
        let previous = self
            .store
            .get(&page.id)
            .ok_or_else(|| EditError::NotProcessed(page.id.clone()))?;

        let updated = remove_segment(&previous, segment_index, &page.id)?;
        let translated = updated.full_translated_text.clone().unwrap_or_default();

        self.store.set(&page.id, updated.clone());

        match self
            .page_store
            .update_page_content(&page.id, &updated.full_original_text, &translated)
            .await
        {
            Ok(stored) => {
                info!(
                    "Deleted segment {} of page {} in note {} ({} segments left)",
                    segment_index,
                    page.id,
                    note_id,
                    updated.segment_count()
                );
                Ok(stored)
            }
            Err(e) => {
                let rolled_back = self.store.replace_if_unchanged(&page.id, &updated, previous);
                warn!(
                    "Failed to persist segment deletion on page {} in note {}: {} (rolled back: {})",
                    page.id, note_id, e, rolled_back
                );
                Err(EditError::PersistenceFailure(e.to_string()))
            }
        }
    }
}

/// Build the processed text that results from removing one segment
pub fn remove_segment(
    processed: &ProcessedText,
    segment_index: usize,
    page_id: &str,
) -> Result<ProcessedText, EditError> {
    if processed.show_full_text() {
        return Err(EditError::InvalidState(
            "segments cannot be deleted while the page is shown as full text".to_string(),
        ));
    }

    let segments = match &processed.segments {
        Some(segments) if !segments.is_empty() => segments,
        _ => return Err(EditError::NoSegments(page_id.to_string())),
    };

    if segment_index >= segments.len() {
        return Err(EditError::IndexOutOfRange {
            index: segment_index,
            len: segments.len(),
        });
    }

    let mut remaining = segments.clone();
    remaining.remove(segment_index);

    let full_original_text: String = remaining.iter().map(|s| s.original_text.as_str()).collect();
    let full_translated_text = if remaining.iter().any(|s| s.translated_text.is_some()) {
        Some(
            remaining
                .iter()
                .filter_map(|s| s.translated_text.as_deref())
                .collect::<String>(),
        )
    } else {
        None
    };

    Ok(ProcessedText {
        full_original_text,
        full_translated_text,
        segments: Some(remaining),
        ..processed.clone()
    })
}
