/*!
 * In-memory store of processed page text.
 *
 * Entries are keyed by page id and live for one note session. Display-mode
 * changes replace the stored value with an updated copy and never trigger
 * re-segmentation.
 *
 * Writes for one page id are ordered by a generation counter: a processing
 * pass reserves a generation before it starts and may only commit if no
 * newer pass or direct write happened in the meantime.
 */

use log::debug;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::note::{DisplayMode, DisplayOverride, ProcessedText};

#[derive(Debug, Default)]
struct StoreState {
    texts: HashMap<String, ProcessedText>,
    generations: HashMap<String, u64>,
}

impl StoreState {
    fn bump(&mut self, page_id: &str) -> u64 {
        let generation = self.generations.entry(page_id.to_string()).or_insert(0);
        *generation += 1;
        *generation
    }
}

/// Keyed cache of `ProcessedText`, cheap to clone and shared across tasks
#[derive(Debug, Clone, Default)]
pub struct ProcessedTextStore {
    state: Arc<RwLock<StoreState>>,
}

impl ProcessedTextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, page_id: &str) -> Option<ProcessedText> {
        self.state.read().texts.get(page_id).cloned()
    }

    /// Store a value, superseding any processing pass still in flight
    pub fn set(&self, page_id: &str, processed: ProcessedText) {
        let mut state = self.state.write();
        state.bump(page_id);
        state.texts.insert(page_id.to_string(), processed);
    }

    pub fn has(&self, page_id: &str) -> bool {
        self.state.read().texts.contains_key(page_id)
    }

    pub fn remove(&self, page_id: &str) -> Option<ProcessedText> {
        let mut state = self.state.write();
        state.bump(page_id);
        state.texts.remove(page_id)
    }

    pub fn len(&self) -> usize {
        self.state.read().texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().texts.is_empty()
    }

    pub fn clear(&self) {
        let mut state = self.state.write();
        let ids: Vec<String> = state.texts.keys().cloned().collect();
        for id in ids {
            state.bump(&id);
        }
        state.texts.clear();
    }

    /// Reserve a generation for a processing pass over `page_id`
    pub fn begin_processing(&self, page_id: &str) -> u64 {
        self.state.write().bump(page_id)
    }

    /// Whether `generation` is still the newest pass or write for `page_id`
    pub fn is_current(&self, page_id: &str, generation: u64) -> bool {
        self.state.read().generations.get(page_id).copied() == Some(generation)
    }

    /// Commit the result of a processing pass.
    ///
    /// Returns false and drops the value if a newer pass or write happened
    /// since `begin_processing`. The display state of the replaced entry is
    /// kept so a user's per-page choice survives reprocessing.
    pub fn commit_processed(&self, page_id: &str, generation: u64, mut processed: ProcessedText) -> bool {
        let mut state = self.state.write();
        if state.generations.get(page_id).copied() != Some(generation) {
            debug!("Discarding stale processing result for page {} (generation {})", page_id, generation);
            return false;
        }

        if let Some(existing) = state.texts.get(page_id) {
            processed.display = existing.display;
            processed.display_override = existing.display_override;
        }
        state.texts.insert(page_id.to_string(), processed);
        true
    }

    /// Replace the entry only if it still equals `expected`
    pub fn replace_if_unchanged(
        &self,
        page_id: &str,
        expected: &ProcessedText,
        replacement: ProcessedText,
    ) -> bool {
        let mut state = self.state.write();
        if state.texts.get(page_id) != Some(expected) {
            return false;
        }
        state.bump(page_id);
        state.texts.insert(page_id.to_string(), replacement);
        true
    }

    fn update_display<F>(&self, page_id: &str, change: F) -> Option<ProcessedText>
    where
        F: FnOnce(&mut DisplayMode),
    {
        let mut state = self.state.write();
        let current = state.texts.get(page_id)?;

        let mut mode = current.display;
        change(&mut mode);
        let updated = current.with_user_display(mode);

        state.texts.insert(page_id.to_string(), updated.clone());
        Some(updated)
    }

    pub fn toggle_full_text(&self, page_id: &str) -> Option<ProcessedText> {
        self.update_display(page_id, |mode| mode.show_full_text = !mode.show_full_text)
    }

    pub fn toggle_transliteration(&self, page_id: &str) -> Option<ProcessedText> {
        self.update_display(page_id, |mode| mode.show_transliteration = !mode.show_transliteration)
    }

    pub fn toggle_translation(&self, page_id: &str) -> Option<ProcessedText> {
        self.update_display(page_id, |mode| mode.show_translation = !mode.show_translation)
    }

    /// Set the full display mode of a page as a user choice
    pub fn set_display_mode(&self, page_id: &str, display: DisplayMode) -> Option<ProcessedText> {
        self.update_display(page_id, |mode| *mode = display)
    }

    /// Apply a note-level default to every page without a user override.
    /// Returns the number of entries changed.
    pub fn apply_note_default(&self, display: DisplayMode) -> usize {
        let mut state = self.state.write();
        let mut changed = 0;
        for processed in state.texts.values_mut() {
            if processed.display_override == DisplayOverride::Unset && processed.display != display {
                processed.display = display;
                changed += 1;
            }
        }
        changed
    }
}
