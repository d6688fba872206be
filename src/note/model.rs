/*!
 * Data model for note pages and their derived text.
 *
 * A `Page` is the persisted unit fetched from the page store. A
 * `ProcessedText` is the in-memory derived record built from a page's
 * original text; only the rebuilt full texts ever travel back to the store.
 */

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One page of a note's paginated source content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Opaque identifier, unique within a note
    #[serde(default)]
    pub id: String,

    /// Defines display order
    pub page_number: i64,

    /// OCR'd source text
    #[serde(default)]
    pub original_text: String,

    /// Cached full translation of the page
    #[serde(default)]
    pub translated_text: String,

    /// Reference to the page image (local path or URL)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl Page {
    /// Create a page with the given id, number and text
    pub fn new(id: impl Into<String>, page_number: i64, original_text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            page_number,
            original_text: original_text.into(),
            translated_text: String::new(),
            image_ref: None,
        }
    }

    /// Create a page that only exists locally until the next sync
    pub fn new_local(page_number: i64, original_text: impl Into<String>) -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), page_number, original_text)
    }

    /// Set the image reference
    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }

    /// Set the cached translation
    pub fn with_translation(mut self, translated_text: impl Into<String>) -> Self {
        self.translated_text = translated_text.into();
        self
    }

    /// Whether the id can be used as a map key
    pub fn has_valid_id(&self) -> bool {
        !self.id.trim().is_empty()
    }

    /// Whether there is any raw text to segment
    pub fn has_text(&self) -> bool {
        !self.original_text.trim().is_empty()
    }
}

/// One sentence-like unit of a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSegment {
    pub original_text: String,
    pub translated_text: Option<String>,
    pub transliteration: Option<String>,
}

impl TextSegment {
    pub fn new(original_text: impl Into<String>) -> Self {
        Self {
            original_text: original_text.into(),
            translated_text: None,
            transliteration: None,
        }
    }
}

/// Which parts of a page the presentation layer shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayMode {
    /// Show the page as one undivided block instead of segments
    #[serde(default)]
    pub show_full_text: bool,

    #[serde(default = "default_true")]
    pub show_transliteration: bool,

    #[serde(default = "default_true")]
    pub show_translation: bool,
}

fn default_true() -> bool {
    true
}

impl Default for DisplayMode {
    fn default() -> Self {
        Self {
            show_full_text: false,
            show_transliteration: true,
            show_translation: true,
        }
    }
}

/// Per-page override of the note-level display mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayOverride {
    /// The page follows the note default
    #[default]
    Unset,
    /// The user picked this mode for the page
    UserOverridden(DisplayMode),
}

/// Derived per-page content combining segments and display state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedText {
    pub full_original_text: String,
    pub full_translated_text: Option<String>,
    pub segments: Option<Vec<TextSegment>>,
    pub display: DisplayMode,
    pub display_override: DisplayOverride,
}

impl ProcessedText {
    /// Build a processed text from segments with the given display mode
    pub fn new(
        full_original_text: impl Into<String>,
        full_translated_text: Option<String>,
        segments: Vec<TextSegment>,
        display: DisplayMode,
    ) -> Self {
        Self {
            full_original_text: full_original_text.into(),
            full_translated_text,
            segments: Some(segments),
            display,
            display_override: DisplayOverride::Unset,
        }
    }

    /// Placeholder for a page that has an image but no text yet
    pub fn empty(display: DisplayMode) -> Self {
        Self {
            full_original_text: String::new(),
            full_translated_text: None,
            segments: None,
            display,
            display_override: DisplayOverride::Unset,
        }
    }

    pub fn show_full_text(&self) -> bool {
        self.display.show_full_text
    }

    pub fn show_transliteration(&self) -> bool {
        self.display.show_transliteration
    }

    pub fn show_translation(&self) -> bool {
        self.display.show_translation
    }

    pub fn user_overrode_display_mode(&self) -> bool {
        matches!(self.display_override, DisplayOverride::UserOverridden(_))
    }

    /// Number of segments, zero when the page is unsegmented
    pub fn segment_count(&self) -> usize {
        self.segments.as_ref().map_or(0, Vec::len)
    }

    /// Mode to display given the note-level default
    pub fn effective_display(&self, note_default: DisplayMode) -> DisplayMode {
        match self.display_override {
            DisplayOverride::UserOverridden(mode) => mode,
            DisplayOverride::Unset => note_default,
        }
    }

    /// Copy with a user-chosen display mode
    pub fn with_user_display(&self, mode: DisplayMode) -> Self {
        Self {
            display: mode,
            display_override: DisplayOverride::UserOverridden(mode),
            ..self.clone()
        }
    }
}

/// Resolution state of a page image
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageSlot {
    #[default]
    NotLoaded,
    Loading,
    Loaded(PathBuf),
    Failed,
}

impl ImageSlot {
    /// Whether a resolution is done or under way
    pub fn is_settled_or_pending(&self) -> bool {
        matches!(self, Self::Loaded(_) | Self::Loading)
    }

    pub fn local_file(&self) -> Option<&PathBuf> {
        match self {
            Self::Loaded(path) => Some(path),
            _ => None,
        }
    }
}
