/*!
 * # pagetext - sentence-aligned reading of OCR'd note pages
 *
 * A Rust library that turns the recognized text of multi-page notes into
 * sentence-level segments carrying a transliteration and a translation, and
 * keeps that derived state in step with pages arriving from a store and with
 * page images downloading in the background.
 *
 * ## Features
 *
 * - Sentence segmentation for CJK and Latin punctuation
 * - Cache-aside translation through an Ollama model
 * - Reading-table transliteration of CJK characters
 * - Priority-ordered image prefetching (current, next, previous, rest)
 * - Merging of fetched pages with local pages, keeping loaded images
 * - Segment deletion with rollback when the write-back fails
 * - SQLite page store
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `note`: Pages, processed text, the page book and the merger
 * - `translation`: Segmentation, translation cache and transliteration
 * - `providers`: Translation provider clients:
 *   - `providers::ollama`: Ollama API client
 *   - `providers::mock`: Offline provider for tests and demos
 * - `images`: Image resolution and prefetching
 * - `page_store`: The page store seam
 * - `processed_store`: Per-page processed text and display state
 * - `segment_editor`: Segment deletion
 * - `session`: One note session tying the components together
 * - `database`: SQLite persistence
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod database;
pub mod errors;
pub mod images;
pub mod language_utils;
pub mod note;
pub mod page_store;
pub mod processed_store;
pub mod providers;
pub mod segment_editor;
pub mod session;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, EditError, ImageError, ProviderError, StoreError};
pub use note::{DisplayMode, DisplayOverride, ImageSlot, Page, PageBook, PageMerger, ProcessedText, TextSegment};
pub use processed_store::ProcessedTextStore;
pub use segment_editor::SegmentEditor;
pub use session::NoteSession;
pub use translation::{TextSegmenter, TranslationCache};
pub use language_utils::{language_codes_match, get_language_name};
