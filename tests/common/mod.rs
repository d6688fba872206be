/*!
 * Common test utilities for the pagetext test suite
 */

use anyhow::Result;
use std::sync::Arc;
use tempfile::TempDir;

use pagetext::note::Page;
use pagetext::page_store::InMemoryPageStore;
use pagetext::providers::mock::MockTranslator;
use pagetext::session::{NoteSession, SessionOptions, SessionServices};
use pagetext::translation::ReadingTable;

// Re-export the mock collaborators
pub mod mock_services;

pub use mock_services::{FlakyPageStore, MockImageResolver};

/// Note id used across the suite
pub const NOTE_ID: &str = "note-1";

/// Route library logs to the test harness
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Reading table covering the characters used in the sample pages
pub fn sample_reading_table() -> ReadingTable {
    ReadingTable::parse(
        "# character\treading\n\
         你\tnǐ\n\
         好\thǎo\n\
         今\tjīn\n\
         天\ttiān\n\
         气\tqì\n\
         不\tbù\n\
         错\tcuò\n\
         谢\txiè\n",
    )
}

/// Three pages: two with text and an image, one image-only
pub fn sample_pages() -> Vec<Page> {
    vec![
        Page::new("p1", 1, "你好。今天天气不错！").with_image("img/p1.png"),
        Page::new("p2", 2, "谢谢。Thank you.").with_image("img/p2.png"),
        Page::new("p3", 3, "").with_image("img/p3.png"),
    ]
}

/// In-memory store seeded with the sample pages under `NOTE_ID`
pub fn seeded_store() -> InMemoryPageStore {
    let store = InMemoryPageStore::new();
    for page in sample_pages() {
        store.upsert_page(NOTE_ID, page);
    }
    store
}

/// Session over the given collaborators with English as target
pub fn build_session(
    page_store: Arc<dyn pagetext::page_store::PageStore>,
    translator: MockTranslator,
    resolver: MockImageResolver,
) -> NoteSession {
    init_logging();
    let services = SessionServices {
        page_store,
        translator: Arc::new(translator),
        transliterator: Arc::new(sample_reading_table()),
        image_resolver: Arc::new(resolver),
    };
    NoteSession::new(NOTE_ID, services, SessionOptions::new("en"))
}
