/*!
 * Tests for segment deletion
 */

use std::sync::Arc;

use pagetext::errors::EditError;
use pagetext::note::{DisplayMode, Page, ProcessedText, TextSegment};
use pagetext::page_store::InMemoryPageStore;
use pagetext::processed_store::ProcessedTextStore;
use pagetext::segment_editor::SegmentEditor;

use crate::common::{FlakyPageStore, NOTE_ID};

fn segment(original: &str, translated: &str) -> TextSegment {
    TextSegment {
        original_text: original.to_string(),
        translated_text: Some(translated.to_string()),
        transliteration: None,
    }
}

fn three_segments() -> ProcessedText {
    ProcessedText::new(
        "你好。今天天气不错！再见。",
        Some("Hello.\nNice day!\nBye.".to_string()),
        vec![
            segment("你好。", "Hello."),
            segment("今天天气不错！", "Nice day!"),
            segment("再见。", "Bye."),
        ],
        DisplayMode::default(),
    )
}

fn setup() -> (Page, ProcessedTextStore, FlakyPageStore, SegmentEditor) {
    crate::common::init_logging();
    let page = Page::new("p1", 1, "你好。今天天气不错！再见。");
    let inner = InMemoryPageStore::new();
    inner.upsert_page(NOTE_ID, page.clone());

    let page_store = FlakyPageStore::new(inner);
    let store = ProcessedTextStore::new();
    store.set("p1", three_segments());

    let editor = SegmentEditor::new(store.clone(), Arc::new(page_store.clone()));
    (page, store, page_store, editor)
}

#[tokio::test]
async fn test_deleteSegment_withValidIndex_shouldShrinkAndPersist() {
    let (page, store, page_store, editor) = setup();

    let stored = editor.delete_segment(NOTE_ID, &page, 1).await.unwrap();

    let processed = store.get("p1").unwrap();
    assert_eq!(processed.segment_count(), 2);
    assert!(!processed.full_original_text.contains("今天天气不错！"));
    assert_eq!(processed.full_original_text, "你好。再见。");
    assert_eq!(processed.full_translated_text.as_deref(), Some("Hello.Bye."));

    assert_eq!(stored.original_text, "你好。再见。");
    assert_eq!(stored.translated_text, "Hello.Bye.");
    assert_eq!(page_store.inner().page("p1").unwrap(), stored);
}

#[tokio::test]
async fn test_deleteSegment_inFullTextMode_shouldFailAndLeaveStore() {
    let (page, store, page_store, editor) = setup();
    let before = store.toggle_full_text("p1").unwrap();

    let result = editor.delete_segment(NOTE_ID, &page, 0).await;

    assert!(matches!(result, Err(EditError::InvalidState(_))));
    assert_eq!(store.get("p1"), Some(before));
    assert_eq!(page_store.update_calls(), 0);
}

#[tokio::test]
async fn test_deleteSegment_withPersistenceFailure_shouldRollBack() {
    let (page, store, page_store, editor) = setup();
    page_store.set_fail_updates(true);
    let before = store.get("p1").unwrap();

    let result = editor.delete_segment(NOTE_ID, &page, 0).await;

    assert!(matches!(result, Err(EditError::PersistenceFailure(_))));
    assert_eq!(store.get("p1"), Some(before));
    assert_eq!(page_store.inner().page("p1").unwrap(), page);
}

#[tokio::test]
async fn test_deleteSegment_withBadPreconditions_shouldReportWhich() {
    let (page, store, _page_store, editor) = setup();

    assert_eq!(
        editor.delete_segment(NOTE_ID, &page, 3).await,
        Err(EditError::IndexOutOfRange { index: 3, len: 3 })
    );

    store.set("p1", ProcessedText::empty(DisplayMode::default()));
    assert_eq!(
        editor.delete_segment(NOTE_ID, &page, 0).await,
        Err(EditError::NoSegments("p1".to_string()))
    );

    store.remove("p1");
    assert_eq!(
        editor.delete_segment(NOTE_ID, &page, 0).await,
        Err(EditError::NotProcessed("p1".to_string()))
    );
}

#[tokio::test]
async fn test_deleteSegment_lastSegment_shouldLeaveEmptyPage() {
    let (page, store, _page_store, editor) = setup();

    for _ in 0..3 {
        editor.delete_segment(NOTE_ID, &page, 0).await.unwrap();
    }

    let processed = store.get("p1").unwrap();
    assert_eq!(processed.segment_count(), 0);
    assert_eq!(processed.full_original_text, "");
    assert_eq!(processed.full_translated_text, None);
}
