/*!
 * Tests for the processed text store
 */

use pagetext::note::{DisplayMode, DisplayOverride, ProcessedText, TextSegment};
use pagetext::processed_store::ProcessedTextStore;

fn processed(text: &str) -> ProcessedText {
    ProcessedText::new(
        text,
        Some(format!("[en] {}", text)),
        vec![TextSegment::new(text)],
        DisplayMode::default(),
    )
}

#[test]
fn test_toggleTranslation_twice_shouldRestoreValueExceptOverride() {
    let store = ProcessedTextStore::new();
    let original = processed("你好。");
    store.set("p1", original.clone());

    store.toggle_translation("p1").unwrap();
    let restored = store.toggle_translation("p1").unwrap();

    assert_eq!(restored.display, original.display);
    assert_eq!(restored.segments, original.segments);
    assert_eq!(restored.full_original_text, original.full_original_text);
    assert!(restored.user_overrode_display_mode());
    assert!(!original.user_overrode_display_mode());
}

#[test]
fn test_toggles_onMissingPage_shouldReturnNone() {
    let store = ProcessedTextStore::new();
    assert!(store.toggle_full_text("nope").is_none());
    assert!(store.toggle_transliteration("nope").is_none());
    assert!(store.set_display_mode("nope", DisplayMode::default()).is_none());
    assert!(store.is_empty());
}

#[test]
fn test_applyNoteDefault_shouldOnlyTouchUnsetEntries() {
    let store = ProcessedTextStore::new();
    store.set("p1", processed("一。"));
    store.set("p2", processed("二。"));
    store.toggle_transliteration("p2").unwrap();

    let mode = DisplayMode {
        show_full_text: true,
        show_transliteration: false,
        show_translation: false,
    };
    assert_eq!(store.apply_note_default(mode), 1);

    assert_eq!(store.get("p1").unwrap().display, mode);
    assert_eq!(store.get("p1").unwrap().display_override, DisplayOverride::Unset);
    assert!(!store.get("p2").unwrap().show_full_text());
    assert!(!store.get("p2").unwrap().show_transliteration());
}

#[test]
fn test_commitProcessed_withStaleGeneration_shouldBeDiscarded() {
    let store = ProcessedTextStore::new();

    let slow = store.begin_processing("p1");
    let fast = store.begin_processing("p1");

    assert!(store.commit_processed("p1", fast, processed("new")));
    assert!(!store.commit_processed("p1", slow, processed("old")));
    assert_eq!(store.get("p1").unwrap().full_original_text, "new");
}

#[test]
fn test_commitProcessed_shouldKeepUserDisplayChoice() {
    let store = ProcessedTextStore::new();
    store.set("p1", processed("old"));
    let chosen = store.toggle_full_text("p1").unwrap().display;

    let generation = store.begin_processing("p1");
    assert!(store.commit_processed("p1", generation, processed("new")));

    let current = store.get("p1").unwrap();
    assert_eq!(current.full_original_text, "new");
    assert_eq!(current.display, chosen);
    assert!(current.user_overrode_display_mode());
}

#[test]
fn test_set_duringProcessing_shouldWinOverInFlightResult() {
    let store = ProcessedTextStore::new();
    let generation = store.begin_processing("p1");

    store.set("p1", processed("edited"));

    assert!(!store.commit_processed("p1", generation, processed("stale")));
    assert_eq!(store.get("p1").unwrap().full_original_text, "edited");
}

#[test]
fn test_replaceIfUnchanged_shouldCompareCurrentValue() {
    let store = ProcessedTextStore::new();
    let first = processed("a");
    let second = processed("b");
    store.set("p1", first.clone());

    assert!(!store.replace_if_unchanged("p1", &second, processed("c")));
    assert!(store.replace_if_unchanged("p1", &first, second.clone()));
    assert_eq!(store.get("p1"), Some(second));
}

#[test]
fn test_removeAndClear_shouldEmptyStore() {
    let store = ProcessedTextStore::new();
    store.set("p1", processed("a"));
    store.set("p2", processed("b"));

    assert!(store.remove("p1").is_some());
    assert!(!store.has("p1"));
    assert_eq!(store.len(), 1);

    store.clear();
    assert!(store.is_empty());
}
