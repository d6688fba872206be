/*!
 * Tests for text segmentation, translation and transliteration
 */

use std::sync::Arc;

use pagetext::note::Page;
use pagetext::page_store::InMemoryPageStore;
use pagetext::providers::mock::MockTranslator;
use pagetext::translation::{split_sentences, TextSegmenter, TranslationCache};

use crate::common::{self, FlakyPageStore, NOTE_ID};

fn segmenter(translator: &MockTranslator) -> TextSegmenter {
    common::init_logging();
    TextSegmenter::new(
        Arc::new(translator.clone()),
        Arc::new(common::sample_reading_table()),
        TranslationCache::new(true),
        "en",
    )
}

#[test]
fn test_splitSentences_withChineseText_shouldYieldTwoSegments() {
    assert_eq!(split_sentences("你好。今天天气不错！"), vec!["你好。", "今天天气不错！"]);
}

#[test]
fn test_splitSentences_withWhitespaceOnlyFragments_shouldDropThem() {
    assert_eq!(split_sentences("  "), Vec::<String>::new());
    assert_eq!(split_sentences("好。 \n 谢谢"), vec!["好。 \n ", "谢谢"]);
}

#[tokio::test]
async fn test_process_withMixedScripts_shouldTransliterateOnlyCjkSegments() {
    let translator = MockTranslator::working();
    let page = Page::new("p2", 2, "谢谢。Thank you.");

    let processed = segmenter(&translator).process(&page, false).await.unwrap();
    let segments = processed.segments.as_ref().unwrap();

    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].original_text, "谢谢。");
    assert_eq!(segments[0].transliteration.as_deref(), Some("xiè xiè"));
    assert_eq!(segments[0].translated_text.as_deref(), Some("[en] 谢谢。"));
    assert_eq!(segments[1].original_text, "Thank you.");
    assert!(segments[1].transliteration.is_none());
    assert_eq!(
        processed.full_translated_text.as_deref(),
        Some("[en] 谢谢。\n[en] Thank you.")
    );
}

#[tokio::test]
async fn test_process_withUnchangedText_shouldBeByteIdenticalAndCached() {
    let translator = MockTranslator::working();
    let segmenter = segmenter(&translator);
    let page = Page::new("p1", 1, "你好。今天天气不错！");

    let first = segmenter.process(&page, true).await.unwrap();
    assert_eq!(translator.request_count(), 2);

    let second = segmenter.process(&page, true).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(translator.request_count(), 2);

    let (hits, misses, _) = segmenter.cache().stats();
    assert_eq!((hits, misses), (2, 2));
}

#[tokio::test]
async fn test_process_withFailingProvider_shouldFallBackWithoutCaching() {
    let translator = MockTranslator::failing();
    let segmenter = segmenter(&translator);
    let page = Page::new("p1", 1, "你好。");

    let processed = segmenter.process(&page, false).await.unwrap();
    let segment = &processed.segments.as_ref().unwrap()[0];

    assert_eq!(segment.translated_text.as_deref(), Some("你好。"));
    assert!(segmenter.cache().is_empty());

    segmenter.process(&page, false).await.unwrap();
    assert_eq!(translator.request_count(), 2);
}

#[tokio::test]
async fn test_process_withIntermittentProvider_shouldKeepSegmentOrder() {
    let translator = MockTranslator::intermittent(2);
    let page = Page::new("p1", 1, "一。二。三。四。");

    let processed = segmenter(&translator).process(&page, false).await.unwrap();
    let originals: Vec<&str> = processed
        .segments
        .as_ref()
        .unwrap()
        .iter()
        .map(|s| s.original_text.as_str())
        .collect();

    assert_eq!(originals, vec!["一。", "二。", "三。", "四。"]);
    assert_eq!(processed.segment_count(), 4);
}

#[tokio::test]
async fn test_process_withEmptyText_shouldDependOnImage() {
    let translator = MockTranslator::working();
    let segmenter = segmenter(&translator);
    let page = Page::new("p3", 3, "   ");

    assert!(segmenter.process(&page, false).await.is_none());

    let placeholder = segmenter.process(&page, true).await.unwrap();
    assert!(placeholder.segments.is_none());
    assert!(placeholder.full_translated_text.is_none());
    assert_eq!(translator.request_count(), 0);
}

#[tokio::test]
async fn test_process_withPageStore_shouldPersistOnlyChangedTexts() {
    let inner = InMemoryPageStore::new();
    inner.upsert_page(NOTE_ID, Page::new("p1", 1, "你好。"));
    let store = FlakyPageStore::new(inner);

    let translator = MockTranslator::working();
    let segmenter = segmenter(&translator).with_page_store(Arc::new(store.clone()));

    segmenter.process(&Page::new("p1", 1, "你好。"), false).await.unwrap();
    assert_eq!(store.update_calls(), 1);
    let stored = store.inner().page("p1").unwrap();
    assert_eq!(stored.translated_text, "[en] 你好。");

    segmenter.process(&stored, false).await.unwrap();
    assert_eq!(store.update_calls(), 1);
}

#[tokio::test]
async fn test_process_withFailingPageStore_shouldStillReturnText() {
    let store = FlakyPageStore::new(InMemoryPageStore::new());
    store.set_fail_updates(true);

    let translator = MockTranslator::working();
    let segmenter = segmenter(&translator).with_page_store(Arc::new(store.clone()));

    let processed = segmenter.process(&Page::new("p1", 1, "你好。"), false).await;
    assert!(processed.is_some());
    assert_eq!(store.update_calls(), 1);
}

#[tokio::test]
async fn test_translationCache_withDifferentTargets_shouldNotShareEntries() {
    let translator = MockTranslator::working();
    let cache = TranslationCache::new(true);
    let table = Arc::new(common::sample_reading_table());

    let english = TextSegmenter::new(Arc::new(translator.clone()), table.clone(), cache.clone(), "en");
    let german = TextSegmenter::new(Arc::new(translator.clone()), table, cache.clone(), "de");

    assert_eq!(english.translate_segment("你好").await, "[en] 你好");
    assert_eq!(german.translate_segment("你好").await, "[de] 你好");
    assert_eq!(english.translate_segment("你好").await, "[en] 你好");

    assert_eq!(translator.request_count(), 2);
    assert_eq!(cache.len(), 2);
}
