/*!
 * Note session backed by the SQLite page store
 */

use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

use pagetext::database::Repository;
use pagetext::errors::StoreError;
use pagetext::note::Page;
use pagetext::providers::mock::MockTranslator;

use crate::common::{self, MockImageResolver, NOTE_ID};

async fn imported_repository() -> Repository {
    let repo = Repository::new_in_memory().expect("Failed to create repository");
    repo.import_pages(NOTE_ID, "Lesson 1", common::sample_pages())
        .await
        .expect("Failed to import pages");
    repo
}

#[tokio::test]
async fn test_session_overRepository_shouldPersistProcessedTranslation() {
    let repo = imported_repository().await;
    let session = common::build_session(Arc::new(repo.clone()), MockTranslator::working(), MockImageResolver::new());
    session.sync_pages().await.unwrap();

    session.open_page(1).await.unwrap();

    let stored = repo.get_page("p2").await.unwrap().unwrap();
    assert_eq!(stored.translated_text, "[en] 谢谢。\n[en] Thank you.");
    assert_eq!(repo.connection().stats().unwrap().translated_pages, 1);
}

#[tokio::test]
async fn test_deleteSegment_overRepository_shouldWriteRebuiltText() {
    let repo = imported_repository().await;
    let session = common::build_session(Arc::new(repo.clone()), MockTranslator::working(), MockImageResolver::new());
    session.sync_pages().await.unwrap();
    session.open_page(1).await.unwrap();

    let page = session.delete_segment("p2", 1).await.unwrap();

    assert_eq!(page.original_text, "谢谢。");
    assert_eq!(page.translated_text, "[en] 谢谢。");
    assert_eq!(repo.get_page("p2").await.unwrap().unwrap(), page);
}

#[tokio::test]
async fn test_session_forUnknownNote_shouldReportNotFound() {
    let repo = Repository::new_in_memory().unwrap();
    let session = common::build_session(Arc::new(repo), MockTranslator::working(), MockImageResolver::new());

    let error = assert_err!(session.sync_pages().await);

    assert!(matches!(error, StoreError::NotFound(_)));
    assert_eq!(session.page_count(), 0);
}

#[tokio::test]
async fn test_repository_fileBacked_shouldReopenWithPages() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("pages.db");

    {
        let repo = Repository::open(&path).unwrap();
        repo.import_pages(NOTE_ID, "", vec![Page::new("p1", 1, "你好。")]).await.unwrap();
    }

    let reopened = Repository::open(&path).unwrap();
    let session = common::build_session(Arc::new(reopened), MockTranslator::working(), MockImageResolver::new());
    let count = assert_ok!(session.sync_pages().await);
    assert_eq!(count, 1);
}
