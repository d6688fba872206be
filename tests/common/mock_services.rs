/*!
 * Mock collaborators for testing
 *
 * Image resolution and page storage without network or disk access. Each
 * mock records the calls it receives so tests can assert on call counts.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use pagetext::errors::{ImageError, StoreError};
use pagetext::images::ImageResolver;
use pagetext::note::Page;
use pagetext::page_store::{InMemoryPageStore, PageStore};

/// Image resolver answering from memory
#[derive(Clone, Default)]
pub struct MockImageResolver {
    /// References that fail with `Network`
    failing: Arc<Mutex<HashSet<String>>>,
    /// Resolve calls per reference
    calls: Arc<Mutex<HashMap<String, usize>>>,
    /// Order in which references were resolved
    order: Arc<Mutex<Vec<String>>>,
    /// Artificial latency per call
    delay_ms: u64,
}

impl MockImageResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver that sleeps before answering
    pub fn with_delay(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            ..Self::default()
        }
    }

    /// Make resolution of `image_ref` fail
    pub fn fail(&self, image_ref: &str) {
        self.failing.lock().insert(image_ref.to_string());
    }

    /// Let `image_ref` resolve again
    pub fn recover(&self, image_ref: &str) {
        self.failing.lock().remove(image_ref);
    }

    pub fn calls_for(&self, image_ref: &str) -> usize {
        self.calls.lock().get(image_ref).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }

    pub fn resolve_order(&self) -> Vec<String> {
        self.order.lock().clone()
    }
}

#[async_trait]
impl ImageResolver for MockImageResolver {
    async fn resolve(&self, image_ref: &str) -> Result<PathBuf, ImageError> {
        *self.calls.lock().entry(image_ref.to_string()).or_default() += 1;
        self.order.lock().push(image_ref.to_string());

        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }

        if self.failing.lock().contains(image_ref) {
            return Err(ImageError::Network(format!("simulated failure for {}", image_ref)));
        }
        Ok(PathBuf::from("/cache").join(image_ref))
    }
}

/// Page store whose operations can be made to fail on demand
#[derive(Clone, Default)]
pub struct FlakyPageStore {
    inner: InMemoryPageStore,
    fail_fetch: Arc<AtomicBool>,
    fail_updates: Arc<AtomicBool>,
    update_calls: Arc<AtomicUsize>,
}

impl FlakyPageStore {
    pub fn new(inner: InMemoryPageStore) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    pub fn inner(&self) -> &InMemoryPageStore {
        &self.inner
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageStore for FlakyPageStore {
    async fn fetch_pages(&self, note_id: &str) -> Result<Vec<Page>, StoreError> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(StoreError::PersistenceFailure("simulated fetch failure".to_string()));
        }
        self.inner.fetch_pages(note_id).await
    }

    async fn update_page_content(
        &self,
        page_id: &str,
        original_text: &str,
        translated_text: &str,
    ) -> Result<Page, StoreError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(StoreError::PersistenceFailure("simulated update failure".to_string()));
        }
        self.inner.update_page_content(page_id, original_text, translated_text).await
    }
}
