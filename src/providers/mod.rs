/*!
 * Translation provider implementations.
 *
 * This module contains the translator seam used by the text segmenter and
 * its client implementations:
 * - Ollama: local LLM server
 * - Mock: deterministic translator for tests and offline runs
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all translation providers
///
/// Implementations translate one segment of text at a time. Failures are
/// reported as `ProviderError`; the caller decides how to degrade.
#[async_trait]
pub trait Translator: Send + Sync + Debug {
    /// Translate `text` into `target_language`
    ///
    /// # Arguments
    /// * `text` - The text to translate
    /// * `target_language` - ISO 639 code of the target language
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The translated text or an error
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ProviderError>;

    /// Short provider name for logs
    fn name(&self) -> &str;
}

pub mod mock;
pub mod ollama;
