/*!
 * Translation of page text.
 *
 * - `cache`: deduplication of segment translations
 * - `segmenter`: sentence splitting, translation and transliteration
 * - `transliteration`: romanization of CJK text
 */

// Re-export main types for easier usage
pub use self::cache::TranslationCache;
pub use self::segmenter::{contains_cjk, extract_cjk, split_sentences, TextSegmenter};
pub use self::transliteration::{ReadingTable, Transliterator};

// Submodules
pub mod cache;
pub mod segmenter;
pub mod transliteration;
