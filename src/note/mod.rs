/*!
 * Note pages and their ordering.
 *
 * - `model`: pages, segments, processed text and image slots
 * - `book`: ordered page collection keyed by id
 * - `merger`: reconciliation of local and fetched pages
 */

pub mod book;
pub mod merger;
pub mod model;

pub use self::book::{PageBook, PageEntry, SharedPageBook};
pub use self::merger::{merge_pages, PageMerger};
pub use self::model::{DisplayMode, DisplayOverride, ImageSlot, Page, ProcessedText, TextSegment};
