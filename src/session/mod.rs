/*!
 * Note session module.
 *
 * This module provides:
 * - One explicitly constructed set of components per open note
 * - Page sync, navigation and display changes
 * - Segment deletion with page refresh
 */

pub mod manager;
pub mod models;

// Re-export main types
pub use manager::NoteSession;
pub use models::{PageView, SessionOptions, SessionServices};
