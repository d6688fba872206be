/*!
 * Database module for persistent storage of notes and pages.
 *
 * This module provides SQLite-based persistence for:
 * - Notes and their ordered pages
 * - Recognized and translated page text
 * - Image references of each page
 */

pub mod schema;
pub mod connection;
pub mod repository;

// Re-export main types
pub use connection::{DatabaseConnection, DatabaseStats};
pub use repository::Repository;
