/*!
 * Repository layer for database operations.
 *
 * This module provides a high-level API over the note and page tables,
 * abstracting away the SQL details, and implements `PageStore` so a note
 * session can use the database as its remote page store.
 */

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

use super::connection::DatabaseConnection;
use crate::errors::StoreError;
use crate::note::Page;
use crate::page_store::PageStore;

const PAGE_COLUMNS: &str = "id, page_number, original_text, translated_text, image_ref";

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with the default database location
    pub fn new_default() -> Result<Self> {
        Ok(Self::new(DatabaseConnection::new_default()?))
    }

    /// Create a repository backed by the database file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(DatabaseConnection::new(path)?))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        Ok(Self::new(DatabaseConnection::new_in_memory()?))
    }

    /// Get the underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    fn now() -> String {
        chrono::Utc::now().to_rfc3339()
    }

    fn page_from_row(row: &Row) -> rusqlite::Result<Page> {
        Ok(Page {
            id: row.get(0)?,
            page_number: row.get(1)?,
            original_text: row.get(2)?,
            translated_text: row.get(3)?,
            image_ref: row.get(4)?,
        })
    }

    // =========================================================================
    // Note Operations
    // =========================================================================

    /// Create a note if it does not exist yet
    pub async fn create_note(&self, note_id: &str, title: &str) -> Result<()> {
        let note_id = note_id.to_string();
        let title = title.to_string();

        self.db
            .execute_async(move |conn| {
                Self::create_note_sync(conn, &note_id, &title)?;
                Ok(())
            })
            .await
    }

    fn create_note_sync(conn: &Connection, note_id: &str, title: &str) -> Result<()> {
        let now = Self::now();
        conn.execute(
            "INSERT OR IGNORE INTO notes (id, title, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
            params![note_id, title, now],
        )?;
        Ok(())
    }

    /// Check whether a note exists
    pub async fn note_exists(&self, note_id: &str) -> Result<bool> {
        let note_id = note_id.to_string();

        self.db
            .execute_async(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM notes WHERE id = ?1",
                    [&note_id],
                    |row| row.get(0),
                )?;
                Ok(count > 0)
            })
            .await
    }

    // =========================================================================
    // Page Operations
    // =========================================================================

    fn upsert_page_sync(conn: &Connection, note_id: &str, page: &Page) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO pages (id, note_id, page_number, original_text, translated_text, image_ref, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                note_id = excluded.note_id,
                page_number = excluded.page_number,
                original_text = excluded.original_text,
                translated_text = excluded.translated_text,
                image_ref = excluded.image_ref,
                updated_at = excluded.updated_at
            "#,
            params![
                page.id,
                note_id,
                page.page_number,
                page.original_text,
                page.translated_text,
                page.image_ref,
                Self::now(),
            ],
        )?;
        Ok(())
    }

    /// Insert or replace a page of an existing note
    pub async fn upsert_page(&self, note_id: &str, page: &Page) -> Result<()> {
        let note_id = note_id.to_string();
        let page = page.clone();

        self.db
            .execute_async(move |conn| Self::upsert_page_sync(conn, &note_id, &page))
            .await
    }

    /// Import pages into a note, creating the note if needed.
    /// Pages with malformed ids are skipped. Returns the number imported.
    pub async fn import_pages(&self, note_id: &str, title: &str, pages: Vec<Page>) -> Result<usize> {
        let note_id = note_id.to_string();
        let title = title.to_string();

        self.db
            .transaction_async(move |tx| {
                Self::create_note_sync(tx, &note_id, &title)?;

                let mut imported = 0;
                for page in pages.iter().filter(|p| p.has_valid_id()) {
                    Self::upsert_page_sync(tx, &note_id, page)?;
                    imported += 1;
                }

                debug!("Imported {} pages into note {}", imported, note_id);
                Ok(imported)
            })
            .await
    }

    /// Get a page by ID
    pub async fn get_page(&self, page_id: &str) -> Result<Option<Page>> {
        let page_id = page_id.to_string();

        self.db
            .execute_async(move |conn| Self::get_page_sync(conn, &page_id))
            .await
    }

    fn get_page_sync(conn: &Connection, page_id: &str) -> Result<Option<Page>> {
        let page = conn
            .query_row(
                &format!("SELECT {} FROM pages WHERE id = ?1", PAGE_COLUMNS),
                [page_id],
                Self::page_from_row,
            )
            .optional()?;
        Ok(page)
    }

    /// List the pages of a note in page order
    pub async fn list_pages(&self, note_id: &str) -> Result<Vec<Page>> {
        let note_id = note_id.to_string();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM pages WHERE note_id = ?1 ORDER BY page_number, id",
                    PAGE_COLUMNS
                ))?;
                let pages = stmt
                    .query_map([&note_id], Self::page_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(pages)
            })
            .await
    }
}

#[async_trait]
impl PageStore for Repository {
    async fn fetch_pages(&self, note_id: &str) -> Result<Vec<Page>, StoreError> {
        if !self.note_exists(note_id).await? {
            return Err(StoreError::NotFound(format!("note {}", note_id)));
        }
        Ok(self.list_pages(note_id).await?)
    }

    async fn update_page_content(
        &self,
        page_id: &str,
        original_text: &str,
        translated_text: &str,
    ) -> Result<Page, StoreError> {
        let page_id = page_id.to_string();
        let original_text = original_text.to_string();
        let translated_text = translated_text.to_string();

        let updated = self
            .db
            .execute_async(move |conn| {
                let changed = conn.execute(
                    "UPDATE pages SET original_text = ?1, translated_text = ?2, updated_at = ?3 WHERE id = ?4",
                    params![original_text, translated_text, Self::now(), page_id],
                )?;
                if changed == 0 {
                    return Ok(Err(page_id));
                }
                Ok(Self::get_page_sync(conn, &page_id)?.ok_or(page_id))
            })
            .await?;

        updated.map_err(StoreError::NotFound)
    }
}
