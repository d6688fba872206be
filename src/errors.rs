/*!
 * Error types for the pagetext library.
 *
 * This module contains custom error types for the different collaborators
 * of a note session, using the thiserror crate for ergonomic error definitions.
 * None of these errors is fatal to a session: callers degrade to the best
 * data currently cached.
 */

use thiserror::Error;

/// Errors that can occur when talking to a translation provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

/// Errors that can occur when resolving a page image to a local file
#[derive(Error, Debug)]
pub enum ImageError {
    /// The referenced image does not exist
    #[error("Image not found: {0}")]
    NotFound(String),

    /// Transient network failure while downloading
    #[error("Image download failed: {0}")]
    Network(String),

    /// Local file system failure
    #[error("Image cache I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reported by a remote page store
#[derive(Error, Debug)]
pub enum StoreError {
    /// The page or note does not exist in the store
    #[error("Page not found: {0}")]
    NotFound(String),

    /// The store could not read or write the record
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),
}

impl From<anyhow::Error> for StoreError {
    fn from(error: anyhow::Error) -> Self {
        Self::PersistenceFailure(error.to_string())
    }
}

/// Errors that can occur when editing the segments of a page
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EditError {
    /// No processed text is cached for the page
    #[error("Page {0} has not been processed")]
    NotProcessed(String),

    /// The processed text carries no segments
    #[error("Page {0} has no segments")]
    NoSegments(String),

    /// The segment index is outside the segment list
    #[error("Segment index {index} out of range (page has {len} segments)")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of segments on the page
        len: usize,
    },

    /// The page is in a display state where the edit is undefined
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The remote update failed; the cached value was rolled back
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a translation provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from image resolution
    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    /// Error from the page store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Error from segment editing
    #[error("Edit error: {0}")]
    Edit(#[from] EditError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
