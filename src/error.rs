//! Library error types

use thiserror::Error;

/// Errors produced while reading, rendering, or exporting content
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Page {page} is out of range (total pages: {total_pages})")]
    PageOutOfRange { page: usize, total_pages: usize },

    #[error("Invalid slug: {0}")]
    InvalidSlug(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error means "nothing here" rather than a real failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::PageOutOfRange { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
