use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("document is encrypted: {0}")]
    Encrypted(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for PDF backends.
///
/// Implementors only open documents; everything about the dump layout
/// lives in [`crate::Extractor`] and [`crate::format`], so the rest of the
/// crate never sees the underlying PDF library.
pub trait PdfBackend: Send + Sync {
    /// Open the PDF at `path` and return an owned document handle.
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, BackendError>;
}

/// An opened PDF document.
///
/// Dropping the handle releases it. Callers keep the box on the stack for
/// the duration of one extraction so release happens on every exit path.
pub trait PdfDocument {
    /// Total number of pages.
    fn page_count(&self) -> Result<usize, BackendError>;

    /// Plain text of the page at `index` (0-based), exactly as the
    /// library produces it.
    fn page_text(&self, index: usize) -> Result<String, BackendError>;
}
