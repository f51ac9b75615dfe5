use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod backend;
pub mod config_file;
pub mod extractor;
pub mod format;
pub mod mock;

// Re-export for convenience
pub use backend::{BackendError, PdfBackend, PdfDocument};
pub use config_file::{ConfigFile, ExtractionConfig};
pub use extractor::{Extractor, write_output};

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("PDF file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Coarse failure class, used by callers that only care whether the source
/// was missing or something went wrong while processing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Processing,
}

impl ExtractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractError::NotFound(_) => ErrorKind::NotFound,
            ExtractError::Backend(_) | ExtractError::Write { .. } => ErrorKind::Processing,
        }
    }
}

/// The finished text dump of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    source_name: String,
    page_count: usize,
    text: String,
}

impl ExtractionResult {
    pub(crate) fn new(source_name: String, page_count: usize, text: String) -> Self {
        Self {
            source_name,
            page_count,
            text,
        }
    }

    /// Final path component of the source, as shown in the header.
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// Dump the text of `source` using `backend`, writing it to `destination`
/// when one is given.
pub fn extract(
    source: &Path,
    destination: Option<&Path>,
    backend: &dyn PdfBackend,
) -> Result<ExtractionResult, ExtractError> {
    Extractor::new(backend).extract(source, destination)
}
