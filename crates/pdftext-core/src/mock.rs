//! In-memory backend for testing.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::backend::{BackendError, PdfBackend, PdfDocument};

/// How a [`MockBackend`] should misbehave, if at all.
#[derive(Clone, Debug, Default)]
pub enum MockFailure {
    #[default]
    None,
    /// `open` fails with the given message.
    Open(String),
    /// `open` reports an encrypted document.
    Encrypted,
    /// Reading the page at this 0-based index fails.
    Page(usize),
}

/// A hand-rolled backend that serves fixed page texts regardless of the
/// file contents.
///
/// Counts how many documents were opened and how many were released, so
/// tests can check that every handle gets dropped.
pub struct MockBackend {
    pages: Vec<String>,
    failure: MockFailure,
    opened: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
}

impl MockBackend {
    pub fn with_pages(pages: Vec<String>) -> Self {
        Self {
            pages,
            failure: MockFailure::None,
            opened: Arc::new(AtomicUsize::new(0)),
            released: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_failure(mut self, failure: MockFailure) -> Self {
        self.failure = failure;
        self
    }

    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn release_count(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

impl PdfBackend for MockBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, BackendError> {
        match &self.failure {
            MockFailure::Open(msg) => return Err(BackendError::OpenError(msg.clone())),
            MockFailure::Encrypted => {
                return Err(BackendError::Encrypted(path.display().to_string()));
            }
            _ => {}
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockDocument {
            pages: self.pages.clone(),
            failing_page: match self.failure {
                MockFailure::Page(i) => Some(i),
                _ => None,
            },
            released: Arc::clone(&self.released),
        }))
    }
}

struct MockDocument {
    pages: Vec<String>,
    failing_page: Option<usize>,
    released: Arc<AtomicUsize>,
}

impl PdfDocument for MockDocument {
    fn page_count(&self) -> Result<usize, BackendError> {
        Ok(self.pages.len())
    }

    fn page_text(&self, index: usize) -> Result<String, BackendError> {
        if self.failing_page == Some(index) {
            return Err(BackendError::ExtractionError(format!(
                "page {} is damaged",
                index + 1
            )));
        }
        self.pages
            .get(index)
            .cloned()
            .ok_or_else(|| BackendError::ExtractionError(format!("no page {}", index)))
    }
}

impl Drop for MockDocument {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}
