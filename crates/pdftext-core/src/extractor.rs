use std::path::Path;

use crate::backend::PdfBackend;
use crate::format;
use crate::{ExtractError, ExtractionResult};

/// Dumps the text of a PDF, page by page, through a [`PdfBackend`].
pub struct Extractor<'a> {
    backend: &'a dyn PdfBackend,
}

impl<'a> Extractor<'a> {
    pub fn new(backend: &'a dyn PdfBackend) -> Self {
        Self { backend }
    }

    /// Render `source` and, if `destination` is given, persist the text there.
    ///
    /// Nothing is written unless the whole document rendered successfully.
    pub fn extract(
        &self,
        source: &Path,
        destination: Option<&Path>,
    ) -> Result<ExtractionResult, ExtractError> {
        let result = self.render(source)?;

        if let Some(dest) = destination {
            write_output(dest, result.text())?;
            tracing::info!(
                destination = %dest.display(),
                bytes = result.text().len(),
                "text extracted"
            );
        }

        Ok(result)
    }

    /// Build the dump for `source` without persisting it.
    pub fn render(&self, source: &Path) -> Result<ExtractionResult, ExtractError> {
        if !source.exists() {
            return Err(ExtractError::NotFound(source.to_path_buf()));
        }

        // The handle lives until the end of this function; `?` and unwinding
        // both drop it.
        let document = self.backend.open(source)?;
        let page_count = document.page_count()?;
        let source_name = format::source_display_name(source);
        tracing::debug!(source = %source.display(), page_count, "opened document");

        let mut segments = format::render_header(&source_name, page_count);
        for index in 0..page_count {
            let text = document.page_text(index)?;
            tracing::trace!(page = index + 1, chars = text.len(), "page text");
            segments.extend(format::render_page_block(index, &text));
        }
        drop(document);

        Ok(ExtractionResult::new(
            source_name,
            page_count,
            format::join_segments(&segments),
        ))
    }
}

/// Write `text` to `path` as UTF-8, truncating any existing file.
///
/// The path is opened as-is, so symlinks are followed, an existing file
/// keeps its permissions, and device files such as `/dev/stdout` work.
/// Callers render the whole dump before calling this, so a failed
/// extraction never opens the destination.
pub fn write_output(path: &Path, text: &str) -> Result<(), ExtractError> {
    std::fs::write(path, text).map_err(|source| ExtractError::Write {
        path: path.to_path_buf(),
        source,
    })
}
