use std::path::Path;

use mupdf::{Document, TextPageFlags};

use pdftext_core::{BackendError, ExtractionConfig, PdfBackend, PdfDocument};

/// MuPDF-based implementation of [`PdfBackend`].
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency
/// (which is AGPL-3.0) so that the core crate does not transitively
/// depend on it.
///
/// The defaults mirror PyMuPDF's `get_text()`: ligatures and whitespace
/// are preserved, text outside the mediabox is clipped, and hyphenated
/// line breaks are left alone.
#[derive(Debug, Clone, Copy)]
pub struct MupdfBackend {
    preserve_ligatures: bool,
    preserve_whitespace: bool,
    dehyphenate: bool,
    clip_to_mediabox: bool,
}

impl Default for MupdfBackend {
    fn default() -> Self {
        Self {
            preserve_ligatures: true,
            preserve_whitespace: true,
            dehyphenate: false,
            clip_to_mediabox: true,
        }
    }
}

impl MupdfBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a backend from the `[extraction]` config section. Unset
    /// fields keep their defaults.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        let defaults = Self::default();
        Self {
            preserve_ligatures: config
                .preserve_ligatures
                .unwrap_or(defaults.preserve_ligatures),
            preserve_whitespace: config
                .preserve_whitespace
                .unwrap_or(defaults.preserve_whitespace),
            dehyphenate: config.dehyphenate.unwrap_or(defaults.dehyphenate),
            clip_to_mediabox: config
                .clip_to_mediabox
                .unwrap_or(defaults.clip_to_mediabox),
        }
    }

    /// Keep ligature glyphs (ﬁ, ﬂ) instead of expanding them.
    pub fn with_preserve_ligatures(mut self, on: bool) -> Self {
        self.preserve_ligatures = on;
        self
    }

    /// Keep whitespace as-is instead of collapsing it to single spaces.
    pub fn with_preserve_whitespace(mut self, on: bool) -> Self {
        self.preserve_whitespace = on;
        self
    }

    /// Join words hyphenated across line breaks.
    pub fn with_dehyphenate(mut self, on: bool) -> Self {
        self.dehyphenate = on;
        self
    }

    /// Drop characters that fall outside the page's mediabox.
    pub fn with_clip_to_mediabox(mut self, on: bool) -> Self {
        self.clip_to_mediabox = on;
        self
    }

    /// MuPDF text-page flags for the current settings.
    pub fn text_flags(&self) -> TextPageFlags {
        let mut flags = TextPageFlags::empty();
        if self.preserve_ligatures {
            flags.insert(TextPageFlags::PRESERVE_LIGATURES);
        }
        if self.preserve_whitespace {
            flags.insert(TextPageFlags::PRESERVE_WHITESPACE);
        }
        if self.dehyphenate {
            flags.insert(TextPageFlags::DEHYPHENATE);
        }
        if self.clip_to_mediabox {
            flags.insert(TextPageFlags::CLIP);
        }
        flags
    }
}

impl PdfBackend for MupdfBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;

        let document =
            Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))?;

        if document
            .needs_password()
            .map_err(|e| BackendError::OpenError(e.to_string()))?
        {
            return Err(BackendError::Encrypted(format!(
                "{} requires a password",
                path.display()
            )));
        }

        Ok(Box::new(MupdfDocument {
            document,
            settings: *self,
        }))
    }
}

/// An opened MuPDF document. The underlying handle is released when this
/// is dropped.
struct MupdfDocument {
    document: Document,
    settings: MupdfBackend,
}

impl PdfDocument for MupdfDocument {
    fn page_count(&self) -> Result<usize, BackendError> {
        let count = self
            .document
            .page_count()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;
        usize::try_from(count)
            .map_err(|_| BackendError::ExtractionError(format!("invalid page count {}", count)))
    }

    fn page_text(&self, index: usize) -> Result<String, BackendError> {
        let page_no = i32::try_from(index).map_err(|_| {
            BackendError::ExtractionError(format!("page index {} out of range", index))
        })?;
        let page = self
            .document
            .load_page(page_no)
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;
        tracing::trace!(page = index + 1, "loaded page");
        let text_page = page
            .to_text_page(self.settings.text_flags())
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

        // Use block/line iteration to match PyMuPDF's get_text() behavior
        let mut page_text = String::new();
        for block in text_page.blocks() {
            for line in block.lines() {
                let line_text: String = line
                    .chars()
                    .map(|c| c.char().unwrap_or('\u{FFFD}'))
                    .collect();
                page_text.push_str(&line_text);
                page_text.push('\n');
            }
        }
        Ok(page_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_flags_match_pymupdf() {
        let flags = MupdfBackend::new().text_flags();
        assert!(flags.contains(TextPageFlags::PRESERVE_LIGATURES));
        assert!(flags.contains(TextPageFlags::PRESERVE_WHITESPACE));
        assert!(flags.contains(TextPageFlags::CLIP));
        assert!(!flags.contains(TextPageFlags::DEHYPHENATE));
    }

    #[test]
    fn config_overrides_only_set_fields() {
        let config = ExtractionConfig {
            preserve_ligatures: Some(false),
            dehyphenate: Some(true),
            ..Default::default()
        };
        let flags = MupdfBackend::from_config(&config).text_flags();
        assert!(!flags.contains(TextPageFlags::PRESERVE_LIGATURES));
        assert!(flags.contains(TextPageFlags::PRESERVE_WHITESPACE));
        assert!(flags.contains(TextPageFlags::DEHYPHENATE));
    }

    /// Hand-assembled PDF with one page per entry of `pages`. Each page is a
    /// list of Helvetica `(x, y, text)` runs on a 612x792 mediabox.
    fn minimal_pdf(pages: &[&[(i32, i32, &str)]]) -> Vec<u8> {
        let mut objects = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            String::new(),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        ];
        let kids: Vec<String> = (0..pages.len())
            .map(|i| format!("{} 0 R", 4 + 2 * i))
            .collect();
        objects[1] = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        );
        for (i, runs) in pages.iter().enumerate() {
            let content: String = runs
                .iter()
                .map(|(x, y, text)| format!("BT /F1 12 Tf {} {} Td ({}) Tj ET\n", x, y, text))
                .collect();
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                5 + 2 * i
            ));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{}endstream",
                content.len(),
                content
            ));
        }

        let mut out = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }
        let xref_at = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
        for offset in offsets {
            out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref_at
            )
            .as_bytes(),
        );
        out
    }

    fn write_pdf(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn reads_pages_of_real_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_pdf(
            &dir,
            "two.pdf",
            &minimal_pdf(&[
                &[(72, 720, "Hello page one")],
                &[(72, 720, "Second page"), (72, 600, "Lower line")],
            ]),
        );

        let doc = MupdfBackend::new().open(&path).unwrap();
        assert_eq!(doc.page_count().unwrap(), 2);

        let first = doc.page_text(0).unwrap();
        assert!(first.contains("Hello page one"));
        assert!(first.ends_with('\n'));

        let second = doc.page_text(1).unwrap();
        assert!(second.contains("Second page"));
        assert!(second.contains("Lower line"));
        assert!(!second.contains("Hello page one"));
        for line in second.split_inclusive('\n') {
            assert!(line.ends_with('\n'));
        }
    }

    #[test]
    fn out_of_range_page_is_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_pdf(&dir, "one.pdf", &minimal_pdf(&[&[(72, 720, "Only")]]));

        let doc = MupdfBackend::new().open(&path).unwrap();
        assert!(matches!(
            doc.page_text(5),
            Err(BackendError::ExtractionError(_))
        ));
    }

    #[test]
    fn text_outside_mediabox_is_clipped_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_pdf(
            &dir,
            "offpage.pdf",
            &minimal_pdf(&[&[(72, 720, "Inside"), (900, 720, "Outside")]]),
        );

        let clipped = MupdfBackend::new().open(&path).unwrap().page_text(0).unwrap();
        assert!(clipped.contains("Inside"));
        assert!(!clipped.contains("Outside"));

        let unclipped = MupdfBackend::new()
            .with_clip_to_mediabox(false)
            .open(&path)
            .unwrap()
            .page_text(0)
            .unwrap();
        assert!(unclipped.contains("Outside"));
    }

    #[test]
    fn full_dump_of_real_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_pdf(
            &dir,
            "sheet.pdf",
            &minimal_pdf(&[&[(72, 720, "Alpha")], &[(72, 720, "Beta")]]),
        );

        let backend = MupdfBackend::new();
        let result = pdftext_core::Extractor::new(&backend).render(&path).unwrap();

        assert_eq!(result.page_count(), 2);
        assert!(
            result
                .text()
                .starts_with("# PDF Text Extraction\n# Source: sheet.pdf\n# Pages: 2\n")
        );
        let alpha = result.text().find("Alpha").unwrap();
        let page2 = result.text().find("PAGE 2").unwrap();
        let beta = result.text().find("Beta").unwrap();
        assert!(alpha < page2 && page2 < beta);
    }

    #[test]
    fn garbage_file_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_a.pdf");
        std::fs::write(&path, b"this is plain text, not a PDF").unwrap();

        let result = MupdfBackend::new().open(&path);
        assert!(result.is_err());
    }
}
