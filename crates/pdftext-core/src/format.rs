//! Layout of the text dump: a metadata header followed by one banner-delimited
//! block per page.
//!
//! Every piece is produced as a list of segments which the caller joins with
//! `\n`. Segments may themselves carry a leading or trailing newline, which is
//! how the blank lines around each banner come out.

use std::path::Path;

/// First line of every dump.
pub const HEADER_MARKER: &str = "# PDF Text Extraction";

/// Number of `=` characters in a page banner delimiter.
pub const DELIMITER_WIDTH: usize = 60;

/// A full delimiter line (no newline).
pub fn delimiter() -> String {
    "=".repeat(DELIMITER_WIDTH)
}

/// Display name of the source: its final path component.
///
/// Paths without a final component (`..`, `/`) fall back to the whole path.
pub fn source_display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Metadata header segments: marker, source, page count, then an empty
/// segment so the header ends in a blank line.
pub fn render_header(source_name: &str, page_count: usize) -> Vec<String> {
    vec![
        HEADER_MARKER.to_string(),
        format!("# Source: {}", source_name),
        format!("# Pages: {}", page_count),
        String::new(),
    ]
}

/// Segments for one page. `index` is 0-based; the banner shows it 1-based.
/// The page text is passed through untouched.
pub fn render_page_block(index: usize, text: &str) -> Vec<String> {
    let line = delimiter();
    vec![
        format!("\n{}", line),
        format!("PAGE {}", index + 1),
        format!("{}\n", line),
        text.to_string(),
    ]
}

/// Join header and page segments into the final text.
pub fn join_segments(segments: &[String]) -> String {
    segments.join("\n")
}
