use std::fmt::Display;
use std::io::Write;
use std::path::Path;

use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }

    /// Color is on unless disabled by flag or config, and only when the
    /// stream it decorates is a terminal.
    pub fn detect(no_color: bool, configured: Option<bool>, is_terminal: bool) -> Self {
        ColorMode(!no_color && configured.unwrap_or(true) && is_terminal)
    }
}

/// Print usage text after a malformed invocation.
pub fn print_usage(w: &mut dyn Write, usage: impl Display) -> std::io::Result<()> {
    writeln!(w, "{}", usage)?;
    w.flush()
}

/// Print a single `Error: <message>` line.
pub fn print_error(
    w: &mut dyn Write,
    message: impl Display,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} {}", "Error:".red().bold(), message)?;
    } else {
        writeln!(w, "Error: {}", message)?;
    }
    w.flush()
}

/// Confirm that the dump landed in `destination`.
pub fn print_written(
    w: &mut dyn Write,
    destination: &Path,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(
            w,
            "Text extracted to: {}",
            destination.display().to_string().green()
        )?;
    } else {
        writeln!(w, "Text extracted to: {}", destination.display())?;
    }
    Ok(())
}
