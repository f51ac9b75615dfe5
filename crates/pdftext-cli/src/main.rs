use std::ffi::OsString;
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

use pdftext_core::config_file::{self, ConfigError, ConfigFile};
use pdftext_core::{Extractor, PdfBackend};
use pdftext_mupdf::MupdfBackend;

mod output;

use output::ColorMode;

/// Dump the text of every page of a PDF, preceded by a short metadata header
#[derive(Parser, Debug)]
#[command(
    name = "pdftext",
    version,
    about,
    long_about = None,
    after_help = "Examples:\n  pdftext raw/GRM185R60J105KE26-01.pdf\n  pdftext raw/GRM185R60J105KE26-01.pdf output.txt"
)]
struct Cli {
    /// PDF file to read
    source: PathBuf,

    /// Text file to write (printed to standard output when omitted)
    destination: Option<PathBuf>,

    /// Extra positional arguments are accepted and ignored
    #[arg(hide = true)]
    ignored: Vec<OsString>,

    /// Path to a TOML config file (overrides .pdftext.toml and the platform config)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => return usage_error(e),
    };

    let stderr_tty = std::io::stderr().is_terminal();
    let (config, ignored_configs) = match resolve_config(&cli) {
        Ok(resolved) => resolved,
        Err(e) => {
            let color = ColorMode::detect(cli.no_color, None, stderr_tty);
            return ExitCode::from(report(&mut std::io::stderr(), &e, color));
        }
    };
    let color = ColorMode::detect(
        cli.no_color,
        config.display.as_ref().and_then(|d| d.color),
        stderr_tty,
    );

    init_tracing(
        cli.verbose,
        config.logging.as_ref().and_then(|l| l.level.as_deref()),
    );
    for e in &ignored_configs {
        tracing::warn!(error = %e, "ignoring config file");
    }
    if !cli.ignored.is_empty() {
        tracing::debug!(count = cli.ignored.len(), "ignoring extra arguments");
    }

    let backend = MupdfBackend::from_config(&config.extraction.clone().unwrap_or_default());
    tracing::debug!(flags = ?backend.text_flags(), "configured MuPDF backend");

    let status = execute(
        &cli,
        &backend,
        &mut std::io::stdout().lock(),
        &mut std::io::stderr(),
        color,
    );
    ExitCode::from(status)
}

/// Run one extraction and report any failure on `stderr`. Returns the
/// process exit status.
fn execute(
    cli: &Cli,
    backend: &dyn PdfBackend,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
    color: ColorMode,
) -> u8 {
    match run(cli, backend, stdout, stderr, color) {
        Ok(()) => 0,
        Err(e) => report(stderr, &e, color),
    }
}

fn run(
    cli: &Cli,
    backend: &dyn PdfBackend,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
    color: ColorMode,
) -> anyhow::Result<()> {
    tracing::debug!(source = %cli.source.display(), "starting extraction");
    let result = Extractor::new(backend).extract(&cli.source, cli.destination.as_deref())?;

    match &cli.destination {
        Some(dest) => output::print_written(stderr, dest, color)?,
        None => {
            writeln!(stdout, "{}", result.text())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Resolve configuration: explicit `--config` > CWD `.pdftext.toml` > platform config.
///
/// Discovered files that fail to parse are returned for logging; an explicit
/// `--config` that fails is an error.
fn resolve_config(cli: &Cli) -> anyhow::Result<(ConfigFile, Vec<ConfigError>)> {
    let (discovered, ignored) = config_file::load_config();
    let config = match &cli.config {
        Some(path) => config_file::merge(discovered, config_file::load_required(path)?),
        None => discovered,
    };
    Ok((config, ignored))
}

/// Filter used when neither `PDFTEXT_LOG` nor `RUST_LOG` is set. An invalid
/// configured level falls back to `warn` and is handed back for reporting.
fn fallback_filter(verbose: u8, configured: Option<&str>) -> (EnvFilter, Option<ParseError>) {
    let directive = match verbose {
        0 => configured.unwrap_or("warn"),
        1 => "debug",
        _ => "trace",
    };
    match EnvFilter::try_new(directive) {
        Ok(filter) => (filter, None),
        Err(e) => (EnvFilter::new("warn"), Some(e)),
    }
}

/// Logs go to stderr; stdout is reserved for the dump.
/// `PDFTEXT_LOG`, then `RUST_LOG`, override the verbosity flags and config.
fn init_tracing(verbose: u8, configured: Option<&str>) {
    let (fallback, invalid) = fallback_filter(verbose, configured);
    let filter = EnvFilter::try_from_env("PDFTEXT_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or(fallback);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Some(e) = invalid {
        tracing::warn!(
            level = configured.unwrap_or_default(),
            error = %e,
            "invalid log level in config, using warn"
        );
    }
}

fn usage_error(e: clap::Error) -> ExitCode {
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
        ErrorKind::MissingRequiredArgument => {}
        _ => {
            let _ = e.print();
        }
    }
    let _ = output::print_usage(
        &mut std::io::stdout(),
        Cli::command().render_long_help(),
    );
    ExitCode::FAILURE
}

fn report(w: &mut dyn Write, e: &anyhow::Error, color: ColorMode) -> u8 {
    let _ = output::print_error(w, e, color);
    1
}
