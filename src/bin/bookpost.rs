//! CLI binary for bookpost.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `UploadConfig` and prints results.

use anyhow::{Context, Result};
use bookpost::{report, save_converted, save_zip, submit, UploadConfig, UploadProgressCallback};
use clap::Parser;
use indicatif::{HumanBytes, ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner while the upload (and the
/// server-side conversion inside it) runs, then one log line per
/// downloaded file. Download lines may interleave out of order when
/// downloads run concurrently.
struct CliProgressCallback {
    /// The single spinner anchored at the bottom of the terminal.
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new_spinner() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("reading files…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    /// Clear the spinner so error output does not land mid-line.
    fn clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl UploadProgressCallback for CliProgressCallback {
    fn on_submit_start(&self, file_count: usize, total_bytes: u64) {
        self.bar.set_prefix("Uploading");
        self.bar.set_message(format!(
            "{file_count} file(s) ({}) — the server converts before answering",
            HumanBytes(total_bytes)
        ));
    }

    fn on_response(&self, converted: usize, rejected: usize) {
        self.bar.finish_and_clear();
        if rejected == 0 {
            eprintln!(
                "{} {}",
                cyan("◆"),
                bold(&format!("server converted {converted} file(s)"))
            );
        } else {
            eprintln!(
                "{} {}",
                cyan("◆"),
                bold(&format!(
                    "server converted {converted} file(s), {} failed",
                    red(&rejected.to_string())
                ))
            );
        }
    }

    fn on_download_complete(&self, file_name: &str, bytes: u64) {
        eprintln!(
            "  {} {}  {}",
            green("✓"),
            file_name,
            dim(&HumanBytes(bytes).to_string())
        );
    }

    fn on_download_error(&self, file_name: &str, error: &str) {
        // Truncate very long error messages to keep output tidy.
        let msg = if error.chars().count() > 80 {
            let head: String = error.chars().take(79).collect();
            format!("{head}\u{2026}")
        } else {
            error.to_string()
        };
        eprintln!("  {} {}  {}", red("✗"), file_name, red(&msg));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert one book (report on stdout)
  bookpost --from epub --to mobi war_and_peace.epub

  # Convert a batch and save the results locally
  bookpost --from epub --to mobi -o converted/ *.epub

  # Grab the zip bundle instead of individual files
  bookpost --from epub --to mobi -o converted/ --zip *.epub

  # Remote service, longer conversion window
  bookpost -e http://books.internal:5001 --timeout 900 --from pdf --to epub manual.pdf

  # Structured JSON outcome for scripting
  bookpost --json --from epub --to pdf notes.epub > outcome.json

SUPPORTED FORMATS:
  Format  Source  Target
  ──────  ──────  ──────
  epub    ✓       ✓
  mobi    ✓       ✓
  pdf     ✓       ✓

  Any source converts to any target, including same-to-same
  (useful for normalising a library).

ENVIRONMENT VARIABLES:
  BOOKPOST_ENDPOINT          Conversion service base URL
  BOOKPOST_FROM              Default source format
  BOOKPOST_TO                Default target format
  BOOKPOST_OUTPUT            Directory for downloaded results
  BOOKPOST_TIMEOUT           Upload timeout in seconds (default 300)
  BOOKPOST_DOWNLOAD_TIMEOUT  Per-file download timeout in seconds (default 120)
  BOOKPOST_CONCURRENCY       Concurrent result downloads (default 4)

SETUP:
  1. Start the conversion service (development default: 127.0.0.1:5001).
  2. Convert:  bookpost --from epub --to mobi book.epub

  The upload timeout covers the server-side conversion too — the service
  converts inside the request. Raise --timeout for big batches.
"#;

/// Upload e-books to a conversion service and collect the results.
#[derive(Parser, Debug)]
#[command(
    name = "bookpost",
    version,
    about = "Upload e-books to a conversion service and collect the results",
    long_about = "Upload one or more e-books to a conversion web service in a single multipart \
request, wait for the synchronous conversion, and print the results the way the service's own \
web page shows them: per-file errors, converted files with download links, and the zip bundle \
link. Optionally download everything into a local directory.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Files to convert; every one must match --from.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Source format of the selected files.
    #[arg(long, value_enum, env = "BOOKPOST_FROM")]
    from: FormatArg,

    /// Target format to convert to.
    #[arg(long, value_enum, env = "BOOKPOST_TO")]
    to: FormatArg,

    /// Conversion service base URL.
    #[arg(short, long, env = "BOOKPOST_ENDPOINT", default_value = bookpost::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Download converted files into this directory.
    #[arg(short, long, env = "BOOKPOST_OUTPUT")]
    output: Option<PathBuf>,

    /// Download the zip bundle instead of individual files.
    #[arg(long, env = "BOOKPOST_ZIP", requires = "output")]
    zip: bool,

    /// Print the structured JSON outcome instead of the text report.
    #[arg(long, env = "BOOKPOST_JSON")]
    json: bool,

    /// Upload timeout in seconds (covers the server-side conversion).
    #[arg(long, env = "BOOKPOST_TIMEOUT", default_value_t = 300)]
    timeout: u64,

    /// Per-file download timeout in seconds.
    #[arg(long, env = "BOOKPOST_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Number of concurrent result downloads.
    #[arg(short, long, env = "BOOKPOST_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Disable the progress spinner.
    #[arg(long, env = "BOOKPOST_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "BOOKPOST_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "BOOKPOST_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Epub,
    Mobi,
    Pdf,
}

impl FormatArg {
    fn as_str(self) -> &'static str {
        match self {
            FormatArg::Epub => "epub",
            FormatArg::Mobi => "mobi",
            FormatArg::Pdf => "pdf",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the spinner is active; the
    // spinner and per-file lines provide the feedback that matters.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };
    // In verbose mode we always want all logs regardless of progress.
    let filter = if cli.verbose { "debug" } else { filter };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress = show_progress.then(CliProgressCallback::new_spinner);

    let mut builder = UploadConfig::builder()
        .endpoint(cli.endpoint.as_str())
        .upload_timeout_secs(cli.timeout)
        .download_timeout_secs(cli.download_timeout)
        .download_concurrency(cli.concurrency);
    if let Some(cb) = &progress {
        builder = builder.progress_callback(cb.clone() as Arc<dyn UploadProgressCallback>);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Submit ───────────────────────────────────────────────────────────
    let outcome = match submit(&cli.files, cli.from.as_str(), cli.to.as_str(), &config).await {
        Ok(outcome) => outcome,
        Err(e) => {
            if let Some(cb) = &progress {
                cb.clear();
            }
            // The same status line the service's web page would show.
            eprintln!("{}", red(&report::status_line(&e)));
            std::process::exit(1);
        }
    };

    // ── Print results ────────────────────────────────────────────────────
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome).context("Failed to serialise outcome")?
        );
    } else {
        if !cli.quiet {
            eprintln!("{} {}", green("✔"), bold(report::COMPLETE_MESSAGE));
        }
        // Report on stdout, status on stderr, so the report pipes cleanly.
        println!("{}", report::render_report(&outcome, &config.endpoint));
        if !cli.quiet && !show_progress {
            eprintln!(
                "Converted {}/{} file(s) in {}ms",
                outcome.stats.files_converted,
                outcome.stats.files_submitted,
                outcome.stats.total_duration_ms
            );
        }
    }

    // ── Download results ─────────────────────────────────────────────────
    if let Some(dir) = &cli.output {
        if cli.zip {
            match save_zip(&outcome, dir, &config)
                .await
                .context("Zip download failed")?
            {
                Some(path) => {
                    if !cli.quiet {
                        eprintln!(
                            "{} zip bundle saved to {}",
                            green("✔"),
                            bold(&path.display().to_string())
                        );
                    }
                }
                None => {
                    if !cli.quiet {
                        eprintln!(
                            "{} {}",
                            cyan("⚠"),
                            "no zip bundle offered (single-file conversions are not bundled)"
                        );
                    }
                }
            }
        } else {
            let saved = save_converted(&outcome, dir, &config)
                .await
                .context("Download failed")?;
            if !cli.quiet && !saved.is_empty() {
                eprintln!(
                    "{} {} file(s) saved to {}",
                    green("✔"),
                    saved.len(),
                    bold(&dir.display().to_string())
                );
            }
        }
    }

    Ok(())
}
