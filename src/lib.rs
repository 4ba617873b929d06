//! # bookpost
//!
//! Upload e-books to a conversion web service and collect the results.
//!
//! ## Why this crate?
//!
//! The conversion service speaks the protocol of its own web page: one
//! multipart POST with the files, the source format, and the target
//! format, answered with JSON listing converted files, per-file errors,
//! and download links. Driving that from scripts or desktop tools means
//! re-implementing the page's validation, its exact status messages, and
//! its result layout by hand. This crate packages that whole flow — the
//! same checks, the same wording, the same wire format — behind a typed
//! API, plus a CLI that behaves like the page with a terminal instead of
//! a DOM.
//!
//! ## Pipeline Overview
//!
//! ```text
//! paths
//!  │
//!  ├─ 1. Input     resolve paths to named, sized files
//!  ├─ 2. Validate  every extension must match the source format
//!  ├─ 3. Upload    one multipart POST to <endpoint>/upload
//!  ├─ 4. Report    errors, converted files, zip bundle link
//!  └─ 5. Download  (optional) fetch converted files to a directory
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bookpost::{submit, UploadConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = UploadConfig::default(); // http://127.0.0.1:5001
//!     let outcome = submit(&["war_and_peace.epub"], "epub", "mobi", &config).await?;
//!     println!("{}", bookpost::report::render_report(&outcome, &config.endpoint));
//!     eprintln!(
//!         "{}/{} converted in {}ms",
//!         outcome.stats.files_converted,
//!         outcome.stats.files_submitted,
//!         outcome.stats.total_duration_ms
//!     );
//!     Ok(())
//! }
//! ```
//!
//! Interactive hosts that keep state between user actions (choose
//! formats, pick files, submit) drive an [`UploadForm`] instead; it
//! validates each step and exposes the same status text the service's
//! web page shows.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `bookpost` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! bookpost = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod form;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod submit;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{UploadConfig, UploadConfigBuilder, DEFAULT_ENDPOINT};
pub use error::{BookpostError, MismatchedFile};
pub use form::{FormStatus, UploadForm};
pub use output::{ProcessedFile, UploadOutcome, UploadResponse, UploadStats};
pub use pipeline::download::{save_converted, save_zip};
pub use pipeline::input::SelectedFile;
pub use pipeline::validate::{file_extension, matches_format};
pub use progress::{NoopProgressCallback, ProgressCallback, UploadProgressCallback};
pub use submit::{submit, submit_sync};
