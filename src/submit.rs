//! One-shot submission entry points.
//!
//! [`submit`] runs the whole pipeline for callers that don't need the
//! stateful form: validate, upload, and return the parsed outcome. The
//! interactive flow in [`crate::form::UploadForm`] funnels into the same
//! [`submit_resolved`] internals, so both paths validate and report
//! identically.

use crate::config::UploadConfig;
use crate::error::BookpostError;
use crate::output::{UploadOutcome, UploadStats};
use crate::pipeline::input::SelectedFile;
use crate::pipeline::{input, upload, validate};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Submit files to the conversion service and return the outcome.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `paths` — local files to convert; every one must carry the source
///   format's extension
/// * `source_format` — extension the files are in, e.g. `"epub"`
/// * `target_format` — extension to convert to, e.g. `"mobi"`
/// * `config` — endpoint and behaviour knobs
///
/// # Returns
/// `Ok(UploadOutcome)` when the server answered success, even if it
/// converted nothing (check `outcome.errors` and
/// `outcome.processed_files`).
///
/// # Errors
/// Validation failures (`MissingFormats`, `NoFilesSelected`,
/// `FormatMismatch`, missing files) return before any network traffic.
/// Transport and server failures return `RequestFailed`,
/// `RequestTimeout`, `ServerRejected`, or `MalformedResponse`.
pub async fn submit<P: AsRef<Path>>(
    paths: &[P],
    source_format: &str,
    target_format: &str,
    config: &UploadConfig,
) -> Result<UploadOutcome, BookpostError> {
    // ── Step 1: Both formats must be chosen ──────────────────────────────
    if source_format.trim().is_empty() || target_format.trim().is_empty() {
        return Err(BookpostError::MissingFormats);
    }

    // ── Step 2: At least one file, all resolvable ────────────────────────
    if paths.is_empty() {
        return Err(BookpostError::NoFilesSelected);
    }
    let files = input::resolve_files(paths)?;

    // ── Step 3: Extensions must match the source format ──────────────────
    validate::check_files(&files, source_format)?;

    submit_resolved(&files, source_format, target_format, config).await
}

/// Blocking wrapper around [`submit`] for synchronous callers.
///
/// Creates a throwaway Tokio runtime; do not call this from inside an
/// async context.
pub fn submit_sync<P: AsRef<Path>>(
    paths: &[P],
    source_format: &str,
    target_format: &str,
    config: &UploadConfig,
) -> Result<UploadOutcome, BookpostError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| BookpostError::Internal(format!("failed to create tokio runtime: {e}")))?
        .block_on(submit(paths, source_format, target_format, config))
}

/// Upload an already-validated selection and assemble the outcome.
///
/// Shared by [`submit`] and [`crate::form::UploadForm::submit`]; both
/// have validated the selection by the time they call this.
pub(crate) async fn submit_resolved(
    files: &[SelectedFile],
    source_format: &str,
    target_format: &str,
    config: &UploadConfig,
) -> Result<UploadOutcome, BookpostError> {
    let total_start = Instant::now();
    let expected_bytes: u64 = files.iter().map(|f| f.size).sum();
    info!(
        "submitting {} file(s) ({} bytes): {} -> {}",
        files.len(),
        expected_bytes,
        source_format,
        target_format
    );

    // Fire before the POST so interactive callers can flip their status
    // to "Processing..." while the request is in flight.
    if let Some(cb) = &config.progress_callback {
        cb.on_submit_start(files.len(), expected_bytes);
    }

    // ── Step 4: One multipart POST carrying everything ───────────────────
    let upload_start = Instant::now();
    let request = upload::SubmitRequest {
        source_format,
        target_format,
        files,
    };
    let (response, bytes_uploaded) = upload::post_files(&request, config).await?;
    let upload_duration_ms = upload_start.elapsed().as_millis() as u64;

    if let Some(cb) = &config.progress_callback {
        cb.on_response(response.processed_files.len(), response.errors.len());
    }

    // ── Step 5: Assemble the outcome ─────────────────────────────────────
    let stats = UploadStats {
        files_submitted: files.len(),
        bytes_uploaded,
        files_converted: response.processed_files.len(),
        files_rejected: response.errors.len(),
        upload_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };
    info!(
        "conversion finished: {}/{} converted in {}ms",
        stats.files_converted, stats.files_submitted, stats.total_duration_ms
    );

    Ok(UploadOutcome {
        processed_files: response.processed_files,
        errors: response.errors,
        zip_download_url: response.zip_download_url,
        stats,
    })
}
