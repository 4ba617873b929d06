//! Error types for the bookpost library.
//!
//! Two distinct types reflect two distinct failure shapes:
//!
//! * [`BookpostError`] — a submission (or a download batch) cannot proceed
//!   or did not complete. Returned as `Err(BookpostError)` from the
//!   top-level `submit*` functions and from [`crate::form::UploadForm`].
//!
//! * [`MismatchedFile`] — a per-file record of a selection that does not
//!   match the declared source format. Carried inside
//!   [`BookpostError::FormatMismatch`] so callers can show one message per
//!   offending file instead of a single opaque failure.
//!
//! The `Display` text of the validation variants is exactly what an
//! interactive front-end shows in its status area, so callers can render
//! `err.to_string()` directly (see [`crate::report::status_line`]).

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the bookpost library.
#[derive(Debug, Error)]
pub enum BookpostError {
    // ── Selection & validation errors ─────────────────────────────────────
    /// Files were selected before a source format was chosen.
    #[error("Please select a source format first.")]
    MissingSourceFormat,

    /// Submission attempted without both formats chosen.
    #[error("Please select both source and target formats.")]
    MissingFormats,

    /// Submission attempted with an empty file selection.
    #[error("Please select one or more files to convert.")]
    NoFilesSelected,

    /// One or more selected files do not carry the source format's
    /// extension. Inspect `rejected` for the per-file messages.
    #[error("{} selected file(s) do not match the source format", .rejected.len())]
    FormatMismatch { rejected: Vec<MismatchedFile> },

    // ── Local file errors ─────────────────────────────────────────────────
    /// Selected file was not found at the given path.
    #[error("File not found: '{}'\nCheck the path exists and is readable.", .path.display())]
    FileNotFound { path: PathBuf },

    /// Selected path exists but is not a regular file.
    #[error("Not a regular file: '{}'", .path.display())]
    NotAFile { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{}'\nTry: chmod +r {:?}", .path.display(), .path)]
    PermissionDenied { path: PathBuf },

    /// The file vanished or turned unreadable between selection and upload.
    #[error("Failed to read '{}': {}", .path.display(), .source)]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Submission errors ─────────────────────────────────────────────────
    /// A second submission was attempted while one is still in flight.
    #[error("A submission is already in progress.\nWait for it to finish before submitting again.")]
    SubmissionInFlight,

    /// The POST to the conversion service failed at the transport level.
    #[error("Failed to reach the conversion service at '{url}': {reason}\nCheck the server is running and the endpoint is correct.")]
    RequestFailed { url: String, reason: String },

    /// The upload exceeded the configured timeout.
    #[error("Upload timed out after {secs}s for '{url}'\nIncrease --timeout for large files or slow conversions.")]
    RequestTimeout { url: String, secs: u64 },

    // ── Server response errors ────────────────────────────────────────────
    /// The server answered with a non-success status.
    ///
    /// `message` is the server's own `error` field when the body was JSON,
    /// otherwise a `Server error: <status> <reason>` fallback. Status
    /// renderers print `message` verbatim (see
    /// [`crate::report::status_line`]).
    #[error("Server rejected the upload (HTTP {status}): {message}")]
    ServerRejected { status: u16, message: String },

    /// The server claimed success but the body was not the expected JSON.
    #[error("Could not parse the server response: {detail}")]
    MalformedResponse { detail: String },

    // ── Download errors ───────────────────────────────────────────────────
    /// A download link from the server does not resolve to a valid URL.
    #[error("Invalid download URL '{url}': {detail}")]
    InvalidDownloadUrl { url: String, detail: String },

    /// Fetching a converted file failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Could not create the output directory or write a downloaded file.
    #[error("Failed to write output file '{}': {}", .path.display(), .source)]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// One file rejected during extension validation.
///
/// The `Display` text is the exact per-file message an interactive
/// front-end shows next to the file picker. `found` keeps the extension
/// that was actually present (`None` when the name has no extension at
/// all) for logs and structured output; it is not part of the message.
#[derive(Debug, Clone, Error, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[error("File \"{file_name}\" does not match the selected source format (.{expected}).")]
pub struct MismatchedFile {
    /// File name as selected (no directory components).
    pub file_name: String,
    /// The declared source format, without the leading dot.
    pub expected: String,
    /// The extension the file actually has, lowercased, if any.
    pub found: Option<String>,
}
