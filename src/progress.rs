//! Progress-callback trait for submission and download events.
//!
//! Inject an [`Arc<dyn UploadProgressCallback>`] via
//! [`crate::config::UploadConfigBuilder::progress_callback`] to receive
//! real-time events as a submission moves through upload and download.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers
//! can forward events to a status line, a terminal spinner, a GUI widget,
//! or a log — without the library knowing anything about how the host
//! application communicates. The trait is `Send + Sync` so it works
//! correctly when downloads run concurrently.
//!
//! # Example
//!
//! ```rust
//! use bookpost::{UploadProgressCallback, UploadConfig};
//! use std::sync::Arc;
//!
//! struct StatusLine;
//!
//! impl UploadProgressCallback for StatusLine {
//!     fn on_submit_start(&self, file_count: usize, total_bytes: u64) {
//!         eprintln!("Processing... Please wait. ({file_count} files, {total_bytes} bytes)");
//!     }
//! }
//!
//! let config = UploadConfig::builder()
//!     .progress_callback(Arc::new(StatusLine) as Arc<dyn UploadProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the submission pipeline as a submission progresses.
///
/// Implementations must be `Send + Sync` (downloads run concurrently).
/// All methods have default no-op implementations so callers only
/// override what they care about.
///
/// # Thread safety
///
/// `on_download_start`, `on_download_complete`, and `on_download_error`
/// may fire concurrently from different tasks when
/// `download_concurrency > 1`. Implementations must protect shared
/// mutable state with appropriate synchronisation primitives.
pub trait UploadProgressCallback: Send + Sync {
    /// Called once after validation passes, just before the POST is sent.
    ///
    /// This is the moment an interactive front-end switches its status
    /// area to "Processing... Please wait.".
    ///
    /// # Arguments
    /// * `file_count`  — number of files in the multipart request
    /// * `total_bytes` — total payload bytes about to be uploaded
    fn on_submit_start(&self, file_count: usize, total_bytes: u64) {
        let _ = (file_count, total_bytes);
    }

    /// Called when the server's response has been parsed.
    ///
    /// # Arguments
    /// * `converted` — files the server reports as converted
    /// * `rejected`  — files the server reports as failed
    fn on_response(&self, converted: usize, rejected: usize) {
        let _ = (converted, rejected);
    }

    /// Called just before a converted file is fetched.
    ///
    /// `file_name` is the name the file will be saved under, already
    /// de-duplicated against the output directory.
    fn on_download_start(&self, file_name: &str) {
        let _ = file_name;
    }

    /// Called when a converted file has been written to disk.
    ///
    /// # Arguments
    /// * `file_name` — name the file was saved under
    /// * `bytes`     — size of the downloaded file
    fn on_download_complete(&self, file_name: &str, bytes: u64) {
        let _ = (file_name, bytes);
    }

    /// Called when fetching or writing a converted file failed.
    fn on_download_error(&self, file_name: &str, error: &str) {
        let _ = (file_name, error);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl UploadProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::UploadConfig`].
pub type ProgressCallback = Arc<dyn UploadProgressCallback>;
