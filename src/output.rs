//! Result types returned by a submission.
//!
//! [`UploadResponse`] mirrors the conversion service's JSON body field for
//! field; it is what comes off the wire. [`UploadOutcome`] is the
//! caller-facing result: the same lists plus [`UploadStats`] gathered
//! around the request. Keeping the wire DTO separate means a server that
//! adds fields never breaks callers, and tests can build responses
//! without faking timings.

use serde::{Deserialize, Serialize};

/// One successfully converted file, as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedFile {
    /// Name of the uploaded file.
    pub original_name: String,
    /// Name of the converted file on the server.
    pub converted_name: String,
    /// Download link for the converted file. Usually server-relative
    /// (`/download/<session>/<name>`); resolve it against the endpoint
    /// with [`crate::report::resolve_download_url`].
    pub download_url: String,
}

/// The conversion service's success body, verbatim.
///
/// Every field is optional on the wire: a server that converted nothing
/// sends empty lists, and `zip_download_url` only appears when more than
/// one file was converted. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Per-file conversion failures, already human-readable.
    #[serde(default)]
    pub errors: Vec<String>,
    /// Files the server converted, in server order.
    #[serde(default)]
    pub processed_files: Vec<ProcessedFile>,
    /// Link to a zip bundle of all converted files, when offered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_download_url: Option<String>,
}

/// Timing and volume counters for one submission.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UploadStats {
    /// Files sent in the multipart request.
    pub files_submitted: usize,
    /// Total payload bytes read from disk and uploaded.
    pub bytes_uploaded: u64,
    /// Files the server reports as converted.
    pub files_converted: usize,
    /// Files the server reports as failed.
    pub files_rejected: usize,
    /// Wall-clock time for the POST round-trip.
    pub upload_duration_ms: u64,
    /// Wall-clock time for the whole submission.
    pub total_duration_ms: u64,
}

/// Everything a completed submission produced.
#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
    /// Files the server converted, in server order.
    pub processed_files: Vec<ProcessedFile>,
    /// Per-file conversion failures reported by the server.
    pub errors: Vec<String>,
    /// Zip bundle link, when the server offered one.
    pub zip_download_url: Option<String>,
    /// Counters for this submission.
    pub stats: UploadStats,
}

impl UploadOutcome {
    /// True when the server converted at least one file.
    pub fn any_converted(&self) -> bool {
        !self.processed_files.is_empty()
    }

    /// True when the server reported no per-file failures.
    pub fn clean(&self) -> bool {
        self.errors.is_empty()
    }
}
