//! The multipart POST to the conversion service.
//!
//! All selected files travel in one request under the `files[]` field,
//! with `source_format` and `target_format` as plain text fields; the
//! server converts synchronously and answers with JSON. Transport
//! failures, non-success statuses, and unparseable bodies each map to
//! their own [`BookpostError`] variant so callers can render precise
//! status text.
//!
//! The server's error body is `{"error": "..."}` when it gets that far;
//! proxies in front of it answer with HTML. [`error_message`] prefers the
//! server's own words and falls back to `Server error: <status> <reason>`.

use crate::config::UploadConfig;
use crate::error::BookpostError;
use crate::output::UploadResponse;
use crate::pipeline::input::SelectedFile;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use tracing::{debug, info};

/// Everything one submission sends over the wire.
pub(crate) struct SubmitRequest<'a> {
    pub source_format: &'a str,
    pub target_format: &'a str,
    pub files: &'a [SelectedFile],
}

/// POST the files and return the parsed response plus the payload size.
///
/// Reads each file from disk at this point, not at selection time, so a
/// file that vanished in between surfaces as [`BookpostError::FileRead`]
/// before any network traffic.
pub(crate) async fn post_files(
    req: &SubmitRequest<'_>,
    config: &UploadConfig,
) -> Result<(UploadResponse, u64), BookpostError> {
    let url = config.upload_url()?;
    let client = config.http_client(config.upload_timeout_secs)?;

    let mut form = Form::new()
        .text("source_format", req.source_format.to_string())
        .text("target_format", req.target_format.to_string());
    let mut bytes_total: u64 = 0;
    for file in req.files {
        let payload = tokio::fs::read(&file.path)
            .await
            .map_err(|e| BookpostError::FileRead {
                path: file.path.clone(),
                source: e,
            })?;
        bytes_total += payload.len() as u64;
        form = form.part("files[]", Part::bytes(payload).file_name(file.name.clone()));
    }
    debug!(
        "POST {} with {} file(s), {} bytes",
        url,
        req.files.len(),
        bytes_total
    );

    let response = client
        .post(url.clone())
        .multipart(form)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                BookpostError::RequestTimeout {
                    url: url.to_string(),
                    secs: config.upload_timeout_secs,
                }
            } else {
                BookpostError::RequestFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(BookpostError::ServerRejected {
            status: status.as_u16(),
            message: error_message(status, &body),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| BookpostError::MalformedResponse {
            detail: e.to_string(),
        })?;
    let parsed = parse_success(&body)?;
    info!(
        "server converted {} file(s), reported {} error(s)",
        parsed.processed_files.len(),
        parsed.errors.len()
    );
    Ok((parsed, bytes_total))
}

/// The user-facing message for a non-success response.
///
/// Prefers the server's `error` field; an unparseable or empty body
/// falls back to the status line.
fn error_message(status: StatusCode, body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        error: String,
    }
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if !parsed.error.trim().is_empty() {
            return parsed.error;
        }
    }
    format!(
        "Server error: {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    )
}

fn parse_success(body: &str) -> Result<UploadResponse, BookpostError> {
    serde_json::from_str(body).map_err(|e| BookpostError::MalformedResponse {
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_field_wins() {
        let msg = error_message(StatusCode::BAD_REQUEST, r#"{"error": "bad format"}"#);
        assert_eq!(msg, "bad format");
    }

    #[test]
    fn html_body_falls_back_to_status_line() {
        let msg = error_message(StatusCode::BAD_GATEWAY, "<html><body>oops</body></html>");
        assert_eq!(msg, "Server error: 502 Bad Gateway");
    }

    #[test]
    fn empty_error_field_falls_back_too() {
        let msg = error_message(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error": ""}"#);
        assert_eq!(msg, "Server error: 500 Internal Server Error");
    }

    #[test]
    fn empty_body_falls_back() {
        let msg = error_message(StatusCode::NOT_FOUND, "");
        assert_eq!(msg, "Server error: 404 Not Found");
    }

    #[test]
    fn malformed_success_body_is_its_own_error() {
        let err = parse_success("this is not json").unwrap_err();
        assert!(
            matches!(err, BookpostError::MalformedResponse { .. }),
            "got: {err:?}"
        );
    }

    #[test]
    fn success_body_parses() {
        let parsed = parse_success(r#"{"errors": [], "processed_files": []}"#).unwrap();
        assert!(parsed.processed_files.is_empty());
        assert!(parsed.zip_download_url.is_none());
    }
}
