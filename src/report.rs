//! Plain-text rendering of submission results.
//!
//! The conversion service's own front-end shows results in a fixed
//! order: per-file errors first, then the converted-file list with
//! download links, then the zip bundle link, and a fallback line when
//! the server reported nothing at all — no conversions *and* no errors.
//! [`render_report`] reproduces that layout as text so terminal and log
//! output read the same as the web page.
//!
//! Download links come back server-relative (`/download/...`);
//! [`resolve_download_url`] turns them into absolute URLs against the
//! configured endpoint, exactly as a browser resolves a root-relative
//! anchor.

use crate::error::BookpostError;
use crate::output::UploadOutcome;
use reqwest::Url;

/// Status text while a submission is in flight.
pub const PROCESSING_MESSAGE: &str = "Processing... Please wait.";

/// Status text when a submission completed.
pub const COMPLETE_MESSAGE: &str = "Conversion complete!";

/// Results text when the server converted nothing.
pub const NO_FILES_MESSAGE: &str =
    "No files were converted. Please check your selection and try again.";

/// Resolve a download link from the server against the endpoint.
///
/// Relative links resolve against the endpoint origin; absolute links
/// pass through. Anything that does not end up as an http(s) URL is
/// rejected rather than handed to the HTTP client.
pub fn resolve_download_url(base: &Url, raw: &str) -> Result<Url, BookpostError> {
    let url = base.join(raw).map_err(|e| BookpostError::InvalidDownloadUrl {
        url: raw.to_string(),
        detail: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(BookpostError::InvalidDownloadUrl {
            url: raw.to_string(),
            detail: format!("unsupported scheme '{other}'"),
        }),
    }
}

/// Render the results region for a completed submission.
///
/// Sections appear in the front-end's order and only when non-empty:
///
/// ```text
/// Errors:
///   - Error converting notes.epub: corrupt archive
///
/// Converted Files:
///   - book.epub → book.mobi
///     http://127.0.0.1:5001/download/abc123/book.mobi
///
/// Download All as ZIP: http://127.0.0.1:5001/download_zip/abc123
/// ```
///
/// [`NO_FILES_MESSAGE`] appears only when the server reported neither
/// conversions nor errors; reported errors stand on their own. The zip
/// link renders whenever the server offers one. A link that cannot be
/// resolved is shown as the server sent it.
pub fn render_report(outcome: &UploadOutcome, base: &Url) -> String {
    let mut sections: Vec<String> = Vec::new();

    if !outcome.errors.is_empty() {
        let mut section = String::from("Errors:\n");
        for error in &outcome.errors {
            section.push_str("  - ");
            section.push_str(error);
            section.push('\n');
        }
        sections.push(section.trim_end().to_string());
    }

    if !outcome.processed_files.is_empty() {
        let mut section = String::from("Converted Files:\n");
        for file in &outcome.processed_files {
            section.push_str(&format!(
                "  - {} → {}\n    {}\n",
                file.original_name,
                file.converted_name,
                display_url(base, &file.download_url)
            ));
        }
        sections.push(section.trim_end().to_string());
    } else if outcome.errors.is_empty() {
        sections.push(NO_FILES_MESSAGE.to_string());
    }

    if let Some(zip) = &outcome.zip_download_url {
        sections.push(format!("Download All as ZIP: {}", display_url(base, zip)));
    }

    sections.join("\n\n")
}

/// One-line status text for a failed submission.
///
/// Server rejections surface the server's own message; everything else
/// renders its `Display` text. The `Error: ` prefix matches what the
/// front-end shows in its status area.
pub fn status_line(error: &BookpostError) -> String {
    match error {
        BookpostError::ServerRejected { message, .. } => format!("Error: {message}"),
        other => format!("Error: {other}"),
    }
}

fn display_url(base: &Url, raw: &str) -> String {
    resolve_download_url(base, raw)
        .map(|url| url.to_string())
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{ProcessedFile, UploadStats};

    fn base() -> Url {
        Url::parse("http://127.0.0.1:5001").unwrap()
    }

    fn outcome_with(
        processed: Vec<ProcessedFile>,
        errors: Vec<String>,
        zip: Option<String>,
    ) -> UploadOutcome {
        UploadOutcome {
            processed_files: processed,
            errors,
            zip_download_url: zip,
            stats: UploadStats::default(),
        }
    }

    #[test]
    fn sections_appear_in_front_end_order() {
        let outcome = outcome_with(
            vec![
                ProcessedFile {
                    original_name: "a.epub".into(),
                    converted_name: "a.mobi".into(),
                    download_url: "/download/s1/a.mobi".into(),
                },
                ProcessedFile {
                    original_name: "b.epub".into(),
                    converted_name: "b.mobi".into(),
                    download_url: "/download/s1/b.mobi".into(),
                },
            ],
            vec!["Error converting c.epub: corrupt archive".into()],
            Some("/download_zip/s1".into()),
        );
        let report = render_report(&outcome, &base());

        let errors_at = report.find("Errors:").unwrap();
        let files_at = report.find("Converted Files:").unwrap();
        let zip_at = report.find("Download All as ZIP:").unwrap();
        assert!(errors_at < files_at && files_at < zip_at, "got:\n{report}");

        assert!(report.contains("a.epub → a.mobi"));
        assert!(report.contains("http://127.0.0.1:5001/download/s1/b.mobi"));
        assert!(report.contains("http://127.0.0.1:5001/download_zip/s1"));
        assert!(!report.contains(NO_FILES_MESSAGE));
    }

    #[test]
    fn errors_without_conversions_render_only_the_errors() {
        let outcome = outcome_with(vec![], vec!["Error converting a.epub: boom".into()], None);
        let report = render_report(&outcome, &base());
        assert!(report.contains("Errors:"));
        assert!(report.contains("Error converting a.epub: boom"));
        // The server did report something, so the fallback stays out.
        assert!(!report.contains(NO_FILES_MESSAGE), "got:\n{report}");
        assert!(!report.contains("Converted Files:"));
    }

    #[test]
    fn empty_outcome_is_just_the_fallback_line() {
        let outcome = outcome_with(vec![], vec![], None);
        assert_eq!(render_report(&outcome, &base()), NO_FILES_MESSAGE);
    }

    #[test]
    fn zip_link_renders_without_conversions() {
        let outcome = outcome_with(
            vec![],
            vec!["Error converting a.epub: boom".into()],
            Some("/download_zip/s1".into()),
        );
        let report = render_report(&outcome, &base());
        assert!(
            report.contains("Download All as ZIP: http://127.0.0.1:5001/download_zip/s1"),
            "got:\n{report}"
        );
        assert!(!report.contains(NO_FILES_MESSAGE));
    }

    #[test]
    fn absolute_links_pass_through() {
        let outcome = outcome_with(
            vec![ProcessedFile {
                original_name: "a.epub".into(),
                converted_name: "a.mobi".into(),
                download_url: "http://cdn.books.internal/a.mobi".into(),
            }],
            vec![],
            None,
        );
        let report = render_report(&outcome, &base());
        assert!(report.contains("http://cdn.books.internal/a.mobi"), "got:\n{report}");
    }

    #[test]
    fn resolve_rejects_non_http_schemes() {
        let err = resolve_download_url(&base(), "javascript:alert(1)").unwrap_err();
        assert!(
            matches!(err, BookpostError::InvalidDownloadUrl { .. }),
            "got: {err:?}"
        );
    }

    #[test]
    fn status_line_prefers_server_message() {
        let err = BookpostError::ServerRejected {
            status: 400,
            message: "bad format".into(),
        };
        assert_eq!(status_line(&err), "Error: bad format");
    }

    #[test]
    fn status_line_renders_other_errors() {
        let line = status_line(&BookpostError::NoFilesSelected);
        assert_eq!(line, "Error: Please select one or more files to convert.");
    }
}
