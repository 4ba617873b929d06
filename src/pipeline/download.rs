//! Fetching converted files back from the service.
//!
//! The response's download links are what a browser user clicks one by
//! one; here they are fetched with a small bounded pool instead. Files
//! land under their server-side names, with a ` (n)` suffix when a name
//! is already taken — on disk or by another file in the same batch — so
//! neither repeated runs nor concurrent downloads overwrite each other.
//! Each file is written to a `.part` sibling first and renamed into
//! place, so an interrupted fetch never leaves a truncated file under
//! the final name.

use crate::config::UploadConfig;
use crate::error::BookpostError;
use crate::output::UploadOutcome;
use crate::report::resolve_download_url;
use futures::stream::{self, StreamExt};
use reqwest::Url;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name used for the zip bundle when its URL does not carry one.
pub const DEFAULT_ZIP_NAME: &str = "converted_files.zip";

/// Fetch every converted file into `dir`.
///
/// Downloads run `download_concurrency` at a time. Progress events fire
/// per file as they happen; when some files fail, the rest still
/// complete and the first failure is returned. Returns the saved paths
/// in server order. An outcome with no converted files is a no-op.
pub async fn save_converted(
    outcome: &UploadOutcome,
    dir: &Path,
    config: &UploadConfig,
) -> Result<Vec<PathBuf>, BookpostError> {
    if outcome.processed_files.is_empty() {
        return Ok(Vec::new());
    }
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| BookpostError::OutputWriteFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;
    let client = config.http_client(config.download_timeout_secs)?;

    // Final names are fixed before anything downloads, so two entries
    // sharing a converted name cannot race to the same candidate (or
    // the same `.part` path) once the pool starts.
    let mut taken = HashSet::new();
    let names: Vec<String> = outcome
        .processed_files
        .iter()
        .map(|file| reserve_name(dir, &file.converted_name, &mut taken))
        .collect();

    let tasks = outcome
        .processed_files
        .iter()
        .zip(names)
        .enumerate()
        .map(|(idx, (file, name))| {
            let client = client.clone();
            let base = config.endpoint.clone();
            let callback = config.progress_callback.clone();
            let raw = file.download_url.clone();
            async move {
                if let Some(cb) = &callback {
                    cb.on_download_start(&name);
                }
                let result = async {
                    let url = resolve_download_url(&base, &raw)?;
                    fetch_resolved(&client, &url, dir, &name).await
                }
                .await;
                match &result {
                    Ok((path, bytes)) => {
                        debug!("saved '{}' ({} bytes)", path.display(), bytes);
                        if let Some(cb) = &callback {
                            cb.on_download_complete(&name, *bytes);
                        }
                    }
                    Err(e) => {
                        warn!("download of '{}' failed: {}", name, e);
                        if let Some(cb) = &callback {
                            cb.on_download_error(&name, &e.to_string());
                        }
                    }
                }
                (idx, result)
            }
        });

    let mut results: Vec<(usize, Result<(PathBuf, u64), BookpostError>)> = stream::iter(tasks)
        .buffer_unordered(config.download_concurrency)
        .collect()
        .await;
    results.sort_by_key(|(idx, _)| *idx);

    let mut saved = Vec::with_capacity(results.len());
    let mut first_error = None;
    for (_, result) in results {
        match result {
            Ok((path, _)) => saved.push(path),
            Err(e) if first_error.is_none() => first_error = Some(e),
            Err(_) => {}
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => {
            info!("saved {} converted file(s) to '{}'", saved.len(), dir.display());
            Ok(saved)
        }
    }
}

/// Fetch the zip bundle into `dir`, when the server offered one.
///
/// Returns `Ok(None)` when the outcome has no `zip_download_url` (the
/// server only bundles multi-file conversions).
pub async fn save_zip(
    outcome: &UploadOutcome,
    dir: &Path,
    config: &UploadConfig,
) -> Result<Option<PathBuf>, BookpostError> {
    let Some(raw) = &outcome.zip_download_url else {
        return Ok(None);
    };
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| BookpostError::OutputWriteFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;
    let client = config.http_client(config.download_timeout_secs)?;
    let url = resolve_download_url(&config.endpoint, raw)?;
    let name = reserve_name(dir, &zip_file_name(&url), &mut HashSet::new());

    if let Some(cb) = &config.progress_callback {
        cb.on_download_start(&name);
    }
    match fetch_resolved(&client, &url, dir, &name).await {
        Ok((path, bytes)) => {
            info!("saved zip bundle '{}' ({} bytes)", path.display(), bytes);
            if let Some(cb) = &config.progress_callback {
                cb.on_download_complete(&name, bytes);
            }
            Ok(Some(path))
        }
        Err(e) => {
            warn!("zip download failed: {}", e);
            if let Some(cb) = &config.progress_callback {
                cb.on_download_error(&name, &e.to_string());
            }
            Err(e)
        }
    }
}

/// GET one URL and write it under `dir` as exactly `name`.
///
/// `name` must already be reserved via [`reserve_name`]; nothing here
/// de-duplicates.
async fn fetch_resolved(
    client: &reqwest::Client,
    url: &Url,
    dir: &Path,
    name: &str,
) -> Result<(PathBuf, u64), BookpostError> {
    debug!("GET {}", url);
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| BookpostError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
    if !response.status().is_success() {
        return Err(BookpostError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }
    let payload = response
        .bytes()
        .await
        .map_err(|e| BookpostError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let path = dir.join(name);
    let partial = dir.join(format!("{name}.part"));
    tokio::fs::write(&partial, &payload)
        .await
        .map_err(|e| BookpostError::OutputWriteFailed {
            path: partial.clone(),
            source: e,
        })?;
    tokio::fs::rename(&partial, &path)
        .await
        .map_err(|e| BookpostError::OutputWriteFailed {
            path: path.clone(),
            source: e,
        })?;
    Ok((path, payload.len() as u64))
}

/// First free variant of `file_name`: the name itself, then
/// `stem (1).ext`, `stem (2).ext`, and so on. A candidate is taken when
/// it exists in `dir` or is already in `taken`; the winner is recorded
/// in `taken`, so one set shared across a batch keeps every pick
/// distinct. Mirrors how the server names colliding results, so local
/// and remote copies stay aligned.
pub(crate) fn reserve_name(dir: &Path, file_name: &str, taken: &mut HashSet<String>) -> String {
    let free = |name: &str, taken: &HashSet<String>| {
        !taken.contains(name) && !dir.join(name).exists()
    };
    if free(file_name, taken) {
        taken.insert(file_name.to_string());
        return file_name.to_string();
    }
    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((s, e)) if !s.is_empty() => (s, Some(e)),
        _ => (file_name, None),
    };
    let mut counter = 1u32;
    loop {
        let candidate = match ext {
            Some(e) => format!("{stem} ({counter}).{e}"),
            None => format!("{stem} ({counter})"),
        };
        if free(&candidate, taken) {
            taken.insert(candidate.clone());
            return candidate;
        }
        counter += 1;
    }
}

/// File name for the zip bundle, from the URL's last path segment when
/// it looks like a file name, else [`DEFAULT_ZIP_NAME`].
///
/// The server's zip link ends in a session id (`/download_zip/<id>`);
/// the real name only travels in Content-Disposition, which is not worth
/// parsing for a constant default.
fn zip_file_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| segment.contains('.'))
        .map(ToString::to_string)
        .unwrap_or_else(|| DEFAULT_ZIP_NAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pick(dir: &Path, name: &str) -> String {
        reserve_name(dir, name, &mut HashSet::new())
    }

    #[test]
    fn reserved_names_count_up_against_disk() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(pick(dir.path(), "book.mobi"), "book.mobi");

        std::fs::write(dir.path().join("book.mobi"), b"x").unwrap();
        assert_eq!(pick(dir.path(), "book.mobi"), "book (1).mobi");

        std::fs::write(dir.path().join("book (1).mobi"), b"x").unwrap();
        assert_eq!(pick(dir.path(), "book.mobi"), "book (2).mobi");
    }

    #[test]
    fn duplicate_names_in_one_batch_get_distinct_reservations() {
        // Nothing on disk: collisions come purely from the shared set.
        let dir = tempfile::tempdir().unwrap();
        let mut taken = HashSet::new();
        assert_eq!(reserve_name(dir.path(), "book.mobi", &mut taken), "book.mobi");
        assert_eq!(reserve_name(dir.path(), "book.mobi", &mut taken), "book (1).mobi");
        assert_eq!(reserve_name(dir.path(), "book.mobi", &mut taken), "book (2).mobi");
    }

    #[test]
    fn reserved_name_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README"), b"x").unwrap();
        assert_eq!(pick(dir.path(), "README"), "README (1)");
    }

    #[test]
    fn reserved_hidden_file_suffixes_whole_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".bashrc"), b"x").unwrap();
        assert_eq!(pick(dir.path(), ".bashrc"), ".bashrc (1)");
    }

    #[test]
    fn zip_name_from_url_or_default() {
        let with_name = Url::parse("http://127.0.0.1:5001/files/batch.zip").unwrap();
        assert_eq!(zip_file_name(&with_name), "batch.zip");

        let session_link = Url::parse("http://127.0.0.1:5001/download_zip/abc123").unwrap();
        assert_eq!(zip_file_name(&session_link), DEFAULT_ZIP_NAME);
    }
}
