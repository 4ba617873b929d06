//! The stateful upload form: formats, selection, status, and the
//! double-submit guard.
//!
//! [`UploadForm`] models the interactive flow around a submission the
//! way a web front-end drives it: choose formats, select files (each
//! selection is validated immediately), submit, watch the status. The
//! one-shot [`crate::submit`] covers scripted callers; the form exists
//! for hosts that keep state between user actions and need the same
//! validation messages a browser user would see.
//!
//! # The double-submit guard
//!
//! Disabling a button is how a web page stops the user from submitting
//! twice; a library cannot disable anything, so the form carries an
//! atomic in-flight flag instead and rejects overlapping submissions
//! with [`BookpostError::SubmissionInFlight`]. The flag travels with
//! clones: cloning the form hands out another handle to the *same
//! logical form*, so a clone cannot sneak a second submission past the
//! guard. Selection and status are per-handle.

use crate::config::UploadConfig;
use crate::error::BookpostError;
use crate::output::UploadOutcome;
use crate::pipeline::input::{self, SelectedFile};
use crate::pipeline::validate;
use crate::report;
use crate::submit;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// What the form's status area shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormStatus {
    /// Nothing to report.
    #[default]
    Idle,
    /// The current selection or submission attempt failed validation;
    /// one message per problem, in selection order.
    Invalid(Vec<String>),
    /// A submission is in flight.
    Processing,
    /// The last submission completed.
    Complete,
    /// The last submission failed; the rendered status line.
    Failed(String),
}

impl FormStatus {
    /// The status area's text, empty when there is nothing to show.
    pub fn message(&self) -> String {
        match self {
            FormStatus::Idle => String::new(),
            FormStatus::Invalid(messages) => messages.join("\n"),
            FormStatus::Processing => report::PROCESSING_MESSAGE.to_string(),
            FormStatus::Complete => report::COMPLETE_MESSAGE.to_string(),
            FormStatus::Failed(line) => line.clone(),
        }
    }
}

/// A conversion form: two format choices, a file selection, and a
/// status area.
///
/// # Example
/// ```rust,no_run
/// use bookpost::{UploadForm, UploadConfig};
///
/// # async fn run() -> Result<(), bookpost::BookpostError> {
/// let config = UploadConfig::default();
/// let mut form = UploadForm::new();
/// form.set_source_format("epub");
/// form.set_target_format("mobi");
/// form.select_files(&["war_and_peace.epub"])?;
/// let outcome = form.submit(&config).await?;
/// println!("{} file(s) converted", outcome.processed_files.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    source_format: Option<String>,
    target_format: Option<String>,
    files: Vec<SelectedFile>,
    status: FormStatus,
    in_flight: Arc<AtomicBool>,
}

impl UploadForm {
    /// An empty form: no formats, no files, idle status.
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose the source format. An empty string means "no choice yet",
    /// matching a select element's placeholder value.
    ///
    /// Changing the format does not re-validate an existing selection;
    /// the mismatch surfaces on the next [`select_files`](Self::select_files)
    /// or [`submit`](Self::submit).
    pub fn set_source_format(&mut self, format: impl Into<String>) {
        let format = format.into();
        self.source_format = (!format.is_empty()).then_some(format);
    }

    /// Choose the target format. An empty string means "no choice yet".
    pub fn set_target_format(&mut self, format: impl Into<String>) {
        let format = format.into();
        self.target_format = (!format.is_empty()).then_some(format);
    }

    pub fn source_format(&self) -> Option<&str> {
        self.source_format.as_deref()
    }

    pub fn target_format(&self) -> Option<&str> {
        self.target_format.as_deref()
    }

    /// The current (validated) selection.
    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    pub fn status(&self) -> &FormStatus {
        &self.status
    }

    /// True while this form (or any clone of it) has a submission in
    /// flight.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Replace the selection, validating every file immediately.
    ///
    /// Requires a source format: without one there is nothing to
    /// validate against, so the selection is refused outright. On any
    /// failure the selection is cleared (the front-end resets its file
    /// input the same way) and the status lists one message per
    /// offending file. On success the selection replaces the old one
    /// and the status returns to idle.
    pub fn select_files<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<(), BookpostError> {
        let Some(source) = self.source_format.clone() else {
            self.files.clear();
            let err = BookpostError::MissingSourceFormat;
            self.status = FormStatus::Invalid(vec![err.to_string()]);
            return Err(err);
        };

        let resolved = match input::resolve_files(paths) {
            Ok(resolved) => resolved,
            Err(e) => {
                self.files.clear();
                self.status = FormStatus::Invalid(vec![e.to_string()]);
                return Err(e);
            }
        };

        match validate::check_files(&resolved, &source) {
            Ok(()) => {
                debug!("selection accepted: {} file(s)", resolved.len());
                self.files = resolved;
                self.status = FormStatus::Idle;
                Ok(())
            }
            Err(BookpostError::FormatMismatch { rejected }) => {
                self.files.clear();
                self.status =
                    FormStatus::Invalid(rejected.iter().map(ToString::to_string).collect());
                Err(BookpostError::FormatMismatch { rejected })
            }
            Err(other) => {
                self.files.clear();
                self.status = FormStatus::Invalid(vec![other.to_string()]);
                Err(other)
            }
        }
    }

    /// Clear formats, selection, and status.
    pub fn reset(&mut self) {
        self.source_format = None;
        self.target_format = None;
        self.files.clear();
        self.status = FormStatus::Idle;
    }

    /// Validate the form and run one submission.
    ///
    /// Validation order matches the front-end: both formats, then a
    /// non-empty selection, then extensions (formats may have changed
    /// since the files were selected). Any failure renders into the
    /// status area and returns before network traffic. During the
    /// upload the status is [`FormStatus::Processing`]; afterwards it is
    /// [`FormStatus::Complete`] or [`FormStatus::Failed`] with the
    /// rendered status line.
    ///
    /// A submission already in flight (on this form or a clone) makes
    /// this return [`BookpostError::SubmissionInFlight`] immediately,
    /// leaving the running submission's status untouched.
    pub async fn submit(&mut self, config: &UploadConfig) -> Result<UploadOutcome, BookpostError> {
        // Acquired before validation so a racing clone cannot interleave.
        let _guard = InFlightGuard::acquire(&self.in_flight)?;

        let (source, target) = match (self.source_format.clone(), self.target_format.clone()) {
            (Some(source), Some(target)) => (source, target),
            _ => {
                let err = BookpostError::MissingFormats;
                self.status = FormStatus::Invalid(vec![err.to_string()]);
                return Err(err);
            }
        };
        if self.files.is_empty() {
            let err = BookpostError::NoFilesSelected;
            self.status = FormStatus::Invalid(vec![err.to_string()]);
            return Err(err);
        }
        match validate::check_files(&self.files, &source) {
            Ok(()) => {}
            Err(BookpostError::FormatMismatch { rejected }) => {
                let messages = rejected
                    .iter()
                    .map(|m| format!("{m} Please re-select files or adjust source format."))
                    .collect();
                self.files.clear();
                self.status = FormStatus::Invalid(messages);
                return Err(BookpostError::FormatMismatch { rejected });
            }
            Err(other) => {
                self.status = FormStatus::Invalid(vec![other.to_string()]);
                return Err(other);
            }
        }

        self.status = FormStatus::Processing;
        let result = submit::submit_resolved(&self.files, &source, &target, config).await;
        match &result {
            Ok(outcome) => {
                debug!(
                    "submission complete: {} converted, {} rejected",
                    outcome.processed_files.len(),
                    outcome.errors.len()
                );
                self.status = FormStatus::Complete;
            }
            Err(e) => self.status = FormStatus::Failed(report::status_line(e)),
        }
        result
    }
}

/// RAII holder for the in-flight flag; releases on drop, so every exit
/// path out of [`UploadForm::submit`] re-enables submissions.
struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Result<Self, BookpostError> {
        if flag
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(BookpostError::SubmissionInFlight);
        }
        Ok(Self {
            flag: Arc::clone(flag),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
