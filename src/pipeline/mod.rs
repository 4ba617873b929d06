//! The submission pipeline, one module per stage.
//!
//! ```text
//! paths ──▶ input ──▶ validate ──▶ upload ──▶ (download)
//! ```
//!
//! * [`input`]    — resolve user-supplied paths to named, sized files
//! * [`validate`] — check file extensions against the declared source format
//! * [`upload`]   — one multipart POST carrying all files and both formats
//! * [`download`] — optionally fetch converted files to a local directory
//!
//! The stages are deliberately small and free-standing so each can be
//! tested without a server (except `upload`/`download`, which the
//! integration tests exercise against a mock service).

pub mod download;
pub mod input;
pub mod upload;
pub mod validate;
