//! Extension validation against the declared source format.
//!
//! The conversion service trusts the `source_format` field, so a file
//! whose extension disagrees with it would be converted as the wrong
//! format or rejected server-side after a full upload. Checking here
//! keeps bad selections from ever reaching the network.
//!
//! Extension semantics are spelled out in [`file_extension`] rather than
//! left to ad-hoc string splitting: the final `.`-separated segment, with
//! two deliberate edge cases (no dot, and a leading dot only, mean *no
//! extension*; a trailing dot means an *empty* extension). Comparison is
//! ASCII case-insensitive, so `BOOK.EPUB` matches `epub`.

use crate::error::{BookpostError, MismatchedFile};
use crate::pipeline::input::SelectedFile;

/// The extension of a file name, if it has one.
///
/// Returns the segment after the last `.`:
///
/// * `"book.epub"` → `Some("epub")`
/// * `"book.tar.gz"` → `Some("gz")`
/// * `"book."` → `Some("")` (a trailing dot is an empty extension)
/// * `"book"` → `None`
/// * `".hidden"` → `None` (a leading dot alone marks a hidden file,
///   not an extension)
///
/// Case is preserved; use [`matches_format`] for comparisons.
pub fn file_extension(name: &str) -> Option<&str> {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => Some(ext),
        _ => None,
    }
}

/// Whether `name` carries the given format's extension.
///
/// `format` may be given with or without a leading dot. A name with no
/// extension matches nothing.
pub fn matches_format(name: &str, format: &str) -> bool {
    let want = format.strip_prefix('.').unwrap_or(format);
    match file_extension(name) {
        Some(ext) => ext.eq_ignore_ascii_case(want),
        None => false,
    }
}

/// Check every selected file against the source format.
///
/// Collects *all* offenders rather than stopping at the first, so a
/// front-end can show one message per file. Returns
/// [`BookpostError::FormatMismatch`] with the rejects in selection order.
pub fn check_files(files: &[SelectedFile], source_format: &str) -> Result<(), BookpostError> {
    let expected = source_format.strip_prefix('.').unwrap_or(source_format);
    let rejected: Vec<MismatchedFile> = files
        .iter()
        .filter(|f| !matches_format(&f.name, expected))
        .map(|f| MismatchedFile {
            file_name: f.name.clone(),
            expected: expected.to_string(),
            found: file_extension(&f.name).map(str::to_ascii_lowercase),
        })
        .collect();
    if rejected.is_empty() {
        Ok(())
    } else {
        Err(BookpostError::FormatMismatch { rejected })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn selected(name: &str) -> SelectedFile {
        SelectedFile {
            name: name.to_string(),
            path: PathBuf::from(name),
            size: 0,
        }
    }

    #[test]
    fn extension_edge_cases() {
        assert_eq!(file_extension("book.epub"), Some("epub"));
        assert_eq!(file_extension("book.tar.gz"), Some("gz"));
        assert_eq!(file_extension("book."), Some(""));
        assert_eq!(file_extension("book"), None);
        assert_eq!(file_extension(".hidden"), None);
        assert_eq!(file_extension("BOOK.EPUB"), Some("EPUB"));
    }

    #[test]
    fn format_match_is_case_insensitive() {
        assert!(matches_format("BOOK.EPUB", "epub"));
        assert!(matches_format("book.epub", "EPUB"));
        assert!(matches_format("book.epub", ".epub"));
        assert!(!matches_format("book.mobi", "epub"));
        assert!(!matches_format("book", "epub"));
        assert!(!matches_format(".epub", "epub"));
    }

    #[test]
    fn clean_selection_passes() {
        let files = [selected("a.epub"), selected("B.EPUB")];
        assert!(check_files(&files, "epub").is_ok());
    }

    #[test]
    fn all_offenders_are_collected_in_order() {
        let files = [
            selected("a.pdf"),
            selected("b.epub"),
            selected("notes"),
            selected(".hidden"),
        ];
        let err = check_files(&files, "epub").unwrap_err();
        let BookpostError::FormatMismatch { rejected } = err else {
            panic!("expected FormatMismatch");
        };
        assert_eq!(rejected.len(), 3);
        assert_eq!(rejected[0].file_name, "a.pdf");
        assert_eq!(rejected[0].found.as_deref(), Some("pdf"));
        assert_eq!(rejected[1].file_name, "notes");
        assert_eq!(rejected[1].found, None);
        assert_eq!(rejected[2].file_name, ".hidden");
        assert_eq!(rejected[2].found, None);
    }

    #[test]
    fn reject_message_names_file_and_format() {
        let err = check_files(&[selected("report.pdf")], "epub").unwrap_err();
        let BookpostError::FormatMismatch { rejected } = err else {
            panic!("expected FormatMismatch");
        };
        assert_eq!(
            rejected[0].to_string(),
            "File \"report.pdf\" does not match the selected source format (.epub)."
        );
    }

    #[test]
    fn leading_dot_on_format_is_tolerated() {
        let files = [selected("a.epub")];
        assert!(check_files(&files, ".epub").is_ok());
        // The stored expectation drops the dot so messages stay uniform.
        let err = check_files(&[selected("a.mobi")], ".epub").unwrap_err();
        let BookpostError::FormatMismatch { rejected } = err else {
            panic!("expected FormatMismatch");
        };
        assert_eq!(rejected[0].expected, "epub");
    }
}
