//! Input collection: the draft the user is editing and the submission built from it.

use std::path::Path;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File extensions the upload picker accepts.
pub const ACCEPTED_EXTENSIONS: [&str; 2] = ["txt", "md"];

#[derive(Debug, Error, PartialEq)]
pub enum UploadError {
    #[error("No file was provided")]
    MissingFile,

    #[error("Unsupported file type '{0}': upload a .txt or .md file")]
    UnsupportedType(String),
}

/// A validated `(content, title)` pair ready for evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub content: String,
    pub title: Option<String>,
}

impl Submission {
    /// Returns `None` when `content` is empty or whitespace-only; such submissions are
    /// suppressed. Content is kept as typed; a blank title becomes `None`.
    pub fn new(content: impl Into<String>, title: Option<String>) -> Option<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            return None;
        }
        let title = title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
        Some(Self { content, title })
    }
}

/// Monotonic token handed out when an upload starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct UploadTicket(u64);

/// Server-side copy of the form fields.
#[derive(Debug, Default, Clone)]
pub struct InputDraft {
    pub title: String,
    pub content: String,
    latest_upload: u64,
}

impl InputDraft {
    /// Records a manual edit of both fields.
    pub fn edit(&mut self, title: String, content: String) {
        self.title = title;
        self.content = content;
    }

    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    /// Starts an upload; any earlier ticket becomes stale.
    pub fn begin_upload(&mut self) -> UploadTicket {
        self.latest_upload += 1;
        UploadTicket(self.latest_upload)
    }

    pub fn is_current(&self, ticket: UploadTicket) -> bool {
        ticket.0 == self.latest_upload
    }

    /// Replaces the content with uploaded text if `ticket` is still the newest.
    /// The title is never touched. Returns whether the draft changed.
    pub fn complete_upload(&mut self, ticket: UploadTicket, text: String) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.content = text;
        true
    }

    pub fn clear(&mut self) {
        self.title.clear();
        self.content.clear();
    }
}

/// Checks the uploaded file name against `ACCEPTED_EXTENSIONS` (case-insensitive).
pub fn check_file_name(file_name: Option<&str>) -> Result<(), UploadError> {
    let name = file_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or(UploadError::MissingFile)?;
    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    if ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(UploadError::UnsupportedType(name.to_string()))
    }
}

/// Decodes uploaded bytes as text. Invalid UTF-8 sequences are replaced, never rejected.
pub fn decode_upload(raw: &Bytes) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_content_is_suppressed() {
        assert_eq!(Submission::new("   \n\t ", Some("Title".into())), None);
        assert_eq!(Submission::new("", None), None);
    }

    #[test]
    fn test_content_kept_untrimmed_and_blank_title_dropped() {
        let s = Submission::new("  Hello world\n", Some("  ".into())).unwrap();
        assert_eq!(s.content, "  Hello world\n");
        assert_eq!(s.title, None);
        let s = Submission::new("x", Some(" Vector DB Guide ".into())).unwrap();
        assert_eq!(s.title.as_deref(), Some("Vector DB Guide"));
    }

    #[test]
    fn test_upload_replaces_content_but_not_title() {
        let mut draft = InputDraft::default();
        draft.edit("My Title".into(), "manual edit".into());
        let ticket = draft.begin_upload();
        assert!(draft.complete_upload(ticket, "# From file\n\nBody".into()));
        assert_eq!(draft.content, "# From file\n\nBody");
        assert_eq!(draft.title, "My Title");
    }

    #[test]
    fn test_stale_upload_is_discarded() {
        let mut draft = InputDraft::default();
        let first = draft.begin_upload();
        let second = draft.begin_upload();
        assert!(draft.complete_upload(second, "second".into()));
        assert!(!draft.complete_upload(first, "first".into()));
        assert_eq!(draft.content, "second");
    }

    #[test]
    fn test_file_name_filter() {
        assert_eq!(check_file_name(Some("notes.md")), Ok(()));
        assert_eq!(check_file_name(Some("ARTICLE.TXT")), Ok(()));
        assert_eq!(
            check_file_name(Some("report.pdf")),
            Err(UploadError::UnsupportedType("report.pdf".into()))
        );
        assert_eq!(
            check_file_name(Some("README")),
            Err(UploadError::UnsupportedType("README".into()))
        );
        assert_eq!(check_file_name(None), Err(UploadError::MissingFile));
    }

    #[test]
    fn test_decode_is_lossy() {
        let raw = Bytes::from_static(b"caf\xc3\xa9 \xff");
        assert_eq!(decode_upload(&raw), "café \u{fffd}");
    }

    #[test]
    fn test_char_count_counts_chars_not_bytes() {
        let mut draft = InputDraft::default();
        draft.edit(String::new(), "héllo".into());
        assert_eq!(draft.char_count(), 5);
    }
}
