//! Release note formatters

mod markdown;

pub use markdown::{note_line, MarkdownFormatter};

use crate::types::ReleaseNoteItem;

/// Trait for release note formatters
pub trait NotesFormatter: Send + Sync {
    /// Render classified items into a document
    fn format(&self, items: &[ReleaseNoteItem]) -> String;
}
