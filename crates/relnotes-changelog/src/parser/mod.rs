//! Note classification

mod conventional;

pub use conventional::ConventionalParser;

use crate::types::ReleaseNoteItem;

/// Trait for note classifiers
pub trait NoteParser: Send + Sync {
    /// Classify a note line into a category and summary
    fn parse(&self, note: &str) -> ReleaseNoteItem;
}
