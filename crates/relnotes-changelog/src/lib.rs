//! relnotes changelog - release note derivation
//!
//! This crate turns forge history into categorized markdown: it resolves the
//! commit range for a tag, maps merge commits to merge requests, drops opted
//! out requests, classifies the rest and renders them.

pub mod filter;
pub mod formatter;
pub mod merge;
pub mod parser;
pub mod pipeline;
pub mod range;
pub mod reporter;
pub mod resolver;
pub mod types;

#[cfg(test)]
mod testing;

pub use formatter::{MarkdownFormatter, NotesFormatter};
pub use merge::{merge_categorized_notes, parse_release_notes};
pub use parser::{ConventionalParser, NoteParser};
pub use pipeline::{generate_release_notes, PipelineOptions, ReleaseNotesPipeline};
pub use reporter::{
    CollectingReporter, PipelineEvent, PipelineReporter, PipelineReporterRegistry,
    TracingReporter,
};
pub use types::{CategorizedNotes, Category, CommitRange, ReleaseNoteItem, ReleaseNotes};
