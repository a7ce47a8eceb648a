//! Markdown release note formatter

use relnotes_gitlab::MergeRequest;
use tracing::{debug, instrument};

use super::NotesFormatter;
use crate::types::{CategorizedNotes, ReleaseNoteItem};

/// Markdown formatter producing one section per non-empty category
///
/// Each section is its header line followed by `- ` items; sections are
/// separated by a blank line. Headers are consumed verbatim by
/// [`parse_release_notes`](crate::merge::parse_release_notes).
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    /// Create a new markdown formatter
    pub fn new() -> Self {
        Self
    }
}

impl NotesFormatter for MarkdownFormatter {
    #[instrument(skip(self, items), fields(item_count = items.len()))]
    fn format(&self, items: &[ReleaseNoteItem]) -> String {
        let notes: CategorizedNotes = items.iter().cloned().collect();

        let sections: Vec<String> = notes
            .iter()
            .map(|(category, summaries)| {
                let mut section = String::from(category.header());
                section.push('\n');
                for summary in summaries {
                    section.push_str("- ");
                    section.push_str(summary);
                    section.push('\n');
                }
                section
            })
            .collect();

        debug!(section_count = sections.len(), "release notes formatted");
        sections.join("\n")
    }
}

/// Note line listed for a merge request
pub fn note_line(mr: &MergeRequest) -> String {
    format!(
        "{} ([!{}]({})) @{}",
        mr.title, mr.iid, mr.web_url, mr.author.username
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    #[test]
    fn test_format_fixed_order() {
        let items = vec![
            ReleaseNoteItem::new(Category::Other, "bump deps"),
            ReleaseNoteItem::new(Category::NewFeatures, "api: add X"),
            ReleaseNoteItem::new(Category::BugFix, "crash"),
            ReleaseNoteItem::new(Category::NewFeatures, "export"),
        ];

        let output = MarkdownFormatter::new().format(&items);
        assert_eq!(
            output,
            "**Bug Fix:**\n- crash\n\n_New Features:_\n- api: add X\n- export\n\nOther:\n- bump deps\n"
        );
    }

    #[test]
    fn test_format_empty() {
        assert_eq!(MarkdownFormatter::new().format(&[]), "");
    }

    #[test]
    fn test_format_is_deterministic() {
        let items = vec![
            ReleaseNoteItem::new(Category::Documentation, "a"),
            ReleaseNoteItem::new(Category::Changes, "b"),
            ReleaseNoteItem::new(Category::Documentation, "c"),
        ];
        let formatter = MarkdownFormatter::new();
        assert_eq!(formatter.format(&items), formatter.format(&items));
        assert_eq!(
            formatter.format(&items),
            "_Changes:_\n- b\n\nDocumentation:\n- a\n- c\n"
        );
    }

    #[test]
    fn test_note_line() {
        let mr = MergeRequest::new(11, "fix: handle empty input", "jdoe")
            .with_web_url("https://gitlab.com/g/a/-/merge_requests/11");
        assert_eq!(
            note_line(&mr),
            "fix: handle empty input ([!11](https://gitlab.com/g/a/-/merge_requests/11)) @jdoe"
        );
    }
}
