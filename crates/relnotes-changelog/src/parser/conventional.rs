//! Conventional commit classifier
//!
//! Classifies note lines shaped like `type(scope): summary`. The type picks
//! the category; a scope other than `*` is kept in front of the summary.

use regex::Regex;
use std::sync::LazyLock;

use super::NoteParser;
use crate::types::{Category, ReleaseNoteItem};

/// Regex for a `type(scope)` tag
static SCOPED_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^( ]+)\((.*)\)$").expect("Invalid regex"));

/// Parser for conventional commit shaped notes
#[derive(Debug, Default, Clone, Copy)]
pub struct ConventionalParser;

impl ConventionalParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self
    }
}

impl NoteParser for ConventionalParser {
    fn parse(&self, note: &str) -> ReleaseNoteItem {
        let (tag, summary) = match note.split_once(':') {
            Some((tag, summary)) => (tag.trim(), summary.trim()),
            None => ("", note.trim()),
        };

        let mut commit_type = tag;
        let mut summary = summary.to_string();

        if tag.contains('(') {
            if let Some(caps) = SCOPED_TAG_REGEX.captures(tag) {
                if let (Some(t), Some(scope)) = (caps.get(1), caps.get(2)) {
                    commit_type = t.as_str();
                    let scope = scope.as_str();
                    if !scope.is_empty() && scope != "*" {
                        summary = format!("{}: {}", scope, summary);
                    }
                }
            }
        }

        let category = Category::from_type(commit_type);

        // Prose before the first colon is not a tag
        if commit_type.contains(' ') {
            summary = note.to_string();
        }

        ReleaseNoteItem { category, summary }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(note: &str) -> ReleaseNoteItem {
        ConventionalParser::new().parse(note)
    }

    #[test]
    fn test_parse_scoped_feat() {
        let item = parse("feat(api): add X");
        assert_eq!(item.category, Category::NewFeatures);
        assert_eq!(item.summary, "api: add X");
    }

    #[test]
    fn test_parse_simple_types() {
        assert_eq!(parse("fix: crash").category, Category::BugFix);
        assert_eq!(parse("refactor: split module").category, Category::Changes);
        assert_eq!(parse("docs: readme").category, Category::Documentation);

        let item = parse("chore: bump deps");
        assert_eq!(item.category, Category::Other);
        assert_eq!(item.summary, "bump deps");
    }

    #[test]
    fn test_parse_without_colon() {
        let item = parse("no colon here");
        assert_eq!(item.category, Category::Other);
        assert_eq!(item.summary, "no colon here");
    }

    #[test]
    fn test_parse_wildcard_and_empty_scope() {
        let item = parse("fix(*): everywhere");
        assert_eq!(item.category, Category::BugFix);
        assert_eq!(item.summary, "everywhere");

        let item = parse("fix(): nothing");
        assert_eq!(item.category, Category::BugFix);
        assert_eq!(item.summary, "nothing");
    }

    #[test]
    fn test_parse_prose_before_colon() {
        let note = "Update docs: add FAQ ([!3](https://x/3)) @dev";
        let item = parse(note);
        assert_eq!(item.category, Category::Other);
        assert_eq!(item.summary, note);
    }

    #[test]
    fn test_parse_scope_with_space_keeps_scope() {
        let item = parse("feat(ui kit): buttons");
        assert_eq!(item.category, Category::NewFeatures);
        assert_eq!(item.summary, "ui kit: buttons");
    }

    #[test]
    fn test_parse_malformed_scope() {
        let item = parse("feat (api): spaced");
        assert_eq!(item.category, Category::Other);
        assert_eq!(item.summary, "feat (api): spaced");
    }

    #[test]
    fn test_parse_full_note_line() {
        let item = parse("fix: handle empty input ([!11](https://gitlab.com/g/a/-/merge_requests/11)) @jdoe");
        assert_eq!(item.category, Category::BugFix);
        assert_eq!(
            item.summary,
            "handle empty input ([!11](https://gitlab.com/g/a/-/merge_requests/11)) @jdoe"
        );
    }
}
