//! Release note types

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Release note category
///
/// Variants are declared in display order, so the derived `Ord` is the
/// order sections are rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// `fix`
    BugFix,
    /// `feat`
    NewFeatures,
    /// `refactor`
    Changes,
    /// `docs`
    Documentation,
    /// Everything else
    Other,
}

impl Category {
    /// All categories in display order
    pub const ALL: [Category; 5] = [
        Category::BugFix,
        Category::NewFeatures,
        Category::Changes,
        Category::Documentation,
        Category::Other,
    ];

    /// Map a conventional commit type to its category
    pub fn from_type(commit_type: &str) -> Self {
        match commit_type {
            "feat" => Self::NewFeatures,
            "fix" => Self::BugFix,
            "refactor" => Self::Changes,
            "docs" => Self::Documentation,
            _ => Self::Other,
        }
    }

    /// Section header used in single-project notes
    pub fn header(&self) -> &'static str {
        match self {
            Self::BugFix => "**Bug Fix:**",
            Self::NewFeatures => "_New Features:_",
            Self::Changes => "_Changes:_",
            Self::Documentation => "Documentation:",
            Self::Other => "Other:",
        }
    }

    /// Section header used in merged multi-project notes
    pub fn merged_header(&self) -> &'static str {
        match self {
            Self::BugFix => "**Bug Fixes:**",
            other => other.header(),
        }
    }

    /// Recognize a section header line (either bug fix spelling)
    pub fn from_header(line: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| {
            line.starts_with(c.header()) || line.starts_with(c.merged_header())
        })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BugFix => "Bug Fix",
            Self::NewFeatures => "New Features",
            Self::Changes => "Changes",
            Self::Documentation => "Documentation",
            Self::Other => "Other",
        };
        f.write_str(name)
    }
}

/// A classified note line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseNoteItem {
    /// Resolved category
    pub category: Category,
    /// Text listed under the category header
    pub summary: String,
}

impl ReleaseNoteItem {
    /// Create a new item
    pub fn new(category: Category, summary: impl Into<String>) -> Self {
        Self {
            category,
            summary: summary.into(),
        }
    }
}

/// Time window bounding a commit listing; either side may be open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitRange {
    /// Lower bound, the previous anchor's commit time
    pub since: Option<DateTime<Utc>>,
    /// Upper bound, the target tag's commit time
    pub until: Option<DateTime<Utc>>,
}

/// Outcome of one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseNotes {
    /// Whether the target tag already exists on the forge
    pub tag_exists: bool,
    /// Rendered markdown; empty when nothing qualifies
    pub markdown: String,
}

impl ReleaseNotes {
    /// Whether there is nothing to release
    pub fn is_empty(&self) -> bool {
        self.markdown.trim().is_empty()
    }
}

/// Note summaries grouped by category, insertion order kept per category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorizedNotes {
    sections: BTreeMap<Category, Vec<String>>,
}

impl CategorizedNotes {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a summary to a category
    pub fn push(&mut self, category: Category, summary: impl Into<String>) {
        self.sections.entry(category).or_default().push(summary.into());
    }

    /// Append every item of another collection, category by category
    pub fn extend(&mut self, other: CategorizedNotes) {
        for (category, items) in other.sections {
            self.sections.entry(category).or_default().extend(items);
        }
    }

    /// Items in a category
    pub fn get(&self, category: Category) -> &[String] {
        self.sections.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Non-empty categories in display order
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[String])> {
        self.sections
            .iter()
            .filter(|(_, items)| !items.is_empty())
            .map(|(c, items)| (*c, items.as_slice()))
    }

    /// Total number of items
    pub fn len(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }

    /// Check if there are no items
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<ReleaseNoteItem> for CategorizedNotes {
    fn from_iter<I: IntoIterator<Item = ReleaseNoteItem>>(iter: I) -> Self {
        let mut notes = Self::new();
        for item in iter {
            notes.push(item.category, item.summary);
        }
        notes
    }
}
