//! Re-parsing rendered notes and merging them across projects

use crate::types::{CategorizedNotes, Category};

/// Parse rendered release notes back into categorized items
///
/// A line starting with a section header switches the current category;
/// `-` lines under a category become items. With a project name, each item
/// is prefixed `**<project>**: `.
pub fn parse_release_notes(markdown: &str, project_name: Option<&str>) -> CategorizedNotes {
    let mut notes = CategorizedNotes::new();
    let mut current = None;

    for line in markdown.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(category) = Category::from_header(line) {
            current = Some(category);
            continue;
        }

        if let (Some(item), Some(category)) = (line.strip_prefix('-'), current) {
            let item = item.trim();
            match project_name {
                Some(project) => notes.push(category, format!("**{}**: {}", project, item)),
                None => notes.push(category, item),
            }
        }
    }

    notes
}

/// Merge per-project notes into one document
///
/// Items keep project order within each category. The bug fix section uses
/// the plural header.
pub fn merge_categorized_notes(
    all_notes: impl IntoIterator<Item = CategorizedNotes>,
    product_name: Option<&str>,
) -> String {
    let mut merged = CategorizedNotes::new();
    for notes in all_notes {
        merged.extend(notes);
    }

    let mut lines = Vec::new();
    if let Some(product) = product_name.filter(|p| !p.is_empty()) {
        lines.push(format!("# {} Release Notes\n", product));
    }

    for (category, items) in merged.iter() {
        lines.push(category.merged_header().to_string());
        lines.extend(items.iter().map(|item| format!("- {}", item)));
        lines.push(String::new());
    }

    lines.join("\n")
}
