//! Release note exclusion

use std::sync::LazyLock;

use regex::Regex;
use relnotes_gitlab::MergeRequest;

/// Label that opts a merge request out of release notes
pub const EXCLUDE_LABEL: &str = "release-note-none";

/// Description patterns that opt a merge request out of release notes
static EXCLUSION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // ```release-note``` block that is empty or says none, n/a or na
        Regex::new(r#"(?i)```release-notes?\s*('|")?(none|n/a|na)?('|")?\s*```"#)
            .expect("Invalid regex"),
        Regex::new(r"/release-note-none").expect("Invalid regex"),
    ]
});

/// Check whether a description carries an exclusion marker
pub fn matches_exclusion(description: &str) -> bool {
    EXCLUSION_PATTERNS.iter().any(|re| re.is_match(description))
}

/// Check whether a merge request must be left out of release notes
pub fn is_excluded(mr: &MergeRequest) -> bool {
    matches_exclusion(&mr.description) || mr.has_label(EXCLUDE_LABEL)
}
