//! Turns a plain-text page body into a short summary.

use regex::Regex;
use std::sync::OnceLock;

/// Characters of the page body considered for the summary.
pub const SUMMARY_SOURCE_CHARS: usize = 1000;

const HEADING_MARKER: &str = "==";

fn annotation_patterns() -> &'static [Regex; 2] {
    static PATTERNS: OnceLock<[Regex; 2]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"\([^()]*\)").expect("valid parenthetical regex"),
            Regex::new(r"\{[^{}]*\}").expect("valid braces regex"),
        ]
    })
}

/// Builds the summary: first 1000 characters, whole sentences only, cut at the first section heading,
/// fragments of three characters or fewer dropped, parenthetical and braced annotations removed.
pub fn summarize(content: &str) -> String {
    let head: String = content.chars().take(SUMMARY_SOURCE_CHARS).collect();

    let mut fragments: Vec<&str> = head.split('.').collect();
    // The last fragment is either empty or a sentence cut by the character limit.
    fragments.pop();

    let mut summary = String::new();
    for fragment in fragments {
        if fragment.contains(HEADING_MARKER) {
            break;
        }
        if fragment.trim().chars().count() > 3 {
            summary.push_str(fragment);
            summary.push('.');
        }
    }

    // Repeat until stable so nested annotations like `{{ref}}` go away completely.
    for pattern in annotation_patterns() {
        while pattern.is_match(&summary) {
            summary = pattern.replace_all(&summary, "").into_owned();
        }
    }
    summary
}
