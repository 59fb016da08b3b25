//! Human-readable mismatch reports.
//!
//! ```text
//! - <line only in the actual value>
//! + <line only in the stored value>
//! ------------------------------------------------------------------------------
//! Summary:
//!   > ["key"][0]: 1 != 2
//! ```

use similar::{ChangeTag, TextDiff};
use snappiershot_core::{json, Canonical};

use crate::divergence::DivergenceSet;

pub const RULE_WIDTH: usize = 78;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    /// Include unchanged lines in the diff.
    pub full_diff: bool,
    /// Spaces per indentation level of the pretty-printed values.
    pub indent: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            full_diff: false,
            indent: 4,
        }
    }
}

/// Render the line diff of two encoded values followed by the divergence summary.
pub fn render(
    actual: &Canonical,
    expected: &Canonical,
    divergences: &DivergenceSet,
    options: ReportOptions,
) -> String {
    let actual_text = pretty(actual, options.indent);
    let expected_text = pretty(expected, options.indent);

    let mut out = String::new();
    let diff = TextDiff::from_lines(&actual_text, &expected_text);
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "- ",
            ChangeTag::Insert => "+ ",
            ChangeTag::Equal if options.full_diff => "  ",
            ChangeTag::Equal => continue,
        };
        out.push_str(sign);
        out.push_str(change.value());
        if change.missing_newline() {
            out.push('\n');
        }
    }

    out.push_str(&"-".repeat(RULE_WIDTH));
    out.push('\n');
    out.push_str("Summary:\n");
    for divergence in divergences {
        out.push_str(&format!("  > {}: {}\n", divergence.path, divergence.message));
    }
    out
}

fn pretty(value: &Canonical, indent: usize) -> String {
    let mut text = json::to_string_indented(value, indent).unwrap_or_else(|_| value.to_string());
    text.push('\n');
    text
}
