//! Line diff for schema previews

use similar::{ChangeTag, TextDiff};

/// One line of diff output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    /// Present in both
    Same(String),
    /// Only in the new text
    Added(String),
    /// Only in the old text
    Removed(String),
}

/// Diff `old` against `new` line by line
pub fn diff_lines(old: &str, new: &str) -> Vec<DiffLine> {
    // Without a trailing newline the last line never matches a moved copy of itself
    let old = newline_terminated(old);
    let new = newline_terminated(new);

    TextDiff::from_lines(old.as_str(), new.as_str())
        .iter_all_changes()
        .map(|change| {
            let line = change.value().trim_end_matches('\n').to_string();
            match change.tag() {
                ChangeTag::Equal => DiffLine::Same(line),
                ChangeTag::Insert => DiffLine::Added(line),
                ChangeTag::Delete => DiffLine::Removed(line),
            }
        })
        .collect()
}

fn newline_terminated(text: &str) -> String {
    if text.is_empty() || text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{text}\n")
    }
}
