//! Strict unified-diff rendering.

use crate::hunk::{DiffHunk, DiffLine, TextDiff};
use crate::options::DiffOptions;

/// Marker line emitted after a line that lacks a trailing newline.
pub const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file";

/// Diff two texts and render the result as a unified diff.
///
/// `None` is treated as empty content. Identical inputs produce an empty
/// string; otherwise the output starts with the `---`/`+++` lines (unless
/// disabled in `options`) followed by one `@@` block per hunk.
pub fn diff_texts(
    source: Option<&str>,
    target: Option<&str>,
    from_label: &str,
    to_label: &str,
    options: &DiffOptions,
) -> String {
    let diff = TextDiff::compute(source.unwrap_or(""), target.unwrap_or(""), options);
    render_unified(&diff, from_label, to_label, options)
}

/// Render a computed diff.
pub fn render_unified(
    diff: &TextDiff,
    from_label: &str,
    to_label: &str,
    options: &DiffOptions,
) -> String {
    if diff.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    if options.file_headers {
        out.push_str(&format!("--- {from_label}\n+++ {to_label}\n"));
    }
    for hunk in &diff.hunks {
        out.push_str(&hunk_header(hunk, options.collapse_ranges));
        for line in &hunk.lines {
            match line {
                DiffLine::Context(text) => push_line(&mut out, ' ', text),
                DiffLine::Added(text) => push_line(&mut out, '+', text),
                DiffLine::Removed(text) => push_line(&mut out, '-', text),
                DiffLine::NoNewlineAtEof => {
                    out.push_str(NO_NEWLINE_MARKER);
                    out.push('\n');
                }
            }
        }
    }
    out
}

fn push_line(out: &mut String, prefix: char, text: &str) {
    out.push(prefix);
    out.push_str(text);
    out.push('\n');
}

fn hunk_header(hunk: &DiffHunk, collapse_ranges: bool) -> String {
    format!(
        "@@ -{} +{} @@\n",
        range(hunk.old_start, hunk.old_count, collapse_ranges),
        range(hunk.new_start, hunk.new_count, collapse_ranges)
    )
}

fn range(start: usize, count: usize, collapse: bool) -> String {
    if collapse && count == 1 {
        start.to_string()
    } else {
        format!("{start},{count}")
    }
}
