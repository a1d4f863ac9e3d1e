//! Hunk grouping: turns an edit script into context-bounded hunks.

use crate::line_diff::{diff_rows, DiffRow, RowTag};
use crate::options::DiffOptions;

/// The result of diffing two texts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextDiff {
    /// The diff hunks, ordered by source line.
    pub hunks: Vec<DiffHunk>,
    /// Total number of lines in the old content.
    pub old_lines: usize,
    /// Total number of lines in the new content.
    pub new_lines: usize,
}

impl TextDiff {
    /// Diff `source` against `target` and group the changes into hunks.
    pub fn compute(source: &str, target: &str, options: &DiffOptions) -> Self {
        let rows = diff_rows(source, target);
        let hunks = group_hunks(&rows, options);
        Self {
            hunks,
            old_lines: rows.iter().filter(|r| r.in_source()).count(),
            new_lines: rows.iter().filter(|r| r.in_target()).count(),
        }
    }

    /// Returns `true` if the two texts are identical.
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    /// Lines removed and added across all hunks, as `(removed, added)`.
    pub fn line_counts(&self) -> (usize, usize) {
        self.hunks
            .iter()
            .flat_map(|hunk| &hunk.lines)
            .fold((0, 0), |(removed, added), line| match line {
                DiffLine::Removed(_) => (removed + 1, added),
                DiffLine::Added(_) => (removed, added + 1),
                _ => (removed, added),
            })
    }
}

/// A contiguous region of changes with surrounding context.
///
/// A side with zero lines in the hunk is anchored at the line before the
/// hunk, so a hunk against empty content starts at line 0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffHunk {
    pub old_start: usize,
    pub old_count: usize,
    pub new_start: usize,
    pub new_count: usize,
    pub lines: Vec<DiffLine>,
}

/// A single line in a diff hunk, without its terminator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffLine {
    /// A line present in both old and new (context).
    Context(String),
    /// A line added in the new content.
    Added(String),
    /// A line removed from the old content.
    Removed(String),
    /// The preceding line is the last of its side and has no newline.
    NoNewlineAtEof,
}

fn group_hunks(rows: &[DiffRow<'_>], options: &DiffOptions) -> Vec<DiffHunk> {
    let split_run = options.split_run();
    let context = options.context_lines;

    // (first, last) change row index of each hunk.
    let mut groups: Vec<(usize, usize)> = Vec::new();
    for (idx, row) in rows.iter().enumerate() {
        if row.tag == RowTag::Equal {
            continue;
        }
        match groups.last_mut() {
            Some((_, last)) if idx - *last - 1 < split_run => *last = idx,
            _ => groups.push((idx, idx)),
        }
    }

    // Lines of each side consumed before row i.
    let mut old_before = Vec::with_capacity(rows.len() + 1);
    let mut new_before = Vec::with_capacity(rows.len() + 1);
    let (mut old_seen, mut new_seen) = (0usize, 0usize);
    for row in rows {
        old_before.push(old_seen);
        new_before.push(new_seen);
        old_seen += usize::from(row.in_source());
        new_seen += usize::from(row.in_target());
    }
    old_before.push(old_seen);
    new_before.push(new_seen);

    groups
        .into_iter()
        .map(|(first, last)| {
            let start = first.saturating_sub(context);
            let end = (last + context).min(rows.len() - 1);
            let old_count = old_before[end + 1] - old_before[start];
            let new_count = new_before[end + 1] - new_before[start];
            DiffHunk {
                old_start: anchor(old_before[start], old_count),
                old_count,
                new_start: anchor(new_before[start], new_count),
                new_count,
                lines: hunk_lines(&rows[start..=end]),
            }
        })
        .collect()
}

fn anchor(lines_before: usize, count: usize) -> usize {
    if count == 0 {
        lines_before
    } else {
        lines_before + 1
    }
}

fn hunk_lines(rows: &[DiffRow<'_>]) -> Vec<DiffLine> {
    let mut lines = Vec::with_capacity(rows.len());
    for row in rows {
        let text = row.text.strip_suffix('\n');
        let body = text.unwrap_or(row.text).to_string();
        lines.push(match row.tag {
            RowTag::Equal => DiffLine::Context(body),
            RowTag::Removed => DiffLine::Removed(body),
            RowTag::Added => DiffLine::Added(body),
        });
        if text.is_none() {
            lines.push(DiffLine::NoNewlineAtEof);
        }
    }
    lines
}
