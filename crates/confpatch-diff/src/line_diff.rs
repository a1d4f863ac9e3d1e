//! Line-level edit script between two texts.
//!
//! Lines keep their terminators, so `"a"` and `"a\n"` are different lines and
//! a missing trailing newline shows up as a change.

use similar::{capture_diff_slices, Algorithm, DiffTag};

/// Classification of one row of the edit script.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowTag {
    /// Present on both sides.
    Equal,
    /// Present in the source only.
    Removed,
    /// Present in the target only.
    Added,
}

/// One line of the edit script, terminator included.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffRow<'a> {
    pub tag: RowTag,
    pub text: &'a str,
}

impl DiffRow<'_> {
    /// Whether the row consumes a source line.
    pub fn in_source(&self) -> bool {
        self.tag != RowTag::Added
    }

    /// Whether the row consumes a target line.
    pub fn in_target(&self) -> bool {
        self.tag != RowTag::Removed
    }
}

/// Split text into lines, keeping each line's `\n`.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

/// Compute the edit script turning `source` into `target`.
///
/// Uses an LCS line diff. Within a changed block every removed line precedes
/// every added line.
pub fn diff_rows<'a>(source: &'a str, target: &'a str) -> Vec<DiffRow<'a>> {
    let old = split_lines(source);
    let new = split_lines(target);
    let ops = capture_diff_slices(Algorithm::Lcs, &old, &new);

    let mut rows = Vec::with_capacity(old.len().max(new.len()));
    let mut push = |tag: RowTag, lines: &[&'a str]| {
        rows.extend(lines.iter().map(|&text| DiffRow { tag, text }));
    };
    for op in &ops {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => push(RowTag::Equal, &old[old_range]),
            DiffTag::Delete => push(RowTag::Removed, &old[old_range]),
            DiffTag::Insert => push(RowTag::Added, &new[new_range]),
            DiffTag::Replace => {
                push(RowTag::Removed, &old[old_range]);
                push(RowTag::Added, &new[new_range]);
            }
        }
    }
    group_changes(&mut rows);
    rows
}

/// Order each block of consecutive changes as removals then additions.
fn group_changes(rows: &mut [DiffRow<'_>]) {
    let mut start = 0;
    while start < rows.len() {
        if rows[start].tag == RowTag::Equal {
            start += 1;
            continue;
        }
        let end = rows[start..]
            .iter()
            .position(|r| r.tag == RowTag::Equal)
            .map_or(rows.len(), |offset| start + offset);
        // Stable: relative order within each side is kept.
        rows[start..end].sort_by_key(|r| r.tag == RowTag::Added);
        start = end;
    }
}
