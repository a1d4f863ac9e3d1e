//! Diff engine for confpatch.
//!
//! Computes a line-level LCS diff between two texts and renders it as a
//! strict unified diff: hunk boundaries depend only on two tunables
//! ([`DiffOptions::context_lines`] and [`DiffOptions::common_line_threshold`]),
//! and hunk headers always carry explicit line counts.
//!
//! # Key Types
//!
//! - [`DiffOptions`] -- hunk grouping and rendering options
//! - [`TextDiff`] / [`DiffHunk`] / [`DiffLine`] -- structured diff
//! - [`diff_texts`] -- one-shot text-in, patch-text-out entry point

pub mod hunk;
pub mod line_diff;
pub mod options;
pub mod unified;

pub use hunk::{DiffHunk, DiffLine, TextDiff};
pub use line_diff::{diff_rows, DiffRow, RowTag};
pub use options::DiffOptions;
pub use unified::{diff_texts, render_unified, NO_NEWLINE_MARKER};
