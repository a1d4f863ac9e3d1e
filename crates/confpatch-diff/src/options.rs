use serde::{Deserialize, Serialize};

/// Options controlling hunk grouping and header rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    /// Unchanged lines shown before and after each change.
    pub context_lines: usize,
    /// Minimum run of unchanged lines that closes a hunk and opens a new one.
    /// Shorter runs are kept inside a single hunk.
    pub common_line_threshold: usize,
    /// Render a one-line range as `N` instead of `N,1`.
    pub collapse_ranges: bool,
    /// Emit the `---`/`+++` file header lines before the first hunk.
    pub file_headers: bool,
}

impl DiffOptions {
    /// Length of the unchanged run at which two changes land in separate
    /// hunks. Never smaller than twice the context, so hunks cannot overlap.
    pub fn split_run(&self) -> usize {
        self.common_line_threshold
            .max(self.context_lines * 2)
            .max(1)
    }
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            context_lines: 3,
            common_line_threshold: 6,
            collapse_ranges: false,
            file_headers: true,
        }
    }
}
