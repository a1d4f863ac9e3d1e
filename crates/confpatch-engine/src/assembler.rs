//! Git-style patch assembly for a single changed item.

use confpatch_diff::{diff_texts, DiffOptions};
use confpatch_types::{ChangeEntry, ChangeType, ContentHash, Namespace};

/// Placeholder path for the absent side of a create or delete.
pub const DEV_NULL: &str = "/dev/null";

/// File mode written into every index line.
pub const FILE_MODE: &str = "100644";

/// Turns one changelist entry plus its two encoded texts into patch text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatchAssembler {
    base_path: String,
    extension: String,
    diff_options: DiffOptions,
}

impl PatchAssembler {
    /// `base_path` is prefixed to every file path; surrounding `/` are ignored.
    pub fn new(base_path: &str, extension: &str, diff_options: DiffOptions) -> Self {
        Self {
            base_path: base_path.trim_matches('/').to_string(),
            extension: extension.trim_start_matches('.').to_string(),
            diff_options,
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn diff_options(&self) -> &DiffOptions {
        &self.diff_options
    }

    /// Repository-relative path of an item, without the `a/`/`b/` prefix.
    pub fn item_path(&self, namespace: &Namespace, name: &str) -> String {
        let mut segments = Vec::with_capacity(3);
        if !self.base_path.is_empty() {
            segments.push(self.base_path.clone());
        }
        if !namespace.is_default() {
            segments.push(namespace.path_segment());
        }
        segments.push(format!("{name}.{}", self.extension));
        segments.join("/")
    }

    /// Assemble the patch for `entry`.
    ///
    /// The `diff --git` line always names both real paths; the `---`/`+++`
    /// labels use `/dev/null` for the absent side of a create or delete.
    /// When the content is identical only the preamble is returned, except
    /// for a create or delete, which always carries its `---`/`+++` lines.
    pub fn assemble(
        &self,
        entry: &ChangeEntry,
        namespace: &Namespace,
        source: Option<&str>,
        target: Option<&str>,
    ) -> String {
        let from_file = format!("a/{}", self.item_path(namespace, entry.source_name()));
        let to_file = format!("b/{}", self.item_path(namespace, entry.target_name()));

        let mut patch = format!("diff --git {from_file} {to_file}\n");
        let (from_label, to_label) = match entry.change_type {
            ChangeType::Create => {
                patch.push_str(&format!("new file mode {FILE_MODE}\n"));
                (DEV_NULL, to_file.as_str())
            }
            ChangeType::Delete => {
                patch.push_str(&format!("deleted file mode {FILE_MODE}\n"));
                (from_file.as_str(), DEV_NULL)
            }
            ChangeType::Update | ChangeType::Rename => (from_file.as_str(), to_file.as_str()),
        };
        patch.push_str(&format!(
            "index {}..{} {FILE_MODE}\n",
            ContentHash::of(source).short_hex(),
            ContentHash::of(target).short_hex()
        ));
        let body = diff_texts(source, target, from_label, to_label, &self.diff_options);
        let adds_or_drops_file = matches!(entry.change_type, ChangeType::Create | ChangeType::Delete);
        if body.is_empty() && adds_or_drops_file && self.diff_options.file_headers {
            patch.push_str(&format!("--- {from_label}\n+++ {to_label}\n"));
        }
        patch.push_str(&body);
        patch
    }
}

impl Default for PatchAssembler {
    fn default() -> Self {
        Self::new("", "yml", DiffOptions::default())
    }
}
