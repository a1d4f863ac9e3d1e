//! Directory-backed configuration store.
//!
//! Layout under the root directory:
//!
//! ```text
//! system.site.yml            default namespace, item "system.site"
//! language/fr/system.site.yml  namespace "language.fr"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use confpatch_types::Namespace;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{StoreError, StoreResult};
use crate::item::ConfigItem;
use crate::traits::ConfigStore;

/// Default file extension for configuration items.
pub const DEFAULT_EXTENSION: &str = "yml";

/// Read-only store over a directory of YAML files.
///
/// Names and namespaces are enumerated in lexical order so that listings are
/// stable across platforms.
#[derive(Clone, Debug)]
pub struct FileConfigStore {
    root: PathBuf,
    extension: String,
}

impl FileConfigStore {
    /// Open a store rooted at `root` using the `.yml` extension.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        Self::with_extension(root, DEFAULT_EXTENSION)
    }

    /// Open a store with a custom item file extension (without the dot).
    pub fn with_extension(root: impl Into<PathBuf>, extension: &str) -> StoreResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("not a directory: {}", root.display()),
            )));
        }
        Ok(Self {
            root,
            extension: extension.trim_start_matches('.').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn namespace_dir(&self, namespace: &Namespace) -> PathBuf {
        if namespace.is_default() {
            self.root.clone()
        } else {
            self.root.join(namespace.path_segment())
        }
    }

    fn item_path(&self, namespace: &Namespace, name: &str) -> PathBuf {
        self.namespace_dir(namespace)
            .join(format!("{name}.{}", self.extension))
    }

    fn item_name(&self, path: &Path) -> Option<String> {
        if path.extension()?.to_str()? != self.extension {
            return None;
        }
        path.file_stem()?.to_str().map(str::to_string)
    }
}

impl ConfigStore for FileConfigStore {
    fn list_namespaces(&self) -> StoreResult<Vec<Namespace>> {
        let mut namespaces = Vec::new();
        let mut walker = WalkDir::new(&self.root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter();
        while let Some(entry) = walker.next() {
            let entry = entry?;
            if !entry.file_type().is_dir() {
                continue;
            }
            // Namespace segments are joined with '.', so a dotted or
            // non-UTF-8 directory cannot round-trip to its own path.
            let Some(dir_name) = entry.file_name().to_str().filter(|n| !n.contains('.')) else {
                warn!(path = %entry.path().display(), "directory cannot name a namespace, skipping");
                walker.skip_current_dir();
                continue;
            };
            debug!(dir = dir_name, depth = entry.depth(), "scanning directory");
            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .map_err(|_| StoreError::InvalidName(entry.path().display().to_string()))?;
            let segments: Option<Vec<&str>> =
                relative.components().map(|c| c.as_os_str().to_str()).collect();
            let Some(segments) = segments else {
                continue;
            };
            let namespace = Namespace::new(segments.join("."));
            if !self.list_names(&namespace)?.is_empty() {
                namespaces.push(namespace);
            }
        }
        debug!(root = %self.root.display(), count = namespaces.len(), "listed namespaces");
        Ok(namespaces)
    }

    fn list_names(&self, namespace: &Namespace) -> StoreResult<Vec<String>> {
        let dir = self.namespace_dir(namespace);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = self.item_name(&entry.path()) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    fn read(&self, namespace: &Namespace, name: &str) -> StoreResult<Option<ConfigItem>> {
        let path = self.item_path(namespace, name);
        if !path.is_file() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path)?;
        if text.trim().is_empty() {
            return Ok(Some(ConfigItem::new()));
        }
        let item = serde_yaml::from_str::<ConfigItem>(&text).map_err(|e| StoreError::Parse {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Ok(Some(item))
    }
}
