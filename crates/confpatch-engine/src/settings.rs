use std::fs;
use std::path::{Path, PathBuf};

use confpatch_diff::DiffOptions;
use serde::{Deserialize, Serialize};

use crate::assembler::PatchAssembler;
use crate::detector::DetectorOptions;
use crate::error::{EngineError, EngineResult};

/// Where generated patches are delivered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Concatenated patch text on a stream.
    #[default]
    Text,
    /// Concatenated patch text written to `output_path`.
    File,
}

/// Patch generation settings, usually loaded from a TOML file.
///
/// ```toml
/// config_base_path = "config/sync"
/// output = "file"
/// output_path = "changes.patch"
///
/// [diff]
/// context_lines = 3
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchSettings {
    /// Directory prefix of every patched file, relative to the repository root.
    pub config_base_path: String,
    pub file_extension: String,
    pub output: OutputKind,
    pub output_path: Option<PathBuf>,
    pub diff: DiffOptions,
    pub detector: DetectorOptions,
}

impl Default for PatchSettings {
    fn default() -> Self {
        Self {
            config_base_path: String::new(),
            file_extension: "yml".to_string(),
            output: OutputKind::Text,
            output_path: None,
            diff: DiffOptions::default(),
            detector: DetectorOptions::default(),
        }
    }
}

impl PatchSettings {
    pub fn from_toml_str(text: &str) -> EngineResult<Self> {
        toml::from_str(text).map_err(|e| EngineError::Settings(e.to_string()))
    }

    pub fn load(path: &Path) -> EngineResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| EngineError::Settings(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> EngineResult<String> {
        toml::to_string_pretty(self).map_err(|e| EngineError::Settings(e.to_string()))
    }

    /// Base path with leading and trailing `/` removed.
    pub fn base_path(&self) -> &str {
        self.config_base_path.trim_matches('/')
    }

    pub fn assembler(&self) -> PatchAssembler {
        PatchAssembler::new(self.base_path(), &self.file_extension, self.diff.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings() {
        let s = PatchSettings::default();
        assert_eq!(s.base_path(), "");
        assert_eq!(s.file_extension, "yml");
        assert_eq!(s.output, OutputKind::Text);
        assert!(s.output_path.is_none());
        assert_eq!(s.diff.context_lines, 3);
        assert_eq!(s.diff.common_line_threshold, 6);
        assert!(!s.diff.collapse_ranges);
        assert!(s.detector.rename_requires_identical_content);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let s = PatchSettings::from_toml_str(
            r#"
            config_base_path = "/config/sync/"
            output = "file"
            output_path = "out.patch"

            [diff]
            collapse_ranges = true
            "#,
        )
        .unwrap();
        assert_eq!(s.base_path(), "config/sync");
        assert_eq!(s.output, OutputKind::File);
        assert_eq!(s.output_path, Some(PathBuf::from("out.patch")));
        assert!(s.diff.collapse_ranges);
        assert_eq!(s.diff.context_lines, 3);
        assert_eq!(s.file_extension, "yml");
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(PatchSettings::from_toml_str("").unwrap(), PatchSettings::default());
    }

    #[test]
    fn unknown_output_is_rejected() {
        let err = PatchSettings::from_toml_str(r#"output = "mail""#).unwrap_err();
        assert!(matches!(err, EngineError::Settings(_)));
    }

    #[test]
    fn toml_roundtrip() {
        let mut s = PatchSettings::default();
        s.config_base_path = "sync".into();
        s.diff.context_lines = 1;
        let text = s.to_toml_string().unwrap();
        assert_eq!(PatchSettings::from_toml_str(&text).unwrap(), s);
    }

    #[test]
    fn load_missing_file_is_settings_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = PatchSettings::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, EngineError::Settings(_)));
    }

    #[test]
    fn assembler_uses_trimmed_base_path() {
        let s = PatchSettings {
            config_base_path: "/sync/".into(),
            ..PatchSettings::default()
        };
        assert_eq!(s.assembler().base_path(), "sync");
    }
}
