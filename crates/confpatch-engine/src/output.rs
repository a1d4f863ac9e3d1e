//! Delivery of collected patches.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use confpatch_types::{Changelist, PatchDocument};
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::settings::{OutputKind, PatchSettings};

/// A destination for a patch document.
pub trait PatchOutput: Send + Sync {
    /// Stable identifier, matching the settings value that selects it.
    fn id(&self) -> &'static str;

    /// Human-readable name.
    fn label(&self) -> &'static str;

    /// Deliver every patch in `document`. `changes` is the changelist the
    /// document was built from.
    fn deliver(&self, document: &PatchDocument, changes: &Changelist) -> EngineResult<()>;
}

/// Writes the concatenated patch text to a stream.
pub struct TextOutput<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> TextOutput<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> EngineResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| EngineError::Output(io::Error::other(format!("output lock poisoned: {e}"))))
    }
}

impl TextOutput<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> PatchOutput for TextOutput<W> {
    fn id(&self) -> &'static str {
        "text"
    }

    fn label(&self) -> &'static str {
        "Text"
    }

    fn deliver(&self, document: &PatchDocument, _changes: &Changelist) -> EngineResult<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| EngineError::Output(io::Error::other(format!("output lock poisoned: {e}"))))?;
        writer.write_all(document.concatenated().as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

/// Writes the concatenated patch text to a file, replacing it.
#[derive(Clone, Debug)]
pub struct FileOutput {
    path: PathBuf,
}

impl FileOutput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PatchOutput for FileOutput {
    fn id(&self) -> &'static str {
        "file"
    }

    fn label(&self) -> &'static str {
        "File"
    }

    fn deliver(&self, document: &PatchDocument, changes: &Changelist) -> EngineResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, document.concatenated())?;
        info!(
            path = %self.path.display(),
            changes = changes.len(),
            "wrote patch file"
        );
        Ok(())
    }
}

/// Build the output selected by `settings`. Text goes to stdout.
pub fn output_for(settings: &PatchSettings) -> EngineResult<Box<dyn PatchOutput>> {
    match settings.output {
        OutputKind::Text => Ok(Box::new(TextOutput::stdout())),
        OutputKind::File => {
            let path = settings
                .output_path
                .clone()
                .ok_or_else(|| EngineError::Settings("file output requires output_path".into()))?;
            Ok(Box::new(FileOutput::new(path)))
        }
    }
}
