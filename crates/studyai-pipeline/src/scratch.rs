//! Per-request scratch files for uploaded documents
//!
//! Each upload gets a uniquely named file, so concurrent requests never
//! share a path. The file is removed when the guard is dropped or
//! explicitly cleaned up.

use std::io::Write;
use std::path::Path;
use studyai_core::Result;
use tempfile::NamedTempFile;

/// Scratch copy of an uploaded file, deleted on drop
#[derive(Debug)]
pub struct ScratchFile {
    file: NamedTempFile,
}

impl ScratchFile {
    /// Write `bytes` to a new file inside `dir`
    pub fn create(dir: &Path, bytes: &[u8]) -> Result<Self> {
        std::fs::create_dir_all(dir)?;

        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(".pdf")
            .tempfile_in(dir)?;
        file.write_all(bytes)?;
        file.flush()?;

        tracing::debug!(path = %file.path().display(), bytes = bytes.len(), "Wrote scratch file");
        Ok(Self { file })
    }

    /// Path of the scratch file
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Remove the file now, logging instead of failing if removal errors
    pub fn cleanup(self) {
        let path = self.file.path().to_path_buf();
        match self.file.close() {
            Ok(()) => tracing::debug!(path = %path.display(), "Removed scratch file"),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove scratch file")
            }
        }
    }
}
