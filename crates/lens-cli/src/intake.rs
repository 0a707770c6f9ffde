//! File intake from the local filesystem
//!
//! Only metadata is read. Contents never leave the disk.

use anyhow::Context;
use lens_evidence::{EvidenceKind, FileHandle};
use std::path::Path;

/// A file on disk, reduced to what the evidence queue needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FsFile {
    name: String,
    size_bytes: u64,
}

impl FsFile {
    /// Stat `path`
    pub(crate) fn open(path: &Path) -> anyhow::Result<Self> {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("cannot read evidence file {}", path.display()))?;
        anyhow::ensure!(metadata.is_file(), "{} is not a file", path.display());

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        if !EvidenceKind::from_name(&name).is_accepted() {
            tracing::warn!(file = %name, "extension not in the accepted list, adding anyway");
        }
        Ok(Self {
            name,
            size_bytes: metadata.len(),
        })
    }
}

impl FileHandle for FsFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size_bytes(&self) -> u64 {
        self.size_bytes
    }
}

/// Stat every path, failing on the first unreadable one
pub(crate) fn open_all<P: AsRef<Path>>(paths: &[P]) -> anyhow::Result<Vec<FsFile>> {
    paths.iter().map(|p| FsFile::open(p.as_ref())).collect()
}
