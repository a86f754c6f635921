//! Scratch working tree for one diff or patch run
//!
//! Each run owns a freshly named scratch directory with two mirrored roots:
//!
//! ```text
//! jarpatch-XXXXXX/
//! ├── original/    # extracted original archive (diff runs)
//! └── edited/      # disassembled edits (diff runs), or
//!     patched/     # archive being patched (patch runs)
//! ```
//!
//! The directory is removed when the [`WorkingTree`] is dropped, whichever
//! way the run ends. While it is alive it is also registered with the
//! interrupt handler, which removes it before the process exits on Ctrl+C.

pub mod interrupt;

use std::env;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::archive::{ArchiveListing, Archiver};
use crate::error::{JarpatchError, Result};

/// Root holding the extracted original archive
pub const ORIGINAL_DIR: &str = "original";

/// Which counterpart root a run works with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counterpart {
    /// Disassembled edits, diffed against `original`
    Edited,
    /// Extracted archive that the bundle is applied to
    Patched,
}

impl Counterpart {
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Edited => "edited",
            Self::Patched => "patched",
        }
    }
}

/// Scratch directory with an `original` and a counterpart root
#[derive(Debug)]
pub struct WorkingTree {
    scratch: Option<TempDir>,
    root: PathBuf,
    counterpart: Counterpart,
}

impl WorkingTree {
    /// Allocate a uniquely named scratch directory
    pub fn create(counterpart: Counterpart) -> Result<Self> {
        let scratch = tempfile::Builder::new()
            .prefix("jarpatch-")
            .tempdir_in(temp_dir_base())
            .map_err(|e| JarpatchError::ScratchAllocationFailed {
                reason: e.to_string(),
            })?;

        let root = scratch.path().to_path_buf();
        interrupt::register(&root);

        Ok(Self {
            scratch: Some(scratch),
            root,
            counterpart,
        })
    }

    /// Scratch directory holding both roots
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn original(&self) -> PathBuf {
        self.root.join(ORIGINAL_DIR)
    }

    pub fn counterpart(&self) -> PathBuf {
        self.root.join(self.counterpart.dir_name())
    }

    pub fn counterpart_name(&self) -> &'static str {
        self.counterpart.dir_name()
    }

    /// Extract every archive member into the `original` root
    pub fn materialize_original(
        &self,
        archiver: &dyn Archiver,
        archive: &Path,
    ) -> Result<ArchiveListing> {
        archiver.extract(archive, &self.original())
    }

    /// Extract every archive member into the counterpart root
    pub fn materialize_counterpart(
        &self,
        archiver: &dyn Archiver,
        archive: &Path,
    ) -> Result<ArchiveListing> {
        archiver.extract(archive, &self.counterpart())
    }

    /// Remove the scratch directory, reporting failures to the caller
    pub fn destroy(mut self) -> Result<()> {
        interrupt::release(&self.root);
        match self.scratch.take() {
            Some(scratch) => scratch.close().map_err(|e| JarpatchError::IoError {
                message: format!(
                    "Failed to remove scratch directory {}: {}",
                    self.root.display(),
                    e
                ),
            }),
            None => Ok(()),
        }
    }
}

impl Drop for WorkingTree {
    fn drop(&mut self) {
        if self.scratch.is_some() {
            interrupt::release(&self.root);
        }
        // TempDir removes the directory when dropped
    }
}

/// Directory under which scratch directories are created
///
/// Never returns a relative path, so scratch directories are never created
/// under the current working directory (e.g. when `TMPDIR=tmp`).
pub fn temp_dir_base() -> PathBuf {
    let t = env::temp_dir();
    if t.is_absolute() {
        t
    } else {
        #[cfg(windows)]
        {
            env::var("TEMP")
                .or_else(|_| env::var("TMP"))
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("C:\\Windows\\Temp"))
        }
        #[cfg(not(windows))]
        {
            PathBuf::from("/tmp")
        }
    }
}
