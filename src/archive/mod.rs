//! Archive extraction and packaging
//!
//! The orchestrators only talk to the [`Archiver`] trait. [`ZipArchiver`] is
//! the implementation used by the binary.

mod zipfile;

pub use zipfile::ZipArchiver;

use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::member::MemberKind;

/// Archive extensions accepted as the original of a diff or patch run
pub const ARCHIVE_EXTENSIONS: &[&str] = &["jar", "zip", "war", "ear"];

/// Check whether a path names an archive we know how to handle
pub fn is_supported_archive(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ARCHIVE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// One member of an extracted archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEntry {
    /// Path relative to the archive root, `/`-separated, without trailing slash
    pub name: String,
    pub is_dir: bool,
}

/// Members of an archive in their original order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveListing {
    pub entries: Vec<ListedEntry>,
}

impl ArchiveListing {
    /// Names of the file members, in archive order
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| !e.is_dir)
            .map(|e| e.name.as_str())
    }

    /// Number of compiled class members
    pub fn class_count(&self) -> usize {
        self.files()
            .filter(|name| MemberKind::classify(name) == MemberKind::Reconstructible)
            .count()
    }
}

/// Archive read/write primitive
pub trait Archiver {
    /// Extract every member of `archive` below `dest`
    fn extract(&self, archive: &Path, dest: &Path) -> Result<ArchiveListing>;

    /// Package every file currently below `root` into a new archive.
    ///
    /// Members named in `listing` keep their original order; files not in the
    /// listing follow in sorted order. Listed members that no longer exist
    /// are dropped.
    fn pack(&self, root: &Path, listing: &ArchiveListing, out: &mut dyn Write) -> Result<()>;
}
