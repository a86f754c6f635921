//! Patch bundles
//!
//! A bundle is the unified diff written by `jarpatch diff`: one entry per
//! member that differs, named by its path below the tree root. Compiled
//! classes appear under their text-form name (`A.j`), every other member
//! under its own name.
//!
//! Bundles are handled as bytes, since passthrough members need not be UTF-8.

mod parser;

use crate::error::{JarpatchError, Result};
use crate::member::{self, MemberKind};
use std::path::PathBuf;

/// How a bundle entry changes its member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

/// One line of a hunk, with its line terminator if the source line had one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HunkLine {
    Context(Vec<u8>),
    Delete(Vec<u8>),
    Insert(Vec<u8>),
}

/// A contiguous block of changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// 1-based first line in the old file, 0 for an empty range
    pub old_start: usize,
    pub old_len: usize,
    pub new_start: usize,
    pub new_len: usize,
    pub lines: Vec<HunkLine>,
}

impl Hunk {
    /// Lines the old file must contain for this hunk to apply
    pub fn old_lines(&self) -> impl Iterator<Item = &[u8]> {
        self.lines.iter().filter_map(|line| match line {
            HunkLine::Context(l) | HunkLine::Delete(l) => Some(l.as_slice()),
            HunkLine::Insert(_) => None,
        })
    }

    /// Lines the new file contains in place of [`Hunk::old_lines`]
    pub fn new_lines(&self) -> impl Iterator<Item = &[u8]> {
        self.lines.iter().filter_map(|line| match line {
            HunkLine::Context(l) | HunkLine::Insert(l) => Some(l.as_slice()),
            HunkLine::Delete(_) => None,
        })
    }
}

/// Changes to one member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchEntry {
    /// Path below the tree root, `/`-separated, leading tree name stripped
    pub path: String,
    pub kind: MemberKind,
    pub change: ChangeKind,
    pub hunks: Vec<Hunk>,
}

impl PatchEntry {
    /// Archive member this entry ends up changing
    ///
    /// For text-form entries that is the compiled class next to it.
    pub fn member_path(&self) -> PathBuf {
        match self.kind {
            MemberKind::Reconstructible => member::class_path(self.path.as_ref()),
            MemberKind::Passthrough => PathBuf::from(&self.path),
        }
    }
}

/// A parsed patch bundle together with its raw text
#[derive(Debug, Clone)]
pub struct PatchBundle {
    entries: Vec<PatchEntry>,
    text: Vec<u8>,
}

impl PatchBundle {
    /// Parse a bundle, failing if it names no member at all
    ///
    /// `source` names the bundle in error messages.
    pub fn parse(source: &str, text: Vec<u8>) -> Result<Self> {
        let entries = parser::parse_entries(&text)?;
        if entries.is_empty() {
            return Err(JarpatchError::BundleEmpty {
                path: source.to_string(),
            });
        }
        Ok(Self { entries, text })
    }

    /// Entries in bundle order, one per member path
    pub fn entries(&self) -> &[PatchEntry] {
        &self.entries
    }

    /// Entries whose member is a compiled class
    pub fn reconstructible(&self) -> impl Iterator<Item = &PatchEntry> {
        self.entries
            .iter()
            .filter(|e| e.kind == MemberKind::Reconstructible)
    }

    /// The bundle exactly as it was read or produced
    pub fn text(&self) -> &[u8] {
        &self.text
    }
}
