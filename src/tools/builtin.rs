//! In-process diff and patch engine
//!
//! Produces and consumes the same unified format as `diff -ruN` and
//! `patch -p1`, so bundles from either engine apply with the other.
//! Hunks are computed with `diffy`; application is exact-context only.

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::Path;

use super::{DiffOutcome, DiffStatus, PatchApplier, TreeDiffer};
use crate::bundle::{ChangeKind, Hunk, PatchBundle};
use crate::error::{JarpatchError, Result, tools};
use crate::path_utils::{ensure_parent, list_files};

/// Timestamp `diff -N` gives to the side of a file that does not exist
const ABSENT_TIMESTAMP: &str = "1970-01-01 00:00:00.000000000 +0000";

/// Recursive tree diff computed in-process
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinDiff;

impl TreeDiffer for BuiltinDiff {
    fn diff_trees(&self, root: &Path, left: &str, right: &str) -> Result<DiffOutcome> {
        let left_root = root.join(left);
        let right_root = root.join(right);

        let names: BTreeSet<String> = list_files(&left_root)
            .and_then(|l| list_files(&right_root).map(|r| l.into_iter().chain(r).collect()))
            .map_err(|e| tools::diff_failed(e.to_string()))?;

        let mut text = Vec::new();
        for name in &names {
            let old = read_if_file(&left_root.join(name))?;
            let new = read_if_file(&right_root.join(name))?;
            if old == new {
                continue;
            }
            render_file_diff(&mut text, left, right, name, old.as_deref(), new.as_deref())
                .map_err(|e| tools::diff_failed(e.to_string()))?;
        }

        let status = if text.is_empty() {
            DiffStatus::Identical
        } else {
            DiffStatus::Differences
        };
        Ok(DiffOutcome { status, text })
    }
}

fn read_if_file(path: &Path) -> Result<Option<Vec<u8>>> {
    if !path.is_file() {
        return Ok(None);
    }
    fs::read(path)
        .map(Some)
        .map_err(|e| tools::diff_failed(format!("cannot read {}: {e}", path.display())))
}

fn render_file_diff(
    out: &mut Vec<u8>,
    left: &str,
    right: &str,
    name: &str,
    old: Option<&[u8]>,
    new: Option<&[u8]>,
) -> std::io::Result<()> {
    let stamp = |side: Option<&[u8]>| {
        if side.is_some() {
            String::new()
        } else {
            format!("\t{ABSENT_TIMESTAMP}")
        }
    };

    writeln!(out, "diff -ruN {left}/{name} {right}/{name}")?;
    writeln!(out, "--- {left}/{name}{}", stamp(old))?;
    writeln!(out, "+++ {right}/{name}{}", stamp(new))?;

    let patch = diffy::create_patch_bytes(old.unwrap_or_default(), new.unwrap_or_default());
    let mut formatted = Vec::new();
    diffy::PatchFormatter::new().write_patch_into(&patch, &mut formatted)?;

    // Keep the hunks only; the file header above replaces diffy's own
    let hunks_start = find_first_hunk(&formatted).unwrap_or(formatted.len());
    out.extend_from_slice(&formatted[hunks_start..]);
    Ok(())
}

fn find_first_hunk(formatted: &[u8]) -> Option<usize> {
    let mut offset = 0;
    for line in formatted.split_inclusive(|&b| b == b'\n') {
        if line.starts_with(b"@@ ") {
            return Some(offset);
        }
        offset += line.len();
    }
    None
}

/// Applies parsed bundles in-process
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinPatch;

impl PatchApplier for BuiltinPatch {
    fn apply(&self, target: &Path, bundle: &PatchBundle) -> Result<()> {
        for entry in bundle.entries() {
            let path = target.join(&entry.path);

            let current = if path.is_file() {
                fs::read(&path).map_err(|e| {
                    tools::patch_failed(format!("cannot read {}: {e}", entry.path))
                })?
            } else if entry.change == ChangeKind::Added {
                Vec::new()
            } else {
                return Err(tools::patch_failed(format!(
                    "can't find file to patch: {}",
                    entry.path
                )));
            };

            let patched = apply_hunks(&current, &entry.hunks).map_err(|hunk| {
                tools::patch_failed(format!("hunk #{hunk} FAILED at {}", entry.path))
            })?;

            write_result(&path, &entry.path, entry.change, &patched)?;
        }
        Ok(())
    }
}

fn write_result(path: &Path, name: &str, change: ChangeKind, contents: &[u8]) -> Result<()> {
    let failed = |e: std::io::Error| -> JarpatchError {
        tools::patch_failed(format!("cannot write {name}: {e}"))
    };

    if change == ChangeKind::Removed && contents.is_empty() {
        if path.exists() {
            fs::remove_file(path).map_err(failed)?;
        }
        return Ok(());
    }

    ensure_parent(path).map_err(failed)?;
    fs::write(path, contents).map_err(failed)
}

/// Apply hunks in order, returning the 1-based number of the first hunk that fails
///
/// Each hunk is tried at its recorded line (shifted by the offset of earlier
/// hunks) and then at the nearest position where its old lines match exactly.
fn apply_hunks(current: &[u8], hunks: &[Hunk]) -> std::result::Result<Vec<u8>, usize> {
    let lines: Vec<&[u8]> = current.split_inclusive(|&b| b == b'\n').collect();
    let mut out = Vec::with_capacity(current.len());
    let mut cursor = 0usize;
    let mut offset = 0isize;

    for (index, hunk) in hunks.iter().enumerate() {
        let old: Vec<&[u8]> = hunk.old_lines().collect();
        let recorded = if hunk.old_len == 0 {
            hunk.old_start
        } else {
            hunk.old_start.saturating_sub(1)
        };
        let expected = recorded.saturating_add_signed(offset);

        let position = find_position(&lines, &old, expected, cursor).ok_or(index + 1)?;

        for line in &lines[cursor..position] {
            out.extend_from_slice(line);
        }
        for line in hunk.new_lines() {
            out.extend_from_slice(line);
        }

        cursor = position + old.len();
        offset = position as isize - recorded as isize;
    }

    for line in &lines[cursor..] {
        out.extend_from_slice(line);
    }
    Ok(out)
}

fn find_position(lines: &[&[u8]], old: &[&[u8]], expected: usize, cursor: usize) -> Option<usize> {
    let last = lines.len().checked_sub(old.len())?;
    if cursor > last {
        return None;
    }
    let expected = expected.clamp(cursor, last);
    let matches_at = |pos: usize| lines[pos..pos + old.len()] == *old;

    let max_distance = (expected - cursor).max(last - expected);
    for distance in 0..=max_distance {
        if let Some(pos) = expected.checked_add(distance).filter(|&p| p <= last) {
            if matches_at(pos) {
                return Some(pos);
            }
        }
        if let Some(pos) = expected.checked_sub(distance).filter(|&p| p >= cursor) {
            if matches_at(pos) {
                return Some(pos);
            }
        }
    }
    None
}
