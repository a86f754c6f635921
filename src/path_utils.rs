//! Path utilities shared by the tree walkers
//!
//! Member names are always `/`-separated and relative to a tree root,
//! matching how archives name their entries.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::Result;

/// Convert a path to a `/`-separated string
pub fn to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Member name of `path` relative to `root`, or `None` if it is outside `root`
pub fn relative_name(root: &Path, path: &Path) -> Option<String> {
    path.strip_prefix(root)
        .ok()
        .map(to_forward_slashes)
        .filter(|name| !name.is_empty())
}

/// All regular files below `root` as sorted member names
///
/// Symbolic links are followed, so a linked file or directory counts as the
/// files it points to. A missing root is treated as an empty tree.
pub fn list_files(root: &Path) -> Result<Vec<String>> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(name) = relative_name(root, entry.path()) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Create the parent directory of `path` if needed
pub fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
