//! Diff and patch orchestration
//!
//! This module provides the two pipelines behind the subcommands:
//! - DiffOperation: archive + edited directory -> patch bundle
//! - PatchOperation: archive + patch bundle -> rebuilt archive
//!
//! Both run strictly in sequence inside their own [`WorkingTree`], which is
//! removed however the run ends. The operations only see the collaborator
//! traits of [`Toolchain`], and narrate through a [`Reporter`].
//!
//! [`WorkingTree`]: crate::workspace::WorkingTree
//! [`Toolchain`]: crate::tools::Toolchain
//! [`Reporter`]: crate::ui::Reporter

pub mod diff;
pub mod gate;
pub mod patch;

pub use diff::DiffOperation;
pub use patch::PatchOperation;

use std::path::Path;

use crate::archive::is_supported_archive;
use crate::error::{Result, input};

/// Check that `path` is an existing archive with a supported extension
fn validate_archive(path: &Path) -> Result<()> {
    let display = path.display().to_string();
    if !path.is_file() {
        return Err(input::not_a_file(display));
    }
    if !is_supported_archive(path) {
        return Err(input::unsupported_extension(display));
    }
    Ok(())
}
