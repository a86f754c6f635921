//! Command implementations for Jarpatch CLI
//!
//! Thin wrappers that run an operation and deliver its artifact. The artifact
//! is only written once the whole run succeeded, so a failed run never leaves
//! a partial bundle or archive behind.

pub mod diff;
pub mod patch;

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::error::{JarpatchError, Result};
use crate::path_utils::ensure_parent;

/// Write `bytes` to `output`, or to stdout when no output file was given
pub(crate) fn write_artifact(output: Option<&Path>, bytes: &[u8]) -> Result<()> {
    let failed = |e: io::Error| JarpatchError::OutputFailed {
        reason: match output {
            Some(path) => format!("{}: {}", path.display(), e),
            None => format!("stdout: {e}"),
        },
    };

    match output {
        Some(path) => {
            ensure_parent(path).map_err(failed)?;
            fs::write(path, bytes).map_err(failed)
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(bytes).map_err(failed)?;
            stdout.flush().map_err(failed)
        }
    }
}
