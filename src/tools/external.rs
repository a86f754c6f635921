//! `diff` and `patch` subprocesses

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

use super::{
    DiffOutcome, DiffStatus, PatchApplier, TreeDiffer, describe_output, note_interrupt, run_tool,
};
use crate::bundle::PatchBundle;
use crate::error::{Result, tools};

/// Exit statuses of `diff`: 0 identical, 1 differences, anything else trouble
const DIFF_IDENTICAL: i32 = 0;
const DIFF_DIFFERENCES: i32 = 1;

/// Runs `diff <options> left right` in the tree root
#[derive(Debug, Clone)]
pub struct GnuDiff {
    command: String,
    options: Vec<String>,
}

impl GnuDiff {
    pub fn new(command: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            command: command.into(),
            options,
        }
    }
}

impl TreeDiffer for GnuDiff {
    fn diff_trees(&self, root: &Path, left: &str, right: &str) -> Result<DiffOutcome> {
        let output = run_tool(
            Command::new(&self.command)
                .args(&self.options)
                .arg(left)
                .arg(right)
                .current_dir(root),
            &[DIFF_IDENTICAL, DIFF_DIFFERENCES],
        )
        .map_err(tools::diff_failed)?;

        let status = if output.status.code() == Some(DIFF_IDENTICAL) {
            DiffStatus::Identical
        } else {
            DiffStatus::Differences
        };

        Ok(DiffOutcome {
            status,
            text: output.stdout,
        })
    }
}

/// Runs `patch -p1` in the target root, feeding the bundle on stdin
#[derive(Debug, Clone)]
pub struct GnuPatch {
    command: String,
}

impl GnuPatch {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn args() -> [&'static str; 4] {
        ["-p1", "--batch", "--silent", "--no-backup-if-mismatch"]
    }
}

impl PatchApplier for GnuPatch {
    fn apply(&self, target: &Path, bundle: &PatchBundle) -> Result<()> {
        let mut child = Command::new(&self.command)
            .args(Self::args())
            .current_dir(target)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| tools::patch_failed(format!("cannot run '{}': {e}", self.command)))?;

        let stdin = child.stdin.take();
        let text = bundle.text();

        // Feed stdin from a second thread so a chatty patch cannot deadlock us
        let output = thread::scope(|scope| {
            if let Some(mut stdin) = stdin {
                scope.spawn(move || {
                    // patch may exit early on a bad hunk; its status tells us
                    let _ = stdin.write_all(text);
                });
            }
            child.wait_with_output()
        })
        .map_err(|e| tools::patch_failed(format!("'{}' failed: {e}", self.command)))?;

        if output.status.success() {
            Ok(())
        } else {
            note_interrupt(output.status);
            Err(tools::patch_failed(describe_output(&output)))
        }
    }
}
