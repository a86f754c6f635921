//! External collaborators of the diff/patch pipeline
//!
//! The orchestrators only see the traits in this module:
//! - [`Disassembler`]: class <-> text form, implemented by [`Krakatau`]
//! - [`TreeDiffer`]: recursive unified diff of two trees, implemented by
//!   [`GnuDiff`] (subprocess) and [`BuiltinDiff`] (in-process)
//! - [`PatchApplier`]: applies a bundle to a tree, implemented by [`GnuPatch`]
//!   (subprocess) and [`BuiltinPatch`] (in-process)
//!
//! [`Toolchain`] bundles one implementation of each, plus the archiver.

mod builtin;
mod external;
mod krakatau;

pub use builtin::{BuiltinDiff, BuiltinPatch};
pub use external::{GnuDiff, GnuPatch};
pub use krakatau::Krakatau;

use std::path::Path;
use std::process::{Command, ExitStatus, Output};

use crate::archive::{Archiver, ZipArchiver};
use crate::bundle::PatchBundle;
use crate::cli::Engine;
use crate::config::Settings;
use crate::error::Result;
use crate::workspace::interrupt;

/// Converts compiled classes to their text form and back
pub trait Disassembler {
    /// Write the text form of `class_file` to `text_file`
    fn disassemble(&self, class_file: &Path, text_file: &Path) -> Result<()>;

    /// Write the compiled form of `text_file` to `class_file`
    fn assemble(&self, text_file: &Path, class_file: &Path) -> Result<()>;
}

/// Result of a successful tree comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffStatus {
    Identical,
    Differences,
}

/// Output of [`TreeDiffer::diff_trees`]
#[derive(Debug, Clone)]
pub struct DiffOutcome {
    pub status: DiffStatus,
    /// Unified diff text, empty when the trees are identical
    pub text: Vec<u8>,
}

/// Recursive unified diff between two sibling trees
pub trait TreeDiffer {
    /// Compare `root/left` with `root/right`.
    ///
    /// File headers name paths as `left/...` and `right/...`. An error status
    /// of the underlying engine is reported as `DiffExecutionFailed`.
    fn diff_trees(&self, root: &Path, left: &str, right: &str) -> Result<DiffOutcome>;
}

/// Applies a patch bundle below a tree root, stripping one path component
pub trait PatchApplier {
    fn apply(&self, target: &Path, bundle: &PatchBundle) -> Result<()>;
}

/// One implementation of every collaborator
pub struct Toolchain {
    pub disassembler: Box<dyn Disassembler>,
    pub differ: Box<dyn TreeDiffer>,
    pub applier: Box<dyn PatchApplier>,
    pub archiver: Box<dyn Archiver>,
}

impl Toolchain {
    /// Build the toolchain selected by the settings
    pub fn from_settings(settings: &Settings) -> Self {
        let disassembler = Box::new(Krakatau::new(
            settings.tools.krakatau.clone(),
            settings.disasm_mode.clone(),
        ));

        let (differ, applier): (Box<dyn TreeDiffer>, Box<dyn PatchApplier>) =
            match settings.engine {
                Engine::External => (
                    Box::new(GnuDiff::new(
                        settings.tools.diff.clone(),
                        settings.diff_options.clone(),
                    )),
                    Box::new(GnuPatch::new(settings.tools.patch.clone())),
                ),
                Engine::Builtin => (Box::new(BuiltinDiff), Box::new(BuiltinPatch)),
            };

        Self {
            disassembler,
            differ,
            applier,
            archiver: Box::new(ZipArchiver),
        }
    }
}

/// Run a tool to completion, describing spawn failures and non-zero exits
///
/// Returns the output for any exit status listed in `accepted`.
fn run_tool(command: &mut Command, accepted: &[i32]) -> std::result::Result<Output, String> {
    let program = command.get_program().to_string_lossy().into_owned();
    let output = command
        .output()
        .map_err(|e| format!("cannot run '{program}': {e}"))?;

    match output.status.code() {
        Some(code) if accepted.contains(&code) => Ok(output),
        Some(code) => Err(format!(
            "'{program}' exited with status {code}: {}",
            describe_output(&output)
        )),
        None => {
            note_interrupt(output.status);
            Err(format!("'{program}' was terminated by a signal"))
        }
    }
}

/// Flag the run as interrupted when a tool died of Ctrl+C
///
/// The terminal signals the whole process group, so the tool can fail before
/// our own handler has run.
fn note_interrupt(status: ExitStatus) {
    if was_sigint(status) {
        interrupt::mark_interrupted();
    }
}

#[cfg(unix)]
fn was_sigint(status: ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;

    const SIGINT: i32 = 2;
    status.signal() == Some(SIGINT)
}

#[cfg(not(unix))]
fn was_sigint(_status: ExitStatus) -> bool {
    false
}

/// Last non-empty line of stderr, or of stdout when stderr is empty
fn describe_output(output: &Output) -> String {
    let pick = |bytes: &[u8]| {
        String::from_utf8_lossy(bytes)
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .map(|line| line.trim().to_string())
    };
    pick(&output.stderr)
        .or_else(|| pick(&output.stdout))
        .unwrap_or_else(|| "no output".to_string())
}
