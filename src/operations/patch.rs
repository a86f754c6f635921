//! Patch operation and reassembler
//!
//! Steps, each finishing before the next begins:
//!
//! 1. Extract the original archive into `patched/`
//! 2. Disassemble every class the bundle changes, in place, dropping the
//!    compiled copy; this recreates the text the bundle was made against
//! 3. Apply the bundle
//! 4. Assemble the patched text back into classes, dropping the text
//! 5. Package everything under `patched/` into the output archive

use std::fs;
use std::path::Path;

use super::validate_archive;
use crate::bundle::{ChangeKind, PatchBundle, PatchEntry};
use crate::error::{JarpatchError, Result, input, tools};
use crate::tools::Toolchain;
use crate::ui::Reporter;
use crate::workspace::{Counterpart, WorkingTree};

/// Archive + patch bundle -> rebuilt archive
pub struct PatchOperation<'a> {
    toolchain: &'a Toolchain,
    reporter: &'a dyn Reporter,
}

impl<'a> PatchOperation<'a> {
    pub fn new(toolchain: &'a Toolchain, reporter: &'a dyn Reporter) -> Self {
        Self {
            toolchain,
            reporter,
        }
    }

    /// Read and parse a bundle file
    pub fn load_bundle(path: &Path) -> Result<PatchBundle> {
        let display = path.display().to_string();
        if !path.is_file() {
            return Err(input::not_a_file(display));
        }
        let text = fs::read(path)
            .map_err(|e| input::invalid(format!("cannot read '{display}': {e}")))?;
        PatchBundle::parse(&display, text)
    }

    /// Apply `bundle` to `original` and return the bytes of the new archive
    ///
    /// Nothing is returned unless every step succeeded.
    pub fn execute(&self, original: &Path, bundle: &PatchBundle) -> Result<Vec<u8>> {
        validate_archive(original)?;

        let tree = WorkingTree::create(Counterpart::Patched)?;
        let target = tree.counterpart();
        self.reporter.progress(&format!(
            "Extracting {} into {}",
            original.display(),
            target.display()
        ));
        let listing = tree.materialize_counterpart(self.toolchain.archiver.as_ref(), original)?;

        let text_entries: Vec<&PatchEntry> = bundle.reconstructible().collect();

        for entry in &text_entries {
            self.restore_baseline(&target, entry, original)?;
        }

        self.reporter.progress(&format!(
            "Applying {} bundle entr{}",
            bundle.entries().len(),
            if bundle.entries().len() == 1 { "y" } else { "ies" }
        ));
        self.toolchain.applier.apply(&target, bundle)?;

        for entry in &text_entries {
            self.reassemble(&target, entry)?;
        }

        self.reporter.progress("Packaging output archive");
        let mut bytes = Vec::new();
        self.toolchain
            .archiver
            .pack(&target, &listing, &mut bytes)?;

        tree.destroy()?;
        Ok(bytes)
    }

    /// Turn the class behind a text-form entry into the text the bundle expects
    fn restore_baseline(&self, target: &Path, entry: &PatchEntry, original: &Path) -> Result<()> {
        if entry.change == ChangeKind::Added {
            return Ok(());
        }

        let member = entry.member_path();
        let class = target.join(&member);
        if !class.is_file() {
            return Err(tools::disassembly_failed(
                member.display().to_string(),
                format!("not a member of {}", original.display()),
            ));
        }

        self.reporter
            .progress(&format!("Disassembling {}", member.display()));
        self.toolchain
            .disassembler
            .disassemble(&class, &target.join(&entry.path))?;
        fs::remove_file(&class)?;
        Ok(())
    }

    /// Assemble a patched text form back into its class
    ///
    /// A text form the bundle deleted, or left empty, means the class is gone.
    fn reassemble(&self, target: &Path, entry: &PatchEntry) -> Result<()> {
        let text = target.join(&entry.path);
        let member = entry.member_path();

        let has_text = fs::metadata(&text).is_ok_and(|meta| meta.is_file() && meta.len() > 0);
        if has_text {
            self.reporter
                .progress(&format!("Assembling {}", member.display()));
            self.toolchain
                .disassembler
                .assemble(&text, &target.join(&member))?;
        } else {
            self.reporter
                .progress(&format!("Removed {}", member.display()));
        }

        if text.exists() {
            fs::remove_file(&text).map_err(|e| JarpatchError::IoError {
                message: format!("Failed to remove {}: {}", text.display(), e),
            })?;
        }
        Ok(())
    }
}
