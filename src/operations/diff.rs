//! Diff operation
//!
//! Builds the text trees and records their differences as a patch bundle:
//!
//! 1. Extract the original archive into `original/`
//! 2. Walk the edited directory: changed or new classes are disassembled into
//!    `edited/`, other members are copied there verbatim
//! 3. Sweep the original classes: changed or removed ones are disassembled in
//!    place, and every compiled copy is dropped from `original/`
//! 4. Diff `original/` against `edited/`

use std::fs;
use std::path::Path;

use super::gate::should_disassemble;
use super::validate_archive;
use crate::archive::ArchiveListing;
use crate::bundle::PatchBundle;
use crate::error::{JarpatchError, Result, input};
use crate::member::{self, MemberKind};
use crate::path_utils::{ensure_parent, list_files};
use crate::tools::{DiffStatus, Toolchain};
use crate::ui::Reporter;
use crate::workspace::{Counterpart, ORIGINAL_DIR, WorkingTree};

/// Archive + edited directory -> patch bundle
pub struct DiffOperation<'a> {
    toolchain: &'a Toolchain,
    reporter: &'a dyn Reporter,
}

impl<'a> DiffOperation<'a> {
    pub fn new(toolchain: &'a Toolchain, reporter: &'a dyn Reporter) -> Self {
        Self {
            toolchain,
            reporter,
        }
    }

    /// Produce the bundle describing how `edited` differs from `original`
    ///
    /// Fails with `NoChanges` rather than returning an empty bundle.
    pub fn execute(&self, original: &Path, edited: &Path) -> Result<PatchBundle> {
        validate_archive(original)?;
        let edited_files = edited_members(edited)?;

        let tree = WorkingTree::create(Counterpart::Edited)?;
        self.reporter.progress(&format!(
            "Extracting {} into {}",
            original.display(),
            tree.root().display()
        ));
        let listing = tree.materialize_original(self.toolchain.archiver.as_ref(), original)?;
        if listing.class_count() == 0 {
            return Err(input::no_classes(original.display().to_string()));
        }

        self.prepare_edited(&tree, edited, &edited_files)?;
        self.sweep_original(&tree, edited, &listing)?;

        self.reporter.progress("Diffing text trees");
        let outcome =
            self.toolchain
                .differ
                .diff_trees(tree.root(), ORIGINAL_DIR, tree.counterpart_name())?;

        let no_changes = || JarpatchError::NoChanges {
            original: original.display().to_string(),
            edited: edited.display().to_string(),
        };
        if outcome.status == DiffStatus::Identical || outcome.text.is_empty() {
            return Err(no_changes());
        }

        for name in binary_differences(&outcome.text) {
            self.reporter.warning(&format!(
                "Binary member {name} differs and cannot be patched; it is left out of the bundle"
            ));
        }

        let bundle = match PatchBundle::parse("diff output", outcome.text) {
            Ok(bundle) => bundle,
            // Only binary differences: nothing a patch could carry
            Err(JarpatchError::BundleEmpty { .. }) => return Err(no_changes()),
            Err(e) => return Err(e),
        };

        self.reporter.progress(&format!(
            "Bundle has {} entr{}",
            bundle.entries().len(),
            if bundle.entries().len() == 1 { "y" } else { "ies" }
        ));

        tree.destroy()?;
        Ok(bundle)
    }

    /// Fill the counterpart root from the edited directory
    fn prepare_edited(&self, tree: &WorkingTree, edited: &Path, files: &[String]) -> Result<()> {
        let original_root = tree.original();
        let counterpart = tree.counterpart();

        for name in files {
            let source = edited.join(name);
            match MemberKind::classify(name) {
                MemberKind::Reconstructible => {
                    if !should_disassemble(&source, &original_root.join(name))? {
                        self.reporter.progress(&format!("Unchanged: {name}"));
                        continue;
                    }
                    self.reporter.progress(&format!("Disassembling edited {name}"));
                    let text = counterpart.join(member::text_path(Path::new(name)));
                    self.toolchain.disassembler.disassemble(&source, &text)?;
                }
                MemberKind::Passthrough => {
                    let dest = counterpart.join(name);
                    ensure_parent(&dest)?;
                    fs::copy(&source, &dest).map_err(|e| JarpatchError::IoError {
                        message: format!("Failed to copy {}: {}", source.display(), e),
                    })?;
                }
            }
        }
        Ok(())
    }

    /// Replace the compiled classes of the original root by their text form
    ///
    /// Classes with a byte-identical edited counterpart are only dropped.
    fn sweep_original(
        &self,
        tree: &WorkingTree,
        edited: &Path,
        listing: &ArchiveListing,
    ) -> Result<()> {
        let original_root = tree.original();

        for name in listing
            .files()
            .filter(|name| MemberKind::classify(name) == MemberKind::Reconstructible)
        {
            let class = original_root.join(name);
            if should_disassemble(&class, &edited.join(name))? {
                self.reporter
                    .progress(&format!("Disassembling original {name}"));
                let text = original_root.join(member::text_path(Path::new(name)));
                self.toolchain.disassembler.disassemble(&class, &text)?;
            }
            fs::remove_file(&class)?;
        }
        Ok(())
    }
}

/// Members the diff engine could only report as `Binary files A and B differ`
fn binary_differences(text: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(text)
        .lines()
        .filter_map(|line| {
            let sides = line.strip_prefix("Binary files ")?.strip_suffix(" differ")?;
            let (left, _) = sides.split_once(" and ")?;
            let (_, name) = left.split_once('/')?;
            Some(name.to_string())
        })
        .collect()
}

/// Files of the edited directory, failing unless it holds at least one class
fn edited_members(edited: &Path) -> Result<Vec<String>> {
    let display = edited.display().to_string();
    if !edited.is_dir() {
        return Err(input::not_a_directory(display));
    }

    let files = list_files(edited)?;
    if !files
        .iter()
        .any(|name| MemberKind::classify(name) == MemberKind::Reconstructible)
    {
        return Err(input::no_classes(display));
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::ChangeKind;
    use crate::test_fixtures::{
        CopyDisassembler, RecordingReporter, build_jar, builtin_toolchain, write_tree,
    };
    use crate::tools::{DiffOutcome, TreeDiffer};
    use crate::ui::SilentReporter;
    use tempfile::TempDir;

    /// Differ returning fixed output, as GNU diff does for binary members
    struct CannedDiff(&'static str);

    impl TreeDiffer for CannedDiff {
        fn diff_trees(&self, _root: &Path, _left: &str, _right: &str) -> Result<DiffOutcome> {
            Ok(DiffOutcome {
                status: DiffStatus::Differences,
                text: self.0.as_bytes().to_vec(),
            })
        }
    }

    fn run_canned(
        jar: &Path,
        edited: &Path,
        output: &'static str,
    ) -> (Result<PatchBundle>, Vec<String>) {
        let mut toolchain = builtin_toolchain(CopyDisassembler::default());
        toolchain.differ = Box::new(CannedDiff(output));
        let reporter = RecordingReporter::default();
        let result = DiffOperation::new(&toolchain, &reporter).execute(jar, edited);
        (result, reporter.warnings())
    }

    const CLASS_A: &str = ".class public A\n.method run\n    iconst_1\n    ireturn\n.end method\n.end class\n";
    const CLASS_A_EDITED: &str = ".class public A\n.method run\n    iconst_2\n    ireturn\n.end method\n.end class\n";

    fn run(original: &Path, edited: &Path, disassembler: &CopyDisassembler) -> Result<PatchBundle> {
        let toolchain = builtin_toolchain(disassembler.clone());
        DiffOperation::new(&toolchain, &SilentReporter).execute(original, edited)
    }

    #[test]
    fn test_identical_tree_is_no_changes() {
        let temp = TempDir::new().unwrap();
        let jar = build_jar(temp.path(), "app.jar", &[("A.class", CLASS_A), ("readme.txt", "hi\n")]);
        let edited = temp.path().join("edited");
        write_tree(&edited, &[("A.class", CLASS_A), ("readme.txt", "hi\n")]);

        let disassembler = CopyDisassembler::default();
        let err = run(&jar, &edited, &disassembler).unwrap_err();
        assert!(matches!(err, JarpatchError::NoChanges { .. }));
        assert!(disassembler.calls().is_empty());
    }

    #[test]
    fn test_changed_class_yields_single_text_entry() {
        let temp = TempDir::new().unwrap();
        let jar = build_jar(
            temp.path(),
            "app.jar",
            &[("A.class", CLASS_A), ("readme.txt", "hi\n"), ("lib/C.class", "C\n")],
        );
        let edited = temp.path().join("edited");
        write_tree(
            &edited,
            &[("A.class", CLASS_A_EDITED), ("readme.txt", "hi\n"), ("lib/C.class", "C\n")],
        );

        let disassembler = CopyDisassembler::default();
        let bundle = run(&jar, &edited, &disassembler).unwrap();

        let paths: Vec<_> = bundle.entries().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["A.j"]);
        assert_eq!(bundle.entries()[0].change, ChangeKind::Modified);

        let text = String::from_utf8(bundle.text().to_vec()).unwrap();
        assert!(text.contains("-    iconst_1"));
        assert!(text.contains("+    iconst_2"));

        // A.class once per side, lib/C.class never
        let mut names = disassembler.disassembled_names();
        names.dedup();
        assert_eq!(names, vec!["A.class"]);
        assert_eq!(disassembler.calls().len(), 2);
    }

    #[test]
    fn test_added_class_yields_added_entry() {
        let temp = TempDir::new().unwrap();
        let jar = build_jar(temp.path(), "app.jar", &[("A.class", CLASS_A)]);
        let edited = temp.path().join("edited");
        write_tree(&edited, &[("A.class", CLASS_A), ("com/B.class", ".class B\n.end class\n")]);

        let bundle = run(&jar, &edited, &CopyDisassembler::default()).unwrap();
        let entries = bundle.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "com/B.j");
        assert_eq!(entries[0].change, ChangeKind::Added);
    }

    #[test]
    fn test_removed_class_yields_removed_entry() {
        let temp = TempDir::new().unwrap();
        let jar = build_jar(temp.path(), "app.jar", &[("A.class", CLASS_A), ("Old.class", "old\n")]);
        let edited = temp.path().join("edited");
        write_tree(&edited, &[("A.class", CLASS_A)]);

        let bundle = run(&jar, &edited, &CopyDisassembler::default()).unwrap();
        assert_eq!(bundle.entries()[0].path, "Old.j");
        assert_eq!(bundle.entries()[0].change, ChangeKind::Removed);
    }

    #[test]
    fn test_changed_passthrough_is_diffed_raw() {
        let temp = TempDir::new().unwrap();
        let jar = build_jar(temp.path(), "app.jar", &[("A.class", CLASS_A), ("conf/app.properties", "a=1\n")]);
        let edited = temp.path().join("edited");
        write_tree(&edited, &[("A.class", CLASS_A), ("conf/app.properties", "a=2\n")]);

        let disassembler = CopyDisassembler::default();
        let bundle = run(&jar, &edited, &disassembler).unwrap();
        assert_eq!(bundle.entries()[0].path, "conf/app.properties");
        assert_eq!(bundle.entries()[0].kind, MemberKind::Passthrough);
        assert!(disassembler.calls().is_empty());
    }

    #[test]
    fn test_edited_without_classes_is_rejected() {
        let temp = TempDir::new().unwrap();
        let jar = build_jar(temp.path(), "app.jar", &[("A.class", CLASS_A)]);
        let edited = temp.path().join("edited");
        write_tree(&edited, &[("readme.txt", "hi\n")]);

        let err = run(&jar, &edited, &CopyDisassembler::default()).unwrap_err();
        assert!(matches!(err, JarpatchError::InputValidation { .. }));
    }

    #[test]
    fn test_archive_without_classes_is_rejected() {
        let temp = TempDir::new().unwrap();
        let jar = build_jar(temp.path(), "app.jar", &[("readme.txt", "hi\n")]);
        let edited = temp.path().join("edited");
        write_tree(&edited, &[("A.class", CLASS_A)]);

        let err = run(&jar, &edited, &CopyDisassembler::default()).unwrap_err();
        assert!(err.to_string().contains("contains no compiled classes"));
    }

    #[test]
    fn test_edited_must_be_a_directory() {
        let temp = TempDir::new().unwrap();
        let jar = build_jar(temp.path(), "app.jar", &[("A.class", CLASS_A)]);

        let err = run(&jar, &jar, &CopyDisassembler::default()).unwrap_err();
        assert!(err.to_string().contains("is not a directory"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_class_is_diffed() {
        use std::os::unix::fs::symlink;

        let temp = TempDir::new().unwrap();
        let jar = build_jar(temp.path(), "app.jar", &[("A.class", "A\n"), ("B.class", "B\n")]);
        let store = temp.path().join("store");
        write_tree(&store, &[("A.class", "A2\n")]);
        let edited = temp.path().join("edited");
        write_tree(&edited, &[("B.class", "B\n")]);
        symlink(store.join("A.class"), edited.join("A.class")).unwrap();

        let bundle = run(&jar, &edited, &CopyDisassembler::default()).unwrap();
        let entries: Vec<_> = bundle
            .entries()
            .iter()
            .map(|e| (e.path.as_str(), e.change))
            .collect();
        assert_eq!(entries, vec![("A.j", ChangeKind::Modified)]);
    }

    #[test]
    fn test_binary_difference_beside_text_entry_is_warned() {
        let temp = TempDir::new().unwrap();
        let jar = build_jar(temp.path(), "app.jar", &[("A.class", CLASS_A)]);
        let edited = temp.path().join("edited");
        write_tree(&edited, &[("A.class", CLASS_A_EDITED)]);

        let (result, warnings) = run_canned(
            &jar,
            &edited,
            "Binary files original/img/logo.png and edited/img/logo.png differ\n\
             --- original/A.j\n+++ edited/A.j\n@@ -1 +1 @@\n-a\n+b\n",
        );

        let bundle = result.unwrap();
        assert_eq!(bundle.entries().len(), 1);
        assert_eq!(bundle.entries()[0].path, "A.j");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("img/logo.png"));
    }

    #[test]
    fn test_only_binary_differences_is_no_changes() {
        let temp = TempDir::new().unwrap();
        let jar = build_jar(temp.path(), "app.jar", &[("A.class", CLASS_A)]);
        let edited = temp.path().join("edited");
        write_tree(&edited, &[("A.class", CLASS_A)]);

        let (result, warnings) = run_canned(
            &jar,
            &edited,
            "Binary files original/a.bin and edited/a.bin differ\n\
             Binary files original/lib/b.bin and edited/lib/b.bin differ\n",
        );

        assert!(matches!(result.unwrap_err(), JarpatchError::NoChanges { .. }));
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("a.bin"));
        assert!(warnings[1].contains("lib/b.bin"));
    }

    #[test]
    fn test_binary_differences_names_members() {
        let text = b"Only in edited: x\n\
            Binary files original/res/icon.png and edited/res/icon.png differ\n\
            --- original/A.j\n";
        assert_eq!(binary_differences(text), vec!["res/icon.png"]);
        assert!(binary_differences(b"--- original/A.j\n+++ edited/A.j\n").is_empty());
    }
}
