//! Test fixtures shared by the unit tests
//!
//! - [`build_jar`] / [`read_jar`]: write and read small fixture archives
//! - [`CopyDisassembler`]: a [`Disassembler`] double whose "text form" is the
//!   class bytes themselves, recording every call
//! - [`builtin_toolchain`]: the in-process toolchain around a disassembler
//! - [`RecordingReporter`]: a [`Reporter`] double keeping every warning
//!
//! Fixture classes are plain text, so with [`CopyDisassembler`] a whole
//! diff/patch run can be checked without a real disassembler installed.

use std::fs::{self, File};
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::archive::ZipArchiver;
use crate::error::{JarpatchError, Result, tools};
use crate::tools::{BuiltinDiff, BuiltinPatch, Disassembler, Toolchain};
use crate::ui::Reporter;

/// Write a jar with the given members, in order, and return its path
///
/// # Panics
///
/// Panics if the archive cannot be written.
#[must_use]
pub fn build_jar(dir: &Path, name: &str, members: &[(&str, &str)]) -> PathBuf {
    let path = dir.join(name);
    let file = File::create(&path).expect("Failed to create fixture jar");
    let mut writer = ZipWriter::new(file);
    for (member, contents) in members {
        writer
            .start_file(*member, SimpleFileOptions::default())
            .expect("Failed to start fixture member");
        writer
            .write_all(contents.as_bytes())
            .expect("Failed to write fixture member");
    }
    writer.finish().expect("Failed to finish fixture jar");
    path
}

/// Read every member of an in-memory archive, directories included
///
/// # Panics
///
/// Panics if the bytes are not a readable zip archive.
#[must_use]
pub fn read_jar(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).expect("Output is not a zip archive");
    (0..archive.len())
        .map(|i| {
            let mut entry = archive.by_index(i).expect("Failed to read member");
            let mut contents = Vec::new();
            entry
                .read_to_end(&mut contents)
                .expect("Failed to read member contents");
            (entry.name().to_string(), contents)
        })
        .collect()
}

/// Create files below `root` from `(path, contents)` pairs
///
/// # Panics
///
/// Panics if any file cannot be created.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (path, contents) in files {
        let full_path = root.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&full_path, contents).expect("Failed to write test file");
    }
}

/// One recorded disassembler invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisasmCall {
    Disassemble(PathBuf),
    Assemble(PathBuf),
}

/// Disassembler double that copies bytes between class and text form
#[derive(Debug, Clone, Default)]
pub struct CopyDisassembler {
    calls: Arc<Mutex<Vec<DisasmCall>>>,
}

impl CopyDisassembler {
    /// Every call made so far, in order
    ///
    /// # Panics
    ///
    /// Panics if the call log is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<DisasmCall> {
        self.calls.lock().expect("call log poisoned").clone()
    }

    /// File names of the classes passed to `disassemble`
    #[must_use]
    pub fn disassembled_names(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                DisasmCall::Disassemble(path) => path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned()),
                DisasmCall::Assemble(_) => None,
            })
            .collect()
    }

    fn record(&self, call: DisasmCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn copy(from: &Path, to: &Path) -> std::io::Result<()> {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(from, to).map(|_| ())
    }
}

impl Disassembler for CopyDisassembler {
    fn disassemble(&self, class_file: &Path, text_file: &Path) -> Result<()> {
        self.record(DisasmCall::Disassemble(class_file.to_path_buf()));
        Self::copy(class_file, text_file)
            .map_err(|e| tools::disassembly_failed(class_file.display().to_string(), e.to_string()))
    }

    fn assemble(&self, text_file: &Path, class_file: &Path) -> Result<()> {
        self.record(DisasmCall::Assemble(text_file.to_path_buf()));
        Self::copy(text_file, class_file)
            .map_err(|e| tools::assembly_failed(text_file.display().to_string(), e.to_string()))
    }
}

/// In-process toolchain around the given disassembler
#[must_use]
pub fn builtin_toolchain(disassembler: CopyDisassembler) -> Toolchain {
    Toolchain {
        disassembler: Box::new(disassembler),
        differ: Box::new(BuiltinDiff),
        applier: Box::new(BuiltinPatch),
        archiver: Box::new(ZipArchiver),
    }
}

/// Reporter double that keeps warnings and drops everything else
#[derive(Debug, Default)]
pub struct RecordingReporter {
    warnings: Mutex<Vec<String>>,
}

impl RecordingReporter {
    /// Warnings reported so far, in order
    ///
    /// # Panics
    ///
    /// Panics if the warning log is poisoned.
    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().expect("warning log poisoned").clone()
    }
}

impl Reporter for RecordingReporter {
    fn progress(&self, _message: &str) {}

    fn warning(&self, message: &str) {
        if let Ok(mut warnings) = self.warnings.lock() {
            warnings.push(message.to_string());
        }
    }

    fn error(&self, _error: &JarpatchError) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_build_and_read_jar() {
        let temp = TempDir::new().unwrap();
        let jar = build_jar(temp.path(), "app.jar", &[("A.class", "A"), ("x/readme.txt", "hi")]);

        let members = read_jar(&fs::read(jar).unwrap());
        assert_eq!(
            members,
            vec![
                ("A.class".to_string(), b"A".to_vec()),
                ("x/readme.txt".to_string(), b"hi".to_vec()),
            ]
        );
    }

    #[test]
    fn test_copy_disassembler_records_calls() {
        let temp = TempDir::new().unwrap();
        write_tree(temp.path(), &[("A.class", ".class A\n")]);

        let disassembler = CopyDisassembler::default();
        let probe = disassembler.clone();
        disassembler
            .disassemble(&temp.path().join("A.class"), &temp.path().join("out/A.j"))
            .unwrap();

        assert_eq!(
            fs::read_to_string(temp.path().join("out/A.j")).unwrap(),
            ".class A\n"
        );
        assert_eq!(probe.disassembled_names(), vec!["A.class"]);
    }

    #[test]
    fn test_copy_disassembler_missing_class_fails() {
        let temp = TempDir::new().unwrap();
        let err = CopyDisassembler::default()
            .disassemble(&temp.path().join("A.class"), &temp.path().join("A.j"))
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::JarpatchError::DisassemblyFailed { .. }
        ));
    }
}
