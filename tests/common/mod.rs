//! Common test utilities for Jarpatch integration tests
//!
//! Runs the real binary with the builtin diff engine and a shell script
//! standing in for `krak2`, whose "text form" of a class is the class bytes.

use std::fs::File;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Stand-in for `krak2 dis|asm [--flags] --out OUT IN`
///
/// Logs `<mode> <file name>` to `$KRAK_LOG` and refuses to assemble text
/// containing `SYNTAX ERROR`.
#[allow(dead_code)]
const FAKE_KRAKATAU: &str = r#"#!/bin/sh
mode="$1"
shift
while [ $# -gt 0 ]; do
    case "$1" in
        --out) out="$2"; shift 2 ;;
        --*) shift ;;
        *) in="$1"; shift ;;
    esac
done
if [ -n "$KRAK_LOG" ]; then
    echo "$mode $(basename "$in")" >> "$KRAK_LOG"
fi
if [ "$mode" = asm ] && grep -q "SYNTAX ERROR" "$in"; then
    echo "$in:1: error: unexpected token" >&2
    exit 1
fi
mkdir -p "$(dirname "$out")"
cp "$in" "$out"
"#;

/// A test workspace for integration tests
#[allow(dead_code)]
pub struct TestWorkspace {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to workspace root
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TestWorkspace {
    /// Create a new test workspace with its own scratch directory base
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        std::fs::create_dir_all(path.join("tmp")).expect("Failed to create tmp directory");
        Self { temp, path }
    }

    /// Write a file in workspace
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from workspace
    pub fn read_file(&self, path: &str) -> String {
        std::fs::read_to_string(self.path.join(path)).expect("Failed to read file")
    }

    /// Check if a file exists in workspace
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// Write a jar with the given members, in order
    pub fn build_jar(&self, name: &str, members: &[(&str, &str)]) -> PathBuf {
        let path = self.path.join(name);
        let file = File::create(&path).expect("Failed to create jar");
        let mut writer = ZipWriter::new(file);
        for (member, contents) in members {
            writer
                .start_file(*member, SimpleFileOptions::default())
                .expect("Failed to start member");
            writer
                .write_all(contents.as_bytes())
                .expect("Failed to write member");
        }
        writer.finish().expect("Failed to finish jar");
        path
    }

    /// Write the fake disassembler and return its path
    #[cfg(unix)]
    pub fn fake_krakatau(&self) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.path.join("bin/krak2");
        self.write_file("bin/krak2", FAKE_KRAKATAU);
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to make fake krak2 executable");
        path
    }

    /// Lines logged by the fake disassembler so far
    pub fn krak_log(&self) -> Vec<String> {
        std::fs::read_to_string(self.path.join("krak.log"))
            .map(|log| log.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Entries left behind in the scratch directory base
    pub fn leftover_scratch(&self) -> usize {
        std::fs::read_dir(self.path.join("tmp"))
            .expect("Failed to read tmp directory")
            .count()
    }

    /// Command running the binary in this workspace with the builtin engine
    #[cfg(unix)]
    pub fn jarpatch_cmd(&self) -> Command {
        let mut cmd = jarpatch_cmd();
        cmd.current_dir(&self.path)
            .env("JARPATCH_ENGINE", "builtin")
            .env("JARPATCH_KRAKATAU", self.fake_krakatau())
            .env("KRAK_LOG", self.path.join("krak.log"))
            .env("TMPDIR", self.path.join("tmp"));
        cmd
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Command for the real binary with a clean `JARPATCH_*` environment
#[allow(dead_code)]
// Temporary fix for deprecated cargo_bin - will be updated when build-dir issues are resolved
#[allow(deprecated)]
pub fn jarpatch_cmd() -> Command {
    let mut cmd = Command::cargo_bin("jarpatch").expect("jarpatch binary not built");
    for var in [
        "JARPATCH_VERBOSITY",
        "JARPATCH_DISASM_MODE",
        "JARPATCH_DIFF_OPTIONS",
        "JARPATCH_ENGINE",
        "JARPATCH_KRAKATAU",
        "JARPATCH_DIFF_CMD",
        "JARPATCH_PATCH_CMD",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Read every member of an in-memory archive, in order
#[allow(dead_code)]
pub fn read_jar(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("Not a zip archive");
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

/// Contents of one member of a jar file
#[allow(dead_code)]
pub fn jar_member(jar: &Path, name: &str) -> Option<Vec<u8>> {
    let bytes = std::fs::read(jar).expect("Failed to read jar");
    read_jar(&bytes)
        .into_iter()
        .find(|(member, _)| member == name)
        .map(|(_, contents)| contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_file_operations() {
        let workspace = TestWorkspace::new();
        workspace.write_file("edited/readme.txt", "hello");
        assert!(workspace.file_exists("edited/readme.txt"));
        assert_eq!(workspace.read_file("edited/readme.txt"), "hello");
        assert_eq!(workspace.leftover_scratch(), 0);
    }

    #[test]
    fn test_workspace_build_jar() {
        let workspace = TestWorkspace::new();
        let jar = workspace.build_jar("app.jar", &[("A.class", "A"), ("readme.txt", "hi")]);
        assert_eq!(jar_member(&jar, "readme.txt"), Some(b"hi".to_vec()));
        assert_eq!(jar_member(&jar, "B.class"), None);
    }
}
