//! Member classification
//!
//! Archive members are either compiled classes, which are diffed through their
//! disassembled text form, or passthrough files that are diffed as they are.
//! The kind depends on nothing but the path suffix.

use std::path::{Path, PathBuf};

/// Extension of a compiled class member
pub const CLASS_EXTENSION: &str = "class";

/// Extension of the disassembled text form of a class
pub const TEXT_EXTENSION: &str = "j";

/// How a member takes part in a diff or patch run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Compiled class, disassembled before diffing and reassembled after patching
    Reconstructible,
    /// Any other file, copied and diffed verbatim
    Passthrough,
}

impl MemberKind {
    /// Classify an archive or tree member by its suffix
    pub fn classify(path: impl AsRef<Path>) -> Self {
        if has_extension(path.as_ref(), CLASS_EXTENSION) {
            Self::Reconstructible
        } else {
            Self::Passthrough
        }
    }

    /// Classify a path named by a patch bundle.
    ///
    /// In a bundle, reconstructible members appear under their text-form name.
    pub fn classify_bundle_path(path: impl AsRef<Path>) -> Self {
        if has_extension(path.as_ref(), TEXT_EXTENSION) {
            Self::Reconstructible
        } else {
            Self::Passthrough
        }
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().is_some_and(|ext| ext == extension)
}

/// Path of the disassembled text form of a class: `a/B.class` -> `a/B.j`
pub fn text_path(class_path: &Path) -> PathBuf {
    class_path.with_extension(TEXT_EXTENSION)
}

/// Path of the compiled class for a text form: `a/B.j` -> `a/B.class`
pub fn class_path(text_path: &Path) -> PathBuf {
    text_path.with_extension(CLASS_EXTENSION)
}
