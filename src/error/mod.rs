//! Error types and handling for Jarpatch
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! Every variant maps to its own process exit code (see [`exit_code`]) so that
//! scripted callers can branch on the failure kind without parsing messages.
//!
//! Convenience constructors are grouped by domain:
//! - [`input`]: Invalid invocation inputs
//! - [`archive`]: Archive extraction and packaging
//! - [`tools`]: Disassembler, assembler, diff and patch engines

pub mod archive;
pub mod input;
pub mod tools;

use miette::Diagnostic;
use thiserror::Error;

/// Process exit codes, one per failure kind
pub mod exit_code {
    /// Malformed invocation rejected by the argument parser
    pub const USAGE: i32 = 2;
    pub const INPUT_VALIDATION: i32 = 3;
    pub const SCRATCH_ALLOCATION: i32 = 4;
    pub const EXTRACTION: i32 = 5;
    pub const PACKAGING: i32 = 6;
    pub const DISASSEMBLY: i32 = 7;
    pub const ASSEMBLY: i32 = 8;
    pub const DIFF_EXECUTION: i32 = 9;
    pub const NO_CHANGES: i32 = 10;
    pub const BUNDLE_EMPTY: i32 = 11;
    pub const PATCH_APPLICATION: i32 = 12;
    pub const IO: i32 = 13;
    /// 128 + SIGINT, as shells report it
    pub const INTERRUPTED: i32 = 130;
}

/// Main error type for Jarpatch operations
#[derive(Error, Diagnostic, Debug)]
pub enum JarpatchError {
    // Input errors
    #[error("Invalid input: {message}")]
    #[diagnostic(
        code(jarpatch::input::invalid),
        help("Run 'jarpatch --help' to see the expected arguments")
    )]
    InputValidation { message: String },

    // Scratch directory errors
    #[error("Failed to allocate scratch directory: {reason}")]
    #[diagnostic(
        code(jarpatch::workspace::scratch),
        help("Check that the temporary directory exists and is writable (TMPDIR)")
    )]
    ScratchAllocationFailed { reason: String },

    // Archive errors
    #[error("Failed to extract archive '{path}': {reason}")]
    #[diagnostic(code(jarpatch::archive::extract_failed))]
    ExtractionFailed { path: String, reason: String },

    #[error("Failed to package output archive: {reason}")]
    #[diagnostic(code(jarpatch::archive::pack_failed))]
    PackagingFailed { reason: String },

    // Collaborator errors
    #[error("Failed to disassemble '{member}': {reason}")]
    #[diagnostic(
        code(jarpatch::tools::disassembly_failed),
        help("Check that the patch was made against this archive and that the disassembler is installed")
    )]
    DisassemblyFailed { member: String, reason: String },

    #[error("Failed to assemble '{member}': {reason}")]
    #[diagnostic(
        code(jarpatch::tools::assembly_failed),
        help("The patched text is not valid assembler input")
    )]
    AssemblyFailed { member: String, reason: String },

    #[error("Diff execution failed: {reason}")]
    #[diagnostic(code(jarpatch::tools::diff_failed))]
    DiffExecutionFailed { reason: String },

    #[error("Failed to apply patch: {reason}")]
    #[diagnostic(
        code(jarpatch::tools::patch_failed),
        help("The patch does not match the supplied archive; it may have been made against a different version")
    )]
    PatchApplicationFailed { reason: String },

    // Outcome errors
    #[error("No changes between '{original}' and '{edited}'")]
    #[diagnostic(
        code(jarpatch::diff::no_changes),
        help("An empty patch would be useless, so none was written")
    )]
    NoChanges { original: String, edited: String },

    #[error("Patch bundle '{path}' does not name any member")]
    #[diagnostic(code(jarpatch::patch::bundle_empty))]
    BundleEmpty { path: String },

    #[error("Interrupted")]
    #[diagnostic(code(jarpatch::interrupted))]
    Interrupted,

    // Output errors
    #[error("Failed to write output: {reason}")]
    #[diagnostic(code(jarpatch::fs::output_failed))]
    OutputFailed { reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(jarpatch::fs::io_error))]
    IoError { message: String },
}

impl JarpatchError {
    /// Exit code the process terminates with for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InputValidation { .. } => exit_code::INPUT_VALIDATION,
            Self::ScratchAllocationFailed { .. } => exit_code::SCRATCH_ALLOCATION,
            Self::ExtractionFailed { .. } => exit_code::EXTRACTION,
            Self::PackagingFailed { .. } => exit_code::PACKAGING,
            Self::DisassemblyFailed { .. } => exit_code::DISASSEMBLY,
            Self::AssemblyFailed { .. } => exit_code::ASSEMBLY,
            Self::DiffExecutionFailed { .. } => exit_code::DIFF_EXECUTION,
            Self::NoChanges { .. } => exit_code::NO_CHANGES,
            Self::BundleEmpty { .. } => exit_code::BUNDLE_EMPTY,
            Self::PatchApplicationFailed { .. } => exit_code::PATCH_APPLICATION,
            Self::Interrupted => exit_code::INTERRUPTED,
            Self::OutputFailed { .. } | Self::IoError { .. } => exit_code::IO,
        }
    }
}

impl From<std::io::Error> for JarpatchError {
    fn from(err: std::io::Error) -> Self {
        JarpatchError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<walkdir::Error> for JarpatchError {
    fn from(err: walkdir::Error) -> Self {
        JarpatchError::IoError {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, JarpatchError>;
