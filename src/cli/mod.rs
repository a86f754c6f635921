//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - diff: Diff command arguments
//! - patch: Patch command arguments
//!
//! Global options double as environment variables so wrapper scripts can set
//! them once. An explicit flag always wins over the environment.

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand, ValueEnum};

pub mod diff;
pub mod patch;

pub use diff::DiffArgs;
pub use patch::PatchArgs;

/// Jarpatch - readable patches for compiled class archives
#[derive(Parser, Debug)]
#[command(
    name = "jarpatch",
    author,
    version,
    color = clap::ColorChoice::Auto,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Readable patches for compiled class archives",
    long_about = "Jarpatch diffs and patches .jar archives through the disassembled text form of \
                  their classes. Only classes that actually changed are disassembled; every other \
                  member is carried over untouched.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  jarpatch diff app.jar edited/ > app.patch    \x1b[90m# Record edits as a patch\x1b[0m\n   \
                  jarpatch patch app.jar app.patch > new.jar   \x1b[90m# Rebuild the archive\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Diagnostic verbosity: 0 = silent, 1 = errors, 2 = errors, warnings and progress
    #[arg(
        long,
        global = true,
        env = "JARPATCH_VERBOSITY",
        default_value_t = 1,
        value_parser = clap::value_parser!(u8).range(0..=2)
    )]
    pub verbosity: u8,

    /// Disassembler round-trip profile, identical for diff and patch runs
    #[arg(
        long,
        global = true,
        env = "JARPATCH_DISASM_MODE",
        default_value = "roundtrip"
    )]
    pub disasm_mode: String,

    /// Options passed to the external diff engine
    #[arg(
        long,
        global = true,
        env = "JARPATCH_DIFF_OPTIONS",
        default_value = "-ruN",
        allow_hyphen_values = true
    )]
    pub diff_options: String,

    /// Diff/patch engine
    #[arg(
        long,
        global = true,
        env = "JARPATCH_ENGINE",
        value_enum,
        default_value_t = Engine::External
    )]
    pub engine: Engine,

    /// Disassembler/assembler command
    #[arg(long, global = true, env = "JARPATCH_KRAKATAU", default_value = "krak2")]
    pub krakatau: String,

    /// Diff command used by the external engine
    #[arg(long, global = true, env = "JARPATCH_DIFF_CMD", default_value = "diff")]
    pub diff_cmd: String,

    /// Patch command used by the external engine
    #[arg(long, global = true, env = "JARPATCH_PATCH_CMD", default_value = "patch")]
    pub patch_cmd: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a patch bundle describing how a directory differs from an archive
    Diff(DiffArgs),

    /// Apply a patch bundle to an archive and write the rebuilt archive
    Patch(PatchArgs),
}

/// Which implementation computes and applies unified diffs
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Engine {
    /// `diff` and `patch` subprocesses
    External,
    /// In-process engine, no external tools besides the disassembler
    Builtin,
}
