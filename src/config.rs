//! Resolved run settings
//!
//! Command-line flags and `JARPATCH_*` variables are folded into one immutable
//! [`Settings`] value in `main` and handed down to every component.

use crate::cli::{Cli, Engine};

/// How much diagnostic narration reaches stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent,
    Errors,
    Progress,
}

impl From<u8> for Verbosity {
    fn from(level: u8) -> Self {
        match level {
            0 => Self::Silent,
            1 => Self::Errors,
            _ => Self::Progress,
        }
    }
}

/// Disassembler round-trip profile
///
/// The same profile must be used when a patch is made and when it is applied,
/// otherwise the hunks no longer match the regenerated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisasmMode(String);

impl DisasmMode {
    pub const ROUNDTRIP: &'static str = "roundtrip";
    pub const PLAIN: &'static str = "plain";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Flag selecting this profile on the disassembler command line
    pub fn flag(&self) -> Option<String> {
        let name = self.0.trim();
        if name.is_empty() || name == Self::PLAIN {
            None
        } else {
            Some(format!("--{}", name.trim_start_matches('-')))
        }
    }
}

impl Default for DisasmMode {
    fn default() -> Self {
        Self::new(Self::ROUNDTRIP)
    }
}

/// Commands used for the external collaborators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommands {
    pub krakatau: String,
    pub diff: String,
    pub patch: String,
}

impl Default for ToolCommands {
    fn default() -> Self {
        Self {
            krakatau: "krak2".to_string(),
            diff: "diff".to_string(),
            patch: "patch".to_string(),
        }
    }
}

/// Settings for one diff or patch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub verbosity: Verbosity,
    pub disasm_mode: DisasmMode,
    /// Options for the external diff engine, already split
    pub diff_options: Vec<String>,
    pub engine: Engine,
    pub tools: ToolCommands,
}

impl Settings {
    pub const DEFAULT_DIFF_OPTIONS: &'static str = "-ruN";
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::Errors,
            disasm_mode: DisasmMode::default(),
            diff_options: split_options(Self::DEFAULT_DIFF_OPTIONS),
            engine: Engine::External,
            tools: ToolCommands::default(),
        }
    }
}

impl From<&Cli> for Settings {
    fn from(cli: &Cli) -> Self {
        Self {
            verbosity: Verbosity::from(cli.verbosity),
            disasm_mode: DisasmMode::new(cli.disasm_mode.clone()),
            diff_options: split_options(&cli.diff_options),
            engine: cli.engine,
            tools: ToolCommands {
                krakatau: cli.krakatau.clone(),
                diff: cli.diff_cmd.clone(),
                patch: cli.patch_cmd.clone(),
            },
        }
    }
}

fn split_options(options: &str) -> Vec<String> {
    options.split_whitespace().map(str::to_string).collect()
}
