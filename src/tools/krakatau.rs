//! Krakatau disassembler/assembler driven as a subprocess

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use super::{Disassembler, run_tool};
use crate::config::DisasmMode;
use crate::error::{Result, tools};
use crate::path_utils::ensure_parent;

/// Runs `krak2 dis` and `krak2 asm` on single files
#[derive(Debug, Clone)]
pub struct Krakatau {
    command: String,
    mode: DisasmMode,
}

impl Krakatau {
    pub fn new(command: impl Into<String>, mode: DisasmMode) -> Self {
        Self {
            command: command.into(),
            mode,
        }
    }

    fn disassemble_args(&self, class_file: &Path, text_file: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["dis".into()];
        if let Some(flag) = self.mode.flag() {
            args.push(flag.into());
        }
        args.push("--out".into());
        args.push(text_file.into());
        args.push(class_file.into());
        args
    }

    fn assemble_args(text_file: &Path, class_file: &Path) -> Vec<OsString> {
        vec![
            "asm".into(),
            "--out".into(),
            class_file.into(),
            text_file.into(),
        ]
    }
}

impl Disassembler for Krakatau {
    fn disassemble(&self, class_file: &Path, text_file: &Path) -> Result<()> {
        let member = class_file.display().to_string();
        if !class_file.is_file() {
            return Err(tools::disassembly_failed(member, "no such member"));
        }
        ensure_parent(text_file).map_err(|e| tools::disassembly_failed(&member, e.to_string()))?;

        run_tool(
            Command::new(&self.command).args(self.disassemble_args(class_file, text_file)),
            &[0],
        )
        .map_err(|reason| tools::disassembly_failed(&member, reason))?;

        if !text_file.is_file() {
            return Err(tools::disassembly_failed(member, "disassembler wrote no output"));
        }
        Ok(())
    }

    fn assemble(&self, text_file: &Path, class_file: &Path) -> Result<()> {
        let member = text_file.display().to_string();
        ensure_parent(class_file).map_err(|e| tools::assembly_failed(&member, e.to_string()))?;

        run_tool(
            Command::new(&self.command).args(Self::assemble_args(text_file, class_file)),
            &[0],
        )
        .map_err(|reason| tools::assembly_failed(&member, reason))?;

        if !class_file.is_file() {
            return Err(tools::assembly_failed(member, "assembler wrote no output"));
        }
        Ok(())
    }
}
