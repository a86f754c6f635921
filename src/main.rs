//! Jarpatch - readable patches for compiled class archives
//!
//! Diffs an archive against an edited directory through the disassembled
//! text form of its classes, and applies the resulting patch bundle to
//! rebuild an archive.

use clap::Parser;

mod archive;
mod bundle;
mod cli;
mod commands;
mod config;
mod error;
mod hash;
mod member;
mod operations;
mod path_utils;
#[cfg(test)]
mod test_fixtures;
mod tools;
mod ui;
mod workspace;

use cli::{Cli, Commands};
use config::{Settings, Verbosity};
use error::{JarpatchError, exit_code};
use tools::Toolchain;
use ui::{ConsoleReporter, Reporter, SilentReporter};

fn main() {
    let cli = Cli::try_parse().unwrap_or_else(|e| {
        let _ = e.print();
        // Help and version requests are not usage errors
        std::process::exit(if e.use_stderr() { exit_code::USAGE } else { 0 });
    });
    let settings = Settings::from(&cli);
    let reporter: Box<dyn Reporter> = if settings.verbosity == Verbosity::Silent {
        Box::new(SilentReporter)
    } else {
        Box::new(ConsoleReporter::new(settings.verbosity))
    };

    if let Err(e) = workspace::interrupt::install_handler() {
        reporter.warning(&format!("Cannot install interrupt handler: {e}"));
    }

    reporter.progress(&format!(
        "Using {} in {} mode",
        settings.tools.krakatau,
        settings.disasm_mode.name()
    ));
    let toolchain = Toolchain::from_settings(&settings);

    let result = match cli.command {
        Commands::Diff(args) => commands::diff::run(&toolchain, reporter.as_ref(), args),
        Commands::Patch(args) => commands::patch::run(&toolchain, reporter.as_ref(), args),
    };

    if let Err(e) = result {
        // A tool killed by Ctrl+C fails the run before the handler exits
        let e = workspace::interrupt::settle(e);
        if !matches!(e, JarpatchError::Interrupted) {
            reporter.error(&e);
        }
        std::process::exit(e.exit_code());
    }
}
