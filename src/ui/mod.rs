//! Diagnostic narration
//!
//! All narration goes through the [`Reporter`] trait and always to stderr,
//! because stdout carries the patch bundle or the rebuilt archive.
//!
//! What is shown depends on the verbosity:
//! - `0`: nothing
//! - `1`: errors only
//! - `2`: errors, warnings and step-by-step progress

use console::style;
use miette::Diagnostic;

use crate::config::Verbosity;
use crate::error::JarpatchError;

/// Sink for progress, warnings and errors of a run
pub trait Reporter: Send + Sync {
    /// A pipeline step or a per-member decision
    fn progress(&self, message: &str);

    /// Something was skipped or looks suspicious but the run continues
    fn warning(&self, message: &str);

    /// The error that terminates the run
    fn error(&self, error: &JarpatchError);
}

/// Reporter writing styled lines to stderr
pub struct ConsoleReporter {
    verbosity: Verbosity,
}

impl ConsoleReporter {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    fn shows_progress(&self) -> bool {
        self.verbosity >= Verbosity::Progress
    }

    fn shows_warnings(&self) -> bool {
        self.verbosity >= Verbosity::Progress
    }

    fn shows_errors(&self) -> bool {
        self.verbosity >= Verbosity::Errors
    }
}

impl Reporter for ConsoleReporter {
    fn progress(&self, message: &str) {
        if self.shows_progress() {
            eprintln!("{} {}", style("::").for_stderr().cyan().bold(), message);
        }
    }

    fn warning(&self, message: &str) {
        if self.shows_warnings() {
            eprintln!("{} {}", style("Warning:").for_stderr().yellow().bold(), message);
        }
    }

    fn error(&self, error: &JarpatchError) {
        if self.shows_errors() {
            eprintln!("{}", render_error(error));
        }
    }
}

/// Reporter that discards everything
#[derive(Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn progress(&self, _message: &str) {}

    fn warning(&self, _message: &str) {}

    fn error(&self, _error: &JarpatchError) {}
}

/// Format an error with its help text, if any
fn render_error(error: &JarpatchError) -> String {
    let mut out = format!("{} {}", style("Error:").for_stderr().red().bold(), error);
    if let Some(help) = error.help() {
        out.push_str(&format!("\n  {} {}", style("help:").for_stderr().dim(), help));
    }
    out
}
