//! Ctrl+C handling
//!
//! Destructors do not run when the process is killed by a signal, so live
//! scratch directories are tracked here and removed by the handler itself.
//!
//! The terminal delivers Ctrl+C to the whole process group, so a running
//! disassembler or diff dies with us and its failure can reach `main` before
//! the handler exits. The interrupt flag lets `main` report that failure as
//! the interrupt it really is.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::error::JarpatchError;

static LIVE_SCRATCH_DIRS: ScratchRegistry = ScratchRegistry::new();
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Scratch directories that must go if the process is interrupted
pub(crate) struct ScratchRegistry {
    dirs: Mutex<Vec<PathBuf>>,
}

impl ScratchRegistry {
    pub(crate) const fn new() -> Self {
        Self {
            dirs: Mutex::new(Vec::new()),
        }
    }

    fn dirs(&self) -> MutexGuard<'_, Vec<PathBuf>> {
        // A panic while holding the lock leaves the list itself intact
        self.dirs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub(crate) fn register(&self, path: &Path) {
        self.dirs().push(path.to_path_buf());
    }

    pub(crate) fn release(&self, path: &Path) {
        self.dirs().retain(|p| p != path);
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, path: &Path) -> bool {
        self.dirs().iter().any(|p| p == path)
    }

    /// Remove every registered directory and forget it
    pub(crate) fn remove_all(&self) {
        let dirs: Vec<PathBuf> = self.dirs().drain(..).collect();
        for dir in dirs {
            let _ = fs::remove_dir_all(dir);
        }
    }
}

/// Install the process-wide interrupt handler
///
/// On interrupt every live scratch directory is removed and the process exits
/// with [`crate::error::exit_code::INTERRUPTED`] without printing anything.
pub fn install_handler() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(|| {
        mark_interrupted();
        LIVE_SCRATCH_DIRS.remove_all();
        std::process::exit(JarpatchError::Interrupted.exit_code());
    })
}

/// Record that the run is being interrupted
pub(crate) fn mark_interrupted() {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Replace the error of an interrupted run by [`JarpatchError::Interrupted`]
pub fn settle(error: JarpatchError) -> JarpatchError {
    if INTERRUPTED.load(Ordering::SeqCst) {
        JarpatchError::Interrupted
    } else {
        error
    }
}

pub(crate) fn register(path: &Path) {
    LIVE_SCRATCH_DIRS.register(path);
}

pub(crate) fn release(path: &Path) {
    LIVE_SCRATCH_DIRS.release(path);
}

#[cfg(test)]
pub(crate) fn is_registered(path: &Path) -> bool {
    LIVE_SCRATCH_DIRS.contains(path)
}
