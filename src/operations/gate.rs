//! Disassembly gate
//!
//! Disassembly is the slow step and the one that can lose information, so a
//! class is only disassembled when its bytes differ from its counterpart.

use std::path::Path;

use crate::error::Result;
use crate::hash::files_identical;

/// Decide whether `candidate` has to be disassembled
///
/// Returns `false` only when both files exist and are byte-identical. When
/// either side is missing (an added or removed class) the present side has to
/// be disassembled.
pub fn should_disassemble(candidate: &Path, reference: &Path) -> Result<bool> {
    if candidate.is_file() && reference.is_file() {
        Ok(!files_identical(candidate, reference)?)
    } else {
        Ok(true)
    }
}
