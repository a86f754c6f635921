//! Patch command CLI wrapper

use crate::cli::PatchArgs;
use crate::error::Result;
use crate::operations::PatchOperation;
use crate::tools::Toolchain;
use crate::ui::Reporter;

/// Run patch command
///
/// The bundle is parsed before any scratch directory is created.
pub fn run(toolchain: &Toolchain, reporter: &dyn Reporter, args: PatchArgs) -> Result<()> {
    let bundle = PatchOperation::load_bundle(&args.bundle)?;
    let archive = PatchOperation::new(toolchain, reporter).execute(&args.original, &bundle)?;
    super::write_artifact(args.output.as_deref(), &archive)
}
