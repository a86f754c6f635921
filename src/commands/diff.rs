//! Diff command CLI wrapper

use crate::cli::DiffArgs;
use crate::error::Result;
use crate::operations::DiffOperation;
use crate::tools::Toolchain;
use crate::ui::Reporter;

/// Run diff command
pub fn run(toolchain: &Toolchain, reporter: &dyn Reporter, args: DiffArgs) -> Result<()> {
    let bundle = DiffOperation::new(toolchain, reporter).execute(&args.original, &args.edited)?;
    super::write_artifact(args.output.as_deref(), bundle.text())
}
