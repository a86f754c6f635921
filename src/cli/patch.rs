use clap::Parser;
use std::path::PathBuf;

/// Arguments for the patch command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Rebuild an archive to stdout:\n    jarpatch patch app.jar app.patch > patched.jar\n\n\
                  Rebuild an archive to a file:\n    jarpatch patch app.jar app.patch -o patched.jar\n\n\
                  Patch without external diff tools:\n    jarpatch --engine builtin patch app.jar app.patch -o patched.jar")]
pub struct PatchArgs {
    /// Original archive (.jar, .zip, .war or .ear)
    pub original: PathBuf,

    /// Patch bundle produced by `jarpatch diff`
    pub bundle: PathBuf,

    /// Write the rebuilt archive here instead of stdout
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}
