use clap::Parser;
use std::path::PathBuf;

/// Arguments for the diff command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Write a patch to stdout:\n    jarpatch diff app.jar edited/ > app.patch\n\n\
                  Write a patch to a file:\n    jarpatch diff app.jar edited/ -o app.patch\n\n\
                  Show progress while diffing:\n    jarpatch --verbosity 2 diff app.jar edited/")]
pub struct DiffArgs {
    /// Original archive (.jar, .zip, .war or .ear)
    pub original: PathBuf,

    /// Directory holding the edited, unpacked archive contents
    pub edited: PathBuf,

    /// Write the patch bundle here instead of stdout
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}
