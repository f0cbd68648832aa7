mod codes;
mod compare;
mod init;

pub use codes::cmd_codes;
pub use compare::{EXIT_LEVEL_EXCEEDED, cmd_compare, cmd_compare_with_fs};
pub use init::{cmd_init, cmd_init_with_fs};

use crate::cli::OutputFormat;
use crate::fs::FileSystem;
use crate::style;
use std::io::{self, Write};
use std::path::Path;

/// Write rendered output to `path`, or to stdout with terminal styling for
/// markdown. Returns the exit code for a failed write.
pub(crate) fn emit(
    rendered: &str,
    format: OutputFormat,
    path: Option<&Path>,
    fs: &dyn FileSystem,
) -> Result<(), i32> {
    let result = match path {
        Some(path) => fs.write(path, rendered),
        None if format == OutputFormat::Markdown => {
            style::render_markdown(rendered, &mut io::stdout())
        }
        None => write!(io::stdout(), "{}", rendered),
    };

    result.map_err(|e| {
        style::error(&format!("Failed to write output: {}", e));
        1
    })
}
