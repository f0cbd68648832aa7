use crate::api::{CheckOptions, check_with_fs};
use crate::cli::{CompareArgs, OutputFormat};
use crate::fs::{FileSystem, default_fs};
use crate::output::{JsonOutput, MarkdownOutput, OutputFormatter};
use crate::style;

use super::emit;

/// Exit code when the suggested bump is above the allowed level.
pub const EXIT_LEVEL_EXCEEDED: i32 = 2;

pub fn cmd_compare(args: CompareArgs) -> i32 {
    cmd_compare_with_fs(args, default_fs())
}

pub fn cmd_compare_with_fs(args: CompareArgs, fs: &dyn FileSystem) -> i32 {
    let options = CheckOptions {
        allowed_level: args.allowed_level,
        contexts: args.contexts.clone().unwrap_or_default(),
        ..Default::default()
    };

    let result = match check_with_fs(&args.before, &args.after, options, fs) {
        Ok(result) => result,
        Err(e) => {
            style::error(&e.to_string());
            return 1;
        }
    };

    let allowed = Some(result.allowed_level());
    let mut buffer = Vec::new();
    let formatted = match args.format {
        OutputFormat::Markdown => {
            MarkdownOutput::new(allowed).format(result.analysis(), &mut buffer)
        }
        OutputFormat::Json => JsonOutput::new(allowed).format(result.analysis(), &mut buffer),
    };
    if let Err(e) = formatted {
        style::error(&format!("Failed to format report: {}", e));
        return 1;
    }

    let rendered = String::from_utf8_lossy(&buffer);
    if let Err(code) = emit(&rendered, args.format, args.output.as_deref(), fs) {
        return code;
    }

    if let Some(path) = &args.output {
        style::success(&format!(
            "Suggested bump {} written to {}",
            style::level(result.level()),
            style::path(path)
        ));
    }

    if result.is_allowed() {
        0
    } else {
        style::error(&format!(
            "Suggested bump {} exceeds the allowed level {}",
            style::level(result.level()),
            style::level(result.allowed_level())
        ));
        style::hint("Raise allowed_level in .semvercheck.toml or pass --allowed-level");
        EXIT_LEVEL_EXCEEDED
    }
}
