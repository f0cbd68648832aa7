use crate::analysis::{SeverityTable, all_rules};
use crate::cli::{CodesArgs, OutputFormat};
use crate::config::Config;
use crate::fs::default_fs;
use crate::output::{JsonOutput, MarkdownOutput, OutputFormatter};
use crate::style;

use super::emit;

pub fn cmd_codes(args: CodesArgs) -> i32 {
    let fs = default_fs();

    let table = match &args.config {
        Some(root) => match Config::load(root, fs) {
            Ok(config) => config.severity,
            Err(e) => {
                style::error(&format!("Failed to load config: {}", e));
                return 1;
            }
        },
        None => SeverityTable::new(),
    };

    let codes: Vec<_> = all_rules()
        .into_iter()
        .map(|(context, kind, _)| {
            let rule = table.rule(&context, kind);
            (context, kind, rule)
        })
        .collect();

    let mut buffer = Vec::new();
    let formatted = match args.format {
        OutputFormat::Markdown => MarkdownOutput::new(None).format_codes(&codes, &mut buffer),
        OutputFormat::Json => JsonOutput::new(None).format_codes(&codes, &mut buffer),
    };
    if let Err(e) = formatted {
        style::error(&format!("Failed to format codes: {}", e));
        return 1;
    }

    match emit(&String::from_utf8_lossy(&buffer), args.format, None, fs) {
        Ok(()) => 0,
        Err(code) => code,
    }
}
