use crate::model::Level;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "semvercheck")]
#[command(about = "Compute the semantic version bump between two codebase snapshots")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log analysis steps to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Compare two snapshot directories and suggest a version bump
    Compare(CompareArgs),

    /// List every change code with its default level
    Codes(CodesArgs),

    /// Generate a starter .semvercheck.toml configuration file
    Init(InitArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct CompareArgs {
    /// Snapshot of the previous release
    pub before: PathBuf,

    /// Snapshot of the candidate release
    pub after: PathBuf,

    /// Fail when the suggested bump exceeds this level (overrides the config file)
    #[arg(long)]
    pub allowed_level: Option<Level>,

    /// Output format
    #[arg(short, long, default_value = "markdown")]
    pub format: OutputFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Manifest families to scan (comma-separated: php,database,di,xsd,system,less)
    #[arg(long, value_delimiter = ',')]
    pub contexts: Option<Vec<String>>,
}

#[derive(Parser, Debug, Clone)]
pub struct CodesArgs {
    /// Output format
    #[arg(short, long, default_value = "markdown")]
    pub format: OutputFormat,

    /// Apply level overrides from the .semvercheck.toml in this directory
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Path where to create .semvercheck.toml (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compare() {
        let cli = Cli::parse_from([
            "semvercheck",
            "compare",
            "old",
            "new",
            "--allowed-level",
            "minor",
            "--format",
            "json",
            "--contexts",
            "php,database",
        ]);

        let Command::Compare(args) = cli.command else {
            panic!("expected compare");
        };
        assert_eq!(args.before, PathBuf::from("old"));
        assert_eq!(args.allowed_level, Some(Level::Minor));
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(
            args.contexts,
            Some(vec!["php".to_string(), "database".to_string()])
        );
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::parse_from(["semvercheck", "codes", "--verbose"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Codes(_)));
    }
}
