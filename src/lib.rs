pub mod analysis;
pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod fs;
pub mod graph;
pub mod model;
pub mod output;
pub mod report;
pub mod snapshot;
pub mod style;

pub use api::{CheckOptions, CheckResult, SemverError, check, check_with_fs};
pub use cli::Cli;
pub use commands::{cmd_codes, cmd_compare, cmd_init};
pub use config::Config;
pub use model::{Context, Level, Operation};
pub use report::Report;
