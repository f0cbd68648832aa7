use clap::Parser;
use semvercheck::cli::{Cli, Command};
use semvercheck::{cmd_codes, cmd_compare, cmd_init};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "semvercheck={}",
            log_level
        )))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let exit_code = match cli.command {
        Command::Compare(args) => cmd_compare(args),
        Command::Codes(args) => cmd_codes(args),
        Command::Init(args) => cmd_init(args),
    };

    std::process::exit(exit_code);
}
