mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    // stdout carries JSON results, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Observe => commands::observe::run(),
        Commands::Reflect { query, limit } => commands::reflect::run(query, limit),
        Commands::Stats => commands::stats::run(),
        Commands::Serve => commands::serve::run(),
        Commands::Version => commands::version::run(),
    }
}
