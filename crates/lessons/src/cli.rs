use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "lessons")]
#[command(version)]
#[command(about = "Turn recorded corrections into rules, hooks and skills")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record one observation (JSON on stdin)
    Observe,

    /// Cluster pending observations, or search with --query
    Reflect {
        /// Case-insensitive search across all observations
        #[arg(short, long)]
        query: Option<String>,

        /// Batch size (clusters) or result count (query)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show observation log statistics
    Stats,

    /// Answer line-delimited JSON requests on stdin until EOF
    Serve,

    /// Print version information
    Version,
}
