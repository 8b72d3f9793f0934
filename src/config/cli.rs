use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "model-adapters")]
#[command(about = "Inspect data-source adapters and query remote resources")]
pub struct CliConfig {
    #[arg(long, short, default_value = "adapters.toml")]
    pub config: PathBuf,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List the adapter table and which adapters are linked
    Adapters,

    /// Load records of a model
    Load {
        model: String,

        #[arg(long)]
        id: Option<String>,

        /// Filter conditions as a JSON object
        #[arg(long = "where")]
        conditions: Option<String>,

        /// Sort specification as JSON, e.g. '{"name":"asc"}'
        #[arg(long)]
        sort: Option<String>,

        #[arg(long)]
        limit: Option<u64>,

        #[arg(long)]
        skip: Option<u64>,

        #[arg(long)]
        nocase: bool,

        #[arg(long)]
        count: bool,
    },

    /// Remove records of a model
    Remove {
        model: String,

        #[arg(long)]
        id: Option<String>,

        #[arg(long = "where")]
        conditions: Option<String>,
    },
}
