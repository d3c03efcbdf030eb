mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use moodbridge_core::{MappingDomain, MoodbridgeConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "moodbridge", author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML config file. A missing file means built-in defaults.
    #[arg(short, long, default_value = "moodbridge.toml", env = "MOODBRIDGE_CONFIG", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recommend content for moving from one emotion to another
    Recommend {
        /// Current emotion (defaults to recommend.default_source)
        #[arg(long)]
        from: Option<String>,
        /// Desired emotion (defaults to recommend.default_target)
        #[arg(long)]
        to: Option<String>,
        /// Content type to include; repeat for several. Omit for every registered type.
        #[arg(long = "type")]
        types: Vec<String>,
        /// Maximum results per type
        #[arg(short, long)]
        limit: Option<usize>,
        /// Print the raw JSON result instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show which provider categories a transition maps to
    Categories {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Only show one mapping table
        #[arg(long)]
        domain: Option<MappingDomain>,
    },
    /// Import a JSON array of recommendation records into the store
    Seed { file: PathBuf },
    /// Run the HTTP gateway
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = MoodbridgeConfig::load_or_default(&args.config)
        .with_context(|| format!("Invalid config file {}", args.config.display()))?;

    match args.command {
        Command::Recommend {
            from,
            to,
            types,
            limit,
            json,
        } => commands::recommend(&config, from, to, types, limit, json).await,
        Command::Categories { from, to, domain } => commands::categories(&config, &from, &to, domain),
        Command::Seed { file } => commands::seed(&config, &file).await,
        Command::Serve { host, port } => commands::serve(&config, host, port).await,
    }
}
