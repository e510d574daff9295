//! learnpath
//!
//! Builds a knowledge graph of related topics for a user's trivia topics and
//! orders it into a learning path.
//!
//! # Usage
//!
//! ```bash
//! learnpath graph --topics-file topics.json --topic t1 --topic t2
//! learnpath plan --topics-file topics.json --topic t1 [--strategy shortest|ranked] [--start t1]
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/learnpath/config.toml)
//! 3. `--config` file
//! 4. Environment variables (LEARNPATH_*, `__` between nested keys)
//! 5. CLI flags

use anyhow::Result;
use clap::Parser;

use learnpath_cli::{build_graph, init_tracing, load_settings, plan, print_json, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_deref(), cli.log_level.as_deref(), cli.offline)?;
    init_tracing(&settings.log_level)?;

    match cli.command {
        Commands::Graph(args) => {
            let graph = build_graph(&settings, &args).await?;
            print_json(&graph)?;
        }
        Commands::Plan {
            graph,
            strategy,
            start,
        } => {
            let output = plan(&settings, &graph, strategy.map(Into::into), start.as_deref()).await?;
            print_json(&output)?;
        }
    }

    Ok(())
}
