//! CLI argument parsing for the learnpath binary.
//!
//! CLI flags override every other configuration source.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use learnpath_types::PlanStrategy;

/// Knowledge graphs and learning paths for trivia topics
#[derive(Parser, Debug)]
#[command(name = "learnpath")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides the default config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Use canned related topics, no network access
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Inputs shared by every command that builds a graph.
#[derive(Args, Debug, Clone)]
pub struct GraphArgs {
    /// JSON file holding an array of topics
    #[arg(long)]
    pub topics_file: PathBuf,

    /// Owner of the topics
    #[arg(short, long, default_value = "local")]
    pub user: String,

    /// Main topic id (repeatable)
    #[arg(short, long = "topic", required = true)]
    pub topics: Vec<String>,

    /// Related topics requested per main topic
    #[arg(long)]
    pub related: Option<usize>,
}

/// learnpath commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the knowledge graph and print it as JSON
    Graph(GraphArgs),

    /// Build the graph and print it together with a learning path
    Plan {
        #[command(flatten)]
        graph: GraphArgs,

        /// Path ordering (default from config)
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,

        /// Start topic for the shortest strategy (default: first --topic)
        #[arg(long)]
        start: Option<String>,
    },
}

/// Path ordering selectable on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyArg {
    Shortest,
    Ranked,
}

impl From<StrategyArg> for PlanStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Shortest => PlanStrategy::Shortest,
            StrategyArg::Ranked => PlanStrategy::Ranked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_graph() {
        let cli = Cli::parse_from([
            "learnpath",
            "graph",
            "--topics-file",
            "topics.json",
            "--topic",
            "t1",
            "-t",
            "t2",
        ]);
        match cli.command {
            Commands::Graph(args) => {
                assert_eq!(args.topics_file, PathBuf::from("topics.json"));
                assert_eq!(args.topics, vec!["t1", "t2"]);
                assert_eq!(args.user, "local");
                assert!(args.related.is_none());
            }
            _ => panic!("Expected Graph command"),
        }
        assert!(!cli.offline);
    }

    #[test]
    fn test_cli_graph_requires_topic() {
        let result = Cli::try_parse_from(["learnpath", "graph", "--topics-file", "topics.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_plan_with_strategy() {
        let cli = Cli::parse_from([
            "learnpath",
            "plan",
            "--topics-file",
            "topics.json",
            "--user",
            "user-1",
            "--topic",
            "t1",
            "--strategy",
            "shortest",
            "--start",
            "t1",
        ]);
        match cli.command {
            Commands::Plan {
                graph,
                strategy,
                start,
            } => {
                assert_eq!(graph.user, "user-1");
                assert_eq!(strategy, Some(StrategyArg::Shortest));
                assert_eq!(start.as_deref(), Some("t1"));
            }
            _ => panic!("Expected Plan command"),
        }
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::parse_from([
            "learnpath",
            "graph",
            "--topics-file",
            "topics.json",
            "--topic",
            "t1",
            "--offline",
            "--config",
            "/path/to/config.toml",
            "--log-level",
            "debug",
        ]);
        assert!(cli.offline);
        assert_eq!(cli.config, Some("/path/to/config.toml".to_string()));
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_strategy_conversion() {
        assert_eq!(PlanStrategy::from(StrategyArg::Shortest), PlanStrategy::Shortest);
        assert_eq!(PlanStrategy::from(StrategyArg::Ranked), PlanStrategy::Ranked);
    }
}
