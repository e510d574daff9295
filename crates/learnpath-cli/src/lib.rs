//! learnpath CLI library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (graph, plan)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands, GraphArgs, StrategyArg};
pub use commands::{build_graph, init_tracing, load_settings, plan, print_json, PlanOutput};
