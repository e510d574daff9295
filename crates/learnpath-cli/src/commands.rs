//! Command implementations for the learnpath binary.
//!
//! Handles:
//! - graph: load topics, build the knowledge graph
//! - plan: build the graph and order it into a learning path

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use learnpath_graph::{
    source_from_settings, GraphBuilder, InMemoryTopicStore, PathPlanner, PlanRequest,
    RelatedTopicsFetcher,
};
use learnpath_types::{KnowledgeGraph, PlanStrategy, Settings, SourceProvider};

use crate::cli::GraphArgs;

/// Output of the `plan` command.
#[derive(Debug, Serialize)]
pub struct PlanOutput {
    pub strategy: PlanStrategy,
    pub request: PlanRequest,
    pub graph: KnowledgeGraph,
    pub path: Vec<String>,
}

/// Load layered settings and apply CLI overrides.
pub fn load_settings(
    config_path: Option<&str>,
    log_level_override: Option<&str>,
    offline: bool,
) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    apply_overrides(&mut settings, log_level_override, offline);
    Ok(settings)
}

/// CLI flags win over every config layer.
fn apply_overrides(settings: &mut Settings, log_level_override: Option<&str>, offline: bool) {
    if let Some(log_level) = log_level_override {
        settings.log_level = log_level.to_string();
    }
    if offline {
        settings.source.provider = SourceProvider::Static;
    }
}

/// Install the fmt subscriber. `RUST_LOG` wins over the configured level.
///
/// Logs go to stderr so stdout stays valid JSON.
pub fn init_tracing(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Build the knowledge graph for the requested main topics.
pub async fn build_graph(settings: &Settings, args: &GraphArgs) -> Result<KnowledgeGraph> {
    let mut graph_settings = settings.graph.clone();
    if let Some(related) = args.related {
        graph_settings.related_per_topic = related;
    }
    graph_settings
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid graph settings")?;

    let store = InMemoryTopicStore::from_json_file(&args.user, &args.topics_file)
        .with_context(|| format!("Failed to load topics from {}", args.topics_file.display()))?;

    let source = source_from_settings(&settings.source)
        .context("Failed to create related topics source")?;
    info!(
        source = %source.name(),
        topics = args.topics.len(),
        related_per_topic = graph_settings.related_per_topic,
        "Building knowledge graph"
    );

    let fetcher = RelatedTopicsFetcher::new(source, &graph_settings);
    let builder = GraphBuilder::new(Arc::new(store), Arc::new(fetcher), &graph_settings);

    Ok(builder.build(&args.user, &args.topics).await)
}

/// Build the graph and compute a learning path over it.
pub async fn plan(
    settings: &Settings,
    args: &GraphArgs,
    strategy: Option<PlanStrategy>,
    start: Option<&str>,
) -> Result<PlanOutput> {
    let graph = build_graph(settings, args).await?;

    let planner = PathPlanner::with_strategy(strategy.unwrap_or(settings.planner.strategy));
    let request = planner.request_for(&args.topics, start);
    let path = planner.plan(&graph, &request);

    info!(strategy = ?planner.strategy(), length = path.len(), "Learning path computed");

    Ok(PlanOutput {
        strategy: planner.strategy(),
        request,
        graph,
        path,
    })
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
