//! Configuration loading for learnpath.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/learnpath/config.toml.

use config::{Config, Environment, File, Map};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::LearnPathError;

/// Which text-generation backend answers related-topic requests.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceProvider {
    /// DeepSeek chat completions (OpenAI-compatible)
    #[default]
    Deepseek,
    /// OpenAI chat completions
    Openai,
    /// Plain endpoint accepting `{topic, count}` and returning the JSON payload
    Endpoint,
    /// Canned offline responses, no network
    Static,
}

/// Text-generation source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    #[serde(default)]
    pub provider: SourceProvider,

    /// Model name (e.g., "deepseek-chat", "gpt-4o-mini")
    #[serde(default = "default_source_model")]
    pub model: String,

    /// API key (loaded from env var, not stored in config file)
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL override for chat providers
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Full URL for the `endpoint` provider
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// HTTP client timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_source_model() -> String {
    "deepseek-chat".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            provider: SourceProvider::default(),
            model: default_source_model(),
            api_key: None,
            api_base_url: None,
            endpoint_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Retry policy for the text-generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Total attempts including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Growth factor applied to each subsequent delay
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Upper bound for a single delay
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}
fn default_initial_delay_ms() -> u64 {
    2000
}
fn default_multiplier() -> f64 {
    2.0
}
fn default_max_delay_ms() -> u64 {
    10_000
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            multiplier: default_multiplier(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

/// Relevance scoring variant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// Clamped to [1, 10], no positional bonus, no jitter
    Simple,
    /// Clamped to [4, 10] with positional bonus, jitter and unique scores
    #[default]
    Advanced,
}

/// Scoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub mode: ScoringMode,

    /// Re-scoring attempts on a collision before perturbing
    #[serde(default = "default_max_unique_attempts")]
    pub max_unique_attempts: u32,
}

fn default_max_unique_attempts() -> u32 {
    5
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            mode: ScoringMode::default(),
            max_unique_attempts: default_max_unique_attempts(),
        }
    }
}

/// Graph construction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSettings {
    /// Related topics requested per main topic
    #[serde(default = "default_related_per_topic")]
    pub related_per_topic: usize,

    /// Related-topic fetches in flight at once
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,

    /// Per-attempt timeout for the text-generation call
    #[serde(default = "default_timeout_secs")]
    pub fetch_timeout_secs: u64,

    #[serde(default)]
    pub retry: RetrySettings,

    #[serde(default)]
    pub scoring: ScoringSettings,
}

fn default_related_per_topic() -> usize {
    5
}

fn default_max_concurrent_fetches() -> usize {
    3
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            related_per_topic: default_related_per_topic(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            fetch_timeout_secs: default_timeout_secs(),
            retry: RetrySettings::default(),
            scoring: ScoringSettings::default(),
        }
    }
}

impl GraphSettings {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.related_per_topic == 0 {
            return Err("related_per_topic must be > 0".to_string());
        }
        if self.max_concurrent_fetches == 0 {
            return Err("max_concurrent_fetches must be > 0".to_string());
        }
        if self.fetch_timeout_secs == 0 {
            return Err("fetch_timeout_secs must be > 0".to_string());
        }
        if self.retry.max_attempts == 0 {
            return Err("retry.max_attempts must be > 0".to_string());
        }
        if !(self.retry.multiplier.is_finite() && self.retry.multiplier >= 1.0) {
            return Err(format!(
                "retry.multiplier must be >= 1.0, got {}",
                self.retry.multiplier
            ));
        }
        Ok(())
    }
}

/// Learning-path ordering strategy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlanStrategy {
    /// Single shortest path from a start topic to its nearest neighbour
    Shortest,
    /// Main topics first, then related topics by summed edge weight
    #[default]
    Ranked,
}

/// Planner configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannerSettings {
    #[serde(default)]
    pub strategy: PlanStrategy,
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub source: SourceSettings,

    #[serde(default)]
    pub graph: GraphSettings,

    #[serde(default)]
    pub planner: PlannerSettings,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            source: SourceSettings::default(),
            graph: GraphSettings::default(),
            planner: PlannerSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/learnpath/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (LEARNPATH_*)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, LearnPathError> {
        let config_dir = ProjectDirs::from("", "", "learnpath")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        Self::load_layers(&config_dir, cli_config_path, None)
    }

    /// Layered load rooted at `config_dir`. `env` replaces the process
    /// environment when given.
    fn load_layers(
        config_dir: &Path,
        cli_config_path: Option<&str>,
        env: Option<Map<String, String>>,
    ) -> Result<Self, LearnPathError> {
        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            // 1. Built-in defaults
            .set_default("log_level", default_log_level())
            .map_err(|e| LearnPathError::Config(e.to_string()))?
            .set_default("source.model", default_source_model())
            .map_err(|e| LearnPathError::Config(e.to_string()))?
            .set_default("graph.related_per_topic", default_related_per_topic() as i64)
            .map_err(|e| LearnPathError::Config(e.to_string()))?
            .set_default(
                "graph.max_concurrent_fetches",
                default_max_concurrent_fetches() as i64,
            )
            .map_err(|e| LearnPathError::Config(e.to_string()))?
            // 2. Default config file
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        // 3. CLI-specified config file (higher precedence than default)
        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // 4. Environment variables
        // Format: LEARNPATH_LOG_LEVEL, LEARNPATH_SOURCE__API_KEY, LEARNPATH_GRAPH__RELATED_PER_TOPIC
        builder = builder.add_source(
            Environment::with_prefix("LEARNPATH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config = builder
            .build()
            .map_err(|e| LearnPathError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| LearnPathError::Config(e.to_string()))?;

        settings.graph.validate().map_err(LearnPathError::Config)?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.source.provider, SourceProvider::Deepseek);
        assert_eq!(settings.source.model, "deepseek-chat");
        assert_eq!(settings.graph.related_per_topic, 5);
        assert_eq!(settings.graph.fetch_timeout_secs, 30);
        assert_eq!(settings.planner.strategy, PlanStrategy::Ranked);
    }

    #[test]
    fn test_retry_defaults() {
        let retry = RetrySettings::default();
        assert_eq!(retry.max_attempts, 3);
        assert_eq!(retry.initial_delay_ms, 2000);
        assert!((retry.multiplier - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scoring_defaults() {
        let scoring = ScoringSettings::default();
        assert_eq!(scoring.mode, ScoringMode::Advanced);
        assert_eq!(scoring.max_unique_attempts, 5);
    }

    /// Load with an empty config dir and no environment.
    fn load_isolated(cli_config_path: Option<&str>) -> Result<Settings, LearnPathError> {
        let dir = tempfile::tempdir().unwrap();
        Settings::load_layers(dir.path(), cli_config_path, Some(Map::new()))
    }

    #[test]
    fn test_load_with_defaults() {
        let settings = load_isolated(None).unwrap();
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.graph.related_per_topic, 5);
        assert_eq!(settings.graph.max_concurrent_fetches, 3);
        assert_eq!(settings.source.provider, SourceProvider::Deepseek);
    }

    #[test]
    fn test_default_config_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "log_level = \"warn\"\n[graph]\nrelated_per_topic = 4\n",
        )
        .unwrap();

        let settings = Settings::load_layers(dir.path(), None, Some(Map::new())).unwrap();
        assert_eq!(settings.log_level, "warn");
        assert_eq!(settings.graph.related_per_topic, 4);
    }

    #[test]
    fn test_env_overrides_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "log_level = \"warn\"\n").unwrap();

        let mut env = Map::new();
        env.insert("LEARNPATH_LOG_LEVEL".to_string(), "trace".to_string());
        env.insert(
            "LEARNPATH_GRAPH__RELATED_PER_TOPIC".to_string(),
            "7".to_string(),
        );

        let settings = Settings::load_layers(dir.path(), None, Some(env)).unwrap();
        assert_eq!(settings.log_level, "trace");
        assert_eq!(settings.graph.related_per_topic, 7);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("learnpath.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
log_level = "debug"

[source]
provider = "endpoint"
endpoint_url = "http://localhost:3000/api/get-related-topics"

[graph]
related_per_topic = 3

[graph.scoring]
mode = "simple"

[planner]
strategy = "shortest"
"#
        )
        .unwrap();

        let settings = load_isolated(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.source.provider, SourceProvider::Endpoint);
        assert_eq!(settings.graph.related_per_topic, 3);
        assert_eq!(settings.graph.max_concurrent_fetches, 3);
        assert_eq!(settings.graph.scoring.mode, ScoringMode::Simple);
        assert_eq!(settings.planner.strategy, PlanStrategy::Shortest);
    }

    #[test]
    fn test_load_rejects_invalid_graph_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[graph]\nrelated_per_topic = 0\n").unwrap();

        let result = load_isolated(Some(path.to_str().unwrap()));
        assert!(matches!(result, Err(LearnPathError::Config(_))));
    }

    #[test]
    fn test_missing_cli_config_is_error() {
        let result = load_isolated(Some("/nonexistent/learnpath-config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_graph_settings_validation() {
        let mut graph = GraphSettings::default();
        assert!(graph.validate().is_ok());

        graph.max_concurrent_fetches = 0;
        assert!(graph.validate().is_err());

        graph.max_concurrent_fetches = 2;
        graph.retry.multiplier = 0.5;
        assert!(graph.validate().is_err());
    }

    #[test]
    fn test_settings_serialization() {
        let settings = Settings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let decoded: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.source.provider, settings.source.provider);
        assert_eq!(decoded.planner.strategy, settings.planner.strategy);
    }
}
