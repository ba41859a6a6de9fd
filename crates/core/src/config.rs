use crate::error::{PipelineError, PipelineResult};
use serde::Deserialize;
use std::path::Path;

/// Root application configuration. Loaded from environment variables
/// with the prefix `PIPELINE_TRACKER__` and an optional TOML config file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_json")]
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Run the eight calculators as independent blocking tasks.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    /// Attach month-over-month deltas when a single month is requested.
    #[serde(default = "default_compare_previous_month")]
    pub compare_previous_month: bool,
}

// Default functions
fn default_node_id() -> String {
    "pipeline-01".to_string()
}
fn default_log_level() -> String {
    "pipeline_tracker=info,pipeline_reporting=info,pipeline_store=info".to_string()
}
fn default_log_json() -> bool {
    false
}
fn default_parallel() -> bool {
    true
}
fn default_compare_previous_month() -> bool {
    true
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: default_log_json(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
            compare_previous_month: default_compare_previous_month(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            log: LogConfig::default(),
            dashboard: DashboardConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables only.
    pub fn load() -> PipelineResult<Self> {
        Self::load_from(None)
    }

    /// Load configuration from an optional TOML file, then environment
    /// variables. Environment values take precedence over the file.
    pub fn load_from(path: Option<&Path>) -> PipelineResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("PIPELINE_TRACKER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        config
            .try_deserialize()
            .map_err(|e| PipelineError::Config(e.to_string()))
    }
}
