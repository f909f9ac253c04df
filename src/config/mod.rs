//! Layered configuration for levelmine.
//!
//! Precedence, lowest to highest: embedded defaults, a
//! `levelmine.{toml,json,yaml,yml}` file in the working directory (or an
//! explicit `--config` path), `LEVELMINE_`-prefixed environment
//! variables, CLI flags.

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use figment::{
    Figment,
    providers::{Env, Format, Json, Toml, Yaml},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

/// Execution strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Single thread of control
    Sequential,
    /// Shared-memory fixed thread pool
    Threaded,
    /// Multi-process with collective aggregation
    Distributed,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutionMode::Sequential => "sequential",
            ExecutionMode::Threaded => "threaded",
            ExecutionMode::Distributed => "distributed",
        };
        write!(f, "{name}")
    }
}

/// Main configuration structure for levelmine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinerConfig {
    pub mining: MiningConfig,
    pub report: ReportConfig,
}

/// Mining parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiningConfig {
    /// Absolute minimum support count; must be positive. No default:
    /// it has to come from the CLI, the file, or the environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_support: Option<i64>,

    /// Worker threads or processes; 0 selects hardware concurrency.
    #[serde(default)]
    pub workers: usize,

    /// Execution mode used when the CLI does not name one.
    pub mode: ExecutionMode,
}

/// Reporting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Append-only timing log path.
    pub timing_log: PathBuf,
}

impl MinerConfig {
    /// Load the layered configuration. A custom path replaces the
    /// working-directory file lookup but keeps defaults and environment
    /// layering.
    pub fn load(custom_config: Option<&str>) -> Result<Self> {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG));

        if let Some(custom_path) = custom_config {
            figment = figment
                .merge(Toml::file(custom_path))
                .merge(Json::file(custom_path))
                .merge(Yaml::file(custom_path));
        } else {
            figment = figment
                .merge(Toml::file("levelmine.toml"))
                .merge(Json::file("levelmine.json"))
                .merge(Yaml::file("levelmine.yaml"))
                .merge(Yaml::file("levelmine.yml"));
        }

        // Environment variables always have highest priority, with a
        // double underscore separating sections from keys
        // (LEVELMINE_MINING__MIN_SUPPORT).
        figment = figment.merge(Env::prefixed("LEVELMINE_").split("__"));

        figment.extract().context("invalid configuration")
    }

    /// Resolve the effective minimum support from a CLI override and the
    /// configured value. Non-positive values are a fatal configuration
    /// error, rejected before any work begins.
    pub fn resolve_min_support(&self, cli_value: Option<i64>) -> Result<u64> {
        let Some(value) = cli_value.or(self.mining.min_support) else {
            bail!("minimum support is not set; pass --min-support or configure [mining] min_support");
        };
        if value <= 0 {
            bail!("minimum support must be positive, got {value}");
        }
        Ok(value as u64)
    }

    /// Render the merged configuration as TOML for `config show`.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("cannot serialize configuration")
    }
}
