// Configuration module for reading Planner.toml
// This module provides configuration management for the planner and its tools

use log::warn;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{PlannerError, Result};
use crate::heuristics::Heuristic;
use crate::search::{StateModel, StrategyKind, DEFAULT_MAX_EXPANSIONS};

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub search: SearchConfig,
    pub grid: GridConfig,
    pub trace: TraceConfig,
    pub profiling: ProfilingConfig,
}

/// Strategy selection and search limits
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SearchConfig {
    pub strategy: StrategyKind,
    pub model: StateModel,
    #[serde(default)]
    pub heuristic: Heuristic,
    #[serde(default = "default_max_expansions")]
    pub max_expansions: usize,
}

fn default_max_expansions() -> usize {
    DEFAULT_MAX_EXPANSIONS
}

/// Default grid dimensions for tools that generate worlds
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GridConfig {
    pub width: i32,
    pub height: i32,
}

/// Exploration trace configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TraceConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

/// Performance profiling configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ProfilingConfig {
    pub enabled: bool,
    pub log_to_stderr: bool,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Planner.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config>` - Parsed and validated configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| PlannerError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&contents)
    }

    /// Parses configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| PlannerError::Config(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads default configuration from Planner.toml in the project root
    pub fn load_default() -> Result<Self> {
        Self::from_file("Planner.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Planner.toml
    pub fn default_hardcoded() -> Self {
        Config {
            search: SearchConfig {
                strategy: StrategyKind::AStar,
                model: StateModel::Full,
                heuristic: Heuristic::Manhattan,
                max_expansions: DEFAULT_MAX_EXPANSIONS,
            },
            grid: GridConfig {
                width: 20,
                height: 20,
            },
            trace: TraceConfig {
                enabled: false,
                log_file_path: "exploration_trace.jsonl".to_string(),
            },
            profiling: ProfilingConfig {
                enabled: false,
                log_to_stderr: true,
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            warn!("Could not load Planner.toml ({}), using hardcoded defaults", e);
            Self::default_hardcoded()
        })
    }

    fn validate(&self) -> Result<()> {
        if self.search.max_expansions == 0 {
            return Err(PlannerError::Config(
                "search.max_expansions must be positive".to_string(),
            ));
        }
        if self.grid.width <= 0 || self.grid.height <= 0 {
            return Err(PlannerError::Config(format!(
                "grid dimensions must be positive, got {}x{}",
                self.grid.width, self.grid.height
            )));
        }
        Ok(())
    }
}
