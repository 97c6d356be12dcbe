//! Configuration file support
//!
//! A TOML file supplies defaults for the `prune` command; explicit command
//! line flags always win.

use crate::error::CliError;
use anyhow::{Context, Result};
use ptprune_core::{defaults, ItgVariant};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// CLI configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Decomposition settings
    #[serde(default)]
    pub decomposition: DecompositionConfig,

    /// Performance settings
    #[serde(default)]
    pub performance: PerformanceConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Decomposition-related configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DecompositionConfig {
    /// Log-probability of pairs with no decomposition
    pub floor: f64,

    /// Shorter-side length switching to ITG (0 = never)
    pub itg_threshold: usize,

    /// ITG recursion variant
    pub itg_variant: ItgVariant,

    /// 1-based probability column used as the pair's own probability
    /// (0 = first forward column)
    pub column: usize,
}

impl Default for DecompositionConfig {
    fn default() -> Self {
        Self {
            floor: defaults::NONCOMPOSITIONAL_LOGPR,
            itg_threshold: defaults::ITG_THRESHOLD,
            itg_variant: ItgVariant::default(),
            column: 0,
        }
    }
}

/// Performance-related configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PerformanceConfig {
    /// Number of worker threads (0 = auto)
    pub worker_threads: usize,

    /// Minimum number of phrase pairs per work item
    pub chunk_size: usize,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            chunk_size: defaults::CHUNK_SIZE,
        }
    }
}

/// Output-related configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Append the score to every emitted record
    pub append_score: bool,

    /// Re-read the input instead of keeping input lines in memory
    pub low_memory: bool,
}

impl CliConfig {
    /// Loads a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parses configuration text
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| CliError::ConfigError(e.to_string()).into())
    }
}
