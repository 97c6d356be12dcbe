//! Configuration for a pruning run
//!
//! `PruneConfig` is assembled through [`PruneConfigBuilder`], which resolves
//! the scoring flags into a single [`ScoreMode`] and rejects contradictory
//! combinations before any input is read.

use crate::error::{PruneError, Result};
use serde::{Deserialize, Serialize};

/// Default configuration constants
pub mod defaults {
    /// Decomposition log-probability assigned to non-compositional pairs
    pub const NONCOMPOSITIONAL_LOGPR: f64 = -100.0;

    /// Shorter-side length at which the ITG decomposer takes over
    pub const ITG_THRESHOLD: usize = 8;

    /// Minimum number of phrase pairs handed to a worker at once
    pub const CHUNK_SIZE: usize = 64;

    /// Repeated warnings of one kind reported before suppression
    pub const WARNING_CAP: usize = 5;
}

/// How each phrase pair is scored
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreMode {
    /// `joint_count * (logpr - decomp_logpr)`
    Compositionality,
    /// Raw joint count
    JointCount,
    /// Joint count expected from marginals, using a 1-based column pair
    ExpectedCount { column_pair: usize },
    /// Score already carried by the input in a trailing field
    External,
}

impl ScoreMode {
    /// Whether this mode needs the decomposition phase
    pub fn needs_decomposition(&self) -> bool {
        matches!(self, ScoreMode::Compositionality)
    }
}

/// Which records survive selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Budget {
    /// Keep the `K` best records
    TopCount(usize),
    /// Keep the best `P` percent of records
    TopPercent(f64),
    /// Keep every record scoring at least `T`
    Threshold(f64),
}

/// Output strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Keep input lines in memory, emit in index order
    #[default]
    InMemory,
    /// Re-read the input file, emit in input order
    LowMemory,
}

/// ITG recursion variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItgVariant {
    /// One index lookup per sub-rectangle
    #[default]
    Recursive,
    /// One batched lookup per source span
    Batched,
}

/// Settings consumed by the decomposers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecompositionSettings {
    /// Shorter-side length at which ITG replaces Viterbi (`None` = never)
    pub itg_threshold: Option<usize>,
    /// ITG recursion variant
    pub itg_variant: ItgVariant,
}

impl Default for DecompositionSettings {
    fn default() -> Self {
        Self {
            itg_threshold: Some(defaults::ITG_THRESHOLD),
            itg_variant: ItgVariant::default(),
        }
    }
}

/// Thread pool configuration
#[derive(Debug, Clone)]
pub struct ThreadPoolConfig {
    /// Number of worker threads
    pub num_threads: usize,

    /// Minimum number of ids per stolen work item
    pub chunk_size: usize,

    /// Thread name prefix
    pub thread_name_prefix: String,
}

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        Self {
            #[cfg(feature = "parallel")]
            num_threads: num_cpus::get(),
            #[cfg(not(feature = "parallel"))]
            num_threads: 1,
            chunk_size: defaults::CHUNK_SIZE,
            thread_name_prefix: "ptprune-worker".to_string(),
        }
    }
}

/// Complete configuration of a pruning run
#[derive(Debug, Clone)]
pub struct PruneConfig {
    pub score_mode: ScoreMode,
    pub budget: Budget,
    pub output_mode: OutputMode,
    /// Append ` ||| SCORE` to every emitted line
    pub append_score: bool,
    /// 1-based probability column used as `logpr` (`None` = first forward)
    pub prob_column: Option<usize>,
    /// Floor for `decomp_logpr`
    pub floor: f64,
    /// Drop pairs with a joint count below this while reading
    pub min_count: Option<u64>,
    pub decomposition: DecompositionSettings,
    pub threads: ThreadPoolConfig,
}

impl PruneConfig {
    /// Creates a builder; a budget is the only mandatory setting
    pub fn builder(budget: Budget) -> PruneConfigBuilder {
        PruneConfigBuilder::new(budget)
    }

    /// Whether the phrase index has to be built while loading
    pub fn needs_index(&self) -> bool {
        self.score_mode.needs_decomposition() || self.output_mode == OutputMode::InMemory
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        match self.budget {
            Budget::TopPercent(p) if !(0.0..=100.0).contains(&p) => {
                return Err(PruneError::config(format!(
                    "percentage must be within [0, 100], got {p}"
                )));
            }
            Budget::Threshold(t) if t.is_nan() => {
                return Err(PruneError::config("threshold must be a number"));
            }
            _ => {}
        }

        if !self.floor.is_finite() {
            return Err(PruneError::config(
                "non-compositional floor must be finite",
            ));
        }

        if self.prob_column == Some(0) {
            return Err(PruneError::config("probability columns are 1-based"));
        }

        if let ScoreMode::ExpectedCount { column_pair: 0 } = self.score_mode {
            return Err(PruneError::config("expected-count column pairs are 1-based"));
        }

        if self.output_mode == OutputMode::LowMemory && self.min_count.is_some() {
            return Err(PruneError::config(
                "low-memory mode cannot be combined with a minimum count filter",
            ));
        }

        if let Some(threshold) = self.decomposition.itg_threshold {
            if threshold < 2 {
                return Err(PruneError::config(
                    "ITG threshold must be at least 2",
                ));
            }
        }

        if self.threads.num_threads == 0 {
            return Err(PruneError::config("threads must be greater than 0"));
        }

        if self.threads.chunk_size == 0 {
            return Err(PruneError::config("chunk size must be greater than 0"));
        }

        Ok(())
    }
}

/// Fluent builder for [`PruneConfig`]
#[derive(Debug, Clone)]
pub struct PruneConfigBuilder {
    budget: Budget,
    joint_count: bool,
    expected_count: bool,
    expected_column_pair: Option<usize>,
    external_scores: bool,
    output_mode: OutputMode,
    append_score: bool,
    prob_column: Option<usize>,
    floor: f64,
    min_count: Option<u64>,
    decomposition: DecompositionSettings,
    threads: ThreadPoolConfig,
}

impl PruneConfigBuilder {
    /// Creates a builder with default values
    pub fn new(budget: Budget) -> Self {
        Self {
            budget,
            joint_count: false,
            expected_count: false,
            expected_column_pair: None,
            external_scores: false,
            output_mode: OutputMode::default(),
            append_score: false,
            prob_column: None,
            floor: defaults::NONCOMPOSITIONAL_LOGPR,
            min_count: None,
            decomposition: DecompositionSettings::default(),
            threads: ThreadPoolConfig::default(),
        }
    }

    /// Score by raw joint count
    pub fn joint_count(mut self, enabled: bool) -> Self {
        self.joint_count = enabled;
        self
    }

    /// Score by expected joint count
    pub fn expected_count(mut self, enabled: bool) -> Self {
        self.expected_count = enabled;
        self
    }

    /// 1-based probability column pair for expected counts
    pub fn expected_column_pair(mut self, pair: Option<usize>) -> Self {
        self.expected_column_pair = pair;
        self
    }

    /// Read scores from the input instead of computing them
    pub fn external_scores(mut self, enabled: bool) -> Self {
        self.external_scores = enabled;
        self
    }

    /// Sets the output strategy
    pub fn output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }

    /// Append scores to output lines
    pub fn append_score(mut self, enabled: bool) -> Self {
        self.append_score = enabled;
        self
    }

    /// Sets the 1-based probability column used as `logpr`
    pub fn prob_column(mut self, column: Option<usize>) -> Self {
        self.prob_column = column;
        self
    }

    /// Sets the non-compositional floor
    pub fn floor(mut self, floor: f64) -> Self {
        self.floor = floor;
        self
    }

    /// Sets the minimum joint count filter
    pub fn min_count(mut self, min_count: Option<u64>) -> Self {
        self.min_count = min_count;
        self
    }

    /// Sets the ITG threshold (`None` disables the ITG decomposer)
    pub fn itg_threshold(mut self, threshold: Option<usize>) -> Self {
        self.decomposition.itg_threshold = threshold;
        self
    }

    /// Sets the ITG recursion variant
    pub fn itg_variant(mut self, variant: ItgVariant) -> Self {
        self.decomposition.itg_variant = variant;
        self
    }

    /// Sets the number of worker threads (None = all logical CPUs)
    pub fn threads(mut self, count: Option<usize>) -> Self {
        if let Some(count) = count {
            self.threads.num_threads = count;
        }
        self
    }

    /// Sets the minimum work-item size for the thread pool
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.threads.chunk_size = size;
        self
    }

    /// Resolves the score mode and validates the configuration
    pub fn build(self) -> Result<PruneConfig> {
        if self.joint_count && self.expected_count {
            return Err(PruneError::config(
                "joint-count and expected-count scoring are mutually exclusive",
            ));
        }

        if self.external_scores && (self.joint_count || self.expected_count) {
            return Err(PruneError::config(
                "external scores cannot be combined with count-based scoring",
            ));
        }

        let score_mode = if self.external_scores {
            ScoreMode::External
        } else if self.joint_count {
            ScoreMode::JointCount
        } else if self.expected_count {
            let column_pair = self.expected_column_pair.ok_or_else(|| {
                PruneError::config("expected-count scoring requires a column pair (--ec)")
            })?;
            ScoreMode::ExpectedCount { column_pair }
        } else {
            if self.expected_column_pair.is_some() {
                return Err(PruneError::config(
                    "a column pair (--ec) is only meaningful with expected-count scoring",
                ));
            }
            ScoreMode::Compositionality
        };

        let config = PruneConfig {
            score_mode,
            budget: self.budget,
            output_mode: self.output_mode,
            append_score: self.append_score,
            prob_column: self.prob_column,
            floor: self.floor,
            min_count: self.min_count,
            decomposition: self.decomposition,
            threads: self.threads,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_build() {
        let config = PruneConfig::builder(Budget::TopCount(10)).build().unwrap();
        assert_eq!(config.score_mode, ScoreMode::Compositionality);
        assert_eq!(config.floor, defaults::NONCOMPOSITIONAL_LOGPR);
        assert_eq!(config.output_mode, OutputMode::InMemory);
        assert!(config.needs_index());
    }

    #[test]
    fn test_joint_and_expected_conflict() {
        let result = PruneConfig::builder(Budget::TopCount(10))
            .joint_count(true)
            .expected_count(true)
            .expected_column_pair(Some(1))
            .build();
        assert!(matches!(result, Err(PruneError::Configuration { .. })));
    }

    #[test]
    fn test_expected_count_requires_column_pair() {
        let result = PruneConfig::builder(Budget::TopCount(10))
            .expected_count(true)
            .build();
        assert!(result.is_err());

        let config = PruneConfig::builder(Budget::TopCount(10))
            .expected_count(true)
            .expected_column_pair(Some(2))
            .build()
            .unwrap();
        assert_eq!(config.score_mode, ScoreMode::ExpectedCount { column_pair: 2 });
    }

    #[test]
    fn test_low_memory_rejects_min_count() {
        let result = PruneConfig::builder(Budget::TopCount(10))
            .output_mode(OutputMode::LowMemory)
            .min_count(Some(2))
            .build();
        let err = result.unwrap_err();
        assert!(err.to_string().contains("low-memory"));
    }

    #[test]
    fn test_external_scores_skip_index_in_low_memory() {
        let config = PruneConfig::builder(Budget::Threshold(0.0))
            .external_scores(true)
            .output_mode(OutputMode::LowMemory)
            .build()
            .unwrap();
        assert_eq!(config.score_mode, ScoreMode::External);
        assert!(!config.needs_index());
    }

    #[test]
    fn test_invalid_values() {
        assert!(PruneConfig::builder(Budget::TopPercent(120.0))
            .build()
            .is_err());
        assert!(PruneConfig::builder(Budget::TopCount(1))
            .prob_column(Some(0))
            .build()
            .is_err());
        assert!(PruneConfig::builder(Budget::TopCount(1))
            .itg_threshold(Some(1))
            .build()
            .is_err());
        assert!(PruneConfig::builder(Budget::TopCount(1))
            .threads(Some(0))
            .build()
            .is_err());
        assert!(PruneConfig::builder(Budget::TopCount(1))
            .floor(f64::NEG_INFINITY)
            .build()
            .is_err());
    }
}
