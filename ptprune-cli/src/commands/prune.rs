//! Prune command implementation

use crate::config::CliConfig;
use crate::input::resolve_input;
use crate::progress::ProgressReporter;
use anyhow::{Context, Result};
use clap::Args;
use ptprune_core::{Budget, ItgVariant, OutputMode, PruneConfig, Pruner};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// Pruning budget; exactly one is required
#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct BudgetArgs {
    /// Keep the N best phrase pairs
    #[arg(long = "pa", value_name = "N")]
    pub top_count: Option<usize>,

    /// Keep the best P percent of phrase pairs
    #[arg(long = "pr", value_name = "P")]
    pub top_percent: Option<f64>,

    /// Keep every phrase pair scoring at least T
    #[arg(long = "pt", value_name = "T", allow_negative_numbers = true)]
    pub threshold: Option<f64>,
}

impl BudgetArgs {
    /// The selected budget; a missing threshold becomes `NaN`, which
    /// configuration validation rejects
    pub fn budget(&self) -> Budget {
        match (self.top_count, self.top_percent) {
            (Some(n), _) => Budget::TopCount(n),
            (None, Some(p)) => Budget::TopPercent(p),
            (None, None) => Budget::Threshold(self.threshold.unwrap_or(f64::NAN)),
        }
    }
}

/// Arguments for the prune command
#[derive(Debug, Args)]
pub struct PruneArgs {
    /// Phrase table to prune (`-` or absent for stdin)
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    #[command(flatten)]
    pub budget: BudgetArgs,

    /// Append the score to every output line
    #[arg(short = 'o', long)]
    pub append_score: bool,

    /// Use the score in the last field of each input line
    #[arg(short = 'r', long, conflicts_with_all = ["joint_count", "expected_count"])]
    pub read_scores: bool,

    /// Score by joint count
    #[arg(short = 'j', long, conflicts_with = "expected_count")]
    pub joint_count: bool,

    /// Score by expected joint count (requires --ec)
    #[arg(short = 'e', long, requires = "ec")]
    pub expected_count: bool,

    /// 1-based probability column pair used for expected counts
    #[arg(long, value_name = "N")]
    pub ec: Option<usize>,

    /// Re-read the input file for output instead of keeping it in memory
    #[arg(short = 'l', long, conflicts_with = "min_count")]
    pub low_memory: bool,

    /// 1-based probability column used as the pair's own probability
    #[arg(short = 's', long, value_name = "N")]
    pub column: Option<usize>,

    /// Log-probability assigned to pairs with no decomposition
    #[arg(short = 'c', long, value_name = "V", allow_negative_numbers = true)]
    pub floor: Option<f64>,

    /// Drop pairs with a joint count below N while reading
    #[arg(short = 'm', long, value_name = "N")]
    pub min_count: Option<u64>,

    /// Shorter-side length from which the ITG approximation is used (0 = never)
    #[arg(short = 'i', long, value_name = "L")]
    pub itg_threshold: Option<usize>,

    /// Use the batched ITG variant
    #[arg(long)]
    pub itg_batched: bool,

    /// Number of worker threads (default: all logical CPUs)
    #[arg(short = 't', long, value_name = "N")]
    pub threads: Option<usize>,

    /// Minimum number of phrase pairs per work item
    #[arg(long, value_name = "N")]
    pub chunk_size: Option<usize>,

    /// Output file (default: stdout)
    #[arg(long = "out", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl PruneArgs {
    /// Execute the prune command
    pub fn execute(&self) -> Result<()> {
        self.init_logging()?;

        log::info!("Starting phrase-table pruning");
        log::debug!("Arguments: {self:?}");

        let file_config = match &self.config {
            Some(path) => CliConfig::load(path)?,
            None => CliConfig::default(),
        };
        let config = self.build_config(&file_config)?;
        let input = resolve_input(self.input.as_deref())?;

        let out: Box<dyn Write> = match &self.output {
            Some(path) => Box::new(
                File::create(path)
                    .with_context(|| format!("Failed to create {}", path.display()))?,
            ),
            None => Box::new(io::stdout().lock()),
        };

        let progress = ProgressReporter::new(self.quiet);
        let report = Pruner::new(config)?
            .prune_with_progress(input, BufWriter::new(out), &progress)
            .context("Pruning failed")?;

        log::info!(
            "kept {} of {} phrase pairs ({} lines written)",
            report.retained,
            report.total,
            report.written
        );
        Ok(())
    }

    /// Merges flags over the configuration file into a core configuration
    pub fn build_config(&self, file: &CliConfig) -> Result<PruneConfig> {
        let budget = self.budget.budget();

        let low_memory = self.low_memory || file.output.low_memory;
        let output_mode = if low_memory {
            OutputMode::LowMemory
        } else {
            OutputMode::InMemory
        };

        let itg_threshold = match self.itg_threshold.unwrap_or(file.decomposition.itg_threshold) {
            0 => None,
            threshold => Some(threshold),
        };
        let itg_variant = if self.itg_batched {
            ItgVariant::Batched
        } else {
            file.decomposition.itg_variant
        };

        let column = self
            .column
            .or((file.decomposition.column > 0).then_some(file.decomposition.column));
        let threads = self
            .threads
            .or((file.performance.worker_threads > 0).then_some(file.performance.worker_threads));

        let config = PruneConfig::builder(budget)
            .joint_count(self.joint_count)
            .expected_count(self.expected_count)
            .expected_column_pair(self.ec)
            .external_scores(self.read_scores)
            .output_mode(output_mode)
            .append_score(self.append_score || file.output.append_score)
            .prob_column(column)
            .floor(self.floor.unwrap_or(file.decomposition.floor))
            .min_count(self.min_count)
            .itg_threshold(itg_threshold)
            .itg_variant(itg_variant)
            .threads(threads)
            .chunk_size(self.chunk_size.unwrap_or(file.performance.chunk_size))
            .build()?;

        Ok(config)
    }

    /// Initialize logging based on verbosity level
    fn init_logging(&self) -> Result<()> {
        let log_level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        if !self.quiet {
            // a logger may already be installed when running inside tests
            let _ = env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or(log_level),
            )
            .try_init();
        }

        Ok(())
    }
}
