//! Thread-pool scheduling of per-pair decomposition

use crate::config::{DecompositionSettings, ThreadPoolConfig};
use crate::decompose::{Decomposer, DecompositionOutcome, Strategy};
use crate::error::{PruneError, Result};
use crate::table::{LoadedTable, PairId, PhraseLookup};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Receives progress of the decomposition phase
///
/// Implementations are called from worker threads.
pub trait ProgressSink: Send + Sync {
    fn start(&self, _total: u64) {}
    fn advance(&self, _done: u64) {}
    fn finish(&self) {}
}

/// Progress sink that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {}

/// Diagnostic counters shared by all workers
#[derive(Debug, Default)]
pub struct DecompositionStats {
    pairs: AtomicU64,
    decomposed: AtomicU64,
    viterbi: AtomicU64,
    itg_invocations: AtomicU64,
    unsplittable: AtomicU64,
    max_hypotheses: AtomicUsize,
}

impl DecompositionStats {
    pub fn record(&self, outcome: &DecompositionOutcome) {
        self.pairs.fetch_add(1, Ordering::Relaxed);
        if outcome.logpr.is_some() {
            self.decomposed.fetch_add(1, Ordering::Relaxed);
        }
        let counter = match outcome.strategy {
            Strategy::Viterbi => &self.viterbi,
            Strategy::Itg => &self.itg_invocations,
            Strategy::Unsplittable => &self.unsplittable,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.max_hypotheses
            .fetch_max(outcome.max_hypotheses, Ordering::Relaxed);
    }

    /// Plain copy of the counters, taken once workers have joined
    pub fn summary(&self) -> DecompositionSummary {
        DecompositionSummary {
            pairs: self.pairs.load(Ordering::Relaxed),
            decomposed: self.decomposed.load(Ordering::Relaxed),
            viterbi: self.viterbi.load(Ordering::Relaxed),
            itg: self.itg_invocations.load(Ordering::Relaxed),
            unsplittable: self.unsplittable.load(Ordering::Relaxed),
            max_hypotheses: self.max_hypotheses.load(Ordering::Relaxed),
        }
    }
}

/// Counters of a finished decomposition phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecompositionSummary {
    pub pairs: u64,
    /// Pairs for which a decomposition was found
    pub decomposed: u64,
    pub viterbi: u64,
    pub itg: u64,
    pub unsplittable: u64,
    /// Largest Viterbi hypothesis set over all pairs
    pub max_hypotheses: usize,
}

/// Runs the decomposer over every stored pair on a worker pool
pub struct ParallelDecomposer {
    #[cfg(feature = "parallel")]
    pool: rayon::ThreadPool,
    threads: ThreadPoolConfig,
    settings: DecompositionSettings,
}

impl ParallelDecomposer {
    /// Creates the decomposer and its thread pool
    pub fn new(settings: DecompositionSettings, threads: ThreadPoolConfig) -> Result<Self> {
        #[cfg(feature = "parallel")]
        let pool = {
            let prefix = threads.thread_name_prefix.clone();
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads.num_threads)
                .thread_name(move |i| format!("{prefix}-{i}"))
                .build()
                .map_err(|e| PruneError::ThreadPool {
                    source: Box::new(e),
                })?
        };

        Ok(Self {
            #[cfg(feature = "parallel")]
            pool,
            threads,
            settings,
        })
    }

    /// Decomposes every pair of `table` and records the results in its store
    pub fn run(
        &self,
        table: &mut LoadedTable,
        progress: &dyn ProgressSink,
    ) -> Result<DecompositionSummary> {
        let stats = DecompositionStats::default();
        let count = table.store.len();

        let results = {
            let lookup = table
                .lookup()
                .ok_or_else(|| PruneError::config("decomposition needs the phrase index"))?;
            let decomposer = Decomposer::new(&lookup, &table.store, self.settings);
            progress.start(count as u64);
            self.decompose_all(&decomposer, count, &stats, progress)
        };
        progress.finish();

        for (id, logpr) in results.into_iter().enumerate() {
            if let Some(logpr) = logpr {
                table.store.set_decomposition(id as PairId, logpr);
            }
        }

        let summary = stats.summary();
        log::info!(
            "decomposed {} of {} pairs ({} viterbi, {} itg, {} unsplittable, max {} hypotheses)",
            summary.decomposed,
            summary.pairs,
            summary.viterbi,
            summary.itg,
            summary.unsplittable,
            summary.max_hypotheses
        );
        Ok(summary)
    }

    #[cfg(feature = "parallel")]
    fn decompose_all<L: PhraseLookup>(
        &self,
        decomposer: &Decomposer<'_, L>,
        count: usize,
        stats: &DecompositionStats,
        progress: &dyn ProgressSink,
    ) -> Vec<Option<f64>> {
        log::debug!(
            "decomposing {count} pairs on {} threads (min chunk {})",
            self.threads.num_threads,
            self.threads.chunk_size
        );
        self.pool.install(|| {
            (0..count)
                .into_par_iter()
                .with_min_len(self.threads.chunk_size)
                .map(|id| {
                    let outcome = decomposer.decompose(id as PairId);
                    stats.record(&outcome);
                    progress.advance(1);
                    outcome.logpr
                })
                .collect()
        })
    }

    #[cfg(not(feature = "parallel"))]
    fn decompose_all<L: PhraseLookup>(
        &self,
        decomposer: &Decomposer<'_, L>,
        count: usize,
        stats: &DecompositionStats,
        progress: &dyn ProgressSink,
    ) -> Vec<Option<f64>> {
        log::debug!(
            "decomposing {count} pairs sequentially (chunk {})",
            self.threads.chunk_size
        );
        (0..count)
            .map(|id| {
                let outcome = decomposer.decompose(id as PairId);
                stats.record(&outcome);
                progress.advance(1);
                outcome.logpr
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Budget, PruneConfig};
    use crate::table::TableLoader;
    use std::io::Cursor;

    const TABLE: &str = "\
A B ||| x y ||| 0.1 0.3 c=10
A ||| x ||| 0.5 0.8 c=50
B ||| y ||| 0.5 0.7 c=40
A B C ||| x y z ||| 0.1 0.2 c=3
C ||| z ||| 0.5 0.6 c=7
";

    fn run_with(threads: usize, chunk: usize) -> (Vec<f64>, DecompositionSummary) {
        let config = PruneConfig::builder(Budget::TopCount(1))
            .threads(Some(threads))
            .chunk_size(chunk)
            .build()
            .unwrap();
        let mut table = TableLoader::new(&config)
            .load(Cursor::new(TABLE))
            .unwrap();
        let decomposer =
            ParallelDecomposer::new(config.decomposition, config.threads.clone()).unwrap();
        let summary = decomposer.run(&mut table, &NoProgress).unwrap();
        let scores = table.store.infos().iter().map(|i| i.decomp_logpr).collect();
        (scores, summary)
    }

    #[test]
    fn test_results_written_back() {
        let (scores, summary) = run_with(2, 1);
        assert!((scores[0] - (0.8f64.ln() + 0.7f64.ln())).abs() < 1e-12);
        assert_eq!(scores[1], -100.0);
        assert!((scores[3] - (0.8f64.ln() + 0.7f64.ln() + 0.6f64.ln())).abs() < 1e-12);
        assert_eq!(summary.pairs, 5);
        assert_eq!(summary.decomposed, 2);
        assert_eq!(summary.unsplittable, 3);
        assert_eq!(summary.itg, 0);
        assert!(summary.max_hypotheses >= 1);
    }

    #[test]
    fn test_thread_count_does_not_change_results() {
        let (single, _) = run_with(1, 64);
        let (many, _) = run_with(4, 1);
        assert_eq!(single, many);
    }

    #[test]
    fn test_progress_sink_sees_every_pair() {
        #[derive(Default)]
        struct Counting {
            total: AtomicU64,
            done: AtomicU64,
        }
        impl ProgressSink for Counting {
            fn start(&self, total: u64) {
                self.total.store(total, Ordering::Relaxed);
            }
            fn advance(&self, done: u64) {
                self.done.fetch_add(done, Ordering::Relaxed);
            }
        }

        let config = PruneConfig::builder(Budget::TopCount(1)).build().unwrap();
        let mut table = TableLoader::new(&config)
            .load(Cursor::new(TABLE))
            .unwrap();
        let sink = Counting::default();
        ParallelDecomposer::new(config.decomposition, config.threads.clone())
            .unwrap()
            .run(&mut table, &sink)
            .unwrap();
        assert_eq!(sink.total.load(Ordering::Relaxed), 5);
        assert_eq!(sink.done.load(Ordering::Relaxed), 5);
    }

    #[test]
    fn test_missing_index_is_an_error() {
        let config = PruneConfig::builder(Budget::TopCount(1)).build().unwrap();
        let mut table = TableLoader::new(&config)
            .load(Cursor::new(TABLE))
            .unwrap();
        table.index = None;
        let result = ParallelDecomposer::new(config.decomposition, config.threads.clone())
            .unwrap()
            .run(&mut table, &NoProgress);
        assert!(matches!(result, Err(PruneError::Configuration { .. })));
    }
}
