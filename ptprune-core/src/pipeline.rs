//! End-to-end pruning run
//!
//! [`Pruner`] wires the phases together: load, decompose (compositionality
//! scoring only), score, select and write.

use crate::config::{OutputMode, PruneConfig};
use crate::error::{PruneError, Result};
use crate::output::{InMemoryWriter, RereadWriter, SelectionWriter};
use crate::processing::{DecompositionSummary, NoProgress, ParallelDecomposer, ProgressSink};
use crate::scoring::score_all;
use crate::selection::{Retained, Selection};
use crate::table::{LoadStats, LoadedTable, TableLoader};
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Source of a phrase table
pub enum Input {
    /// Table text held in memory
    Text(String),
    /// Table file on disk
    File(PathBuf),
    /// Any other reader, e.g. standard input
    Reader(Box<dyn Read + Send>),
}

impl std::fmt::Debug for Input {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Input::Text(text) => f
                .debug_struct("Input::Text")
                .field("length", &text.len())
                .finish(),
            Input::File(path) => f.debug_struct("Input::File").field("path", path).finish(),
            Input::Reader(_) => f.debug_struct("Input::Reader").finish(),
        }
    }
}

impl Input {
    pub fn from_text(text: impl Into<String>) -> Self {
        Input::Text(text.into())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Self {
        Input::File(path.as_ref().to_path_buf())
    }

    pub fn from_reader(reader: impl Read + Send + 'static) -> Self {
        Input::Reader(Box::new(reader))
    }

    /// Path of a file input
    pub fn path(&self) -> Option<&Path> {
        match self {
            Input::File(path) => Some(path),
            _ => None,
        }
    }

    fn into_reader(self) -> Result<Box<dyn BufRead>> {
        Ok(match self {
            Input::Text(text) => Box::new(Cursor::new(text.into_bytes())),
            Input::File(path) => Box::new(BufReader::new(File::open(path)?)),
            Input::Reader(reader) => Box::new(BufReader::new(reader)),
        })
    }
}

/// A loaded table with its scores and selection, before output
#[derive(Debug)]
pub struct ScoredTable {
    pub table: LoadedTable,
    /// Score per pair id
    pub scores: Vec<f64>,
    pub selection: Selection,
    pub retained: Retained,
    pub decomposition: Option<DecompositionSummary>,
}

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct PruneReport {
    pub load: LoadStats,
    pub decomposition: Option<DecompositionSummary>,
    pub selection: Selection,
    /// Records loaded
    pub total: usize,
    /// Records retained by the selection
    pub retained: usize,
    /// Lines written
    pub written: usize,
}

/// Runs pruning with a fixed configuration
#[derive(Debug, Clone)]
pub struct Pruner {
    config: PruneConfig,
}

impl Pruner {
    pub fn new(config: PruneConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PruneConfig {
        &self.config
    }

    /// Prunes `input` and writes the retained records to `out`
    pub fn prune<W: Write>(&self, input: Input, out: W) -> Result<PruneReport> {
        self.prune_with_progress(input, out, &NoProgress)
    }

    /// Same as [`Pruner::prune`], reporting decomposition progress
    pub fn prune_with_progress<W: Write>(
        &self,
        input: Input,
        out: W,
        progress: &dyn ProgressSink,
    ) -> Result<PruneReport> {
        let reread_path = match self.config.output_mode {
            OutputMode::LowMemory => Some(
                input
                    .path()
                    .map(Path::to_path_buf)
                    .ok_or(PruneError::LowMemoryInput)?,
            ),
            OutputMode::InMemory => None,
        };

        let scored = self.score(input, progress)?;

        let started = Instant::now();
        let written = match reread_path {
            Some(path) => RereadWriter::new(path, out, self.config.append_score)
                .write_selection(&scored.table, &scored.scores, &scored.retained)?,
            None => InMemoryWriter::new(out, self.config.append_score)
                .write_selection(&scored.table, &scored.scores, &scored.retained)?,
        };
        log::info!("wrote {written} records in {:.2?}", started.elapsed());

        Ok(PruneReport {
            load: scored.table.stats.clone(),
            decomposition: scored.decomposition,
            selection: scored.selection,
            total: scored.table.store.len(),
            retained: scored.retained.count(),
            written,
        })
    }

    /// Loads, decomposes, scores and selects without writing anything
    pub fn score(&self, input: Input, progress: &dyn ProgressSink) -> Result<ScoredTable> {
        let config = &self.config;

        let started = Instant::now();
        let mut table = TableLoader::new(config).load(input.into_reader()?)?;
        log::info!(
            "loaded {} records in {:.2?}",
            table.store.len(),
            started.elapsed()
        );

        let decomposition = if config.score_mode.needs_decomposition() {
            let started = Instant::now();
            let decomposer = ParallelDecomposer::new(config.decomposition, config.threads.clone())?;
            let summary = decomposer.run(&mut table, progress)?;
            log::info!("decomposition finished in {:.2?}", started.elapsed());
            Some(summary)
        } else {
            None
        };

        let started = Instant::now();
        let scores = score_all(&table.store, config.score_mode);
        let selection = Selection::compute(config.budget, &scores);
        let retained = selection.retain(&scores);
        log::info!(
            "selected {} of {} records (cutoff {}) in {:.2?}",
            retained.count(),
            scores.len(),
            selection.cutoff,
            started.elapsed()
        );

        Ok(ScoredTable {
            table,
            scores,
            selection,
            retained,
            decomposition,
        })
    }
}
