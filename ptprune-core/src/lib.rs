//! Compositionality-based pruning of conditional phrase tables
//!
//! A phrase pair that can be rebuilt from smaller pairs of the same table adds
//! little to a translation model. This crate scores every pair by the gap
//! between its own log-probability and the best decomposition into other
//! pairs, weighted by its joint count, and keeps the pairs with the largest
//! gap.
//!
//! # Architecture
//!
//! - **table**: interning, the phrase-pair index and single-pass loading
//! - **decompose**: exact Viterbi search and the ITG approximation
//! - **processing**: thread-pool fan-out of the decomposition phase
//! - **scoring** / **selection**: per-pair scores and the bounded cut line
//! - **output**: in-memory and re-read writers
//! - **pipeline**: the [`Pruner`] tying the phases together
//!
//! # Example
//!
//! ```rust
//! use ptprune_core::{Budget, Input, PruneConfig, Pruner};
//!
//! let table = "\
//! A B ||| x y ||| 0.3 0.36787944117144233 c=10
//! A ||| x ||| 0.5 0.8187307530779818 c=50
//! B ||| y ||| 0.5 0.7408182206817179 c=40
//! ";
//!
//! let config = PruneConfig::builder(Budget::TopCount(2)).build().unwrap();
//! let mut out = Vec::new();
//! let report = Pruner::new(config)
//!     .unwrap()
//!     .prune(Input::from_text(table), &mut out)
//!     .unwrap();
//!
//! // "A B -> x y" is fully explained by its parts and is pruned first
//! assert_eq!(report.retained, 2);
//! assert!(!String::from_utf8(out).unwrap().contains("A B"));
//! ```

pub mod config;
pub mod decompose;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod processing;
pub mod scoring;
pub mod selection;
pub mod table;

pub use config::{
    defaults, Budget, DecompositionSettings, ItgVariant, OutputMode, PruneConfig,
    PruneConfigBuilder, ScoreMode, ThreadPoolConfig,
};
pub use decompose::{Decomposer, DecompositionOutcome, Strategy};
pub use error::{LineError, PruneError, Result};
pub use output::{InMemoryWriter, RereadWriter, SelectionWriter};
pub use pipeline::{Input, PruneReport, Pruner, ScoredTable};
pub use processing::{DecompositionSummary, NoProgress, ParallelDecomposer, ProgressSink};
pub use selection::{Retained, Selection};
pub use table::{LoadedTable, PhraseLookup, TableLoader};
