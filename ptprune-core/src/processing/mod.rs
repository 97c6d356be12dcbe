//! Parallel fan-out of the decomposition phase
//!
//! Every phrase pair is an independent unit of work. Workers read the frozen
//! index and store; results are collected and written back once all workers
//! have finished, so no record is ever written concurrently.

pub mod parallel;

pub use parallel::{
    DecompositionStats, DecompositionSummary, NoProgress, ParallelDecomposer, ProgressSink,
};
