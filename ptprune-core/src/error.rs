//! Error types for phrase-table pruning
//!
//! `PruneError` covers everything that aborts a run. Problems confined to a
//! single input line are reported through [`LineError`] and handled by the
//! loader, which warns and carries on.

use thiserror::Error;

/// Errors that abort a pruning run
#[derive(Debug, Error)]
pub enum PruneError {
    /// Invalid or contradictory configuration
    #[error("Invalid configuration: {reason}")]
    Configuration { reason: String },

    /// Target phrase longer than the coverage capacity
    #[error("Line {line}: target phrase has {length} tokens (max: {max})")]
    PhraseTooLong {
        line: usize,
        length: usize,
        max: usize,
    },

    /// Requested probability column missing from a record
    #[error("Line {line}: probability column {column} requested but only {available} present")]
    MissingColumn {
        line: usize,
        column: usize,
        available: usize,
    },

    /// Externally supplied score missing or unparsable
    #[error("Line {line}: no trailing score field to read")]
    MissingScore { line: usize },

    /// Low-memory output needs a named, seekable input file
    #[error("Low-memory mode requires a named input file that can be read twice")]
    LowMemoryInput,

    /// Second pass found a different table than the first
    #[error("Input changed between passes: {reason}")]
    InputChanged { reason: String },

    /// Worker pool could not be created
    #[error("Thread pool construction failed")]
    ThreadPool {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// I/O failure on input or output
    #[error("I/O operation failed")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl PruneError {
    /// Shorthand for configuration errors
    pub fn config(reason: impl Into<String>) -> Self {
        PruneError::Configuration {
            reason: reason.into(),
        }
    }
}

/// Recoverable problems with a single input line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    /// Nothing but whitespace
    #[error("blank line")]
    Blank,

    /// Fewer than three ` ||| ` separated fields
    #[error("missing field separator")]
    MissingSeparator,

    /// Source or target side has no tokens
    #[error("empty source or target phrase")]
    EmptyPhrase,

    /// Line is not valid UTF-8
    #[error("invalid UTF-8")]
    InvalidUtf8,
}

/// Result type for pruning operations
pub type Result<T> = std::result::Result<T, PruneError>;
