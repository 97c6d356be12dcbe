//! Single-pass table loading
//!
//! Builds the [`PhraseStore`] and, when the run needs it, the [`PhraseIndex`]
//! from one read of the input. Fatal problems abort the load; recoverable
//! ones are warned through a [`WarningLimiter`] and the line is skipped or
//! defaulted.

use super::index::{IndexView, PairId, PhraseIndex};
use super::record::{column_pair, log_prob, resolve_column, CountField, ParsedLine};
use super::store::{PhraseInfo, PhraseStore};
use crate::config::{defaults, OutputMode, PruneConfig, ScoreMode};
use crate::decompose::MAX_PHRASE_LEN;
use crate::error::{LineError, PruneError, Result};
use std::collections::HashMap;
use std::fmt::Display;
use std::io::BufRead;

/// Counters collected while loading
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Lines read, blank ones included
    pub lines: usize,
    /// Records stored
    pub records: usize,
    /// Lines skipped as malformed
    pub malformed_lines: usize,
    /// Records dropped by the minimum count filter
    pub below_min_count: usize,
    /// Records whose joint count defaulted to 1
    pub defaulted_counts: usize,
    /// Malformed numeric values replaced by a default
    pub malformed_values: usize,
    /// Records repeating an earlier phrase pair
    pub duplicates: usize,
}

/// Caps repeated warnings of the same kind
#[derive(Debug)]
pub struct WarningLimiter {
    cap: usize,
    counts: HashMap<&'static str, usize>,
}

impl WarningLimiter {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            counts: HashMap::new(),
        }
    }

    /// Logs a warning unless `kind` has already been reported `cap` times
    pub fn warn(&mut self, kind: &'static str, line: usize, message: impl Display) {
        let count = self.counts.entry(kind).or_insert(0);
        *count += 1;
        if *count <= self.cap {
            log::warn!("line {line}: {message}");
        } else if *count == self.cap + 1 {
            log::warn!("further '{kind}' warnings suppressed");
        }
    }

    /// Number of times `kind` was raised, suppressed ones included
    pub fn count(&self, kind: &str) -> usize {
        self.counts.get(kind).copied().unwrap_or(0)
    }
}

/// Result of loading a table
#[derive(Debug)]
pub struct LoadedTable {
    pub store: PhraseStore,
    pub index: Option<PhraseIndex>,
    pub stats: LoadStats,
}

impl LoadedTable {
    /// Token-level view of the index, when one was built
    pub fn lookup(&self) -> Option<IndexView<'_>> {
        self.index
            .as_ref()
            .map(|index| index.with_phrases(self.store.sources(), self.store.targets()))
    }
}

/// Reads a phrase table into memory
pub struct TableLoader<'c> {
    config: &'c PruneConfig,
    warnings: WarningLimiter,
}

impl<'c> TableLoader<'c> {
    pub fn new(config: &'c PruneConfig) -> Self {
        Self {
            config,
            warnings: WarningLimiter::new(defaults::WARNING_CAP),
        }
    }

    /// Loads every record from `reader`
    pub fn load<R: BufRead>(mut self, mut reader: R) -> Result<LoadedTable> {
        let mut store = PhraseStore::new();
        let mut index = self.config.needs_index().then(PhraseIndex::new);
        let mut stats = LoadStats::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            stats.lines += 1;
            let line_no = stats.lines;

            let parsed = match decode_line(&buf).and_then(ParsedLine::parse) {
                Ok(parsed) => parsed,
                Err(LineError::Blank) => continue,
                Err(e) => {
                    stats.malformed_lines += 1;
                    self.warnings.warn("malformed line", line_no, format!("{e}; skipped"));
                    continue;
                }
            };

            let Some(info) = self.build_info(&parsed, line_no, &mut store, &mut stats)? else {
                continue;
            };

            let (source, target) = (info.source, info.target);
            let id = store.push(info);
            stats.records += 1;

            if let Some(index) = index.as_mut() {
                if let Some(first) = index.add(source, target, id) {
                    stats.duplicates += 1;
                    self.warnings.warn(
                        "duplicate pair",
                        line_no,
                        format!("repeats the pair first seen as record {first}"),
                    );
                }
            }
        }

        log::info!(
            "loaded {} records from {} lines ({} malformed, {} below min count)",
            stats.records,
            stats.lines,
            stats.malformed_lines,
            stats.below_min_count
        );

        Ok(LoadedTable {
            store,
            index,
            stats,
        })
    }

    /// Turns a parsed line into a record, or `None` if it is filtered out
    fn build_info(
        &mut self,
        parsed: &ParsedLine<'_>,
        line_no: usize,
        store: &mut PhraseStore,
        stats: &mut LoadStats,
    ) -> Result<Option<PhraseInfo>> {
        let config = self.config;
        let mode = config.score_mode;

        let source_tokens = store.vocab.intern_phrase(parsed.source);
        let target_tokens = store.vocab.intern_phrase(parsed.target);
        if mode.needs_decomposition() && target_tokens.len() > MAX_PHRASE_LEN {
            return Err(PruneError::PhraseTooLong {
                line: line_no,
                length: target_tokens.len(),
                max: MAX_PHRASE_LEN,
            });
        }

        let joint_count = match parsed.values.joint_count {
            CountField::Present(count) => count,
            CountField::Missing => {
                stats.defaulted_counts += 1;
                self.warnings
                    .warn("missing count", line_no, "no joint count field; using 1");
                1
            }
            CountField::Malformed => {
                stats.defaulted_counts += 1;
                self.warnings
                    .warn("malformed count", line_no, "unreadable joint count; using 1");
                1
            }
        };

        if let Some(min_count) = config.min_count {
            if joint_count < min_count {
                stats.below_min_count += 1;
                return Ok(None);
            }
        }

        let probs = &parsed.values.probs;
        let malformed = parsed.values.malformed_probs();
        if malformed > 0 {
            stats.malformed_values += malformed;
            self.warnings.warn(
                "malformed probability",
                line_no,
                format!("{malformed} unreadable probability value(s) treated as 0"),
            );
        }

        let logpr = if config.prob_column.is_some() || mode.needs_decomposition() {
            let column = resolve_column(config.prob_column, probs.len()).ok_or(
                PruneError::MissingColumn {
                    line: line_no,
                    column: config.prob_column.unwrap_or(1),
                    available: probs.len(),
                },
            )?;
            log_prob(probs[column], config.floor)
        } else {
            config.floor
        };

        let expected_probs = match mode {
            ScoreMode::ExpectedCount { column_pair: pair } => {
                let (backward, forward) = column_pair(pair, probs.len()).ok_or(
                    PruneError::MissingColumn {
                        line: line_no,
                        column: pair,
                        available: probs.len(),
                    },
                )?;
                Some((
                    probs[backward].unwrap_or(0.0),
                    probs[forward].unwrap_or(0.0),
                ))
            }
            _ => None,
        };

        let external_score = match mode {
            ScoreMode::External => match parsed.trailing_score() {
                None => return Err(PruneError::MissingScore { line: line_no }),
                Some(Some(score)) => Some(score),
                Some(None) => {
                    stats.malformed_values += 1;
                    self.warnings.warn(
                        "malformed score",
                        line_no,
                        "unreadable score; ranked last",
                    );
                    Some(f64::NEG_INFINITY)
                }
            },
            _ => None,
        };

        let line = (config.output_mode == OutputMode::InMemory).then(|| parsed.line.into());

        Ok(Some(PhraseInfo {
            source: store.sources.intern(&source_tokens),
            target: store.targets.intern(&target_tokens),
            logpr,
            decomp_logpr: config.floor,
            joint_count,
            external_score,
            expected_probs,
            line,
        }))
    }
}

/// Raw line bytes as text, or [`LineError::InvalidUtf8`]
fn decode_line(buf: &[u8]) -> std::result::Result<&str, LineError> {
    std::str::from_utf8(buf).map_err(|_| LineError::InvalidUtf8)
}

/// Positional record ids of a re-read input.
///
/// Yields `(id, line)` for every line the loader stored, skipping blank,
/// malformed and non-UTF-8 lines exactly as loading did. Lines come without
/// their terminator. Only valid without a minimum count filter.
pub fn record_lines<R: BufRead>(mut reader: R) -> impl Iterator<Item = Result<(PairId, String)>> {
    let mut next_id: PairId = 0;
    let mut buf = Vec::new();
    std::iter::from_fn(move || loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Err(e) => return Some(Err(e.into())),
            Ok(0) => return None,
            Ok(_) => {}
        }
        let Ok(parsed) = decode_line(&buf).and_then(ParsedLine::parse) else {
            continue;
        };
        let id = next_id;
        next_id += 1;
        return Some(Ok((id, parsed.line.to_string())));
    })
}
