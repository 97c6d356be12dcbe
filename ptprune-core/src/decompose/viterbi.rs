//! Exact decomposition by Viterbi search over source segmentations
//!
//! Hypotheses live in one set per source prefix position. A hypothesis is the
//! target coverage built so far plus its log-probability; two hypotheses
//! with the same coverage are merged, keeping the better one. At position
//! `i` every source span `[i, j]` (except the whole source) is looked up,
//! in one batched query, against the target ranges still free in at least
//! one live hypothesis.

use super::coverage::{uncovered_ranges, Coverage, MAX_PHRASE_LEN};
use crate::table::{PhraseLookup, PhraseStore, TokenId};
use std::collections::HashMap;

/// Result of a Viterbi search
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViterbiOutcome {
    /// Best decomposition log-probability, if any decomposition exists
    pub logpr: Option<f64>,
    /// Largest hypothesis set seen at a single source position
    pub max_hypotheses: usize,
}

/// Hypotheses at one source position, deduplicated by coverage
#[derive(Debug, Default)]
struct HypothesisSet {
    best: HashMap<Coverage, f64>,
}

impl HypothesisSet {
    fn offer(&mut self, coverage: Coverage, logpr: f64) {
        self.best
            .entry(coverage)
            .and_modify(|current| *current = current.max(logpr))
            .or_insert(logpr);
    }

    fn get(&self, coverage: Coverage) -> Option<f64> {
        self.best.get(&coverage).copied()
    }

    fn iter(&self) -> impl Iterator<Item = (Coverage, f64)> + '_ {
        self.best.iter().map(|(&c, &lp)| (c, lp))
    }

    fn len(&self) -> usize {
        self.best.len()
    }

    fn is_empty(&self) -> bool {
        self.best.is_empty()
    }

    /// Positions every live hypothesis has already covered
    fn covered_by_all(&self, full: Coverage) -> Coverage {
        self.best
            .keys()
            .fold(full, |acc, coverage| acc.intersect(*coverage))
    }
}

/// Exact decomposer
pub struct ViterbiDecomposer<'a, L: PhraseLookup> {
    lookup: &'a L,
    store: &'a PhraseStore,
}

impl<'a, L: PhraseLookup> ViterbiDecomposer<'a, L> {
    pub fn new(lookup: &'a L, store: &'a PhraseStore) -> Self {
        Self { lookup, store }
    }

    /// Finds the best way to build `target` from pairs over proper
    /// sub-spans of `source`
    pub fn decompose(&self, source: &[TokenId], target: &[TokenId]) -> ViterbiOutcome {
        let (m, n) = (source.len(), target.len());
        let mut outcome = ViterbiOutcome::default();
        if m.min(n) < 2 || n > MAX_PHRASE_LEN {
            return outcome;
        }

        let full = Coverage::full(n);
        let mut stacks: Vec<HypothesisSet> = (0..=m).map(|_| HypothesisSet::default()).collect();
        stacks[0].offer(Coverage::EMPTY, 0.0);

        for i in 0..m {
            let (done, rest) = stacks.split_at_mut(i + 1);
            let current = &done[i];
            if current.is_empty() {
                continue;
            }
            outcome.max_hypotheses = outcome.max_hypotheses.max(current.len());

            let candidates = uncovered_ranges(current.covered_by_all(full), n);
            if candidates.is_empty() {
                continue;
            }

            for j in i..m {
                // the whole source span would just reproduce the pair itself
                if i == 0 && j == m - 1 {
                    continue;
                }
                let found = self.lookup.query(&source[i..=j], target, &candidates);
                let next = &mut rest[j - i];

                for (range, hit) in candidates.iter().zip(found) {
                    let Some(id) = hit else {
                        continue;
                    };
                    let piece = Coverage::of_range(*range);
                    let piece_logpr = self.store.logpr(id);
                    for (coverage, logpr) in current.iter() {
                        if !coverage.overlaps(piece) {
                            next.offer(coverage.union(piece), logpr + piece_logpr);
                        }
                    }
                }
            }
        }

        outcome.max_hypotheses = outcome.max_hypotheses.max(stacks[m].len());
        outcome.logpr = stacks[m].get(full);
        outcome
    }
}
