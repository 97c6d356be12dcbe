//! Choosing which records survive
//!
//! A [`Selection`] is a score cutoff plus the number of records exactly at the
//! cutoff that may still be kept. It is resolved against the scores in id
//! order, so ties go to the records met first.

use crate::config::Budget;
use crate::table::PairId;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Total order over scores for the bounded heap
#[derive(Debug, Clone, Copy)]
struct OrdScore(f64);

impl PartialEq for OrdScore {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for OrdScore {}

impl PartialOrd for OrdScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrdScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Cut line of a selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    /// Records scoring above this are always kept
    pub cutoff: f64,
    /// Records scoring exactly `cutoff` kept at most this many times
    /// (`None` = all of them)
    pub tie_quota: Option<usize>,
    /// Number of records the selection retains
    pub expected: usize,
}

impl Selection {
    /// Keeps every record
    pub fn all(total: usize) -> Self {
        Self {
            cutoff: f64::NEG_INFINITY,
            tie_quota: None,
            expected: total,
        }
    }

    /// Keeps nothing
    pub fn none() -> Self {
        Self {
            cutoff: f64::INFINITY,
            tie_quota: Some(0),
            expected: 0,
        }
    }

    /// Computes the cut line for `budget` over `scores`
    pub fn compute(budget: Budget, scores: &[f64]) -> Self {
        let total = scores.len();
        match budget {
            Budget::TopCount(k) => Self::top(k, scores),
            Budget::TopPercent(percent) => {
                let k = (percent * total as f64 / 100.0).floor() as usize;
                Self::top(k, scores)
            }
            Budget::Threshold(threshold) => {
                let threshold = threshold + 0.0;
                Self {
                    cutoff: threshold,
                    tie_quota: None,
                    expected: scores
                        .iter()
                        .filter(|s| s.total_cmp(&threshold) != Ordering::Less)
                        .count(),
                }
            }
        }
    }

    /// Bounded min-heap selection of the `k` best scores
    fn top(k: usize, scores: &[f64]) -> Self {
        if k == 0 {
            return Self::none();
        }
        if k >= scores.len() {
            return Self::all(scores.len());
        }

        let mut heap = BinaryHeap::with_capacity(k + 1);
        for &score in scores {
            heap.push(Reverse(OrdScore(score)));
            if heap.len() > k {
                heap.pop();
            }
        }

        let Some(Reverse(OrdScore(cutoff))) = heap.peek().copied() else {
            return Self::none();
        };
        let above = heap
            .iter()
            .filter(|Reverse(OrdScore(s))| s.total_cmp(&cutoff) == Ordering::Greater)
            .count();

        Self {
            cutoff,
            tie_quota: Some(k - above),
            expected: k,
        }
    }

    /// Resolves the selection into a per-record mask
    pub fn retain(&self, scores: &[f64]) -> Retained {
        let mut ties_left = self.tie_quota;
        let mut count = 0;
        let mask = scores
            .iter()
            .map(|score| {
                let keep = match score.total_cmp(&self.cutoff) {
                    Ordering::Greater => true,
                    Ordering::Equal => match ties_left.as_mut() {
                        None => true,
                        Some(0) => false,
                        Some(left) => {
                            *left -= 1;
                            true
                        }
                    },
                    Ordering::Less => false,
                };
                count += usize::from(keep);
                keep
            })
            .collect();
        Retained { mask, count }
    }
}

/// Per-record keep flags, indexed by pair id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retained {
    mask: Vec<bool>,
    count: usize,
}

impl Retained {
    pub fn contains(&self, id: PairId) -> bool {
        self.mask.get(id as usize).copied().unwrap_or(false)
    }

    /// Number of retained records
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn total(&self) -> usize {
        self.mask.len()
    }

    /// Retained ids in id order
    pub fn ids(&self) -> impl Iterator<Item = PairId> + '_ {
        self.mask
            .iter()
            .enumerate()
            .filter(|(_, keep)| **keep)
            .map(|(id, _)| id as PairId)
    }
}
