//! Approximate decomposition by binary ITG bracketing
//!
//! The source/target rectangle is split at one source point and one target
//! point, either straight (left with left) or swapped (left with right).
//! Below the top level a sub-rectangle that is itself a known pair is scored
//! with that pair's own log-probability instead of being split further.

use super::coverage::all_ranges;
use crate::config::ItgVariant;
use crate::table::{PairId, PhraseLookup, PhraseStore, TokenId};
use std::collections::HashMap;

type Span = (usize, usize);

/// Per-call chart: memoised sub-rectangle scores plus the batched lookup cache.
///
/// Only visited rectangles are stored, so long source phrases cost memory in
/// proportion to the search rather than to the full rectangle space.
struct Chart {
    n: usize,
    best: HashMap<(Span, Span), f64>,
    /// Batched variant only: known pairs per source span, indexed by target span
    spans: Option<HashMap<Span, Box<[Option<PairId>]>>>,
}

impl Chart {
    fn new(n: usize, variant: ItgVariant) -> Self {
        let spans = match variant {
            ItgVariant::Recursive => None,
            ItgVariant::Batched => Some(HashMap::new()),
        };
        Self {
            n,
            best: HashMap::new(),
            spans,
        }
    }
}

/// ITG decomposer
pub struct ItgDecomposer<'a, L: PhraseLookup> {
    lookup: &'a L,
    store: &'a PhraseStore,
    variant: ItgVariant,
}

impl<'a, L: PhraseLookup> ItgDecomposer<'a, L> {
    pub fn new(lookup: &'a L, store: &'a PhraseStore, variant: ItgVariant) -> Self {
        Self {
            lookup,
            store,
            variant,
        }
    }

    /// Best bracketed decomposition of the full pair, if any
    pub fn decompose(&self, source: &[TokenId], target: &[TokenId]) -> Option<f64> {
        let (m, n) = (source.len(), target.len());
        if m.min(n) < 2 {
            return None;
        }
        let mut chart = Chart::new(n, self.variant);
        let best = self.split(&mut chart, source, target, (0, m), (0, n));
        (best > f64::NEG_INFINITY).then_some(best)
    }

    /// Best score of a sub-rectangle: the known pair itself, or its best split
    fn rectangle(
        &self,
        chart: &mut Chart,
        source: &[TokenId],
        target: &[TokenId],
        (s0, s1): (usize, usize),
        (t0, t1): (usize, usize),
    ) -> f64 {
        if let Some(&memo) = chart.best.get(&((s0, s1), (t0, t1))) {
            return memo;
        }

        let best = match self.known(chart, source, target, (s0, s1), (t0, t1)) {
            Some(id) => self.store.logpr(id),
            None => self.split(chart, source, target, (s0, s1), (t0, t1)),
        };
        chart.best.insert(((s0, s1), (t0, t1)), best);
        best
    }

    /// Best straight or swapped split over all interior points
    fn split(
        &self,
        chart: &mut Chart,
        source: &[TokenId],
        target: &[TokenId],
        (s0, s1): (usize, usize),
        (t0, t1): (usize, usize),
    ) -> f64 {
        let mut best = f64::NEG_INFINITY;
        if s1 - s0 < 2 || t1 - t0 < 2 {
            return best;
        }

        for k in s0 + 1..s1 {
            for l in t0 + 1..t1 {
                let left = self.rectangle(chart, source, target, (s0, k), (t0, l));
                if left > f64::NEG_INFINITY {
                    let right = self.rectangle(chart, source, target, (k, s1), (l, t1));
                    best = best.max(left + right);
                }

                let left = self.rectangle(chart, source, target, (s0, k), (l, t1));
                if left > f64::NEG_INFINITY {
                    let right = self.rectangle(chart, source, target, (k, s1), (t0, l));
                    best = best.max(left + right);
                }
            }
        }
        best
    }

    fn known(
        &self,
        chart: &mut Chart,
        source: &[TokenId],
        target: &[TokenId],
        (s0, s1): (usize, usize),
        (t0, t1): (usize, usize),
    ) -> Option<PairId> {
        let n = chart.n;
        let Some(spans) = chart.spans.as_mut() else {
            return self.lookup.exists(&source[s0..s1], &target[t0..t1]);
        };

        let found = spans.entry((s0, s1)).or_insert_with(|| {
            let candidates = all_ranges(n);
            let hits = self.lookup.query(&source[s0..s1], target, &candidates);
            let mut by_range = vec![None; (n + 1) * (n + 1)];
            for (range, hit) in candidates.iter().zip(hits) {
                by_range[range.start * (n + 1) + range.end] = hit;
            }
            by_range.into_boxed_slice()
        });
        found[t0 * (n + 1) + t1]
    }
}
