//! Compositional decomposition of phrase pairs
//!
//! [`Decomposer`] picks the exact Viterbi search or the ITG approximation for
//! each pair based on the length of its shorter side.

pub mod coverage;
pub mod itg;
pub mod viterbi;

pub use coverage::{Coverage, TargetRange, MAX_PHRASE_LEN};
pub use itg::ItgDecomposer;
pub use viterbi::{ViterbiDecomposer, ViterbiOutcome};

use crate::config::DecompositionSettings;
use crate::table::{PairId, PhraseLookup, PhraseStore, TokenId};

/// Search used for one phrase pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// A side of length 1 admits no proper split
    Unsplittable,
    Viterbi,
    Itg,
}

/// Result of decomposing one phrase pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecompositionOutcome {
    /// Best decomposition log-probability, if one exists
    pub logpr: Option<f64>,
    pub strategy: Strategy,
    /// Largest Viterbi hypothesis set (0 for other strategies)
    pub max_hypotheses: usize,
}

/// Chooses and runs the decomposition search for a pair
pub struct Decomposer<'a, L: PhraseLookup> {
    lookup: &'a L,
    store: &'a PhraseStore,
    settings: DecompositionSettings,
}

impl<'a, L: PhraseLookup> Decomposer<'a, L> {
    pub fn new(lookup: &'a L, store: &'a PhraseStore, settings: DecompositionSettings) -> Self {
        Self {
            lookup,
            store,
            settings,
        }
    }

    /// Strategy for a pair with source length `m` and target length `n`
    pub fn strategy_for(&self, m: usize, n: usize) -> Strategy {
        let shorter = m.min(n);
        match self.settings.itg_threshold {
            _ if shorter < 2 => Strategy::Unsplittable,
            Some(threshold) if shorter >= threshold => Strategy::Itg,
            _ => Strategy::Viterbi,
        }
    }

    /// Decomposes the stored pair `id`
    pub fn decompose(&self, id: PairId) -> DecompositionOutcome {
        let (source, target) = self.store.tokens(id);
        self.decompose_tokens(source, target)
    }

    /// Decomposes an arbitrary token pair against the store
    pub fn decompose_tokens(&self, source: &[TokenId], target: &[TokenId]) -> DecompositionOutcome {
        let strategy = self.strategy_for(source.len(), target.len());
        match strategy {
            Strategy::Unsplittable => DecompositionOutcome {
                logpr: None,
                strategy,
                max_hypotheses: 0,
            },
            Strategy::Viterbi => {
                let outcome =
                    ViterbiDecomposer::new(self.lookup, self.store).decompose(source, target);
                DecompositionOutcome {
                    logpr: outcome.logpr,
                    strategy,
                    max_hypotheses: outcome.max_hypotheses,
                }
            }
            Strategy::Itg => DecompositionOutcome {
                logpr: ItgDecomposer::new(self.lookup, self.store, self.settings.itg_variant)
                    .decompose(source, target),
                strategy,
                max_hypotheses: 0,
            },
        }
    }
}
