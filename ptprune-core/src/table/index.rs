//! Phrase-pair index
//!
//! [`PhraseLookup`] is the contract the decomposers need from a phrase store.
//! [`PhraseIndex`] implements it over interned phrases; it is populated in the
//! same pass that builds the [`PhraseStore`](super::PhraseStore) and is only
//! shared immutably afterwards.

use super::vocab::{PhraseId, PhraseInterner, TokenId};
use crate::decompose::TargetRange;
use std::collections::HashMap;

/// Dense id of a phrase pair, equal to its position in the store
pub type PairId = u32;

/// Read-only queries over a frozen set of phrase pairs
pub trait PhraseLookup: Sync {
    /// Id of the pair `(source, target)` if present
    fn exists(&self, source: &[TokenId], target: &[TokenId]) -> Option<PairId>;

    /// For one source span, looks up every candidate range of `target`.
    ///
    /// The result has one entry per candidate, in candidate order.
    fn query(
        &self,
        source: &[TokenId],
        target: &[TokenId],
        candidates: &[TargetRange],
    ) -> Vec<Option<PairId>>;
}

/// Index over interned source and target phrases
#[derive(Debug, Default)]
pub struct PhraseIndex {
    pairs: HashMap<(PhraseId, PhraseId), PairId>,
    /// Pair ids grouped by source phrase id
    by_source: Vec<Vec<PairId>>,
}

impl PhraseIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pair; returns the id already registered for it, if any.
    ///
    /// A repeated pair keeps its first id for lookups but still takes its
    /// place in the native order.
    pub fn add(&mut self, source: PhraseId, target: PhraseId, id: PairId) -> Option<PairId> {
        let slot = source as usize;
        if self.by_source.len() <= slot {
            self.by_source.resize_with(slot + 1, Vec::new);
        }
        self.by_source[slot].push(id);

        match self.pairs.get(&(source, target)) {
            Some(&existing) => Some(existing),
            None => {
                self.pairs.insert((source, target), id);
                None
            }
        }
    }

    /// Pair id for already-interned phrases
    pub fn get(&self, source: PhraseId, target: PhraseId) -> Option<PairId> {
        self.pairs.get(&(source, target)).copied()
    }

    /// Pair ids grouped by source phrase, sources in first-seen order
    pub fn native_order(&self) -> impl Iterator<Item = PairId> + '_ {
        self.by_source.iter().flatten().copied()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Binds the index to the phrase interners for token-level lookups
    pub fn with_phrases<'a>(
        &'a self,
        sources: &'a PhraseInterner,
        targets: &'a PhraseInterner,
    ) -> IndexView<'a> {
        IndexView {
            index: self,
            sources,
            targets,
        }
    }
}

/// [`PhraseIndex`] together with the interners that resolve token spans
#[derive(Debug, Clone, Copy)]
pub struct IndexView<'a> {
    index: &'a PhraseIndex,
    sources: &'a PhraseInterner,
    targets: &'a PhraseInterner,
}

impl PhraseLookup for IndexView<'_> {
    fn exists(&self, source: &[TokenId], target: &[TokenId]) -> Option<PairId> {
        let source = self.sources.get(source)?;
        let target = self.targets.get(target)?;
        self.index.get(source, target)
    }

    fn query(
        &self,
        source: &[TokenId],
        target: &[TokenId],
        candidates: &[TargetRange],
    ) -> Vec<Option<PairId>> {
        let Some(source) = self.sources.get(source) else {
            return vec![None; candidates.len()];
        };
        candidates
            .iter()
            .map(|range| {
                self.targets
                    .get(&target[range.start..range.end])
                    .and_then(|t| self.index.get(source, t))
            })
            .collect()
    }
}
