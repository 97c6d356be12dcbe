//! Per-pair records

use super::index::PairId;
use super::vocab::{PhraseId, PhraseInterner, TokenId, Vocab};

/// Everything the pruner knows about one phrase pair
#[derive(Debug, Clone, PartialEq)]
pub struct PhraseInfo {
    pub source: PhraseId,
    pub target: PhraseId,
    /// Log of the pair's own probability
    pub logpr: f64,
    /// Best log-probability found by decomposition (floor until improved)
    pub decomp_logpr: f64,
    pub joint_count: u64,
    /// Score read from the input in external-score mode
    pub external_score: Option<f64>,
    /// `(p(s|t), p(t|s))` used by expected-count scoring
    pub expected_probs: Option<(f64, f64)>,
    /// Verbatim input line without its line terminator, kept only for
    /// in-memory output
    pub line: Option<Box<str>>,
}

/// Dense store of [`PhraseInfo`] records plus the phrase interners
#[derive(Debug, Default)]
pub struct PhraseStore {
    pub(crate) vocab: Vocab,
    pub(crate) sources: PhraseInterner,
    pub(crate) targets: PhraseInterner,
    infos: Vec<PhraseInfo>,
    decomposed: Vec<bool>,
}

impl PhraseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record and returns its id
    pub fn push(&mut self, info: PhraseInfo) -> PairId {
        let id = self.infos.len() as PairId;
        self.infos.push(info);
        self.decomposed.push(false);
        id
    }

    pub fn get(&self, id: PairId) -> &PhraseInfo {
        &self.infos[id as usize]
    }

    pub fn infos(&self) -> &[PhraseInfo] {
        &self.infos
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    pub fn vocab(&self) -> &Vocab {
        &self.vocab
    }

    pub fn sources(&self) -> &PhraseInterner {
        &self.sources
    }

    pub fn targets(&self) -> &PhraseInterner {
        &self.targets
    }

    /// Source and target tokens of a pair
    pub fn tokens(&self, id: PairId) -> (&[TokenId], &[TokenId]) {
        let info = self.get(id);
        (
            self.sources.tokens(info.source),
            self.targets.tokens(info.target),
        )
    }

    /// Log-probability of a pair, as used when it serves as a building block
    pub fn logpr(&self, id: PairId) -> f64 {
        self.infos[id as usize].logpr
    }

    /// Records the decomposition result of a pair.
    ///
    /// Each record accepts one write; later writes are ignored.
    pub fn set_decomposition(&mut self, id: PairId, logpr: f64) -> bool {
        let slot = id as usize;
        if self.decomposed[slot] {
            return false;
        }
        self.decomposed[slot] = true;
        self.infos[slot].decomp_logpr = logpr;
        true
    }

    /// Source and target phrase text of a pair
    pub fn render(&self, id: PairId) -> (String, String) {
        let (source, target) = self.tokens(id);
        (self.vocab.render(source), self.vocab.render(target))
    }

    /// Summed joint counts per source phrase and per target phrase
    pub fn marginals(&self) -> Marginals {
        let mut source = vec![0u64; self.sources.len()];
        let mut target = vec![0u64; self.targets.len()];
        for info in &self.infos {
            source[info.source as usize] += info.joint_count;
            target[info.target as usize] += info.joint_count;
        }
        Marginals { source, target }
    }
}

/// Marginal joint counts of each phrase
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Marginals {
    pub source: Vec<u64>,
    pub target: Vec<u64>,
}

impl Marginals {
    /// `(c(s), c(t))` for a record
    pub fn of(&self, info: &PhraseInfo) -> (u64, u64) {
        (
            self.source[info.source as usize],
            self.target[info.target as usize],
        )
    }
}
