//! Per-pair pruning scores; higher scores are kept first

use crate::config::ScoreMode;
use crate::table::{Marginals, PhraseInfo, PhraseStore};

/// NaN scores rank below everything else; `-0.0` is folded into `0.0`
fn coerce_score(score: f64) -> f64 {
    if score.is_nan() {
        f64::NEG_INFINITY
    } else {
        score + 0.0
    }
}

/// Score of one record
///
/// `marginals` is only consulted in expected-count mode.
pub fn score(info: &PhraseInfo, mode: ScoreMode, marginals: Option<&Marginals>) -> f64 {
    let count = info.joint_count as f64;
    let raw = match mode {
        ScoreMode::Compositionality => count * (info.logpr - info.decomp_logpr),
        ScoreMode::JointCount => count,
        ScoreMode::ExpectedCount { .. } => match (info.expected_probs, marginals) {
            (Some((backward, forward)), Some(marginals)) => {
                let (source_count, target_count) = marginals.of(info);
                0.5 * (forward * source_count as f64 + backward * target_count as f64)
            }
            _ => f64::NAN,
        },
        ScoreMode::External => info.external_score.unwrap_or(f64::NAN),
    };
    coerce_score(raw)
}

/// Scores every record of `store`, indexed by pair id
pub fn score_all(store: &PhraseStore, mode: ScoreMode) -> Vec<f64> {
    let marginals = matches!(mode, ScoreMode::ExpectedCount { .. }).then(|| store.marginals());
    store
        .infos()
        .iter()
        .map(|info| score(info, mode, marginals.as_ref()))
        .collect()
}
