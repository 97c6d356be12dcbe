//! End-to-end tests for the complete pruning pipeline

use ptprune_core::{
    Budget, Input, ItgVariant, NoProgress, OutputMode, PruneConfig, Pruner, Strategy,
};
use std::collections::BTreeSet;
use std::io::Write;
use tempfile::NamedTempFile;

/// `A B -> x y` with logpr -1.0, its parts at -0.2 and -0.3, and an opaque
/// pair with the same count and logpr as `A B -> x y`
const TOY: &str = "\
A B ||| x y ||| 0.3 0.36787944117144233 c=10
A ||| x ||| 0.5 0.8187307530779818 c=50
B ||| y ||| 0.5 0.7408182206817179 c=40
C D ||| z w ||| 0.3 0.36787944117144233 c=10
";

/// A table in which in-memory and input order differ
const MIXED: &str = "\
b ||| y ||| 0.4 0.5 c=3
a ||| x ||| 0.4 0.6 c=9
b c ||| y z ||| 0.2 0.3 c=2
a ||| w ||| 0.4 0.1 c=5
c ||| z ||| 0.4 0.7 c=4
b ||| q ||| 0.4 0.2 c=1
";

fn write_table(text: impl AsRef<[u8]>) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_ref()).unwrap();
    file
}

fn run(config: PruneConfig, input: Input) -> String {
    let mut out = Vec::new();
    Pruner::new(config).unwrap().prune(input, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn line_set(output: &str) -> BTreeSet<String> {
    output.lines().map(str::to_string).collect()
}

#[test]
fn test_toy_table_round_trip() {
    let config = PruneConfig::builder(Budget::TopCount(3)).build().unwrap();
    let scored = Pruner::new(config)
        .unwrap()
        .score(Input::from_text(TOY), &NoProgress)
        .unwrap();

    let store = &scored.table.store;
    assert!((store.get(0).logpr - -1.0).abs() < 1e-12);
    assert!((store.get(0).decomp_logpr - -0.5).abs() < 1e-12);
    assert!((scored.scores[0] - -5.0).abs() < 1e-9);

    // the opaque pair keeps the floor and outranks the compositional one
    assert_eq!(store.get(3).decomp_logpr, -100.0);
    assert!(scored.scores[3] > scored.scores[0]);

    assert_eq!(scored.retained.ids().collect::<Vec<_>>(), vec![1, 2, 3]);
}

#[test]
fn test_decomposition_is_exact_sum_of_parts() {
    let table = "A B ||| x y ||| 0.5 0.5 c=1\nA ||| x ||| 0.5 0.25 c=1\nB ||| y ||| 0.5 0.125 c=1\n";
    let config = PruneConfig::builder(Budget::TopCount(1)).build().unwrap();
    let scored = Pruner::new(config)
        .unwrap()
        .score(Input::from_text(table), &NoProgress)
        .unwrap();
    let la = scored.table.store.get(1).logpr;
    let lb = scored.table.store.get(2).logpr;
    assert_eq!(scored.table.store.get(0).decomp_logpr, la + lb);
}

#[test]
fn test_single_token_sides_keep_floor() {
    let table = "\
A B ||| x ||| 0.5 0.5 c=1
A ||| x ||| 0.5 0.5 c=1
B ||| x ||| 0.5 0.5 c=1
A ||| x y ||| 0.5 0.5 c=1
";
    let config = PruneConfig::builder(Budget::TopCount(1))
        .floor(-42.0)
        .build()
        .unwrap();
    let scored = Pruner::new(config)
        .unwrap()
        .score(Input::from_text(table), &NoProgress)
        .unwrap();
    for info in scored.table.store.infos() {
        assert_eq!(info.decomp_logpr, -42.0);
    }
    assert_eq!(scored.decomposition.map(|d| d.decomposed), Some(0));
}

#[test]
fn test_output_modes_emit_same_set() {
    let file = write_table(MIXED);
    for budget in [
        Budget::TopCount(3),
        Budget::TopPercent(50.0),
        Budget::Threshold(0.0),
    ] {
        let in_memory = PruneConfig::builder(budget)
            .append_score(true)
            .build()
            .unwrap();
        let low_memory = PruneConfig::builder(budget)
            .append_score(true)
            .output_mode(OutputMode::LowMemory)
            .build()
            .unwrap();

        let fast = run(in_memory, Input::from_file(file.path()));
        let slow = run(low_memory, Input::from_file(file.path()));
        assert_eq!(line_set(&fast), line_set(&slow), "budget {budget:?}");
    }
}

#[test]
fn test_output_modes_agree_on_irregular_lines() {
    let table: &[u8] = b"a  b ||| x y ||| 0.2 0.3 c=2\r\n\
a ||| x ||| 0.4 0.6 c=9\n\
\xff\xfe ||| q ||| 0.4 0.2 c=1\n\
b ||| y ||| 0.4 0.5 c=3\n";
    let file = write_table(table);
    for budget in [Budget::TopPercent(100.0), Budget::TopCount(2)] {
        let in_memory = PruneConfig::builder(budget).build().unwrap();
        let low_memory = PruneConfig::builder(budget)
            .output_mode(OutputMode::LowMemory)
            .build()
            .unwrap();

        let fast = run(in_memory, Input::from_file(file.path()));
        let slow = run(low_memory, Input::from_file(file.path()));
        assert_eq!(line_set(&fast), line_set(&slow), "budget {budget:?}");
    }

    let config = PruneConfig::builder(Budget::TopPercent(100.0))
        .output_mode(OutputMode::LowMemory)
        .build()
        .unwrap();
    let output = run(config, Input::from_file(file.path()));
    assert_eq!(
        output,
        "a  b ||| x y ||| 0.2 0.3 c=2\n\
         a ||| x ||| 0.4 0.6 c=9\n\
         b ||| y ||| 0.4 0.5 c=3\n"
    );
}

#[test]
fn test_low_memory_preserves_input_order() {
    let file = write_table(MIXED);
    let config = PruneConfig::builder(Budget::TopPercent(100.0))
        .output_mode(OutputMode::LowMemory)
        .build()
        .unwrap();
    let output = run(config, Input::from_file(file.path()));
    assert_eq!(output, MIXED);

    // in-memory output groups by source phrase instead
    let config = PruneConfig::builder(Budget::TopPercent(100.0))
        .build()
        .unwrap();
    let output = run(config, Input::from_text(MIXED));
    let sources: Vec<&str> = output
        .lines()
        .map(|line| line.split(" ||| ").next().unwrap())
        .collect();
    assert_eq!(sources, vec!["b", "b", "a", "a", "b c", "c"]);
}

#[test]
fn test_pruning_own_output_is_idempotent() {
    let config = || {
        PruneConfig::builder(Budget::Threshold(0.0))
            .build()
            .unwrap()
    };
    let first = run(config(), Input::from_text(TOY));
    let second = run(config(), Input::from_text(first.clone()));
    assert_eq!(line_set(&first), line_set(&second));
    assert_eq!(first.lines().count(), 3);
}

#[test]
fn test_appended_scores_can_be_read_back() {
    let scored = PruneConfig::builder(Budget::TopCount(3))
        .append_score(true)
        .build()
        .unwrap();
    let first = run(scored, Input::from_text(TOY));

    let reread = |k| {
        PruneConfig::builder(Budget::TopCount(k))
            .external_scores(true)
            .build()
            .unwrap()
    };

    // the score field travels along as part of the payload
    let same = run(reread(3), Input::from_text(first.clone()));
    assert_eq!(line_set(&first), line_set(&same));

    let best = run(reread(2), Input::from_text(first));
    let sources: Vec<&str> = best
        .lines()
        .map(|line| line.split(" ||| ").next().unwrap())
        .collect();
    assert_eq!(sources, vec!["A", "B"]);
}

#[test]
fn test_top_k_size_with_ties() {
    let table = "\
a ||| x ||| 0.5 c=4
b ||| x ||| 0.5 c=4
c ||| x ||| 0.5 c=4
d ||| x ||| 0.5 c=9
e ||| x ||| 0.5 c=1
";
    for k in 0..=7 {
        let config = PruneConfig::builder(Budget::TopCount(k))
            .joint_count(true)
            .build()
            .unwrap();
        let output = run(config, Input::from_text(table));
        assert_eq!(output.lines().count(), k.min(5), "k = {k}");
    }

    // the two ties at the cut go to the records met first
    let config = PruneConfig::builder(Budget::TopCount(3))
        .joint_count(true)
        .output_mode(OutputMode::InMemory)
        .build()
        .unwrap();
    let output = run(config, Input::from_text(table));
    assert!(output.contains("a ||| x"));
    assert!(output.contains("b ||| x"));
    assert!(!output.contains("c ||| x"));
}

#[test]
fn test_itg_never_used_below_threshold() {
    let table = "\
A B C ||| x y z ||| 0.1 0.1 c=1
A ||| x ||| 0.5 0.5 c=1
B ||| y ||| 0.5 0.5 c=1
C ||| z ||| 0.5 0.5 c=1
A B ||| x y ||| 0.5 0.5 c=1
";
    let config = PruneConfig::builder(Budget::TopCount(1))
        .itg_threshold(Some(3))
        .build()
        .unwrap();
    let scored = Pruner::new(config.clone())
        .unwrap()
        .score(Input::from_text(table), &NoProgress)
        .unwrap();
    let summary = scored.decomposition.unwrap();
    // only "A B C -> x y z" reaches the threshold
    assert_eq!(summary.itg, 1);
    assert_eq!(summary.viterbi, 1);

    let lookup = scored.table.lookup().unwrap();
    let decomposer =
        ptprune_core::Decomposer::new(&lookup, &scored.table.store, config.decomposition);
    assert_eq!(decomposer.decompose(4).strategy, Strategy::Viterbi);
    assert_eq!(decomposer.decompose(0).strategy, Strategy::Itg);
}

#[test]
fn test_itg_scores_bounded_by_viterbi() {
    let table = "\
A B C D ||| w x y z ||| 0.1 0.1 c=1
A ||| x ||| 0.5 0.5 c=1
B ||| z ||| 0.5 0.5 c=1
C ||| w ||| 0.5 0.5 c=1
D ||| y ||| 0.5 0.5 c=1
A B ||| w x ||| 0.5 0.2 c=1
C D ||| y z ||| 0.5 0.2 c=1
A B C ||| w x y ||| 0.5 0.4 c=1
";
    let exact = PruneConfig::builder(Budget::TopCount(1))
        .itg_threshold(None)
        .build()
        .unwrap();
    let exact = Pruner::new(exact)
        .unwrap()
        .score(Input::from_text(table), &NoProgress)
        .unwrap();

    for variant in [ItgVariant::Recursive, ItgVariant::Batched] {
        let approx = PruneConfig::builder(Budget::TopCount(1))
            .itg_threshold(Some(2))
            .itg_variant(variant)
            .build()
            .unwrap();
        let approx = Pruner::new(approx)
            .unwrap()
            .score(Input::from_text(table), &NoProgress)
            .unwrap();
        for (a, e) in approx
            .table
            .store
            .infos()
            .iter()
            .zip(exact.table.store.infos())
        {
            assert!(a.decomp_logpr <= e.decomp_logpr + 1e-12);
        }
    }
}

#[test]
fn test_expected_count_mode() {
    let table = "a ||| x ||| 0.5 0.25 c=4\na ||| y ||| 0.5 0.5 c=2\n";
    let config = PruneConfig::builder(Budget::TopCount(1))
        .expected_count(true)
        .expected_column_pair(Some(1))
        .build()
        .unwrap();
    let output = run(config, Input::from_text(table));
    assert_eq!(output, "a ||| y ||| 0.5 0.5 c=2\n");
}
