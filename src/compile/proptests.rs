//! Property-based tests for policy compilation

use super::*;
use crate::features::FeatureSet;
use crate::model::{Hyperparameters, ModelMetadata, Normalizer, TrainStrategy};
use proptest::prelude::*;

const KEEP_DEPTH: u32 = 4;
const MIN_VISITS: u64 = 200;

fn arb_record() -> impl Strategy<Value = BaselineRecord> {
    (0u64..400, 0u32..16, 0u64..20_000, 0u64..20_000)
        .prop_map(|(node, depth, visits, useful)| BaselineRecord::new("", node, depth, visits, useful.min(visits)))
}

fn arb_model() -> impl Strategy<Value = PolicyModel> {
    (proptest::collection::vec(-5.0f64..5.0, 5), -5.0f64..5.0).prop_map(|(weights, bias)| {
        let meta = ModelMetadata::new(
            FeatureSet::LogitRatio,
            TrainStrategy::Batch,
            Hyperparameters {
                epochs: 1,
                learning_rate: 0.05,
                l2: 1e-4,
                batch_size: Some(256),
                seed: Some(1337),
                keep_depth: KEEP_DEPTH,
                min_visits: MIN_VISITS,
                pos_weight: Some(1.0),
            },
        );
        let norm = Normalizer::from_parts(vec![7.0, 8.0, 5.0, 0.3, -1.0], vec![3.0, 1.5, 2.5, 0.3, 2.0]);
        PolicyModel::new(weights, bias, Some(norm), meta).unwrap()
    })
}

fn arb_selection() -> impl Strategy<Value = Selection> {
    prop_oneof![
        (0.0f64..=1.0).prop_map(|probability| Selection::Threshold { probability }),
        (0.01f64..=1.0).prop_map(|fraction| Selection::TopFraction { fraction }),
    ]
}

fn compile(model: PolicyModel, selection: Selection, records: &[BaselineRecord]) -> CompiledPolicy {
    PolicyCompiler::new(
        PolicySource::Model { model, selection },
        SafetyFloors::new(KEEP_DEPTH, MIN_VISITS),
        TableLayout::Full,
    )
    .compile(records)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_root_present_once_and_kept(
        model in arb_model(),
        selection in arb_selection(),
        records in proptest::collection::vec(arb_record(), 0..80),
    ) {
        let compiled = compile(model, selection, &records);
        let roots: Vec<_> = compiled.table.entries().iter().filter(|e| e.node_id == ROOT).collect();
        prop_assert_eq!(roots.len(), 1);
        prop_assert!(!roots[0].prune);
        prop_assert_eq!(compiled.table.entries()[0].node_id, ROOT);
    }

    #[test]
    fn prop_no_duplicate_nodes(
        model in arb_model(),
        selection in arb_selection(),
        records in proptest::collection::vec(arb_record(), 0..80),
    ) {
        let compiled = compile(model, selection, &records);
        let ids: Vec<u64> = compiled.table.entries().iter().map(|e| e.node_id).collect();
        prop_assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn prop_floors_never_pruned(
        model in arb_model(),
        selection in arb_selection(),
        records in proptest::collection::vec(arb_record(), 0..80),
    ) {
        let compiled = compile(model, selection, &records);
        let mut seen = std::collections::HashSet::new();
        for rec in records.iter().filter(|r| seen.insert(r.node_id)) {
            if rec.depth <= KEEP_DEPTH || rec.visits < MIN_VISITS {
                prop_assert!(!compiled.table.is_pruned(rec.node_id));
            }
        }
    }

    #[test]
    fn prop_raising_threshold_never_prunes_more(
        model in arb_model(),
        records in proptest::collection::vec(arb_record(), 0..80),
        low in 0.0f64..=1.0,
        delta in 0.0f64..=1.0,
    ) {
        let high = (low + delta).min(1.0);
        let loose = compile(model.clone(), Selection::Threshold { probability: low }, &records);
        let strict = compile(model, Selection::Threshold { probability: high }, &records);
        prop_assert!(strict.summary.pruned <= loose.summary.pruned);
        for entry in strict.table.entries().iter().filter(|e| e.prune) {
            prop_assert!(loose.table.is_pruned(entry.node_id));
        }
    }

    #[test]
    fn prop_rule_matches_definition(
        threshold in 0.0f64..0.5,
        records in proptest::collection::vec(arb_record(), 0..80),
    ) {
        let compiled = PolicyCompiler::new(
            PolicySource::Rule { ratio_threshold: threshold },
            SafetyFloors::new(KEEP_DEPTH, MIN_VISITS),
            TableLayout::Sparse,
        )
        .compile(&records);
        let mut seen = std::collections::HashSet::new();
        for rec in records.iter().filter(|r| seen.insert(r.node_id)) {
            let expected = rec.node_id != ROOT
                && rec.depth > KEEP_DEPTH
                && rec.visits >= MIN_VISITS
                && rec.ratio() < threshold;
            prop_assert_eq!(compiled.table.is_pruned(rec.node_id), expected);
        }
    }
}
