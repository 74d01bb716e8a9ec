//! Property-based tests for configuration validation

use super::error::ValidationError;
use super::validator::validate_config;
use crate::compile::Selection;
use crate::config::schema::*;
use crate::model::TrainStrategy;
use proptest::prelude::*;

fn arb_selection() -> impl Strategy<Value = Selection> {
    prop_oneof![
        (0.0f64..=1.0).prop_map(|probability| Selection::Threshold { probability }),
        (1e-6f64..=1.0).prop_map(|fraction| Selection::TopFraction { fraction }),
    ]
}

fn arb_valid_config() -> impl Strategy<Value = PipelineConfig> {
    (
        1e-6f64..=1.0,                            // bottom_pct
        proptest::option::of(1usize..5000),       // epochs
        proptest::option::of(1e-6f64..=10.0),     // learning_rate
        0.0f64..1.0,                              // l2
        1usize..4096,                             // batch_size
        any::<bool>(),                            // streaming
        arb_selection(),
        0.0f64..0.01,                             // ratio_threshold
    )
        .prop_map(
            |(bottom_pct, epochs, learning_rate, l2, batch_size, streaming, selection, ratio_threshold)| {
                PipelineConfig {
                    labels: LabelConfig { bottom_pct, ..Default::default() },
                    train: TrainConfig {
                        strategy: if streaming { TrainStrategy::Streaming } else { TrainStrategy::Batch },
                        epochs,
                        learning_rate,
                        l2,
                        batch_size,
                        ..Default::default()
                    },
                    compile: CompileConfig { selection, ratio_threshold, ..Default::default() },
                    ..Default::default()
                }
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_valid_config_passes(config in arb_valid_config()) {
        prop_assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn prop_bottom_pct_above_one_fails(config in arb_valid_config(), pct in 1.0001f64..100.0) {
        let mut config = config;
        config.labels.bottom_pct = pct;
        prop_assert!(matches!(
            validate_config(&config),
            Err(ValidationError::InvalidFraction("labels.bottom_pct", _))
        ));
    }

    #[test]
    fn prop_non_positive_lr_fails(config in arb_valid_config(), lr in -10.0f64..=0.0) {
        let mut config = config;
        config.train.learning_rate = Some(lr);
        prop_assert!(matches!(
            validate_config(&config),
            Err(ValidationError::InvalidLearningRate(_))
        ));
    }

    #[test]
    fn prop_probability_out_of_range_fails(config in arb_valid_config(), p in 1.0001f64..5.0) {
        let mut config = config;
        config.compile.selection = Selection::Threshold { probability: p };
        prop_assert!(matches!(
            validate_config(&config),
            Err(ValidationError::InvalidProbability(_))
        ));
    }

    #[test]
    fn prop_zero_batch_size_fails(config in arb_valid_config()) {
        let mut config = config;
        config.train.batch_size = 0;
        prop_assert!(matches!(
            validate_config(&config),
            Err(ValidationError::InvalidBatchSize(0))
        ));
    }
}
