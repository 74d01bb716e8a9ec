//! Model loading

use super::format::ArtifactFormat;
use super::model::ModelState;
use crate::model::PolicyModel;
use podar_common::{PodarError, Result};
use std::path::Path;

/// Load a model saved by [`save_model`](super::save_model).
///
/// The format is detected from the file extension. Artifacts whose vectors do
/// not match their declared feature set are rejected.
pub fn load_model(path: impl AsRef<Path>) -> Result<PolicyModel> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(PodarError::MissingInputFile { path: path.to_path_buf() });
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| PodarError::io(format!("reading {}", path.display()), e))?;

    let format_error = |message: String| PodarError::ModelFormat { path: path.to_path_buf(), message };
    let state: ModelState = match ArtifactFormat::for_path(path) {
        ArtifactFormat::Json => serde_json::from_str(&content).map_err(|e| format_error(e.to_string()))?,
        ArtifactFormat::Yaml => serde_yaml::from_str(&content).map_err(|e| format_error(e.to_string()))?,
    };

    let model = PolicyModel::from_state(state).map_err(format_error)?;
    log::debug!(
        "loaded {} model with feature set '{}' from {}",
        model.metadata().strategy,
        model.feature_set(),
        path.display()
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureSet;
    use crate::io::save_model;
    use crate::model::{Hyperparameters, ModelMetadata, Normalizer, TrainStrategy};
    use tempfile::TempDir;

    fn batch_model() -> PolicyModel {
        let meta = ModelMetadata::new(
            FeatureSet::LogitRatio,
            TrainStrategy::Batch,
            Hyperparameters {
                epochs: 2000,
                learning_rate: 0.05,
                l2: 1e-4,
                batch_size: Some(256),
                seed: Some(1337),
                keep_depth: 4,
                min_visits: 5000,
                pos_weight: Some(5.666666666666667),
            },
        );
        let norm = Normalizer::from_parts(
            vec![7.1, 9.3, 4.4, 0.03, -3.9],
            vec![1.7, 0.8, 1.1, 0.021, 0.9],
        );
        PolicyModel::new(vec![0.3, -0.12, 0.07, -1.9, -0.4], -0.77, Some(norm), meta).unwrap()
    }

    #[test]
    fn test_json_round_trip_is_exact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("m.json");
        let model = batch_model();
        save_model(&model, &path).unwrap();
        let loaded = load_model(&path).unwrap();
        assert_eq!(loaded, model);
        let x = [9.0, 10.2, 3.3, 0.0027, -5.9];
        assert_eq!(loaded.probability(&x), model.probability(&x));
    }

    #[test]
    fn test_yaml_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("m.yaml");
        let model = batch_model();
        save_model(&model, &path).unwrap();
        let loaded = load_model(&path).unwrap();
        let x = [6.0, 8.5, 2.0, 0.01, -4.6];
        assert!((loaded.probability(&x) - model.probability(&x)).abs() < 1e-12);
    }

    #[test]
    fn test_missing_model() {
        let err = load_model("/no/such/model.json").unwrap_err();
        assert!(matches!(err, PodarError::MissingInputFile { .. }));
    }

    #[test]
    fn test_garbage_is_model_format_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("m.json");
        std::fs::write(&path, "{\"weights\": [1.0]}").unwrap();
        let err = load_model(&path).unwrap_err();
        assert_eq!(err.code(), "E040");
    }

    #[test]
    fn test_width_mismatch_is_model_format_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("m.json");
        let mut state = batch_model().to_state();
        state.weights.pop();
        std::fs::write(&path, serde_json::to_string(&state).unwrap()).unwrap();
        let err = load_model(&path).unwrap_err();
        assert!(matches!(err, PodarError::ModelFormat { .. }));
        assert!(err.to_string().contains("4 weights"));
    }
}
