//! Model saving

use super::atomic::write_atomic;
use super::format::ArtifactFormat;
use crate::model::PolicyModel;
use podar_common::Result;
use std::path::{Path, PathBuf};

/// Save a model, choosing JSON or YAML from the file extension.
///
/// The artifact is published atomically.
///
/// # Example
///
/// ```no_run
/// use podar::io::{load_model, save_model};
///
/// let model = load_model("DATA/bvh_ml_model.json").unwrap();
/// save_model(&model, "DATA/bvh_ml_model.yaml").unwrap();
/// ```
pub fn save_model(model: &PolicyModel, path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let state = model.to_state();

    let data = match ArtifactFormat::for_path(path) {
        ArtifactFormat::Json => {
            let mut text = serde_json::to_string_pretty(&state)?;
            text.push('\n');
            text
        }
        ArtifactFormat::Yaml => serde_yaml::to_string(&state)?,
    };

    let written = write_atomic(path, data.as_bytes())?;
    log::info!("saved model to {}", written.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureSet;
    use crate::model::{Hyperparameters, ModelMetadata, TrainStrategy};
    use tempfile::TempDir;

    fn model() -> PolicyModel {
        let meta = ModelMetadata::new(
            FeatureSet::UsefulRate,
            TrainStrategy::Streaming,
            Hyperparameters {
                epochs: 3,
                learning_rate: 0.15,
                l2: 1e-4,
                batch_size: None,
                seed: None,
                keep_depth: 4,
                min_visits: 5000,
                pos_weight: None,
            },
        );
        PolicyModel::new(vec![0.5, -1.0, 2.0, 0.25], 0.1, None, meta).unwrap()
    }

    #[test]
    fn test_save_model_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.json");
        save_model(&model(), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"weights\""));
        assert!(content.contains("useful_per_visit"));
    }

    #[test]
    fn test_save_model_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.yml");
        save_model(&model(), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("weights:"));
        assert!(content.contains("strategy: streaming"));
    }
}
