//! Artifact Loader
//!
//! Reads the preprocessor and classifier once at startup. Any failure here is
//! fatal: the form is never served with a partial model.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use super::classifier::TreeEnsembleClassifier;
use super::pipeline::InferencePipeline;
use super::preprocessor::ColumnPreprocessor;
use crate::models::{AddictionLevel, ModelInfo};

/// Fatal startup failure
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(
        "Model or preprocessor file not found. Please ensure both '{}' and '{}' exist. Missing: {}",
        .model.display(), .preprocessor.display(), .missing.join(", ")
    )]
    Missing {
        preprocessor: PathBuf,
        model: PathBuf,
        missing: Vec<String>,
    },

    #[error("Failed to read {artifact} artifact '{}': {source}", .path.display())]
    Read {
        artifact: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load {artifact} artifact '{}': {reason}", .path.display())]
    Invalid {
        artifact: &'static str,
        path: PathBuf,
        reason: String,
    },
}

/// Where the two artifacts live
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub preprocessor: PathBuf,
    pub model: PathBuf,
}

impl From<&crate::config::Config> for ArtifactPaths {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            preprocessor: config.preprocessor_path.clone(),
            model: config.model_path.clone(),
        }
    }
}

/// Process-wide, read-only handles produced by a successful load
#[derive(Clone)]
pub struct LoadedArtifacts {
    pub pipeline: InferencePipeline,
    pub info: Arc<ModelInfo>,
}

/// Load both artifacts or fail without building anything
pub fn load(paths: &ArtifactPaths) -> Result<LoadedArtifacts, StartupError> {
    let missing: Vec<String> = [("preprocessor", &paths.preprocessor), ("model", &paths.model)]
        .into_iter()
        .filter(|(_, path)| !path.is_file())
        .map(|(artifact, path)| format!("{} ({})", artifact, path.display()))
        .collect();

    if !missing.is_empty() {
        return Err(StartupError::Missing {
            preprocessor: paths.preprocessor.clone(),
            model: paths.model.clone(),
            missing,
        });
    }

    let (preprocessor_bytes, preprocessor_sha256) = read_artifact("preprocessor", &paths.preprocessor)?;
    let preprocessor = ColumnPreprocessor::from_json(&preprocessor_bytes).map_err(|reason| StartupError::Invalid {
        artifact: "preprocessor",
        path: paths.preprocessor.clone(),
        reason,
    })?;

    let (model_bytes, model_sha256) = read_artifact("model", &paths.model)?;
    let model = TreeEnsembleClassifier::from_json(&model_bytes).map_err(|reason| StartupError::Invalid {
        artifact: "model",
        path: paths.model.clone(),
        reason,
    })?;

    if preprocessor.output_width() != model.num_feature {
        tracing::warn!(
            "Preprocessor emits {} features but the model expects {}; predictions will fail",
            preprocessor.output_width(),
            model.num_feature
        );
    }
    if model.num_labels() != AddictionLevel::TABLE.len() {
        tracing::warn!(
            "Model emits {} classes but {} labels are defined",
            model.num_labels(),
            AddictionLevel::TABLE.len()
        );
    }

    let info = ModelInfo {
        model_name: model.name.clone(),
        objective: model.objective.as_str().to_string(),
        num_classes: model.num_labels(),
        num_features: model.num_feature,
        expected_features: preprocessor.feature_names_in.clone(),
        output_features: preprocessor.feature_names_out(),
        labels: AddictionLevel::TABLE.to_vec(),
        preprocessor_sha256,
        model_sha256,
        loaded_at: chrono::Utc::now(),
    };

    tracing::info!("Artifacts loaded: {} with {} trees", info.model_name, model.trees.len());

    Ok(LoadedArtifacts {
        pipeline: InferencePipeline::new(Arc::new(preprocessor), Arc::new(model)),
        info: Arc::new(info),
    })
}

fn read_artifact(artifact: &'static str, path: &Path) -> Result<(Vec<u8>, String), StartupError> {
    let bytes = std::fs::read(path).map_err(|source| StartupError::Read {
        artifact,
        path: path.to_path_buf(),
        source,
    })?;
    let digest = format!("{:x}", Sha256::digest(&bytes));
    tracing::info!("Loading {} from {} ({} bytes, sha256 {})", artifact, path.display(), bytes.len(), digest);
    Ok((bytes, digest))
}
