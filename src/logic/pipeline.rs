//! Inference Pipeline
//!
//! **Form input → record → reconcile → transform → predict → decode**
//!
//! The preprocessor and classifier are injected capabilities so the pipeline
//! can run against the JSON artifacts in production and against
//! deterministic fakes in tests. Each run is synchronous and retains nothing
//! between requests.

use std::sync::Arc;
use thiserror::Error;

use super::record::{FieldValue, Record};
use crate::models::{AddictionLevel, ClassIndex, FeatureRecord, Prediction};

// ============================================================================
// FEATURE VECTOR
// ============================================================================

/// Fixed-width numeric preprocessor output
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureVector {
    values: Vec<f32>,
}

impl FeatureVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// Failure inside the preprocessor
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("preprocessor transform failed: column '{0}' is missing from the record")]
    MissingColumn(String),

    #[error("preprocessor transform failed: unknown category '{value}' in column '{column}'")]
    UnknownCategory { column: String, value: String },

    #[error("preprocessor transform failed: could not convert '{value}' in column '{column}' to a number")]
    NotNumeric { column: String, value: String },

    #[error("preprocessor transform failed: {0}")]
    Internal(String),
}

/// Failure inside the classifier
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("classifier predict failed: expected {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("classifier predict failed: {0}")]
    Internal(String),
}

/// Per-request failure, rendered inline and never fatal
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("An error occurred during prediction: {0}")]
    Transform(#[from] TransformError),

    #[error("An error occurred during prediction: {0}")]
    Predict(#[from] ClassifyError),

    #[error("Unexpected prediction result. Please check the model's output.")]
    UnexpectedClass(ClassIndex),
}

impl PredictionError {
    /// Pipeline stage that failed
    pub fn stage(&self) -> &'static str {
        match self {
            PredictionError::Transform(_) => "transform",
            PredictionError::Predict(_) => "predict",
            PredictionError::UnexpectedClass(_) => "decode",
        }
    }
}

// ============================================================================
// COLLABORATORS
// ============================================================================

/// Maps a named-column record to a numeric feature vector
pub trait Preprocessor: Send + Sync {
    /// Column names the transform reads, in order
    fn expected_features(&self) -> &[String];

    fn transform(&self, record: &Record) -> Result<FeatureVector, TransformError>;
}

/// Maps a feature vector to a class index
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<ClassIndex, ClassifyError>;
}

// ============================================================================
// STAGES
// ============================================================================

/// Fill every expected column the record lacks with a numeric zero.
///
/// Existing columns are never removed or overwritten, and columns the
/// preprocessor does not expect pass through untouched.
pub fn reconcile(record: &Record, expected: &[String]) -> Record {
    let mut reconciled = record.clone();
    for name in expected {
        if !reconciled.contains(name) {
            tracing::debug!(column = %name, "Filling missing column with zero");
            reconciled.insert(name.clone(), FieldValue::zero());
        }
    }
    reconciled
}

/// Map a class index onto the label table. Total over all integers.
pub fn decode(index: ClassIndex) -> Result<AddictionLevel, PredictionError> {
    AddictionLevel::from_index(index).ok_or(PredictionError::UnexpectedClass(index))
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Shared, read-only pairing of preprocessor and classifier
#[derive(Clone)]
pub struct InferencePipeline {
    preprocessor: Arc<dyn Preprocessor>,
    classifier: Arc<dyn Classifier>,
}

impl InferencePipeline {
    pub fn new(preprocessor: Arc<dyn Preprocessor>, classifier: Arc<dyn Classifier>) -> Self {
        Self { preprocessor, classifier }
    }

    /// Run one prediction request to completion
    pub fn run(&self, input: &FeatureRecord) -> Result<Prediction, PredictionError> {
        let record = input.to_record();
        self.run_record(&record)
    }

    /// Run the pipeline from an already assembled record
    pub fn run_record(&self, record: &Record) -> Result<Prediction, PredictionError> {
        let reconciled = reconcile(record, self.preprocessor.expected_features());
        tracing::debug!(columns = reconciled.len(), "Record reconciled");

        let features = self.preprocessor.transform(&reconciled)?;
        tracing::debug!(width = features.len(), "Record transformed");

        let class_index = self.classifier.predict(&features)?;
        let addiction_level = decode(class_index)?;

        Ok(Prediction {
            class_index,
            addiction_level,
        })
    }
}
