//! Prediction result models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Integer class produced by the classifier. Signed so that any value a
/// classifier emits can be represented and rejected.
pub type ClassIndex = i64;

/// Human-readable addiction level.
///
/// The table order is assumed to match the classifier's label encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddictionLevel {
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "moderate")]
    Moderate,
    #[serde(rename = "high")]
    High,
    #[serde(rename = "no addiction")]
    NoAddiction,
    #[serde(rename = "extreme")]
    Extreme,
}

impl AddictionLevel {
    /// Label table indexed by [`ClassIndex`]
    pub const TABLE: [AddictionLevel; 5] = [
        AddictionLevel::Low,
        AddictionLevel::Moderate,
        AddictionLevel::High,
        AddictionLevel::NoAddiction,
        AddictionLevel::Extreme,
    ];

    /// Look up a class index, `None` outside `0..TABLE.len()`
    pub fn from_index(index: ClassIndex) -> Option<Self> {
        if index < 0 || index >= Self::TABLE.len() as ClassIndex {
            return None;
        }
        Some(Self::TABLE[index as usize])
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AddictionLevel::Low => "low",
            AddictionLevel::Moderate => "moderate",
            AddictionLevel::High => "high",
            AddictionLevel::NoAddiction => "no addiction",
            AddictionLevel::Extreme => "extreme",
        }
    }
}

impl std::fmt::Display for AddictionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Successful pipeline output
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub class_index: ClassIndex,
    pub addiction_level: AddictionLevel,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub request_id: Uuid,
    pub class_index: ClassIndex,
    pub addiction_level: AddictionLevel,
}

/// Sidebar data describing the loaded artifacts
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub model_name: String,
    pub objective: String,
    pub num_classes: usize,
    pub num_features: usize,
    pub expected_features: Vec<String>,
    pub output_features: Vec<String>,
    pub labels: Vec<AddictionLevel>,
    pub preprocessor_sha256: String,
    pub model_sha256: String,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}
