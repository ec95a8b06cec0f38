//! Column Transformer - fitted preprocessing artifact
//!
//! Scales numeric columns and one-hot encodes categorical columns in the
//! order the transformers were fitted. Loaded once from JSON.

use serde::{Deserialize, Serialize};

use super::pipeline::{FeatureVector, Preprocessor, TransformError};
use super::record::{FieldValue, Record};

/// Artifact format understood by this build
pub const PREPROCESSOR_FORMAT_VERSION: u32 = 1;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// What a one-hot encoder does with a level it was not fitted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    #[default]
    Error,
    Ignore,
}

/// One fitted transformer over a subset of columns
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transformer {
    StandardScaler {
        name: String,
        columns: Vec<String>,
        mean: Vec<f64>,
        scale: Vec<f64>,
    },
    OneHot {
        name: String,
        columns: Vec<String>,
        categories: Vec<Vec<String>>,
        #[serde(default)]
        handle_unknown: HandleUnknown,
    },
    Passthrough {
        name: String,
        columns: Vec<String>,
    },
}

impl Transformer {
    pub fn name(&self) -> &str {
        match self {
            Transformer::StandardScaler { name, .. }
            | Transformer::OneHot { name, .. }
            | Transformer::Passthrough { name, .. } => name,
        }
    }

    pub fn columns(&self) -> &[String] {
        match self {
            Transformer::StandardScaler { columns, .. }
            | Transformer::OneHot { columns, .. }
            | Transformer::Passthrough { columns, .. } => columns,
        }
    }

    /// Number of output values produced
    pub fn width(&self) -> usize {
        match self {
            Transformer::OneHot { categories, .. } => categories.iter().map(Vec::len).sum(),
            other => other.columns().len(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            Transformer::StandardScaler { name, columns, mean, scale } => {
                if mean.len() != columns.len() || scale.len() != columns.len() {
                    return Err(format!(
                        "Transformer '{}' has {} columns but {} means and {} scales",
                        name,
                        columns.len(),
                        mean.len(),
                        scale.len()
                    ));
                }
            }
            Transformer::OneHot { name, columns, categories, .. } => {
                if categories.len() != columns.len() {
                    return Err(format!(
                        "Transformer '{}' has {} columns but {} category lists",
                        name,
                        columns.len(),
                        categories.len()
                    ));
                }
            }
            Transformer::Passthrough { .. } => {}
        }
        Ok(())
    }

    fn transform_into(&self, record: &Record, out: &mut Vec<f32>) -> Result<(), TransformError> {
        match self {
            Transformer::StandardScaler { columns, mean, scale, .. } => {
                for (i, column) in columns.iter().enumerate() {
                    let value = numeric_cell(record, column)?;
                    let divisor = if scale[i] == 0.0 { 1.0 } else { scale[i] };
                    out.push(((value - mean[i]) / divisor) as f32);
                }
            }
            Transformer::OneHot { columns, categories, handle_unknown, .. } => {
                for (column, levels) in columns.iter().zip(categories) {
                    let value = cell(record, column)?.to_string();
                    let position = levels.iter().position(|level| *level == value);
                    if position.is_none() && *handle_unknown == HandleUnknown::Error {
                        return Err(TransformError::UnknownCategory {
                            column: column.clone(),
                            value,
                        });
                    }
                    out.extend((0..levels.len()).map(|i| if Some(i) == position { 1.0 } else { 0.0 }));
                }
            }
            Transformer::Passthrough { columns, .. } => {
                for column in columns {
                    out.push(numeric_cell(record, column)? as f32);
                }
            }
        }
        Ok(())
    }
}

/// Fitted column transformer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnPreprocessor {
    pub format_version: u32,
    /// Input columns seen at fit time
    pub feature_names_in: Vec<String>,
    pub transformers: Vec<Transformer>,
}

impl ColumnPreprocessor {
    /// Validate structural invariants of the artifact
    pub fn validate(&self) -> Result<(), String> {
        if self.format_version != PREPROCESSOR_FORMAT_VERSION {
            return Err(format!(
                "Unsupported preprocessor format_version {} (expected {})",
                self.format_version, PREPROCESSOR_FORMAT_VERSION
            ));
        }
        if self.transformers.is_empty() {
            return Err("Preprocessor must contain at least one transformer".to_string());
        }
        for transformer in &self.transformers {
            transformer.validate()?;
            if let Some(column) = transformer
                .columns()
                .iter()
                .find(|c| !self.feature_names_in.contains(c))
            {
                return Err(format!(
                    "Transformer '{}' reads column '{}' which is not in feature_names_in",
                    transformer.name(),
                    column
                ));
            }
        }
        Ok(())
    }

    /// Parse and validate an artifact
    pub fn from_json(bytes: &[u8]) -> Result<Self, String> {
        let preprocessor: Self = serde_json::from_slice(bytes).map_err(|err| err.to_string())?;
        preprocessor.validate()?;
        Ok(preprocessor)
    }

    /// Width of the produced feature vector
    pub fn output_width(&self) -> usize {
        self.transformers.iter().map(Transformer::width).sum()
    }

    /// Names of the produced features, `<transformer>__<column>[_<level>]`
    pub fn feature_names_out(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.output_width());
        for transformer in &self.transformers {
            let prefix = transformer.name();
            match transformer {
                Transformer::OneHot { columns, categories, .. } => {
                    for (column, levels) in columns.iter().zip(categories) {
                        names.extend(levels.iter().map(|level| format!("{prefix}__{column}_{level}")));
                    }
                }
                other => {
                    names.extend(other.columns().iter().map(|column| format!("{prefix}__{column}")));
                }
            }
        }
        names
    }
}

impl Preprocessor for ColumnPreprocessor {
    fn expected_features(&self) -> &[String] {
        &self.feature_names_in
    }

    fn transform(&self, record: &Record) -> Result<FeatureVector, TransformError> {
        let mut values = Vec::with_capacity(self.output_width());
        for transformer in &self.transformers {
            transformer.transform_into(record, &mut values)?;
        }
        if values.len() != self.output_width() {
            return Err(TransformError::Internal(format!(
                "produced {} values, expected {}",
                values.len(),
                self.output_width()
            )));
        }
        Ok(FeatureVector::new(values))
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn cell<'a>(record: &'a Record, column: &str) -> Result<&'a FieldValue, TransformError> {
    record
        .get(column)
        .ok_or_else(|| TransformError::MissingColumn(column.to_string()))
}

fn numeric_cell(record: &Record, column: &str) -> Result<f64, TransformError> {
    match cell(record, column)? {
        FieldValue::Number(n) => Ok(*n),
        FieldValue::Text(s) => s.trim().parse().map_err(|_| TransformError::NotNumeric {
            column: column.to_string(),
            value: s.clone(),
        }),
    }
}
