//! Tree Ensemble Classifier - gradient-boosted trees
//!
//! Evaluates a boosted ensemble exported as JSON: one flat node array per
//! tree, each tree contributing to a single class margin.

use serde::{Deserialize, Serialize};

use super::pipeline::{Classifier, ClassifyError, FeatureVector};
use crate::models::ClassIndex;

/// Artifact format understood by this build
pub const MODEL_FORMAT_VERSION: u32 = 1;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Objective {
    /// One margin per class, argmax wins
    #[serde(rename = "multi:softprob")]
    MultiSoftprob,
    /// Single margin, positive class when sigmoid > 0.5
    #[serde(rename = "binary:logistic")]
    BinaryLogistic,
}

impl Objective {
    pub fn as_str(&self) -> &'static str {
        match self {
            Objective::MultiSoftprob => "multi:softprob",
            Objective::BinaryLogistic => "binary:logistic",
        }
    }
}

/// Tree node. Split nodes route to `yes` when `value < threshold`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        split: usize,
        threshold: f32,
        yes: usize,
        no: usize,
        /// Branch taken for NaN inputs, defaults to `yes`
        #[serde(default)]
        missing: Option<usize>,
    },
    Leaf {
        leaf: f32,
    },
}

/// Single regression tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    /// Class margin this tree contributes to
    #[serde(default)]
    pub class_id: usize,
    pub nodes: Vec<Node>,
}

impl Tree {
    /// Check that every child index points forward, which makes traversal terminate
    fn validate(&self, num_feature: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("Tree has no nodes".to_string());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            if let Node::Split { split, yes, no, missing, .. } = node {
                if *split >= num_feature {
                    return Err(format!("Node {idx} splits on feature {split} (num_feature {num_feature})"));
                }
                for child in [Some(*yes), Some(*no), *missing].into_iter().flatten() {
                    if child <= idx || child >= self.nodes.len() {
                        return Err(format!("Node {idx} has invalid child {child}"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Leaf value reached by a feature vector
    pub fn predict(&self, features: &[f32]) -> f32 {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { leaf } => return *leaf,
                Node::Split { split, threshold, yes, no, missing } => {
                    let value = features.get(*split).copied().unwrap_or(f32::NAN);
                    idx = if value.is_nan() {
                        missing.unwrap_or(*yes)
                    } else if value < *threshold {
                        *yes
                    } else {
                        *no
                    };
                }
            }
        }
    }
}

/// Gradient-boosted tree ensemble
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEnsembleClassifier {
    pub format_version: u32,
    /// Display name
    #[serde(default = "default_model_name")]
    pub name: String,
    pub objective: Objective,
    /// Class count; 1 for binary objectives
    pub num_class: usize,
    /// Expected feature vector width
    pub num_feature: usize,
    /// Initial margin for every class
    #[serde(default)]
    pub base_score: f32,
    pub trees: Vec<Tree>,
}

fn default_model_name() -> String {
    "XGBoost Classifier".to_string()
}

impl TreeEnsembleClassifier {
    /// Validate structural invariants of the model
    pub fn validate(&self) -> Result<(), String> {
        if self.format_version != MODEL_FORMAT_VERSION {
            return Err(format!(
                "Unsupported model format_version {} (expected {})",
                self.format_version, MODEL_FORMAT_VERSION
            ));
        }
        match self.objective {
            Objective::MultiSoftprob if self.num_class < 2 => {
                return Err("multi:softprob requires at least 2 classes".to_string());
            }
            Objective::BinaryLogistic if self.num_class != 1 => {
                return Err("binary:logistic requires num_class = 1".to_string());
            }
            _ => {}
        }
        for (tree_idx, tree) in self.trees.iter().enumerate() {
            if tree.class_id >= self.num_class {
                return Err(format!(
                    "Tree {tree_idx} targets class {} but num_class is {}",
                    tree.class_id, self.num_class
                ));
            }
            tree.validate(self.num_feature)
                .map_err(|err| format!("Tree {tree_idx}: {err}"))?;
        }
        Ok(())
    }

    /// Parse and validate an artifact
    pub fn from_json(bytes: &[u8]) -> Result<Self, String> {
        let model: Self = serde_json::from_slice(bytes).map_err(|err| err.to_string())?;
        model.validate()?;
        Ok(model)
    }

    /// Raw per-class margins
    pub fn predict_raw(&self, features: &[f32]) -> Vec<f32> {
        let mut raw = vec![self.base_score; self.num_class];
        for tree in &self.trees {
            raw[tree.class_id] += tree.predict(features);
        }
        raw
    }

    /// Number of classes the model can emit
    pub fn num_labels(&self) -> usize {
        match self.objective {
            Objective::MultiSoftprob => self.num_class,
            Objective::BinaryLogistic => 2,
        }
    }
}

impl Classifier for TreeEnsembleClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<ClassIndex, ClassifyError> {
        if features.len() != self.num_feature {
            return Err(ClassifyError::ShapeMismatch {
                expected: self.num_feature,
                actual: features.len(),
            });
        }

        let raw = self.predict_raw(features.as_slice());
        if raw.iter().any(|v| !v.is_finite()) {
            return Err(ClassifyError::Internal("non-finite margin".to_string()));
        }

        let index = match self.objective {
            Objective::MultiSoftprob => argmax(&raw),
            Objective::BinaryLogistic => usize::from(sigmoid(raw[0]) > 0.5),
        };
        Ok(index as ClassIndex)
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

fn argmax(values: &[f32]) -> usize {
    let mut best_idx = 0usize;
    let mut best_val = f32::NEG_INFINITY;
    for (idx, &v) in values.iter().enumerate() {
        if v > best_val {
            best_val = v;
            best_idx = idx;
        }
    }
    best_idx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(class_id: usize, split: usize, threshold: f32, left: f32, right: f32) -> Tree {
        Tree {
            class_id,
            nodes: vec![
                Node::Split { split, threshold, yes: 1, no: 2, missing: None },
                Node::Leaf { leaf: left },
                Node::Leaf { leaf: right },
            ],
        }
    }

    fn three_class() -> TreeEnsembleClassifier {
        TreeEnsembleClassifier {
            format_version: 1,
            name: "test".into(),
            objective: Objective::MultiSoftprob,
            num_class: 3,
            num_feature: 2,
            base_score: 0.5,
            trees: vec![
                stump(0, 0, 0.0, 1.0, -1.0),
                stump(1, 0, 0.0, -1.0, 1.0),
                stump(2, 1, 0.5, -1.0, 2.0),
            ],
        }
    }

    #[test]
    fn test_tree_routes_on_threshold_and_missing() {
        let tree = Tree {
            class_id: 0,
            nodes: vec![
                Node::Split { split: 0, threshold: 0.5, yes: 1, no: 2, missing: Some(2) },
                Node::Leaf { leaf: -1.0 },
                Node::Leaf { leaf: 2.0 },
            ],
        };
        assert_eq!(tree.predict(&[0.4]), -1.0);
        assert_eq!(tree.predict(&[0.5]), 2.0);
        assert_eq!(tree.predict(&[f32::NAN]), 2.0);
    }

    #[test]
    fn test_multiclass_argmax() {
        let model = three_class();
        assert_eq!(model.predict(&FeatureVector::new(vec![-1.0, 0.0])).unwrap(), 0);
        assert_eq!(model.predict(&FeatureVector::new(vec![1.0, 0.0])).unwrap(), 1);
        assert_eq!(model.predict(&FeatureVector::new(vec![1.0, 1.0])).unwrap(), 2);
    }

    #[test]
    fn test_binary_logistic() {
        let model = TreeEnsembleClassifier {
            format_version: 1,
            name: "binary".into(),
            objective: Objective::BinaryLogistic,
            num_class: 1,
            num_feature: 1,
            base_score: 0.0,
            trees: vec![stump(0, 0, 0.0, -2.0, 2.0)],
        };
        assert!(model.validate().is_ok());
        assert_eq!(model.predict(&FeatureVector::new(vec![-1.0])).unwrap(), 0);
        assert_eq!(model.predict(&FeatureVector::new(vec![1.0])).unwrap(), 1);
        assert_eq!(model.num_labels(), 2);
    }

    #[test]
    fn test_shape_mismatch() {
        let err = three_class().predict(&FeatureVector::new(vec![1.0])).unwrap_err();
        assert!(matches!(err, ClassifyError::ShapeMismatch { expected: 2, actual: 1 }));
    }

    #[test]
    fn test_validate_rejects_backward_edges() {
        let mut model = three_class();
        model.trees[0].nodes[0] = Node::Split { split: 0, threshold: 0.0, yes: 0, no: 2, missing: None };
        assert!(model.validate().is_err());

        let mut model = three_class();
        model.trees[1].class_id = 3;
        assert!(model.validate().is_err());

        let mut model = three_class();
        model.trees[2] = stump(2, 5, 0.0, 0.0, 0.0);
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_parses_json_nodes() {
        let json = br#"{
            "format_version": 1,
            "objective": "multi:softprob",
            "num_class": 2,
            "num_feature": 1,
            "trees": [
                {"class_id": 1, "nodes": [
                    {"split": 0, "threshold": 0.5, "yes": 1, "no": 2},
                    {"leaf": -0.3},
                    {"leaf": 0.7}
                ]}
            ]
        }"#;
        let model = TreeEnsembleClassifier::from_json(json).unwrap();
        assert_eq!(model.name, "XGBoost Classifier");
        assert_eq!(model.predict(&FeatureVector::new(vec![0.9])).unwrap(), 1);
        assert_eq!(model.predict(&FeatureVector::new(vec![0.1])).unwrap(), 0);
    }
}
