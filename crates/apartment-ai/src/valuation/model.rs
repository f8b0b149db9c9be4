use serde::{Deserialize, Serialize};

/// Capability exposed by a pre-fit regression model.
pub trait Regressor: Send + Sync + std::fmt::Debug {
    /// Encoded column names the model was fit on, in fit order.
    fn feature_names(&self) -> &[String];

    /// Predict one value from a row laid out as `feature_names`.
    fn predict(&self, features: &[f64]) -> f64;
}

/// A decision tree node; leaves carry `value`, internal nodes route on `feature_index`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(default)]
    pub feature_index: usize,
    #[serde(default)]
    pub threshold: f64,
    #[serde(default)]
    pub left: usize,
    #[serde(default)]
    pub right: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl TreeNode {
    pub fn split(feature_index: usize, threshold: f64, left: usize, right: usize) -> Self {
        Self {
            feature_index,
            threshold,
            left,
            right,
            value: None,
        }
    }

    pub fn leaf(value: f64) -> Self {
        Self {
            feature_index: 0,
            threshold: 0.0,
            left: 0,
            right: 0,
            value: Some(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    fn evaluate(&self, features: &[f64]) -> f64 {
        let mut index = 0usize;
        // A well-formed tree reaches a leaf in at most `nodes.len()` steps.
        for _ in 0..=self.nodes.len() {
            let Some(node) = self.nodes.get(index) else {
                return f64::NAN;
            };
            if let Some(value) = node.value {
                return value;
            }
            let Some(feature) = features.get(node.feature_index) else {
                return f64::NAN;
            };
            index = if *feature <= node.threshold {
                node.left
            } else {
                node.right
            };
        }
        f64::NAN
    }
}

/// Portable pre-fit regression model artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegressionModel {
    Linear {
        feature_names: Vec<String>,
        intercept: f64,
        coefficients: Vec<f64>,
    },
    TreeEnsemble {
        feature_names: Vec<String>,
        base_score: f64,
        trees: Vec<RegressionTree>,
    },
}

impl RegressionModel {
    /// Structural problems that would make every prediction meaningless.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            RegressionModel::Linear {
                feature_names,
                coefficients,
                ..
            } => {
                if feature_names.len() != coefficients.len() {
                    return Err(format!(
                        "linear model has {} features but {} coefficients",
                        feature_names.len(),
                        coefficients.len()
                    ));
                }
            }
            RegressionModel::TreeEnsemble {
                feature_names,
                trees,
                ..
            } => {
                for (tree_index, tree) in trees.iter().enumerate() {
                    if tree.nodes.is_empty() {
                        return Err(format!("tree {tree_index} has no nodes"));
                    }
                    for node in tree.nodes.iter().filter(|node| node.value.is_none()) {
                        if node.feature_index >= feature_names.len()
                            || node.left >= tree.nodes.len()
                            || node.right >= tree.nodes.len()
                        {
                            return Err(format!(
                                "tree {tree_index} references a missing node or feature"
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl Regressor for RegressionModel {
    fn feature_names(&self) -> &[String] {
        match self {
            RegressionModel::Linear { feature_names, .. }
            | RegressionModel::TreeEnsemble { feature_names, .. } => feature_names,
        }
    }

    fn predict(&self, features: &[f64]) -> f64 {
        match self {
            RegressionModel::Linear {
                intercept,
                coefficients,
                ..
            } => {
                intercept
                    + coefficients
                        .iter()
                        .zip(features)
                        .map(|(weight, value)| weight * value)
                        .sum::<f64>()
            }
            RegressionModel::TreeEnsemble {
                base_score, trees, ..
            } => {
                base_score
                    + trees
                        .iter()
                        .map(|tree| tree.evaluate(features))
                        .sum::<f64>()
            }
        }
    }
}
