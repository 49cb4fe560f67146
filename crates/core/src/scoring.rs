//! Productivity scoring model.
//!
//! The model is loaded once at startup into a [`ModelHandle`]. A failed load
//! is kept as [`ModelHandle::Unavailable`] so every entry point can refuse
//! work with [`CoreError::ServiceUnavailable`] instead of checking for a
//! missing model itself.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::CoreError;
use crate::features::{FeatureVector, FEATURE_COUNT};

/// Message returned by every entry point while no model is loaded.
pub const MSG_MODEL_NOT_LOADED: &str = "ML model not loaded";

/// Anything that maps a feature vector to a productivity score.
///
/// Implementations hold read-only state and are called from many tasks at
/// once.
pub trait Scorer: Send + Sync {
    fn score(&self, features: &FeatureVector) -> Result<f64, CoreError>;
}

// ---------------------------------------------------------------------------
// Regression forest
// ---------------------------------------------------------------------------

/// One node of a regression tree, as stored in the model artifact.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Go to `left` when `x[feature] <= threshold`, else to `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// Child indices must point strictly forward, so a walk from the root
    /// always reaches a leaf.
    fn check(&self, tree_index: usize) -> Result<(), CoreError> {
        let invalid = |msg: String| CoreError::Internal(format!("tree {tree_index}: {msg}"));

        if self.nodes.is_empty() {
            return Err(invalid("has no nodes".to_string()));
        }
        let len = self.nodes.len();
        for (i, node) in self.nodes.iter().enumerate() {
            match *node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= FEATURE_COUNT {
                        return Err(invalid(format!("node {i} uses unknown feature {feature}")));
                    }
                    if !threshold.is_finite() {
                        return Err(invalid(format!("node {i} has a non-finite threshold")));
                    }
                    for child in [left, right] {
                        if child <= i || child >= len {
                            return Err(invalid(format!("node {i} has bad child index {child}")));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(invalid(format!("leaf {i} has a non-finite value")));
                    }
                }
            }
        }
        Ok(())
    }

    fn predict(&self, x: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                TreeNode::Leaf { value } => return value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if x[feature] <= threshold { left } else { right };
                }
            }
        }
    }
}

/// Averaging ensemble of regression trees.
#[derive(Debug, Clone, PartialEq)]
pub struct ForestModel {
    trees: Vec<RegressionTree>,
}

#[derive(Deserialize)]
struct ForestArtifact {
    trees: Vec<RegressionTree>,
}

impl ForestModel {
    /// Build a forest, rejecting malformed trees.
    pub fn new(trees: Vec<RegressionTree>) -> Result<Self, CoreError> {
        if trees.is_empty() {
            return Err(CoreError::Internal("model has no trees".to_string()));
        }
        for (i, tree) in trees.iter().enumerate() {
            tree.check(i)?;
        }
        Ok(Self { trees })
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, CoreError> {
        let artifact: ForestArtifact = serde_json::from_slice(bytes)
            .map_err(|e| CoreError::Internal(format!("invalid model artifact: {e}")))?;
        Self::new(artifact.trees)
    }

    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let bytes = std::fs::read(path).map_err(|e| {
            CoreError::Internal(format!("cannot read model {}: {e}", path.display()))
        })?;
        Self::from_json(&bytes)
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

impl Scorer for ForestModel {
    fn score(&self, features: &FeatureVector) -> Result<f64, CoreError> {
        let x = features.as_slice();
        let total: f64 = self.trees.iter().map(|t| t.predict(x)).sum();
        Ok(total / self.trees.len() as f64)
    }
}

// ---------------------------------------------------------------------------
// Model handle
// ---------------------------------------------------------------------------

/// The process-wide scoring capability, cheap to clone.
#[derive(Clone)]
pub enum ModelHandle {
    Ready(Arc<dyn Scorer>),
    Unavailable(Arc<str>),
}

impl ModelHandle {
    /// Load a forest artifact; a failure becomes [`ModelHandle::Unavailable`].
    pub fn load(path: &Path) -> Self {
        match ForestModel::load(path) {
            Ok(model) => Self::ready(model),
            Err(e) => Self::unavailable(e.to_string()),
        }
    }

    pub fn ready(scorer: impl Scorer + 'static) -> Self {
        Self::Ready(Arc::new(scorer))
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(Arc::from(reason.into()))
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Why the model could not be loaded, if it could not.
    pub fn unavailable_reason(&self) -> Option<&str> {
        match self {
            Self::Ready(_) => None,
            Self::Unavailable(reason) => Some(&**reason),
        }
    }

    /// Fail fast with `ServiceUnavailable` when no model is loaded.
    pub fn ensure_ready(&self) -> Result<&dyn Scorer, CoreError> {
        match self {
            Self::Ready(scorer) => Ok(scorer.as_ref()),
            Self::Unavailable(_) => Err(CoreError::ServiceUnavailable(
                MSG_MODEL_NOT_LOADED.to_string(),
            )),
        }
    }

    /// Score a feature vector. Scorer failures and non-finite output are
    /// reported as [`CoreError::Prediction`].
    pub fn score(&self, features: &FeatureVector) -> Result<f64, CoreError> {
        let score = self.ensure_ready()?.score(features).map_err(|e| match e {
            CoreError::Prediction(_) | CoreError::ServiceUnavailable(_) => e,
            other => CoreError::Prediction(other.to_string()),
        })?;
        if !score.is_finite() {
            return Err(CoreError::Prediction(format!(
                "model returned a non-finite score ({score})"
            )));
        }
        Ok(score)
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(_) => f.write_str("ModelHandle::Ready"),
            Self::Unavailable(reason) => write!(f, "ModelHandle::Unavailable({reason})"),
        }
    }
}
