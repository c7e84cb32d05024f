//! Model-backed scoring with transparent fallback to the heuristic.
//!
//! The artifact is loaded on every call; there is no process-wide cache, so a
//! freshly trained model is used by the very next score. A model is accepted
//! only after its declared feature names have been checked against the
//! features this crate knows how to compute. Inputs are then looked up by
//! name, so coefficient order always follows the model's own name list.

use crate::error::ModelValidationError;
use crate::heuristic::score_heuristic;
use std::collections::HashSet;
use wbd_core::features::{FeatureName, LocationFeatures};
use wbd_core::model::{ModelStore, TrainedModel, HEURISTIC_FALLBACK_VERSION};
use wbd_core::prediction::{RiskAssessment, RiskCategory, ScoringMethod};

pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// A trained model that passed load-time validation.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticModel {
    pub version: String,
    bias: f64,
    terms: Vec<(FeatureName, f64)>,
}

impl LogisticModel {
    /// Validate an artifact.
    pub fn from_trained(model: &TrainedModel) -> Result<Self, ModelValidationError> {
        if model.weights.is_empty() {
            return Err(ModelValidationError::EmptyWeights);
        }
        if model.feature_names.is_empty() {
            return Err(ModelValidationError::EmptyFeatureNames);
        }
        if model.weights.len() != model.feature_names.len() + 1 {
            return Err(ModelValidationError::WeightCount {
                expected: model.feature_names.len() + 1,
                features: model.feature_names.len(),
                found: model.weights.len(),
            });
        }
        if let Some(w) = model.weights.iter().find(|w| !w.is_finite()) {
            return Err(ModelValidationError::NonFiniteWeight(*w));
        }

        let mut seen = HashSet::new();
        let mut names = Vec::with_capacity(model.feature_names.len());
        for raw in &model.feature_names {
            let name: FeatureName = raw
                .parse()
                .map_err(|_| ModelValidationError::UnknownFeature(raw.clone()))?;
            if !seen.insert(name) {
                return Err(ModelValidationError::DuplicateFeature(raw.clone()));
            }
            names.push(name);
        }
        if let Some(missing) = FeatureName::ALL.iter().find(|n| !seen.contains(*n)) {
            return Err(ModelValidationError::MissingFeature(*missing));
        }

        Ok(Self {
            version: model.model_version.clone(),
            bias: model.weights[0],
            terms: names.into_iter().zip(model.weights[1..].iter().copied()).collect(),
        })
    }

    /// Probability of an outbreak event for this feature record.
    pub fn predict(&self, features: &LocationFeatures) -> f64 {
        let z = self
            .terms
            .iter()
            .fold(self.bias, |acc, (name, w)| acc + w * features.value_of(*name));
        sigmoid(z)
    }
}

/// Load and validate the live model, or `None` if it is absent or unusable.
pub fn load_model<M>(models: &M) -> Option<LogisticModel>
where
    M: ModelStore + ?Sized,
{
    let trained = match models.load_model() {
        Ok(Some(trained)) => trained,
        Ok(None) => {
            log::debug!("[WBD] scorer: no trained model, using heuristic");
            return None;
        }
        Err(e) => {
            log::warn!("[WBD] scorer: failed to read model ({:#}), using heuristic", e);
            return None;
        }
    };
    match LogisticModel::from_trained(&trained) {
        Ok(model) => Some(model),
        Err(reason) => {
            log::warn!(
                "[WBD] scorer: rejecting model {} ({}), using heuristic",
                trained.model_version,
                reason
            );
            None
        }
    }
}

/// Score with the trained model when one is valid, otherwise with the heuristic.
///
/// Never fails.
pub fn score_with_model<M>(models: &M, features: &LocationFeatures) -> RiskAssessment
where
    M: ModelStore + ?Sized,
{
    match load_model(models) {
        Some(model) => {
            let score = model.predict(features);
            RiskAssessment {
                score,
                category: RiskCategory::from_score(score),
                model_version: model.version,
                method: ScoringMethod::LogisticRegression,
            }
        }
        None => {
            let heuristic = score_heuristic(features);
            RiskAssessment {
                score: heuristic.score,
                category: heuristic.category,
                model_version: HEURISTIC_FALLBACK_VERSION.to_string(),
                method: ScoringMethod::Heuristic,
            }
        }
    }
}
