use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version tag written by the logistic-regression trainer.
pub const LOGREG_MODEL_VERSION: &str = "logreg-v1";

/// Version reported when the fixed-weight heuristic is used directly.
pub const HEURISTIC_MODEL_VERSION: &str = "heuristic-v1";

/// Version reported when the scorer had to fall back to the heuristic.
pub const HEURISTIC_FALLBACK_VERSION: &str = "heuristic-fallback";

/// A fitted logistic-regression model.
///
/// `weights[0]` is the bias; `weights[i + 1]` pairs with `feature_names[i]`.
/// Created wholesale by one training run and never partially updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TrainedModel {
    pub weights: Vec<f64>,
    pub feature_names: Vec<String>,
    pub model_version: String,
    pub trained_at: DateTime<Utc>,
    pub iterations: u32,
    pub learning_rate: f64,
    /// Mean loss at every 25th iteration and at the final one.
    pub loss_history: Vec<f64>,
}

/// Persistence for the single live model artifact.
pub trait ModelStore {
    /// Read the artifact. `Ok(None)` when none has been saved or it cannot be parsed.
    fn load_model(&self) -> anyhow::Result<Option<TrainedModel>>;

    /// Replace the artifact wholesale.
    fn save_model(&self, model: &TrainedModel) -> anyhow::Result<()>;
}
