/// Error types for training and prediction runs
use thiserror::Error;
use wbd_core::features::FeatureName;

#[derive(Error, Debug)]
pub enum PredictError {
    /// Training found no incident locations to learn from
    #[error("no training data: no incident locations found")]
    NoTrainingData,

    /// Reading observations failed
    #[error(transparent)]
    Store(#[from] anyhow::Error),

    /// Writing the model artifact failed
    #[error("failed to persist model artifact: {0}")]
    Artifact(String),

    /// A window or horizon does not fit in the calendar around `now`
    #[error("invalid training options: {0}")]
    InvalidOptions(String),
}

/// Why a trained model artifact was refused for scoring
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelValidationError {
    #[error("weights are empty")]
    EmptyWeights,

    #[error("feature names are empty")]
    EmptyFeatureNames,

    #[error("expected {expected} weights for {features} features, found {found}")]
    WeightCount {
        expected: usize,
        features: usize,
        found: usize,
    },

    #[error("non-finite weight {0}")]
    NonFiniteWeight(f64),

    #[error("unknown feature name: {0}")]
    UnknownFeature(String),

    #[error("duplicate feature name: {0}")]
    DuplicateFeature(String),

    #[error("missing feature: {0}")]
    MissingFeature(FeatureName),
}

/// Type alias for Results using PredictError
pub type Result<T> = std::result::Result<T, PredictError>;
