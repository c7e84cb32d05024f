//! Offline logistic-regression training.
//!
//! Training rows are the distinct incident locations (exact coordinates).
//! A row is labelled positive when that location had an incident within the
//! label horizon ending at `now`. The fitted model is persisted through a
//! [`ModelStore`] and replaces whatever was there before.

use crate::error::{PredictError, Result};
use crate::features::build_features_for_locations;
use crate::scorer::sigmoid;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use wbd_core::features::FeatureName;
use wbd_core::location::LocationGrouping;
use wbd_core::model::{ModelStore, TrainedModel, LOGREG_MODEL_VERSION};
use wbd_core::store::ObservationStore;
use wbd_utils::dates;

/// Loss is recorded on every iteration that is a multiple of this.
pub const LOSS_CHECKPOINT_EVERY: u32 = 25;

const LOG_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct TrainOptions {
    pub window_days: u32,
    pub iterations: u32,
    pub learning_rate: f64,
    /// How far back from `now` an incident counts towards a positive label.
    pub label_horizon_hours: u32,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            window_days: 14,
            iterations: 400,
            learning_rate: 0.05,
            label_horizon_hours: 24,
        }
    }
}

/// Parameters and loss trace produced by [`fit_logistic_regression`].
#[derive(Debug, Clone, PartialEq)]
pub struct Fit {
    /// Bias first, then one weight per column.
    pub weights: Vec<f64>,
    pub loss_history: Vec<f64>,
}

/// Full-batch gradient descent on the binary cross-entropy loss.
///
/// Every row of `x` must have the same width. Weights start at zero.
pub fn fit_logistic_regression(
    x: &[Vec<f64>],
    y: &[f64],
    iterations: u32,
    learning_rate: f64,
) -> Fit {
    let width = x.first().map(|row| row.len()).unwrap_or(0);
    let n = x.len() as f64;
    let mut weights = vec![0.0; width + 1];
    let mut loss_history = Vec::new();

    for iter in 0..iterations {
        let mut gradient = vec![0.0; width + 1];
        let mut loss = 0.0;

        for (row, &label) in x.iter().zip(y) {
            let z = row
                .iter()
                .zip(&weights[1..])
                .fold(weights[0], |acc, (v, w)| acc + v * w);
            let p = sigmoid(z);
            loss -= label * (p + LOG_EPSILON).ln() + (1.0 - label) * (1.0 - p + LOG_EPSILON).ln();

            let error = p - label;
            gradient[0] += error;
            for (g, v) in gradient[1..].iter_mut().zip(row) {
                *g += error * v;
            }
        }

        for (w, g) in weights.iter_mut().zip(&gradient) {
            *w -= learning_rate * g / n;
        }

        if iter % LOSS_CHECKPOINT_EVERY == 0 || iter + 1 == iterations {
            let mean = loss / n;
            log::debug!("[WBD] train: iteration {} loss {:.6}", iter, mean);
            loss_history.push(mean);
        }
    }

    Fit {
        weights,
        loss_history,
    }
}

/// Train on the current observation history and persist the model.
pub fn train<S, M>(
    store: &S,
    models: &M,
    options: &TrainOptions,
    now: DateTime<Utc>,
) -> Result<TrainedModel>
where
    S: ObservationStore + ?Sized,
    M: ModelStore + ?Sized,
{
    dates::window_start(&now, options.window_days)
        .map_err(|e| PredictError::InvalidOptions(format!("{:#}", e)))?;
    let label_since = dates::hours_before(&now, options.label_horizon_hours)
        .map_err(|e| PredictError::InvalidOptions(format!("{:#}", e)))?;

    let grouping = LocationGrouping::Exact;
    let locations = grouping.distinct(store.incident_locations()?);
    if locations.is_empty() {
        return Err(PredictError::NoTrainingData);
    }
    log::info!(
        "[WBD] train: {} locations, window {} days, {} iterations at lr {}",
        locations.len(),
        options.window_days,
        options.iterations,
        options.learning_rate
    );

    let features = build_features_for_locations(store, &locations, options.window_days, now)?;

    let positive: HashSet<_> = store
        .incident_locations_since(label_since)?
        .iter()
        .map(|l| grouping.key(l))
        .collect();
    let y: Vec<f64> = locations
        .iter()
        .map(|l| if positive.contains(&grouping.key(l)) { 1.0 } else { 0.0 })
        .collect();

    let x: Vec<Vec<f64>> = features
        .iter()
        .map(|f| f.vector(&FeatureName::ALL))
        .collect();

    let fit = fit_logistic_regression(&x, &y, options.iterations, options.learning_rate);

    let model = TrainedModel {
        weights: fit.weights,
        feature_names: FeatureName::canonical_names(),
        model_version: LOGREG_MODEL_VERSION.to_string(),
        trained_at: now,
        iterations: options.iterations,
        learning_rate: options.learning_rate,
        loss_history: fit.loss_history,
    };
    models
        .save_model(&model)
        .map_err(|e| PredictError::Artifact(format!("{:#}", e)))?;

    log::info!(
        "[WBD] train: done, {} positive of {}, final loss {:?}",
        y.iter().filter(|v| **v > 0.5).count(),
        y.len(),
        model.loss_history.last()
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::MemoryModelStore;
    use crate::scorer::{score_with_model, LogisticModel};
    use crate::testing::{here, incident, now, FailingStore};
    use chrono::Duration;
    use wbd_core::location::Location;
    use wbd_core::prediction::ScoringMethod;
    use wbd_db::Database;

    #[test]
    fn empty_history_is_no_training_data() {
        let db = Database::new().unwrap();
        let models = MemoryModelStore::new();
        let err = train(&db, &models, &TrainOptions::default(), now()).unwrap_err();
        assert!(matches!(err, PredictError::NoTrainingData));
        assert!(err.to_string().contains("no training data"));
        assert!(models.load_model().unwrap().is_none());
    }

    #[test]
    fn single_positive_location_converges() {
        let db = Database::new().unwrap();
        db.insert_incident(&incident(here(), now() - Duration::hours(2)))
            .unwrap();
        let models = MemoryModelStore::new();

        let model = train(&db, &models, &TrainOptions::default(), now()).unwrap();
        let first = model.loss_history[0];
        let last = *model.loss_history.last().unwrap();
        assert!(last < first, "loss {} -> {}", first, last);
    }

    #[test]
    fn loss_checkpoints_every_25_and_at_the_end() {
        let x = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let y = vec![1.0, 0.0];
        assert_eq!(fit_logistic_regression(&x, &y, 400, 0.05).loss_history.len(), 17);
        assert_eq!(fit_logistic_regression(&x, &y, 26, 0.05).loss_history.len(), 2);
        assert_eq!(fit_logistic_regression(&x, &y, 1, 0.05).loss_history.len(), 1);
        assert!(fit_logistic_regression(&x, &y, 0, 0.05).loss_history.is_empty());
    }

    #[test]
    fn first_checkpoint_is_loss_at_zero_weights() {
        let fit = fit_logistic_regression(&[vec![3.0]], &[1.0], 1, 0.05);
        assert!((fit.loss_history[0] - std::f64::consts::LN_2).abs() < 1e-6);
        // p = 0.5, error = -0.5, update = 0.05 * 0.5 * [1, 3]
        assert!((fit.weights[0] - 0.025).abs() < 1e-12);
        assert!((fit.weights[1] - 0.075).abs() < 1e-12);
    }

    #[test]
    fn persisted_model_declares_canonical_features() {
        let db = Database::new().unwrap();
        db.insert_incident(&incident(here(), now() - Duration::hours(2)))
            .unwrap();
        db.insert_incident(&incident(Location::new(27.4, 95.0), now() - Duration::days(5)))
            .unwrap();
        let models = MemoryModelStore::new();
        let options = TrainOptions {
            iterations: 50,
            ..TrainOptions::default()
        };

        let trained = train(&db, &models, &options, now()).unwrap();
        let saved = models.load_model().unwrap().unwrap();
        assert_eq!(saved, trained);
        assert_eq!(saved.model_version, "logreg-v1");
        assert_eq!(saved.feature_names, FeatureName::canonical_names());
        assert_eq!(saved.weights.len(), 6);
        assert_eq!(saved.iterations, 50);
        assert_eq!(saved.trained_at, now());
        assert!(LogisticModel::from_trained(&saved).is_ok());

        let features = crate::features::build_features(&db, here(), 14, now()).unwrap();
        let assessment = score_with_model(&models, &features);
        assert_eq!(assessment.method, ScoringMethod::LogisticRegression);
        assert_eq!(assessment.model_version, "logreg-v1");
    }

    #[test]
    fn label_horizon_controls_positive_labels() {
        let db = Database::new().unwrap();
        db.insert_incident(&incident(here(), now() - Duration::hours(30)))
            .unwrap();

        // Only a negative row: the bias is pushed down.
        let narrow = train(&db, &MemoryModelStore::new(), &TrainOptions::default(), now()).unwrap();
        assert!(narrow.weights[0] < 0.0);

        // The same incident is inside a 48 h horizon: the bias is pushed up.
        let wide_options = TrainOptions {
            label_horizon_hours: 48,
            ..TrainOptions::default()
        };
        let wide = train(&db, &MemoryModelStore::new(), &wide_options, now()).unwrap();
        assert!(wide.weights[0] > 0.0);
    }

    #[test]
    fn store_failure_surfaces_as_store_error() {
        let db = Database::new().unwrap();
        db.insert_incident(&incident(here(), now() - Duration::hours(2)))
            .unwrap();
        let store = FailingStore::new(db, here());
        let models = MemoryModelStore::new();

        let err = train(&store, &models, &TrainOptions::default(), now()).unwrap_err();
        assert!(matches!(err, PredictError::Store(_)), "got {:?}", err);
        assert!(err.to_string().contains("disk I/O error"));
        assert!(models.load_model().unwrap().is_none());
    }

    #[test]
    fn out_of_range_window_or_horizon_is_rejected() {
        let db = Database::new().unwrap();
        db.insert_incident(&incident(here(), now())).unwrap();
        let models = MemoryModelStore::new();

        let long_window = TrainOptions {
            window_days: 100_000_000,
            ..TrainOptions::default()
        };
        let err = train(&db, &models, &long_window, now()).unwrap_err();
        assert!(matches!(err, PredictError::InvalidOptions(_)), "got {:?}", err);

        let long_horizon = TrainOptions {
            label_horizon_hours: u32::MAX,
            ..TrainOptions::default()
        };
        let err = train(&db, &models, &long_horizon, now()).unwrap_err();
        assert!(matches!(err, PredictError::InvalidOptions(_)), "got {:?}", err);
        assert!(models.load_model().unwrap().is_none());
    }

    #[test]
    fn nearby_but_distinct_coordinates_are_separate_rows() {
        let db = Database::new().unwrap();
        db.insert_incident(&incident(Location::new(26.18, 91.75), now() - Duration::hours(1)))
            .unwrap();
        db.insert_incident(&incident(Location::new(26.18001, 91.75), now() - Duration::days(3)))
            .unwrap();
        let models = MemoryModelStore::new();
        let options = TrainOptions {
            iterations: 1,
            ..TrainOptions::default()
        };
        // One positive and one negative row with zero weights: mean gradient on
        // the bias is (0.5 - 1 + 0.5) / 2 = 0.
        let model = train(&db, &models, &options, now()).unwrap();
        assert!(model.weights[0].abs() < 1e-12);
    }
}
