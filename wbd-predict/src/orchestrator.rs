//! Prediction runs: score every known location and persist the results.

use crate::features::build_features;
use crate::scorer::score_with_model;
use anyhow::Context;
use chrono::{DateTime, Utc};
use wbd_core::features::LocationFeatures;
use wbd_core::location::{Location, LocationGrouping};
use wbd_core::model::ModelStore;
use wbd_core::prediction::{NewPrediction, OutbreakPrediction, RiskAssessment};
use wbd_core::store::{ObservationStore, PredictionSink};
use wbd_utils::dates;

#[derive(Debug, Clone, PartialEq)]
pub struct PredictOptions {
    pub window_days: u32,
    /// Days after `now` that the predictions are about.
    pub target_offset_days: i64,
}

impl Default for PredictOptions {
    fn default() -> Self {
        Self {
            window_days: 14,
            target_offset_days: 1,
        }
    }
}

/// Every location seen in any observation kind, de-duplicated to 4 decimals.
pub fn collect_prediction_locations<S>(store: &S) -> anyhow::Result<Vec<Location>>
where
    S: ObservationStore + ?Sized,
{
    let incidents = store.incident_locations()?;
    let reports = store.water_report_locations()?;
    let trends = store.symptom_trend_locations()?;
    log::debug!(
        "[WBD] predict: raw locations incidents={} reports={} trends={}",
        incidents.len(),
        reports.len(),
        trends.len()
    );
    Ok(LocationGrouping::for_predictions()
        .distinct(incidents.into_iter().chain(reports).chain(trends)))
}

/// Short human-readable account of a score.
pub fn explain(assessment: &RiskAssessment, features: &LocationFeatures) -> String {
    format!(
        "{} factors: symptoms={:.1}, water={:.2}, incidents/day={:.2}, season={:.2}",
        assessment.method,
        features.recent_symptom_score,
        features.water_quality_score,
        features.incident_rate_per_day,
        features.seasonal_factor
    )
}

/// Score every known location and write one prediction per location.
///
/// Locations are processed one at a time; the first failure aborts the run
/// and is returned with the offending coordinates attached. Predictions
/// written before the failure stay written.
pub fn generate_predictions<S, P, M>(
    store: &S,
    sink: &P,
    models: &M,
    options: &PredictOptions,
    now: DateTime<Utc>,
) -> anyhow::Result<Vec<OutbreakPrediction>>
where
    S: ObservationStore + ?Sized,
    P: PredictionSink + ?Sized,
    M: ModelStore + ?Sized,
{
    let locations = collect_prediction_locations(store)?;
    if locations.is_empty() {
        log::info!("[WBD] predict: no observed locations, nothing to do");
        return Ok(Vec::new());
    }

    let target_date = dates::target_date(&now, options.target_offset_days)?;
    log::info!(
        "[WBD] predict: {} locations for {}",
        locations.len(),
        dates::format_date(&target_date)
    );

    let mut created = Vec::with_capacity(locations.len());
    for location in locations {
        let features = build_features(store, location, options.window_days, now).with_context(
            || {
                format!(
                    "building features for ({}, {})",
                    location.latitude, location.longitude
                )
            },
        )?;
        let assessment = score_with_model(models, &features);
        let explanation = explain(&assessment, &features);

        let prediction = NewPrediction {
            location,
            generated_at: now,
            target_date,
            model_version: assessment.model_version,
            risk_score: assessment.score,
            risk_category: assessment.category,
            features,
            explanation,
        };
        let stored = sink.insert_prediction(&prediction).with_context(|| {
            format!(
                "saving prediction for ({}, {})",
                location.latitude, location.longitude
            )
        })?;
        created.push(stored);
    }

    log::info!("[WBD] predict: created {} predictions", created.len());
    Ok(created)
}
