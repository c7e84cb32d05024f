//! Fixed-weight outbreak risk score, used directly and as the fallback when
//! no valid trained model is available.

use wbd_core::features::LocationFeatures;
use wbd_core::model::HEURISTIC_MODEL_VERSION;
use wbd_core::prediction::{RiskAssessment, RiskScore, ScoringMethod};

const SYMPTOM_WEIGHT: f64 = 0.4;
const WATER_WEIGHT: f64 = 0.3;
const INCIDENT_WEIGHT: f64 = 0.2;
const SEASON_WEIGHT: f64 = 0.1;

/// Symptom score at which the symptom term saturates.
const SYMPTOM_SATURATION: f64 = 20.0;
/// Incidents per day at which the incident term saturates.
const INCIDENT_RATE_SATURATION: f64 = 2.0;

/// Water reports older than this (10 days) cost a small penalty.
const STALE_REPORT_HOURS: f64 = 24.0 * 10.0;
const STALE_REPORT_PENALTY: f64 = 0.05;

/// Score a feature record in `[0, 1]` with the fixed heuristic weights.
pub fn score_heuristic(f: &LocationFeatures) -> RiskScore {
    let mut raw = 0.0;
    raw += (f.recent_symptom_score / SYMPTOM_SATURATION).min(1.0) * SYMPTOM_WEIGHT;
    raw += f.water_quality_score.min(1.0) * WATER_WEIGHT;
    raw += (f.incident_rate_per_day / INCIDENT_RATE_SATURATION).min(1.0) * INCIDENT_WEIGHT;
    raw += f.seasonal_factor * SEASON_WEIGHT;

    if matches!(f.last_report_age_hours, Some(age) if age > STALE_REPORT_HOURS) {
        raw -= STALE_REPORT_PENALTY;
    }

    RiskScore::from_score(raw.clamp(0.0, 1.0))
}

/// The heuristic score reported under its own version, for direct use.
pub fn assess_heuristic(f: &LocationFeatures) -> RiskAssessment {
    let RiskScore { score, category } = score_heuristic(f);
    RiskAssessment {
        score,
        category,
        model_version: HEURISTIC_MODEL_VERSION.to_string(),
        method: ScoringMethod::Heuristic,
    }
}
