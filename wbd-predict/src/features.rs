//! Reduce one location's observation history to a [`LocationFeatures`] record.
//!
//! Incidents and symptom trends are read over a lookback window of
//! `window_days` ending at `now`; the water-quality signal always comes from
//! the single most recent report, however old.

use chrono::{DateTime, Utc};
use wbd_core::features::LocationFeatures;
use wbd_core::location::Location;
use wbd_core::observation::{WaterReadings, SYMPTOM_WEIGHTS};
use wbd_core::store::ObservationStore;
use wbd_utils::dates;

/// Build the feature record for a single location.
///
/// Store read failures propagate unchanged, as does a window too long to
/// subtract from `now`.
pub fn build_features<S>(
    store: &S,
    location: Location,
    window_days: u32,
    now: DateTime<Utc>,
) -> anyhow::Result<LocationFeatures>
where
    S: ObservationStore + ?Sized,
{
    let window_start = dates::window_start(&now, window_days)?;

    let incidents = store.incidents_since(location, window_start)?;
    let incident_count = incidents.len() as u32;
    let incident_rate_per_day = safe_div(incident_count as f64, window_days as f64);

    let trends = store.symptom_trends_since(location, window_start)?;
    let recent_symptom_score = if trends.is_empty() {
        0.0
    } else {
        let total: f64 = trends
            .iter()
            .map(|t| t.counts.weighted_sum(&SYMPTOM_WEIGHTS))
            .sum();
        total / trends.len() as f64
    };

    let latest_report = store.latest_water_report(location)?;
    let water_quality_score = latest_report
        .as_ref()
        .map(|r| water_quality_score(&r.readings))
        .unwrap_or(0.0);
    let last_report_age_hours = latest_report
        .as_ref()
        .map(|r| dates::hours_between(&r.collected_at, &now));

    let features = LocationFeatures {
        latitude: location.latitude,
        longitude: location.longitude,
        window_days,
        incident_count,
        incident_rate_per_day,
        recent_symptom_score,
        water_quality_score,
        seasonal_factor: seasonal_factor(dates::month_index(&now)),
        last_report_age_hours,
    };
    log::debug!(
        "[WBD] features: ({}, {}) incidents={} symptoms={:.2} water={:.2}",
        location.latitude,
        location.longitude,
        features.incident_count,
        features.recent_symptom_score,
        features.water_quality_score
    );
    Ok(features)
}

/// Build feature records for many locations, one at a time, in input order.
pub fn build_features_for_locations<S>(
    store: &S,
    locations: &[Location],
    window_days: u32,
    now: DateTime<Utc>,
) -> anyhow::Result<Vec<LocationFeatures>>
where
    S: ObservationStore + ?Sized,
{
    locations
        .iter()
        .map(|location| build_features(store, *location, window_days, now))
        .collect()
}

/// Mean of the per-reading "badness" sub-scores, each in `[0, 1]`.
///
/// Only readings that are present contribute; no readings at all gives 0.
pub fn water_quality_score(readings: &WaterReadings) -> f64 {
    let parts: Vec<f64> = [
        readings.coliform_cfu.map(coliform_score),
        readings.turbidity.map(turbidity_score),
        readings.dissolved_oxygen.map(dissolved_oxygen_score),
        readings.ph.map(ph_score),
        readings.temperature.map(temperature_score),
    ]
    .into_iter()
    .flatten()
    .collect();

    if parts.is_empty() {
        0.0
    } else {
        parts.iter().sum::<f64>() / parts.len() as f64
    }
}

/// 0..1000 CFU maps linearly onto 0..1.
pub fn coliform_score(cfu: f64) -> f64 {
    (cfu / 1000.0).min(1.0)
}

/// 0..10 NTU maps linearly onto 0..1.
pub fn turbidity_score(ntu: f64) -> f64 {
    (ntu / 10.0).min(1.0)
}

/// Risk rises as dissolved oxygen falls below 6 mg/L.
pub fn dissolved_oxygen_score(mg_per_l: f64) -> f64 {
    if mg_per_l >= 6.0 {
        0.0
    } else {
        ((6.0 - mg_per_l) / 6.0).min(1.0)
    }
}

/// Zero inside 6.5..=8.5, then half the distance to the nearest bound.
pub fn ph_score(ph: f64) -> f64 {
    let deviation = if ph < 6.5 {
        6.5 - ph
    } else if ph > 8.5 {
        ph - 8.5
    } else {
        0.0
    };
    (deviation / 2.0).min(1.0)
}

/// Risk rises above 28 °C, saturating at 40 °C.
pub fn temperature_score(celsius: f64) -> f64 {
    if celsius <= 28.0 {
        0.0
    } else {
        ((celsius - 28.0) / 12.0).min(1.0)
    }
}

/// Seasonal multiplier for a 0-based month: monsoon Jun-Sep, shoulder Mar/Apr/Oct.
pub fn seasonal_factor(month0: u32) -> f64 {
    match month0 {
        5..=8 => 1.0,
        2 | 3 | 9 => 0.7,
        _ => 0.4,
    }
}

fn safe_div(a: f64, b: f64) -> f64 {
    if b == 0.0 {
        0.0
    } else {
        a / b
    }
}
