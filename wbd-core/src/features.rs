//! Derived per-location feature records and their named model inputs.
//!
//! A [`LocationFeatures`] record is always recomputed from the observation
//! history and never stored on its own (a copy is embedded in each
//! prediction for auditing). Models see it only through [`FeatureName`]
//! lookups, so the positional order of a model's coefficients is always
//! taken from the model's own declared names.

use crate::location::Location;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Report age (in hours) at which `lastReportAgeFrac` saturates: 14 days.
pub const REPORT_AGE_SATURATION_HOURS: f64 = 24.0 * 14.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationFeatures {
    pub latitude: f64,
    pub longitude: f64,
    pub window_days: u32,
    pub incident_count: u32,
    pub incident_rate_per_day: f64,
    /// Per-row mean of weighted symptom sums.
    pub recent_symptom_score: f64,
    /// 0..1, higher is worse.
    pub water_quality_score: f64,
    /// 0..1 multiplier keyed to the calendar month.
    pub seasonal_factor: f64,
    /// Hours since the latest water report, if any report exists.
    pub last_report_age_hours: Option<f64>,
}

impl LocationFeatures {
    pub fn location(&self) -> Location {
        Location::new(self.latitude, self.longitude)
    }

    /// `min(1, lastReportAgeHours / 336)`, or 0 when there is no report.
    pub fn last_report_age_frac(&self) -> f64 {
        match self.last_report_age_hours {
            Some(hours) => (hours / REPORT_AGE_SATURATION_HOURS).min(1.0),
            None => 0.0,
        }
    }

    pub fn value_of(&self, name: FeatureName) -> f64 {
        match name {
            FeatureName::IncidentRatePerDay => self.incident_rate_per_day,
            FeatureName::RecentSymptomScore => self.recent_symptom_score,
            FeatureName::WaterQualityScore => self.water_quality_score,
            FeatureName::SeasonalFactor => self.seasonal_factor,
            FeatureName::LastReportAgeFrac => self.last_report_age_frac(),
        }
    }

    /// Positional model input in the order given by `names`.
    pub fn vector(&self, names: &[FeatureName]) -> Vec<f64> {
        names.iter().map(|name| self.value_of(*name)).collect()
    }
}

/// The model inputs derivable from a [`LocationFeatures`] record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureName {
    IncidentRatePerDay,
    RecentSymptomScore,
    WaterQualityScore,
    SeasonalFactor,
    LastReportAgeFrac,
}

impl FeatureName {
    /// Canonical order used when training a new model.
    pub const ALL: [FeatureName; 5] = [
        FeatureName::IncidentRatePerDay,
        FeatureName::RecentSymptomScore,
        FeatureName::WaterQualityScore,
        FeatureName::SeasonalFactor,
        FeatureName::LastReportAgeFrac,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureName::IncidentRatePerDay => "incidentRatePerDay",
            FeatureName::RecentSymptomScore => "recentSymptomScore",
            FeatureName::WaterQualityScore => "waterQualityScore",
            FeatureName::SeasonalFactor => "seasonalFactor",
            FeatureName::LastReportAgeFrac => "lastReportAgeFrac",
        }
    }

    pub fn canonical_names() -> Vec<String> {
        Self::ALL.iter().map(|n| n.as_str().to_string()).collect()
    }
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeatureName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown feature name: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LocationFeatures {
        LocationFeatures {
            latitude: 26.18,
            longitude: 91.75,
            window_days: 14,
            incident_count: 7,
            incident_rate_per_day: 0.5,
            recent_symptom_score: 12.0,
            water_quality_score: 0.25,
            seasonal_factor: 1.0,
            last_report_age_hours: Some(168.0),
        }
    }

    #[test]
    fn canonical_vector_order() {
        let v = sample().vector(&FeatureName::ALL);
        assert_eq!(v, vec![0.5, 12.0, 0.25, 1.0, 0.5]);
    }

    #[test]
    fn vector_follows_requested_order() {
        let names = [FeatureName::SeasonalFactor, FeatureName::IncidentRatePerDay];
        assert_eq!(sample().vector(&names), vec![1.0, 0.5]);
    }

    #[test]
    fn report_age_fraction_saturates_and_defaults() {
        let mut f = sample();
        f.last_report_age_hours = Some(1000.0);
        assert_eq!(f.last_report_age_frac(), 1.0);
        f.last_report_age_hours = None;
        assert_eq!(f.last_report_age_frac(), 0.0);
    }

    #[test]
    fn names_parse_back() {
        for name in FeatureName::ALL {
            assert_eq!(name.as_str().parse::<FeatureName>().unwrap(), name);
        }
        assert!("incidentCount".parse::<FeatureName>().is_err());
    }

    #[test]
    fn snapshot_json_uses_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["incidentRatePerDay"], 0.5);
        assert_eq!(json["lastReportAgeHours"], 168.0);
        assert_eq!(json["windowDays"], 14);
    }
}
