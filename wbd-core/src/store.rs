//! Interfaces the engine consumes from (and writes to) persistent storage.
//!
//! All location arguments are matched by exact coordinate equality.
//! Implementations perform no retries; read failures propagate to the caller.

use crate::location::Location;
use crate::observation::{Incident, SymptomTrend, WaterQualityReport};
use crate::prediction::{NewPrediction, OutbreakPrediction};
use chrono::{DateTime, Utc};

/// Read-only access to the observation history.
pub trait ObservationStore {
    /// Incidents at `location` with `occurred_at >= since`.
    fn incidents_since(
        &self,
        location: Location,
        since: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Incident>>;

    /// Symptom trend rows at `location` whose day starts at or after `since`.
    fn symptom_trends_since(
        &self,
        location: Location,
        since: DateTime<Utc>,
    ) -> anyhow::Result<Vec<SymptomTrend>>;

    /// The most recently collected water report at `location`, with no time limit.
    fn latest_water_report(
        &self,
        location: Location,
    ) -> anyhow::Result<Option<WaterQualityReport>>;

    /// Coordinates of every incident, duplicates included.
    fn incident_locations(&self) -> anyhow::Result<Vec<Location>>;

    /// Coordinates of every water report, duplicates included.
    fn water_report_locations(&self) -> anyhow::Result<Vec<Location>>;

    /// Coordinates of every symptom trend row, duplicates included.
    fn symptom_trend_locations(&self) -> anyhow::Result<Vec<Location>>;

    /// Coordinates of incidents with `occurred_at >= since` (across all locations).
    fn incident_locations_since(&self, since: DateTime<Utc>) -> anyhow::Result<Vec<Location>>;
}

/// Append-only sink for prediction records.
pub trait PredictionSink {
    fn insert_prediction(&self, prediction: &NewPrediction) -> anyhow::Result<OutbreakPrediction>;
}
