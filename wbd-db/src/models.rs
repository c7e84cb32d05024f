//! Query result structs that have no counterpart in `wbd-core`.

use serde::Serialize;

/// Row counts per table, reported after a load.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct ObservationCounts {
    pub incidents: i64,
    pub water_reports: i64,
    pub symptom_trends: i64,
    pub predictions: i64,
}
