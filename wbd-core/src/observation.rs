use crate::location::Location;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Weights applied to each symptom counter when building the symptom index.
pub const SYMPTOM_WEIGHTS: SymptomWeights = SymptomWeights {
    diarrhea: 1.0,
    vomiting: 0.8,
    dehydration: 0.9,
    fever: 0.6,
    abdominal_pain: 0.5,
};

/// The three observation kinds held by the store.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum ObservationKind {
    Incident,
    WaterQualityReport,
    SymptomTrend,
}

impl fmt::Display for ObservationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObservationKind::Incident => "incident",
            ObservationKind::WaterQualityReport => "water-quality-report",
            ObservationKind::SymptomTrend => "symptom-trend",
        };
        write!(f, "{}", name)
    }
}

/// A reported case of a water-borne disease.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub location: Location,
    /// Free-text disease label, e.g. "Cholera".
    pub disease: String,
    pub occurred_at: DateTime<Utc>,
    pub details: Option<String>,
}

/// A physical/chemical water sample. Every reading is optional; a missing
/// reading is "no evidence", never a default value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WaterReadings {
    /// Coliform count in CFU/100 mL.
    pub coliform_cfu: Option<f64>,
    /// Turbidity in NTU.
    pub turbidity: Option<f64>,
    /// Dissolved oxygen in mg/L.
    pub dissolved_oxygen: Option<f64>,
    pub ph: Option<f64>,
    /// Water temperature in degrees Celsius.
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterQualityReport {
    pub location: Location,
    pub readings: WaterReadings,
    pub collected_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Daily symptom counters for one location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SymptomCounts {
    pub diarrhea: u32,
    pub vomiting: u32,
    pub dehydration: u32,
    pub fever: u32,
    pub abdominal_pain: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymptomWeights {
    pub diarrhea: f64,
    pub vomiting: f64,
    pub dehydration: f64,
    pub fever: f64,
    pub abdominal_pain: f64,
}

impl SymptomCounts {
    pub fn weighted_sum(&self, weights: &SymptomWeights) -> f64 {
        self.diarrhea as f64 * weights.diarrhea
            + self.vomiting as f64 * weights.vomiting
            + self.dehydration as f64 * weights.dehydration
            + self.fever as f64 * weights.fever
            + self.abdominal_pain as f64 * weights.abdominal_pain
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomTrend {
    pub location: Location,
    /// Calendar day the counters cover.
    pub date: NaiveDate,
    pub counts: SymptomCounts,
}

/// Any record from the observation history.
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    Incident(Incident),
    WaterQualityReport(WaterQualityReport),
    SymptomTrend(SymptomTrend),
}

impl Observation {
    pub fn kind(&self) -> ObservationKind {
        match self {
            Observation::Incident(_) => ObservationKind::Incident,
            Observation::WaterQualityReport(_) => ObservationKind::WaterQualityReport,
            Observation::SymptomTrend(_) => ObservationKind::SymptomTrend,
        }
    }

    pub fn location(&self) -> Location {
        match self {
            Observation::Incident(i) => i.location,
            Observation::WaterQualityReport(w) => w.location,
            Observation::SymptomTrend(s) => s.location,
        }
    }
}

impl From<Incident> for Observation {
    fn from(value: Incident) -> Self {
        Observation::Incident(value)
    }
}

impl From<WaterQualityReport> for Observation {
    fn from(value: WaterQualityReport) -> Self {
        Observation::WaterQualityReport(value)
    }
}

impl From<SymptomTrend> for Observation {
    fn from(value: SymptomTrend) -> Self {
        Observation::SymptomTrend(value)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_weighted_sum_uses_every_counter() {
        let counts = SymptomCounts {
            diarrhea: 10,
            vomiting: 5,
            dehydration: 2,
            fever: 4,
            abdominal_pain: 6,
        };
        // 10*1.0 + 5*0.8 + 2*0.9 + 4*0.6 + 6*0.5
        let expected = 10.0 + 4.0 + 1.8 + 2.4 + 3.0;
        assert!((counts.weighted_sum(&SYMPTOM_WEIGHTS) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_empty_counts_weigh_nothing() {
        assert_eq!(SymptomCounts::default().weighted_sum(&SYMPTOM_WEIGHTS), 0.0);
    }

    #[test]
    fn test_observation_kind_and_location() {
        let location = Location::new(24.83, 92.78);
        let observation: Observation = SymptomTrend {
            location,
            date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            counts: SymptomCounts::default(),
        }
        .into();
        assert_eq!(observation.kind(), ObservationKind::SymptomTrend);
        assert_eq!(observation.location(), location);
        assert_eq!(observation.kind().to_string(), "symptom-trend");
    }
}
