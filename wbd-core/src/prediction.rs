use crate::features::LocationFeatures;
use crate::location::Location;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scores at or above this are [`RiskCategory::High`].
pub const HIGH_RISK_THRESHOLD: f64 = 0.65;

/// Scores at or above this (and below high) are [`RiskCategory::Moderate`].
pub const MODERATE_RISK_THRESHOLD: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    Low,
    Moderate,
    High,
}

impl RiskCategory {
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_RISK_THRESHOLD {
            RiskCategory::High
        } else if score >= MODERATE_RISK_THRESHOLD {
            RiskCategory::Moderate
        } else {
            RiskCategory::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Low => "Low",
            RiskCategory::Moderate => "Moderate",
            RiskCategory::High => "High",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(RiskCategory::Low),
            "Moderate" => Ok(RiskCategory::Moderate),
            "High" => Ok(RiskCategory::High),
            other => anyhow::bail!("unknown risk category: {}", other),
        }
    }
}

/// Which scorer produced a risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoringMethod {
    Heuristic,
    LogisticRegression,
}

impl ScoringMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringMethod::Heuristic => "heuristic",
            ScoringMethod::LogisticRegression => "logistic-regression",
        }
    }
}

impl fmt::Display for ScoringMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score and category from either scorer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskScore {
    pub score: f64,
    pub category: RiskCategory,
}

impl RiskScore {
    pub fn from_score(score: f64) -> Self {
        Self {
            score,
            category: RiskCategory::from_score(score),
        }
    }
}

/// Output of the model scorer: the score plus which model produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskAssessment {
    pub score: f64,
    pub category: RiskCategory,
    pub model_version: String,
    pub method: ScoringMethod,
}

/// A prediction about to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPrediction {
    pub location: Location,
    pub generated_at: DateTime<Utc>,
    /// The day the prediction is about.
    pub target_date: NaiveDate,
    pub model_version: String,
    pub risk_score: f64,
    pub risk_category: RiskCategory,
    pub features: LocationFeatures,
    pub explanation: String,
}

/// A stored prediction. Never mutated; several may exist for the same
/// location and target date, so "latest" means highest `generated_at`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutbreakPrediction {
    pub id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub generated_at: DateTime<Utc>,
    pub target_date: NaiveDate,
    pub model_version: String,
    pub risk_score: f64,
    pub risk_category: RiskCategory,
    pub features: LocationFeatures,
    pub explanation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_boundaries_are_inclusive_on_the_lower_edge() {
        assert_eq!(RiskCategory::from_score(0.0), RiskCategory::Low);
        assert_eq!(RiskCategory::from_score(0.399_999), RiskCategory::Low);
        assert_eq!(RiskCategory::from_score(0.4), RiskCategory::Moderate);
        assert_eq!(RiskCategory::from_score(0.649_999), RiskCategory::Moderate);
        assert_eq!(RiskCategory::from_score(0.65), RiskCategory::High);
        assert_eq!(RiskCategory::from_score(1.0), RiskCategory::High);
    }

    #[test]
    fn category_parses_its_own_display() {
        for c in [RiskCategory::Low, RiskCategory::Moderate, RiskCategory::High] {
            assert_eq!(c.to_string().parse::<RiskCategory>().unwrap(), c);
        }
        assert!("Severe".parse::<RiskCategory>().is_err());
    }

    #[test]
    fn method_names() {
        assert_eq!(ScoringMethod::Heuristic.to_string(), "heuristic");
        assert_eq!(
            ScoringMethod::LogisticRegression.to_string(),
            "logistic-regression"
        );
    }
}
