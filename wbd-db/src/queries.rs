//! Typed queries: the observation store, the prediction sink, and prediction listings.
//!
//! Location filters use exact `REAL` equality on both coordinates; the
//! engine decides how locations are grouped before it asks.

use crate::models::ObservationCounts;
use crate::Database;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, OptionalExtension};
use wbd_core::features::LocationFeatures;
use wbd_core::location::Location;
use wbd_core::observation::{
    Incident, SymptomCounts, SymptomTrend, WaterQualityReport, WaterReadings,
};
use wbd_core::prediction::{NewPrediction, OutbreakPrediction, RiskCategory};
use wbd_core::store::{ObservationStore, PredictionSink};
use wbd_utils::dates;

type PredictionRow = (i64, f64, f64, i64, String, String, f64, String, String, String);

const PREDICTION_COLUMNS: &str = "id, latitude, longitude, generated_at, target_date, model_version,
     risk_score, risk_category, features, explanation";

impl ObservationStore for Database {
    fn incidents_since(
        &self,
        location: Location,
        since: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Incident>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT disease, occurred_at, details FROM incidents
             WHERE latitude = ?1 AND longitude = ?2 AND occurred_at >= ?3
             ORDER BY occurred_at",
        )?;
        let raw_rows: Vec<(String, i64, Option<String>)> = stmt
            .query_map(
                params![location.latitude, location.longitude, since.timestamp_millis()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )?
            .collect::<Result<Vec<_>, _>>()?;

        let mut results = Vec::with_capacity(raw_rows.len());
        for (disease, occurred_at, details) in raw_rows {
            results.push(Incident {
                location,
                disease,
                occurred_at: dates::from_millis(occurred_at)?,
                details,
            });
        }
        log::debug!(
            "[WBD] query: incidents_since returned {} records",
            results.len()
        );
        Ok(results)
    }

    fn symptom_trends_since(
        &self,
        location: Location,
        since: DateTime<Utc>,
    ) -> anyhow::Result<Vec<SymptomTrend>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT date, diarrhea_count, vomiting_count, dehydration_count, fever_count, abdominal_pain_count
             FROM symptom_trends
             WHERE latitude = ?1 AND longitude = ?2 AND date >= ?3
             ORDER BY date",
        )?;
        let raw_rows: Vec<(i64, SymptomCounts)> = stmt
            .query_map(
                params![location.latitude, location.longitude, since.timestamp_millis()],
                |row| {
                    Ok((
                        row.get(0)?,
                        SymptomCounts {
                            diarrhea: row.get(1)?,
                            vomiting: row.get(2)?,
                            dehydration: row.get(3)?,
                            fever: row.get(4)?,
                            abdominal_pain: row.get(5)?,
                        },
                    ))
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;

        let mut results = Vec::with_capacity(raw_rows.len());
        for (day_ms, counts) in raw_rows {
            results.push(SymptomTrend {
                location,
                date: dates::from_millis(day_ms)?.date_naive(),
                counts,
            });
        }
        log::debug!(
            "[WBD] query: symptom_trends_since returned {} records",
            results.len()
        );
        Ok(results)
    }

    fn latest_water_report(
        &self,
        location: Location,
    ) -> anyhow::Result<Option<WaterQualityReport>> {
        let conn = self.conn.borrow();
        let row = conn
            .query_row(
                "SELECT coliform_cfu, turbidity, dissolved_oxygen, ph, temperature, collected_at, notes
                 FROM water_quality_reports
                 WHERE latitude = ?1 AND longitude = ?2
                 ORDER BY collected_at DESC, id DESC
                 LIMIT 1",
                params![location.latitude, location.longitude],
                |row| {
                    Ok((
                        WaterReadings {
                            coliform_cfu: row.get(0)?,
                            turbidity: row.get(1)?,
                            dissolved_oxygen: row.get(2)?,
                            ph: row.get(3)?,
                            temperature: row.get(4)?,
                        },
                        row.get::<_, i64>(5)?,
                        row.get::<_, Option<String>>(6)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((readings, collected_at, notes)) => Ok(Some(WaterQualityReport {
                location,
                readings,
                collected_at: dates::from_millis(collected_at)?,
                notes,
            })),
            None => Ok(None),
        }
    }

    fn incident_locations(&self) -> anyhow::Result<Vec<Location>> {
        self.query_locations("SELECT latitude, longitude FROM incidents ORDER BY id", None)
    }

    fn water_report_locations(&self) -> anyhow::Result<Vec<Location>> {
        self.query_locations(
            "SELECT latitude, longitude FROM water_quality_reports ORDER BY id",
            None,
        )
    }

    fn symptom_trend_locations(&self) -> anyhow::Result<Vec<Location>> {
        self.query_locations(
            "SELECT latitude, longitude FROM symptom_trends ORDER BY id",
            None,
        )
    }

    fn incident_locations_since(&self, since: DateTime<Utc>) -> anyhow::Result<Vec<Location>> {
        self.query_locations(
            "SELECT latitude, longitude FROM incidents WHERE occurred_at >= ?1 ORDER BY id",
            Some(since.timestamp_millis()),
        )
    }
}

impl PredictionSink for Database {
    fn insert_prediction(&self, prediction: &NewPrediction) -> anyhow::Result<OutbreakPrediction> {
        let features = serde_json::to_string(&prediction.features)?;
        let conn = self.conn.borrow();
        conn.execute(
            "INSERT INTO outbreak_predictions
             (latitude, longitude, generated_at, target_date, model_version,
              risk_score, risk_category, features, explanation)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                prediction.location.latitude,
                prediction.location.longitude,
                prediction.generated_at.timestamp_millis(),
                dates::format_date(&prediction.target_date),
                prediction.model_version,
                prediction.risk_score,
                prediction.risk_category.as_str(),
                features,
                prediction.explanation,
            ],
        )?;
        Ok(OutbreakPrediction {
            id: conn.last_insert_rowid(),
            latitude: prediction.location.latitude,
            longitude: prediction.location.longitude,
            generated_at: prediction.generated_at,
            target_date: prediction.target_date,
            model_version: prediction.model_version.clone(),
            risk_score: prediction.risk_score,
            risk_category: prediction.risk_category,
            features: prediction.features.clone(),
            explanation: prediction.explanation.clone(),
        })
    }
}

impl Database {
    fn query_locations(&self, sql: &str, since_ms: Option<i64>) -> anyhow::Result<Vec<Location>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(sql)?;
        let rows = match since_ms {
            Some(ms) => stmt
                .query_map(params![ms], location_from_row)?
                .collect::<Result<Vec<_>, _>>()?,
            None => stmt
                .query_map([], location_from_row)?
                .collect::<Result<Vec<_>, _>>()?,
        };
        Ok(rows)
    }

    /// Predictions about `target_date`, highest risk first.
    pub fn query_predictions_for_target(
        &self,
        target_date: NaiveDate,
        limit: usize,
    ) -> anyhow::Result<Vec<OutbreakPrediction>> {
        let sql = format!(
            "SELECT {} FROM outbreak_predictions
             WHERE target_date = ?1
             ORDER BY risk_score DESC, generated_at DESC
             LIMIT ?2",
            PREDICTION_COLUMNS
        );
        let rows = self.query_prediction_rows(
            &sql,
            params![dates::format_date(&target_date), limit as i64],
        )?;
        log::info!(
            "[WBD] query: query_predictions_for_target returned {} records",
            rows.len()
        );
        Ok(rows)
    }

    /// Most recently generated predictions first.
    pub fn query_latest_predictions(&self, limit: usize) -> anyhow::Result<Vec<OutbreakPrediction>> {
        let sql = format!(
            "SELECT {} FROM outbreak_predictions
             ORDER BY generated_at DESC, id DESC
             LIMIT ?1",
            PREDICTION_COLUMNS
        );
        let rows = self.query_prediction_rows(&sql, params![limit as i64])?;
        log::info!(
            "[WBD] query: query_latest_predictions returned {} records",
            rows.len()
        );
        Ok(rows)
    }

    pub fn query_observation_counts(&self) -> anyhow::Result<ObservationCounts> {
        let conn = self.conn.borrow();
        let count = |table: &str| -> anyhow::Result<i64> {
            Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?)
        };
        Ok(ObservationCounts {
            incidents: count("incidents")?,
            water_reports: count("water_quality_reports")?,
            symptom_trends: count("symptom_trends")?,
            predictions: count("outbreak_predictions")?,
        })
    }

    fn query_prediction_rows(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> anyhow::Result<Vec<OutbreakPrediction>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(sql)?;
        let raw_rows: Vec<PredictionRow> = stmt
            .query_map(params, |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                    row.get(8)?,
                    row.get(9)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        raw_rows.into_iter().map(prediction_from_row).collect()
    }
}

fn location_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Location> {
    Ok(Location::new(row.get(0)?, row.get(1)?))
}

fn prediction_from_row(row: PredictionRow) -> anyhow::Result<OutbreakPrediction> {
    let (
        id,
        latitude,
        longitude,
        generated_at,
        target_date,
        model_version,
        risk_score,
        risk_category,
        features,
        explanation,
    ) = row;
    let features: LocationFeatures = serde_json::from_str(&features)?;
    Ok(OutbreakPrediction {
        id,
        latitude,
        longitude,
        generated_at: dates::from_millis(generated_at)?,
        target_date: dates::parse_date(&target_date)?,
        model_version,
        risk_score,
        risk_category: risk_category.parse::<RiskCategory>()?,
        features,
        explanation,
    })
}
