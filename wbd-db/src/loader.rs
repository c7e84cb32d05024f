//! Ingestion helpers: typed inserts and CSV loaders for the observation tables.
//!
//! The engine itself never writes observations; these exist so the CLI and
//! tests can populate a store. Each CSV has a header row and columns are
//! read by position.
//!
//! # CSV Formats
//!
//! - **Incidents**: `latitude,longitude,disease,occurred_at,details`
//! - **Water reports**: `latitude,longitude,coliform_cfu,turbidity,dissolved_oxygen,ph,temperature,collected_at,notes`
//! - **Symptom trends**: `latitude,longitude,date,diarrhea,vomiting,dehydration,fever,abdominal_pain`
//!
//! Timestamps accept RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC) or `YYYY-MM-DD`.
//! Rows with unparseable coordinates or timestamps are skipped. Empty or
//! non-numeric water readings are stored as NULL.

use crate::Database;
use csv::StringRecord;
use rusqlite::params;
use wbd_core::location::Location;
use wbd_core::observation::{
    Incident, Observation, ObservationKind, SymptomCounts, SymptomTrend, WaterQualityReport,
    WaterReadings,
};
use wbd_utils::dates;

impl Database {
    /// Insert any observation into its table.
    pub fn insert_observation(&self, observation: &Observation) -> anyhow::Result<i64> {
        let location = observation.location();
        log::debug!(
            "[WBD] loader: insert {} at ({}, {})",
            observation.kind(),
            location.latitude,
            location.longitude
        );
        match observation {
            Observation::Incident(incident) => self.insert_incident(incident),
            Observation::WaterQualityReport(report) => self.insert_water_report(report),
            Observation::SymptomTrend(trend) => self.insert_symptom_trend(trend),
        }
    }

    pub fn insert_incident(&self, incident: &Incident) -> anyhow::Result<i64> {
        let conn = self.conn.borrow();
        conn.execute(
            "INSERT INTO incidents (latitude, longitude, disease, occurred_at, details)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                incident.location.latitude,
                incident.location.longitude,
                incident.disease,
                incident.occurred_at.timestamp_millis(),
                incident.details,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn insert_water_report(&self, report: &WaterQualityReport) -> anyhow::Result<i64> {
        let conn = self.conn.borrow();
        let r = &report.readings;
        conn.execute(
            "INSERT INTO water_quality_reports
             (latitude, longitude, coliform_cfu, turbidity, dissolved_oxygen, ph, temperature, collected_at, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                report.location.latitude,
                report.location.longitude,
                r.coliform_cfu,
                r.turbidity,
                r.dissolved_oxygen,
                r.ph,
                r.temperature,
                report.collected_at.timestamp_millis(),
                report.notes,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn insert_symptom_trend(&self, trend: &SymptomTrend) -> anyhow::Result<i64> {
        let conn = self.conn.borrow();
        let c = &trend.counts;
        conn.execute(
            "INSERT INTO symptom_trends
             (latitude, longitude, date, diarrhea_count, vomiting_count, dehydration_count, fever_count, abdominal_pain_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                trend.location.latitude,
                trend.location.longitude,
                dates::day_start(&trend.date).timestamp_millis(),
                c.diarrhea,
                c.vomiting,
                c.dehydration,
                c.fever,
                c.abdominal_pain,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Load incidents from CSV string.
    ///
    /// # Example CSV
    /// ```text
    /// latitude,longitude,disease,occurred_at,details
    /// 26.18,91.75,Cholera,2024-07-01T08:00:00Z,Household cluster
    /// ```
    pub fn load_incidents(&self, csv_data: &str) -> anyhow::Result<usize> {
        let mut count = 0usize;
        let mut skipped = 0usize;
        for result in reader(csv_data).records() {
            let r = result?;
            let (location, occurred_at) = match (parse_location(&r), field_timestamp(&r, 3)) {
                (Some(l), Some(t)) => (l, t),
                _ => {
                    skipped += 1;
                    continue;
                }
            };
            let disease = r.get(2).unwrap_or("").trim();
            if disease.is_empty() {
                skipped += 1;
                continue;
            }
            self.insert_observation(
                &Incident {
                    location,
                    disease: disease.to_string(),
                    occurred_at,
                    details: field_text(&r, 4),
                }
                .into(),
            )?;
            count += 1;
        }
        log_loaded(ObservationKind::Incident, count, skipped);
        Ok(count)
    }

    /// Load water-quality reports from CSV string.
    ///
    /// # Example CSV
    /// ```text
    /// latitude,longitude,coliform_cfu,turbidity,dissolved_oxygen,ph,temperature,collected_at,notes
    /// 26.18,91.75,500,5,3,9.5,34,2024-07-01T06:00:00Z,
    /// 26.18,91.75,,2.5,,,,2024-07-02T06:00:00Z,turbidity only
    /// ```
    pub fn load_water_reports(&self, csv_data: &str) -> anyhow::Result<usize> {
        let mut count = 0usize;
        let mut skipped = 0usize;
        for result in reader(csv_data).records() {
            let r = result?;
            let (location, collected_at) = match (parse_location(&r), field_timestamp(&r, 7)) {
                (Some(l), Some(t)) => (l, t),
                _ => {
                    skipped += 1;
                    continue;
                }
            };
            let readings = WaterReadings {
                coliform_cfu: field_f64(&r, 2),
                turbidity: field_f64(&r, 3),
                dissolved_oxygen: field_f64(&r, 4),
                ph: field_f64(&r, 5),
                temperature: field_f64(&r, 6),
            };
            self.insert_observation(
                &WaterQualityReport {
                    location,
                    readings,
                    collected_at,
                    notes: field_text(&r, 8),
                }
                .into(),
            )?;
            count += 1;
        }
        log_loaded(ObservationKind::WaterQualityReport, count, skipped);
        Ok(count)
    }

    /// Load daily symptom trends from CSV string.
    ///
    /// Missing counters are read as zero; negative or non-integer counters
    /// reject the row.
    ///
    /// # Example CSV
    /// ```text
    /// latitude,longitude,date,diarrhea,vomiting,dehydration,fever,abdominal_pain
    /// 26.18,91.75,2024-07-01,12,4,3,6,2
    /// ```
    pub fn load_symptom_trends(&self, csv_data: &str) -> anyhow::Result<usize> {
        let mut count = 0usize;
        let mut skipped = 0usize;
        for result in reader(csv_data).records() {
            let r = result?;
            let location = parse_location(&r);
            let date = r.get(2).and_then(|s| dates::parse_date(s).ok());
            let counters: Option<Vec<u32>> = (3..8).map(|i| field_count(&r, i)).collect();
            let (location, date, counters) = match (location, date, counters) {
                (Some(l), Some(d), Some(c)) => (l, d, c),
                _ => {
                    skipped += 1;
                    continue;
                }
            };
            self.insert_observation(
                &SymptomTrend {
                    location,
                    date,
                    counts: SymptomCounts {
                        diarrhea: counters[0],
                        vomiting: counters[1],
                        dehydration: counters[2],
                        fever: counters[3],
                        abdominal_pain: counters[4],
                    },
                }
                .into(),
            )?;
            count += 1;
        }
        log_loaded(ObservationKind::SymptomTrend, count, skipped);
        Ok(count)
    }
}

fn log_loaded(kind: ObservationKind, count: usize, skipped: usize) {
    log::info!(
        "[WBD] loader: Loaded {} {} rows, skipped {} invalid",
        count,
        kind,
        skipped
    );
}

fn reader(csv_data: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes())
}

fn parse_location(r: &StringRecord) -> Option<Location> {
    let latitude = field_f64(r, 0)?;
    let longitude = field_f64(r, 1)?;
    Some(Location::new(latitude, longitude))
}

fn field_f64(r: &StringRecord, idx: usize) -> Option<f64> {
    r.get(idx)
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn field_timestamp(r: &StringRecord, idx: usize) -> Option<chrono::DateTime<chrono::Utc>> {
    r.get(idx).and_then(|s| dates::parse_timestamp(s).ok())
}

fn field_text(r: &StringRecord, idx: usize) -> Option<String> {
    r.get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// Empty counter -> 0; anything else must be a non-negative integer.
fn field_count(r: &StringRecord, idx: usize) -> Option<u32> {
    match r.get(idx).map(str::trim) {
        None | Some("") => Some(0),
        Some(s) => s.parse::<u32>().ok(),
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;
    use chrono::{NaiveDate, TimeZone, Utc};
    use wbd_core::location::Location;
    use wbd_core::observation::{
        Incident, Observation, SymptomCounts, SymptomTrend, WaterQualityReport, WaterReadings,
    };
    use wbd_core::store::ObservationStore;

    #[test]
    fn insert_observation_routes_each_kind_to_its_table() {
        let db = Database::new().unwrap();
        let here = Location::new(26.18, 91.75);
        let at = Utc.with_ymd_and_hms(2024, 7, 1, 8, 0, 0).unwrap();
        let observations: Vec<Observation> = vec![
            Incident {
                location: here,
                disease: "Cholera".to_string(),
                occurred_at: at,
                details: None,
            }
            .into(),
            WaterQualityReport {
                location: Location::new(27.4, 95.0),
                readings: WaterReadings::default(),
                collected_at: at,
                notes: None,
            }
            .into(),
            SymptomTrend {
                location: here,
                date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
                counts: SymptomCounts::default(),
            }
            .into(),
        ];
        for observation in &observations {
            db.insert_observation(observation).unwrap();
        }

        assert_eq!(db.incident_locations().unwrap(), vec![here]);
        assert_eq!(
            db.water_report_locations().unwrap(),
            vec![Location::new(27.4, 95.0)]
        );
        assert_eq!(db.symptom_trend_locations().unwrap(), vec![here]);
        let counts = db.query_observation_counts().unwrap();
        assert_eq!(
            (counts.incidents, counts.water_reports, counts.symptom_trends),
            (1, 1, 1)
        );
    }

    #[test]
    fn load_incidents_from_csv() {
        let db = Database::new().unwrap();
        let csv = "\
latitude,longitude,disease,occurred_at,details
26.18,91.75,Cholera,2024-07-01T08:00:00Z,Household cluster
26.75,94.22,Typhoid,2024-07-02 10:30:00,
";
        assert_eq!(db.load_incidents(csv).unwrap(), 2);

        let conn = db.conn.borrow();
        let details: Option<String> = conn
            .query_row(
                "SELECT details FROM incidents WHERE disease = 'Typhoid'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(details.is_none(), "Empty details should be NULL");
    }

    #[test]
    fn load_incidents_skips_invalid_rows() {
        let db = Database::new().unwrap();
        let csv = "\
latitude,longitude,disease,occurred_at,details
26.18,91.75,Cholera,2024-07-01T08:00:00Z,
abc,91.75,Cholera,2024-07-01T08:00:00Z,
26.18,91.75,Cholera,yesterday,
26.18,91.75,,2024-07-01T08:00:00Z,
";
        assert_eq!(db.load_incidents(csv).unwrap(), 1);
    }

    #[test]
    fn load_water_reports_keeps_missing_readings_null() {
        let db = Database::new().unwrap();
        let csv = "\
latitude,longitude,coliform_cfu,turbidity,dissolved_oxygen,ph,temperature,collected_at,notes
26.18,91.75,500,5,3,9.5,34,2024-07-01T06:00:00Z,
26.18,91.75,,2.5,,n/a,,2024-07-02T06:00:00Z,turbidity only
";
        assert_eq!(db.load_water_reports(csv).unwrap(), 2);

        let conn = db.conn.borrow();
        let (coliform, ph, notes): (Option<f64>, Option<f64>, Option<String>) = conn
            .query_row(
                "SELECT coliform_cfu, ph, notes FROM water_quality_reports WHERE turbidity = 2.5",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();
        assert!(coliform.is_none());
        assert!(ph.is_none(), "Non-numeric readings should be NULL");
        assert_eq!(notes.as_deref(), Some("turbidity only"));
    }

    #[test]
    fn load_symptom_trends_from_csv() {
        let db = Database::new().unwrap();
        let csv = "\
latitude,longitude,date,diarrhea,vomiting,dehydration,fever,abdominal_pain
26.18,91.75,2024-07-01,12,4,3,6,2
26.18,91.75,2024-07-02,5,,,1,
26.18,91.75,2024-07-03,-1,0,0,0,0
26.18,91.75,07/04/2024,1,0,0,0,0
";
        assert_eq!(db.load_symptom_trends(csv).unwrap(), 2);

        let conn = db.conn.borrow();
        let vomiting: i64 = conn
            .query_row(
                "SELECT vomiting_count FROM symptom_trends WHERE diarrhea_count = 5",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(vomiting, 0);
    }
}
