//! SQL schema definitions for the observation and prediction tables.
//!
//! Timestamps are stored as Unix epoch milliseconds (INTEGER) so range
//! filters are plain integer comparisons. Symptom trend days are stored as
//! the millisecond timestamp of 00:00 UTC of that day; prediction target
//! dates as ISO `YYYY-MM-DD` text.

/// Returns the full SQL schema as a single batch string.
///
/// **Observation tables** (written by ingestion, read-only to the engine):
/// - `incidents` - Reported disease cases (lat/lng, disease, occurred_at, details)
/// - `water_quality_reports` - Water samples with nullable readings
/// - `symptom_trends` - Daily symptom counters per location
///
/// **Prediction table** (append-only, no uniqueness constraint):
/// - `outbreak_predictions` - One row per location per prediction run, with
///   the feature snapshot stored as JSON text
pub fn create_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS incidents (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL,
        disease TEXT NOT NULL,
        occurred_at INTEGER NOT NULL,
        details TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_incidents_location ON incidents(latitude, longitude);
    CREATE INDEX IF NOT EXISTS idx_incidents_occurred_at ON incidents(occurred_at);

    CREATE TABLE IF NOT EXISTS water_quality_reports (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL,
        coliform_cfu REAL,
        turbidity REAL,
        dissolved_oxygen REAL,
        ph REAL,
        temperature REAL,
        collected_at INTEGER NOT NULL,
        notes TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_water_location ON water_quality_reports(latitude, longitude);
    CREATE INDEX IF NOT EXISTS idx_water_collected_at ON water_quality_reports(collected_at);

    CREATE TABLE IF NOT EXISTS symptom_trends (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL,
        date INTEGER NOT NULL,
        diarrhea_count INTEGER NOT NULL DEFAULT 0,
        vomiting_count INTEGER NOT NULL DEFAULT 0,
        dehydration_count INTEGER NOT NULL DEFAULT 0,
        fever_count INTEGER NOT NULL DEFAULT 0,
        abdominal_pain_count INTEGER NOT NULL DEFAULT 0
    );
    CREATE INDEX IF NOT EXISTS idx_symptom_location ON symptom_trends(latitude, longitude);
    CREATE INDEX IF NOT EXISTS idx_symptom_date ON symptom_trends(date);

    CREATE TABLE IF NOT EXISTS outbreak_predictions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL,
        generated_at INTEGER NOT NULL,
        target_date TEXT NOT NULL,
        model_version TEXT NOT NULL,
        risk_score REAL NOT NULL,
        risk_category TEXT NOT NULL,
        features TEXT NOT NULL,
        explanation TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_predictions_target ON outbreak_predictions(target_date);
    CREATE INDEX IF NOT EXISTS idx_predictions_generated ON outbreak_predictions(generated_at);
    "#
}
