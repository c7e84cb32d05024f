//! Feature inspection, prediction runs and prediction listing.

use chrono::{DateTime, Utc};
use log::info;
use wbd_core::location::Location;
use wbd_core::prediction::OutbreakPrediction;
use wbd_db::Database;
use wbd_predict::artifact::JsonFileModelStore;
use wbd_predict::features::build_features;
use wbd_predict::heuristic::assess_heuristic;
use wbd_predict::orchestrator::{generate_predictions, PredictOptions};
use wbd_utils::dates;

/// Print the current feature record for one location, with its heuristic score.
pub fn run_features(db_path: &str, lat: f64, lng: f64, window_days: u32) -> anyhow::Result<()> {
    let db = Database::open(db_path)?;
    let features = build_features(&db, Location::new(lat, lng), window_days, Utc::now())?;
    let assessment = assess_heuristic(&features);
    println!("{}", serde_json::to_string_pretty(&features)?);
    println!(
        "{} score {:.3} ({}) [{}]",
        assessment.method, assessment.score, assessment.category, assessment.model_version
    );
    Ok(())
}

/// Score every known location and store one prediction each.
pub fn run_predict(db_path: &str, model_path: &str, options: PredictOptions) -> anyhow::Result<()> {
    let db = Database::open(db_path)?;
    let models = JsonFileModelStore::new(model_path);
    let created = generate_predictions(&db, &db, &models, &options, Utc::now())?;

    println!("Created {} predictions", created.len());
    for p in &created {
        println!(
            "  ({:.4}, {:.4}) {} {:.3} [{}]",
            p.latitude, p.longitude, p.risk_category, p.risk_score, p.model_version
        );
    }
    Ok(())
}

/// Print stored predictions for `today + days` as JSON.
pub fn run_list_predictions(db_path: &str, days: i64, limit: usize) -> anyhow::Result<()> {
    let db = Database::open(db_path)?;
    let predictions = predictions_for_offset(&db, days, limit, Utc::now())?;
    println!("{}", serde_json::to_string_pretty(&predictions)?);
    Ok(())
}

pub fn predictions_for_offset(
    db: &Database,
    days: i64,
    limit: usize,
    now: DateTime<Utc>,
) -> anyhow::Result<Vec<OutbreakPrediction>> {
    let target_date = dates::target_date(&now, days)?;
    info!(
        "Listing up to {} predictions for {}",
        limit,
        dates::format_date(&target_date)
    );
    db.query_predictions_for_target(target_date, limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use wbd_predict::artifact::MemoryModelStore;

    fn seeded(now: DateTime<Utc>) -> Database {
        let db = Database::new().unwrap();
        let csv = format!(
            "latitude,longitude,disease,occurred_at,details\n\
             26.18,91.75,Cholera,{},\n\
             26.18,91.75,Typhoid,{},\n\
             27.4,95.0,Cholera,{},\n",
            (now - Duration::days(1)).to_rfc3339(),
            (now - Duration::days(2)).to_rfc3339(),
            (now - Duration::days(20)).to_rfc3339(),
        );
        db.load_incidents(&csv).unwrap();
        db
    }

    #[test]
    fn listing_follows_the_day_offset() {
        let now = Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap();
        let db = seeded(now);
        generate_predictions(
            &db,
            &db,
            &MemoryModelStore::new(),
            &PredictOptions::default(),
            now,
        )
        .unwrap();

        let tomorrow = predictions_for_offset(&db, 1, 200, now).unwrap();
        assert_eq!(tomorrow.len(), 2);
        assert!(tomorrow[0].risk_score >= tomorrow[1].risk_score);
        assert_eq!(tomorrow[0].latitude, 26.18);

        assert!(predictions_for_offset(&db, 0, 200, now).unwrap().is_empty());
        assert_eq!(predictions_for_offset(&db, 1, 1, now).unwrap().len(), 1);
    }

    #[test]
    fn out_of_range_day_offset_is_an_error() {
        let now = Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap();
        let db = Database::new().unwrap();
        assert!(predictions_for_offset(&db, 200_000_000, 10, now).is_err());
        assert!(predictions_for_offset(&db, i64::MIN, 10, now).is_err());
    }

    #[test]
    fn predict_against_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("wbd.sqlite");
        let model_path = dir.path().join("models/logreg-model.json");
        {
            let db = Database::open(&db_path).unwrap();
            db.load_incidents(&format!(
                "latitude,longitude,disease,occurred_at,details\n26.18,91.75,Cholera,{},\n",
                Utc::now().to_rfc3339()
            ))
            .unwrap();
        }

        run_predict(
            db_path.to_str().unwrap(),
            model_path.to_str().unwrap(),
            PredictOptions::default(),
        )
        .unwrap();

        let db = Database::open(&db_path).unwrap();
        let stored = db.query_latest_predictions(10).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].model_version, "heuristic-fallback");
    }
}
