//! Load observation history from CSV files into the database.

use anyhow::Context;
use log::info;
use wbd_db::Database;

/// Rows accepted from each file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub incidents: usize,
    pub water_reports: usize,
    pub symptom_trends: usize,
}

/// Load whichever CSV files were given and print a summary.
pub fn run_load(
    db_path: &str,
    incidents_csv: Option<&str>,
    water_reports_csv: Option<&str>,
    symptom_trends_csv: Option<&str>,
) -> anyhow::Result<()> {
    if incidents_csv.is_none() && water_reports_csv.is_none() && symptom_trends_csv.is_none() {
        anyhow::bail!("nothing to load: pass --incidents, --water-reports or --symptom-trends");
    }
    let db = Database::open(db_path)?;
    let summary = load_files(&db, incidents_csv, water_reports_csv, symptom_trends_csv)?;
    let totals = db.query_observation_counts()?;

    println!(
        "Loaded {} incidents, {} water reports, {} symptom trends",
        summary.incidents, summary.water_reports, summary.symptom_trends
    );
    println!(
        "Database now holds {} incidents, {} water reports, {} symptom trends, {} predictions",
        totals.incidents, totals.water_reports, totals.symptom_trends, totals.predictions
    );
    Ok(())
}

pub fn load_files(
    db: &Database,
    incidents_csv: Option<&str>,
    water_reports_csv: Option<&str>,
    symptom_trends_csv: Option<&str>,
) -> anyhow::Result<LoadSummary> {
    let mut summary = LoadSummary::default();
    if let Some(path) = incidents_csv {
        info!("Loading incidents from {}", path);
        summary.incidents = db
            .load_incidents(&read(path)?)
            .with_context(|| format!("loading incidents from {}", path))?;
    }
    if let Some(path) = water_reports_csv {
        info!("Loading water reports from {}", path);
        summary.water_reports = db
            .load_water_reports(&read(path)?)
            .with_context(|| format!("loading water reports from {}", path))?;
    }
    if let Some(path) = symptom_trends_csv {
        info!("Loading symptom trends from {}", path);
        summary.symptom_trends = db
            .load_symptom_trends(&read(path)?)
            .with_context(|| format!("loading symptom trends from {}", path))?;
    }
    Ok(summary)
}

fn read(path: &str) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_each_given_file() {
        let dir = tempfile::tempdir().unwrap();
        let incidents = dir.path().join("incidents.csv");
        std::fs::write(
            &incidents,
            "latitude,longitude,disease,occurred_at,details\n\
             26.18,91.75,Cholera,2024-07-01T08:00:00Z,\n\
             bad,91.75,Cholera,2024-07-01T08:00:00Z,\n",
        )
        .unwrap();
        let trends = dir.path().join("trends.csv");
        std::fs::write(
            &trends,
            "latitude,longitude,date,diarrhea,vomiting,dehydration,fever,abdominal_pain\n\
             26.18,91.75,2024-07-01,12,4,3,6,2\n",
        )
        .unwrap();

        let db = Database::new().unwrap();
        let summary = load_files(
            &db,
            incidents.to_str(),
            None,
            trends.to_str(),
        )
        .unwrap();
        assert_eq!(
            summary,
            LoadSummary {
                incidents: 1,
                water_reports: 0,
                symptom_trends: 1,
            }
        );
    }

    #[test]
    fn missing_file_is_an_error_naming_the_path() {
        let db = Database::new().unwrap();
        let err = load_files(&db, Some("/nonexistent/incidents.csv"), None, None).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/incidents.csv"));
    }

    #[test]
    fn load_requires_at_least_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("wbd.sqlite");
        assert!(run_load(db_path.to_str().unwrap(), None, None, None).is_err());
    }
}
