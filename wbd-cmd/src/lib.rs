//! Command implementations for the WBD CLI.
//!
//! Provides subcommands for loading observation history from CSV, inspecting
//! per-location features, training the risk model and running or listing
//! predictions.

use clap::{Args, Subcommand};
use wbd_predict::artifact::DEFAULT_MODEL_PATH;

pub mod load;
pub mod predict;
pub mod train;

/// SQLite file used when `--db` is not given.
pub const DEFAULT_DB_PATH: &str = "wbd.sqlite";

#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// SQLite database file (created on first use)
    #[arg(long, default_value = DEFAULT_DB_PATH)]
    pub db: String,
}

#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Trained model artifact (JSON)
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    pub model: String,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load observation CSV files into the database
    Load {
        #[command(flatten)]
        store: StoreArgs,

        /// Incidents CSV (latitude,longitude,disease,occurred_at,details)
        #[arg(short = 'i', long)]
        incidents: Option<String>,

        /// Water quality CSV (latitude,longitude,coliform_cfu,turbidity,dissolved_oxygen,ph,temperature,collected_at,notes)
        #[arg(short = 'w', long)]
        water_reports: Option<String>,

        /// Symptom trends CSV (latitude,longitude,date,diarrhea,vomiting,dehydration,fever,abdominal_pain)
        #[arg(short = 's', long)]
        symptom_trends: Option<String>,
    },

    /// Print the feature record for one location as JSON
    Features {
        #[command(flatten)]
        store: StoreArgs,

        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lng: f64,

        /// Lookback window in days
        #[arg(long, default_value_t = 14)]
        window_days: u32,
    },

    /// Train the logistic-regression model on the current history
    Train {
        #[command(flatten)]
        store: StoreArgs,

        #[command(flatten)]
        model: ModelArgs,

        #[arg(long, default_value_t = 14)]
        window_days: u32,

        #[arg(long, default_value_t = 400)]
        iterations: u32,

        #[arg(long, default_value_t = 0.05)]
        learning_rate: f64,

        /// Incidents this recent make a location a positive example
        #[arg(long, default_value_t = 24)]
        label_horizon_hours: u32,
    },

    /// Score every known location and store the predictions
    Predict {
        #[command(flatten)]
        store: StoreArgs,

        #[command(flatten)]
        model: ModelArgs,

        #[arg(long, default_value_t = 14)]
        window_days: u32,

        /// Predict for this many days after today
        #[arg(long, default_value_t = 1)]
        target_offset_days: i64,
    },

    /// List stored predictions for a target day, highest risk first
    Predictions {
        #[command(flatten)]
        store: StoreArgs,

        /// Target day as an offset from today
        #[arg(long, default_value_t = 1)]
        days: i64,

        #[arg(long, default_value_t = 200)]
        limit: usize,
    },
}

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Load {
            store,
            incidents,
            water_reports,
            symptom_trends,
        } => load::run_load(
            &store.db,
            incidents.as_deref(),
            water_reports.as_deref(),
            symptom_trends.as_deref(),
        ),
        Command::Features {
            store,
            lat,
            lng,
            window_days,
        } => predict::run_features(&store.db, lat, lng, window_days),
        Command::Train {
            store,
            model,
            window_days,
            iterations,
            learning_rate,
            label_horizon_hours,
        } => train::run_train(
            &store.db,
            &model.model,
            wbd_predict::train::TrainOptions {
                window_days,
                iterations,
                learning_rate,
                label_horizon_hours,
            },
        ),
        Command::Predict {
            store,
            model,
            window_days,
            target_offset_days,
        } => predict::run_predict(
            &store.db,
            &model.model,
            wbd_predict::orchestrator::PredictOptions {
                window_days,
                target_offset_days,
            },
        ),
        Command::Predictions { store, days, limit } => {
            predict::run_list_predictions(&store.db, days, limit)
        }
    }
}
