//! Train the risk model from the database and write the artifact.

use chrono::Utc;
use log::info;
use wbd_db::Database;
use wbd_predict::artifact::JsonFileModelStore;
use wbd_predict::train::{train, TrainOptions};

pub fn run_train(db_path: &str, model_path: &str, options: TrainOptions) -> anyhow::Result<()> {
    let db = Database::open(db_path)?;
    let models = JsonFileModelStore::new(model_path);
    info!("Training with {:?}", options);

    let model = train(&db, &models, &options, Utc::now())?;

    println!("Training complete");
    println!("  model:      {}", model.model_version);
    println!("  artifact:   {}", models.path().display());
    println!("  iterations: {}", model.iterations);
    match model.loss_history.last() {
        Some(loss) => println!("  final loss: {:.6}", loss),
        None => println!("  final loss: n/a"),
    }
    Ok(())
}
