//! Outbreak risk engine.
//!
//! Turns the observation history held behind an
//! [`ObservationStore`](wbd_core::store::ObservationStore) into per-location
//! risk scores:
//!
//! - [`features`] derives a [`LocationFeatures`](wbd_core::features::LocationFeatures)
//!   record per location over a lookback window.
//! - [`heuristic`] scores a record with fixed weights.
//! - [`train`] fits a logistic-regression model and persists it through a
//!   [`ModelStore`](wbd_core::model::ModelStore).
//! - [`scorer`] scores with the persisted model, falling back to the heuristic.
//! - [`orchestrator`] runs the whole pipeline for every known location and
//!   writes the predictions.

pub mod artifact;
pub mod error;
pub mod features;
pub mod heuristic;
pub mod orchestrator;
pub mod scorer;
pub mod train;

pub use error::PredictError;
