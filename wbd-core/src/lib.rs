//! Core types for the outbreak risk engine.
//!
//! Observations (incidents, water-quality reports, symptom trends), the
//! derived per-location feature record, trained model artifacts, stored
//! predictions, and the storage traits the engine is written against.

pub mod features;
pub mod location;
pub mod model;
pub mod observation;
pub mod prediction;
pub mod store;
