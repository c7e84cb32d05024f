//! SQLite database layer for the outbreak risk engine.
//!
//! Holds the three observation kinds (incidents, water-quality reports,
//! symptom trends) and the append-only prediction log, and implements the
//! [`ObservationStore`](wbd_core::store::ObservationStore) and
//! [`PredictionSink`](wbd_core::store::PredictionSink) traits on top of them.
//!
//! # Usage
//!
//! ```rust
//! use wbd_db::Database;
//! use wbd_core::store::ObservationStore;
//!
//! let db = Database::new().unwrap();
//! db.load_incidents("latitude,longitude,disease,occurred_at,details\n26.18,91.75,Cholera,2024-07-01T08:00:00Z,\n").unwrap();
//! assert_eq!(db.incident_locations().unwrap().len(), 1);
//! ```
//!
//! # Tables
//!
//! See [`schema::create_schema`] for the full SQL schema.

pub mod schema;
mod loader;
mod queries;
pub mod models;

use rusqlite::Connection;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// SQLite database wrapping observation history and predictions.
///
/// Cheaply cloneable (via `Rc`); clones share one connection. Every engine
/// operation runs on a single thread, one location at a time.
#[derive(Clone)]
pub struct Database {
    conn: Rc<RefCell<Connection>>,
}

impl Database {
    /// Create a new in-memory database with the full schema applied.
    pub fn new() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    /// Open (or create) a database file and apply the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        log::info!("[WBD] db: opened {}", path.as_ref().display());
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> anyhow::Result<Self> {
        conn.execute_batch(schema::create_schema())?;
        Ok(Self {
            conn: Rc::new(RefCell::new(conn)),
        })
    }
}
