//! Model artifact persistence.
//!
//! Only one model is live at a time, stored under a fixed well-known name.
//! The on-disk form is pretty-printed JSON whose shape is checked strictly on
//! read: a file that does not parse into a [`TrainedModel`] is treated the
//! same as a missing one.

use anyhow::Context;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use wbd_core::model::{ModelStore, TrainedModel};

/// Well-known artifact location, relative to the working directory.
pub const DEFAULT_MODEL_PATH: &str = "models/logreg-model.json";

/// JSON file holding the live model.
#[derive(Debug, Clone)]
pub struct JsonFileModelStore {
    path: PathBuf,
}

impl JsonFileModelStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Default for JsonFileModelStore {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_PATH)
    }
}

impl ModelStore for JsonFileModelStore {
    fn load_model(&self) -> anyhow::Result<Option<TrainedModel>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()))
            }
        };
        match serde_json::from_str::<TrainedModel>(&raw) {
            Ok(model) => Ok(Some(model)),
            Err(e) => {
                log::warn!(
                    "[WBD] artifact: {} is not a valid model: {}",
                    self.path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    /// Write to a sibling temp file, then rename over the artifact, so an
    /// interrupted save leaves the previous model in place.
    fn save_model(&self, model: &TrainedModel) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(model)?;
        let tmp = self.temp_path();
        std::fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        log::info!(
            "[WBD] artifact: saved model {} to {}",
            model.model_version,
            self.path.display()
        );
        Ok(())
    }
}

/// In-process model slot.
#[derive(Debug, Default)]
pub struct MemoryModelStore {
    slot: RefCell<Option<TrainedModel>>,
}

impl MemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(model: TrainedModel) -> Self {
        Self {
            slot: RefCell::new(Some(model)),
        }
    }
}

impl ModelStore for MemoryModelStore {
    fn load_model(&self) -> anyhow::Result<Option<TrainedModel>> {
        Ok(self.slot.borrow().clone())
    }

    fn save_model(&self, model: &TrainedModel) -> anyhow::Result<()> {
        *self.slot.borrow_mut() = Some(model.clone());
        Ok(())
    }
}
