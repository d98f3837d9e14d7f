use serde_json::Value;
use std::fs;
use std::path::PathBuf;

use super::RecordSource;
use crate::error::{FactureError, Result};
use crate::records::Collection;

/// Listings exported to `<dir>/{bills,residents,consumptions,houses}.json`.
///
/// Files hold the raw API bodies, so the same envelopes are accepted.
/// A missing `houses.json` reads as an empty listing.
pub struct SnapshotSource {
    dir: PathBuf,
}

impl SnapshotSource {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl RecordSource for SnapshotSource {
    fn describe(&self) -> String {
        format!("snapshot {}", self.dir.display())
    }

    fn fetch(&self, collection: Collection) -> Result<Value> {
        let path = self.dir.join(format!("{}.json", collection.name()));
        if !path.exists() {
            if collection == Collection::Houses {
                return Ok(Value::Array(Vec::new()));
            }
            return Err(FactureError::SnapshotFileNotFound(path));
        }

        tracing::debug!(path = %path.display(), "reading snapshot");
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|e| FactureError::Json {
            what: path.display().to_string(),
            source: e,
        })
    }
}
