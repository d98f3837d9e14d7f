mod client;
mod snapshot;

pub use client::ApiClient;
pub use snapshot::SnapshotSource;

use serde_json::Value;

use crate::error::Result;
use crate::records::{parse_collection, Bill, Collection, Consumption, House, Resident};

/// Where listings come from: the live back-office API or a JSON export on disk
pub trait RecordSource {
    /// Human-readable origin, for status output and logs
    fn describe(&self) -> String;

    /// Raw JSON body of one listing, envelope included
    fn fetch(&self, collection: Collection) -> Result<Value>;

    fn bills(&self) -> Result<Vec<Bill>> {
        Ok(parse_collection(&self.fetch(Collection::Bills)?, Collection::Bills))
    }

    fn residents(&self) -> Result<Vec<Resident>> {
        Ok(parse_collection(
            &self.fetch(Collection::Residents)?,
            Collection::Residents,
        ))
    }

    fn consumptions(&self) -> Result<Vec<Consumption>> {
        Ok(parse_collection(
            &self.fetch(Collection::Consumptions)?,
            Collection::Consumptions,
        ))
    }

    fn houses(&self) -> Result<Vec<House>> {
        Ok(parse_collection(&self.fetch(Collection::Houses)?, Collection::Houses))
    }
}
