use crate::calendar::{WorkCalendar, WorkCalendarConfig};
use crate::error::TrackerError;
use crate::item::RenovationItem;
use crate::reference::{Category, Supplier};
use crate::renovation::Renovation;
use crate::tracker::{IdSequences, Tracker};
use polars::prelude::PolarsError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("dataframe conversion error: {0}")]
    DataFrame(#[from] PolarsError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Tracker(#[from] TrackerError),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("storage lock poisoned")]
    Poisoned,
    #[error("no tracker stored")]
    NotFound,
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Durable storage for a whole [`Tracker`].
pub trait TrackerStore {
    fn save_tracker(&self, tracker: &Tracker) -> PersistenceResult<()>;
    /// `Ok(None)` when nothing has been saved yet.
    fn load_tracker(&self) -> PersistenceResult<Option<Tracker>>;
}

/// Flat, serializable copy of every record a tracker holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerSnapshot {
    #[serde(default)]
    pub calendar: WorkCalendarConfig,
    #[serde(default)]
    pub renovations: Vec<Renovation>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub suppliers: Vec<Supplier>,
    #[serde(default)]
    pub items: Vec<RenovationItem>,
    #[serde(default)]
    pub sequences: IdSequences,
}

impl TrackerSnapshot {
    pub fn from_tracker(tracker: &Tracker) -> Self {
        let mut renovations: Vec<Renovation> =
            tracker.renovations().into_iter().cloned().collect();
        renovations.sort_by_key(|r| r.id);
        let mut categories: Vec<Category> = tracker.categories().into_iter().cloned().collect();
        categories.sort_by_key(|c| c.id);
        let mut suppliers: Vec<Supplier> = tracker.suppliers().into_iter().cloned().collect();
        suppliers.sort_by_key(|s| s.id);

        Self {
            calendar: tracker.calendar_config(),
            renovations,
            categories,
            suppliers,
            items: tracker.all_items().cloned().collect(),
            sequences: tracker.id_sequences(),
        }
    }

    pub fn into_tracker(self) -> PersistenceResult<Tracker> {
        self.validate()?;
        Ok(Tracker::from_parts(
            self.renovations,
            self.items,
            self.categories,
            self.suppliers,
            WorkCalendar::from_config(&self.calendar),
            self.sequences,
        ))
    }

    /// Rejects duplicate ids, orphaned items and invalid amounts.
    pub fn validate(&self) -> PersistenceResult<()> {
        ensure_unique("renovation", self.renovations.iter().map(|r| r.id))?;
        ensure_unique("category", self.categories.iter().map(|c| c.id))?;
        ensure_unique("supplier", self.suppliers.iter().map(|s| s.id))?;
        ensure_unique("item", self.items.iter().map(|i| i.id))?;

        let renovation_ids: HashSet<i64> = self.renovations.iter().map(|r| r.id).collect();
        for item in &self.items {
            if !renovation_ids.contains(&item.renovation_id) {
                return Err(PersistenceError::InvalidData(format!(
                    "item {} references missing renovation {}",
                    item.id, item.renovation_id
                )));
            }
            for (field, value) in [
                ("budget", item.budget),
                ("estimated_price", item.estimated_price),
                ("paid_value", item.paid_value),
            ] {
                if !value.is_finite() || value < 0.0 {
                    return Err(PersistenceError::InvalidData(format!(
                        "item {} has invalid {field} {value}",
                        item.id
                    )));
                }
            }
        }
        Ok(())
    }
}

fn ensure_unique(entity: &str, ids: impl Iterator<Item = i64>) -> PersistenceResult<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(PersistenceError::InvalidData(format!(
                "duplicate {entity} id {id}"
            )));
        }
    }
    Ok(())
}

#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod file;
pub mod yaml;

pub use file::{
    export_items_to_csv, import_items_from_csv, load_tracker_from_json, read_items_csv,
    save_tracker_to_json, write_items_csv,
};
pub use yaml::{export_items_to_yaml, import_items_from_yaml, items_from_yaml, items_to_yaml};
