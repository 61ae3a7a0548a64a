use super::{PersistenceError, PersistenceResult, TrackerSnapshot, TrackerStore};
use crate::calendar::WorkCalendarConfig;
use crate::tracker::{IdSequences, Tracker};
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::{Mutex, MutexGuard};

/// Stores each record as a JSON document keyed by its id, one table per kind.
pub struct SqliteTrackerStore {
    connection: Mutex<Connection>,
}

const RECORD_TABLES: [&str; 4] = ["renovations", "categories", "suppliers", "items"];

impl SqliteTrackerStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS tracker_settings (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                calendar_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS id_sequences (
                entity TEXT PRIMARY KEY,
                last_id INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS renovations (
                id INTEGER PRIMARY KEY,
                record_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY,
                record_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS suppliers (
                id INTEGER PRIMARY KEY,
                record_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS items (
                id INTEGER PRIMARY KEY,
                renovation_id INTEGER NOT NULL,
                record_json TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS items_by_renovation ON items (renovation_id);
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> PersistenceResult<MutexGuard<'_, Connection>> {
        self.connection.lock().map_err(|_| PersistenceError::Poisoned)
    }

    fn save_calendar(tx: &Transaction, calendar: &WorkCalendarConfig) -> PersistenceResult<()> {
        let json = serde_json::to_string(calendar)?;
        tx.execute("DELETE FROM tracker_settings", [])?;
        tx.execute(
            "INSERT INTO tracker_settings (id, calendar_json) VALUES (1, ?1)",
            params![json],
        )?;
        Ok(())
    }

    fn save_sequences(tx: &Transaction, sequences: &IdSequences) -> PersistenceResult<()> {
        tx.execute("DELETE FROM id_sequences", [])?;
        let mut stmt = tx.prepare("INSERT INTO id_sequences (entity, last_id) VALUES (?1, ?2)")?;
        for (entity, last_id) in [
            ("renovations", sequences.renovations),
            ("items", sequences.items),
            ("categories", sequences.categories),
            ("suppliers", sequences.suppliers),
        ] {
            stmt.execute(params![entity, last_id])?;
        }
        Ok(())
    }

    fn load_sequences(conn: &Connection) -> PersistenceResult<IdSequences> {
        let mut stmt = conn.prepare("SELECT entity, last_id FROM id_sequences")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;

        let mut sequences = IdSequences::default();
        for row in rows {
            let (entity, last_id) = row?;
            match entity.as_str() {
                "renovations" => sequences.renovations = last_id,
                "items" => sequences.items = last_id,
                "categories" => sequences.categories = last_id,
                "suppliers" => sequences.suppliers = last_id,
                other => tracing::warn!(entity = other, "ignoring unknown id sequence"),
            }
        }
        Ok(sequences)
    }

    fn save_records<T: Serialize>(
        tx: &Transaction,
        table: &str,
        records: impl Iterator<Item = (i64, T)>,
    ) -> PersistenceResult<()> {
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO {table} (id, record_json) VALUES (?1, ?2)"
        ))?;
        for (id, record) in records {
            let json = serde_json::to_string(&record)?;
            stmt.execute(params![id, json])?;
        }
        Ok(())
    }

    fn load_records<T: DeserializeOwned>(conn: &Connection, table: &str) -> PersistenceResult<Vec<T>> {
        let mut stmt = conn.prepare(&format!("SELECT record_json FROM {table} ORDER BY id ASC"))?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut records = Vec::new();
        for json in rows {
            records.push(serde_json::from_str(&json?)?);
        }
        Ok(records)
    }
}

impl TrackerStore for SqliteTrackerStore {
    fn save_tracker(&self, tracker: &Tracker) -> PersistenceResult<()> {
        let snapshot = TrackerSnapshot::from_tracker(tracker);
        snapshot.validate()?;

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        Self::save_calendar(&tx, &snapshot.calendar)?;
        Self::save_sequences(&tx, &snapshot.sequences)?;
        for table in RECORD_TABLES {
            tx.execute(&format!("DELETE FROM {table}"), [])?;
        }
        Self::save_records(&tx, "renovations", snapshot.renovations.iter().map(|r| (r.id, r)))?;
        Self::save_records(&tx, "categories", snapshot.categories.iter().map(|c| (c.id, c)))?;
        Self::save_records(&tx, "suppliers", snapshot.suppliers.iter().map(|s| (s.id, s)))?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO items (id, renovation_id, record_json) VALUES (?1, ?2, ?3)")?;
            for item in &snapshot.items {
                let json = serde_json::to_string(item)?;
                stmt.execute(params![item.id, item.renovation_id, json])?;
            }
        }
        tx.commit()?;
        tracing::debug!(
            renovations = snapshot.renovations.len(),
            items = snapshot.items.len(),
            "saved tracker to sqlite"
        );
        Ok(())
    }

    fn load_tracker(&self) -> PersistenceResult<Option<Tracker>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare("SELECT calendar_json FROM tracker_settings WHERE id = 1")?;
        let calendar_json: Option<String> = stmt.query_row([], |row| row.get(0)).optional()?;
        let Some(calendar_json) = calendar_json else {
            return Ok(None);
        };

        let snapshot = TrackerSnapshot {
            calendar: serde_json::from_str(&calendar_json)?,
            renovations: Self::load_records(&conn, "renovations")?,
            categories: Self::load_records(&conn, "categories")?,
            suppliers: Self::load_records(&conn, "suppliers")?,
            items: Self::load_records(&conn, "items")?,
            sequences: Self::load_sequences(&conn)?,
        };
        tracing::debug!(
            renovations = snapshot.renovations.len(),
            items = snapshot.items.len(),
            "loaded tracker from sqlite"
        );
        snapshot.into_tracker().map(Some)
    }
}
