//! Write-through persistence of the workout collection. The whole canonical
//! sequence is serialized as one JSON payload under a fixed key after every
//! mutation; load rebuilds typed workouts through the model constructors so
//! derived fields are never trusted from storage.

use crate::dlog;
use crate::store::WorkoutStore;
use crate::surfaces::KeyValueStore;
use crate::types::{Coords, KindData, Workout};
use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

pub const STORAGE_KEY: &str = "workouts";

/// Persisted record: primary fields only, kind-tagged.
#[derive(Debug, Serialize, Deserialize)]
struct StoredWorkout {
    id: String,
    created_at_ms: i64,
    coords: Coords,
    distance_km: f64,
    duration_min: f64,
    #[serde(flatten)]
    kind: StoredKind,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum StoredKind {
    Running { cadence_spm: f64 },
    Cycling { elevation_gain_m: f64 },
}

pub struct Persister {
    kv: Box<dyn KeyValueStore>,
}

impl Persister {
    pub fn new(kv: Box<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Serialize the full canonical sequence. A failed write is logged and
    /// otherwise ignored; the in-memory state stays authoritative for the
    /// session.
    pub fn save(&mut self, store: &WorkoutStore) {
        let records: Vec<StoredWorkout> = store.iter().map(to_record).collect();

        let payload = match serde_json::to_string(&records) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(err = %e, "could not serialize workouts; skipping save");
                return;
            }
        };

        if let Err(e) = self.kv.set(STORAGE_KEY, &payload) {
            tracing::warn!(err = %e, "could not write workouts to storage");
        } else {
            dlog!("saved workouts={}", records.len());
        }
    }

    /// Read back the saved sequence. An absent key, an unreadable backend or
    /// a malformed payload all yield an empty collection, never an error.
    pub fn load(&self) -> Vec<Workout> {
        let payload = match self.kv.get(STORAGE_KEY) {
            Ok(Some(p)) => p,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(err = %e, "could not read saved workouts; starting empty");
                return Vec::new();
            }
        };

        let records: Vec<StoredWorkout> = match serde_json::from_str(&payload) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(err = %e, "saved workouts are corrupt; discarding them");
                return Vec::new();
            }
        };

        let mut out = Vec::with_capacity(records.len());
        for r in records {
            let Some(created_at) = Utc.timestamp_millis_opt(r.created_at_ms).single() else {
                dlog!("bad created_at_ms={} id={}", r.created_at_ms, r.id);
                continue;
            };

            let kind = match r.kind {
                StoredKind::Running { cadence_spm } => KindData::Running { cadence_spm },
                StoredKind::Cycling { elevation_gain_m } => {
                    KindData::Cycling { elevation_gain_m }
                }
            };

            out.push(Workout::rebuild(
                r.id,
                created_at,
                r.coords,
                r.distance_km,
                r.duration_min,
                kind,
            ));
        }

        out
    }

    pub fn clear_saved(&mut self) {
        if let Err(e) = self.kv.remove(STORAGE_KEY) {
            tracing::warn!(err = %e, "could not clear saved workouts");
        }
    }
}

fn to_record(w: &Workout) -> StoredWorkout {
    let kind = match w.kind_data() {
        KindData::Running { cadence_spm } => StoredKind::Running { cadence_spm },
        KindData::Cycling { elevation_gain_m } => StoredKind::Cycling { elevation_gain_m },
    };

    StoredWorkout {
        id: w.id().to_string(),
        created_at_ms: w.created_at().timestamp_millis(),
        coords: w.coords(),
        distance_km: w.distance_km(),
        duration_min: w.duration_min(),
        kind,
    }
}

/// SQLite-backed key-value store, one `kv` table in a local file.
pub struct SqliteKv {
    conn: Connection,
}

impl SqliteKv {
    pub fn open(path: &Path) -> Result<Self> {
        let display = path.display();
        let conn =
            Connection::open(path).with_context(|| format!("opening data file: {display}"))?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
            [],
        )
        .with_context(|| format!("initializing data file: {display}"))?;

        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let mut rows = stmt.query([key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(())
    }
}

/// In-memory backend. Cloning shares the underlying map, which lets a test
/// inspect what the controller persisted.
#[derive(Debug, Default, Clone)]
pub struct MemoryKv {
    data: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.data.borrow().get(key).cloned()
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.data
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.data.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coords;

    fn coords() -> Coords {
        Coords { lat: 39.0, lng: -12.0 }
    }

    fn mixed_store() -> WorkoutStore {
        let mut store = WorkoutStore::new();
        store.push(Workout::running(coords(), 5.2, 24.0, 178.0));
        store.push(Workout::cycling(coords(), 27.0, 95.0, 523.0));
        store.push(Workout::running(coords(), 10.0, 55.0, 165.0));
        store
    }

    #[test]
    fn save_then_load_round_trips_a_mixed_store() {
        let kv = MemoryKv::new();
        let mut persister = Persister::new(Box::new(kv));

        let store = mixed_store();
        persister.save(&store);

        let loaded = persister.load();
        assert_eq!(loaded.len(), 3);
        for (orig, back) in store.iter().zip(&loaded) {
            assert_eq!(back.id(), orig.id());
            assert_eq!(back.coords(), orig.coords());
            assert_eq!(back.distance_km(), orig.distance_km());
            assert_eq!(back.duration_min(), orig.duration_min());
            assert_eq!(back.kind(), orig.kind());
            assert_eq!(back.description(), orig.description());
        }
        // Derived metrics come back recomputed, kind-typed.
        assert!((loaded[0].pace_min_per_km().unwrap() - 24.0 / 5.2).abs() < f64::EPSILON);
        assert!((loaded[1].speed_kmh().unwrap() - 27.0 / (95.0 / 60.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn absent_key_loads_empty() {
        let persister = Persister::new(Box::new(MemoryKv::new()));
        assert!(persister.load().is_empty());
    }

    #[test]
    fn corrupt_payload_loads_empty() {
        let mut kv = MemoryKv::new();
        kv.set(STORAGE_KEY, "{not json at all").unwrap();
        let persister = Persister::new(Box::new(kv));
        assert!(persister.load().is_empty());
    }

    #[test]
    fn clear_saved_makes_next_load_empty() {
        let kv = MemoryKv::new();
        let mut persister = Persister::new(Box::new(kv.clone()));

        persister.save(&mixed_store());
        assert!(kv.raw(STORAGE_KEY).is_some());

        persister.clear_saved();
        assert!(kv.raw(STORAGE_KEY).is_none());
        assert!(persister.load().is_empty());
    }

    #[test]
    fn payload_has_no_derived_fields() {
        let kv = MemoryKv::new();
        let mut persister = Persister::new(Box::new(kv.clone()));
        persister.save(&mixed_store());

        let payload = kv.raw(STORAGE_KEY).unwrap();
        assert!(payload.contains("\"kind\":\"running\""));
        assert!(payload.contains("cadence_spm"));
        assert!(payload.contains("elevation_gain_m"));
        assert!(!payload.contains("pace"));
        assert!(!payload.contains("speed"));
        assert!(!payload.contains("description"));
    }

    #[test]
    fn sqlite_kv_round_trips_and_removes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kartenn.db");

        let mut kv = SqliteKv::open(&path).unwrap();
        assert!(kv.get("workouts").unwrap().is_none());

        kv.set("workouts", "[1, 2]").unwrap();
        kv.set("workouts", "[3]").unwrap();
        assert_eq!(kv.get("workouts").unwrap().as_deref(), Some("[3]"));

        kv.remove("workouts").unwrap();
        assert!(kv.get("workouts").unwrap().is_none());

        // Values survive reopening the file.
        kv.set("workouts", "[]").unwrap();
        drop(kv);
        let kv = SqliteKv::open(&path).unwrap();
        assert_eq!(kv.get("workouts").unwrap().as_deref(), Some("[]"));
    }
}
