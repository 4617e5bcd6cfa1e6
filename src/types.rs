use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

/// Map position of a workout, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

/// The closed set of workout categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutKind {
    Running,
    Cycling,
}

impl fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkoutKind::Running => write!(f, "Running"),
            WorkoutKind::Cycling => write!(f, "Cycling"),
        }
    }
}

impl FromStr for WorkoutKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(WorkoutKind::Running),
            "cycling" => Ok(WorkoutKind::Cycling),
            _ => Err(format!("unknown workout kind: {s}")),
        }
    }
}

/// Kind-specific payload of a workout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KindData {
    Running { cadence_spm: f64 },
    Cycling { elevation_gain_m: f64 },
}

/// One logged exercise session. Immutable after construction except for the
/// marker interaction counter; editing replaces the whole value.
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    id: String,
    created_at: DateTime<Utc>,
    coords: Coords,
    distance_km: f64,
    duration_min: f64,
    kind: KindData,
    description: String,
    clicks: u32,
}

impl Workout {
    pub fn running(coords: Coords, distance_km: f64, duration_min: f64, cadence_spm: f64) -> Self {
        let now = Utc::now();
        Self::build(
            mint_id(now.timestamp_millis()),
            now,
            coords,
            distance_km,
            duration_min,
            KindData::Running { cadence_spm },
        )
    }

    pub fn cycling(
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        elevation_gain_m: f64,
    ) -> Self {
        let now = Utc::now();
        Self::build(
            mint_id(now.timestamp_millis()),
            now,
            coords,
            distance_km,
            duration_min,
            KindData::Cycling { elevation_gain_m },
        )
    }

    /// Reconstruct a stored workout with its original id and creation date.
    /// Description, pace and speed are always recomputed from the primary
    /// fields; nothing derived is taken on faith from storage.
    pub fn rebuild(
        id: String,
        created_at: DateTime<Utc>,
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        kind: KindData,
    ) -> Self {
        Self::build(id, created_at, coords, distance_km, duration_min, kind)
    }

    fn build(
        id: String,
        created_at: DateTime<Utc>,
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        kind: KindData,
    ) -> Self {
        let kind_name = match kind {
            KindData::Running { .. } => WorkoutKind::Running,
            KindData::Cycling { .. } => WorkoutKind::Cycling,
        };
        let description = format!("{kind_name} on {}", created_at.format("%B %-d"));

        Self {
            id,
            created_at,
            coords,
            distance_km,
            duration_min,
            kind,
            description,
            clicks: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn coords(&self) -> Coords {
        self.coords
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn duration_min(&self) -> f64 {
        self.duration_min
    }

    pub fn kind(&self) -> WorkoutKind {
        match self.kind {
            KindData::Running { .. } => WorkoutKind::Running,
            KindData::Cycling { .. } => WorkoutKind::Cycling,
        }
    }

    pub fn kind_data(&self) -> KindData {
        self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn cadence_spm(&self) -> Option<f64> {
        match self.kind {
            KindData::Running { cadence_spm } => Some(cadence_spm),
            KindData::Cycling { .. } => None,
        }
    }

    pub fn elevation_gain_m(&self) -> Option<f64> {
        match self.kind {
            KindData::Cycling { elevation_gain_m } => Some(elevation_gain_m),
            KindData::Running { .. } => None,
        }
    }

    /// min/km, Running only.
    pub fn pace_min_per_km(&self) -> Option<f64> {
        match self.kind {
            KindData::Running { .. } => Some(self.duration_min / self.distance_km),
            KindData::Cycling { .. } => None,
        }
    }

    /// km/h, Cycling only.
    pub fn speed_kmh(&self) -> Option<f64> {
        match self.kind {
            KindData::Cycling { .. } => Some(self.distance_km / (self.duration_min / 60.0)),
            KindData::Running { .. } => None,
        }
    }

    pub fn interaction_count(&self) -> u32 {
        self.clicks
    }

    pub fn record_interaction(&mut self) {
        self.clicks += 1;
    }
}

static LAST_ID_MS: AtomicI64 = AtomicI64::new(0);

/// Mint an opaque id from the millisecond clock, strictly increasing per
/// process so same-millisecond creations stay unique.
fn mint_id(now_ms: i64) -> String {
    let prev = LAST_ID_MS
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |last| {
            Some(last.max(now_ms - 1) + 1)
        })
        .unwrap_or(now_ms - 1);
    let ms = prev.max(now_ms - 1) + 1;

    format!("{:010}", ms.rem_euclid(10_000_000_000))
}
