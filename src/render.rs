//! Pure translation from a [`Workout`] to the marker and list-entry shapes
//! the surfaces consume. Pace and speed are rounded to one decimal here,
//! for display only; stored values keep full precision.

use crate::types::{Coords, KindData, Workout, WorkoutKind};
use std::fmt;

pub const MAP_ZOOM_LEVEL: u8 = 13;

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerContent {
    pub coords: Coords,
    pub icon: &'static str,
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub id: String,
    pub title: String,
    pub kind: WorkoutKind,
    pub distance_km: f64,
    pub duration_min: f64,
    pub metric: KindMetric,
}

/// Kind-specific summary pair shown on a list entry.
#[derive(Debug, Clone, PartialEq)]
pub enum KindMetric {
    Running { pace_min_per_km: f64, cadence_spm: f64 },
    Cycling { speed_kmh: f64, elevation_gain_m: f64 },
}

pub fn kind_icon(kind: WorkoutKind) -> &'static str {
    match kind {
        WorkoutKind::Running => "🏃",
        WorkoutKind::Cycling => "🚴",
    }
}

pub fn marker_content(workout: &Workout) -> MarkerContent {
    let icon = kind_icon(workout.kind());
    MarkerContent {
        coords: workout.coords(),
        icon,
        caption: format!("{icon} {}", workout.description()),
    }
}

pub fn list_item(workout: &Workout) -> ListItem {
    let metric = match workout.kind_data() {
        KindData::Running { cadence_spm } => KindMetric::Running {
            pace_min_per_km: round1(workout.duration_min() / workout.distance_km()),
            cadence_spm,
        },
        KindData::Cycling { elevation_gain_m } => KindMetric::Cycling {
            speed_kmh: round1(workout.distance_km() / (workout.duration_min() / 60.0)),
            elevation_gain_m,
        },
    };

    ListItem {
        id: workout.id().to_string(),
        title: workout.description().to_string(),
        kind: workout.kind(),
        distance_km: workout.distance_km(),
        duration_min: workout.duration_min(),
        metric,
    }
}

impl fmt::Display for ListItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}] {} km | {} min",
            kind_icon(self.kind),
            self.title,
            self.id,
            self.distance_km,
            self.duration_min
        )?;
        match &self.metric {
            KindMetric::Running { pace_min_per_km, cadence_spm } => {
                write!(f, " | {pace_min_per_km:.1} min/km | {cadence_spm} spm")
            }
            KindMetric::Cycling { speed_kmh, elevation_gain_m } => {
                write!(f, " | {speed_kmh:.1} km/h | {elevation_gain_m} m")
            }
        }
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
