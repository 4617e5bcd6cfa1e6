//! Contracts for the external collaborators: map, form, list, confirmation
//! prompt and the key-value persistence service. The host application
//! implements these and feeds the resulting events into [`crate::app::App`].

use crate::render::{ListItem, MarkerContent};
use crate::types::{Coords, WorkoutKind};
use anyhow::Result;

/// One submit event from the form surface, fields as the user typed them.
/// `kind_specific_raw` is cadence for Running, elevation gain for Cycling.
#[derive(Debug, Clone)]
pub struct FormSubmission {
    pub kind: WorkoutKind,
    pub distance_raw: String,
    pub duration_raw: String,
    pub kind_specific_raw: String,
}

/// Values pushed into the form when an edit session opens.
#[derive(Debug, Clone, PartialEq)]
pub struct FormPrefill {
    pub kind: WorkoutKind,
    pub distance_km: f64,
    pub duration_min: f64,
    pub kind_specific: f64,
}

pub trait MapSurface {
    fn render_marker(&mut self, content: &MarkerContent);
    fn center_on(&mut self, coords: Coords, zoom: u8);
}

pub trait FormSurface {
    fn show(&mut self);
    fn hide(&mut self);
    fn prefill(&mut self, fields: &FormPrefill);
    /// Switch the kind-specific input between cadence and elevation.
    fn set_kind_field_visible(&mut self, kind: WorkoutKind);
    fn report_error(&mut self, message: &str);
}

pub trait ListSurface {
    fn render(&mut self, items: &[ListItem]);
    fn remove_entry(&mut self, id: &str);
    /// Bulk-action affordances (delete-all, sort) only make sense with a
    /// non-empty list.
    fn set_bulk_actions_visible(&mut self, visible: bool);
}

pub trait ConfirmPrompt {
    fn ask(&mut self, message: &str) -> bool;
}

/// Synchronous string key-value persistence. Failures are surfaced so the
/// caller can log and degrade; they never abort the session.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}
