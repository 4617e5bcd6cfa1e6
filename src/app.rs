//! Lifecycle controller: owns the workout store and the editing session,
//! consumes surface events and sequences mutation, rendering and the
//! persistence write-through.

use crate::dlog;
use crate::persist::Persister;
use crate::render::{self, MAP_ZOOM_LEVEL};
use crate::store::{SortField, StoreError, WorkoutStore};
use crate::surfaces::{
    ConfirmPrompt, FormPrefill, FormSubmission, FormSurface, ListSurface, MapSurface,
};
use crate::types::{Coords, Workout, WorkoutKind};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must be a number")]
    NotANumber { field: &'static str },
    #[error("{field} must be positive")]
    NotPositive { field: &'static str },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What the host loop should do after an event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// Store and persisted state were wiped; rebuild the whole application
    /// from (empty) persisted state so nothing rendered can diverge.
    ReloadRequested,
}

#[derive(Debug, Clone)]
enum Mode {
    Idle,
    Creating { coords: Coords },
    Editing { id: String },
}

pub struct App {
    store: WorkoutStore,
    persister: Persister,
    mode: Mode,
    /// Kind whose specific field the form currently shows.
    form_kind: WorkoutKind,
    map: Box<dyn MapSurface>,
    form: Box<dyn FormSurface>,
    list: Box<dyn ListSurface>,
    confirm: Box<dyn ConfirmPrompt>,
}

impl App {
    /// Rehydrate the store from persistence and render the restored list.
    /// Markers wait for the initial position fix.
    pub fn new(
        persister: Persister,
        map: Box<dyn MapSurface>,
        form: Box<dyn FormSurface>,
        list: Box<dyn ListSurface>,
        confirm: Box<dyn ConfirmPrompt>,
    ) -> Self {
        let mut store = WorkoutStore::new();
        for w in persister.load() {
            store.push(w);
        }
        dlog!("restored workouts={}", store.len());

        let mut app = Self {
            store,
            persister,
            mode: Mode::Idle,
            form_kind: WorkoutKind::Running,
            map,
            form,
            list,
            confirm,
        };
        app.render_list();
        app.update_bulk_actions();
        app
    }

    pub fn store(&self) -> &WorkoutStore {
        &self.store
    }

    /// Initial geolocation fix: center the map and place a marker for every
    /// restored workout.
    pub fn on_initial_position(&mut self, coords: Coords) {
        self.map.center_on(coords, MAP_ZOOM_LEVEL);
        for w in self.store.iter() {
            self.map.render_marker(&render::marker_content(w));
        }
        self.update_bulk_actions();
        tracing::info!(lat = coords.lat, lng = coords.lng, "map initialized");
    }

    /// Geolocation denied or failed: the store and list stay fully usable,
    /// only map centering is skipped.
    pub fn on_position_unavailable(&mut self) {
        tracing::warn!("could not get a position fix; continuing without the map view");
    }

    pub fn on_map_click(&mut self, coords: Coords) {
        if !matches!(self.mode, Mode::Idle) {
            dlog!("map click ignored, form already open");
            return;
        }
        self.mode = Mode::Creating { coords };
        self.form.show();
    }

    pub fn on_edit_requested(&mut self, id: &str) -> Result<Outcome, AppError> {
        if !matches!(self.mode, Mode::Idle) {
            dlog!("edit request ignored, form already open id={id}");
            return Ok(Outcome::Done);
        }

        let Some(workout) = self.store.get(id) else {
            tracing::warn!(id, "edit requested for a workout that is gone");
            return Err(StoreError::NotFound { id: id.to_string() }.into());
        };

        let kind = workout.kind();
        let prefill = FormPrefill {
            kind,
            distance_km: workout.distance_km(),
            duration_min: workout.duration_min(),
            kind_specific: match kind {
                WorkoutKind::Running => workout.cadence_spm().unwrap_or(0.0),
                WorkoutKind::Cycling => workout.elevation_gain_m().unwrap_or(0.0),
            },
        };

        if kind != self.form_kind {
            self.form.set_kind_field_visible(kind);
            self.form_kind = kind;
        }
        self.form.prefill(&prefill);
        self.form.show();
        self.mode = Mode::Editing { id: id.to_string() };
        dlog!("editing id={id}");
        Ok(Outcome::Done)
    }

    pub fn on_submit(&mut self, submission: &FormSubmission) -> Result<Outcome, AppError> {
        match self.mode.clone() {
            Mode::Idle => {
                dlog!("submit with no open form");
                Ok(Outcome::Done)
            }
            Mode::Creating { coords } => self.finish_create(coords, submission),
            Mode::Editing { id } => self.finish_edit(&id, submission),
        }
    }

    /// Close the form without touching the store, from any state.
    pub fn cancel(&mut self) {
        if !matches!(self.mode, Mode::Idle) {
            dlog!("form cancelled");
        }
        self.mode = Mode::Idle;
        self.form.hide();
    }

    pub fn on_delete_requested(&mut self, id: &str) -> Result<Outcome, AppError> {
        if !self.confirm.ask("Delete this workout?") {
            dlog!("delete declined id={id}");
            return Ok(Outcome::Done);
        }

        match self.store.remove_by_id(id) {
            Ok(removed) => {
                self.list.remove_entry(id);
                self.render_list();
                self.persister.save(&self.store);
                self.update_bulk_actions();
                tracing::info!(id, kind = %removed.kind(), "workout deleted");
                Ok(Outcome::Done)
            }
            Err(e) => {
                tracing::warn!(id, "delete requested for a workout that is gone");
                Err(e.into())
            }
        }
    }

    pub fn on_delete_all(&mut self) -> Result<Outcome, AppError> {
        if !self.confirm.ask("Delete ALL workouts?") {
            dlog!("delete-all declined");
            return Ok(Outcome::Done);
        }

        let count = self.store.len();
        self.store.clear();
        self.persister.clear_saved();
        tracing::info!(count, "all workouts deleted, requesting reload");
        Ok(Outcome::ReloadRequested)
    }

    /// Re-render the list in the given order. Canonical store order and
    /// persisted state are untouched.
    pub fn on_sort(&mut self, field: SortField) {
        let view = self.store.sorted_view(field);
        let items: Vec<_> = view.iter().map(render::list_item).collect();
        self.list.render(&items);
        dlog!("list sorted by {field:?}");
    }

    pub fn on_entry_clicked(&mut self, id: &str) -> Result<Outcome, AppError> {
        let Some(workout) = self.store.get_mut(id) else {
            tracing::warn!(id, "clicked entry is gone from the store");
            return Err(StoreError::NotFound { id: id.to_string() }.into());
        };
        workout.record_interaction();
        let coords = workout.coords();
        self.map.center_on(coords, MAP_ZOOM_LEVEL);
        Ok(Outcome::Done)
    }

    pub fn render_list(&mut self) {
        let items: Vec<_> = self.store.iter().map(render::list_item).collect();
        self.list.render(&items);
    }

    fn finish_create(
        &mut self,
        coords: Coords,
        submission: &FormSubmission,
    ) -> Result<Outcome, AppError> {
        let fields = match validate(submission.kind, submission) {
            Ok(f) => f,
            Err(e) => {
                self.form.report_error(&e.to_string());
                return Err(e.into());
            }
        };

        let workout = build_workout(coords, submission.kind, &fields);
        tracing::info!(id = workout.id(), kind = %workout.kind(), "workout created");

        self.map.render_marker(&render::marker_content(&workout));
        self.store.push(workout);
        self.render_list();
        self.form.hide();
        self.mode = Mode::Idle;
        self.persister.save(&self.store);
        self.update_bulk_actions();
        Ok(Outcome::Done)
    }

    /// Edits keep the original kind and coordinates but mint a whole new
    /// workout, new id included; only the position in the store survives.
    fn finish_edit(&mut self, id: &str, submission: &FormSubmission) -> Result<Outcome, AppError> {
        let Some(original) = self.store.get(id) else {
            tracing::warn!(id, "editing target vanished from the store; aborting edit");
            self.form.hide();
            self.mode = Mode::Idle;
            return Err(StoreError::NotFound { id: id.to_string() }.into());
        };
        let kind = original.kind();
        let coords = original.coords();

        let fields = match validate(kind, submission) {
            Ok(f) => f,
            Err(e) => {
                self.form.report_error(&e.to_string());
                return Err(e.into());
            }
        };

        let replacement = build_workout(coords, kind, &fields);
        let new_id = replacement.id().to_string();
        if let Err(e) = self.store.replace_by_id(id, replacement) {
            tracing::warn!(id, "editing target vanished from the store; aborting edit");
            self.form.hide();
            self.mode = Mode::Idle;
            return Err(e.into());
        }

        self.list.remove_entry(id);
        self.render_list();
        self.form.hide();
        self.mode = Mode::Idle;
        self.persister.save(&self.store);
        tracing::info!(old_id = id, new_id = %new_id, "workout updated");
        Ok(Outcome::Done)
    }

    fn update_bulk_actions(&mut self) {
        self.list.set_bulk_actions_visible(!self.store.is_empty());
    }
}

struct NumericFields {
    distance_km: f64,
    duration_min: f64,
    kind_specific: f64,
}

/// Identical for create and edit. Distance, duration and the kind-specific
/// value must parse as finite numbers; distance and duration must be
/// strictly positive, cadence too. Elevation gain is only checked for being
/// a number (a ride can lose altitude overall).
fn validate(kind: WorkoutKind, s: &FormSubmission) -> Result<NumericFields, ValidationError> {
    let distance_km = parse_finite("distance", &s.distance_raw)?;
    let duration_min = parse_finite("duration", &s.duration_raw)?;
    let kind_specific = match kind {
        WorkoutKind::Running => parse_finite("cadence", &s.kind_specific_raw)?,
        WorkoutKind::Cycling => parse_finite("elevation gain", &s.kind_specific_raw)?,
    };

    require_positive("distance", distance_km)?;
    require_positive("duration", duration_min)?;
    if kind == WorkoutKind::Running {
        require_positive("cadence", kind_specific)?;
    }

    Ok(NumericFields { distance_km, duration_min, kind_specific })
}

fn parse_finite(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    let v: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::NotANumber { field })?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(ValidationError::NotANumber { field })
    }
}

fn require_positive(field: &'static str, v: f64) -> Result<(), ValidationError> {
    if v > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NotPositive { field })
    }
}

fn build_workout(coords: Coords, kind: WorkoutKind, f: &NumericFields) -> Workout {
    match kind {
        WorkoutKind::Running => {
            Workout::running(coords, f.distance_km, f.duration_min, f.kind_specific)
        }
        WorkoutKind::Cycling => {
            Workout::cycling(coords, f.distance_km, f.duration_min, f.kind_specific)
        }
    }
}
