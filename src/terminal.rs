//! Terminal implementations of the surfaces: markers and list entries go to
//! stdout, confirmations come from stdin. This is the thinnest host that
//! can drive the controller end to end.

use crate::render::{ListItem, MarkerContent};
use crate::surfaces::{ConfirmPrompt, FormPrefill, FormSurface, ListSurface, MapSurface};
use crate::types::{Coords, WorkoutKind};
use std::io::{self, Write};

pub struct TerminalMap;

impl MapSurface for TerminalMap {
    fn render_marker(&mut self, content: &MarkerContent) {
        println!(
            "📍 ({:.4}, {:.4}) {}",
            content.coords.lat, content.coords.lng, content.caption
        );
    }

    fn center_on(&mut self, coords: Coords, zoom: u8) {
        println!("🗺  map centered on ({:.4}, {:.4}) zoom {zoom}", coords.lat, coords.lng);
    }
}

pub struct TerminalForm;

impl FormSurface for TerminalForm {
    fn show(&mut self) {
        println!("form open: submit <running|cycling> <distance-km> <duration-min> <cadence|elevation>");
    }

    fn hide(&mut self) {}

    fn prefill(&mut self, fields: &FormPrefill) {
        let extra = match fields.kind {
            WorkoutKind::Running => "cadence",
            WorkoutKind::Cycling => "elevation",
        };
        println!(
            "current values: distance {} km, duration {} min, {extra} {}",
            fields.distance_km, fields.duration_min, fields.kind_specific
        );
    }

    fn set_kind_field_visible(&mut self, kind: WorkoutKind) {
        let label = match kind {
            WorkoutKind::Running => "cadence (spm)",
            WorkoutKind::Cycling => "elevation gain (m)",
        };
        println!("form now asks for {label}");
    }

    fn report_error(&mut self, message: &str) {
        println!("✗ {message}");
    }
}

#[derive(Default)]
pub struct TerminalList {
    bulk_visible: bool,
}

impl ListSurface for TerminalList {
    fn render(&mut self, items: &[ListItem]) {
        if items.is_empty() {
            println!("no workouts yet");
            return;
        }
        for (i, item) in items.iter().enumerate() {
            println!("{}\t{item}", i + 1);
        }
    }

    fn remove_entry(&mut self, _id: &str) {
        // The list is reprinted in full on the next render.
    }

    fn set_bulk_actions_visible(&mut self, visible: bool) {
        if visible && !self.bulk_visible {
            println!("(bulk commands available: sort <field>, clear)");
        }
        self.bulk_visible = visible;
    }
}

pub struct TerminalConfirm;

impl ConfirmPrompt for TerminalConfirm {
    fn ask(&mut self, message: &str) -> bool {
        print!("{message} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut line = String::new();
        if io::stdin().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim(), "y" | "Y" | "yes" | "Yes")
    }
}
