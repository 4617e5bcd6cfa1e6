#![deny(
    warnings,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::Result;
use clap::Parser;
use kartenn::app::{App, Outcome};
use kartenn::persist::{Persister, SqliteKv};
use kartenn::store::SortField;
use kartenn::surfaces::FormSubmission;
use kartenn::terminal::{TerminalConfirm, TerminalForm, TerminalList, TerminalMap};
use kartenn::types::{Coords, WorkoutKind};
use kartenn::{cli, utils};
use std::io;
use std::path::Path;

#[macro_use]
extern crate kartenn;

enum LoopAction {
    Continue,
    Reload,
    Quit,
}

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);

    let start = cli.start.as_deref().map(utils::parse_coords).transpose()?;
    dlog!(
        "data={} start={:?}",
        cli.data.display(),
        start.map(|c| (c.lat, c.lng))
    );

    let mut app = build_app(&cli.data)?;
    apply_position(&mut app, start);

    println!("kartenn ready. Type 'help' for commands.");

    let mut line = String::new();
    loop {
        line.clear();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        match dispatch(&mut app, line.trim()) {
            LoopAction::Continue => {}
            LoopAction::Reload => {
                app = build_app(&cli.data)?;
                apply_position(&mut app, start);
            }
            LoopAction::Quit => break,
        }
    }

    Ok(())
}

fn build_app(data: &Path) -> Result<App> {
    let kv = SqliteKv::open(data)?;
    Ok(App::new(
        Persister::new(Box::new(kv)),
        Box::new(TerminalMap),
        Box::new(TerminalForm),
        Box::new(TerminalList::default()),
        Box::new(TerminalConfirm),
    ))
}

fn apply_position(app: &mut App, start: Option<Coords>) {
    match start {
        Some(coords) => app.on_initial_position(coords),
        None => app.on_position_unavailable(),
    }
}

fn dispatch(app: &mut App, line: &str) -> LoopAction {
    let mut parts = line.split_whitespace();
    let Some(cmd) = parts.next() else {
        return LoopAction::Continue;
    };
    let args: Vec<&str> = parts.collect();

    match (cmd, args.as_slice()) {
        ("click", [lat, lng]) => match (lat.parse::<f64>(), lng.parse::<f64>()) {
            (Ok(lat), Ok(lng)) => app.on_map_click(Coords { lat, lng }),
            _ => println!("usage: click <lat> <lng>"),
        },
        ("submit", [kind, distance, duration, extra]) => match kind.parse::<WorkoutKind>() {
            Ok(kind) => {
                let submission = FormSubmission {
                    kind,
                    distance_raw: (*distance).to_string(),
                    duration_raw: (*duration).to_string(),
                    kind_specific_raw: (*extra).to_string(),
                };
                // Validation errors were already reported through the form.
                if let Err(e) = app.on_submit(&submission) {
                    dlog!("submit rejected: {e}");
                }
            }
            Err(e) => println!("{e}"),
        },
        ("edit", [id]) => {
            if let Err(e) = app.on_edit_requested(id) {
                println!("{e}");
            }
        }
        ("open", [id]) => {
            if let Err(e) = app.on_entry_clicked(id) {
                println!("{e}");
            }
        }
        ("delete", [id]) => {
            if let Err(e) = app.on_delete_requested(id) {
                println!("{e}");
            }
        }
        ("clear", []) => match app.on_delete_all() {
            Ok(Outcome::ReloadRequested) => return LoopAction::Reload,
            Ok(Outcome::Done) => {}
            Err(e) => println!("{e}"),
        },
        ("sort", [field]) => match field.parse::<SortField>() {
            Ok(field) => app.on_sort(field),
            Err(e) => println!("{e}"),
        },
        ("list", []) => app.render_list(),
        ("cancel", []) => app.cancel(),
        ("help", []) => print_help(),
        ("quit" | "exit", []) => return LoopAction::Quit,
        _ => println!("unknown command, type 'help'"),
    }

    LoopAction::Continue
}

fn print_help() {
    println!(
        "\
commands:
  click <lat> <lng>                       open the form for a workout at that spot
  submit <running|cycling> <km> <min> <x> submit the form (x: cadence spm or elevation m)
  edit <id>                               open the form prefilled with a workout
  open <id>                               center the map on a workout
  delete <id>                             delete one workout (asks first)
  clear                                   delete all workouts (asks first)
  sort <distance|duration|pace|speed>     show the list sorted by a field
  list                                    show the list in creation order
  cancel                                  close the form
  quit                                    leave"
    );
}
