use clap::{ArgAction, Parser};
use std::path::PathBuf;

const DEFAULT_DATA_FILE: &str = "kartenn.db";

#[derive(Parser, Debug)]
#[command(
    name = "kartenn",
    about = "Log outdoor runs and rides on a map, saved locally"
)]
pub struct Cli {
    /// SQLite file the workouts are saved in.
    ///
    /// Default: kartenn.db in the current directory
    #[arg(long, value_name = "FILE", default_value = DEFAULT_DATA_FILE)]
    pub data: PathBuf,

    /// Initial map position as "LAT,LNG" (stands in for a geolocation fix).
    /// Without it the session runs with an uncentered map.
    #[arg(long, value_name = "LAT,LNG")]
    pub start: Option<String>,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,
}
