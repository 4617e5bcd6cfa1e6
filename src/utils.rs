use crate::types::Coords;
use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt};

#[macro_export]
macro_rules! dlog {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*);
    };
}

/// Initialize colorful logging.
///
/// Default level is INFO.
/// - `-v` => DEBUG
/// - `-vv` => TRACE
/// - `-q` => WARN
/// - `-qq` => ERROR
///
/// `RUST_LOG` overrides everything (e.g. `RUST_LOG=trace`).
pub fn init_logging(verbose: u8, quiet: u8) {
    let net = verbose as i8 - quiet as i8;
    let level = match net {
        i8::MIN..=-2 => "error",
        -1 => "warn",
        0 => "info",
        1 => "debug",
        2..=i8::MAX => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,kartenn={level}")));

    let show_src = matches!(level, "debug" | "trace");

    fmt()
        .with_env_filter(filter)
        .with_ansi(true)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_file(show_src)
        .with_line_number(show_src)
        .compact()
        .init();
}

/// Parse a `"LAT,LNG"` pair as given on the command line.
pub fn parse_coords(raw: &str) -> Result<Coords> {
    let (lat, lng) = raw
        .split_once(',')
        .with_context(|| format!("expected LAT,LNG, got: {raw}"))?;

    let lat: f64 = lat
        .trim()
        .parse()
        .with_context(|| format!("latitude is not a number: {lat}"))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .with_context(|| format!("longitude is not a number: {lng}"))?;

    Ok(Coords { lat, lng })
}
