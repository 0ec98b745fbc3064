//! Sky report for one place and one day
//!
//! Prints a JSON document with the ephemerides of every object, the Moon
//! phase and the events of the day, or of a range of days with `--until`.
//!
//! Usage:
//!   cargo run --bin sky_report -- --date 2021-06-09 --latitude 50.58 --longitude 3.06 --timezone 2

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use serde_json::json;
use sky_almanac::{
    get_ephemerides, get_events, get_moon_phase, search_events, EventType, Loader, Position,
};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Event kinds accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Opposition,
    Conjunction,
    Occultation,
    MaximalElongation,
    Apogee,
    Perigee,
    SeasonChange,
    LunarEclipse,
}

impl From<Kind> for EventType {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Opposition => EventType::Opposition,
            Kind::Conjunction => EventType::Conjunction,
            Kind::Occultation => EventType::Occultation,
            Kind::MaximalElongation => EventType::MaximalElongation,
            Kind::Apogee => EventType::Apogee,
            Kind::Perigee => EventType::Perigee,
            Kind::SeasonChange => EventType::SeasonChange,
            Kind::LunarEclipse => EventType::LunarEclipse,
        }
    }
}

/// Ephemerides, Moon phase and events for a date
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Local date, YYYY-MM-DD
    #[arg(long)]
    date: NaiveDate,

    /// Observer latitude in degrees, north positive
    #[arg(long, allow_hyphen_values = true)]
    latitude: f64,

    /// Observer longitude in degrees, east positive
    #[arg(long, allow_hyphen_values = true)]
    longitude: f64,

    /// Offset of the local time from UTC, in hours
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    timezone: f64,

    /// Directory holding the ephemeris kernel
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Only report these kinds of event
    #[arg(long, value_enum, value_delimiter = ',')]
    events: Vec<Kind>,

    /// Report events up to this local date included
    #[arg(long)]
    until: Option<NaiveDate>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut loader = Loader::new();
    if let Some(dir) = &args.data_dir {
        loader = loader.with_data_dir(dir);
    }
    let ephemeris = match loader.load_ephemeris() {
        Ok(ephemeris) => ephemeris,
        Err(e) => {
            eprintln!("Cannot load {}: {e}", loader.ephemeris_path().display());
            std::process::exit(1);
        }
    };

    let position = Position::new(args.latitude, args.longitude);
    let ephemerides = get_ephemerides(&ephemeris, &position, args.date, args.timezone)?;
    let moon_phase = get_moon_phase(&ephemeris, args.date, args.timezone)?;

    let events = if args.events.is_empty() && args.until.is_none() {
        get_events(&ephemeris, args.date, args.timezone)?
    } else {
        let kinds: Vec<EventType> = if args.events.is_empty() {
            EventType::ALL.to_vec()
        } else {
            args.events.iter().copied().map(EventType::from).collect()
        };
        let until = args.until.unwrap_or(args.date);
        search_events(&ephemeris, &kinds, args.date, until, args.timezone)?
    };

    let report = json!({
        "ephemerides": ephemerides,
        "moon_phase": moon_phase,
        "events": events,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
