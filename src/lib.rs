//! Sky almanac: rise and set times, moon phases and sky events
//!
//! This crate computes, from a JPL planetary kernel, the daily ephemerides
//! of the Sun, Moon and planets for an observer, the current phase of the
//! Moon, and the notable events of a day or a date range: conjunctions,
//! occultations, oppositions, maximal elongations, apogees and perigees,
//! equinoxes and solstices, and lunar eclipses.
//!
//! ```no_run
//! use sky_almanac::{get_events, Loader};
//! use chrono::NaiveDate;
//!
//! let ephemeris = Loader::new().load_ephemeris()?;
//! let date = NaiveDate::from_ymd_opt(2021, 6, 9).unwrap();
//! for event in get_events(&ephemeris, date, 2.0)? {
//!     println!("{} {}", event.start_time, event.description());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::path::{Path, PathBuf};

pub mod almanac;
pub mod celestial;
pub mod constants;
pub mod earthlib;
pub mod ephemerides;
pub mod errors;
pub mod events;
pub mod framelib;
pub mod jplephem;
pub mod nutationlib;
pub mod planetlib;
pub mod positions;
pub mod precessionlib;
pub mod searchlib;
pub mod time;

// Re-export commonly used types
pub use celestial::{CelestialObject, Object, ObjectCategory, ASTERS};
pub use ephemerides::{get_ephemerides, get_moon_phase, AsterEphemerides, MoonPhase, MoonPhaseType};
pub use errors::{AlmanacError, Result};
pub use events::{get_events, search_events, Event, EventType};
pub use planetlib::{Body, EphemerisError, EphemerisProvider, SpkEphemeris};
pub use positions::Position;
pub use time::Time;

/// Kernel opened when none is named
pub const DEFAULT_EPHEMERIS: &str = "de421.bsp";

/// Environment variable naming the data directory
pub const DATA_DIR_ENV: &str = "SKY_ALMANAC_DATA";

/// Entry point for loading the planetary kernel
#[derive(Debug, Clone)]
pub struct Loader {
    data_dir: Option<PathBuf>,
    ephemeris_file: String,
}

impl Loader {
    /// Create a new loader with default data directory
    pub fn new() -> Self {
        Self {
            data_dir: None,
            ephemeris_file: DEFAULT_EPHEMERIS.to_string(),
        }
    }

    /// Set a custom data directory
    pub fn with_data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Name of the kernel inside the data directory
    pub fn with_ephemeris_file(mut self, name: impl Into<String>) -> Self {
        self.ephemeris_file = name.into();
        self
    }

    /// Directory the kernel is read from
    ///
    /// In order: the directory given to [`Loader::with_data_dir`], then
    /// `$SKY_ALMANAC_DATA`, then `$HOME/.cache/sky-almanac`, then the
    /// working directory.
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            return PathBuf::from(dir);
        }
        match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(".cache").join("sky-almanac"),
            None => PathBuf::from("."),
        }
    }

    /// Full path of the kernel
    pub fn ephemeris_path(&self) -> PathBuf {
        self.data_dir().join(&self.ephemeris_file)
    }

    /// Load the planetary kernel
    pub fn load_ephemeris(&self) -> std::result::Result<SpkEphemeris, EphemerisError> {
        let path = self.ephemeris_path();
        let ephemeris = SpkEphemeris::open(&path)?;
        let (start, end) = ephemeris.coverage();
        log::debug!(
            "opened {} with {} segments, covering {} to {}",
            path.display(),
            ephemeris.spk().segments.len(),
            start,
            end
        );
        Ok(ephemeris)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
