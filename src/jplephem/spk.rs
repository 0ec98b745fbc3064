//! Spacecraft Planet Kernel (SPK) format handling
//!
//! This module provides functionality for reading NASA SPICE SPK files which
//! contain position and velocity data for solar system bodies.
//!
//! The SPK format is described in:
//! http://naif.jpl.nasa.gov/pub/naif/toolkit_docs/FORTRAN/req/spk.html
use crate::constants::{DAY_S, J2000};
use crate::jplephem::chebyshev::{normalize_time, ChebyshevPolynomial};
use crate::jplephem::daf::DAF;
use crate::jplephem::errors::{JplephemError, Result};
use crate::jplephem::names::display_name;
use chrono::{Duration, NaiveDate};
use nalgebra::Vector3;
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::path::Path;

/// Convert seconds since J2000 to Julian date
pub fn seconds_to_jd(seconds: f64) -> f64 {
    J2000 + seconds / DAY_S
}

/// Convert Julian date to seconds since J2000
pub fn jd_to_seconds(jd: f64) -> f64 {
    (jd - J2000) * DAY_S
}

/// Spacecraft Planet Kernel (SPK) file reader
#[derive(Debug)]
pub struct SPK {
    /// The underlying DAF file
    pub daf: DAF,
    /// List of segments in the file
    pub segments: Vec<Segment>,
    /// Map of (center, target) pairs to segment indices
    pairs: HashMap<(i32, i32), usize>,
}

/// A segment in an SPK file containing position data for a specific body
#[derive(Debug)]
pub struct Segment {
    /// Source of the segment (e.g., "DE-0421LE-0421")
    pub source: String,
    /// Initial epoch in seconds since J2000
    pub start_second: f64,
    /// Final epoch in seconds since J2000
    pub end_second: f64,
    /// Target body ID
    pub target: i32,
    /// Center body ID
    pub center: i32,
    /// Reference frame ID
    pub frame: i32,
    /// Data type (2: position only, 3: position and velocity)
    pub data_type: i32,
    /// Start word address in the file
    pub start_i: usize,
    /// End word address in the file
    pub end_i: usize,
    /// Start TDB Julian date
    pub start_jd: f64,
    /// End TDB Julian date
    pub end_jd: f64,
    /// Coefficients, read from the file on first use
    data: OnceCell<SegmentData>,
}

/// Cached segment data to avoid repeated file access
#[derive(Debug)]
struct SegmentData {
    /// Initial epoch (TDB seconds past J2000)
    init: f64,
    /// Interval length in seconds (duration of each logical record)
    intlen: f64,
    /// Record size in double-precision words
    record_size: usize,
    /// Number of records
    n_records: usize,
    /// Number of coefficients per component
    n_coeffs: usize,
    /// All records back to back, directory excluded
    coefficients: Vec<f64>,
}

impl SPK {
    /// Open an SPK file at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let daf = DAF::open(path)?;
        Self::from_daf(daf)
    }

    /// Interpret an already opened DAF as an SPK
    pub fn from_daf(daf: DAF) -> Result<Self> {
        if daf.nd != 2 || daf.ni != 6 {
            return Err(JplephemError::InvalidFormat(format!(
                "SPK summaries need ND=2 and NI=6, found ND={} NI={}",
                daf.nd, daf.ni
            )));
        }

        let mut segments = Vec::new();
        let mut pairs = HashMap::new();

        for summary in daf.summaries()? {
            let (start_second, end_second) = (summary.doubles[0], summary.doubles[1]);
            let ints = &summary.integers;
            if ints[4] < 1 || ints[5] < ints[4] {
                return Err(JplephemError::InvalidFormat(format!(
                    "segment {:?} has invalid addresses {}..{}",
                    summary.name, ints[4], ints[5]
                )));
            }

            let segment = Segment {
                source: summary.name,
                start_second,
                end_second,
                target: ints[0],
                center: ints[1],
                frame: ints[2],
                data_type: ints[3],
                start_i: ints[4] as usize,
                end_i: ints[5] as usize,
                start_jd: seconds_to_jd(start_second),
                end_jd: seconds_to_jd(end_second),
                data: OnceCell::new(),
            };

            // later segments take precedence, as in SPICE
            pairs.insert((segment.center, segment.target), segments.len());
            segments.push(segment);
        }

        log::debug!(
            "SPK {} holds {} segments",
            daf.path.display(),
            segments.len()
        );

        Ok(SPK {
            daf,
            segments,
            pairs,
        })
    }

    /// Return the segment for the given center and target body IDs
    pub fn get_segment(&self, center: i32, target: i32) -> Result<&Segment> {
        self.pairs
            .get(&(center, target))
            .map(|&idx| &self.segments[idx])
            .ok_or(JplephemError::BodyNotFound { center, target })
    }

    /// Whether the kernel has a segment for the given pair
    pub fn contains(&self, center: i32, target: i32) -> bool {
        self.pairs.contains_key(&(center, target))
    }

    /// Position of `target` relative to `center` in km at TDB seconds past J2000
    pub fn compute(&self, center: i32, target: i32, tdb_seconds: f64) -> Result<Vector3<f64>> {
        self.get_segment(center, target)?.compute(&self.daf, tdb_seconds)
    }

    /// Position (km) and velocity (km/s) of `target` relative to `center`
    pub fn compute_and_differentiate(
        &self,
        center: i32,
        target: i32,
        tdb_seconds: f64,
    ) -> Result<(Vector3<f64>, Vector3<f64>)> {
        self.get_segment(center, target)?
            .compute_and_differentiate(&self.daf, tdb_seconds)
    }

    /// Read the comments from the SPK file
    pub fn comments(&self) -> Result<String> {
        self.daf.comments()
    }

    /// Drop every cached coefficient table; they are reloaded on demand
    pub fn clear_cache(&mut self) {
        for segment in &mut self.segments {
            segment.data.take();
        }
    }

    /// Number of segments whose coefficients are currently cached
    pub fn cached_segments(&self) -> usize {
        self.segments.iter().filter(|s| s.data.get().is_some()).count()
    }
}

impl Segment {
    fn check_range(&self, et: f64) -> Result<()> {
        if et < self.start_second || et > self.end_second {
            return Err(JplephemError::OutOfRangeError {
                jd: seconds_to_jd(et),
                start_jd: self.start_jd,
                end_jd: self.end_jd,
            });
        }
        Ok(())
    }

    /// Locate the record covering `et` and return its midpoint, radius and coefficients
    fn record<'a>(&self, data: &'a SegmentData, et: f64) -> Result<(f64, f64, &'a [f64])> {
        let elapsed = (et - data.init) / data.intlen;
        // the final instant belongs to the last record
        let index = (elapsed.floor().max(0.0) as usize).min(data.n_records - 1);

        let start = index * data.record_size;
        let record = &data.coefficients[start..start + data.record_size];
        Ok((record[0], record[1], &record[2..]))
    }

    /// Compute position (km) at the given TDB seconds past J2000
    pub fn compute(&self, daf: &DAF, et: f64) -> Result<Vector3<f64>> {
        self.check_range(et)?;
        let data = self.load_data(daf)?;
        let (mid, radius, coefficients) = self.record(data, et)?;
        let x = normalize_time(et, mid, radius)?;

        let n = data.n_coeffs;
        let component = |k: usize| ChebyshevPolynomial::new(&coefficients[k * n..(k + 1) * n]);
        Ok(Vector3::new(
            component(0).evaluate(x),
            component(1).evaluate(x),
            component(2).evaluate(x),
        ))
    }

    /// Compute position (km) and velocity (km/s) at the given TDB seconds past J2000
    pub fn compute_and_differentiate(
        &self,
        daf: &DAF,
        et: f64,
    ) -> Result<(Vector3<f64>, Vector3<f64>)> {
        self.check_range(et)?;
        let data = self.load_data(daf)?;
        let (mid, radius, coefficients) = self.record(data, et)?;
        let x = normalize_time(et, mid, radius)?;

        let n = data.n_coeffs;
        let component = |k: usize| ChebyshevPolynomial::new(&coefficients[k * n..(k + 1) * n]);
        let position = Vector3::new(
            component(0).evaluate(x),
            component(1).evaluate(x),
            component(2).evaluate(x),
        );

        let velocity = match self.data_type {
            2 => Vector3::new(
                component(0).derivative(x),
                component(1).derivative(x),
                component(2).derivative(x),
            ) / radius,
            _ => Vector3::new(
                component(3).evaluate(x),
                component(4).evaluate(x),
                component(5).evaluate(x),
            ),
        };

        Ok((position, velocity))
    }

    /// Load the segment data if not already loaded
    fn load_data(&self, daf: &DAF) -> Result<&SegmentData> {
        self.data.get_or_try_init(|| self.read_data(daf))
    }

    fn read_data(&self, daf: &DAF) -> Result<SegmentData> {
        let components = match self.data_type {
            2 => 3,
            3 => 6,
            other => return Err(JplephemError::UnsupportedDataType(other)),
        };

        let array = daf.read_array(self.start_i, self.end_i)?;
        if array.len() < 4 {
            return Err(JplephemError::InvalidFormat(format!(
                "segment {} is too small for a directory",
                self.source
            )));
        }

        // The last 4 values in the array are the directory: init, intlen, rsize, n_rec
        let n = array.len();
        let init = array[n - 4];
        let intlen = array[n - 3];
        let record_size = array[n - 2] as usize;
        let n_records = array[n - 1] as usize;

        if record_size < 2 + components || n_records == 0 || intlen <= 0.0 {
            return Err(JplephemError::InvalidFormat(format!(
                "segment {} has an invalid directory (rsize={record_size}, n={n_records})",
                self.source
            )));
        }
        if n != n_records * record_size + 4 {
            return Err(JplephemError::InvalidFormat(format!(
                "Inconsistent array size: expected {}, got {}",
                n_records * record_size + 4,
                n
            )));
        }

        log::trace!(
            "loaded segment {}->{}: {} records of {} words",
            self.center,
            self.target,
            n_records,
            record_size
        );

        let mut coefficients = array;
        coefficients.truncate(n - 4);
        Ok(SegmentData {
            init,
            intlen,
            record_size,
            n_records,
            n_coeffs: (record_size - 2) / components,
            coefficients,
        })
    }

    /// Return a textual description of the segment
    pub fn describe(&self, verbose: bool) -> String {
        let mut text = format!(
            "{}..{}  Type {}  {} ({}) -> {} ({})",
            format_tdb_date(self.start_jd),
            format_tdb_date(self.end_jd),
            self.data_type,
            display_name(self.center),
            self.center,
            display_name(self.target),
            self.target
        );
        if verbose {
            text.push_str(&format!("\n  frame={} source={}", self.frame, self.source));
        }
        text
    }
}

/// Civil calendar date (YYYY-MM-DD) of a Julian date
pub fn format_tdb_date(jd: f64) -> String {
    // JD 2451544.5 is 2000-01-01T00:00
    let days = (jd - 2_451_544.5).floor() as i64;
    NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|epoch| epoch.checked_add_signed(Duration::days(days)))
        .map_or_else(|| format!("JD {jd:.1}"), |date| date.to_string())
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.describe(false))
    }
}
