//! Time module for astronomical time calculations
//!
//! This module provides the instant type used throughout the crate along with
//! conversions between UTC, TAI, TT, TDB and UT1. It is inspired by the Python
//! Skyfield library's time handling: an instant is stored as a whole Julian day
//! plus a TT fraction so that small offsets keep full precision.

pub mod civil;

use crate::constants::{DAY_S, J2000, JULIAN_CENTURY, TT_MINUS_TAI, TT_MINUS_TAI_S, UNIX_EPOCH_JD};
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::ops::{Add, Sub};
use thiserror::Error;

/// Error type for time operations
#[derive(Debug, Error)]
pub enum TimeError {
    #[error("Time out of range: {0}")]
    OutOfRange(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

/// Result type for time operations
pub type Result<T> = std::result::Result<T, TimeError>;

/// Leap second table: (UTC Julian date the offset takes effect, TAI - UTC in seconds)
const LEAP_SECONDS: [(f64, f64); 28] = [
    (2441317.5, 10.0), // 1972-01-01
    (2441499.5, 11.0), // 1972-07-01
    (2441683.5, 12.0), // 1973-01-01
    (2442048.5, 13.0), // 1974-01-01
    (2442413.5, 14.0), // 1975-01-01
    (2442778.5, 15.0), // 1976-01-01
    (2443144.5, 16.0), // 1977-01-01
    (2443509.5, 17.0), // 1978-01-01
    (2443874.5, 18.0), // 1979-01-01
    (2444239.5, 19.0), // 1980-01-01
    (2444786.5, 20.0), // 1981-07-01
    (2445151.5, 21.0), // 1982-07-01
    (2445516.5, 22.0), // 1983-07-01
    (2446247.5, 23.0), // 1985-07-01
    (2447161.5, 24.0), // 1988-01-01
    (2447892.5, 25.0), // 1990-01-01
    (2448257.5, 26.0), // 1991-01-01
    (2448804.5, 27.0), // 1992-07-01
    (2449169.5, 28.0), // 1993-07-01
    (2449534.5, 29.0), // 1994-07-01
    (2450083.5, 30.0), // 1996-01-01
    (2450630.5, 31.0), // 1997-07-01
    (2451179.5, 32.0), // 1999-01-01
    (2453736.5, 33.0), // 2006-01-01
    (2454832.5, 34.0), // 2009-01-01
    (2456109.5, 35.0), // 2012-07-01
    (2457204.5, 36.0), // 2015-07-01
    (2457754.5, 37.0), // 2017-01-01
];

/// TAI - UTC in seconds for a UTC Julian date.
///
/// Dates before 1972 use the 1972 offset, which keeps the scale continuous
/// with the ΔT polynomial used for those years.
fn leap_offset_utc(utc_jd: f64) -> f64 {
    LEAP_SECONDS
        .iter()
        .rev()
        .find(|(start, _)| utc_jd >= *start)
        .map_or(LEAP_SECONDS[0].1, |(_, offset)| *offset)
}

/// TAI - UTC in seconds for a TAI Julian date given as whole day plus fraction
fn leap_offset_tai(whole: f64, tai_fraction: f64) -> f64 {
    LEAP_SECONDS
        .iter()
        .rev()
        .find(|(start, offset)| ((whole - start) + tai_fraction) * DAY_S >= offset - 1e-6)
        .map_or(LEAP_SECONDS[0].1, |(_, offset)| *offset)
}

/// Approximate delta_t (TT - UT1) in seconds based on year
///
/// Polynomial expressions by Espenak and Meeus, used for instants that
/// precede the leap second table.
pub fn delta_t_approx(year: f64) -> f64 {
    if year < -500.0 {
        let u = (year - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u
    } else if year < 500.0 {
        let t = year / 100.0;
        10583.6 - 1014.41 * t + 33.78311 * t * t - 5.952053 * t.powi(3) - 0.1798452 * t.powi(4)
            + 0.022174192 * t.powi(5)
            + 0.0090316521 * t.powi(6)
    } else if year < 1600.0 {
        let t = (year - 1000.0) / 100.0;
        1574.2 - 556.01 * t + 71.23472 * t * t + 0.319781 * t.powi(3)
            - 0.8503463 * t.powi(4)
            - 0.005050998 * t.powi(5)
            + 0.0083572073 * t.powi(6)
    } else if year < 1700.0 {
        let t = year - 1600.0;
        120.0 - 0.9808 * t - 0.01532 * t * t + t.powi(3) / 7129.0
    } else if year < 1800.0 {
        let t = year - 1700.0;
        8.83 + 0.1603 * t - 0.0059285 * t * t + 0.00013336 * t.powi(3) - t.powi(4) / 1174000.0
    } else if year < 1860.0 {
        let t = year - 1800.0;
        13.72 - 0.332447 * t + 0.0068612 * t * t + 0.0041116 * t.powi(3)
            - 0.00037436 * t.powi(4)
            + 0.0000121272 * t.powi(5)
            - 0.0000001699 * t.powi(6)
            + 0.000000000875 * t.powi(7)
    } else if year < 1900.0 {
        let t = year - 1860.0;
        7.62 + 0.5737 * t - 0.251754 * t * t + 0.01680668 * t.powi(3) - 0.0004473624 * t.powi(4)
            + t.powi(5) / 233174.0
    } else if year < 1920.0 {
        let t = year - 1900.0;
        -2.79 + 1.494119 * t - 0.0598939 * t * t + 0.0061966 * t.powi(3) - 0.000197 * t.powi(4)
    } else if year < 1941.0 {
        let t = year - 1920.0;
        21.20 + 0.84493 * t - 0.076100 * t * t + 0.0020936 * t.powi(3)
    } else if year < 1961.0 {
        let t = year - 1950.0;
        29.07 + 0.407 * t - t * t / 233.0 + t.powi(3) / 2547.0
    } else if year < 1986.0 {
        let t = year - 1975.0;
        45.45 + 1.067 * t - t * t / 260.0 - t.powi(3) / 718.0
    } else if year < 2005.0 {
        let t = year - 2000.0;
        63.86 + 0.3345 * t - 0.060374 * t * t
            + 0.0017275 * t.powi(3)
            + 0.000651814 * t.powi(4)
            + 0.00002373599 * t.powi(5)
    } else if year < 2050.0 {
        let t = year - 2000.0;
        62.92 + 0.32217 * t + 0.005589 * t * t
    } else if year < 2150.0 {
        let u = (year - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u - 0.5628 * (2150.0 - year)
    } else {
        let u = (year - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u
    }
}

/// Calculate TDB - TT difference in seconds (USNO Circular 179, eq. 2.6)
fn tdb_minus_tt(jd_tdb: f64) -> f64 {
    let t = (jd_tdb - J2000) / JULIAN_CENTURY;

    0.001657 * f64::sin(628.3076 * t + 6.2401)
        + 0.000022 * f64::sin(575.3385 * t + 4.2970)
        + 0.000014 * f64::sin(1256.6152 * t + 6.1969)
        + 0.000005 * f64::sin(606.9777 * t + 4.0212)
        + 0.000005 * f64::sin(52.9691 * t + 0.4444)
        + 0.000002 * f64::sin(21.3299 * t + 5.5431)
        + 0.000010 * t * f64::sin(628.3076 * t + 4.2490)
}

/// An instant of astronomical time
///
/// Internally the instant is Terrestrial Time split into a whole Julian day
/// and a fraction, so that adding a few milliseconds to a date in 2050 does
/// not lose precision.
#[derive(Debug, Clone, Copy)]
pub struct Time {
    /// Whole Julian day number (integer or half-integer part)
    whole: f64,
    /// TT fraction of day (TT - whole)
    tt_fraction: f64,
}

impl Time {
    /// Create a time from a TT Julian date split into two parts
    pub fn from_tt(whole: f64, fraction: f64) -> Self {
        let extra = fraction.floor();
        Self {
            whole: whole + extra,
            tt_fraction: fraction - extra,
        }
    }

    /// Create a time from a single TT Julian date
    pub fn from_tt_jd(jd: f64) -> Self {
        let whole = jd.floor();
        Self::from_tt(whole, jd - whole)
    }

    /// Create a time from a TDB Julian date
    pub fn from_tdb_jd(jd: f64) -> Self {
        Self::from_tt_jd(jd - tdb_minus_tt(jd) / DAY_S)
    }

    /// Create a time from a UTC datetime
    pub fn from_datetime(dt: &DateTime<Utc>) -> Self {
        let seconds = dt.timestamp();
        let days = seconds.div_euclid(86_400);
        let second_of_day = seconds.rem_euclid(86_400) as f64
            + f64::from(dt.timestamp_subsec_nanos()) / 1e9;

        let whole = UNIX_EPOCH_JD + days as f64;
        let utc_fraction = second_of_day / DAY_S;
        let leap = leap_offset_utc(whole + utc_fraction);

        Self::from_tt(whole, utc_fraction + (leap + TT_MINUS_TAI_S) / DAY_S)
    }

    /// Create a time from UTC calendar fields
    pub fn utc(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Result<Self> {
        let dt = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, second))
            .ok_or_else(|| {
                TimeError::InvalidDate(format!(
                    "{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}"
                ))
            })?;
        Ok(Self::from_datetime(&dt.and_utc()))
    }

    /// Convert back to a UTC datetime (nanosecond resolution)
    pub fn utc_datetime(&self) -> Result<DateTime<Utc>> {
        let leap = self.leap_seconds();
        let utc_fraction = self.tt_fraction - (leap + TT_MINUS_TAI_S) / DAY_S;

        // whole days since the Unix epoch are exact; only the fraction is rounded
        let day_seconds = ((self.whole - UNIX_EPOCH_JD) * DAY_S).round() as i64;
        let fraction_seconds = utc_fraction * DAY_S;
        let mut whole_seconds = fraction_seconds.floor();
        let mut nanos = ((fraction_seconds - whole_seconds) * 1e9).round();
        if nanos >= 1e9 {
            whole_seconds += 1.0;
            nanos = 0.0;
        }

        DateTime::from_timestamp(day_seconds + whole_seconds as i64, nanos as u32)
            .ok_or_else(|| TimeError::OutOfRange(format!("TT Julian date {}", self.tt())))
    }

    /// Whole part of the Julian date
    pub fn whole(&self) -> f64 {
        self.whole
    }

    /// TT fraction of the Julian date
    pub fn tt_fraction(&self) -> f64 {
        self.tt_fraction
    }

    /// Get the TT (Terrestrial Time) as Julian date
    pub fn tt(&self) -> f64 {
        self.whole + self.tt_fraction
    }

    /// Get the TAI (International Atomic Time) as Julian date
    pub fn tai(&self) -> f64 {
        self.whole + self.tt_fraction - TT_MINUS_TAI
    }

    /// TDB fraction of the Julian date
    pub fn tdb_fraction(&self) -> f64 {
        self.tt_fraction + tdb_minus_tt(self.tt()) / DAY_S
    }

    /// Get the TDB (Barycentric Dynamical Time) as Julian date
    pub fn tdb(&self) -> f64 {
        self.whole + self.tdb_fraction()
    }

    /// TDB seconds elapsed since J2000, the time argument of SPK kernels
    pub fn tdb_seconds_from_j2000(&self) -> f64 {
        (self.whole - J2000) * DAY_S + self.tdb_fraction() * DAY_S
    }

    /// Julian centuries of TT since J2000
    pub fn tt_centuries(&self) -> f64 {
        ((self.whole - J2000) + self.tt_fraction) / JULIAN_CENTURY
    }

    /// Get the current leap seconds (TAI - UTC)
    pub fn leap_seconds(&self) -> f64 {
        leap_offset_tai(self.whole, self.tt_fraction - TT_MINUS_TAI)
    }

    /// Get Delta-T in seconds (TT - UT1)
    ///
    /// Inside the leap second era UT1 is taken equal to UTC, which is good
    /// to better than 0.9 s. Earlier instants use the polynomial fit.
    pub fn delta_t(&self) -> f64 {
        if self.tai() >= LEAP_SECONDS[0].0 {
            TT_MINUS_TAI_S + self.leap_seconds()
        } else {
            let year = 2000.0 + (self.tt() - J2000) / 365.25;
            delta_t_approx(year)
        }
    }

    /// UT1 fraction of the Julian date
    pub fn ut1_fraction(&self) -> f64 {
        self.tt_fraction - self.delta_t() / DAY_S
    }

    /// Get the UT1 (Universal Time) as Julian date
    pub fn ut1(&self) -> f64 {
        self.whole + self.ut1_fraction()
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.utc_datetime() {
            Ok(dt) => write!(f, "<Time {}>", dt.to_rfc3339()),
            Err(_) => write!(f, "<Time tt={:.6}>", self.tt()),
        }
    }
}

// Addition and subtraction operations for Time, in days

impl Add<f64> for Time {
    type Output = Time;

    fn add(self, days: f64) -> Self::Output {
        Time::from_tt(self.whole, self.tt_fraction + days)
    }
}

impl Sub<f64> for Time {
    type Output = Time;

    fn sub(self, days: f64) -> Self::Output {
        Time::from_tt(self.whole, self.tt_fraction - days)
    }
}

impl Sub<Time> for Time {
    type Output = f64;

    fn sub(self, other: Time) -> Self::Output {
        (self.whole - other.whole) + (self.tt_fraction - other.tt_fraction)
    }
}

impl PartialEq for Time {
    fn eq(&self, other: &Self) -> bool {
        *self - *other == 0.0
    }
}

impl PartialOrd for Time {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        (*self - *other).partial_cmp(&0.0)
    }
}

// Allow conversion from DateTime<Utc> to Time
impl From<DateTime<Utc>> for Time {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_datetime(&dt)
    }
}
