//! Daily ephemerides: rise, culmination and set of each aster, and the Moon phase

use crate::celestial::{CelestialObject, Object, ASTERS};
use crate::constants::{CULMINATION_EPSILON, DEFAULT_EPSILON, RISEN_ALTITUDE_DEG, TAU};
use crate::errors::Result;
use crate::planetlib::{self, Body, EphemerisProvider};
use crate::positions::{Observer, Position};
use crate::searchlib::{find_discrete, find_maxima, Observable};
use crate::time::civil::{
    local_day_window, local_midnight_utc, normalize_datetime, translate_to_timezone,
};
use crate::time::Time;
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

/// Rise, culmination and set of one object over one local day
///
/// Any of the three is `None` when it does not happen within the day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AsterEphemerides {
    pub object: Object,
    pub rise_time: Option<DateTime<FixedOffset>>,
    pub culmination_time: Option<DateTime<FixedOffset>>,
    pub set_time: Option<DateTime<FixedOffset>>,
}

/// The eight phases of the Moon, by elongation from the Sun in 45° steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MoonPhaseType {
    NewMoon = 0,
    WaxingCrescent = 1,
    FirstQuarter = 2,
    WaxingGibbous = 3,
    FullMoon = 4,
    WaningGibbous = 5,
    LastQuarter = 6,
    WaningCrescent = 7,
}

impl MoonPhaseType {
    const ALL: [MoonPhaseType; 8] = [
        MoonPhaseType::NewMoon,
        MoonPhaseType::WaxingCrescent,
        MoonPhaseType::FirstQuarter,
        MoonPhaseType::WaxingGibbous,
        MoonPhaseType::FullMoon,
        MoonPhaseType::WaningGibbous,
        MoonPhaseType::LastQuarter,
        MoonPhaseType::WaningCrescent,
    ];

    /// Phase of the given eighth of the synodic cycle, wrapping around
    pub fn from_octant(octant: i64) -> Self {
        Self::ALL[octant.rem_euclid(8) as usize]
    }

    /// New moon, first quarter, full moon and last quarter happen at an instant;
    /// the others last for days
    pub fn is_exact(&self) -> bool {
        (*self as u8) % 2 == 0
    }

    /// The exact phase coming after this one
    pub fn next_exact(&self) -> Self {
        Self::from_octant(((*self as i64) / 2 + 1) * 2)
    }

    pub fn name(&self) -> &'static str {
        match self {
            MoonPhaseType::NewMoon => "New Moon",
            MoonPhaseType::WaxingCrescent => "Waxing crescent",
            MoonPhaseType::FirstQuarter => "First Quarter",
            MoonPhaseType::WaxingGibbous => "Waxing gibbous",
            MoonPhaseType::FullMoon => "Full Moon",
            MoonPhaseType::WaningGibbous => "Waning gibbous",
            MoonPhaseType::LastQuarter => "Last Quarter",
            MoonPhaseType::WaningCrescent => "Waning crescent",
        }
    }
}

/// Moon phase of a day
#[derive(Debug, Clone, PartialEq)]
pub struct MoonPhase {
    pub phase_type: MoonPhaseType,
    /// When the phase happens, for exact phases only
    pub time: Option<DateTime<FixedOffset>>,
    /// When the next exact phase happens
    ///
    /// Searched up to ten days after the date. Exact phases are at most
    /// about eight and a half days apart, so this is `None` only for a
    /// provider whose Moon does not go round the sky in a month.
    pub next_phase_date: Option<DateTime<FixedOffset>>,
}

impl MoonPhase {
    pub fn next_phase(&self) -> MoonPhaseType {
        self.phase_type.next_exact()
    }
}

impl Serialize for MoonPhase {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Next<'a> {
            phase: MoonPhaseType,
            time: &'a Option<DateTime<FixedOffset>>,
        }

        let mut state = serializer.serialize_struct("MoonPhase", 3)?;
        state.serialize_field("phase", &self.phase_type)?;
        state.serialize_field("time", &self.time)?;
        state.serialize_field(
            "next",
            &Next {
                phase: self.next_phase(),
                time: &self.next_phase_date,
            },
        )?;
        state.end()
    }
}

/// Moon phase at each instant, from the elongation on the ecliptic of date
pub fn moon_phases<P: EphemerisProvider + ?Sized>(
    provider: &P,
) -> Observable<impl Fn(&Time) -> planetlib::Result<MoonPhaseType> + '_> {
    // one phase per week
    Observable::new(7.0, move |t: &Time| {
        let earth = Observer::GEOCENTER.at(provider, t)?;
        let moon = earth.observe(provider, Body::Moon)?.apparent().ecliptic_latlon_of_date();
        let sun = earth.observe(provider, Body::Sun)?.apparent().ecliptic_latlon_of_date();
        let octant = ((moon.longitude - sun.longitude) / (TAU / 8.0)).floor() as i64;
        Ok(MoonPhaseType::from_octant(octant))
    })
}

/// Altitude in degrees of `aster` above the horizon of `observer`
fn altitude_at<P: EphemerisProvider + ?Sized>(
    provider: &P,
    observer: &Observer,
    aster: &Object,
    t: &Time,
) -> Result<f64> {
    let state = observer.at(provider, t)?;
    let apparent = aster.position_at(provider, &state)?;
    // a topocentric observer always has a horizon
    Ok(apparent.altitude().unwrap_or(f64::NAN))
}

fn local_minute(t: &Time, timezone: f64) -> Result<DateTime<FixedOffset>> {
    Ok(normalize_datetime(translate_to_timezone(t.utc_datetime()?, timezone)?))
}

fn aster_ephemerides<P: EphemerisProvider + ?Sized>(
    provider: &P,
    observer: &Observer,
    aster: &Object,
    window: (Time, Time),
    for_date: NaiveDate,
    timezone: f64,
) -> Result<AsterEphemerides> {
    let (start, end) = window;
    let altitude = Observable::new(1.0, |t: &Time| altitude_at(provider, observer, aster, t));
    let is_risen = Observable::new(0.5, |t: &Time| -> Result<bool> {
        Ok(altitude_at(provider, observer, aster, t)? > RISEN_ALTITUDE_DEG)
    });

    let mut rise_time = None;
    let mut set_time = None;
    for (t, risen) in find_discrete(start, end, &is_risen, DEFAULT_EPSILON)? {
        let local = local_minute(&t, timezone)?;
        if local.date_naive() != for_date {
            continue;
        }
        if risen {
            rise_time = Some(local);
        } else {
            set_time = Some(local);
        }
    }

    let maxima = find_maxima(start, end, &altitude, CULMINATION_EPSILON)?;
    let culmination_time = match maxima.as_slice() {
        [(t, _)] => Some(local_minute(t, timezone)?),
        _ => None,
    }
    .filter(|local| local.date_naive() == for_date);

    Ok(AsterEphemerides {
        object: *aster,
        rise_time,
        culmination_time,
        set_time,
    })
}

/// Rise, culmination and set times of every aster seen from `position` on
/// the local day `for_date`, in the zone `timezone` hours east of UTC
///
/// Times are rounded to the minute. Fails with `OutOfRangeDate` when the day
/// is not covered by the ephemeris.
pub fn get_ephemerides<P: EphemerisProvider + ?Sized>(
    provider: &P,
    position: &Position,
    for_date: NaiveDate,
    timezone: f64,
) -> Result<Vec<AsterEphemerides>> {
    let compute = || -> Result<Vec<AsterEphemerides>> {
        let window = local_day_window(for_date, 1, timezone)?;
        let observer = position.observer();
        ASTERS
            .iter()
            .map(|aster| aster_ephemerides(provider, &observer, aster, window, for_date, timezone))
            .collect()
    };

    let ephemerides = compute().map_err(|error| error.with_date_range(timezone, 1))?;
    log::debug!(
        "ephemerides of {} asters for {} at {:?}",
        ephemerides.len(),
        for_date,
        position
    );
    Ok(ephemerides)
}

/// Index of the phase change describing the day starting at `today`
///
/// That is the first change of the day if there is one, else the last change
/// before the day.
fn current_phase_index(
    changes: &[(Time, MoonPhaseType)],
    today: Time,
    tomorrow: Time,
) -> Option<usize> {
    if changes.is_empty() {
        return None;
    }
    match changes.iter().position(|(t, _)| today <= *t) {
        Some(i) if changes[i].0 >= tomorrow => Some(i.saturating_sub(1)),
        Some(i) => Some(i),
        None => Some(changes.len() - 1),
    }
}

/// Moon phase of the UTC day `for_date`, with times in the zone `timezone`
/// hours east of UTC
///
/// Fails with `OutOfRangeDate` when the twenty days around the date are not
/// covered by the ephemeris.
pub fn get_moon_phase<P: EphemerisProvider + ?Sized>(
    provider: &P,
    for_date: NaiveDate,
    timezone: f64,
) -> Result<MoonPhase> {
    let compute = || -> Result<MoonPhase> {
        let today = Time::from_datetime(&local_midnight_utc(for_date, 0.0)?);
        let tomorrow = today + 1.0;
        let phases = moon_phases(provider);
        let changes = find_discrete(today - 10.0, today + 10.0, &phases, DEFAULT_EPSILON)?;

        let local = |t: &Time| -> Result<DateTime<FixedOffset>> {
            Ok(translate_to_timezone(t.utc_datetime()?, timezone)?)
        };

        let Some(i) = current_phase_index(&changes, today, tomorrow) else {
            return Ok(MoonPhase {
                phase_type: phases.at(&today)?,
                time: None,
                next_phase_date: None,
            });
        };

        let (phase_time, phase_type) = changes[i];
        let time = if phase_type.is_exact() {
            Some(local(&phase_time)?)
        } else {
            None
        };
        let next_phase_date = changes[i + 1..]
            .iter()
            .find(|(_, phase)| phase.is_exact())
            .map(|(t, _)| local(t))
            .transpose()?;

        Ok(MoonPhase {
            phase_type,
            time,
            next_phase_date,
        })
    };

    compute().map_err(|error| error.with_date_range(timezone, 12))
}
