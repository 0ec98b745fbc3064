//! One detector per family of events
//!
//! Every detector scans `[start, end]` with the finders of `searchlib` and
//! reports what it found with times in the caller's timezone.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::almanac::{lunar_eclipses, seasons, LunarEclipse};
use crate::celestial::{get_aster, CelestialObject, Object, ObjectCategory, ASTERS, EARTH};
use crate::constants::{DEFAULT_EPSILON, DISTANCE_EPSILON, ELONGATION_EPSILON, TAU};
use crate::errors::Result;
use crate::framelib::angle_between;
use crate::planetlib::{self, Body, EphemerisProvider};
use crate::positions::{Observer, ObserverState};
use crate::searchlib::{find_discrete, find_maxima, find_minima, Observable};
use crate::time::civil::translate_to_timezone;
use crate::time::Time;
use chrono::{DateTime, FixedOffset};

use super::{Event, EventKind, EventType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Detector {
    Conjunctions,
    Oppositions,
    MaximalElongations,
    MoonApogee,
    MoonPerigee,
    EarthApogee,
    EarthPerigee,
    SeasonChanges,
    LunarEclipses,
}

impl Detector {
    pub(super) const ALL: [Detector; 9] = [
        Detector::Conjunctions,
        Detector::Oppositions,
        Detector::MaximalElongations,
        Detector::MoonApogee,
        Detector::MoonPerigee,
        Detector::EarthApogee,
        Detector::EarthPerigee,
        Detector::SeasonChanges,
        Detector::LunarEclipses,
    ];

    /// Kinds of event this detector can report
    pub(super) fn produces(&self) -> &'static [EventType] {
        match self {
            Detector::Conjunctions => &[EventType::Conjunction, EventType::Occultation],
            Detector::Oppositions => &[EventType::Opposition],
            Detector::MaximalElongations => &[EventType::MaximalElongation],
            Detector::MoonApogee | Detector::EarthApogee => &[EventType::Apogee],
            Detector::MoonPerigee | Detector::EarthPerigee => &[EventType::Perigee],
            Detector::SeasonChanges => &[EventType::SeasonChange],
            Detector::LunarEclipses => &[EventType::LunarEclipse],
        }
    }

    pub(super) fn run<P: EphemerisProvider + ?Sized>(
        &self,
        provider: &P,
        start: Time,
        end: Time,
        timezone: f64,
    ) -> Result<Vec<Event>> {
        let moon = get_aster(Body::Moon);
        let sun = get_aster(Body::Sun);
        let window = (start, end);
        match self {
            Detector::Conjunctions => conjunctions(provider, start, end, timezone),
            Detector::Oppositions => oppositions(provider, start, end, timezone),
            Detector::MaximalElongations => maximal_elongations(provider, start, end, timezone),
            Detector::MoonApogee => {
                distance_extrema(provider, moon, &EARTH, Extremum::Apogee, window, timezone)
            }
            Detector::MoonPerigee => {
                distance_extrema(provider, moon, &EARTH, Extremum::Perigee, window, timezone)
            }
            Detector::EarthApogee => {
                distance_extrema(provider, &EARTH, sun, Extremum::Apogee, window, timezone)
            }
            Detector::EarthPerigee => {
                distance_extrema(provider, &EARTH, sun, Extremum::Perigee, window, timezone)
            }
            Detector::SeasonChanges => season_changes(provider, start, end, timezone),
            Detector::LunarEclipses => lunar_eclipse_events(provider, start, end, timezone),
        }
    }
}

fn local(t: &Time, timezone: f64) -> Result<DateTime<FixedOffset>> {
    Ok(translate_to_timezone(t.utc_datetime()?, timezone)?)
}

/// `a - b` wrapped into [-π, π)
fn wrapped_difference(a: f64, b: f64) -> f64 {
    (a - b + PI).rem_euclid(TAU) - PI
}

/// Apparent ecliptic longitude (J2000) of `body` seen by `earth`
fn ecliptic_longitude<P: EphemerisProvider + ?Sized>(
    provider: &P,
    earth: &ObserverState,
    body: Body,
) -> planetlib::Result<f64> {
    Ok(earth.observe(provider, body)?.apparent().ecliptic_latlon().longitude)
}

fn conjunctions<P: EphemerisProvider + ?Sized>(
    provider: &P,
    start: Time,
    end: Time,
    timezone: f64,
) -> Result<Vec<Event>> {
    let asters: Vec<&Object> = ASTERS
        .iter()
        .filter(|aster| aster.category != ObjectCategory::Star)
        .collect();

    let mut events = Vec::new();
    for (i, first) in asters.iter().enumerate() {
        for second in &asters[i + 1..] {
            let longitudes = |t: &Time| -> planetlib::Result<(f64, f64)> {
                let earth = Observer::GEOCENTER.at(provider, t)?;
                Ok((
                    ecliptic_longitude(provider, &earth, first.identifier)?,
                    ecliptic_longitude(provider, &earth, second.identifier)?,
                ))
            };
            // the parity of floor(Δλ/π) survives either longitude wrapping
            // at 0, and changes each time Δλ crosses 0 or ±π
            let same_half = Observable::new(60.0, |t: &Time| -> planetlib::Result<bool> {
                let (a, b) = longitudes(t)?;
                Ok(((a - b) / PI).floor().rem_euclid(2.0) == 0.0)
            });

            for (t, _) in find_discrete(start, end, &same_half, DEFAULT_EPSILON)? {
                let (a, b) = longitudes(&t)?;
                // the two objects are on opposite sides of the sky
                if wrapped_difference(a, b).abs() > FRAC_PI_2 {
                    continue;
                }
                events.push(conjunction_or_occultation(provider, first, second, &t, timezone)?);
            }
        }
    }
    Ok(events)
}

/// Occultation when the disks overlap, conjunction otherwise
fn conjunction_or_occultation<P: EphemerisProvider + ?Sized>(
    provider: &P,
    first: &Object,
    second: &Object,
    t: &Time,
    timezone: f64,
) -> Result<Event> {
    let earth = Observer::GEOCENTER.at(provider, t)?;
    let first_position = earth.geometric(provider, first.identifier)?;
    let second_position = earth.geometric(provider, second.identifier)?;
    let separation = angle_between(&first_position, &second_position);

    let first_distance = first.position_at(provider, &earth)?.distance_km();
    let second_distance = second.position_at(provider, &earth)?.distance_km();
    let first_radius = first.apparent_radius(first_distance)?;
    let second_radius = second.apparent_radius(second_distance)?;

    let start_time = local(t, timezone)?;
    if separation - second_radius < first_radius {
        let objects = if first_position.norm() < second_position.norm() {
            vec![*first, *second]
        } else {
            vec![*second, *first]
        };
        Ok(Event {
            kind: EventKind::Occultation,
            objects,
            start_time,
        })
    } else {
        Ok(Event {
            kind: EventKind::Conjunction,
            objects: vec![*first, *second],
            start_time,
        })
    }
}

fn oppositions<P: EphemerisProvider + ?Sized>(
    provider: &P,
    start: Time,
    end: Time,
    timezone: f64,
) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    let outer = ASTERS.iter().filter(|aster| {
        aster.category == ObjectCategory::Planet
            && !matches!(aster.identifier, Body::Mercury | Body::Venus)
    });

    for aster in outer {
        // Sun longitude minus the planet's, in degrees, not wrapped
        let angle = |t: &Time| -> planetlib::Result<f64> {
            let earth = Observer::GEOCENTER.at(provider, t)?;
            let sun = ecliptic_longitude(provider, &earth, Body::Sun)?;
            let planet = ecliptic_longitude(provider, &earth, aster.identifier)?;
            Ok((sun - planet).to_degrees())
        };
        let opposing = Observable::new(1.0, |t: &Time| -> planetlib::Result<bool> {
            Ok(angle(t)? > 180.0)
        });

        for (t, _) in find_discrete(start, end, &opposing, DEFAULT_EPSILON)? {
            let degrees = angle(&t)?;
            // a longitude wrapping at 0 flips the predicate far from 180°
            if degrees.trunc() != 180.0 {
                log::warn!(
                    "ignoring opposition of {} at {}: angle is {:.3}°",
                    aster,
                    t,
                    degrees
                );
                continue;
            }
            events.push(Event {
                kind: EventKind::Opposition,
                objects: vec![*aster],
                start_time: local(&t, timezone)?,
            });
        }
    }
    Ok(events)
}

fn maximal_elongations<P: EphemerisProvider + ?Sized>(
    provider: &P,
    start: Time,
    end: Time,
    timezone: f64,
) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    for identifier in [Body::Mercury, Body::Venus] {
        let elongation = Observable::new(1.0, |t: &Time| -> planetlib::Result<f64> {
            let earth = Observer::GEOCENTER.at(provider, t)?;
            let sun = earth.geometric(provider, Body::Sun)?;
            let planet = earth.geometric(provider, identifier)?;
            Ok(angle_between(&sun, &planet).to_degrees())
        });

        for (t, degrees) in find_maxima(start, end, &elongation, ELONGATION_EPSILON)? {
            events.push(Event {
                kind: EventKind::MaximalElongation {
                    degrees: (degrees * 10.0).round() / 10.0,
                },
                objects: vec![*get_aster(identifier)],
                start_time: local(&t, timezone)?,
            });
        }
    }
    Ok(events)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extremum {
    Apogee,
    Perigee,
}

/// Apogees or perigees of `target` around `center`
fn distance_extrema<P: EphemerisProvider + ?Sized>(
    provider: &P,
    target: &Object,
    center: &Object,
    extremum: Extremum,
    (start, end): (Time, Time),
    timezone: f64,
) -> Result<Vec<Event>> {
    let distance = Observable::new(1.0, |t: &Time| -> planetlib::Result<f64> {
        let observer = Observer::Center(center.identifier).at(provider, t)?;
        Ok(observer.observe(provider, target.identifier)?.distance_km())
    });

    let found = match extremum {
        Extremum::Apogee => find_maxima(start, end, &distance, DISTANCE_EPSILON)?,
        Extremum::Perigee => find_minima(start, end, &distance, DISTANCE_EPSILON)?,
    };

    found
        .into_iter()
        .map(|(t, distance_km)| {
            let kind = match extremum {
                Extremum::Apogee => EventKind::Apogee { distance_km },
                Extremum::Perigee => EventKind::Perigee { distance_km },
            };
            Ok(Event {
                kind,
                objects: vec![*target],
                start_time: local(&t, timezone)?,
            })
        })
        .collect()
}

fn season_changes<P: EphemerisProvider + ?Sized>(
    provider: &P,
    start: Time,
    end: Time,
    timezone: f64,
) -> Result<Vec<Event>> {
    find_discrete(start, end, &seasons(provider), DEFAULT_EPSILON)?
        .into_iter()
        .map(|(t, season)| {
            Ok(Event {
                kind: EventKind::SeasonChange { season },
                objects: Vec::new(),
                start_time: local(&t, timezone)?,
            })
        })
        .collect()
}

/// Entry into and exit from the penumbra around an eclipse maximum
///
/// The Moon is inside while its longitude stays within the penumbra and
/// lunar radii of its longitude at maximum. Each side is searched over one
/// day, longer than any lunar eclipse.
fn penumbra_contacts<P: EphemerisProvider + ?Sized>(
    provider: &P,
    eclipse: &LunarEclipse,
) -> planetlib::Result<Option<(Time, Time)>> {
    let moon_longitude = |t: &Time| -> planetlib::Result<f64> {
        let earth = Observer::GEOCENTER.at(provider, t)?;
        ecliptic_longitude(provider, &earth, Body::Moon)
    };
    let at_maximum = moon_longitude(&eclipse.time)?;
    let reach = eclipse.penumbra_radius + eclipse.moon_radius;
    let in_penumbra = Observable::new(60.0, |t: &Time| -> planetlib::Result<bool> {
        Ok(wrapped_difference(at_maximum, moon_longitude(t)?).abs() < reach)
    });

    let before = find_discrete(eclipse.time - 1.0, eclipse.time, &in_penumbra, DEFAULT_EPSILON)?;
    let after = find_discrete(eclipse.time, eclipse.time + 1.0, &in_penumbra, DEFAULT_EPSILON)?;

    let entry = before.iter().rev().find(|(_, inside)| *inside);
    let exit = after.iter().find(|(_, inside)| !*inside);
    Ok(match (entry, exit) {
        (Some((entry, _)), Some((exit, _))) => Some((*entry, *exit)),
        _ => None,
    })
}

fn lunar_eclipse_events<P: EphemerisProvider + ?Sized>(
    provider: &P,
    start: Time,
    end: Time,
    timezone: f64,
) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    for eclipse in lunar_eclipses(start, end, provider)? {
        let Some((entry, exit)) = penumbra_contacts(provider, &eclipse)? else {
            log::warn!(
                "skipping {} lunar eclipse at {}: no penumbra contact found",
                eclipse.eclipse_type.name(),
                eclipse.time
            );
            continue;
        };

        events.push(Event {
            kind: EventKind::LunarEclipse {
                eclipse_type: eclipse.eclipse_type,
                maximum: local(&eclipse.time, timezone)?,
                end_time: local(&exit, timezone)?,
            },
            objects: vec![*get_aster(Body::Moon)],
            start_time: local(&entry, timezone)?,
        });
    }
    Ok(events)
}
