//! Astronomical events and the assembler that collects them over a date range

mod detectors;

use crate::almanac::{LunarEclipseType, SeasonType};
use crate::celestial::Object;
use crate::errors::{AlmanacError, Result};
use crate::planetlib::EphemerisProvider;
use crate::time::civil::local_day_window;
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

use detectors::Detector;

/// Kinds of event, without their payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Opposition,
    Conjunction,
    Occultation,
    MaximalElongation,
    Apogee,
    Perigee,
    SeasonChange,
    LunarEclipse,
}

impl EventType {
    pub const ALL: [EventType; 8] = [
        EventType::Opposition,
        EventType::Conjunction,
        EventType::Occultation,
        EventType::MaximalElongation,
        EventType::Apogee,
        EventType::Perigee,
        EventType::SeasonChange,
        EventType::LunarEclipse,
    ];
}

/// What happened, with the data specific to each kind
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Opposition,
    Conjunction,
    /// The first object passes in front of the second
    Occultation,
    MaximalElongation {
        /// Separation from the Sun, rounded to a tenth of a degree
        degrees: f64,
    },
    Apogee {
        distance_km: f64,
    },
    Perigee {
        distance_km: f64,
    },
    SeasonChange {
        season: SeasonType,
    },
    LunarEclipse {
        eclipse_type: LunarEclipseType,
        maximum: DateTime<FixedOffset>,
        /// Exit from the penumbra
        end_time: DateTime<FixedOffset>,
    },
}

impl EventKind {
    pub fn event_type(&self) -> EventType {
        match self {
            EventKind::Opposition => EventType::Opposition,
            EventKind::Conjunction => EventType::Conjunction,
            EventKind::Occultation => EventType::Occultation,
            EventKind::MaximalElongation { .. } => EventType::MaximalElongation,
            EventKind::Apogee { .. } => EventType::Apogee,
            EventKind::Perigee { .. } => EventType::Perigee,
            EventKind::SeasonChange { .. } => EventType::SeasonChange,
            EventKind::LunarEclipse { .. } => EventType::LunarEclipse,
        }
    }
}

/// An event, with the objects involved (none for season changes, two for
/// conjunctions and occultations, one otherwise)
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    pub objects: Vec<Object>,
    pub start_time: DateTime<FixedOffset>,
}

impl Event {
    pub fn event_type(&self) -> EventType {
        self.kind.event_type()
    }

    /// End of the event, for lunar eclipses only
    pub fn end_time(&self) -> Option<DateTime<FixedOffset>> {
        match &self.kind {
            EventKind::LunarEclipse { end_time, .. } => Some(*end_time),
            _ => None,
        }
    }

    fn object_name(&self, index: usize) -> &'static str {
        self.objects.get(index).map_or("?", |object| object.name())
    }

    /// Human readable sentence describing the event
    pub fn description(&self) -> String {
        let first = self.object_name(0);
        match &self.kind {
            EventKind::Opposition => format!("{first} is in opposition"),
            EventKind::Conjunction => {
                format!("{first} and {} are in conjunction", self.object_name(1))
            }
            EventKind::Occultation => format!("{first} occults {}", self.object_name(1)),
            EventKind::MaximalElongation { degrees } => {
                format!("Elongation of {first} is maximal ({degrees:.1}°)")
            }
            EventKind::Apogee { distance_km } => {
                format!("{first} is at its apogee ({distance_km:.0} km)")
            }
            EventKind::Perigee { distance_km } => {
                format!("{first} is at its perigee ({distance_km:.0} km)")
            }
            EventKind::SeasonChange { season } => season.name().to_string(),
            EventKind::LunarEclipse {
                eclipse_type,
                maximum,
                ..
            } => format!(
                "{} lunar eclipse, maximum at {}",
                capitalize(eclipse_type.name()),
                maximum.format("%H:%M")
            ),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum Details<'a> {
    Elongation {
        deg: f64,
    },
    Distance {
        distance_km: f64,
    },
    Season {
        season: SeasonType,
    },
    Eclipse {
        #[serde(rename = "type")]
        eclipse_type: LunarEclipseType,
        maximum: &'a DateTime<FixedOffset>,
    },
}

impl Serialize for Event {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let details = match &self.kind {
            EventKind::MaximalElongation { degrees } => Some(Details::Elongation { deg: *degrees }),
            EventKind::Apogee { distance_km } | EventKind::Perigee { distance_km } => {
                Some(Details::Distance {
                    distance_km: *distance_km,
                })
            }
            EventKind::SeasonChange { season } => Some(Details::Season { season: *season }),
            EventKind::LunarEclipse {
                eclipse_type,
                maximum,
                ..
            } => Some(Details::Eclipse {
                eclipse_type: *eclipse_type,
                maximum,
            }),
            EventKind::Opposition | EventKind::Conjunction | EventKind::Occultation => None,
        };

        let mut state = serializer.serialize_struct("Event", 5)?;
        state.serialize_field("objects", &self.objects)?;
        state.serialize_field("EventType", &self.event_type())?;
        state.serialize_field("starts_at", &self.start_time)?;
        state.serialize_field("ends_at", &self.end_time())?;
        state.serialize_field("details", &details)?;
        state.end()
    }
}

/// Run `detectors` over `days` local days starting at `from`
fn collect<P: EphemerisProvider + ?Sized>(
    provider: &P,
    detectors: &[Detector],
    from: NaiveDate,
    days: i64,
    timezone: f64,
) -> Result<Vec<Event>> {
    let (start, end) = local_day_window(from, days, timezone)?;
    let mut events = Vec::new();
    for detector in detectors {
        let found = detector.run(provider, start, end, timezone)?;
        log::debug!("{:?} found {} events from {}", detector, found.len(), from);
        events.extend(found);
    }
    Ok(events)
}

/// Every event happening on the local day `for_date`, in the zone `timezone`
/// hours east of UTC, sorted by start time
///
/// Fails with `OutOfRangeDate` when the day is not covered by the ephemeris.
pub fn get_events<P: EphemerisProvider + ?Sized>(
    provider: &P,
    for_date: NaiveDate,
    timezone: f64,
) -> Result<Vec<Event>> {
    let mut events = collect(provider, &Detector::ALL, for_date, 1, timezone)
        .map_err(|error| error.with_date_range(timezone, 0))?;
    events.sort_by_key(|event| event.start_time);
    Ok(events)
}

/// Events of the requested kinds happening between the local days `start`
/// and `end` included, sorted by start time
///
/// Each detector producing one of the requested kinds runs once over the
/// whole range; identical events are reported once.
pub fn search_events<P: EphemerisProvider + ?Sized>(
    provider: &P,
    event_types: &[EventType],
    start: NaiveDate,
    end: NaiveDate,
    timezone: f64,
) -> Result<Vec<Event>> {
    if start > end {
        return Err(AlmanacError::InvalidDateRange { start, end });
    }

    let detectors: Vec<Detector> = Detector::ALL
        .into_iter()
        .filter(|detector| detector.produces().iter().any(|kind| event_types.contains(kind)))
        .collect();
    let days = (end - start).num_days() + 1;

    let found = collect(provider, &detectors, start, days, timezone)
        .map_err(|error| error.with_date_range(timezone, 0))?;

    let mut events: Vec<Event> = Vec::with_capacity(found.len());
    for event in found {
        if event_types.contains(&event.event_type()) && !events.contains(&event) {
            events.push(event);
        }
    }
    events.sort_by_key(|event| event.start_time);
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::celestial::get_aster;
    use crate::constants::{AU_KM, J2000};
    use crate::planetlib::analytic::{ecliptic, AnalyticSky};
    use crate::planetlib::Body;
    use crate::time::civil::translate_to_timezone;
    use chrono::{TimeZone, Utc};

    fn at(hour: u32, minute: u32) -> DateTime<FixedOffset> {
        let utc = Utc.with_ymd_and_hms(2021, 6, 9, hour, minute, 0).unwrap();
        translate_to_timezone(utc, 0.0).unwrap()
    }

    #[test]
    fn test_event_serialization() {
        let conjunction = Event {
            kind: EventKind::Conjunction,
            objects: vec![*get_aster(Body::Mercury), *get_aster(Body::Neptune)],
            start_time: at(1, 14),
        };
        let json = serde_json::to_value(&conjunction).unwrap();
        assert_eq!(json["EventType"], "CONJUNCTION");
        assert_eq!(json["objects"][1]["identifier"], "NEPTUNE");
        assert_eq!(json["starts_at"], "2021-06-09T01:14:00Z");
        assert!(json["ends_at"].is_null());
        assert!(json["details"].is_null());

        let eclipse = Event {
            kind: EventKind::LunarEclipse {
                eclipse_type: LunarEclipseType::Total,
                maximum: at(11, 18),
                end_time: at(13, 49),
            },
            objects: vec![*get_aster(Body::Moon)],
            start_time: at(8, 47),
        };
        let json = serde_json::to_value(&eclipse).unwrap();
        assert_eq!(json["ends_at"], "2021-06-09T13:49:00Z");
        assert_eq!(json["details"]["type"], "TOTAL");
        assert_eq!(json["details"]["maximum"], "2021-06-09T11:18:00Z");

        let apogee = Event {
            kind: EventKind::Apogee {
                distance_km: 406_211.0,
            },
            objects: vec![*get_aster(Body::Moon)],
            start_time: at(2, 39),
        };
        let json = serde_json::to_value(&apogee).unwrap();
        assert_eq!(json["details"], serde_json::json!({"distance_km": 406_211.0}));

        let season = Event {
            kind: EventKind::SeasonChange {
                season: SeasonType::JuneSolstice,
            },
            objects: vec![],
            start_time: at(3, 32),
        };
        let json = serde_json::to_value(&season).unwrap();
        assert_eq!(json["details"]["season"], "JUNE_SOLSTICE");
        assert_eq!(json["objects"], serde_json::json!([]));
    }

    #[test]
    fn test_descriptions() {
        let event = Event {
            kind: EventKind::Occultation,
            objects: vec![*get_aster(Body::Moon), *get_aster(Body::Mars)],
            start_time: at(12, 8),
        };
        assert_eq!(event.description(), "Moon occults Mars");
        assert_eq!(event.end_time(), None);

        let event = Event {
            kind: EventKind::MaximalElongation { degrees: 26.8 },
            objects: vec![*get_aster(Body::Mercury)],
            start_time: at(4, 13),
        };
        assert_eq!(event.description(), "Elongation of Mercury is maximal (26.8°)");

        let event = Event {
            kind: EventKind::LunarEclipse {
                eclipse_type: LunarEclipseType::Partial,
                maximum: at(21, 30),
                end_time: at(23, 59),
            },
            objects: vec![*get_aster(Body::Moon)],
            start_time: at(18, 39),
        };
        assert_eq!(event.description(), "Partial lunar eclipse, maximum at 21:30");
        assert_eq!(event.end_time(), Some(at(23, 59)));
    }

    /// Quiet sky: nothing moves, so no detector fires
    fn quiet_sky() -> AnalyticSky {
        let mut sky = AnalyticSky::new();
        for (i, body) in Body::ALL.into_iter().enumerate() {
            if !matches!(body, Body::Earth | Body::Sun) {
                sky = sky.with_body(body, move |_| ecliptic(30.0 * i as f64, 5.0, 3.0 * AU_KM));
            }
        }
        sky
    }

    #[test]
    fn test_invalid_range() {
        let start = NaiveDate::from_ymd_opt(2021, 1, 28).unwrap();
        let end = NaiveDate::from_ymd_opt(2021, 1, 26).unwrap();
        match search_events(&quiet_sky(), &EventType::ALL, start, end, 0.0) {
            Err(AlmanacError::InvalidDateRange { start: s, end: e }) => {
                assert_eq!((s, e), (start, end));
            }
            other => panic!("expected InvalidDateRange, got {other:?}"),
        }
    }

    #[test]
    fn test_quiet_day() {
        let date = NaiveDate::from_ymd_opt(2021, 6, 9).unwrap();
        assert!(get_events(&quiet_sky(), date, 0.0).unwrap().is_empty());
        assert!(search_events(&quiet_sky(), &EventType::ALL, date, date, 0.0)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_events_out_of_range() {
        // 1999-09-23 12:00 to 2000-04-10 12:00
        let sky = quiet_sky().with_coverage(J2000 - 100.0, J2000 + 100.0);
        let date = NaiveDate::from_ymd_opt(2021, 6, 9).unwrap();
        match get_events(&sky, date, 0.0) {
            Err(AlmanacError::OutOfRangeDate { min_date, max_date }) => {
                assert_eq!(min_date, NaiveDate::from_ymd_opt(1999, 9, 23).unwrap());
                assert_eq!(max_date, NaiveDate::from_ymd_opt(2000, 4, 10).unwrap());
            }
            other => panic!("expected OutOfRangeDate, got {other:?}"),
        }
    }

    /// The Moon crosses Jupiter at 09:14 UTC on 2021-06-09 and the Sun
    /// reaches the June solstice later that day
    fn busy_sky() -> AnalyticSky {
        let midnight = crate::time::Time::utc(2021, 6, 9, 0, 0, 0).unwrap();
        let day0 = midnight.tdb() - J2000;
        quiet_sky()
            .with_body(Body::Moon, move |days| {
                ecliptic(5.0 + 13.0 * (days - day0), 0.2, 384_400.0)
            })
            .with_body(Body::Jupiter, |_| ecliptic(10.0, 0.0, 5.0 * AU_KM))
            .with_body(Body::Sun, move |days| ecliptic(89.0 + (days - day0), 0.0, AU_KM))
    }

    #[test]
    fn test_search_filters_kinds() {
        let date = NaiveDate::from_ymd_opt(2021, 6, 9).unwrap();

        let all = get_events(&busy_sky(), date, 0.0).unwrap();
        let kinds: Vec<EventType> = all.iter().map(Event::event_type).collect();
        assert_eq!(kinds, vec![EventType::Occultation, EventType::SeasonChange]);

        let seasons =
            search_events(&busy_sky(), &[EventType::SeasonChange], date, date, 0.0).unwrap();
        assert_eq!(seasons.len(), 1);
        assert_eq!(seasons[0], all[1]);

        let kinds = [EventType::Occultation, EventType::Conjunction];
        let occultations = search_events(&busy_sky(), &kinds, date, date, 0.0).unwrap();
        assert_eq!(occultations, vec![all[0].clone()]);
        assert_eq!(
            occultations[0].objects,
            vec![*get_aster(Body::Moon), *get_aster(Body::Jupiter)]
        );
    }

    #[test]
    fn test_range_reports_each_event_once() {
        let start = NaiveDate::from_ymd_opt(2021, 6, 8).unwrap();
        let end = NaiveDate::from_ymd_opt(2021, 6, 10).unwrap();
        let events = search_events(&busy_sky(), &EventType::ALL, start, end, 0.0).unwrap();
        let kinds: Vec<EventType> = events.iter().map(Event::event_type).collect();
        assert_eq!(kinds, vec![EventType::Occultation, EventType::SeasonChange]);
        assert!(events.windows(2).all(|pair| pair[0].start_time <= pair[1].start_time));
    }
}
