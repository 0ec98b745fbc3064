//! Reference checks against the DE421 kernel.
//!
//! Expected instants come from skyfield runs on the same kernel. Times of
//! day are compared within two minutes and distances within a few hundred
//! kilometres: light deflection and frame bias are not modelled here.
//!
//! The kernel is looked up the way `Loader` does it. Without one, every
//! test prints a skip message and passes.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use sky_almanac::almanac::{LunarEclipseType, SeasonType};
use sky_almanac::events::EventKind;
use sky_almanac::{
    get_ephemerides, get_events, get_moon_phase, search_events, AlmanacError, Body, Event,
    EventType, Loader, MoonPhaseType, Position, SpkEphemeris,
};

const MINUTE_S: i64 = 60;

fn ephemeris() -> Option<SpkEphemeris> {
    match Loader::new().load_ephemeris() {
        Ok(ephemeris) => Some(ephemeris),
        Err(e) => {
            eprintln!("Skipping DE421 reference tests: {e}");
            None
        }
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// `"2021-06-09 03:36:00"` in the zone `hours` east of UTC
fn at(text: &str, hours: i32) -> DateTime<FixedOffset> {
    let naive = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").unwrap();
    FixedOffset::east_opt(hours * 3600)
        .unwrap()
        .from_local_datetime(&naive)
        .unwrap()
}

/// Events of one kind on one UTC day
fn search_day(ephemeris: &SpkEphemeris, kind: EventType, day: NaiveDate) -> Vec<Event> {
    search_events(ephemeris, &[kind], day, day, 0.0).unwrap()
}

fn assert_close(actual: Option<DateTime<FixedOffset>>, expected: &str, hours: i32, minutes: i64) {
    let expected = at(expected, hours);
    let actual = actual.unwrap_or_else(|| panic!("expected a time near {expected}"));
    let gap = (actual - expected).num_seconds().abs();
    assert!(gap <= minutes * MINUTE_S, "{actual} is {gap} s away from {expected}");
    assert_eq!(actual.offset(), expected.offset());
}

#[test]
fn test_sun_ephemerides() {
    let Some(ephemeris) = ephemeris() else { return };
    let position = Position::new(36.6794, 4.8555);

    let ephemerides = get_ephemerides(&ephemeris, &position, date(2022, 7, 7), 0.0).unwrap();
    assert_eq!(ephemerides.len(), 10);
    let sun = &ephemerides[0];
    assert_eq!(sun.object.identifier, Body::Sun);
    assert_close(sun.rise_time, "2022-07-07 04:29:00", 0, 2);
    assert_close(sun.culmination_time, "2022-07-07 11:46:00", 0, 2);
    assert_close(sun.set_time, "2022-07-07 19:02:00", 0, 2);

    let shifted = get_ephemerides(&ephemeris, &position, date(2022, 7, 7), 2.0).unwrap();
    assert_close(shifted[0].rise_time, "2022-07-07 06:29:00", 2, 2);
    assert_close(shifted[2].culmination_time, "2022-07-07 12:58:00", 2, 2);
}

#[test]
fn test_sun_over_lille() {
    let Some(ephemeris) = ephemeris() else { return };
    let position = Position::new(50.5824, 3.0624);

    let ephemerides = get_ephemerides(&ephemeris, &position, date(2021, 6, 9), 0.0).unwrap();
    let sun = &ephemerides[0];
    assert_eq!(sun.object.identifier, Body::Sun);
    assert_close(sun.rise_time, "2021-06-09 03:36:00", 0, 2);
    assert_close(sun.culmination_time, "2021-06-09 11:47:00", 0, 2);
    assert_close(sun.set_time, "2021-06-09 19:58:00", 0, 2);
}

#[test]
fn test_midnight_sun() {
    let Some(ephemeris) = ephemeris() else { return };
    let position = Position::new(70.0, 20.0);
    let ephemerides = get_ephemerides(&ephemeris, &position, date(2021, 6, 20), 0.0).unwrap();
    let sun = &ephemerides[0];
    assert_eq!(sun.rise_time, None);
    assert_eq!(sun.set_time, None);
    assert_close(sun.culmination_time, "2021-06-20 10:42:00", 0, 2);
}

#[test]
fn test_moon_phase() {
    let Some(ephemeris) = ephemeris() else { return };

    let phase = get_moon_phase(&ephemeris, date(2021, 3, 27), 0.0).unwrap();
    assert_eq!(phase.phase_type, MoonPhaseType::WaxingGibbous);
    assert_eq!(phase.time, None);
    assert_close(phase.next_phase_date, "2021-03-28 18:48:10", 0, 1);

    let full = get_moon_phase(&ephemeris, date(2021, 3, 28), 0.0).unwrap();
    assert_eq!(full.phase_type, MoonPhaseType::FullMoon);
    assert_close(full.time, "2021-03-28 18:48:10", 0, 1);
    assert_close(full.next_phase_date, "2021-04-04 10:02:27", 0, 1);

    let shifted = get_moon_phase(&ephemeris, date(2021, 3, 27), 2.0).unwrap();
    assert_close(shifted.next_phase_date, "2021-03-28 20:48:10", 2, 1);
}

#[test]
fn test_conjunction_across_timezones() {
    let Some(ephemeris) = ephemeris() else { return };

    for (day, hours, expected) in [
        (date(2020, 4, 4), 0, "2020-04-04 01:14:39"),
        (date(2020, 4, 4), 2, "2020-04-04 03:14:39"),
        (date(2020, 4, 3), -2, "2020-04-03 23:14:39"),
    ] {
        let events = get_events(&ephemeris, day, hours as f64).unwrap();
        assert_eq!(events.len(), 1, "{events:?}");
        assert_eq!(events[0].kind, EventKind::Conjunction);
        let names: Vec<Body> = events[0].objects.iter().map(|o| o.identifier).collect();
        assert_eq!(names, vec![Body::Mercury, Body::Neptune]);
        assert_close(Some(events[0].start_time), expected, hours, 1);
    }

    assert!(get_events(&ephemeris, date(2021, 4, 20), 0.0).unwrap().is_empty());
}

#[test]
fn test_occultation_of_mars() {
    let Some(ephemeris) = ephemeris() else { return };
    let events = search_day(&ephemeris, EventType::Occultation, date(2021, 4, 17));
    assert_eq!(events.len(), 1, "{events:?}");
    let names: Vec<Body> = events[0].objects.iter().map(|o| o.identifier).collect();
    assert_eq!(names, vec![Body::Moon, Body::Mars]);
    assert_close(Some(events[0].start_time), "2021-04-17 12:08:16", 0, 2);
}

#[test]
fn test_maximal_elongation_of_mercury() {
    let Some(ephemeris) = ephemeris() else { return };
    let events = get_events(&ephemeris, date(2021, 9, 14), 0.0).unwrap();
    assert_eq!(events.len(), 1, "{events:?}");
    assert_eq!(events[0].kind, EventKind::MaximalElongation { degrees: 26.8 });
    assert_close(Some(events[0].start_time), "2021-09-14 04:13:46", 0, 2);
    assert_eq!(events[0].description(), "Elongation of Mercury is maximal (26.8°)");
}

#[test]
fn test_opposition_of_mars() {
    let Some(ephemeris) = ephemeris() else { return };
    let oppositions = search_day(&ephemeris, EventType::Opposition, date(2020, 10, 13));
    assert_eq!(oppositions.len(), 1, "{oppositions:?}");
    assert_eq!(oppositions[0].objects[0].identifier, Body::Mars);

    for day in [date(2021, 3, 20), date(2022, 12, 24)] {
        let none = search_events(&ephemeris, &[EventType::Opposition], day, day, 0.0).unwrap();
        assert!(none.is_empty(), "{none:?}");
    }
}

#[test]
fn test_apogees_and_perigees() {
    let Some(ephemeris) = ephemeris() else { return };
    use EventType::{Apogee, Perigee};
    let cases = [
        (Apogee, date(2021, 6, 8), Body::Moon, "2021-06-08 02:39:40", 406_211.0, 100.0),
        (Apogee, date(2021, 7, 5), Body::Earth, "2021-07-05 22:35:42", 152_100_522.0, 5_000.0),
        (Perigee, date(2021, 5, 26), Body::Moon, "2021-05-26 01:56:01", 357_314.0, 100.0),
        (Perigee, date(2021, 1, 2), Body::Earth, "2021-01-02 13:59:00", 147_093_166.0, 5_000.0),
    ];
    for (kind, day, body, expected, distance, tolerance) in cases {
        let events = search_day(&ephemeris, kind, day);
        let event = events
            .iter()
            .find(|e| e.objects[0].identifier == body)
            .unwrap_or_else(|| panic!("no {kind:?} of {body} on {day}: {events:?}"));
        // the Earth's distance is flat enough near an apsis for minutes to blur
        let minutes = if body == Body::Earth { 60 } else { 5 };
        assert_close(Some(event.start_time), expected, 0, minutes);
        let found = match event.kind {
            EventKind::Apogee { distance_km } | EventKind::Perigee { distance_km } => distance_km,
            ref other => panic!("unexpected {other:?}"),
        };
        assert!((found - distance).abs() < tolerance, "{found} km");
    }
}

#[test]
fn test_june_solstice() {
    let Some(ephemeris) = ephemeris() else { return };
    let changes = search_day(&ephemeris, EventType::SeasonChange, date(2020, 6, 20));
    assert_eq!(changes.len(), 1);
    assert_eq!(
        changes[0].kind,
        EventKind::SeasonChange {
            season: SeasonType::JuneSolstice
        }
    );
    assert!(changes[0].objects.is_empty());

    let none = search_day(&ephemeris, EventType::SeasonChange, date(2021, 6, 17));
    assert!(none.is_empty());
}

#[test]
fn test_lunar_eclipses() {
    let Some(ephemeris) = ephemeris() else { return };
    let cases = [
        (
            date(2021, 5, 26),
            LunarEclipseType::Total,
            ("2021-05-26 08:47:54", "2021-05-26 11:18:42", "2021-05-26 13:49:34"),
        ),
        (
            date(2019, 7, 16),
            LunarEclipseType::Partial,
            ("2019-07-16 18:39:53", "2019-07-16 21:30:44", "2019-07-17 00:21:51"),
        ),
        (
            date(2017, 2, 11),
            LunarEclipseType::Penumbral,
            ("2017-02-10 22:02:59", "2017-02-11 00:43:51", "2017-02-11 03:25:07"),
        ),
    ];

    for (day, expected_type, (start, maximum, end)) in cases {
        let events = search_events(&ephemeris, &[EventType::LunarEclipse], day, day, 0.0).unwrap();
        assert_eq!(events.len(), 1, "{events:?}");
        let event = &events[0];
        match &event.kind {
            EventKind::LunarEclipse {
                eclipse_type,
                maximum: found_maximum,
                end_time,
            } => {
                assert_eq!(*eclipse_type, expected_type);
                assert_close(Some(*found_maximum), maximum, 0, 2);
                assert_close(Some(*end_time), end, 0, 3);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_close(Some(event.start_time), start, 0, 3);
    }
}

#[test]
fn test_search_over_days() {
    let Some(ephemeris) = ephemeris() else { return };

    let (start, end) = (date(2020, 1, 27), date(2020, 1, 29));
    let apogees = search_events(&ephemeris, &[EventType::Apogee], start, end, -6.0).unwrap();
    assert_eq!(apogees.len(), 1, "{apogees:?}");
    assert_close(Some(apogees[0].start_time), "2020-01-29 15:32:13", -6, 2);

    let kinds = [EventType::Opposition, EventType::Conjunction];
    let day = date(2021, 1, 28);
    let single_day = search_events(&ephemeris, &kinds, day, day, 0.0).unwrap();
    assert_eq!(single_day.len(), 1, "{single_day:?}");
    let names: Vec<Body> = single_day[0].objects.iter().map(|o| o.identifier).collect();
    assert_eq!(names, vec![Body::Venus, Body::Pluto]);
    assert_close(Some(single_day[0].start_time), "2021-01-28 16:18:05", 0, 2);

    let quiet = [
        EventType::Opposition,
        EventType::Conjunction,
        EventType::SeasonChange,
        EventType::LunarEclipse,
    ];
    assert!(search_events(&ephemeris, &quiet, date(2021, 5, 14), date(2021, 5, 15), 0.0)
        .unwrap()
        .is_empty());
}

#[test]
fn test_dates_outside_the_kernel() {
    let Some(ephemeris) = ephemeris() else { return };
    let far = date(1000, 1, 1);

    let bounds = |error: AlmanacError| match error {
        AlmanacError::OutOfRangeDate { min_date, max_date } => (min_date, max_date),
        other => panic!("expected OutOfRangeDate, got {other:?}"),
    };

    let (min, max) = bounds(get_events(&ephemeris, far, 0.0).unwrap_err());
    assert!((date(1899, 7, 28)..=date(1899, 7, 29)).contains(&min), "{min}");
    assert!((date(2053, 10, 8)..=date(2053, 10, 9)).contains(&max), "{max}");

    let position = Position::new(50.5824, 3.0624);
    let (ephemerides_min, ephemerides_max) =
        bounds(get_ephemerides(&ephemeris, &position, far, 0.0).unwrap_err());
    assert_eq!(ephemerides_min, min + chrono::Duration::days(1));
    assert_eq!(ephemerides_max, max - chrono::Duration::days(1));

    let (phase_min, phase_max) = bounds(get_moon_phase(&ephemeris, far, 0.0).unwrap_err());
    assert_eq!(phase_min, min + chrono::Duration::days(12));
    assert_eq!(phase_max, max - chrono::Duration::days(12));

    let kinds = [EventType::Conjunction];
    let error = search_events(&ephemeris, &kinds, far, date(1000, 1, 2), 0.0).unwrap_err();
    assert!(matches!(error, AlmanacError::OutOfRangeDate { .. }));
}

#[test]
fn test_reversed_range() {
    let Some(ephemeris) = ephemeris() else { return };
    let error = search_events(
        &ephemeris,
        &[EventType::Opposition, EventType::Conjunction],
        date(2021, 1, 28),
        date(2021, 1, 26),
        0.0,
    )
    .unwrap_err();
    assert_eq!(
        error.to_string(),
        "The start date (2021-01-28) must be before the end date (2021-01-26)"
    );
}
