//! Almanac predicates: seasons and lunar eclipses
//!
//! Both follow skyfield: `almanac.seasons` for the cardinal points and
//! `eclipselib.lunar_eclipses` for the Earth shadow geometry.

use crate::constants::{DAY_S, EARTH_RADIUS_KM, ECLIPSE_MOON_RADIUS_KM, ECLIPSE_SUN_RADIUS_KM, TAU};
use crate::framelib::angle_between;
use crate::planetlib::{Body, EphemerisProvider, Result};
use crate::positions::Observer;
use crate::searchlib::{find_minima, Observable};
use crate::time::Time;
use serde::Serialize;

/// One of the four cardinal points of the Sun's ecliptic longitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeasonType {
    MarchEquinox = 0,
    JuneSolstice = 1,
    SeptemberEquinox = 2,
    DecemberSolstice = 3,
}

impl SeasonType {
    fn from_quadrant(quadrant: u8) -> Self {
        match quadrant % 4 {
            0 => SeasonType::MarchEquinox,
            1 => SeasonType::JuneSolstice,
            2 => SeasonType::SeptemberEquinox,
            _ => SeasonType::DecemberSolstice,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SeasonType::MarchEquinox => "March equinox",
            SeasonType::JuneSolstice => "June solstice",
            SeasonType::SeptemberEquinox => "September equinox",
            SeasonType::DecemberSolstice => "December solstice",
        }
    }
}

/// Severity of a lunar eclipse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LunarEclipseType {
    Penumbral = 0,
    Partial = 1,
    Total = 2,
}

impl LunarEclipseType {
    pub fn name(&self) -> &'static str {
        match self {
            LunarEclipseType::Penumbral => "penumbral",
            LunarEclipseType::Partial => "partial",
            LunarEclipseType::Total => "total",
        }
    }
}

/// Season in effect at each instant: which quarter of the apparent ecliptic
/// of date the Sun is in
pub fn seasons<P: EphemerisProvider + ?Sized>(
    provider: &P,
) -> Observable<impl Fn(&Time) -> Result<SeasonType> + '_> {
    Observable::new(90.0, move |t: &Time| {
        let sun = Observer::GEOCENTER
            .at(provider, t)?
            .observe(provider, Body::Sun)?
            .apparent()
            .ecliptic_latlon_of_date();
        let quadrant = (sun.longitude / (TAU / 4.0)).floor() as u8;
        Ok(SeasonType::from_quadrant(quadrant))
    })
}

/// A lunar eclipse at its maximum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LunarEclipse {
    /// Instant of closest approach of the Moon to the shadow axis
    pub time: Time,
    pub eclipse_type: LunarEclipseType,
    /// Angular distance of the Moon from the shadow axis (radians)
    pub closest_approach: f64,
    /// Angular radius of the Moon (radians)
    pub moon_radius: f64,
    /// Angular radius of the penumbra (radians)
    pub penumbra_radius: f64,
    /// Angular radius of the umbra (radians)
    pub umbra_radius: f64,
}

/// Geometric Earth-to-Sun and Moon-to-Earth vectors at `t`
fn shadow_vectors<P: EphemerisProvider + ?Sized>(
    provider: &P,
    t: &Time,
) -> Result<(nalgebra::Vector3<f64>, nalgebra::Vector3<f64>)> {
    let earth = provider.barycentric_position(Body::Earth, t)?;
    let moon = provider.barycentric_position(Body::Moon, t)?;
    let sun = provider.barycentric_position(Body::Sun, t)?;
    Ok((sun - earth, earth - moon))
}

/// Classify the eclipse, if any, happening at a shadow-axis minimum
fn classify<P: EphemerisProvider + ?Sized>(provider: &P, t: Time) -> Result<Option<LunarEclipse>> {
    let (earth_to_sun, moon_to_earth) = shadow_vectors(provider, &t)?;
    let moon_distance = moon_to_earth.norm();
    let sun_distance = earth_to_sun.norm();

    let pi_m = EARTH_RADIUS_KM / moon_distance;
    let pi_s = EARTH_RADIUS_KM / sun_distance;
    let s_s = ECLIPSE_SUN_RADIUS_KM / sun_distance;
    let pi_1 = 0.998_340 * pi_m;

    let sigma = angle_between(&earth_to_sun, &moon_to_earth);
    let s_m = ECLIPSE_MOON_RADIUS_KM / moon_distance;

    // 1% atmospheric enlargement of the shadow
    let penumbra_radius = 1.01 * pi_1 + pi_s + s_s;
    let umbra_radius = 1.01 * pi_1 + pi_s - s_s;

    let eclipse_type = if sigma < umbra_radius - s_m {
        LunarEclipseType::Total
    } else if sigma < umbra_radius + s_m {
        LunarEclipseType::Partial
    } else if sigma < penumbra_radius + s_m {
        LunarEclipseType::Penumbral
    } else {
        return Ok(None);
    };

    Ok(Some(LunarEclipse {
        time: t,
        eclipse_type,
        closest_approach: sigma,
        moon_radius: s_m,
        penumbra_radius,
        umbra_radius,
    }))
}

/// Find the lunar eclipses whose maximum falls between `start` and `end`
pub fn lunar_eclipses<P: EphemerisProvider + ?Sized>(
    start: Time,
    end: Time,
    provider: &P,
) -> Result<Vec<LunarEclipse>> {
    // step of five days, well under half a synodic month
    let axis_distance = Observable::new(60.0, |t: &Time| -> Result<f64> {
        let (earth_to_sun, moon_to_earth) = shadow_vectors(provider, t)?;
        Ok(angle_between(&earth_to_sun, &moon_to_earth))
    });

    let minima = find_minima(start, end, &axis_distance, 1.0 / DAY_S)?;
    let mut eclipses = Vec::new();
    for (t, _) in minima {
        if let Some(eclipse) = classify(provider, t)? {
            eclipses.push(eclipse);
        }
    }
    Ok(eclipses)
}
