//! Closed-form skies for unit tests that must not depend on a kernel

use super::{Body, EphemerisError, EphemerisProvider, Result};
use crate::constants::{AU_KM, DEG2RAD, J2000};
use crate::framelib::ICRF_TO_ECLIPTIC_J2000;
use crate::time::Time;
use nalgebra::Vector3;

/// Position as a function of TDB days since J2000
pub(crate) type Track = Box<dyn Fn(f64) -> Vector3<f64>>;

/// A provider whose bodies follow arbitrary closures
///
/// The Earth is barycentric; every other body is given relative to the
/// Earth. An unlisted Sun sits at the barycenter.
pub(crate) struct AnalyticSky {
    earth: Track,
    bodies: Vec<(Body, Track)>,
    start_jd: f64,
    end_jd: f64,
}

impl AnalyticSky {
    /// Earth at rest one AU from the Sun along the ICRF x axis
    pub(crate) fn new() -> Self {
        Self {
            earth: Box::new(|_| Vector3::new(AU_KM, 0.0, 0.0)),
            bodies: Vec::new(),
            start_jd: J2000 - 20_000.0,
            end_jd: J2000 + 20_000.0,
        }
    }

    pub(crate) fn with_earth(mut self, track: impl Fn(f64) -> Vector3<f64> + 'static) -> Self {
        self.earth = Box::new(track);
        self
    }

    pub(crate) fn with_body(
        mut self,
        body: Body,
        track: impl Fn(f64) -> Vector3<f64> + 'static,
    ) -> Self {
        self.bodies.retain(|(listed, _)| *listed != body);
        self.bodies.push((body, Box::new(track)));
        self
    }

    pub(crate) fn with_coverage(mut self, start_jd: f64, end_jd: f64) -> Self {
        self.start_jd = start_jd;
        self.end_jd = end_jd;
        self
    }
}

impl EphemerisProvider for AnalyticSky {
    fn barycentric_position(&self, body: Body, t: &Time) -> Result<Vector3<f64>> {
        let jd = t.tdb();
        if jd < self.start_jd || jd > self.end_jd {
            return Err(EphemerisError::Coverage {
                start_jd: self.start_jd,
                end_jd: self.end_jd,
            });
        }

        let days = jd - J2000;
        let earth = (self.earth)(days);
        if body == Body::Earth {
            return Ok(earth);
        }
        match self.bodies.iter().find(|(listed, _)| *listed == body) {
            Some((_, track)) => Ok(earth + track(days)),
            None if body == Body::Sun => Ok(Vector3::zeros()),
            None => Err(EphemerisError::MissingBody(body)),
        }
    }

    fn coverage(&self) -> (Time, Time) {
        (Time::from_tdb_jd(self.start_jd), Time::from_tdb_jd(self.end_jd))
    }
}

/// ICRF vector toward J2000 ecliptic `lon`, `lat` (degrees)
pub(crate) fn ecliptic(lon: f64, lat: f64, distance_km: f64) -> Vector3<f64> {
    let (lon, lat) = (lon * DEG2RAD, lat * DEG2RAD);
    let ecliptic = Vector3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin());
    ICRF_TO_ECLIPTIC_J2000.transpose() * ecliptic * distance_km
}

/// ICRF vector toward right ascension `ra`, declination `dec` (degrees)
pub(crate) fn equatorial(ra: f64, dec: f64, distance_km: f64) -> Vector3<f64> {
    let (ra, dec) = (ra * DEG2RAD, dec * DEG2RAD);
    Vector3::new(dec.cos() * ra.cos(), dec.cos() * ra.sin(), dec.sin()) * distance_km
}
