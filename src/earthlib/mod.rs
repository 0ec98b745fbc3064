//! Earth rotation and terrestrial positions
//!
//! Sidereal time follows IERS Conventions 2010 (eq. 5.15 for the Earth
//! Rotation Angle, eq. 5.32 for GMST). Polar motion is ignored, so the
//! terrestrial frame is tied to the true equator of date by a single rotation
//! through Greenwich apparent sidereal time.

use crate::constants::{ASEC2RAD, J2000, TAU, WGS84_INVERSE_FLATTENING, WGS84_RADIUS_KM};
use crate::framelib::{rot_z, FramesOfDate};
use crate::time::Time;
use nalgebra::Vector3;

/// Earth's rotation rate in radians per second (IERS nominal value)
pub const ANGVEL: f64 = 7.292_115e-5;

/// Earth Rotation Angle in radians, range [0, 2π)
pub fn earth_rotation_angle(t: &Time) -> f64 {
    // keep the day fraction apart so that the large whole-day term stays exact
    let days = t.whole() - J2000;
    let fraction = t.ut1_fraction();
    let cycles = 0.779_057_273_264_0 + 0.002_737_811_911_354_48 * (days + fraction) + fraction;
    (cycles.rem_euclid(1.0) + days.rem_euclid(1.0)).rem_euclid(1.0) * TAU
}

/// Greenwich Mean Sidereal Time in radians, range [0, 2π)
pub fn gmst(t: &Time) -> f64 {
    let c = t.tt_centuries();
    let poly_arcsec = (((((-0.000_000_036_8 * c - 0.000_029_956) * c - 0.000_000_44) * c
        + 1.391_581_7)
        * c
        + 4612.156_534)
        * c)
        + 0.014_506;
    (earth_rotation_angle(t) + poly_arcsec * ASEC2RAD).rem_euclid(TAU)
}

/// Greenwich Apparent Sidereal Time in radians, range [0, 2π)
pub fn gast(t: &Time, frames: &FramesOfDate) -> f64 {
    (gmst(t) + frames.equation_of_equinoxes()).rem_euclid(TAU)
}

/// Geodetic site on the WGS84 ellipsoid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodeticSite {
    /// Latitude in degrees, north positive
    pub latitude: f64,
    /// Longitude in degrees, east positive
    pub longitude: f64,
    /// Height above the ellipsoid in meters
    pub elevation: f64,
}

impl GeodeticSite {
    pub fn new(latitude: f64, longitude: f64, elevation: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation,
        }
    }

    /// Earth-fixed position of the site in km
    pub fn terrestrial_position(&self) -> Vector3<f64> {
        let f = 1.0 / WGS84_INVERSE_FLATTENING;
        let e2 = f * (2.0 - f);
        let (sin_lat, cos_lat) = self.latitude.to_radians().sin_cos();
        let (sin_lon, cos_lon) = self.longitude.to_radians().sin_cos();
        let height = self.elevation / 1000.0;

        let n = WGS84_RADIUS_KM / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        Vector3::new(
            (n + height) * cos_lat * cos_lon,
            (n + height) * cos_lat * sin_lon,
            (n * (1.0 - e2) + height) * sin_lat,
        )
    }

    /// Earth-fixed unit normal to the ellipsoid at the site
    pub fn zenith(&self) -> Vector3<f64> {
        let (sin_lat, cos_lat) = self.latitude.to_radians().sin_cos();
        let (sin_lon, cos_lon) = self.longitude.to_radians().sin_cos();
        Vector3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat)
    }

    /// Position (km) and velocity (km/s) of the site relative to the geocenter,
    /// referred to the true equator and equinox of date
    pub fn true_equator_state(&self, gast: f64) -> (Vector3<f64>, Vector3<f64>) {
        let position = rot_z(-gast) * self.terrestrial_position();
        let velocity = Vector3::new(-position.y, position.x, 0.0) * ANGVEL;
        (position, velocity)
    }
}
