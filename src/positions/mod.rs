//! Observer-relative positions of solar system bodies
//!
//! Mirrors the skyfield chain `observer.at(t).observe(body).apparent()`:
//! [`Observer::at`] gives a barycentric observer state, [`ObserverState::observe`]
//! applies light-time, [`Astrometric::apparent`] applies aberration, and the
//! result can be expressed as ecliptic coordinates or a local altitude.

use crate::constants::{C_KM_DAY, DAY_S, RAD2DEG};
use crate::earthlib::{gast, GeodeticSite};
use crate::framelib::{angle_between, rot_z, to_spherical, FramesOfDate, ICRF_TO_ECLIPTIC_J2000};
use crate::planetlib::{Body, EphemerisProvider, Result};
use crate::time::Time;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Geographic position of an observer on the Earth's surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Latitude in degrees, north positive
    pub latitude: f64,
    /// Longitude in degrees, east positive
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Topocentric observer standing at this position, at sea level
    pub fn observer(&self) -> Observer {
        Observer::Topocentric(GeodeticSite::new(self.latitude, self.longitude, 0.0))
    }
}

/// Where positions are reckoned from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Observer {
    /// The center of a body, usually the Earth
    Center(Body),
    /// A site on the Earth's surface
    Topocentric(GeodeticSite),
}

/// Barycentric state of an observer at one instant
#[derive(Debug, Clone, Copy)]
pub struct ObserverState {
    pub t: Time,
    /// ICRF position relative to the solar system barycenter (km)
    pub position: Vector3<f64>,
    /// ICRF velocity (km/day)
    pub velocity: Vector3<f64>,
    /// Body whose center the observer is at, or the Earth for surface sites
    pub center: Body,
    site: Option<(GeodeticSite, f64)>,
    frames: FramesOfDate,
}

impl Observer {
    /// Earth-centered observer
    pub const GEOCENTER: Observer = Observer::Center(Body::Earth);

    /// Compute the barycentric state of the observer at `t`
    pub fn at<P: EphemerisProvider + ?Sized>(
        &self,
        provider: &P,
        t: &Time,
    ) -> Result<ObserverState> {
        let frames = FramesOfDate::at(t);
        let center = match self {
            Observer::Center(body) => *body,
            Observer::Topocentric(_) => Body::Earth,
        };
        let mut position = provider.barycentric_position(center, t)?;
        let mut velocity = provider.barycentric_velocity(center, t)?;

        let site = match self {
            Observer::Center(_) => None,
            Observer::Topocentric(site) => {
                let sidereal = gast(t, &frames);
                let (offset, offset_velocity) = site.true_equator_state(sidereal);
                let to_icrf = frames.icrf_to_true_equator().transpose();
                position += to_icrf * offset;
                velocity += to_icrf * offset_velocity * DAY_S;
                Some((*site, sidereal))
            }
        };

        Ok(ObserverState {
            t: *t,
            position,
            velocity,
            center,
            site,
            frames,
        })
    }
}

impl ObserverState {
    /// Light-time corrected vector from the observer to `body`
    pub fn observe<P: EphemerisProvider + ?Sized>(
        &self,
        provider: &P,
        body: Body,
    ) -> Result<Astrometric> {
        let mut target = provider.barycentric_position(body, &self.t)?;
        let mut light_time = (target - self.position).norm() / C_KM_DAY;

        for _ in 0..10 {
            target = provider.barycentric_position(body, &(self.t - light_time))?;
            let updated = (target - self.position).norm() / C_KM_DAY;
            let converged = (updated - light_time).abs() < 1e-12;
            light_time = updated;
            if converged {
                break;
            }
        }

        Ok(Astrometric {
            vector: target - self.position,
            light_time,
            observer: *self,
        })
    }

    /// Position of `body` relative to the observer at the same instant,
    /// without light-time or aberration
    pub fn geometric<P: EphemerisProvider + ?Sized>(
        &self,
        provider: &P,
        body: Body,
    ) -> Result<Vector3<f64>> {
        Ok(provider.barycentric_position(body, &self.t)? - self.position)
    }
}

/// Astrometric position: light-time corrected, referred to the ICRF
#[derive(Debug, Clone, Copy)]
pub struct Astrometric {
    /// Observer to target (km)
    pub vector: Vector3<f64>,
    /// Light travel time in days
    pub light_time: f64,
    observer: ObserverState,
}

impl Astrometric {
    /// Distance to the target in km
    pub fn distance_km(&self) -> f64 {
        self.vector.norm()
    }

    /// Apply the aberration of light due to the observer's velocity
    pub fn apparent(&self) -> Apparent {
        let distance = self.vector.norm();
        let beta = self.observer.velocity / C_KM_DAY;
        let direction = (self.vector / distance + beta).normalize();
        Apparent {
            vector: direction * distance,
            observer: self.observer,
        }
    }
}

/// Ecliptic coordinates in radians plus distance in km
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EclipticLatLon {
    pub latitude: f64,
    /// Longitude in [0, 2π)
    pub longitude: f64,
    pub distance: f64,
}

impl EclipticLatLon {
    fn from_vector(v: &Vector3<f64>) -> Self {
        let (latitude, longitude, distance) = to_spherical(v);
        Self {
            latitude,
            longitude,
            distance,
        }
    }

    /// Longitude in degrees, range [0, 360)
    pub fn longitude_degrees(&self) -> f64 {
        self.longitude * RAD2DEG
    }
}

/// Apparent position as seen by the observer
#[derive(Debug, Clone, Copy)]
pub struct Apparent {
    /// Observer to target in km, direction corrected for aberration
    pub vector: Vector3<f64>,
    observer: ObserverState,
}

impl Apparent {
    pub fn distance_km(&self) -> f64 {
        self.vector.norm()
    }

    /// Coordinates on the ecliptic and equinox of J2000
    pub fn ecliptic_latlon(&self) -> EclipticLatLon {
        EclipticLatLon::from_vector(&(*ICRF_TO_ECLIPTIC_J2000 * self.vector))
    }

    /// Coordinates on the true ecliptic and equinox of date
    pub fn ecliptic_latlon_of_date(&self) -> EclipticLatLon {
        let rotation = self.observer.frames.icrf_to_ecliptic_of_date();
        EclipticLatLon::from_vector(&(rotation * self.vector))
    }

    /// Altitude above the local horizon in degrees, without refraction
    ///
    /// Returns `None` for observers that are not on the Earth's surface.
    pub fn altitude(&self) -> Option<f64> {
        let (site, sidereal) = self.observer.site?;
        let true_equator = self.observer.frames.icrf_to_true_equator() * self.vector;
        let terrestrial = rot_z(sidereal) * true_equator;
        let sin_alt = site.zenith().dot(&terrestrial) / terrestrial.norm();
        Some(sin_alt.clamp(-1.0, 1.0).asin() * RAD2DEG)
    }

    /// Angle to another apparent position, in radians
    pub fn separation_from(&self, other: &Apparent) -> f64 {
        angle_between(&self.vector, &other.vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::AU_KM;
    use crate::planetlib::EphemerisError;
    use approx::assert_abs_diff_eq;

    /// Earth on a circular orbit in the ICRF equator plane, Sun fixed at the
    /// barycenter, Moon hovering above the Earth's north pole
    struct StaticSky;

    impl EphemerisProvider for StaticSky {
        fn barycentric_position(&self, body: Body, t: &Time) -> Result<Vector3<f64>> {
            let days = t.tdb() - 2_451_545.0;
            if days.abs() > 1000.0 {
                return Err(EphemerisError::Coverage {
                    start_jd: 2_451_545.0 - 1000.0,
                    end_jd: 2_451_545.0 + 1000.0,
                });
            }
            let earth_angle = days / 365.25 * std::f64::consts::TAU;
            let earth = Vector3::new(earth_angle.cos(), earth_angle.sin(), 0.0) * AU_KM;
            Ok(match body {
                Body::Sun => Vector3::zeros(),
                Body::Earth => earth,
                _ => earth + Vector3::new(0.0, 0.0, 3.8e5),
            })
        }

        fn coverage(&self) -> (Time, Time) {
            (
                Time::from_tdb_jd(2_451_545.0 - 1000.0),
                Time::from_tdb_jd(2_451_545.0 + 1000.0),
            )
        }
    }

    #[test]
    fn test_light_time_to_sun() {
        let t = Time::from_tt_jd(2_451_545.0);
        let state = Observer::GEOCENTER.at(&StaticSky, &t).unwrap();
        let astrometric = state.observe(&StaticSky, Body::Sun).unwrap();
        assert_abs_diff_eq!(astrometric.light_time * DAY_S, 499.0, epsilon = 0.1);
        assert_abs_diff_eq!(astrometric.distance_km(), AU_KM, epsilon = 1e-3);
    }

    #[test]
    fn test_annual_aberration_magnitude() {
        // Earth moves at ~29.8 km/s, shifting the apparent Sun by ~20.5"
        let t = Time::from_tt_jd(2_451_545.0);
        let state = Observer::GEOCENTER.at(&StaticSky, &t).unwrap();
        let astrometric = state.observe(&StaticSky, Body::Sun).unwrap();
        let apparent = astrometric.apparent();
        let shift = angle_between(&astrometric.vector, &apparent.vector).to_degrees() * 3600.0;
        assert_abs_diff_eq!(shift, 20.5, epsilon = 0.3);
        assert_abs_diff_eq!(apparent.distance_km(), astrometric.distance_km(), epsilon = 1e-6);
    }

    #[test]
    fn test_ecliptic_longitude_of_sun() {
        // Earth at ICRF longitude 0 sees the Sun near 180°
        let t = Time::from_tt_jd(2_451_545.0);
        let state = Observer::GEOCENTER.at(&StaticSky, &t).unwrap();
        let sun = state.observe(&StaticSky, Body::Sun).unwrap().apparent();
        assert_abs_diff_eq!(sun.ecliptic_latlon().longitude_degrees(), 180.0, epsilon = 0.02);
        let of_date = sun.ecliptic_latlon_of_date();
        assert_abs_diff_eq!(of_date.longitude_degrees(), 180.0, epsilon = 0.02);
        assert!(sun.altitude().is_none());
    }

    #[test]
    fn test_altitude_of_polar_target() {
        // a target far above the north pole stands at the observer's latitude,
        // lowered by its parallax of about 0.6°
        let t = Time::from_tt_jd(2_451_545.0);
        let state = Position::new(48.0, 2.0).observer().at(&StaticSky, &t).unwrap();
        let moon = state.observe(&StaticSky, Body::Moon).unwrap().apparent();
        let altitude = moon.altitude().unwrap();
        assert!((altitude - 47.4).abs() < 0.3, "altitude {altitude}");
    }

    #[test]
    fn test_position_serde() {
        let position = Position::new(50.5824, 3.0624);
        let json = serde_json::to_string(&position).unwrap();
        assert_eq!(json, r#"{"latitude":50.5824,"longitude":3.0624}"#);
        let back: Position = serde_json::from_str(&json).unwrap();
        assert_eq!(back, position);
    }
}
