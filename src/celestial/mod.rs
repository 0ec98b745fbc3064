//! Celestial body definitions: the registry of observable objects

use crate::constants::{
    JUPITER_RADIUS_KM, MARS_RADIUS_KM, MERCURY_RADIUS_KM, MOON_RADIUS_KM, NEPTUNE_RADIUS_KM,
    PLUTO_RADIUS_KM, SATURN_RADIUS_KM, SUN_RADIUS_KM, URANUS_RADIUS_KM, VENUS_RADIUS_KM,
};
use crate::errors::{AlmanacError, Result};
use crate::planetlib::{Body, EphemerisProvider};
use crate::positions::{Apparent, ObserverState};
use serde::Serialize;

/// Kind of celestial object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectCategory {
    Star,
    Planet,
    DwarfPlanet,
    Satellite,
}

/// A tracked object of the solar system
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Object {
    pub identifier: Body,
    #[serde(rename = "type")]
    pub category: ObjectCategory,
    /// Physical radius in km, when known
    pub radius: Option<f64>,
}

/// A trait for objects that have a position in the sky
pub trait CelestialObject {
    /// Apparent position of the object as seen by `observer`
    fn position_at<P: EphemerisProvider + ?Sized>(
        &self,
        provider: &P,
        observer: &ObserverState,
    ) -> Result<Apparent>;
}

impl Object {
    pub const fn new(identifier: Body, category: ObjectCategory, radius: Option<f64>) -> Self {
        Self {
            identifier,
            category,
            radius,
        }
    }

    pub fn name(&self) -> &'static str {
        self.identifier.name()
    }

    /// Angular radius in radians of the disk seen from `distance_km`
    pub fn apparent_radius(&self, distance_km: f64) -> Result<f64> {
        let radius = self
            .radius
            .ok_or(AlmanacError::MissingPhysicalProperty(self.identifier))?;
        Ok(2.0 * (radius / distance_km).asin())
    }
}

impl CelestialObject for Object {
    fn position_at<P: EphemerisProvider + ?Sized>(
        &self,
        provider: &P,
        observer: &ObserverState,
    ) -> Result<Apparent> {
        Ok(observer.observe(provider, self.identifier)?.apparent())
    }
}

impl std::fmt::Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The Earth, observer of everything else
pub const EARTH: Object = Object::new(Body::Earth, ObjectCategory::Planet, None);

/// Every object the ephemerides and events are computed for, in report order
pub const ASTERS: [Object; 10] = [
    Object::new(Body::Sun, ObjectCategory::Star, Some(SUN_RADIUS_KM)),
    Object::new(Body::Moon, ObjectCategory::Satellite, Some(MOON_RADIUS_KM)),
    Object::new(Body::Mercury, ObjectCategory::Planet, Some(MERCURY_RADIUS_KM)),
    Object::new(Body::Venus, ObjectCategory::Planet, Some(VENUS_RADIUS_KM)),
    Object::new(Body::Mars, ObjectCategory::Planet, Some(MARS_RADIUS_KM)),
    Object::new(Body::Jupiter, ObjectCategory::Planet, Some(JUPITER_RADIUS_KM)),
    Object::new(Body::Saturn, ObjectCategory::Planet, Some(SATURN_RADIUS_KM)),
    Object::new(Body::Uranus, ObjectCategory::Planet, Some(URANUS_RADIUS_KM)),
    Object::new(Body::Neptune, ObjectCategory::Planet, Some(NEPTUNE_RADIUS_KM)),
    Object::new(Body::Pluto, ObjectCategory::Planet, Some(PLUTO_RADIUS_KM)),
];

/// Registry entry for `identifier`
pub fn get_aster(identifier: Body) -> &'static Object {
    match identifier {
        Body::Earth => &EARTH,
        Body::Sun => &ASTERS[0],
        Body::Moon => &ASTERS[1],
        Body::Mercury => &ASTERS[2],
        Body::Venus => &ASTERS[3],
        Body::Mars => &ASTERS[4],
        Body::Jupiter => &ASTERS[5],
        Body::Saturn => &ASTERS[6],
        Body::Uranus => &ASTERS[7],
        Body::Neptune => &ASTERS[8],
        Body::Pluto => &ASTERS[9],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_registry_lookup() {
        for aster in &ASTERS {
            assert_eq!(get_aster(aster.identifier), aster);
        }
        assert_eq!(get_aster(Body::Earth), &EARTH);
        assert_eq!(get_aster(Body::Saturn).category, ObjectCategory::Planet);
        assert_eq!(get_aster(Body::Sun).category, ObjectCategory::Star);
    }

    #[test]
    fn test_sun_apparent_radius() {
        // 2021-06-09: Earth–Sun distance 151.8 million km, skyfield gives 0°31'31.6"
        let radius = ASTERS[0].apparent_radius(151_862_000.0).unwrap();
        assert_relative_eq!(radius.to_degrees() * 60.0, 31.0 + 31.6 / 60.0, epsilon = 0.02);
    }

    #[test]
    fn test_radius_must_be_set() {
        assert!(matches!(
            EARTH.apparent_radius(1.0e6),
            Err(AlmanacError::MissingPhysicalProperty(Body::Earth))
        ));
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_value(get_aster(Body::Moon)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"identifier": "MOON", "type": "SATELLITE", "radius": 1737.4})
        );
        let json = serde_json::to_value(EARTH).unwrap();
        assert_eq!(json["radius"], serde_json::Value::Null);
    }
}
