//! Constants module for astronomical calculations and event searches

use std::f64::consts::PI;

// Astronomical distances
/// Astronomical Unit in kilometers
pub const AU_KM: f64 = 149_597_870.700;

// Time constants
/// Seconds in a day
pub const DAY_S: f64 = 86_400.0;
/// J2000.0 epoch as Julian date
pub const J2000: f64 = 2_451_545.0;
/// Julian date of the Unix epoch (1970-01-01T00:00:00)
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;
/// TT minus TAI in seconds
pub const TT_MINUS_TAI_S: f64 = 32.184;
/// TT minus TAI in days
pub const TT_MINUS_TAI: f64 = TT_MINUS_TAI_S / DAY_S;
/// Days in a Julian century
pub const JULIAN_CENTURY: f64 = 36_525.0;

// Angles
/// Arcseconds in a complete circle
pub const ASEC360: f64 = 1_296_000.0;
/// Arcseconds to radians conversion factor
pub const ASEC2RAD: f64 = 4.848_136_811_095_36e-6;
/// Degrees to radians conversion factor
pub const DEG2RAD: f64 = PI / 180.0;
/// Radians to degrees conversion factor
pub const RAD2DEG: f64 = 180.0 / PI;
/// Tau (2*PI) for full circle
pub const TAU: f64 = 2.0 * PI;
/// Obliquity of the J2000 ecliptic in arcseconds (IAU 1976, as used by SPICE ECLIPJ2000)
pub const J2000_OBLIQUITY_ASEC: f64 = 84_381.448;

// Physics
/// Speed of light in km/s
pub const C_KM_S: f64 = 299_792.458;
/// Speed of light in km/day
pub const C_KM_DAY: f64 = C_KM_S * DAY_S;

// Earth constants
/// Earth's equatorial radius in meters
pub const EARTH_RADIUS: f64 = 6_378_136.6;
/// Earth's equatorial radius in kilometers
pub const EARTH_RADIUS_KM: f64 = EARTH_RADIUS / 1000.0;
/// WGS84 equatorial radius in kilometers
pub const WGS84_RADIUS_KM: f64 = 6_378.137;
/// WGS84 inverse flattening
pub const WGS84_INVERSE_FLATTENING: f64 = 298.257_223_563;

// Physical radii used by the body registry (km)
pub const SUN_RADIUS_KM: f64 = 696_342.0;
pub const MOON_RADIUS_KM: f64 = 1_737.4;
pub const MERCURY_RADIUS_KM: f64 = 2_439.7;
pub const VENUS_RADIUS_KM: f64 = 6_051.8;
pub const MARS_RADIUS_KM: f64 = 3_396.2;
pub const JUPITER_RADIUS_KM: f64 = 71_492.0;
pub const SATURN_RADIUS_KM: f64 = 60_268.0;
pub const URANUS_RADIUS_KM: f64 = 25_559.0;
pub const NEPTUNE_RADIUS_KM: f64 = 24_764.0;
pub const PLUTO_RADIUS_KM: f64 = 1_185.0;

// Radii used by the lunar eclipse almanac (km)
/// Solar radius used for shadow geometry
pub const ECLIPSE_SUN_RADIUS_KM: f64 = 696_340.0;
/// Lunar radius used for shadow geometry
pub const ECLIPSE_MOON_RADIUS_KM: f64 = 1_737.1;

// Search tunables
/// Number of grid samples per rough period when searching an observable
pub const SAMPLES_PER_PERIOD: f64 = 12.0;
/// Default time tolerance for searches, in days (1 millisecond)
pub const DEFAULT_EPSILON: f64 = 0.001 / DAY_S;
/// Altitude below which a body is considered set, in degrees.
/// Combines standard refraction (34') with the solar semi-diameter (16').
pub const RISEN_ALTITUDE_DEG: f64 = -0.8333;
/// Time tolerance for elongation maxima, in days (1 second)
pub const ELONGATION_EPSILON: f64 = 1.0 / DAY_S;
/// Time tolerance for apogee and perigee, in days (1 minute)
pub const DISTANCE_EPSILON: f64 = 60.0 / DAY_S;
/// Time tolerance for culminations and eclipse maxima, in days (1 second)
pub const CULMINATION_EPSILON: f64 = 1.0 / DAY_S;
