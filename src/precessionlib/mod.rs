//! IAU 2006 precession
//!
//! The precession matrix rotates vectors from the mean equator and equinox of
//! J2000 (treated as the ICRF, frame bias neglected) to the mean equator and
//! equinox of date, using the four-angle formulation of Capitaine, Wallace &
//! Chapront (2003).

use crate::constants::ASEC2RAD;
use crate::framelib::{rot_x, rot_z};
use nalgebra::Matrix3;

/// Obliquity of the ecliptic at J2000 in arcseconds (IAU 2006)
pub const EPS0_ASEC: f64 = 84_381.406;

/// Mean obliquity of the ecliptic of date, in radians
///
/// `t` is Julian centuries of TT since J2000.
pub fn mean_obliquity(t: f64) -> f64 {
    let arcsec = ((((-0.000_000_043_4 * t - 0.000_000_576) * t + 0.002_003_40) * t
        - 0.000_183_1)
        * t
        - 46.836_769)
        * t
        + EPS0_ASEC;
    arcsec * ASEC2RAD
}

/// Precession matrix from J2000 to the mean equator of date
pub fn compute_precession(t: f64) -> Matrix3<f64> {
    // Precession angles (arcseconds)
    let psi_a = ((((-0.000_000_095_1 * t + 0.000_132_851) * t - 0.001_140_45) * t - 1.079_006_9)
        * t
        + 5038.481_507)
        * t;
    let omega_a = ((((0.000_000_333_7 * t - 0.000_000_467) * t - 0.007_725_03) * t
        + 0.051_262_3)
        * t
        - 0.025_754)
        * t
        + EPS0_ASEC;
    let chi_a = ((((-0.000_000_056_0 * t + 0.000_170_663) * t - 0.001_211_97) * t - 2.381_429_2)
        * t
        + 10.556_403)
        * t;

    rot_z(chi_a * ASEC2RAD)
        * rot_x(-omega_a * ASEC2RAD)
        * rot_z(-psi_a * ASEC2RAD)
        * rot_x(EPS0_ASEC * ASEC2RAD)
}
