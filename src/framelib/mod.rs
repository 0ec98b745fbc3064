//! Reference frame rotations
//!
//! Rotation helpers follow the "frame" convention: `rot_x(a) * v` expresses `v`
//! in a frame rotated by `a` about the x axis. Vectors are ICRF unless noted;
//! frame bias between ICRF and the J2000 mean equator is neglected.

use crate::constants::{ASEC2RAD, J2000_OBLIQUITY_ASEC, TAU};
use crate::nutationlib::{compute_nutation, iau2000b};
use crate::precessionlib::{compute_precession, mean_obliquity};
use crate::time::Time;
use nalgebra::{Matrix3, Vector3};
use once_cell::sync::Lazy;

/// Frame rotation about the x axis
pub fn rot_x(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(1.0, 0.0, 0.0, 0.0, c, s, 0.0, -s, c)
}

/// Frame rotation about the z axis
pub fn rot_z(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0)
}

/// ICRF to the ecliptic and equinox of J2000
pub static ICRF_TO_ECLIPTIC_J2000: Lazy<Matrix3<f64>> =
    Lazy::new(|| rot_x(J2000_OBLIQUITY_ASEC * ASEC2RAD));

/// Precession, nutation and obliquity evaluated at one instant
#[derive(Debug, Clone, Copy)]
pub struct FramesOfDate {
    /// J2000 to mean equator of date
    pub precession: Matrix3<f64>,
    /// Mean equator of date to true equator of date
    pub nutation: Matrix3<f64>,
    /// Mean obliquity of the ecliptic (radians)
    pub mean_obliquity: f64,
    /// Nutation in longitude (radians)
    pub dpsi: f64,
    /// Nutation in obliquity (radians)
    pub deps: f64,
}

impl FramesOfDate {
    pub fn at(t: &Time) -> Self {
        let centuries = t.tt_centuries();
        let mean_obliquity = mean_obliquity(centuries);
        let (dpsi, deps) = iau2000b(centuries);
        Self {
            precession: compute_precession(centuries),
            nutation: compute_nutation(mean_obliquity, dpsi, deps),
            mean_obliquity,
            dpsi,
            deps,
        }
    }

    /// True obliquity of the ecliptic (radians)
    pub fn true_obliquity(&self) -> f64 {
        self.mean_obliquity + self.deps
    }

    /// Equation of the equinoxes, GAST − GMST (radians)
    pub fn equation_of_equinoxes(&self) -> f64 {
        self.dpsi * self.mean_obliquity.cos()
    }

    /// ICRF to the true equator and equinox of date
    pub fn icrf_to_true_equator(&self) -> Matrix3<f64> {
        self.nutation * self.precession
    }

    /// ICRF to the true ecliptic and equinox of date
    pub fn icrf_to_ecliptic_of_date(&self) -> Matrix3<f64> {
        rot_x(self.true_obliquity()) * self.icrf_to_true_equator()
    }
}

/// Angle between two vectors in radians
pub fn angle_between(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let cos_angle = a.dot(b) / (a.norm() * b.norm());
    cos_angle.clamp(-1.0, 1.0).acos()
}

/// Spherical coordinates of a vector: (latitude, longitude in [0, 2π), distance)
pub fn to_spherical(v: &Vector3<f64>) -> (f64, f64, f64) {
    let distance = v.norm();
    let latitude = (v.z / distance).clamp(-1.0, 1.0).asin();
    let longitude = v.y.atan2(v.x).rem_euclid(TAU);
    (latitude, longitude, distance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_rotations_are_frame_rotations() {
        let v = rot_z(FRAC_PI_2) * Vector3::x();
        assert_abs_diff_eq!(v, Vector3::new(0.0, -1.0, 0.0), epsilon = 1e-15);
        let v = rot_x(FRAC_PI_2) * Vector3::y();
        assert_abs_diff_eq!(v, Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-15);
    }

    #[test]
    fn test_ecliptic_pole() {
        // the celestial pole sits 23.44° from the ecliptic pole, toward longitude 90°
        let pole = *ICRF_TO_ECLIPTIC_J2000 * Vector3::z();
        let (lat, lon, _) = to_spherical(&pole);
        assert_abs_diff_eq!(lat.to_degrees(), 90.0 - 23.439_291, epsilon = 1e-5);
        assert_abs_diff_eq!(lon.to_degrees(), 90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_frames_at_j2000() {
        let frames = FramesOfDate::at(&Time::from_tt_jd(2_451_545.0));
        assert_abs_diff_eq!(frames.precession, Matrix3::identity(), epsilon = 1e-12);
        assert_abs_diff_eq!(frames.true_obliquity().to_degrees(), 23.4377, epsilon = 1e-3);
        let m = frames.icrf_to_ecliptic_of_date();
        assert_abs_diff_eq!(m * m.transpose(), Matrix3::identity(), epsilon = 1e-12);
    }

    #[test]
    fn test_angle_between() {
        let a = Vector3::new(1.0, 0.0, 0.0);
        assert_abs_diff_eq!(angle_between(&a, &Vector3::new(0.0, 3.0, 0.0)), FRAC_PI_2);
        assert_abs_diff_eq!(angle_between(&a, &(-a * 2.0)), PI);
        assert_abs_diff_eq!(angle_between(&a, &a), 0.0);
    }

    #[test]
    fn test_to_spherical_wraps_longitude() {
        let (lat, lon, r) = to_spherical(&Vector3::new(0.0, -2.0, 0.0));
        assert_abs_diff_eq!(lat, 0.0);
        assert_abs_diff_eq!(lon, 1.5 * PI, epsilon = 1e-15);
        assert_abs_diff_eq!(r, 2.0);
    }
}
