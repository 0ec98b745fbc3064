//! Nutation in longitude and obliquity
//!
//! Truncated IAU 2000B lunisolar series: the 30 largest of the 77 terms in
//! IERS Conventions 2010, Table 5.3b. The omitted terms are each below 1.5 mas
//! in longitude. Out-of-phase terms are dropped as well.

use crate::constants::{ASEC2RAD, ASEC360};
use crate::framelib::{rot_x, rot_z};
use nalgebra::Matrix3;

/// Delaunay fundamental arguments `[l, l', F, D, Ω]` in radians
///
/// `t` is Julian centuries of TDB since J2000 (IERS Conventions 2010, Table 5.2e).
pub fn fundamental_arguments(t: f64) -> [f64; 5] {
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;

    let l = 485_868.249_036 + 1_717_915_923.217_8 * t + 31.879_2 * t2 + 0.051_635 * t3
        - 0.000_244_70 * t4;
    let lp = 1_287_104.793_05 + 129_596_581.048_1 * t - 0.553_2 * t2 + 0.000_136 * t3
        - 0.000_011_49 * t4;
    let f = 335_779.526_232 + 1_739_527_262.847_8 * t - 12.751_2 * t2 - 0.001_037 * t3
        + 0.000_004_17 * t4;
    let d = 1_072_260.703_69 + 1_602_961_601.209_0 * t - 6.370_6 * t2 + 0.006_593 * t3
        - 0.000_031_69 * t4;
    let om = 450_160.398_036 - 6_962_890.543_1 * t + 7.472_2 * t2 + 0.007_702 * t3
        - 0.000_059_39 * t4;

    [l, lp, f, d, om].map(|arcsec| (arcsec % ASEC360) * ASEC2RAD)
}

/// Each row: multipliers of `[l, l', F, D, Ω]`, then S, S' (Δψ) and C, C' (Δε)
/// in units of 0.1 μas.
#[rustfmt::skip]
const NUTATION_TERMS: [([i8; 5], [f64; 4]); 30] = [
    ([ 0,  0,  0,  0,  1], [-172_064_161.0, -174_666.0, 92_052_331.0,  9_086.0]),
    ([ 0,  0,  2, -2,  2], [ -13_170_906.0,   -1_675.0,  5_730_336.0, -3_015.0]),
    ([ 0,  0,  2,  0,  2], [  -2_276_413.0,     -234.0,    978_459.0,   -485.0]),
    ([ 0,  0,  0,  0,  2], [   2_074_554.0,      207.0,   -897_492.0,    470.0]),
    ([ 0,  1,  0,  0,  0], [   1_475_877.0,   -3_633.0,     73_871.0,   -184.0]),
    ([ 0,  1,  2, -2,  2], [    -516_821.0,    1_226.0,    224_386.0,   -677.0]),
    ([ 1,  0,  0,  0,  0], [     711_159.0,       73.0,     -6_750.0,      0.0]),
    ([ 0,  0,  2,  0,  1], [    -387_298.0,     -367.0,    200_728.0,     18.0]),
    ([ 1,  0,  2,  0,  2], [    -301_461.0,      -36.0,    129_025.0,    -63.0]),
    ([ 0, -1,  2, -2,  2], [     215_829.0,     -494.0,    -95_929.0,    299.0]),
    ([ 0,  0,  2, -2,  1], [     128_227.0,      137.0,    -68_982.0,     -9.0]),
    ([-1,  0,  2,  0,  2], [     123_457.0,       11.0,    -53_311.0,     32.0]),
    ([-1,  0,  0,  2,  0], [     156_994.0,       10.0,     -1_235.0,      0.0]),
    ([ 1,  0,  0,  0,  1], [      63_110.0,       63.0,    -33_228.0,      0.0]),
    ([-1,  0,  0,  0,  1], [     -57_976.0,      -63.0,     31_429.0,      0.0]),
    ([-1,  0,  2,  2,  2], [     -59_641.0,      -11.0,     25_543.0,    -11.0]),
    ([ 1,  0,  2,  0,  1], [     -51_613.0,      -42.0,     26_366.0,      0.0]),
    ([-2,  0,  2,  0,  1], [      45_893.0,       50.0,    -24_236.0,    -10.0]),
    ([ 0,  0,  0,  2,  0], [      63_384.0,       11.0,     -1_220.0,      0.0]),
    ([ 0,  0,  2,  2,  2], [     -38_571.0,       -1.0,     16_452.0,    -11.0]),
    ([ 0, -2,  2, -2,  2], [      32_481.0,        0.0,    -13_870.0,      0.0]),
    ([-2,  0,  0,  2,  0], [     -47_722.0,        0.0,        477.0,      0.0]),
    ([ 2,  0,  2,  0,  2], [     -31_046.0,       -1.0,     13_238.0,    -11.0]),
    ([ 1,  0,  2, -2,  2], [      28_593.0,        0.0,    -12_338.0,     10.0]),
    ([-1,  0,  2,  0,  1], [      20_441.0,       21.0,    -10_758.0,      0.0]),
    ([ 2,  0,  0,  0,  0], [      29_243.0,        0.0,       -609.0,      0.0]),
    ([ 0,  0,  2,  0,  0], [      25_887.0,        0.0,       -550.0,      0.0]),
    ([ 0,  1,  0,  0,  1], [     -14_053.0,      -25.0,      8_551.0,     -2.0]),
    ([-1,  0,  0,  2,  1], [      15_164.0,       10.0,     -8_001.0,      0.0]),
    ([ 0,  2,  2, -2,  2], [     -15_794.0,       72.0,      6_850.0,    -42.0]),
];

/// Nutation in longitude and obliquity (Δψ, Δε) in radians
pub fn iau2000b(t: f64) -> (f64, f64) {
    let args = fundamental_arguments(t);

    let (dpsi, deps) = NUTATION_TERMS
        .iter()
        .fold((0.0, 0.0), |(dpsi, deps), (multipliers, [s, sp, c, cp])| {
            let arg: f64 = multipliers
                .iter()
                .zip(args.iter())
                .map(|(&n, &a)| f64::from(n) * a)
                .sum();
            (
                dpsi + (s + sp * t) * arg.sin(),
                deps + (c + cp * t) * arg.cos(),
            )
        });

    // 0.1 μas to arcseconds, plus the fixed IAU 2000B offsets
    let dpsi_arcsec = dpsi * 1e-7 - 0.000_135;
    let deps_arcsec = deps * 1e-7 + 0.000_388;
    (dpsi_arcsec * ASEC2RAD, deps_arcsec * ASEC2RAD)
}

/// Nutation matrix from the mean equator of date to the true equator of date
pub fn compute_nutation(mean_obliquity: f64, dpsi: f64, deps: f64) -> Matrix3<f64> {
    rot_x(-(mean_obliquity + deps)) * rot_z(-dpsi) * rot_x(mean_obliquity)
}
