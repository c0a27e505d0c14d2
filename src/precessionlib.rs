//! Precession of the equator and equinox (IAU 2006, Capitaine et al. 2003)

use crate::constants::ASEC2RAD;
use crate::framelib::{rot_x, rot_z};
use crate::nutationlib::OBLIQUITY_J2000_ARCSEC;
use nalgebra::Matrix3;

/// Precession matrix from the mean equator and equinox of J2000.0 to the
/// mean equator and equinox of date
///
/// `t` is TDB in Julian centuries since J2000.0. The matrix is
/// R3(χA)·R1(-ωA)·R3(-ψA)·R1(ε0).
pub fn compute_precession(t: f64) -> Matrix3<f64> {
    let psi_a = ((((-0.000_000_095_1 * t + 0.000_132_851) * t - 0.001_140_45) * t
        - 1.079_006_9)
        * t
        + 5_038.481_507)
        * t;
    let omega_a = ((((0.000_000_333_7 * t - 0.000_000_467) * t - 0.007_725_03) * t
        + 0.051_262_3)
        * t
        - 0.025_754)
        * t
        + OBLIQUITY_J2000_ARCSEC;
    let chi_a = ((((-0.000_000_056_0 * t + 0.000_170_663) * t - 0.001_211_97) * t
        - 2.381_429_2)
        * t
        + 10.556_403)
        * t;

    rot_z(chi_a * ASEC2RAD)
        * rot_x(-omega_a * ASEC2RAD)
        * rot_z(-psi_a * ASEC2RAD)
        * rot_x(OBLIQUITY_J2000_ARCSEC * ASEC2RAD)
}
