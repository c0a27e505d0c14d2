//! Ayanamsa: the offset between tropical and sidereal longitudes
//!
//! Callers depend on the `AyanamsaService` trait so a more precise model can
//! be swapped in. Two implementations ship here: the mean Lahiri polynomial
//! and a variant that adds nutation in longitude.

use crate::coordinates::wrap_degrees;
use crate::time::Time;

/// Julian day of 1900-01-01 00:00 TT, the Lahiri reference epoch
pub const LAHIRI_REFERENCE_JD: f64 = 2_415_020.5;

/// Ayanamsa at the reference epoch (degrees, 22°27′36.53″)
pub const LAHIRI_C0: f64 = 22.460_148;
/// Mean precession in longitude (degrees/century)
pub const LAHIRI_C1: f64 = 1.396_042;
/// Quadratic term (degrees/century², Meeus eq. 27.3)
pub const LAHIRI_C2: f64 = 0.000_308;
/// Cubic term (degrees/century³)
pub const LAHIRI_C3: f64 = 0.000_000_02;

/// Source of the sidereal correction for a dynamical-time instant
pub trait AyanamsaService {
    /// Lahiri ayanamsa in degrees, in [0, 360)
    fn lahiri(&self, time: &Time) -> f64;
}

/// Mean Lahiri ayanamsa from the reference polynomial (no nutation)
#[derive(Debug, Clone, Copy, Default)]
pub struct LahiriFallbackAyanamsa;

impl AyanamsaService for LahiriFallbackAyanamsa {
    fn lahiri(&self, time: &Time) -> f64 {
        lahiri_mean_ayanamsa(time)
    }
}

/// True Lahiri ayanamsa: the mean polynomial plus nutation in longitude
///
/// Measured against the true equinox of date, which is what the ephemeris
/// longitudes are referred to.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrueLahiriAyanamsa;

impl AyanamsaService for TrueLahiriAyanamsa {
    fn lahiri(&self, time: &Time) -> f64 {
        let (dpsi, _) = time.nutation_angles_radians();
        wrap_degrees(lahiri_mean_ayanamsa(time) + dpsi.to_degrees())
    }
}

/// Mean Lahiri ayanamsa in degrees for a TT instant
pub fn lahiri_mean_ayanamsa(time: &Time) -> f64 {
    lahiri_ayanamsa_from_jd_tt(time.tt())
}

/// Mean Lahiri ayanamsa in degrees for a TT Julian date
pub fn lahiri_ayanamsa_from_jd_tt(jd_tt: f64) -> f64 {
    let t = (jd_tt - LAHIRI_REFERENCE_JD) / 36_525.0;
    wrap_degrees(LAHIRI_C0 + t * (LAHIRI_C1 + t * (LAHIRI_C2 - t * LAHIRI_C3)))
}
