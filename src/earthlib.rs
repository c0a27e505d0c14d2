//! Earth rotation: Earth Rotation Angle and sidereal time

use crate::constants::{DAYS_PER_CENTURY, J2000};

/// Earth Rotation Angle in turns [0, 1), IAU 2000 definition
///
/// The UT1 Julian date is passed as two parts so the fractional day keeps
/// full precision.
pub fn earth_rotation_angle(jd_ut1_whole: f64, jd_ut1_fraction: f64) -> f64 {
    let th = 0.779_057_273_264_0 + 0.002_737_811_911_354_48 * (jd_ut1_whole - J2000 + jd_ut1_fraction);
    (th.rem_euclid(1.0) + jd_ut1_whole.rem_euclid(1.0) + jd_ut1_fraction.rem_euclid(1.0))
        .rem_euclid(1.0)
}

/// Greenwich mean sidereal time in hours [0, 24), IAU 2006
///
/// The ERA comes from UT1 and the precession polynomial from TDB.
pub fn sidereal_time(jd_ut1_whole: f64, jd_ut1_fraction: f64, jd_tdb: f64) -> f64 {
    let theta = earth_rotation_angle(jd_ut1_whole, jd_ut1_fraction);
    let t = (jd_tdb - J2000) / DAYS_PER_CENTURY;

    // Arcseconds
    let st = 0.014_506
        + (((((-0.000_000_036_8 * t - 0.000_029_956) * t - 0.000_000_44) * t + 1.391_581_7) * t
            + 4_612.156_534)
            * t);

    (st / 54_000.0 + theta * 24.0).rem_euclid(24.0)
}
