//! Reference frame rotations
//!
//! All rotations are frame (passive) rotations in the IERS convention:
//! `rot_x(φ) * v` expresses `v` in axes turned by φ about the x axis.

use crate::constants::ASEC2RAD;
use crate::precessionlib::compute_precession;
use crate::time::Time;
use lazy_static::lazy_static;
use nalgebra::Matrix3;

lazy_static! {
    /// Frame bias from the ICRS to the mean equator and equinox of J2000.0
    ///
    /// B = R1(-η0)·R2(ξ0)·R3(dα0), IERS Conventions 2010 eq. 5.33.
    pub static ref ICRS_TO_J2000: Matrix3<f64> = {
        let xi0 = -0.016_617_0 * ASEC2RAD;
        let eta0 = -0.006_819_2 * ASEC2RAD;
        let da0 = -0.014_60 * ASEC2RAD;
        rot_x(-eta0) * rot_y(xi0) * rot_z(da0)
    };
}

/// Frame rotation about the x axis
pub fn rot_x(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(1.0, 0.0, 0.0, 0.0, c, s, 0.0, -s, c)
}

/// Frame rotation about the y axis
pub fn rot_y(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(c, 0.0, -s, 0.0, 1.0, 0.0, s, 0.0, c)
}

/// Frame rotation about the z axis
pub fn rot_z(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0)
}

/// Nutation matrix from the mean to the true equator and equinox of date
pub fn nutation_matrix(mean_obliquity: f64, true_obliquity: f64, dpsi: f64) -> Matrix3<f64> {
    rot_x(-true_obliquity) * rot_z(-dpsi) * rot_x(mean_obliquity)
}

/// ICRS to true equator and equinox of date (N·P·B)
pub fn icrs_to_true_equator(time: &Time) -> Matrix3<f64> {
    let t = time.tdb_centuries();
    let (dpsi, _) = time.nutation_angles_radians();
    let n = nutation_matrix(
        time.mean_obliquity_radians(),
        time.true_obliquity_radians(),
        dpsi,
    );
    n * compute_precession(t) * *ICRS_TO_J2000
}

/// ICRS to the true ecliptic and equinox of date
pub fn ecliptic_of_date_rotation(time: &Time) -> Matrix3<f64> {
    rot_x(time.true_obliquity_radians()) * icrs_to_true_equator(time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector3;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_frame_rotation_sense() {
        // Turning the axes by +90° about z brings the old y axis onto new x
        let v = rot_z(FRAC_PI_2) * Vector3::y();
        assert_abs_diff_eq!(v, Vector3::x(), epsilon = 1e-15);

        let v = rot_x(FRAC_PI_2) * Vector3::z();
        assert_abs_diff_eq!(v, Vector3::y(), epsilon = 1e-15);

        let v = rot_y(FRAC_PI_2) * Vector3::x();
        assert_abs_diff_eq!(v, Vector3::z(), epsilon = 1e-15);
    }

    #[test]
    fn test_frame_bias_is_tiny() {
        let offset = *ICRS_TO_J2000 - Matrix3::identity();
        assert!(offset.amax() < 1e-7);
        assert!(offset.amax() > 1e-9);
    }

    #[test]
    fn test_ecliptic_pole_stays_near_pole() {
        let ts = crate::time::Timescale::default();
        let time = ts.tt_jd(2_460_000.5);
        let m = ecliptic_of_date_rotation(&time);
        // The ICRS z axis sits one obliquity away from the ecliptic pole
        let v = m * Vector3::z();
        let lat = v.z.asin();
        assert_abs_diff_eq!(
            FRAC_PI_2 - lat,
            time.true_obliquity_radians(),
            epsilon = 1e-3
        );
        assert_abs_diff_eq!(m * m.transpose(), Matrix3::identity(), epsilon = 1e-13);
    }
}
