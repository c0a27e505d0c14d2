//! Apparent geocentric positions from an SPK kernel
//!
//! The steps follow the usual astrometric chain: barycentric states of the
//! observer and target, light-time iteration to get the astrometric vector,
//! gravitational deflection by the Sun, and annual aberration. Vectors are
//! in AU and AU/day in the ICRS.

use crate::constants::{AU_KM, AU_M, C, C_AUDAY, DAY_S, GS, RAD2DEG};
use crate::framelib::ecliptic_of_date_rotation;
use crate::jplephem::errors::Result;
use crate::jplephem::names::targets;
use crate::jplephem::SPK;
use crate::time::Time;
use log::trace;
use nalgebra::Vector3;

/// Light-time iterations stop once the correction changes by less than this (days)
const LIGHT_TIME_TOLERANCE: f64 = 1e-12;

/// Upper bound on light-time iterations
const MAX_LIGHT_TIME_PASSES: usize = 10;

/// Deflection is skipped when the target sits this close to the Sun's direction
const COLLINEAR_LIMIT: f64 = 0.999_999_999_99;

/// Position and velocity relative to the solar system barycenter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Barycentric {
    /// Position in AU
    pub position: Vector3<f64>,
    /// Velocity in AU/day
    pub velocity: Vector3<f64>,
}

/// Astrometric position of a target as seen by an observer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Astrometric {
    /// Target NAIF id
    pub target: i32,
    /// Observer-to-target vector in AU, target taken at the retarded time
    pub position: Vector3<f64>,
    /// Relative velocity in AU/day
    pub velocity: Vector3<f64>,
    /// One-way light time in days
    pub light_time: f64,
    /// Observation instant (TDB Julian date)
    pub tdb_jd: f64,
    /// Observer state at the observation instant
    pub observer: Barycentric,
}

/// Barycentric state of a body in AU and AU/day
pub fn barycentric(spk: &SPK, target: i32, tdb_jd: f64) -> Result<Barycentric> {
    let (position_km, velocity_kms) = spk.position_velocity(target, tdb_jd)?;
    Ok(Barycentric {
        position: position_km / AU_KM,
        velocity: velocity_kms * (DAY_S / AU_KM),
    })
}

impl Barycentric {
    /// Observe a target from this position, correcting for light time
    pub fn observe(&self, spk: &SPK, target: i32, tdb_jd: f64) -> Result<Astrometric> {
        let mut state = barycentric(spk, target, tdb_jd)?;
        let mut light_time = (state.position - self.position).norm() / C_AUDAY;

        for pass in 0..MAX_LIGHT_TIME_PASSES {
            state = barycentric(spk, target, tdb_jd - light_time)?;
            let updated = (state.position - self.position).norm() / C_AUDAY;
            let change = (updated - light_time).abs();
            light_time = updated;
            if change < LIGHT_TIME_TOLERANCE {
                trace!("light time for {} converged after {} passes", target, pass + 1);
                break;
            }
        }

        Ok(Astrometric {
            target,
            position: state.position - self.position,
            velocity: state.velocity - self.velocity,
            light_time,
            tdb_jd,
            observer: *self,
        })
    }
}

impl Astrometric {
    /// Apparent position: Sun deflection followed by aberration
    pub fn apparent(&self, spk: &SPK) -> Result<Vector3<f64>> {
        let mut position = self.position;

        if self.target != targets::SUN {
            let sun = barycentric(spk, targets::SUN, self.tdb_jd)?;
            add_deflection(&mut position, &self.observer.position, &sun.position);
        }
        add_aberration(&mut position, &self.observer.velocity, self.light_time);

        Ok(position)
    }
}

/// Bend `position` for the Sun's gravity (relativistic light deflection)
///
/// `position` is observer-to-target, `observer` and `deflector` are
/// barycentric, all in AU.
pub fn add_deflection(
    position: &mut Vector3<f64>,
    observer: &Vector3<f64>,
    deflector: &Vector3<f64>,
) {
    let pq = observer + *position - deflector;
    let pe = observer - deflector;

    let pmag = position.norm();
    let qmag = pq.norm();
    let emag = pe.norm();
    if pmag == 0.0 || qmag == 0.0 || emag == 0.0 {
        return;
    }

    let phat = *position / pmag;
    let qhat = pq / qmag;
    let ehat = pe / emag;

    let pdotq = phat.dot(&qhat);
    let qdote = qhat.dot(&ehat);
    let edotp = ehat.dot(&phat);

    if edotp.abs() > COLLINEAR_LIMIT {
        return;
    }

    let fac1 = 2.0 * GS / (C * C * emag * AU_M);
    let fac2 = 1.0 + qdote;
    *position += (ehat * pdotq - qhat * edotp) * (fac1 / fac2 * pmag);
}

/// Apply relativistic annual aberration for an observer moving at `velocity`
/// (AU/day), given the light time to the target in days
pub fn add_aberration(position: &mut Vector3<f64>, velocity: &Vector3<f64>, light_time: f64) {
    let p1mag = light_time * C_AUDAY;
    let vemag = velocity.norm();
    if vemag == 0.0 || p1mag == 0.0 {
        return;
    }

    let beta = vemag / C_AUDAY;
    let cosd = position.dot(velocity) / (p1mag * vemag);
    let gammai = (1.0 - beta * beta).sqrt();
    let p = beta * cosd;
    let q = (1.0 + p / (1.0 + gammai)) * light_time;
    let r = 1.0 + p;

    *position = (*position * gammai + velocity * q) / r;
}

/// Ecliptic latitude and longitude (degrees) in the true ecliptic and
/// equinox of date
///
/// Longitude is in [0, 360).
pub fn ecliptic_latlon(position: &Vector3<f64>, time: &Time) -> (f64, f64) {
    let v = ecliptic_of_date_rotation(time) * position;
    let lon = v.y.atan2(v.x) * RAD2DEG;
    let lat = v.z.atan2(v.x.hypot(v.y)) * RAD2DEG;
    (lat, lon.rem_euclid(360.0) % 360.0)
}
