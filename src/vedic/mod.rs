//! Sample pipeline: tropical and sidereal longitudes of the Sun, Moon and
//! Ascendant for one instant and place
//!
//! The pipeline only talks to the `Ephemeris` and `AyanamsaService` traits.
//! Both are injected; when absent, the JPL adapter and the mean Lahiri
//! polynomial are constructed.

use std::fmt;

use serde::Serialize;

use crate::coordinates::{format_dms, wrap_degrees};
use crate::ephemeris::{load_default, Body, Ephemeris};
use crate::sidereal::{AyanamsaService, LahiriFallbackAyanamsa};
use crate::time::{CivilTimestamp, Time, TimeError};
use crate::{Result, VedicError};

/// Sidereal time runs 15° per hour
const DEGREES_PER_HOUR: f64 = 15.0;

/// Observer position in geodetic degrees, longitude east-positive
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Location {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

impl Location {
    pub fn new(latitude_deg: f64, longitude_deg: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
        }
    }
}

/// A longitude in both zodiacs, each in [0, 360)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BodyLongitude {
    pub tropical_deg: f64,
    pub sidereal_deg: f64,
}

impl BodyLongitude {
    /// Wrap a tropical longitude and derive the sidereal one from it
    pub fn from_tropical(tropical_deg: f64, ayanamsa_deg: f64) -> Self {
        let tropical_deg = wrap_degrees(tropical_deg);
        Self {
            tropical_deg,
            sidereal_deg: wrap_degrees(tropical_deg - ayanamsa_deg),
        }
    }
}

/// Result of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VedicSample {
    /// The instant as a TT Julian date
    pub timestamp_tt_jd: f64,
    pub location: Location,
    pub ayanamsa_deg: f64,
    pub sun: BodyLongitude,
    pub moon: BodyLongitude,
    pub ascendant: BodyLongitude,
}

impl VedicSample {
    /// Sun, Moon and Ascendant with their display names
    pub fn bodies(&self) -> impl Iterator<Item = (&'static str, &BodyLongitude)> + '_ {
        [
            ("Sun", &self.sun),
            ("Moon", &self.moon),
            ("Ascendant", &self.ascendant),
        ]
        .into_iter()
    }
}

impl fmt::Display for VedicSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TT Julian Day      : {:.8}", self.timestamp_tt_jd)?;
        writeln!(
            f,
            "Lahiri ayanamsa    : {} ({:.6}°)",
            format_dms(self.ayanamsa_deg, 2),
            self.ayanamsa_deg
        )?;
        for (name, body) in self.bodies() {
            writeln!(
                f,
                "{:<11}tropical {}  | sidereal {}  ({:.6}°)",
                name,
                format_dms(body.tropical_deg, 2),
                format_dms(body.sidereal_deg, 2),
                body.sidereal_deg
            )?;
        }
        Ok(())
    }
}

/// Compute a sample, constructing default services for any left as `None`
///
/// The timestamp must carry an offset. That is checked before any default
/// service is built, so a naive timestamp never triggers kernel resolution.
pub fn compute_sample(
    timestamp: &CivilTimestamp,
    location: Location,
    ephemeris: Option<&dyn Ephemeris>,
    ayanamsa_service: Option<&dyn AyanamsaService>,
) -> Result<VedicSample> {
    if let CivilTimestamp::Naive(naive) = timestamp {
        return Err(TimeError::NaiveTimestamp(naive.to_string()).into());
    }

    let default_ephemeris;
    let ephemeris: &dyn Ephemeris = match ephemeris {
        Some(ephemeris) => ephemeris,
        None => {
            default_ephemeris = load_default()?;
            &default_ephemeris
        }
    };
    let ayanamsa_service = ayanamsa_service.unwrap_or(&LahiriFallbackAyanamsa);

    let time = ephemeris.to_time(timestamp)?;
    let obliquity = time.true_obliquity_radians();
    let ayanamsa = ayanamsa_service.lahiri(&time);

    let sun = ephemeris.ecliptic_longitude(Body::Sun.name(), &time)?;
    let moon = ephemeris.ecliptic_longitude(Body::Moon.name(), &time)?;
    let lst = local_sidereal_degrees(&time, location.longitude_deg);
    let ascendant = ascendant_degrees(lst, obliquity, location.latitude_deg)?;

    Ok(VedicSample {
        timestamp_tt_jd: time.tt(),
        location,
        ayanamsa_deg: ayanamsa,
        sun: BodyLongitude::from_tropical(sun, ayanamsa),
        moon: BodyLongitude::from_tropical(moon, ayanamsa),
        ascendant: BodyLongitude::from_tropical(ascendant, ayanamsa),
    })
}

/// Local apparent sidereal time in degrees, [0, 360)
pub fn local_sidereal_degrees(time: &Time, longitude_deg: f64) -> f64 {
    wrap_degrees(time.gast().rem_euclid(24.0) * DEGREES_PER_HOUR + longitude_deg)
}

/// Tropical longitude of the Ascendant in degrees, [0, 360)
///
/// `lst_deg` is local apparent sidereal time, `obliquity_rad` the true
/// obliquity. The ecliptic point on the eastern horizon satisfies
///
/// ```text
/// λ = atan2(cos θ, −(sin θ·cos ε + tan φ·sin ε))
/// ```
///
/// The horizon is undefined at the poles, so |φ| ≥ 90° and non-finite
/// latitudes are rejected with [`VedicError::PolarLatitude`].
pub fn ascendant_degrees(lst_deg: f64, obliquity_rad: f64, latitude_deg: f64) -> Result<f64> {
    if !latitude_deg.is_finite() || latitude_deg.abs() >= 90.0 {
        return Err(VedicError::PolarLatitude(latitude_deg));
    }

    let theta = lst_deg.to_radians();
    let phi = latitude_deg.to_radians();
    let (sin_e, cos_e) = obliquity_rad.sin_cos();

    let y = theta.cos();
    let x = -(theta.sin() * cos_e + phi.tan() * sin_e);
    Ok(wrap_degrees(y.atan2(x).to_degrees()))
}
