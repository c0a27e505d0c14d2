//! # Angle Utilities
//!
//! Wrapping of ecliptic longitudes into [0°, 360°) and sexagesimal
//! (degree–minute–second) formatting for chart output.
//!
//! ## Carry Handling
//!
//! Rounding the seconds field can produce 60″, which must roll into the
//! minutes, which can in turn roll into the degrees. A longitude just below
//! 360° therefore prints as `000°00′00.00″`, never as `360°…` or `…°60′…`.
//!
//! ## Examples
//!
//! ```rust
//! use vedic_ephemeris::coordinates::angle::{format_dms, parse_dms, wrap_degrees};
//!
//! assert_eq!(wrap_degrees(-30.0), 330.0);
//! assert_eq!(format_dms(123.5, 2), "123°30′00.00″");
//! assert_eq!(format_dms(359.999_999_9, 2), "000°00′00.00″");
//! assert_eq!(parse_dms("123°30′00.00″"), Some(123.5));
//! ```

use std::fmt;

use crate::constants::DEGREES_PER_CIRCLE;

/// Largest number of decimal places honored for the seconds field
const MAX_PRECISION: usize = 9;

/// Wrap an angle in degrees into [0, 360)
///
/// Negative remainders are shifted up by a full turn, and the results that
/// floating-point rounding would leave at exactly 360 or at -0 map to 0.
/// NaN and infinities come back as NaN.
pub fn wrap_degrees(angle: f64) -> f64 {
    let mut wrapped = angle % DEGREES_PER_CIRCLE;
    if wrapped < 0.0 {
        wrapped += DEGREES_PER_CIRCLE;
    }
    if wrapped >= DEGREES_PER_CIRCLE || wrapped == 0.0 {
        0.0
    } else {
        wrapped
    }
}

/// A wrapped angle split into degrees, minutes and rounded seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dms {
    /// Whole degrees in [0, 360)
    pub degrees: u32,
    /// Whole arcminutes in [0, 60)
    pub minutes: u32,
    /// Arcseconds in [0, 60), already rounded to `precision` places
    pub seconds: f64,
    /// Decimal places kept in `seconds`
    pub precision: usize,
}

impl Dms {
    /// Split `angle` (wrapped first) with seconds rounded to `precision`
    /// decimal places, carrying any overflow upward
    ///
    /// # Examples
    ///
    /// ```rust
    /// use vedic_ephemeris::coordinates::angle::Dms;
    ///
    /// let dms = Dms::from_degrees(29.999_999, 2);
    /// assert_eq!((dms.degrees, dms.minutes), (30, 0));
    /// assert_eq!(dms.seconds, 0.0);
    /// ```
    pub fn from_degrees(angle: f64, precision: usize) -> Self {
        let precision = precision.min(MAX_PRECISION);
        let wrapped = wrap_degrees(angle);

        let mut degrees = wrapped.trunc() as u32;
        let minutes_total = (wrapped - degrees as f64) * 60.0;
        let mut minutes = minutes_total.trunc() as u32;
        let mut seconds = round_to((minutes_total - minutes as f64) * 60.0, precision);

        if seconds >= 60.0 {
            seconds -= 60.0;
            minutes += 1;
        }
        if minutes >= 60 {
            minutes -= 60;
            degrees = (degrees + 1) % DEGREES_PER_CIRCLE as u32;
        }

        Dms {
            degrees,
            minutes,
            seconds: seconds.max(0.0),
            precision,
        }
    }

    /// Back to decimal degrees
    pub fn to_degrees(&self) -> f64 {
        self.degrees as f64 + self.minutes as f64 / 60.0 + self.seconds / 3600.0
    }
}

impl fmt::Display for Dms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Two integer digits, the point, then the decimals
        let width = if self.precision == 0 {
            2
        } else {
            3 + self.precision
        };
        write!(
            f,
            "{:03}°{:02}′{:0width$.prec$}″",
            self.degrees,
            self.minutes,
            self.seconds,
            width = width,
            prec = self.precision
        )
    }
}

fn round_to(value: f64, places: usize) -> f64 {
    let scale = 10f64.powi(places as i32);
    (value * scale).round() / scale
}

/// Format an angle as `DDD°MM′SS.ss″` with `precision` decimal places
pub fn format_dms(angle: f64, precision: usize) -> String {
    Dms::from_degrees(angle, precision).to_string()
}

/// Parse the output of [`format_dms`] back to decimal degrees
///
/// ASCII `d`, `'` and `"` are accepted in place of `°`, `′` and `″`.
/// Returns `None` when a field is missing, negative or out of range.
pub fn parse_dms(text: &str) -> Option<f64> {
    let (degrees, rest) = text.trim().split_once(['°', 'd'])?;
    let (minutes, rest) = rest.split_once(['′', '\''])?;
    let seconds = rest.trim_end_matches(['″', '"']);

    let degrees: f64 = degrees.trim().parse().ok()?;
    let minutes: f64 = minutes.trim().parse().ok()?;
    let seconds: f64 = seconds.trim().parse().ok()?;

    let in_range = |value: f64, limit: f64| (0.0..limit).contains(&value);
    if !in_range(degrees, DEGREES_PER_CIRCLE) || !in_range(minutes, 60.0) || !in_range(seconds, 60.0)
    {
        return None;
    }

    Some(degrees + minutes / 60.0 + seconds / 3600.0)
}
