//! Time module for astronomical time calculations
//!
//! This module converts civil timestamps into the dynamical time scales used
//! by the ephemeris (TT, TDB) and exposes the Earth-orientation quantities
//! that depend only on time: sidereal time, obliquity and nutation.
//!
//! UTC is turned into TAI with a leap second table, TAI into TT with the
//! fixed 32.184 s offset, and TT into TDB with the USNO Circular 179 series.
//! UT1 is derived from TT with a ΔT model.

use crate::constants::{
    DAYS_PER_CENTURY, DAY_S, GREGORIAN_START, J2000, MJD_ZERO, TT_MINUS_TAI_S,
};
use crate::{earthlib, nutationlib};
use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc,
};
use log::debug;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Name of the IERS leap second file looked up in a timescale data directory
pub const LEAP_SECOND_FILE: &str = "Leap_Second.dat";

/// TAI-UTC used for instants before the first table entry (seconds)
const PRE_1972_OFFSET: f64 = 10.0;

/// Error type for time operations
#[derive(Debug, Error)]
pub enum TimeError {
    #[error("timestamp {0} carries no timezone offset")]
    NaiveTimestamp(String),

    #[error("Parsing error: {0}")]
    ParseError(String),

    #[error("Leap second file {path:?} is malformed at line {line}")]
    LeapSecondFile { path: PathBuf, line: usize },

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for time operations
pub type Result<T> = std::result::Result<T, TimeError>;

/// A civil timestamp as supplied by a caller
///
/// Only offset-aware timestamps can be placed on the dynamical time scale;
/// naive ones are kept so the rejection happens at the conversion boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CivilTimestamp {
    /// Timestamp with an explicit UTC offset
    Aware(DateTime<FixedOffset>),
    /// Wall-clock timestamp without any offset
    Naive(NaiveDateTime),
}

impl CivilTimestamp {
    /// Whether the timestamp carries offset information
    pub fn is_aware(&self) -> bool {
        matches!(self, CivilTimestamp::Aware(_))
    }

    /// Normalize to UTC, failing for naive timestamps
    pub fn to_utc(&self) -> Result<DateTime<Utc>> {
        match self {
            CivilTimestamp::Aware(dt) => Ok(dt.with_timezone(&Utc)),
            CivilTimestamp::Naive(dt) => Err(TimeError::NaiveTimestamp(dt.to_string())),
        }
    }
}

impl From<DateTime<FixedOffset>> for CivilTimestamp {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        CivilTimestamp::Aware(dt)
    }
}

impl From<DateTime<Utc>> for CivilTimestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        CivilTimestamp::Aware(dt.fixed_offset())
    }
}

impl From<NaiveDateTime> for CivilTimestamp {
    fn from(dt: NaiveDateTime) -> Self {
        CivilTimestamp::Naive(dt)
    }
}

impl fmt::Display for CivilTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CivilTimestamp::Aware(dt) => write!(f, "{}", dt.to_rfc3339()),
            CivilTimestamp::Naive(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
        }
    }
}

const AWARE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
];

impl FromStr for CivilTimestamp {
    type Err = TimeError;

    /// Parse an ISO-8601 timestamp; a trailing `Z` means `+00:00`
    fn from_str(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        let normalized = match trimmed.strip_suffix(['Z', 'z']) {
            Some(head) => format!("{}+00:00", head),
            None => trimmed.to_string(),
        };

        if let Some(dt) = AWARE_FORMATS
            .iter()
            .find_map(|fmt| DateTime::parse_from_str(&normalized, fmt).ok())
        {
            return Ok(CivilTimestamp::Aware(dt));
        }
        if let Some(dt) = NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(&normalized, fmt).ok())
        {
            return Ok(CivilTimestamp::Naive(dt));
        }

        Err(TimeError::ParseError(format!(
            "{:?} is not an ISO-8601 timestamp",
            value
        )))
    }
}

/// Parse an ISO-8601 timestamp that must carry an explicit offset
pub fn parse_timestamp(value: &str) -> Result<CivilTimestamp> {
    let ts: CivilTimestamp = value.parse()?;
    if !ts.is_aware() {
        return Err(TimeError::NaiveTimestamp(value.trim().to_string()));
    }
    Ok(ts)
}

/// Represents a time scale for astronomical calculations
#[derive(Debug, Clone)]
pub struct Timescale {
    /// UTC Julian dates (at 0h) from which each offset applies
    leap_dates: Vec<f64>,
    /// TAI-UTC in seconds
    leap_offsets: Vec<f64>,
    /// Directory the timescale was loaded from, if any
    data_dir: Option<PathBuf>,
}

impl Default for Timescale {
    fn default() -> Self {
        let (leap_dates, leap_offsets) = BUILTIN_LEAP_SECONDS.iter().copied().unzip();
        Self {
            leap_dates,
            leap_offsets,
            data_dir: None,
        }
    }
}

/// TAI-UTC steps since 1972 as (UTC Julian date, seconds)
const BUILTIN_LEAP_SECONDS: &[(f64, f64)] = &[
    (2_441_317.5, 10.0), // 1972-01-01
    (2_441_499.5, 11.0), // 1972-07-01
    (2_441_683.5, 12.0), // 1973-01-01
    (2_442_048.5, 13.0), // 1974-01-01
    (2_442_413.5, 14.0), // 1975-01-01
    (2_442_778.5, 15.0), // 1976-01-01
    (2_443_144.5, 16.0), // 1977-01-01
    (2_443_509.5, 17.0), // 1978-01-01
    (2_443_874.5, 18.0), // 1979-01-01
    (2_444_239.5, 19.0), // 1980-01-01
    (2_444_786.5, 20.0), // 1981-07-01
    (2_445_151.5, 21.0), // 1982-07-01
    (2_445_516.5, 22.0), // 1983-07-01
    (2_446_247.5, 23.0), // 1985-07-01
    (2_447_161.5, 24.0), // 1988-01-01
    (2_447_892.5, 25.0), // 1990-01-01
    (2_448_257.5, 26.0), // 1991-01-01
    (2_448_804.5, 27.0), // 1992-07-01
    (2_449_169.5, 28.0), // 1993-07-01
    (2_449_534.5, 29.0), // 1994-07-01
    (2_450_083.5, 30.0), // 1996-01-01
    (2_450_630.5, 31.0), // 1997-07-01
    (2_451_179.5, 32.0), // 1999-01-01
    (2_453_736.5, 33.0), // 2006-01-01
    (2_454_832.5, 34.0), // 2009-01-01
    (2_456_109.5, 35.0), // 2012-07-01
    (2_457_204.5, 36.0), // 2015-07-01
    (2_457_754.5, 37.0), // 2017-01-01
];

impl Timescale {
    /// Build a timescale bound to a data directory
    ///
    /// A `Leap_Second.dat` file in the directory replaces the built-in leap
    /// second table; without one the built-in table is used.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let path = dir.join(LEAP_SECOND_FILE);
        let mut ts = if path.is_file() {
            debug!("Loading leap seconds from {}", path.display());
            Self::from_leap_second_file(&path)?
        } else {
            debug!(
                "No {} in {}, using built-in leap seconds",
                LEAP_SECOND_FILE,
                dir.display()
            );
            Self::default()
        };
        ts.data_dir = Some(dir.to_path_buf());
        Ok(ts)
    }

    /// Read an IERS `Leap_Second.dat` file (MJD, day, month, year, TAI-UTC)
    pub fn from_leap_second_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| TimeError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut leap_dates = Vec::new();
        let mut leap_offsets = Vec::new();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<f64> = line
                .split_whitespace()
                .map(str::parse)
                .collect::<std::result::Result<_, _>>()
                .map_err(|_| TimeError::LeapSecondFile {
                    path: path.to_path_buf(),
                    line: number + 1,
                })?;
            if fields.len() != 5 {
                return Err(TimeError::LeapSecondFile {
                    path: path.to_path_buf(),
                    line: number + 1,
                });
            }
            leap_dates.push(fields[0] + MJD_ZERO);
            leap_offsets.push(fields[4]);
        }

        if leap_dates.is_empty() {
            return Err(TimeError::LeapSecondFile {
                path: path.to_path_buf(),
                line: 0,
            });
        }

        Ok(Self {
            leap_dates,
            leap_offsets,
            data_dir: None,
        })
    }

    /// Directory this timescale was loaded from
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// TAI-UTC in seconds at a UTC Julian date
    pub fn leap_offset(&self, jd_utc: f64) -> f64 {
        let idx = self.leap_dates.partition_point(|&date| date <= jd_utc);
        if idx == 0 {
            PRE_1972_OFFSET
        } else {
            self.leap_offsets[idx - 1]
        }
    }

    /// Create a time from a UTC datetime
    pub fn from_datetime(&self, dt: DateTime<Utc>) -> Time {
        // Midnight of the civil date, which is a Julian date ending in .5
        let whole = julian_day(dt.year(), dt.month(), dt.day()) as f64 - 0.5;
        let seconds = dt.num_seconds_from_midnight() as f64 + dt.nanosecond() as f64 * 1e-9;
        let leap = self.leap_offset(whole + seconds / DAY_S);
        let tt_fraction = (seconds + leap + TT_MINUS_TAI_S) / DAY_S;
        self.tt_parts(whole, tt_fraction)
    }

    /// Convert a civil timestamp, rejecting naive ones
    pub fn from_civil(&self, ts: &CivilTimestamp) -> Result<Time> {
        Ok(self.from_datetime(ts.to_utc()?))
    }

    /// Create a time from a UTC calendar date and time
    pub fn utc(
        &self,
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Result<Time> {
        let dt = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, second))
            .ok_or_else(|| {
                TimeError::ParseError(format!(
                    "{}-{:02}-{:02} {:02}:{:02}:{:02} is not a valid date",
                    year, month, day, hour, minute, second
                ))
            })?;
        Ok(self.from_datetime(Utc.from_utc_datetime(&dt)))
    }

    /// Create a time from a TT Julian date
    pub fn tt_jd(&self, jd: f64) -> Time {
        let whole = jd.floor();
        self.tt_parts(whole, jd - whole)
    }

    /// Create a time from a UT1 Julian date
    pub fn ut1_jd(&self, jd: f64) -> Time {
        // ΔT changes by well under a millisecond per minute, so one
        // refinement is plenty
        let mut tt = jd + delta_t_approx(jd) / DAY_S;
        tt = jd + delta_t_approx(tt) / DAY_S;
        let whole = jd.floor();
        self.tt_parts(whole, tt - whole)
    }

    fn tt_parts(&self, whole: f64, tt_fraction: f64) -> Time {
        let tt = whole + tt_fraction;
        Time {
            whole,
            tt_fraction,
            tdb_fraction: tt_fraction + tdb_minus_tt(tt) / DAY_S,
            delta_t: delta_t_approx(tt),
        }
    }
}

/// ΔT = TT - UT1 in seconds at a TT Julian date
///
/// Espenak & Meeus polynomial fits, valid from antiquity to 2150 with a long
/// term parabola outside that range.
pub fn delta_t_approx(jd_tt: f64) -> f64 {
    let year = (jd_tt - 1_721_045.0) / 365.25;
    if year < -500.0 || year >= 2150.0 {
        let u = (year - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u
    } else if year < 500.0 {
        let t = year / 100.0;
        10583.6 - 1014.41 * t + 33.78311 * t * t - 5.952053 * t.powi(3) - 0.1798452 * t.powi(4)
            + 0.022174192 * t.powi(5)
            + 0.0090316521 * t.powi(6)
    } else if year < 1600.0 {
        let t = (year - 1000.0) / 100.0;
        1574.2 - 556.01 * t + 71.23472 * t * t + 0.319781 * t.powi(3)
            - 0.8503463 * t.powi(4)
            - 0.005050998 * t.powi(5)
            + 0.0083572073 * t.powi(6)
    } else if year < 1700.0 {
        let t = year - 1600.0;
        120.0 - 0.9808 * t - 0.01532 * t * t + t.powi(3) / 7129.0
    } else if year < 1800.0 {
        let t = year - 1700.0;
        8.83 + 0.1603 * t - 0.0059285 * t * t + 0.00013336 * t.powi(3) - t.powi(4) / 1174000.0
    } else if year < 1860.0 {
        let t = year - 1800.0;
        13.72 - 0.332447 * t + 0.0068612 * t * t + 0.0041116 * t.powi(3)
            - 0.00037436 * t.powi(4)
            + 0.0000121272 * t.powi(5)
            - 0.0000001699 * t.powi(6)
            + 0.000000000875 * t.powi(7)
    } else if year < 1900.0 {
        let t = year - 1860.0;
        7.62 + 0.5737 * t - 0.251754 * t * t + 0.01680668 * t.powi(3) - 0.0004473624 * t.powi(4)
            + t.powi(5) / 233174.0
    } else if year < 1920.0 {
        let t = year - 1900.0;
        -2.79 + 1.494119 * t - 0.0598939 * t * t + 0.0061966 * t.powi(3) - 0.000197 * t.powi(4)
    } else if year < 1941.0 {
        let t = year - 1920.0;
        21.20 + 0.84493 * t - 0.076100 * t * t + 0.0020936 * t.powi(3)
    } else if year < 1961.0 {
        let t = year - 1950.0;
        29.07 + 0.407 * t - t * t / 233.0 + t.powi(3) / 2547.0
    } else if year < 1986.0 {
        let t = year - 1975.0;
        45.45 + 1.067 * t - t * t / 260.0 - t.powi(3) / 718.0
    } else if year < 2005.0 {
        let t = year - 2000.0;
        63.86 + 0.3345 * t - 0.060374 * t * t
            + 0.0017275 * t.powi(3)
            + 0.000651814 * t.powi(4)
            + 0.00002373599 * t.powi(5)
    } else if year < 2050.0 {
        let t = year - 2000.0;
        62.92 + 0.32217 * t + 0.005589 * t * t
    } else {
        let u = (year - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u - 0.5628 * (2150.0 - year)
    }
}

/// TDB - TT in seconds (USNO Circular 179, eq. 2.6)
pub fn tdb_minus_tt(jd_tt: f64) -> f64 {
    let t = (jd_tt - J2000) / DAYS_PER_CENTURY;

    0.001657 * f64::sin(628.3076 * t + 6.2401)
        + 0.000022 * f64::sin(575.3385 * t + 4.2970)
        + 0.000014 * f64::sin(1256.6152 * t + 6.1969)
        + 0.000005 * f64::sin(606.9777 * t + 4.0212)
        + 0.000005 * f64::sin(52.9691 * t + 0.4444)
        + 0.000002 * f64::sin(21.3299 * t + 5.5431)
        + 0.000010 * t * f64::sin(628.3076 * t + 4.2490)
}

/// Julian day number of a calendar date at noon
///
/// This follows the algorithm in the Explanatory Supplement to the
/// Astronomical Almanac 15.11. Dates before 1582-10-15 use the Julian
/// calendar.
pub fn julian_day(year: i32, month: u32, day: u32) -> i32 {
    let janfeb = month <= 2;
    let g = year + 4716 - if janfeb { 1 } else { 0 };
    let f = (month as i32 + 9) % 12;
    let e = 1461 * g / 4 + day as i32 - 1402;
    let j = e + (153 * f + 2) / 5;

    if j >= GREGORIAN_START {
        j + 38 - (g + 184) / 100 * 3 / 4
    } else {
        j
    }
}

/// Calendar date (year, month, day) of a Julian day number
pub fn calendar_date(jd: i32) -> (i32, u32, u32) {
    let mut f = jd + 1401;
    if jd >= GREGORIAN_START {
        f += (4 * jd + 274_277) / 146_097 * 3 / 4 - 38;
    }

    let e = 4 * f + 3;
    let g = (e % 1461) / 4;
    let h = 5 * g + 2;
    let day = (h % 153) / 5 + 1;
    let month = (h / 153 + 2) % 12 + 1;
    let year = e / 1461 - 4716 + (12 + 2 - month) / 12;

    (year, month as u32, day as u32)
}

/// Format a Julian date as YYYY-MM-DD
pub fn format_date(jd: f64) -> String {
    let (year, month, day) = calendar_date((jd + 0.5).floor() as i32);
    format!("{:04}-{:02}-{:02}", year, month, day)
}

/// A single instant, stored as TT split into a whole and fractional day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Time {
    whole: f64,
    tt_fraction: f64,
    tdb_fraction: f64,
    delta_t: f64,
}

impl Time {
    /// TT (Terrestrial Time) as Julian date
    pub fn tt(&self) -> f64 {
        self.whole + self.tt_fraction
    }

    /// TDB (Barycentric Dynamical Time) as Julian date
    pub fn tdb(&self) -> f64 {
        self.whole + self.tdb_fraction
    }

    /// UT1 as Julian date
    pub fn ut1(&self) -> f64 {
        self.whole + self.ut1_fraction()
    }

    fn ut1_fraction(&self) -> f64 {
        self.tt_fraction - self.delta_t / DAY_S
    }

    /// TT - UT1 in seconds
    pub fn delta_t(&self) -> f64 {
        self.delta_t
    }

    /// TT in Julian centuries since J2000.0
    pub fn tt_centuries(&self) -> f64 {
        (self.whole - J2000 + self.tt_fraction) / DAYS_PER_CENTURY
    }

    /// TDB in Julian centuries since J2000.0
    pub fn tdb_centuries(&self) -> f64 {
        (self.whole - J2000 + self.tdb_fraction) / DAYS_PER_CENTURY
    }

    /// Greenwich mean sidereal time in hours
    pub fn gmst(&self) -> f64 {
        earthlib::sidereal_time(self.whole, self.ut1_fraction(), self.tdb())
    }

    /// Greenwich apparent sidereal time in hours
    pub fn gast(&self) -> f64 {
        let (dpsi, _) = self.nutation_angles_radians();
        let eqeq = nutationlib::equation_of_the_equinoxes(
            self.tdb_centuries(),
            dpsi,
            self.mean_obliquity_radians(),
        );
        (self.gmst() + eqeq.to_degrees() / 15.0).rem_euclid(24.0)
    }

    /// Mean obliquity of the ecliptic in radians
    pub fn mean_obliquity_radians(&self) -> f64 {
        nutationlib::mean_obliquity(self.tdb_centuries())
    }

    /// Nutation in longitude and obliquity `(Δψ, Δε)` in radians
    pub fn nutation_angles_radians(&self) -> (f64, f64) {
        nutationlib::iau2000b_radians(self.tdb_centuries())
    }

    /// True obliquity: mean obliquity plus nutation in obliquity
    pub fn true_obliquity_radians(&self) -> f64 {
        self.mean_obliquity_radians() + self.nutation_angles_radians().1
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Time tt={:.8}>", self.tt())
    }
}
