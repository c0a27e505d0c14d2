//! Spacecraft Planet Kernel (SPK) format handling
//!
//! This module provides functionality for reading NASA SPICE SPK files which
//! contain position and velocity data for solar system bodies.
//!
//! The SPK format is described in:
//! http://naif.jpl.nasa.gov/pub/naif/toolkit_docs/FORTRAN/req/spk.html
use crate::constants::{DAY_S, J2000};
use crate::jplephem::chebyshev::{normalize_time, ChebyshevPolynomial};
use crate::jplephem::daf::{Summary, DAF};
use crate::jplephem::errors::{JplephemError, Result};
use crate::jplephem::names::{display_name, targets};
use log::debug;
use nalgebra::Vector3;
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

/// Longest center chain followed before giving up
const MAX_CHAIN: usize = 8;

/// Convert seconds since J2000 to Julian date
pub fn seconds_to_jd(seconds: f64) -> f64 {
    J2000 + seconds / DAY_S
}

/// Convert Julian date to seconds since J2000
pub fn jd_to_seconds(jd: f64) -> f64 {
    (jd - J2000) * DAY_S
}

/// Spacecraft Planet Kernel (SPK) file reader
pub struct SPK {
    /// The underlying DAF file
    pub daf: DAF,
    /// List of segments in the file, in file order
    pub segments: Vec<Segment>,
    /// Segment indices keyed by target body
    by_target: HashMap<i32, Vec<usize>>,
}

/// A segment in an SPK file holding one body's motion relative to a center
pub struct Segment {
    /// Source of the segment (e.g. "DE-0440LE-0440")
    pub source: String,
    /// Initial epoch in seconds past J2000 (TDB)
    pub start_second: f64,
    /// Final epoch in seconds past J2000 (TDB)
    pub end_second: f64,
    /// Target body ID
    pub target: i32,
    /// Center body ID
    pub center: i32,
    /// Reference frame ID (1 = J2000/ICRF)
    pub frame: i32,
    /// Data type (2: Chebyshev position, 3: Chebyshev position and velocity)
    pub data_type: i32,
    /// First word address of the segment data
    pub start_i: usize,
    /// Last word address of the segment data
    pub end_i: usize,
    data: OnceLock<SegmentData>,
}

/// Coefficients of a segment, loaded on first use
#[derive(Debug)]
struct SegmentData {
    /// Initial epoch of the first record (TDB seconds past J2000)
    init: f64,
    /// Interval length of each record in seconds
    intlen: f64,
    /// Record size in double-precision words
    rsize: usize,
    /// Number of records
    n_records: usize,
    /// Number of coefficients per component
    n_coeffs: usize,
    /// All records back to back, directory excluded
    coefficients: Vec<f64>,
}

impl SPK {
    /// Open an SPK file at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let daf = DAF::open(path)?;
        if daf.locidw != "DAF/SPK" && daf.locidw != "NAIF/DAF" {
            return Err(JplephemError::InvalidFormat(format!(
                "{} is a {} file, not an SPK kernel",
                daf.path.display(),
                daf.locidw
            )));
        }
        if daf.nd != 2 || daf.ni != 6 {
            return Err(JplephemError::InvalidFormat(format!(
                "SPK summaries must have ND=2, NI=6 (found ND={}, NI={})",
                daf.nd, daf.ni
            )));
        }

        let segments = daf
            .summaries()?
            .into_iter()
            .map(Segment::from_summary)
            .collect::<Vec<_>>();

        let mut by_target: HashMap<i32, Vec<usize>> = HashMap::new();
        for (idx, segment) in segments.iter().enumerate() {
            by_target.entry(segment.target).or_default().push(idx);
        }
        debug!(
            "SPK {}: {} segments",
            daf.path.display(),
            segments.len()
        );

        Ok(SPK {
            daf,
            segments,
            by_target,
        })
    }

    /// Read the comments from the SPK file
    pub fn comments(&self) -> Result<String> {
        self.daf.comments()
    }

    /// Return the first segment for the given center and target body IDs
    pub fn get_segment(&self, center: i32, target: i32) -> Result<&Segment> {
        self.by_target
            .get(&target)
            .into_iter()
            .flatten()
            .map(|&idx| &self.segments[idx])
            .find(|segment| segment.center == center)
            .ok_or(JplephemError::BodyNotFound { center, target })
    }

    /// Find the segment for `target` that covers the given TDB Julian date
    fn segment_for(&self, target: i32, tdb_jd: f64) -> Result<&Segment> {
        let candidates = self
            .by_target
            .get(&target)
            .ok_or(JplephemError::BodyNotFound {
                center: targets::SOLAR_SYSTEM_BARYCENTER,
                target,
            })?;

        let et = jd_to_seconds(tdb_jd);
        candidates
            .iter()
            .map(|&idx| &self.segments[idx])
            .find(|segment| segment.covers(et))
            .ok_or_else(|| {
                let first = &self.segments[candidates[0]];
                JplephemError::OutOfRange {
                    jd: tdb_jd,
                    start_jd: first.start_jd(),
                    end_jd: first.end_jd(),
                }
            })
    }

    /// Position (km) and velocity (km/s) of a body relative to the solar
    /// system barycenter, summed along the chain of segment centers
    pub fn position_velocity(
        &self,
        target: i32,
        tdb_jd: f64,
    ) -> Result<(Vector3<f64>, Vector3<f64>)> {
        let mut position = Vector3::zeros();
        let mut velocity = Vector3::zeros();
        let mut body = target;

        for _ in 0..MAX_CHAIN {
            if body == targets::SOLAR_SYSTEM_BARYCENTER {
                return Ok((position, velocity));
            }
            let segment = self.segment_for(body, tdb_jd)?;
            let (p, v) = segment.compute_and_differentiate(&self.daf, tdb_jd)?;
            position += p;
            velocity += v;
            body = segment.center;
        }

        Err(JplephemError::InvalidFormat(format!(
            "segment chain for body {} does not reach the barycenter",
            target
        )))
    }
}

impl Segment {
    fn from_summary(summary: Summary) -> Self {
        let ints = &summary.integers;
        Segment {
            source: summary.name,
            start_second: summary.doubles[0],
            end_second: summary.doubles[1],
            target: ints[0],
            center: ints[1],
            frame: ints[2],
            data_type: ints[3],
            start_i: ints[4].max(0) as usize,
            end_i: ints[5].max(0) as usize,
            data: OnceLock::new(),
        }
    }

    /// Start of coverage as a TDB Julian date
    pub fn start_jd(&self) -> f64 {
        seconds_to_jd(self.start_second)
    }

    /// End of coverage as a TDB Julian date
    pub fn end_jd(&self) -> f64 {
        seconds_to_jd(self.end_second)
    }

    fn covers(&self, et: f64) -> bool {
        et >= self.start_second && et <= self.end_second
    }

    /// Compute position (km) and velocity (km/s) at a TDB Julian date
    pub fn compute_and_differentiate(
        &self,
        daf: &DAF,
        tdb_jd: f64,
    ) -> Result<(Vector3<f64>, Vector3<f64>)> {
        let et = jd_to_seconds(tdb_jd);
        if !self.covers(et) {
            return Err(JplephemError::OutOfRange {
                jd: tdb_jd,
                start_jd: self.start_jd(),
                end_jd: self.end_jd(),
            });
        }

        let data = self.load_data(daf)?;
        let index = (((et - data.init) / data.intlen).floor().max(0.0) as usize)
            .min(data.n_records - 1);
        let record = &data.coefficients[index * data.rsize..(index + 1) * data.rsize];
        let (mid, radius) = (record[0], record[1]);
        let x = normalize_time(et, mid, radius);
        let n = data.n_coeffs;

        let mut position = Vector3::zeros();
        let mut velocity = Vector3::zeros();
        for axis in 0..3 {
            let (value, slope) = component(record, n, axis).evaluate_with_derivative(x);
            position[axis] = value;
            velocity[axis] = match self.data_type {
                3 => component(record, n, axis + 3).evaluate(x),
                _ => slope / radius,
            };
        }

        Ok((position, velocity))
    }

    /// Load the segment coefficients if not already loaded
    fn load_data(&self, daf: &DAF) -> Result<&SegmentData> {
        if let Some(data) = self.data.get() {
            return Ok(data);
        }

        let components = match self.data_type {
            2 => 3,
            3 => 6,
            other => return Err(JplephemError::UnsupportedDataType(other)),
        };

        let array = daf.read_array(self.start_i, self.end_i)?;
        if array.len() < 4 {
            return Err(JplephemError::InvalidFormat(format!(
                "segment {} -> {} is too small to hold a directory",
                self.center, self.target
            )));
        }

        // The last 4 words are the directory: INIT, INTLEN, RSIZE, N
        let n = array.len();
        let init = array[n - 4];
        let intlen = array[n - 3];
        let rsize = array[n - 2] as usize;
        let n_records = array[n - 1] as usize;

        if rsize < 2 + components || (rsize - 2) % components != 0 || n_records == 0 {
            return Err(JplephemError::InvalidFormat(format!(
                "bad type {} directory: rsize={}, n={}",
                self.data_type, rsize, n_records
            )));
        }
        if n_records * rsize + 4 != n || intlen <= 0.0 {
            return Err(JplephemError::InvalidFormat(format!(
                "inconsistent segment size: expected {} words, found {}",
                n_records * rsize + 4,
                n
            )));
        }

        let mut coefficients = array;
        coefficients.truncate(n - 4);
        let data = SegmentData {
            init,
            intlen,
            rsize,
            n_records,
            n_coeffs: (rsize - 2) / components,
            coefficients,
        };
        Ok(self.data.get_or_init(|| data))
    }

    /// Return a textual description of the segment
    pub fn describe(&self, verbose: bool) -> String {
        use crate::time::format_date;

        let mut text = format!(
            "{}..{}  Type {}  {} ({}) -> {} ({})",
            format_date(self.start_jd()),
            format_date(self.end_jd()),
            self.data_type,
            display_name(self.center),
            self.center,
            display_name(self.target),
            self.target
        );
        if verbose {
            let source = if self.source.is_empty() {
                "Unknown"
            } else {
                self.source.as_str()
            };
            text.push_str(&format!("\n  frame={} source={}", self.frame, source));
        }
        text
    }
}

/// Series for component `k` of a record laid out as MID, RADIUS, then `n`
/// coefficients per component
fn component(record: &[f64], n: usize, k: usize) -> ChebyshevPolynomial<'_> {
    ChebyshevPolynomial::new(&record[2 + k * n..2 + (k + 1) * n])
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.describe(false))
    }
}

impl std::fmt::Debug for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.describe(true))
    }
}
