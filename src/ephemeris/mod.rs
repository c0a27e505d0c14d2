//! Ephemeris adapter
//!
//! The pipeline only needs two things from an ephemeris: turning a civil
//! timestamp into a dynamical-time instant, and the apparent ecliptic
//! longitude of a named body at that instant. The `Ephemeris` trait captures
//! that surface; `JplEphemeris` implements it on top of an SPK kernel.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::info;

use crate::data::{KernelSearch, DEFAULT_EPHEMERIS_NAME};
use crate::jplephem::names::targets;
use crate::jplephem::SPK;
use crate::positions::{barycentric, ecliptic_latlon};
use crate::time::{CivilTimestamp, Time, Timescale};
use crate::{Result, VedicError};

/// Bodies the adapter can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Body {
    Sun,
    Moon,
}

impl Body {
    /// Get the body's name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Body::Sun => "sun",
            Body::Moon => "moon",
        }
    }

    /// NAIF integer id of the body
    pub fn naif_id(&self) -> i32 {
        match self {
            Body::Sun => targets::SUN,
            Body::Moon => targets::MOON,
        }
    }
}

impl FromStr for Body {
    type Err = VedicError;

    fn from_str(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sun" => Ok(Body::Sun),
            "moon" => Ok(Body::Moon),
            _ => Err(VedicError::UnknownBody(name.to_string())),
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Time conversion and body longitudes as needed by the sample pipeline
pub trait Ephemeris {
    /// Convert an offset-aware timestamp into a dynamical-time instant
    fn to_time(&self, timestamp: &CivilTimestamp) -> Result<Time>;

    /// Apparent geocentric ecliptic longitude (degrees, true equinox of date)
    fn ecliptic_longitude(&self, body: &str, time: &Time) -> Result<f64>;
}

/// Ephemeris backed by a JPL SPK kernel
pub struct JplEphemeris {
    kernel_path: PathBuf,
    spk: SPK,
    timescale: Timescale,
}

impl JplEphemeris {
    /// Resolve `ephemeris_name` and load it
    ///
    /// `data_directory`, when given, is searched before the cache
    /// directories.
    pub fn new(data_directory: Option<&Path>, ephemeris_name: &str) -> Result<Self> {
        Self::with_search(KernelSearch::from_env(), data_directory, ephemeris_name)
    }

    /// Resolve a kernel with an explicit search configuration
    pub fn with_search(
        search: KernelSearch,
        data_directory: Option<&Path>,
        ephemeris_name: &str,
    ) -> Result<Self> {
        let search = search.with_extra_paths(data_directory);
        let path = search.resolve(ephemeris_name)?;
        Self::open(path)
    }

    /// Load a kernel file directly, skipping resolution
    ///
    /// The timescale is bound to the kernel's directory so a leap second
    /// file kept next to the kernel is picked up.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let spk = SPK::open(path)?;
        let data_dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let timescale = Timescale::load(data_dir)?;
        info!(
            "Loaded {} ({} segments)",
            path.display(),
            spk.segments.len()
        );

        Ok(Self {
            kernel_path: path.to_path_buf(),
            spk,
            timescale,
        })
    }

    /// Path of the loaded kernel
    pub fn kernel_path(&self) -> &Path {
        &self.kernel_path
    }

    /// Timescale bound to the kernel's directory
    pub fn timescale(&self) -> &Timescale {
        &self.timescale
    }

    /// The loaded kernel
    pub fn spk(&self) -> &SPK {
        &self.spk
    }

    /// Apparent geocentric ecliptic latitude and longitude in degrees
    pub fn ecliptic_latlon(&self, body: Body, time: &Time) -> Result<(f64, f64)> {
        let tdb = time.tdb();
        let earth = barycentric(&self.spk, targets::EARTH, tdb)?;
        let astrometric = earth.observe(&self.spk, body.naif_id(), tdb)?;
        let apparent = astrometric.apparent(&self.spk)?;
        Ok(ecliptic_latlon(&apparent, time))
    }
}

impl Ephemeris for JplEphemeris {
    fn to_time(&self, timestamp: &CivilTimestamp) -> Result<Time> {
        Ok(self.timescale.from_civil(timestamp)?)
    }

    fn ecliptic_longitude(&self, body: &str, time: &Time) -> Result<f64> {
        let body: Body = body.parse()?;
        let (_, lon) = self.ecliptic_latlon(body, time)?;
        Ok(lon)
    }
}

impl fmt::Debug for JplEphemeris {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JplEphemeris")
            .field("kernel_path", &self.kernel_path)
            .field("segments", &self.spk.segments.len())
            .finish()
    }
}

/// Load the default kernel with no extra search paths
pub fn load_default() -> Result<JplEphemeris> {
    JplEphemeris::new(None, DEFAULT_EPHEMERIS_NAME)
}
