//! vedic-ephemeris: tropical and sidereal longitudes for Vedic charts
//!
//! This crate computes the apparent longitudes of the Sun and Moon and the
//! Ascendant from JPL SPK kernels, and converts them to the sidereal zodiac
//! with the Lahiri ayanamsa.
//!
//! The pieces, leaf to root:
//!
//! - [`data`]: locate or download an ephemeris kernel
//! - [`ephemeris`]: the `Ephemeris` adapter over a loaded kernel
//! - [`sidereal`]: the `AyanamsaService` trait and Lahiri models
//! - [`vedic`]: the sample pipeline tying them together
//! - [`coordinates`]: angle wrapping and DMS formatting

use std::io;

use thiserror::Error;

pub mod constants;
pub mod coordinates;
pub mod data;
pub mod earthlib;
pub mod ephemeris;
pub mod framelib;
pub mod jplephem;
pub mod nutationlib;
pub mod positions;
pub mod precessionlib;
pub mod sidereal;
pub mod time;
pub mod vedic;

// Re-export commonly used types
pub use coordinates::{format_dms, parse_dms, wrap_degrees};
pub use data::{ensure_kernel_available, KernelError, KernelSearch};
pub use ephemeris::{Body, Ephemeris, JplEphemeris};
pub use jplephem::JplephemError;
pub use sidereal::{AyanamsaService, LahiriFallbackAyanamsa, TrueLahiriAyanamsa};
pub use time::{parse_timestamp, CivilTimestamp, Time, TimeError, Timescale};
pub use vedic::{compute_sample, BodyLongitude, Location, VedicSample};

/// Main error type for the vedic-ephemeris library
#[derive(Debug, Error)]
pub enum VedicError {
    #[error(transparent)]
    Kernel(#[from] KernelError),

    #[error("Ephemeris error: {0}")]
    Ephemeris(#[from] JplephemError),

    #[error("Time error: {0}")]
    Time(#[from] TimeError),

    #[error("Unknown body {0:?}; supported bodies are \"sun\" and \"moon\"")]
    UnknownBody(String),

    #[error("Ascendant is undefined at latitude {0}°")]
    PolarLatitude(f64),
}

impl VedicError {
    /// Whether the error means no usable kernel file is available
    ///
    /// True for resolution and download failures and for a kernel path that
    /// cannot be opened because it does not exist.
    pub fn is_kernel_error(&self) -> bool {
        match self {
            VedicError::Kernel(_) => true,
            VedicError::Ephemeris(JplephemError::FileError { source, .. }) => {
                source.kind() == io::ErrorKind::NotFound
            }
            _ => false,
        }
    }
}

/// Result type for vedic-ephemeris operations
pub type Result<T> = std::result::Result<T, VedicError>;
