//! JPL Ephemeris module for high-precision planetary positions
//!
//! This module reads JPL Development Ephemerides (DE) distributed as binary
//! SPK (Spacecraft Planet Kernel) files in the SPICE format.
//!
//! # Main Components
//!
//! - `daf`: Double Array File format reader (underlying format of SPK files)
//! - `spk`: Spacecraft Planet Kernel format reader
//! - `chebyshev`: Chebyshev series evaluation used by SPK types 2 and 3
//! - `names`: Mappings between celestial body names and ID numbers
//! - Error types for proper error handling

pub mod chebyshev;
pub mod daf;
pub mod errors;
pub mod names;
pub mod spk;

// Re-export primary types for convenience
pub use self::errors::JplephemError;
pub use self::spk::SPK;
