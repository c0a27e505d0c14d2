//! Angle handling for ecliptic longitudes

pub mod angle;

pub use angle::{format_dms, parse_dms, wrap_degrees, Dms};
