//! NAIF body names and ID numbers
//!
//! Only the bodies that appear in the planetary DE kernels are listed.

use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    /// Map from NAIF ID numbers to canonical names (first listed name wins)
    static ref TARGET_NAMES: HashMap<i32, &'static str> = {
        let mut m = HashMap::new();
        for &(id, name) in TARGET_NAME_PAIRS.iter() {
            m.entry(id).or_insert(name);
        }
        m
    };

    /// Map from lowercase names to NAIF ID numbers
    static ref TARGET_IDS: HashMap<String, i32> = TARGET_NAME_PAIRS
        .iter()
        .map(|&(id, name)| (name.to_lowercase(), id))
        .collect();
}

/// Get the canonical name of a body given its NAIF ID
pub fn target_name(id: i32) -> Option<&'static str> {
    TARGET_NAMES.get(&id).copied()
}

/// Get the NAIF ID of a body given any of its names (case-insensitive)
pub fn target_id(name: &str) -> Option<i32> {
    TARGET_IDS.get(&name.to_lowercase()).copied()
}

/// Name used in listings, falling back to the bare ID
pub fn display_name(id: i32) -> String {
    target_name(id)
        .map(str::to_string)
        .unwrap_or_else(|| format!("BODY {}", id))
}

const TARGET_NAME_PAIRS: &[(i32, &str)] = &[
    (0, "SOLAR SYSTEM BARYCENTER"),
    (0, "SSB"),
    (1, "MERCURY BARYCENTER"),
    (2, "VENUS BARYCENTER"),
    (3, "EARTH BARYCENTER"),
    (3, "EMB"),
    (3, "EARTH MOON BARYCENTER"),
    (4, "MARS BARYCENTER"),
    (5, "JUPITER BARYCENTER"),
    (6, "SATURN BARYCENTER"),
    (7, "URANUS BARYCENTER"),
    (8, "NEPTUNE BARYCENTER"),
    (9, "PLUTO BARYCENTER"),
    (10, "SUN"),
    (199, "MERCURY"),
    (299, "VENUS"),
    (301, "MOON"),
    (399, "EARTH"),
    (499, "MARS"),
];

/// NAIF IDs used by the pipeline
pub mod targets {
    /// Solar System Barycenter
    pub const SOLAR_SYSTEM_BARYCENTER: i32 = 0;
    /// Earth-Moon Barycenter
    pub const EARTH_MOON_BARYCENTER: i32 = 3;
    /// Sun
    pub const SUN: i32 = 10;
    /// Moon
    pub const MOON: i32 = 301;
    /// Earth
    pub const EARTH: i32 = 399;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_both_ways() {
        assert_eq!(target_id("moon"), Some(targets::MOON));
        assert_eq!(target_id("Earth Moon Barycenter"), Some(3));
        assert_eq!(target_name(0), Some("SOLAR SYSTEM BARYCENTER"));
        assert_eq!(target_name(399), Some("EARTH"));
        assert_eq!(target_id("vulcan"), None);
    }

    #[test]
    fn test_display_name_fallback() {
        assert_eq!(display_name(10), "SUN");
        assert_eq!(display_name(2000001), "BODY 2000001");
    }
}
