//! The sample pipeline over a kernel loaded from disk

mod common;

use std::fs;

use approx::assert_abs_diff_eq;
use nalgebra::Vector3;
use tempfile::TempDir;
use vedic_ephemeris::data::{KernelSearch, DEFAULT_EPHEMERIS_NAME};
use vedic_ephemeris::jplephem::names::targets;
use vedic_ephemeris::positions::ecliptic_latlon;
use vedic_ephemeris::vedic::{ascendant_degrees, local_sidereal_degrees};
use vedic_ephemeris::{
    compute_sample, wrap_degrees, AyanamsaService, CivilTimestamp, Ephemeris, JplEphemeris,
    LahiriFallbackAyanamsa, Location, Time, Timescale, TrueLahiriAyanamsa, VedicError,
};

use common::{write_standard_kernel, AU_KM};

const TEHRAN: (f64, f64) = (35.6892, 51.3890);

fn circular_gap(a: f64, b: f64) -> f64 {
    let d = (a - b).abs() % 360.0;
    d.min(360.0 - d)
}

fn synthetic() -> (TempDir, JplEphemeris) {
    let dir = TempDir::new().unwrap();
    let path = write_standard_kernel(dir.path(), "de440s.bsp");
    let ephemeris = JplEphemeris::open(&path).unwrap();
    (dir, ephemeris)
}

fn timestamp(text: &str) -> CivilTimestamp {
    text.parse().unwrap()
}

/// Geometric geocentric longitude straight from the kernel
fn geometric_longitude(ephemeris: &JplEphemeris, target: i32, time: &Time) -> f64 {
    let spk = ephemeris.spk();
    let (earth, _) = spk.position_velocity(targets::EARTH, time.tdb()).unwrap();
    let (body, _) = spk.position_velocity(target, time.tdb()).unwrap();
    let relative: Vector3<f64> = (body - earth) / AU_KM;
    ecliptic_latlon(&relative, time).1
}

#[test]
fn test_longitudes_follow_the_kernel() {
    let (_dir, ephemeris) = synthetic();
    let time = ephemeris
        .to_time(&timestamp("1979-10-12T04:30:00+00:00"))
        .unwrap();

    // Bodies in the synthetic kernel are static, so apparent and geometric
    // directions agree to well under a milliarcsecond
    for (name, target) in [("sun", targets::SUN), ("Moon", targets::MOON)] {
        let apparent = ephemeris.ecliptic_longitude(name, &time).unwrap();
        let geometric = geometric_longitude(&ephemeris, target, &time);
        assert!((0.0..360.0).contains(&apparent));
        assert!(
            circular_gap(apparent, geometric) < 1e-5,
            "{}: {} vs {}",
            name,
            apparent,
            geometric
        );
    }
}

#[test]
fn test_unknown_body_is_rejected() {
    let (_dir, ephemeris) = synthetic();
    let time = Timescale::default().tt_jd(2_451_545.0);
    match ephemeris.ecliptic_longitude("mars", &time) {
        Err(VedicError::UnknownBody(name)) => assert_eq!(name, "mars"),
        other => panic!("expected UnknownBody, got {:?}", other),
    }
}

#[test]
fn test_naive_timestamp_is_rejected() {
    let (_dir, ephemeris) = synthetic();
    let naive = timestamp("1979-10-12 04:30:00");
    assert!(!naive.is_aware());
    assert!(matches!(ephemeris.to_time(&naive), Err(VedicError::Time(_))));
    assert!(compute_sample(&naive, Location::new(TEHRAN.0, TEHRAN.1), Some(&ephemeris), None).is_err());
}

#[test]
fn test_offsets_name_the_same_instant() {
    let (_dir, ephemeris) = synthetic();
    let utc = ephemeris
        .to_time(&timestamp("1997-06-07T16:58:00Z"))
        .unwrap();
    let local = ephemeris
        .to_time(&timestamp("1997-06-07T20:28:00+03:30"))
        .unwrap();
    assert_abs_diff_eq!(utc.tt(), local.tt(), epsilon = 1e-9);
}

#[test]
fn test_sample_is_consistent() {
    let (_dir, ephemeris) = synthetic();
    let ts = timestamp("1979-10-12T04:30:00+00:00");
    let location = Location::new(TEHRAN.0, TEHRAN.1);

    let sample = compute_sample(&ts, location, Some(&ephemeris), Some(&LahiriFallbackAyanamsa))
        .unwrap();
    let time = ephemeris.to_time(&ts).unwrap();

    assert_eq!(sample.timestamp_tt_jd, time.tt());
    assert_eq!(sample.location, location);
    assert_abs_diff_eq!(sample.ayanamsa_deg, 23.574_05, epsilon = 1e-4);

    for (name, body) in sample.bodies() {
        assert!((0.0..360.0).contains(&body.tropical_deg), "{}", name);
        assert!((0.0..360.0).contains(&body.sidereal_deg), "{}", name);
        assert!(
            circular_gap(body.sidereal_deg, wrap_degrees(body.tropical_deg - sample.ayanamsa_deg))
                < 1e-9,
            "{}",
            name
        );
    }

    let sun = ephemeris.ecliptic_longitude("sun", &time).unwrap();
    assert_abs_diff_eq!(sample.sun.tropical_deg, sun, epsilon = 1e-12);

    let lst = local_sidereal_degrees(&time, location.longitude_deg);
    let ascendant =
        ascendant_degrees(lst, time.true_obliquity_radians(), location.latitude_deg).unwrap();
    assert_abs_diff_eq!(sample.ascendant.tropical_deg, ascendant, epsilon = 1e-12);
}

#[test]
fn test_default_ayanamsa_is_the_mean_polynomial() {
    let (_dir, ephemeris) = synthetic();
    let ts = timestamp("1997-06-07T20:28:00+03:30");
    let location = Location::new(TEHRAN.0, TEHRAN.1);

    let defaulted = compute_sample(&ts, location, Some(&ephemeris), None).unwrap();
    let time = ephemeris.to_time(&ts).unwrap();
    assert_eq!(defaulted.ayanamsa_deg, LahiriFallbackAyanamsa.lahiri(&time));

    let true_lahiri =
        compute_sample(&ts, location, Some(&ephemeris), Some(&TrueLahiriAyanamsa)).unwrap();
    assert_eq!(true_lahiri.sun.tropical_deg, defaulted.sun.tropical_deg);
    assert!(circular_gap(true_lahiri.sun.sidereal_deg, defaulted.sun.sidereal_deg) < 20.0 / 3600.0);
}

#[test]
fn test_polar_location_fails() {
    let (_dir, ephemeris) = synthetic();
    let ts = timestamp("1979-10-12T04:30:00+00:00");
    let result = compute_sample(&ts, Location::new(90.0, 0.0), Some(&ephemeris), None);
    assert!(matches!(result, Err(VedicError::PolarLatitude(_))));
}

#[test]
fn test_dates_outside_the_kernel_fail() {
    let (_dir, ephemeris) = synthetic();
    let ts = timestamp("1900-01-01T00:00:00+00:00");
    let result = compute_sample(&ts, Location::new(TEHRAN.0, TEHRAN.1), Some(&ephemeris), None);
    match result {
        Err(err @ VedicError::Ephemeris(_)) => assert!(!err.is_kernel_error()),
        other => panic!("expected an ephemeris error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_leap_seconds_next_to_the_kernel_are_used() {
    let (dir, _) = synthetic();
    // A single made-up step so the effect is unmistakable
    fs::write(dir.path().join("Leap_Second.dat"), "41317.0 1 1 1972 99\n").unwrap();
    let ephemeris = JplEphemeris::open(dir.path().join("de440s.bsp")).unwrap();
    assert_eq!(ephemeris.timescale().data_dir(), Some(dir.path()));

    let ts = timestamp("1979-10-12T04:30:00+00:00");
    let custom = ephemeris.to_time(&ts).unwrap();
    let builtin = Timescale::default().from_civil(&ts).unwrap();
    assert_abs_diff_eq!(custom.tt() - builtin.tt(), (99.0 - 18.0) / 86_400.0, epsilon = 1e-8);
}

#[test]
fn test_environment_override_is_honored() {
    let dir = TempDir::new().unwrap();
    let path = write_standard_kernel(dir.path(), "custom.bsp");
    let search = KernelSearch {
        env_override: Some(path.clone()),
        extra_search_paths: Vec::new(),
        user_cache_dir: dir.path().join("user"),
        bundled_dir: dir.path().join("bundled"),
        download_url: "https://example.invalid/de421.bsp".to_string(),
    };

    let ephemeris = JplEphemeris::with_search(search, None, DEFAULT_EPHEMERIS_NAME).unwrap();
    assert_eq!(ephemeris.kernel_path(), path.as_path());
    assert_eq!(ephemeris.spk().segments.len(), 5);
}

#[test]
fn test_missing_kernel_file_is_a_kernel_error() {
    let dir = TempDir::new().unwrap();
    let err = JplEphemeris::open(dir.path().join("absent.bsp")).unwrap_err();
    assert!(err.is_kernel_error());
}

// The scenarios below need a real DE kernel, found or downloaded through
// the normal search. Run them with `cargo test -- --ignored`.

#[test]
#[ignore]
fn test_tehran_1979_sample() {
    let ephemeris = JplEphemeris::new(None, DEFAULT_EPHEMERIS_NAME).unwrap();
    let sample = compute_sample(
        &timestamp("1979-10-12T04:30:00+00:00"),
        Location::new(TEHRAN.0, TEHRAN.1),
        Some(&ephemeris),
        None,
    )
    .unwrap();

    assert_abs_diff_eq!(sample.ayanamsa_deg, 23.574, epsilon = 1e-3);
    // Sun in late Virgo tropically, mid Virgo sidereally
    assert!((197.5..200.0).contains(&sample.sun.tropical_deg), "{}", sample.sun.tropical_deg);
    // Ascendant in sidereal Libra
    assert!(
        (180.0..210.0).contains(&sample.ascendant.sidereal_deg),
        "{}",
        sample.ascendant.sidereal_deg
    );
}

#[test]
#[ignore]
fn test_tehran_1997_sample() {
    let ephemeris = JplEphemeris::new(None, DEFAULT_EPHEMERIS_NAME).unwrap();
    let sample = compute_sample(
        &timestamp("1997-06-07T20:28:00+03:30"),
        Location::new(TEHRAN.0, TEHRAN.1),
        Some(&ephemeris),
        None,
    )
    .unwrap();

    assert_abs_diff_eq!(sample.ascendant.sidereal_deg, 249.77, epsilon = 1.0);
    for (name, body) in sample.bodies() {
        assert!(
            circular_gap(body.sidereal_deg, wrap_degrees(body.tropical_deg - sample.ayanamsa_deg))
                < 1e-9,
            "{}",
            name
        );
    }
}
