//! Reading a synthetic SPK kernel end to end

mod common;

use approx::assert_abs_diff_eq;
use rstest::rstest;
use tempfile::TempDir;
use vedic_ephemeris::jplephem::daf::Endian;
use vedic_ephemeris::jplephem::names::targets;
use vedic_ephemeris::jplephem::{JplephemError, SPK};

use common::{standard_segments, write_spk, write_standard_kernel, END_JD, START_JD};

fn open_standard() -> (TempDir, SPK) {
    let dir = TempDir::new().unwrap();
    let path = write_standard_kernel(dir.path(), "synthetic.bsp");
    let spk = SPK::open(&path).unwrap();
    (dir, spk)
}

#[test]
fn test_file_record() {
    let (_dir, spk) = open_standard();
    assert_eq!(spk.daf.locidw, "DAF/SPK");
    assert_eq!((spk.daf.nd, spk.daf.ni), (2, 6));
    assert_eq!(spk.daf.ifname, "SYNTHETIC TEST");
    assert_eq!(spk.daf.endian, Endian::Little);
    assert_eq!(spk.comments().unwrap(), "Synthetic kernel for tests");
}

#[test]
fn test_segment_table() {
    let (_dir, spk) = open_standard();
    let table: Vec<(i32, i32, i32)> = spk
        .segments
        .iter()
        .map(|s| (s.center, s.target, s.data_type))
        .collect();
    assert_eq!(
        table,
        vec![(0, 10, 2), (0, 3, 2), (3, 399, 2), (3, 301, 2), (0, 4, 3)]
    );

    let earth = spk.get_segment(3, 399).unwrap();
    assert_eq!(earth.source, "SYNTHETIC-TEST");
    assert_eq!(earth.frame, 1);
    assert_abs_diff_eq!(earth.start_jd(), START_JD, epsilon = 1e-9);
    assert_abs_diff_eq!(earth.end_jd(), END_JD, epsilon = 1e-9);
    assert!(earth.end_i > earth.start_i);
}

#[test]
fn test_describe_names_bodies() {
    let (_dir, spk) = open_standard();
    let moon = spk.get_segment(3, 301).unwrap();
    let text = moon.describe(false);
    assert!(text.contains("Type 2"), "{}", text);
    assert!(text.contains("(3)"), "{}", text);
    assert!(text.contains("(301)"), "{}", text);
    assert!(moon.describe(true).contains("source=SYNTHETIC-TEST"));
}

#[rstest]
#[case(2_444_158.69)]
#[case(2_450_607.21)]
#[case(2_451_545.0)]
#[case(START_JD)]
#[case(END_JD)]
fn test_type2_matches_polynomial(#[case] tdb_jd: f64) {
    let (_dir, spk) = open_standard();
    let emb = &standard_segments()[1];
    let (expected_p, expected_v) = emb.evaluate(tdb_jd);

    let segment = spk.get_segment(0, 3).unwrap();
    let (p, v) = segment.compute_and_differentiate(&spk.daf, tdb_jd).unwrap();
    for axis in 0..3 {
        assert_abs_diff_eq!(p[axis], expected_p[axis], epsilon = 1e-3);
        assert_abs_diff_eq!(v[axis], expected_v[axis], epsilon = 1e-15);
    }
    // Linear term over a half interval gives a tiny but nonzero velocity
    assert!(v.x > 0.0 && v.y < 0.0 && v.z > 0.0);
}

#[test]
fn test_type3_reads_stored_velocity() {
    let (_dir, spk) = open_standard();
    let (p, v) = spk.position_velocity(4, 2_451_545.0).unwrap();
    assert_abs_diff_eq!(p.x, 1.5 * common::AU_KM, epsilon = 1e-3);
    assert_abs_diff_eq!(v.x, 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(v.y, 2.0, epsilon = 1e-12);
    assert_abs_diff_eq!(v.z, 3.0, epsilon = 1e-12);
}

#[test]
fn test_chain_sums_to_barycenter() {
    let (_dir, spk) = open_standard();
    let segments = standard_segments();
    let tdb_jd = 2_447_000.25;

    let (emb, emb_v) = segments[1].evaluate(tdb_jd);
    let (earth_offset, _) = segments[2].evaluate(tdb_jd);
    let (moon_offset, _) = segments[3].evaluate(tdb_jd);

    let (earth, earth_v) = spk.position_velocity(targets::EARTH, tdb_jd).unwrap();
    let (moon, _) = spk.position_velocity(targets::MOON, tdb_jd).unwrap();
    for axis in 0..3 {
        assert_abs_diff_eq!(earth[axis], emb[axis] + earth_offset[axis], epsilon = 1e-3);
        assert_abs_diff_eq!(moon[axis], emb[axis] + moon_offset[axis], epsilon = 1e-3);
        assert_abs_diff_eq!(earth_v[axis], emb_v[axis], epsilon = 1e-15);
    }

    let (sun, sun_v) = spk.position_velocity(targets::SUN, tdb_jd).unwrap();
    assert_abs_diff_eq!(sun.x, 1.0e5, epsilon = 1e-6);
    assert_abs_diff_eq!(sun.y, -2.0e5, epsilon = 1e-6);
    assert_eq!(sun_v.norm(), 0.0);
}

#[test]
fn test_barycenter_is_origin() {
    let (_dir, spk) = open_standard();
    let (p, v) = spk
        .position_velocity(targets::SOLAR_SYSTEM_BARYCENTER, 2_451_545.0)
        .unwrap();
    assert_eq!(p.norm(), 0.0);
    assert_eq!(v.norm(), 0.0);
}

#[rstest]
#[case(START_JD - 1.0)]
#[case(END_JD + 1.0)]
fn test_out_of_range(#[case] tdb_jd: f64) {
    let (_dir, spk) = open_standard();
    match spk.position_velocity(targets::EARTH, tdb_jd) {
        Err(JplephemError::OutOfRange { jd, start_jd, end_jd }) => {
            assert_eq!(jd, tdb_jd);
            assert_abs_diff_eq!(start_jd, START_JD, epsilon = 1e-9);
            assert_abs_diff_eq!(end_jd, END_JD, epsilon = 1e-9);
        }
        other => panic!("expected OutOfRange, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_missing_body() {
    let (_dir, spk) = open_standard();
    assert!(matches!(
        spk.get_segment(0, 499),
        Err(JplephemError::BodyNotFound { center: 0, target: 499 })
    ));
    assert!(matches!(
        spk.position_velocity(499, 2_451_545.0),
        Err(JplephemError::BodyNotFound { target: 499, .. })
    ));
}

#[test]
fn test_broken_chain_reports_missing_link() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("orphan.bsp");
    // Earth relative to the Earth-Moon barycenter, with no barycenter segment
    write_spk(&path, "orphan", &standard_segments()[2..3]);
    let spk = SPK::open(&path).unwrap();
    assert!(matches!(
        spk.position_velocity(targets::EARTH, 2_451_545.0),
        Err(JplephemError::BodyNotFound { target: 3, .. })
    ));
}

#[test]
fn test_rejects_non_daf_files() {
    let dir = TempDir::new().unwrap();

    let short = dir.path().join("short.bsp");
    std::fs::write(&short, b"DAF/SPK ").unwrap();
    assert!(matches!(SPK::open(&short), Err(JplephemError::InvalidFormat(_))));

    let junk = dir.path().join("junk.bsp");
    std::fs::write(&junk, vec![b'x'; 2048]).unwrap();
    assert!(matches!(SPK::open(&junk), Err(JplephemError::InvalidFormat(_))));

    let missing = dir.path().join("missing.bsp");
    assert!(matches!(
        SPK::open(&missing),
        Err(JplephemError::FileError { .. })
    ));
}
