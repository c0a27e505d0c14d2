//! Synthetic SPK kernels for offline tests
//!
//! `write_spk` lays out a little-endian DAF/SPK file the same way NAIF tools
//! do: file record, one comment record, a summary record and its name
//! record, then the segment data. Every record of a segment repeats the same
//! Chebyshev coefficients, so positions are easy to predict.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub const AU_KM: f64 = 149_597_870.7;
pub const J2000: f64 = 2_451_545.0;
pub const START_JD: f64 = 2_440_000.5;
pub const END_JD: f64 = 2_460_000.5;
pub const N_RECORDS: usize = 4;

const RECORD: usize = 1024;
const WORDS_PER_RECORD: usize = RECORD / 8;
const FTPSTR: &[u8] = b"FTPSTR:\r:\n:\r\n:\r\x00:\x81:\x10\xce:ENDFTP";

/// One segment to write
#[derive(Debug, Clone)]
pub struct SyntheticSegment {
    pub target: i32,
    pub center: i32,
    pub data_type: i32,
    pub start_jd: f64,
    pub end_jd: f64,
    pub n_records: usize,
    /// Coefficients per component; 3 components for type 2, 6 for type 3
    pub components: Vec<Vec<f64>>,
    pub name: String,
}

impl SyntheticSegment {
    pub fn type2(target: i32, center: i32, components: [[f64; 2]; 3]) -> Self {
        Self {
            target,
            center,
            data_type: 2,
            start_jd: START_JD,
            end_jd: END_JD,
            n_records: N_RECORDS,
            components: components.iter().map(|c| c.to_vec()).collect(),
            name: "SYNTHETIC-TEST".to_string(),
        }
    }

    fn intlen(&self) -> f64 {
        (self.end_jd - self.start_jd) * 86_400.0 / self.n_records as f64
    }

    fn init(&self) -> f64 {
        (self.start_jd - J2000) * 86_400.0
    }

    /// Expected position (km) and velocity (km/s) at a TDB Julian date
    pub fn evaluate(&self, tdb_jd: f64) -> ([f64; 3], [f64; 3]) {
        let et = (tdb_jd - J2000) * 86_400.0;
        let intlen = self.intlen();
        let index = (((et - self.init()) / intlen).floor().max(0.0) as usize).min(self.n_records - 1);
        let mid = self.init() + (index as f64 + 0.5) * intlen;
        let radius = intlen / 2.0;
        let x = (et - mid) / radius;

        let mut position = [0.0; 3];
        let mut velocity = [0.0; 3];
        for axis in 0..3 {
            let c = &self.components[axis];
            position[axis] = c[0] + c[1] * x;
            velocity[axis] = if self.data_type == 3 {
                let v = &self.components[axis + 3];
                v[0] + v[1] * x
            } else {
                c[1] / radius
            };
        }
        (position, velocity)
    }

    fn words(&self) -> Vec<f64> {
        let intlen = self.intlen();
        let n = self.components[0].len();
        let rsize = 2 + self.components.len() * n;
        let mut words = Vec::with_capacity(self.n_records * rsize + 4);
        for i in 0..self.n_records {
            words.push(self.init() + (i as f64 + 0.5) * intlen);
            words.push(intlen / 2.0);
            for component in &self.components {
                words.extend_from_slice(component);
            }
        }
        words.extend_from_slice(&[self.init(), intlen, rsize as f64, self.n_records as f64]);
        words
    }
}

fn put_i32(buf: &mut [u8], at: usize, value: i32) {
    buf[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

fn put_f64(buf: &mut [u8], at: usize, value: f64) {
    buf[at..at + 8].copy_from_slice(&value.to_le_bytes());
}

/// Write a little-endian SPK file with the given comment and segments
pub fn write_spk(path: &Path, comment: &str, segments: &[SyntheticSegment]) {
    let nd = 2;
    let ni = 6;
    let summary_words = nd + (ni + 1) / 2;
    assert!(segments.len() <= (WORDS_PER_RECORD - 3) / summary_words);

    // Records: 1 file, 2 comment, 3 summary, 4 names, data from 5
    let mut data: Vec<f64> = Vec::new();
    let first_data_word = 4 * WORDS_PER_RECORD + 1;
    let mut addresses = Vec::new();
    for segment in segments {
        let start = first_data_word + data.len();
        data.extend(segment.words());
        addresses.push((start, first_data_word + data.len() - 1));
    }
    let free = first_data_word + data.len();

    let mut file_record = vec![0u8; RECORD];
    file_record[0..8].copy_from_slice(b"DAF/SPK ");
    put_i32(&mut file_record, 8, nd as i32);
    put_i32(&mut file_record, 12, ni as i32);
    let mut ifname = [b' '; 60];
    ifname[..14].copy_from_slice(b"SYNTHETIC TEST");
    file_record[16..76].copy_from_slice(&ifname);
    put_i32(&mut file_record, 76, 3);
    put_i32(&mut file_record, 80, 3);
    put_i32(&mut file_record, 84, free as i32);
    file_record[88..96].copy_from_slice(b"LTL-IEEE");
    file_record[699..699 + FTPSTR.len()].copy_from_slice(FTPSTR);

    let mut comment_record = vec![0u8; RECORD];
    let text = comment.as_bytes();
    assert!(text.len() < 1000);
    comment_record[..text.len()].copy_from_slice(text);
    comment_record[text.len()] = 0x04;

    let mut summary_record = vec![0u8; RECORD];
    let mut name_record = vec![b' '; RECORD];
    put_f64(&mut summary_record, 0, 0.0);
    put_f64(&mut summary_record, 8, 0.0);
    put_f64(&mut summary_record, 16, segments.len() as f64);
    for (i, (segment, &(start, end))) in segments.iter().zip(&addresses).enumerate() {
        let base = 24 + i * summary_words * 8;
        put_f64(&mut summary_record, base, (segment.start_jd - J2000) * 86_400.0);
        put_f64(&mut summary_record, base + 8, (segment.end_jd - J2000) * 86_400.0);
        let ints = [
            segment.target,
            segment.center,
            1,
            segment.data_type,
            start as i32,
            end as i32,
        ];
        for (j, value) in ints.iter().enumerate() {
            put_i32(&mut summary_record, base + 16 + j * 4, *value);
        }
        let name = segment.name.as_bytes();
        let at = i * summary_words * 8;
        name_record[at..at + name.len()].copy_from_slice(name);
    }

    let mut bytes = Vec::new();
    bytes.extend(file_record);
    bytes.extend(comment_record);
    bytes.extend(summary_record);
    bytes.extend(name_record);
    for word in &data {
        bytes.extend_from_slice(&word.to_le_bytes());
    }
    let padded = bytes.len().div_ceil(RECORD) * RECORD;
    bytes.resize(padded, 0);

    fs::write(path, bytes).expect("write synthetic kernel");
}

/// Sun, Earth-Moon barycenter, Earth and Moon (type 2) plus a type 3 Mars
/// barycenter, all relative to the solar system barycenter chain
pub fn standard_segments() -> Vec<SyntheticSegment> {
    let mut mars = SyntheticSegment::type2(4, 0, [[1.5 * AU_KM, 0.0], [0.0, 0.0], [0.0, 0.0]]);
    mars.data_type = 3;
    mars.components.extend([vec![1.0, 0.0], vec![2.0, 0.0], vec![3.0, 0.0]]);

    vec![
        SyntheticSegment::type2(10, 0, [[1.0e5, 0.0], [-2.0e5, 0.0], [5.0e4, 0.0]]),
        SyntheticSegment::type2(
            3,
            0,
            [
                [-0.9 * AU_KM, 1000.0],
                [0.4 * AU_KM, -500.0],
                [0.17 * AU_KM, 250.0],
            ],
        ),
        SyntheticSegment::type2(399, 3, [[-4000.0, 0.0], [2000.0, 0.0], [1000.0, 0.0]]),
        SyntheticSegment::type2(301, 3, [[300_000.0, 0.0], [200_000.0, 0.0], [50_000.0, 0.0]]),
        mars,
    ]
}

/// Write the standard kernel as `name` inside `dir`
pub fn write_standard_kernel(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    write_spk(&path, "Synthetic kernel for tests", &standard_segments());
    path
}
