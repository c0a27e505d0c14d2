//! Double Array File format module for reading SPICE DAF files
//!
//! This module provides functionality for reading NAIF's Double Array File (DAF)
//! format, which is the container underneath SPK ephemeris kernels.
//!
//! The file is memory mapped once on open. Record 1 is the file record, the
//! comment area follows it, and summary/name record pairs form a doubly
//! linked list starting at the FWARD record.

use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use log::debug;
use memmap2::{Mmap, MmapOptions};

use crate::jplephem::errors::{io_err, JplephemError, Result};

/// Size of a DAF record (bytes)
pub const RECORD_SIZE: usize = 1024;
/// Size of a double-precision value (bytes)
const DOUBLE_SIZE: usize = 8;
/// Usable characters per comment record
const COMMENT_CHARS: usize = 1000;
/// FTP corruption detection string
const FTPSTR: &[u8] = b"FTPSTR:\r:\n:\r\n:\r\x00:\x81:\x10\xce:ENDFTP";

/// DAF file endianness
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

impl Endian {
    fn read_i32(self, bytes: &[u8]) -> i32 {
        match self {
            Endian::Big => BigEndian::read_i32(bytes),
            Endian::Little => LittleEndian::read_i32(bytes),
        }
    }

    fn read_f64(self, bytes: &[u8]) -> f64 {
        match self {
            Endian::Big => BigEndian::read_f64(bytes),
            Endian::Little => LittleEndian::read_f64(bytes),
        }
    }
}

/// Work out the byte order of a DAF file record
///
/// Modern files name their format in LOCFMT. Older files leave it blank, in
/// which case the byte order that yields a plausible ND is chosen.
pub fn detect_endian(file_record: &[u8]) -> Result<Endian> {
    if file_record.len() < 96 {
        return Err(JplephemError::InvalidFormat(
            "DAF file record is truncated".to_string(),
        ));
    }
    match &file_record[88..96] {
        b"LTL-IEEE" => return Ok(Endian::Little),
        b"BIG-IEEE" => return Ok(Endian::Big),
        _ => {}
    }

    let plausible = |nd: i32| (1..=124).contains(&nd);
    if plausible(LittleEndian::read_i32(&file_record[8..12])) {
        Ok(Endian::Little)
    } else if plausible(BigEndian::read_i32(&file_record[8..12])) {
        Ok(Endian::Big)
    } else {
        Err(JplephemError::InvalidFormat(
            "cannot determine DAF byte order".to_string(),
        ))
    }
}

/// One array summary together with its name
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Array name from the paired name record
    pub name: String,
    /// The ND double precision components
    pub doubles: Vec<f64>,
    /// The NI integer components
    pub integers: Vec<i32>,
}

/// Double Array File (DAF) file reader
pub struct DAF {
    /// Path to the DAF file
    pub path: PathBuf,
    /// Memory map of the whole file
    map: Mmap,
    /// File identification word, e.g. "DAF/SPK"
    pub locidw: String,
    /// Number of double-precision components
    pub nd: usize,
    /// Number of integer components
    pub ni: usize,
    /// Internal file name
    pub ifname: String,
    /// Record number of the first summary record
    pub fward: usize,
    /// Record number of the last summary record
    pub bward: usize,
    /// First free address
    pub free: usize,
    /// Byte order (endianness)
    pub endian: Endian,
}

impl DAF {
    /// Open a DAF file at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| io_err(&path, e))?;
        // SAFETY: the map is read-only and lives as long as the DAF
        let map = unsafe { MmapOptions::new().map(&file) }.map_err(|e| io_err(&path, e))?;

        if map.len() < RECORD_SIZE {
            return Err(JplephemError::InvalidFormat(format!(
                "{} is too short to be a DAF file ({} bytes)",
                path.display(),
                map.len()
            )));
        }

        let record = &map[..RECORD_SIZE];
        let locidw = String::from_utf8_lossy(&record[0..8]).trim_end().to_string();
        if !locidw.starts_with("DAF/") && !locidw.starts_with("NAIF/DAF") {
            return Err(JplephemError::InvalidFormat(format!(
                "unrecognized file identification word {:?}",
                locidw
            )));
        }
        if record[699..699 + FTPSTR.len()] != *FTPSTR {
            debug!("{}: FTP validation string missing", path.display());
        }

        let endian = detect_endian(record)?;
        let nd = endian.read_i32(&record[8..12]);
        let ni = endian.read_i32(&record[12..16]);
        let ifname = String::from_utf8_lossy(&record[16..76])
            .trim_end()
            .to_string();
        let fward = endian.read_i32(&record[76..80]);
        let bward = endian.read_i32(&record[80..84]);
        let free = endian.read_i32(&record[84..88]);

        if nd < 1 || ni < 2 || fward < 2 || bward < fward || free < 1 {
            return Err(JplephemError::InvalidFormat(format!(
                "invalid DAF header: nd={}, ni={}, fward={}, bward={}, free={}",
                nd, ni, fward, bward, free
            )));
        }

        debug!(
            "DAF {}: locidw={} nd={} ni={} fward={} bward={} free={} endian={:?}",
            path.display(),
            locidw,
            nd,
            ni,
            fward,
            bward,
            free,
            endian
        );

        Ok(DAF {
            path,
            map,
            locidw,
            nd: nd as usize,
            ni: ni as usize,
            ifname,
            fward: fward as usize,
            bward: bward as usize,
            free: free as usize,
            endian,
        })
    }

    /// Size of one summary in double-precision words
    pub fn summary_length(&self) -> usize {
        self.nd + (self.ni + 1) / 2
    }

    /// Borrow a whole record (1-indexed)
    fn record(&self, record_number: usize) -> Result<&[u8]> {
        let start = record_number
            .checked_sub(1)
            .map(|r| r * RECORD_SIZE)
            .ok_or_else(|| JplephemError::InvalidFormat("record number 0".to_string()))?;
        self.map.get(start..start + RECORD_SIZE).ok_or_else(|| {
            JplephemError::InvalidFormat(format!(
                "record {} lies past the end of {}",
                record_number,
                self.path.display()
            ))
        })
    }

    /// Read comments from the comment area of the file
    pub fn comments(&self) -> Result<String> {
        let mut text = Vec::new();
        for record_number in 2..self.fward {
            text.extend_from_slice(&self.record(record_number)?[..COMMENT_CHARS]);
        }
        if let Some(end) = text.iter().position(|&b| b == 0x04) {
            text.truncate(end);
        }
        let text: Vec<u8> = text
            .into_iter()
            .map(|b| if b == 0 { b'\n' } else { b })
            .collect();
        Ok(String::from_utf8_lossy(&text).trim_end().to_string())
    }

    /// Walk the summary record list and return every array summary
    pub fn summaries(&self) -> Result<Vec<Summary>> {
        let step = self.summary_length() * DOUBLE_SIZE;
        let per_record = (RECORD_SIZE - 3 * DOUBLE_SIZE) / step;
        let mut visited = HashSet::new();
        let mut result = Vec::new();
        let mut record_number = self.fward;

        while record_number != 0 {
            if !visited.insert(record_number) {
                return Err(JplephemError::InvalidFormat(format!(
                    "summary record list loops back to record {}",
                    record_number
                )));
            }

            let summary_record = self.record(record_number)?;
            let name_record = self.record(record_number + 1)?;

            let next = self.endian.read_f64(&summary_record[0..8]);
            let n_summaries = self.endian.read_f64(&summary_record[16..24]);
            if !(0.0..=per_record as f64).contains(&n_summaries) || next < 0.0 {
                return Err(JplephemError::InvalidFormat(format!(
                    "summary record {} has bad control words (next={}, nsum={})",
                    record_number, next, n_summaries
                )));
            }

            for i in 0..n_summaries as usize {
                let base = 3 * DOUBLE_SIZE + i * step;
                let doubles = (0..self.nd)
                    .map(|j| {
                        let at = base + j * DOUBLE_SIZE;
                        self.endian.read_f64(&summary_record[at..at + DOUBLE_SIZE])
                    })
                    .collect();
                let int_base = base + self.nd * DOUBLE_SIZE;
                let integers = (0..self.ni)
                    .map(|j| {
                        let at = int_base + j * 4;
                        self.endian.read_i32(&summary_record[at..at + 4])
                    })
                    .collect();
                let name = String::from_utf8_lossy(&name_record[i * step..(i + 1) * step])
                    .trim_end_matches(|c: char| c == '\0' || c.is_whitespace())
                    .to_string();

                result.push(Summary {
                    name,
                    doubles,
                    integers,
                });
            }

            record_number = next as usize;
        }

        Ok(result)
    }

    /// Read the doubles stored at 1-based word addresses `start..=end`
    pub fn read_array(&self, start: usize, end: usize) -> Result<Vec<f64>> {
        if start < 1 || end < start {
            return Err(JplephemError::InvalidFormat(format!(
                "invalid array bounds: start={}, end={}",
                start, end
            )));
        }

        let first = (start - 1) * DOUBLE_SIZE;
        let last = end * DOUBLE_SIZE;
        let bytes = self.map.get(first..last).ok_or_else(|| {
            JplephemError::InvalidFormat(format!(
                "array {}..{} lies past the end of {}",
                start,
                end,
                self.path.display()
            ))
        })?;

        Ok(bytes
            .chunks_exact(DOUBLE_SIZE)
            .map(|chunk| self.endian.read_f64(chunk))
            .collect())
    }
}

impl std::fmt::Debug for DAF {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DAF")
            .field("path", &self.path)
            .field("locidw", &self.locidw)
            .field("nd", &self.nd)
            .field("ni", &self.ni)
            .field("endian", &self.endian)
            .finish()
    }
}
