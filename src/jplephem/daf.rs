//! Double Array File format module for reading SPICE DAF files
//!
//! A DAF is a sequence of 1024-byte records. Record 1 is the file record,
//! records 2 up to the first summary record hold free-form comments, and the
//! rest is a doubly linked list of summary records (each followed by a name
//! record) interleaved with the double precision arrays they describe.
//!
//! See <https://naif.jpl.nasa.gov/pub/naif/toolkit_docs/C/req/daf.html>.

use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use memmap2::Mmap;

use crate::jplephem::errors::{io_err, JplephemError, Result};

/// Size of a DAF record (bytes)
const RECORD_SIZE: usize = 1024;
/// Size of a double-precision value (bytes)
const DOUBLE_SIZE: usize = 8;
/// FTP corruption detection string stored at byte 699 of the file record
const FTPSTR: &[u8] = b"FTPSTR:\r:\n:\r\n:\r\x00:\x81:\x10\xce:ENDFTP";
/// Offset of the FTP validation string in the file record
const FTPSTR_OFFSET: usize = 699;

/// DAF file endianness
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Endian {
    Big,
    Little,
}

/// One array summary: its name plus the ND doubles and NI integers describing it
#[derive(Debug, Clone)]
pub struct Summary {
    /// Segment name from the name record
    pub name: String,
    /// Double precision components (for SPK: start and end epoch)
    pub doubles: Vec<f64>,
    /// Integer components (for SPK: target, center, frame, type, start, end)
    pub integers: Vec<i32>,
}

/// Double Array File (DAF) file reader
pub struct DAF {
    /// Path to the DAF file
    pub path: PathBuf,
    /// File version word, e.g. "DAF/SPK"
    pub locidw: String,
    /// Number of double-precision components in each summary
    pub nd: usize,
    /// Number of integer components in each summary
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
    /// Read-only view of the whole file
    map: Mmap,
}

impl DAF {
    /// Open a DAF file at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let file = File::open(&path_buf).map_err(|e| io_err(&path_buf, e))?;

        // The kernel is opened read-only and never written while mapped.
        let map = unsafe { Mmap::map(&file) }
            .map_err(|e| JplephemError::MemoryMapError(format!("{}: {e}", path_buf.display())))?;

        Self::from_map(path_buf, map)
    }

    fn from_map(path: PathBuf, map: Mmap) -> Result<Self> {
        if map.len() < RECORD_SIZE {
            return Err(JplephemError::InvalidFormat(format!(
                "{} is shorter than one DAF record",
                path.display()
            )));
        }

        let header = &map[..RECORD_SIZE];
        let locidw = String::from_utf8_lossy(&header[0..8]).trim_end().to_string();
        if !locidw.starts_with("DAF/") && locidw != "NAIF/DAF" {
            return Err(JplephemError::InvalidFormat(format!(
                "unrecognized file identification word {locidw:?}"
            )));
        }

        let endian = Self::detect_endian(header)?;

        if &header[FTPSTR_OFFSET..FTPSTR_OFFSET + 6] == b"FTPSTR"
            && &header[FTPSTR_OFFSET..FTPSTR_OFFSET + FTPSTR.len()] != FTPSTR
        {
            return Err(JplephemError::InvalidFormat(
                "file was damaged by a text-mode FTP transfer".to_string(),
            ));
        }

        let read_i32 = |offset: usize| -> i32 {
            match endian {
                Endian::Little => LittleEndian::read_i32(&header[offset..offset + 4]),
                Endian::Big => BigEndian::read_i32(&header[offset..offset + 4]),
            }
        };

        let nd = read_i32(8);
        let ni = read_i32(12);
        let fward = read_i32(76);
        let bward = read_i32(80);
        let free = read_i32(84);

        if nd < 1 || ni < 2 || fward < 1 || bward < fward || free < 1 {
            return Err(JplephemError::InvalidFormat(format!(
                "Invalid DAF header: nd={nd}, ni={ni}, fward={fward}, bward={bward}, free={free}"
            )));
        }

        let ifname = String::from_utf8_lossy(&header[16..76]).trim_end().to_string();

        let daf = DAF {
            path,
            locidw,
            nd: nd as usize,
            ni: ni as usize,
            ifname,
            fward: fward as usize,
            bward: bward as usize,
            free: free as usize,
            endian,
            map,
        };
        log::debug!(
            "opened DAF {}: {} nd={} ni={} fward={} endian={:?}",
            daf.path.display(),
            daf.locidw,
            daf.nd,
            daf.ni,
            daf.fward,
            daf.endian
        );
        Ok(daf)
    }

    /// Determine byte order from the LOCFMT field, falling back to the shape of ND
    fn detect_endian(header: &[u8]) -> Result<Endian> {
        match &header[88..96] {
            b"LTL-IEEE" => return Ok(Endian::Little),
            b"BIG-IEEE" => return Ok(Endian::Big),
            _ => {}
        }

        // Pre-N0050 files carry no format string; ND is always a small count
        let nd_little = LittleEndian::read_i32(&header[8..12]);
        let nd_big = BigEndian::read_i32(&header[8..12]);
        if (1..=124).contains(&nd_little) {
            Ok(Endian::Little)
        } else if (1..=124).contains(&nd_big) {
            Ok(Endian::Big)
        } else {
            Err(JplephemError::InvalidFormat(
                "cannot determine DAF byte order".to_string(),
            ))
        }
    }

    /// Size of one summary in double-precision words
    pub fn summary_length(&self) -> usize {
        self.nd + (self.ni + 1) / 2
    }

    /// Read a record (1024 bytes) at the given record number (1-indexed)
    pub fn read_record(&self, record_number: usize) -> Result<&[u8]> {
        if record_number < 1 {
            return Err(JplephemError::InvalidFormat(format!(
                "Invalid record number: {record_number}"
            )));
        }

        let start = (record_number - 1) * RECORD_SIZE;
        let end = start + RECORD_SIZE;
        self.map.get(start..end).ok_or_else(|| {
            JplephemError::InvalidFormat(format!(
                "record {record_number} lies beyond the end of {}",
                self.path.display()
            ))
        })
    }

    fn read_f64(&self, bytes: &[u8]) -> f64 {
        match self.endian {
            Endian::Little => LittleEndian::read_f64(bytes),
            Endian::Big => BigEndian::read_f64(bytes),
        }
    }

    fn read_i32(&self, bytes: &[u8]) -> i32 {
        match self.endian {
            Endian::Little => LittleEndian::read_i32(bytes),
            Endian::Big => BigEndian::read_i32(bytes),
        }
    }

    /// Read comments from the comment area of the file
    pub fn comments(&self) -> Result<String> {
        let mut text = Vec::new();
        for record_number in 2..self.fward {
            // only the first 1000 bytes of a comment record carry text
            text.extend_from_slice(&self.read_record(record_number)?[..1000]);
        }

        if let Some(end) = text.iter().position(|&b| b == 4) {
            text.truncate(end);
        }
        let text: Vec<u8> = text
            .into_iter()
            .map(|b| if b == 0 { b'\n' } else { b })
            .collect();

        Ok(String::from_utf8_lossy(&text).trim_end().to_string())
    }

    /// Read every summary record and return the summaries in file order
    pub fn summaries(&self) -> Result<Vec<Summary>> {
        let step = self.summary_length() * DOUBLE_SIZE;
        let per_record = (RECORD_SIZE - 3 * DOUBLE_SIZE) / step;

        let mut result = Vec::new();
        let mut visited = HashSet::new();
        let mut record_number = self.fward;

        while record_number != 0 {
            if !visited.insert(record_number) {
                return Err(JplephemError::InvalidFormat(format!(
                    "summary record {record_number} is linked twice"
                )));
            }

            let summary_record = self.read_record(record_number)?;
            let name_record = self.read_record(record_number + 1)?;

            // control words NEXT, PREV, NSUM are stored as doubles
            let next = self.read_f64(&summary_record[0..8]) as usize;
            let n_summaries = self.read_f64(&summary_record[16..24]) as usize;
            if n_summaries > per_record {
                return Err(JplephemError::InvalidFormat(format!(
                    "summary record {record_number} claims {n_summaries} summaries"
                )));
            }

            for i in 0..n_summaries {
                let offset = 3 * DOUBLE_SIZE + i * step;
                let summary = &summary_record[offset..offset + step];

                let doubles = (0..self.nd)
                    .map(|j| self.read_f64(&summary[j * 8..j * 8 + 8]))
                    .collect();
                let int_base = self.nd * DOUBLE_SIZE;
                let integers = (0..self.ni)
                    .map(|j| self.read_i32(&summary[int_base + j * 4..int_base + j * 4 + 4]))
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

            record_number = next;
        }

        Ok(result)
    }

    /// Read the doubles stored between 1-based word addresses `start` and `end` inclusive
    pub fn read_array(&self, start: usize, end: usize) -> Result<Vec<f64>> {
        if start < 1 || end < start {
            return Err(JplephemError::InvalidFormat(format!(
                "Invalid array address range {start}..{end}"
            )));
        }

        let bytes = self
            .map
            .get((start - 1) * DOUBLE_SIZE..end * DOUBLE_SIZE)
            .ok_or_else(|| {
                JplephemError::InvalidFormat(format!(
                    "array {start}..{end} lies beyond the end of {}",
                    self.path.display()
                ))
            })?;

        let mut values = vec![0.0; end - start + 1];
        match self.endian {
            Endian::Little => LittleEndian::read_f64_into(bytes, &mut values),
            Endian::Big => BigEndian::read_f64_into(bytes, &mut values),
        }
        Ok(values)
    }

    /// Size of the underlying file in bytes
    pub fn file_size(&self) -> usize {
        self.map.len()
    }
}

impl std::fmt::Debug for DAF {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DAF")
            .field("path", &self.path)
            .field("locidw", &self.locidw)
            .field("nd", &self.nd)
            .field("ni", &self.ni)
            .field("fward", &self.fward)
            .field("bward", &self.bward)
            .field("free", &self.free)
            .field("endian", &self.endian)
            .finish()
    }
}
