/*
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

//! on-disk daily gridded file (§10.6): fixed header followed by one fixed-stride record of
//! `i16 × 100` values per time slot. Blocking file I/O runs on `spawn_blocking` to keep
//! positioned reads off the async executor.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Timelike, Utc};

use crate::errors::{Result, WxStoreError};

pub const MAGIC: u32 = 0x57585f31; // "WX_1"
pub const MISSING: i16 = 32767;
const HEADER_LEN: usize = 4 + 4 + 4 + 8 + 8 + 8 + 8 + 4 + 4 + 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NdFileHeader {
    pub parameter_id: u32,
    pub day_since_epoch: i32,
    pub dx: f64,
    pub dy: f64,
    pub lat0: f64,
    pub lng0: f64,
    pub nx: u32,
    pub ny: u32,
    pub time_interval_minutes: u16,
}

impl NdFileHeader {
    pub fn records_per_day (&self) -> usize { 1440 / self.time_interval_minutes as usize }
    pub fn record_len (&self) -> usize { self.nx as usize * self.ny as usize }
    pub fn record_stride (&self) -> u64 { (self.record_len() * 2) as u64 }

    fn to_bytes (&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        let mut off = 0;
        macro_rules! put { ($v:expr) => {{ let b = $v.to_le_bytes(); buf[off..off+b.len()].copy_from_slice(&b); off += b.len(); }}; }
        put!(MAGIC);
        put!(self.parameter_id);
        put!(self.day_since_epoch);
        put!(self.dx);
        put!(self.dy);
        put!(self.lat0);
        put!(self.lng0);
        put!(self.nx);
        put!(self.ny);
        put!(self.time_interval_minutes);
        buf
    }

    fn from_bytes (buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_LEN {
            return Err(WxStoreError::CorruptGrid("header truncated".to_string()));
        }
        let mut off = 0;
        macro_rules! take { ($ty:ty) => {{
            const N: usize = std::mem::size_of::<$ty>();
            let v = <$ty>::from_le_bytes(buf[off..off+N].try_into().unwrap());
            off += N;
            v
        }}; }
        let magic: u32 = take!(u32);
        if magic != MAGIC {
            return Err(WxStoreError::CorruptGrid("bad magic".to_string()));
        }
        Ok(NdFileHeader {
            parameter_id: take!(u32),
            day_since_epoch: take!(i32),
            dx: take!(f64),
            dy: take!(f64),
            lat0: take!(f64),
            lng0: take!(f64),
            nx: take!(u32),
            ny: take!(u32),
            time_interval_minutes: take!(u16),
        })
    }
}

/// decoded GRIB2 payload: grid geometry plus the raw band values, before packing.
#[derive(Clone)]
pub struct DecodedGrid {
    pub nx: u32,
    pub ny: u32,
    pub lat0: f64,
    pub lng0: f64,
    pub dx: f64,
    pub dy: f64,
    pub data: Vec<f64>,
}

/// decode one GRIB2 payload via GDAL's GRIB driver (it maps the `grib2` extension onto the
/// `GRIB` driver). GDAL needs a real path, so the payload is spilled to a temp file first.
pub fn process_grib (bytes: &[u8]) -> Result<DecodedGrid> {
    let tmp = tempfile::Builder::new().suffix(".grib2").tempfile()
        .map_err(WxStoreError::from)?;
    std::fs::write(tmp.path(), bytes)?;

    let dataset = gdal::Dataset::open(tmp.path())
        .map_err( |e| WxStoreError::GribDecodeFailed(e.to_string()))?;
    let band = dataset.rasterband(1)
        .map_err( |e| WxStoreError::GribDecodeFailed(e.to_string()))?;
    let (nx, ny) = band.size();
    let buffer = band.read_as::<f64>((0, 0), (nx, ny), (nx, ny), None)
        .map_err( |e| WxStoreError::GribDecodeFailed(e.to_string()))?;
    let gt = dataset.geo_transform()
        .map_err( |e| WxStoreError::GribDecodeFailed(e.to_string()))?;

    Ok(DecodedGrid {
        nx: nx as u32,
        ny: ny as u32,
        lng0: gt[0],
        dx: gt[1],
        lat0: gt[3],
        dy: -gt[5],
        data: buffer.data().to_vec(),
    })
}

fn pack_value (x: f64) -> i16 {
    if !x.is_finite() { return MISSING; }
    let scaled = (x * 100.0).round();
    if scaled >= i16::MAX as f64 || scaled <= i16::MIN as f64 { MISSING } else { scaled as i16 }
}

fn unpack_value (raw: i16) -> Option<f64> {
    if raw == MISSING { None } else { Some(raw as f64 / 100.0) }
}

fn slot_for (reference_time: DateTime<Utc>, time_interval_minutes: u16) -> usize {
    let minute_of_day = reference_time.hour() as usize * 60 + reference_time.minute() as usize;
    minute_of_day / time_interval_minutes as usize
}

pub struct NdFile {
    path: PathBuf,
}

impl NdFile {
    pub fn path_for (root: &Path, model_name: &str, parameter_id: u32, day_since_epoch: i64) -> PathBuf {
        root.join(model_name).join(format!("{parameter_id}_{day_since_epoch}.nd"))
    }

    pub fn at (path: PathBuf) -> Self { NdFile { path } }

    pub fn exists (&self) -> bool { self.path.is_file() }

    fn read_header (file: &mut File) -> Result<NdFileHeader> {
        file.seek(SeekFrom::Start(0))?;
        let mut buf = [0u8; HEADER_LEN];
        file.read_exact(&mut buf)?;
        NdFileHeader::from_bytes(&buf)
    }

    pub fn header (&self) -> Result<NdFileHeader> {
        let mut file = File::open(&self.path)?;
        Self::read_header(&mut file)
    }

    pub fn header_from (file: &mut File) -> Result<NdFileHeader> { Self::read_header(file) }

    /// write (or overwrite) the slot for `reference_time`. Creates the file with a header derived
    /// from `grid` on first write; a pre-existing file's header must already match the grid's
    /// geometry (the caller guarantees this — one file holds one parameter's one day).
    pub fn append (&self, parameter_id: u32, day_since_epoch: i64, reference_time: DateTime<Utc>, grid: &DecodedGrid, time_interval_minutes: u16) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let header = NdFileHeader {
            parameter_id,
            day_since_epoch: day_since_epoch as i32,
            dx: grid.dx, dy: grid.dy, lat0: grid.lat0, lng0: grid.lng0,
            nx: grid.nx, ny: grid.ny,
            time_interval_minutes,
        };

        let is_new = !self.path.is_file();
        let mut file = OpenOptions::new().read(true).write(true).create(true).open(&self.path)?;

        if is_new {
            file.set_len(HEADER_LEN as u64 + header.record_stride() * header.records_per_day() as u64)?;
            file.write_all(&header.to_bytes())?;
        }

        let record_values: Vec<u8> = grid.data.iter().flat_map( |v| pack_value(*v).to_le_bytes()).collect();
        let slot = slot_for(reference_time, time_interval_minutes);
        let offset = HEADER_LEN as u64 + header.record_stride() * slot as u64;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(&record_values)?;

        Ok(())
    }

    /// pure arithmetic, no disk access — cheap to recompute and cache (Index Cache, §3/§5).
    pub fn get_index (header: &NdFileHeader, lat: f64, lng: f64) -> (u32, u32) {
        let lat_idx = ((lat - header.lat0) / header.dy).round();
        let lng_idx = ((lng - header.lng0) / header.dx).round();
        let lat_idx = lat_idx.clamp(0.0, (header.ny - 1) as f64) as u32;
        let lng_idx = lng_idx.clamp(0.0, (header.nx - 1) as f64) as u32;
        (lat_idx, lng_idx)
    }

    /// the packed-i16 sequence for one grid cell across every time slot in the day.
    pub fn read_point (&self, lat_idx: u32, lng_idx: u32) -> Result<Vec<Option<f64>>> {
        let mut file = File::open(&self.path)?;
        Self::read_point_from(&mut file, lat_idx, lng_idx, &self.path)
    }

    /// same as [`read_point`] but against an already-open handle, for callers going through the
    /// File Handle Cache instead of opening the path themselves.
    pub fn read_point_from (file: &mut File, lat_idx: u32, lng_idx: u32, path_for_errors: &Path) -> Result<Vec<Option<f64>>> {
        let header = Self::read_header(file)?;
        let cell = lat_idx as u64 * header.nx as u64 + lng_idx as u64;
        let mut out = Vec::with_capacity(header.records_per_day());

        for slot in 0..header.records_per_day() {
            let offset = HEADER_LEN as u64 + header.record_stride() * slot as u64 + cell * 2;
            file.seek(SeekFrom::Start(offset))?;
            let mut buf = [0u8; 2];
            file.read_exact(&mut buf)
                .map_err( |e| WxStoreError::CorruptGrid(format!("{}: {e}", path_for_errors.display())))?;
            out.push(unpack_value(i16::from_le_bytes(buf)));
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_grid() -> DecodedGrid {
        DecodedGrid { nx: 2, ny: 2, lat0: 10.0, lng0: 20.0, dx: 1.0, dy: 1.0, data: vec![1.25, 2.5, f64::NAN, -3.0] }
    }

    #[test]
    fn round_trips_a_single_slot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("0_0.nd");
        let file = NdFile::at(path);
        let t = Utc.with_ymd_and_hms(2026, 3, 5, 2, 0, 0).unwrap();

        file.append(0, 19000, t, &sample_grid(), 60).unwrap();
        let header = file.header().unwrap();
        assert_eq!(header.nx, 2);
        assert_eq!(header.records_per_day(), 24);

        let values = file.read_point(0, 0).unwrap();
        assert_eq!(values[2], Some(1.25));
        assert_eq!(values[0], None);
    }

    #[test]
    fn get_index_clamps_to_grid_bounds() {
        let header = NdFileHeader { parameter_id: 0, day_since_epoch: 0, dx: 1.0, dy: 1.0, lat0: 10.0, lng0: 20.0, nx: 4, ny: 4, time_interval_minutes: 60 };
        let (lat_idx, lng_idx) = NdFile::get_index(&header, 50.0, -50.0);
        assert_eq!((lat_idx, lng_idx), (3, 0));
    }

    #[test]
    fn overwriting_the_same_slot_supersedes_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("0_0.nd");
        let file = NdFile::at(path);
        let t = Utc.with_ymd_and_hms(2026, 3, 5, 2, 0, 0).unwrap();

        file.append(0, 19000, t, &sample_grid(), 60).unwrap();
        let grid2 = DecodedGrid { data: vec![9.0, 9.0, 9.0, 9.0], ..sample_grid() };
        file.append(0, 19000, t, &grid2, 60).unwrap();

        let values = file.read_point(0, 0).unwrap();
        assert_eq!(values[2], Some(9.0));
    }
}
