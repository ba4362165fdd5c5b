//! SRTM/NASADEM height (`.hgt`) tiles.
//!
//! Tiles cover one degree square. Samples are big-endian `i16`
//! meters, northernmost row first, and the southwest sample sits
//! exactly on the integer degree named by the file.

use crate::{
    raster::{SampleStore, HGT_VOID},
    DemError, Raster, C,
};
use byteorder::{BigEndian as BE, ReadBytesExt};
use geo::geometry::Coord;
use log::debug;
use memmap2::Mmap;
use std::{fs::File, io::BufReader, mem::size_of, path::Path};

const ARCSEC_PER_DEG: C = 3600.0;

impl Raster {
    /// Returns a Raster read into memory from the HGT tile at `path`.
    pub fn load_hgt<P: AsRef<Path>>(path: P) -> Result<Self, DemError> {
        let (resolution, dimensions @ (cols, rows)) = extract_resolution(&path)?;
        let sw_corner_center = parse_sw_corner(&path)?;
        debug!("loading {:?}", path.as_ref());

        let mut file = BufReader::new(File::open(path)?);
        let mut samples = Vec::with_capacity(cols * rows);
        for _ in 0..(cols * rows) {
            let sample = file.read_i16::<BE>()?;
            samples.push(if sample == HGT_VOID {
                f32::NAN
            } else {
                f32::from(sample)
            });
        }

        Ok(Self::new(
            sw_corner_center,
            cell_size(resolution),
            dimensions,
            SampleStore::InMem(samples.into_boxed_slice()),
        ))
    }

    /// Returns a Raster using the memory-mapped HGT tile at `path` as
    /// storage.
    pub fn memmap_hgt<P: AsRef<Path>>(path: P) -> Result<Self, DemError> {
        let (resolution, dimensions) = extract_resolution(&path)?;
        let sw_corner_center = parse_sw_corner(&path)?;
        debug!("mapping {:?}", path.as_ref());

        let samples = {
            let file = File::open(path)?;
            let mmap = unsafe { Mmap::map(&file)? };
            SampleStore::MemMap(mmap)
        };

        Ok(Self::new(
            sw_corner_center,
            cell_size(resolution),
            dimensions,
            samples,
        ))
    }
}

/// Cell (width, height) in degrees for `resolution` arcseconds per
/// sample.
fn cell_size(resolution: u8) -> (C, C) {
    let deg = C::from(resolution) / ARCSEC_PER_DEG;
    (deg, deg)
}

fn extract_resolution<P: AsRef<Path>>(path: P) -> Result<(u8, (usize, usize)), DemError> {
    const RES_1_ARCSECONDS_FILE_LEN: u64 = 3601 * 3601 * size_of::<u16>() as u64;
    const RES_3_ARCSECONDS_FILE_LEN: u64 = 1201 * 1201 * size_of::<u16>() as u64;
    match path.as_ref().metadata().map(|m| m.len())? {
        RES_1_ARCSECONDS_FILE_LEN => Ok((1, (3601, 3601))),
        RES_3_ARCSECONDS_FILE_LEN => Ok((3, (1201, 1201))),
        invalid_len => Err(DemError::HgtLen(invalid_len, path.as_ref().to_owned())),
    }
}

fn parse_sw_corner<P: AsRef<Path>>(path: P) -> Result<Coord<C>, DemError> {
    let mk_err = || DemError::HgtName(path.as_ref().to_owned());
    let name = path
        .as_ref()
        .file_stem()
        .and_then(std::ffi::OsStr::to_str)
        .ok_or_else(mk_err)?;
    if name.len() != 7 || !name.is_ascii() {
        return Err(mk_err());
    }
    let lat_sign = match &name[0..1] {
        "N" | "n" => 1,
        "S" | "s" => -1,
        _ => return Err(mk_err()),
    };
    let lat = lat_sign * name[1..3].parse::<i16>().map_err(|_| mk_err())?;
    let lon_sign = match &name[3..4] {
        "E" | "e" => 1,
        "W" | "w" => -1,
        _ => return Err(mk_err()),
    };
    let lon = lon_sign * name[4..7].parse::<i16>().map_err(|_| mk_err())?;
    Ok(Coord {
        x: C::from(lon),
        y: C::from(lat),
    })
}
