//! Elevation rasters.
//!
//! Loads digital elevation models from disk and answers point
//! elevation queries in the raster's own ground units.
//!
//! Supported formats:
//!
//! 1. ESRI ASCII grid (`.asc`), any projected or geographic CRS.
//! 1. SRTM/NASADEM height tiles (`.hgt`), 1 or 3 arcsecond.
//!
//! # References
//!
//! 1. [Esri ASCII raster format](https://desktop.arcgis.com/en/arcmap/latest/manage-data/raster-and-images/esri-ascii-raster-format.htm)
//! 1. [HGT file layout](http://fileformats.archiveteam.org/index.php?title=HGT&oldid=17250)

mod ascii;
mod error;
mod hgt;
mod raster;

pub use crate::{
    ascii::parse_ascii_grid,
    error::DemError,
    raster::{Interpolation, Raster},
};
pub use geo;

/// Base floating point type used for all coordinates and calculations.
pub type C = f64;
