//! [ElevationSurface] over `dem` rasters.

use crate::{DrapeError, ElevationSurface};
use dem::{Interpolation, Raster};
use geo::geometry::Coord;
use log::debug;
use std::path::Path;

pub struct RasterSurface {
    raster: Raster,
    interpolation: Interpolation,
}

impl RasterSurface {
    pub fn new(raster: Raster, interpolation: Interpolation) -> Self {
        Self {
            raster,
            interpolation,
        }
    }

    /// Opens the raster at `path` with bilinear sampling.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DrapeError> {
        let raster = Raster::open(path)?;
        debug!(
            "raster; dimensions: {:?}, cell: {}x{}",
            raster.dimensions(),
            raster.cell_width(),
            raster.cell_height()
        );
        Ok(Self::from(raster))
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }
}

impl From<Raster> for RasterSurface {
    fn from(raster: Raster) -> Self {
        Self::new(raster, Interpolation::default())
    }
}

impl ElevationSurface for RasterSurface {
    fn cell_width(&self) -> f64 {
        self.raster.cell_width()
    }

    fn cell_height(&self) -> f64 {
        self.raster.cell_height()
    }

    fn sample_at(&self, coord: Coord<f64>) -> Option<f64> {
        self.raster.sample(coord, self.interpolation)
    }
}
