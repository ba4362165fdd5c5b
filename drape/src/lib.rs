//! Drapes 2D lines over elevation rasters.
//!
//! A run validates the input line, samples it at the raster's mean
//! cell size, looks up the elevation beneath every sample and delivers
//! the result as one 3D polyline. Every collaborator (line source,
//! surface, densifier, scratch storage, output) is a trait, with
//! defaults for GeoJSON lines and `dem` rasters.

mod assemble;
mod densify;
mod drape;
mod error;
mod interval;
pub mod io;
mod math;
mod pipeline;
mod point;
mod scratch;
mod source;
mod surface;
#[cfg(test)]
mod testing;
mod validate;

pub use crate::{
    assemble::{
        assemble, sanitize, Destination, MemorySink, OutputSink, Polyline3D, Vertex3,
        NO_ELEVATION,
    },
    densify::{Densifier, EvenSpacing},
    drape::{Drape, DrapeBuilder},
    error::DrapeError,
    interval::{mean_cell_size, sampling_interval},
    pipeline::{Conversion, ConversionReport, OnSuccess, RunContext},
    point::{ElevatedPoint, SamplePoint},
    scratch::{
        scratch_name, DirWorkspace, MemWorkspace, ScratchGuard, ScratchHandle, ScratchWorkspace,
    },
    source::{ElevationSurface, LineDescription, LineSource, SpatialReference},
    surface::RasterSurface,
    validate::{validate, ValidatedLine},
};
pub use dem;
pub use geo;
