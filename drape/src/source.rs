//! Contracts for the inputs of a conversion.

use crate::DrapeError;
use geo::geometry::{Coord, LineString};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a coordinate reference system, e.g. `EPSG:32633`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpatialReference(pub String);

impl SpatialReference {
    /// RFC 7946 default for GeoJSON without a `crs` member.
    pub fn wgs84() -> Self {
        Self("EPSG:4326".to_owned())
    }
}

impl fmt::Display for SpatialReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata describing a line collection.
#[derive(Debug, Clone, PartialEq)]
pub struct LineDescription {
    /// Whether the line already carries elevation.
    pub has_z: bool,
    /// Name of the collection, used to derive output names.
    pub base_name: String,
    pub spatial_reference: SpatialReference,
}

/// A collection expected to hold exactly one planar line.
pub trait LineSource {
    /// Number of records in the collection.
    fn count(&self) -> Result<usize, DrapeError>;

    fn describe(&self) -> Result<LineDescription, DrapeError>;

    /// Vertices of the single line, in order.
    fn vertices(&self) -> Result<LineString<f64>, DrapeError>;
}

/// A queryable elevation raster.
pub trait ElevationSurface {
    /// Cell width in ground units.
    fn cell_width(&self) -> f64;

    /// Cell height in ground units.
    fn cell_height(&self) -> f64;

    /// Elevation at `coord`, or `None` where the surface has no data.
    fn sample_at(&self, coord: Coord<f64>) -> Option<f64>;
}
