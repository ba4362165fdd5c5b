use crate::{DrapeError, LineSource, SpatialReference};
use geo::geometry::LineString;
use log::debug;

/// A line that passed [validate].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedLine {
    pub line: LineString<f64>,
    pub base_name: String,
    /// Reference system for every output of the run.
    pub spatial_reference: SpatialReference,
}

/// Checks that `source` holds exactly one line without elevation.
///
/// Reads metadata only; nothing is created.
pub fn validate<L: LineSource + ?Sized>(source: &L) -> Result<ValidatedLine, DrapeError> {
    let count = source.count()?;
    if count != 1 {
        return Err(DrapeError::InvalidInputCount(count));
    }

    let description = source.describe()?;
    if description.has_z {
        return Err(DrapeError::AlreadyHasElevation(description.base_name));
    }

    let line = source.vertices()?;
    debug!(
        "validated {}; vertices: {}, crs: {}",
        description.base_name,
        line.0.len(),
        description.spatial_reference
    );

    Ok(ValidatedLine {
        line,
        base_name: description.base_name,
        spatial_reference: description.spatial_reference,
    })
}
