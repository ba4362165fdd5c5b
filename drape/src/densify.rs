use crate::{
    math::{length, LineWalk},
    DrapeError,
};
use geo::geometry::{Coord, LineString};

/// Splits a line into evenly spaced positions.
///
/// Implementations must return positions in line order, starting with
/// the line's first vertex and ending with its last.
pub trait Densifier {
    fn densify(&self, line: &LineString<f64>, spacing: f64) -> Result<Vec<Coord<f64>>, DrapeError>;
}

/// Places a position at every multiple of the spacing along the line,
/// plus the end vertex.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvenSpacing;

impl Densifier for EvenSpacing {
    fn densify(&self, line: &LineString<f64>, spacing: f64) -> Result<Vec<Coord<f64>>, DrapeError> {
        let coords = &line.0;
        if coords.len() < 2 {
            return Err(DrapeError::DensificationFailed(format!(
                "line has {} vertices, need at least 2",
                coords.len()
            )));
        }
        if let Some(bad) = coords.iter().find(|c| !(c.x.is_finite() && c.y.is_finite())) {
            return Err(DrapeError::DensificationFailed(format!(
                "non-finite vertex {bad:?}"
            )));
        }
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(DrapeError::DensificationFailed(format!(
                "invalid spacing {spacing}"
            )));
        }
        if length(coords) == 0.0 {
            return Err(DrapeError::DensificationFailed(
                "line has zero length".to_owned(),
            ));
        }
        Ok(LineWalk::new(coords, spacing).collect())
    }
}
