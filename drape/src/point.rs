use geo::geometry::Coord;
use serde::{Deserialize, Serialize};

/// One position along the densified line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    /// Position in line order, starting at 0.
    pub index: usize,
    pub x: f64,
    pub y: f64,
    /// `true` for the line's first and last vertex.
    pub is_endpoint: bool,
}

impl SamplePoint {
    pub fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.x,
            y: self.y,
        }
    }

    /// Numbers `coords` in order, flagging the first and last.
    pub fn sequence(coords: &[Coord<f64>]) -> Vec<Self> {
        let last = coords.len().saturating_sub(1);
        coords
            .iter()
            .enumerate()
            .map(|(index, Coord { x, y })| Self {
                index,
                x: *x,
                y: *y,
                is_endpoint: index == 0 || index == last,
            })
            .collect()
    }
}

/// A [SamplePoint] with the elevation found beneath it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevatedPoint {
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub is_endpoint: bool,
    /// `None` if the surface had no data here.
    pub z: Option<f64>,
}

impl ElevatedPoint {
    pub fn new(point: SamplePoint, z: Option<f64>) -> Self {
        let SamplePoint {
            index,
            x,
            y,
            is_endpoint,
        } = point;
        Self {
            index,
            x,
            y,
            is_endpoint,
            z,
        }
    }
}
