use crate::{DrapeError, ElevatedPoint, SpatialReference};
use chrono::{DateTime, Local};
use log::debug;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

/// Elevation written for vertices the surface had no data for.
pub const NO_ELEVATION: f64 = -9999.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// A 3D polyline in the reference system of its source line.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline3D {
    pub vertices: Vec<Vertex3>,
    pub spatial_reference: SpatialReference,
    /// Indices of vertices whose `z` is [NO_ELEVATION].
    pub no_elevation: Vec<usize>,
}

/// Where a [Polyline3D] is delivered.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Destination(pub String);

impl Destination {
    /// Derives a destination from a line's name and the run time, e.g.
    /// `my_trail_3d_05_Mar_2024_14_07_59`.
    pub fn derive(base_name: &str, now: &DateTime<Local>) -> Self {
        Self(format!(
            "{}_3d_{}",
            sanitize(base_name),
            now.format("%d_%b_%Y_%H_%M_%S")
        ))
    }

    /// `Some` unless `name` is blank.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        (!name.is_empty()).then(|| Self(name.to_owned()))
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Replaces each run of characters that are neither alphanumeric
/// (in any script) nor `_` with a single `_`.
pub fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if c.is_alphanumeric() || c == '_' {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}

/// Receives finished polylines.
pub trait OutputSink {
    /// Fails with [DrapeError::AssemblyFailed] if `destination` cannot
    /// accept the geometry.
    fn write(&mut self, polyline: &Polyline3D, destination: &Destination)
        -> Result<(), DrapeError>;
}

/// Keeps delivered polylines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub written: BTreeMap<Destination, Polyline3D>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputSink for MemorySink {
    fn write(
        &mut self,
        polyline: &Polyline3D,
        destination: &Destination,
    ) -> Result<(), DrapeError> {
        if self.written.contains_key(destination) {
            return Err(DrapeError::AssemblyFailed(format!(
                "{destination} already exists"
            )));
        }
        self.written.insert(destination.clone(), polyline.clone());
        Ok(())
    }
}

/// Builds one polyline from `points`, which must already be in line
/// order. Nothing is reordered, merged or dropped.
pub fn assemble(
    points: &[ElevatedPoint],
    spatial_reference: SpatialReference,
) -> Result<Polyline3D, DrapeError> {
    if points.len() < 2 {
        return Err(DrapeError::AssemblyFailed(format!(
            "a polyline needs at least 2 vertices, got {}",
            points.len()
        )));
    }

    let mut no_elevation = Vec::new();
    let vertices = points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let z = point.z.unwrap_or_else(|| {
                no_elevation.push(i);
                NO_ELEVATION
            });
            Vertex3 {
                x: point.x,
                y: point.y,
                z,
            }
        })
        .collect::<Vec<_>>();

    debug!(
        "assembled polyline; vertices: {}, no_elevation: {}",
        vertices.len(),
        no_elevation.len()
    );

    Ok(Polyline3D {
        vertices,
        spatial_reference,
        no_elevation,
    })
}
