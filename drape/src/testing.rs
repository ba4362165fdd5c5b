//! Test doubles for the collaborator traits.

use crate::{
    DrapeError, ElevationSurface, LineDescription, LineSource, MemWorkspace, SamplePoint,
    ScratchHandle, ScratchWorkspace, SpatialReference,
};
use geo::geometry::{Coord, LineString};
use std::cell::{Cell, RefCell};

/// In-memory line collection.
pub(crate) struct FakeLines {
    pub lines: Vec<LineString<f64>>,
    pub has_z: bool,
    pub base_name: String,
    pub described: Cell<bool>,
}

impl FakeLines {
    pub(crate) fn new(lines: Vec<LineString<f64>>) -> Self {
        Self {
            lines,
            has_z: false,
            base_name: "trail".to_owned(),
            described: Cell::new(false),
        }
    }
}

impl LineSource for FakeLines {
    fn count(&self) -> Result<usize, DrapeError> {
        Ok(self.lines.len())
    }

    fn describe(&self) -> Result<LineDescription, DrapeError> {
        self.described.set(true);
        Ok(LineDescription {
            has_z: self.has_z,
            base_name: self.base_name.clone(),
            spatial_reference: SpatialReference("EPSG:32633".to_owned()),
        })
    }

    fn vertices(&self) -> Result<LineString<f64>, DrapeError> {
        Ok(self.lines[0].clone())
    }
}

/// Surface with fixed cell size whose elevation is `f(coord)`. Records
/// every query.
pub(crate) struct FnSurface<F> {
    pub cell: (f64, f64),
    pub f: F,
    pub queries: RefCell<Vec<Coord<f64>>>,
}

impl<F: Fn(Coord<f64>) -> Option<f64>> FnSurface<F> {
    pub(crate) fn new(cell: (f64, f64), f: F) -> Self {
        Self {
            cell,
            f,
            queries: RefCell::new(Vec::new()),
        }
    }
}

impl<F: Fn(Coord<f64>) -> Option<f64>> ElevationSurface for FnSurface<F> {
    fn cell_width(&self) -> f64 {
        self.cell.0
    }

    fn cell_height(&self) -> f64 {
        self.cell.1
    }

    fn sample_at(&self, coord: Coord<f64>) -> Option<f64> {
        self.queries.borrow_mut().push(coord);
        (self.f)(coord)
    }
}

/// Constant elevation `z` everywhere.
pub(crate) fn flat(cell: f64, z: f64) -> FnSurface<impl Fn(Coord<f64>) -> Option<f64>> {
    FnSurface::new((cell, cell), move |_| Some(z))
}

/// Hands staged points back in a shuffled order.
#[derive(Default)]
pub(crate) struct ScrambledWorkspace {
    inner: MemWorkspace,
}

impl ScratchWorkspace for ScrambledWorkspace {
    fn create_named(&self, id: &str) -> Result<ScratchHandle, DrapeError> {
        self.inner.create_named(id)
    }

    fn write_points(
        &self,
        handle: &ScratchHandle,
        points: &[SamplePoint],
    ) -> Result<(), DrapeError> {
        self.inner.write_points(handle, points)
    }

    fn read_points(&self, handle: &ScratchHandle) -> Result<Vec<SamplePoint>, DrapeError> {
        let mut points = self.inner.read_points(handle)?;
        points.reverse();
        let mid = points.len() / 2;
        points.rotate_left(mid);
        Ok(points)
    }

    fn delete(&self, handle: &ScratchHandle) -> Result<(), DrapeError> {
        self.inner.delete(handle)
    }

    fn list(&self) -> Result<Vec<String>, DrapeError> {
        self.inner.list()
    }
}
