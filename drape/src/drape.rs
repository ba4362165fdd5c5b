use crate::{
    interval::sampling_interval,
    scratch::{scratch_name, ScratchGuard},
    Densifier, DrapeError, ElevatedPoint, ElevationSurface, EvenSpacing, SamplePoint,
};
use chrono::{DateTime, Local};
use geo::{coord, geometry::LineString};
use log::{debug, warn};

/// A line draped over an elevation surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Drape {
    /// Distance between consecutive sample points, in ground units.
    pub spacing: f64,

    /// Sample points in line order, each with the elevation beneath
    /// it.
    pub points: Vec<ElevatedPoint>,
}

impl Drape {
    pub fn builder<'a>() -> DrapeBuilder<'a> {
        DrapeBuilder {
            line: None,
            densifier: None,
            timestamp: None,
        }
    }

    /// Indices of points the surface had no elevation for.
    pub fn missing_elevation(&self) -> Vec<usize> {
        self.points
            .iter()
            .filter(|p| p.z.is_none())
            .map(|p| p.index)
            .collect()
    }
}

pub struct DrapeBuilder<'a> {
    /// Line to drape (required).
    line: Option<&'a LineString<f64>>,

    /// Defaults to [EvenSpacing].
    densifier: Option<&'a dyn Densifier>,

    /// Suffix source for scratch names (defaults to now).
    timestamp: Option<DateTime<Local>>,
}

impl<'a> DrapeBuilder<'a> {
    pub fn line(mut self, line: &'a LineString<f64>) -> Self {
        self.line = Some(line);
        self
    }

    pub fn densifier(mut self, densifier: &'a dyn Densifier) -> Self {
        self.densifier = Some(densifier);
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Drapes the line over `surface`.
    ///
    /// Densified points are staged in a resource owned by `scratch`,
    /// so they are released when the guard is dropped.
    pub fn build<S: ElevationSurface + ?Sized>(
        &self,
        surface: &S,
        scratch: &mut ScratchGuard<'_>,
    ) -> Result<Drape, DrapeError> {
        let line = self.line.ok_or(DrapeError::Builder("line"))?;
        let densifier = self.densifier.unwrap_or(&EvenSpacing);
        let timestamp = self.timestamp.unwrap_or_else(Local::now);

        let spacing = sampling_interval(surface)?;

        let (samples, densify_runtime) = {
            let now = std::time::Instant::now();
            let coords = densifier.densify(line, spacing)?;
            check_endpoints(line, &coords)?;
            (SamplePoint::sequence(&coords), now.elapsed())
        };

        let staged = {
            let handle = scratch.create(&scratch_name("tmp_pnt", &timestamp))?;
            scratch.workspace().write_points(&handle, &samples)?;
            scratch.workspace().read_points(&handle)?
        };

        let (points, sample_runtime) = {
            let now = std::time::Instant::now();
            // Staged points may come back in any order; each result is
            // placed by its index.
            let elevated = staged
                .into_iter()
                .map(|point| ElevatedPoint::new(point, surface.sample_at(point.coord())));
            (in_line_order(elevated, samples.len())?, now.elapsed())
        };
        // Staging must hand back the line's own endpoints, bit for bit.
        if let (Some(first), Some(last)) = (points.first(), points.last()) {
            check_endpoints(
                line,
                &[coord! { x: first.x, y: first.y }, coord! { x: last.x, y: last.y }],
            )?;
        }

        let drape = Drape { spacing, points };

        let missing = drape.missing_elevation();
        if !missing.is_empty() {
            warn!(
                "{} of {} points have no elevation: {missing:?}",
                missing.len(),
                drape.points.len()
            );
        }

        debug!(
            "drape; spacing: {spacing}, len: {}, densify_exec: {densify_runtime:?}, sample_exec: {sample_runtime:?}",
            drape.points.len(),
        );

        Ok(drape)
    }
}

/// The densified positions must start and end exactly on the line's
/// own endpoints.
fn check_endpoints(
    line: &LineString<f64>,
    coords: &[geo::Coord<f64>],
) -> Result<(), DrapeError> {
    if coords.len() < 2 {
        return Err(DrapeError::DensificationFailed(format!(
            "densifier returned {} points",
            coords.len()
        )));
    }
    if coords.first() != line.0.first() || coords.last() != line.0.last() {
        return Err(DrapeError::DensificationFailed(
            "densifier did not keep the line's endpoints".to_owned(),
        ));
    }
    Ok(())
}

/// Places every point at its `index`, requiring each of `0..len`
/// exactly once.
fn in_line_order(
    points: impl Iterator<Item = ElevatedPoint>,
    len: usize,
) -> Result<Vec<ElevatedPoint>, DrapeError> {
    let mut slots: Vec<Option<ElevatedPoint>> = vec![None; len];
    for point in points {
        match slots.get_mut(point.index) {
            Some(slot @ None) => *slot = Some(point),
            Some(Some(_)) => {
                return Err(DrapeError::DensificationFailed(format!(
                    "duplicate staged point {}",
                    point.index
                )))
            }
            None => {
                return Err(DrapeError::DensificationFailed(format!(
                    "staged point {} out of range 0..{len}",
                    point.index
                )))
            }
        }
    }
    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.ok_or_else(|| {
                DrapeError::DensificationFailed(format!("staged point {index} missing"))
            })
        })
        .collect()
}
