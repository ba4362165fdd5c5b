//! A complete conversion run: validate, drape, assemble, deliver.

use crate::{
    assemble::{assemble, Destination, OutputSink},
    validate::validate,
    Densifier, Drape, DrapeError, ElevationSurface, LineSource, ScratchGuard, ScratchWorkspace,
    SpatialReference,
};
use chrono::{DateTime, Local};
use log::{info, warn};
use std::{
    any::Any,
    error::Error,
    panic::{catch_unwind, AssertUnwindSafe},
};

/// Called with the destination after a successful delivery.
pub type OnSuccess<'a> = Box<dyn FnOnce(&Destination) -> Result<(), Box<dyn Error>> + 'a>;

/// Everything a run needs besides its inputs, passed explicitly.
pub struct RunContext<'a> {
    /// Taken from the validated line; applies to every output.
    pub spatial_reference: SpatialReference,
    pub workspace: &'a dyn ScratchWorkspace,
    pub now: DateTime<Local>,
}

/// Outcome of a run that delivered its polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    pub destination: Destination,
    pub vertex_count: usize,
    pub spacing: f64,
    /// Indices of vertices written without elevation.
    pub missing_elevation: Vec<usize>,
}

impl ConversionReport {
    pub fn is_complete(&self) -> bool {
        self.missing_elevation.is_empty()
    }

    /// Treats any missing elevation as an error.
    pub fn into_result(self) -> Result<Self, DrapeError> {
        if self.is_complete() {
            Ok(self)
        } else {
            Err(DrapeError::ElevationSamplingPartial {
                missing: self.missing_elevation,
                total: self.vertex_count,
            })
        }
    }
}

/// Converts one 2D line into a 3D polyline.
///
/// ```no_run
/// # use drape::{Conversion, MemWorkspace, MemorySink, RasterSurface, io::GeoJsonLines};
/// let lines = GeoJsonLines::from_path("trail.geojson")?;
/// let surface = RasterSurface::open("dem.asc")?;
/// let workspace = MemWorkspace::new();
/// let mut sink = MemorySink::new();
/// let report = Conversion::new().run(&lines, &surface, &mut sink, &workspace)?;
/// println!("wrote {}", report.destination);
/// # Ok::<(), drape::DrapeError>(())
/// ```
#[derive(Default)]
pub struct Conversion<'a> {
    /// Derived from the line's name when unset.
    destination: Option<Destination>,
    densifier: Option<&'a dyn Densifier>,
    on_success: Option<OnSuccess<'a>>,
    timestamp: Option<DateTime<Local>>,
}

impl<'a> Conversion<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn destination(mut self, destination: Destination) -> Self {
        self.destination = Some(destination);
        self
    }

    pub fn densifier(mut self, densifier: &'a dyn Densifier) -> Self {
        self.densifier = Some(densifier);
        self
    }

    /// Best-effort hook run after delivery. Its errors and panics are
    /// logged and do not fail the run.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&Destination) -> Result<(), Box<dyn Error>> + 'a,
    {
        self.on_success = Some(Box::new(f));
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn run<L, S>(
        self,
        lines: &L,
        surface: &S,
        sink: &mut dyn OutputSink,
        workspace: &dyn ScratchWorkspace,
    ) -> Result<ConversionReport, DrapeError>
    where
        L: LineSource + ?Sized,
        S: ElevationSurface + ?Sized,
    {
        let validated = validate(lines)?;
        let ctx = RunContext {
            spatial_reference: validated.spatial_reference,
            workspace,
            now: self.timestamp.unwrap_or_else(Local::now),
        };
        info!(
            "draping {} ({} vertices, {})",
            validated.base_name,
            validated.line.0.len(),
            ctx.spatial_reference
        );

        let destination = self
            .destination
            .unwrap_or_else(|| Destination::derive(&validated.base_name, &ctx.now));

        let report = {
            let mut scratch = ScratchGuard::new(ctx.workspace);

            let mut builder = Drape::builder().line(&validated.line).timestamp(ctx.now);
            if let Some(densifier) = self.densifier {
                builder = builder.densifier(densifier);
            }
            let drape = builder.build(surface, &mut scratch)?;

            let polyline = assemble(&drape.points, ctx.spatial_reference)?;
            sink.write(&polyline, &destination)?;

            ConversionReport {
                destination,
                vertex_count: polyline.vertices.len(),
                spacing: drape.spacing,
                missing_elevation: polyline.no_elevation,
            }
        };

        info!(
            "wrote {} ({} vertices, {} without elevation)",
            report.destination,
            report.vertex_count,
            report.missing_elevation.len()
        );

        if let Some(on_success) = self.on_success {
            run_hook(on_success, &report.destination);
        }

        Ok(report)
    }
}

fn run_hook(hook: OnSuccess<'_>, destination: &Destination) {
    match catch_unwind(AssertUnwindSafe(|| hook(destination))) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("post-success hook for {destination} failed: {e}"),
        Err(panic) => warn!(
            "post-success hook for {destination} panicked: {}",
            panic_message(&*panic)
        ),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::{Conversion, ConversionReport, Destination};
    use crate::{
        assemble::{MemorySink, Vertex3, NO_ELEVATION},
        io::{GeoJsonLines, GeoJsonSink},
        testing::{flat, FakeLines, FnSurface},
        DirWorkspace, DrapeError, LineSource, MemWorkspace, RasterSurface, ScratchWorkspace,
        SpatialReference,
    };
    use chrono::{Local, TimeZone};
    use geo::{line_string, Coord};
    use std::{cell::Cell, path::PathBuf};
    use tempfile::TempDir;

    fn trail() -> FakeLines {
        FakeLines::new(vec![line_string![(x: 0.0, y: 0.0), (x: 100.0, y: 0.0)]])
    }

    #[test]
    fn test_flat_trail() {
        let workspace = MemWorkspace::new();
        let mut sink = MemorySink::new();
        let now = Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 59).unwrap();
        let report = Conversion::new()
            .timestamp(now)
            .run(&trail(), &flat(25.0, 50.0), &mut sink, &workspace)
            .unwrap();

        let destination = Destination("trail_3d_05_Mar_2024_14_07_59".to_owned());
        assert_eq!(
            report,
            ConversionReport {
                destination: destination.clone(),
                vertex_count: 5,
                spacing: 25.0,
                missing_elevation: vec![],
            }
        );
        let polyline = &sink.written[&destination];
        let expected: Vec<Vertex3> = [0.0, 25.0, 50.0, 75.0, 100.0]
            .into_iter()
            .map(|x| Vertex3 { x, y: 0.0, z: 50.0 })
            .collect();
        assert_eq!(polyline.vertices, expected);
        assert_eq!(
            polyline.spatial_reference,
            SpatialReference("EPSG:32633".to_owned())
        );
        assert!(workspace.list().unwrap().is_empty());
    }

    #[test]
    fn test_endpoints_survive() {
        let lines = FakeLines::new(vec![line_string![
            (x: 3.25, y: -1.5),
            (x: 40.0, y: 12.0),
            (x: 41.75, y: 80.125),
        ]]);
        let workspace = MemWorkspace::new();
        let mut sink = MemorySink::new();
        let report = Conversion::new()
            .destination(Destination("out".to_owned()))
            .run(&lines, &flat(7.0, 1.0), &mut sink, &workspace)
            .unwrap();

        let vertices = &sink.written[&report.destination].vertices;
        assert_eq!(vertices.len(), report.vertex_count);
        assert_eq!((vertices[0].x, vertices[0].y), (3.25, -1.5));
        let last = vertices[vertices.len() - 1];
        assert_eq!((last.x, last.y), (41.75, 80.125));
    }

    #[test]
    fn test_invalid_input_creates_nothing() {
        let mut with_z = trail();
        with_z.has_z = true;
        let two = FakeLines::new(vec![
            line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)],
            line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)],
        ]);

        let workspace = MemWorkspace::new();
        let mut sink = MemorySink::new();
        let surface = flat(1.0, 0.0);
        let run = |lines: &FakeLines, sink: &mut MemorySink| {
            Conversion::new().run(lines, &surface, sink, &workspace)
        };

        assert!(matches!(
            run(&FakeLines::new(vec![]), &mut sink),
            Err(DrapeError::InvalidInputCount(0))
        ));
        assert!(matches!(
            run(&two, &mut sink),
            Err(DrapeError::InvalidInputCount(2))
        ));
        assert!(matches!(
            run(&with_z, &mut sink),
            Err(DrapeError::AlreadyHasElevation(_))
        ));
        assert!(sink.written.is_empty());
        assert!(surface.queries.borrow().is_empty());
        assert!(workspace.list().unwrap().is_empty());
    }

    #[test]
    fn test_failed_delivery_cleans_up() {
        let dir = TempDir::new().unwrap();
        let workspace = DirWorkspace::new(dir.path()).unwrap();
        let destination = Destination("taken".to_owned());
        let mut sink = MemorySink::new();

        Conversion::new()
            .destination(destination.clone())
            .run(&trail(), &flat(25.0, 50.0), &mut sink, &workspace)
            .unwrap();
        let err = Conversion::new()
            .destination(destination)
            .run(&trail(), &flat(25.0, 50.0), &mut sink, &workspace)
            .unwrap_err();

        assert!(matches!(err, DrapeError::AssemblyFailed(_)));
        assert!(workspace.list().unwrap().is_empty());
    }

    #[test]
    fn test_partial_elevation_still_delivers() {
        let surface = FnSurface::new((25.0, 25.0), |c: Coord| (c.x <= 50.0).then_some(9.0));
        let workspace = MemWorkspace::new();
        let mut sink = MemorySink::new();
        let report = Conversion::new()
            .run(&trail(), &surface, &mut sink, &workspace)
            .unwrap();

        assert!(!report.is_complete());
        assert_eq!(report.missing_elevation, vec![3, 4]);
        let vertices = &sink.written[&report.destination].vertices;
        assert_eq!(vertices[3].z, NO_ELEVATION);
        assert_eq!(vertices[2].z, 9.0);

        match report.into_result() {
            Err(DrapeError::ElevationSamplingPartial { missing, total }) => {
                assert_eq!(missing, vec![3, 4]);
                assert_eq!(total, 5);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_hook_failures_are_swallowed() {
        let workspace = MemWorkspace::new();
        let mut sink = MemorySink::new();
        let called = Cell::new(false);

        let report = Conversion::new()
            .destination(Destination("a".to_owned()))
            .on_success(|destination| {
                called.set(true);
                Err(format!("cannot add {destination} to map").into())
            })
            .run(&trail(), &flat(25.0, 50.0), &mut sink, &workspace);
        assert!(report.is_ok());
        assert!(called.get());

        let report = Conversion::new()
            .destination(Destination("b".to_owned()))
            .on_success(|_| panic!("map is gone"))
            .run(&trail(), &flat(25.0, 50.0), &mut sink, &workspace);
        assert!(report.is_ok());
        assert_eq!(sink.written.len(), 2);
    }

    #[test]
    fn test_fixture_files() {
        let data: PathBuf = [env!("CARGO_MANIFEST_DIR"), "..", "data"].iter().collect();
        let lines = GeoJsonLines::from_path(data.join("trail.geojson")).unwrap();
        let surface = RasterSurface::open(data.join("flat.asc")).unwrap();
        let out = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let workspace = DirWorkspace::new(scratch.path()).unwrap();
        let mut sink = GeoJsonSink::new(out.path());

        let report = Conversion::new()
            .run(&lines, &surface, &mut sink, &workspace)
            .unwrap();
        assert!(report.is_complete());
        assert_eq!(report.vertex_count, 5);
        assert!(report.destination.0.starts_with("trail_3d_"));
        assert!(sink.path(&report.destination).exists());
        assert!(workspace.list().unwrap().is_empty());

        let written = GeoJsonLines::from_path(sink.path(&report.destination)).unwrap();
        let description = written.describe().unwrap();
        assert!(description.has_z);
        assert_eq!(
            description.spatial_reference,
            SpatialReference("EPSG:32633".to_owned())
        );
    }

    #[test]
    fn test_hook_not_called_on_failure() {
        let workspace = MemWorkspace::new();
        let mut sink = MemorySink::new();
        let called = Cell::new(false);
        let result = Conversion::new()
            .on_success(|_| {
                called.set(true);
                Ok(())
            })
            .run(&FakeLines::new(vec![]), &flat(1.0, 0.0), &mut sink, &workspace);
        assert!(result.is_err());
        assert!(!called.get());
    }
}
