use crate::{DemError, C};
use byteorder::{BigEndian as BE, ByteOrder};
use geo::geometry::Coord;
use memmap2::Mmap;
use std::{mem::size_of, path::Path};

/// HGT void marker.
pub(crate) const HGT_VOID: i16 = i16::MIN;

/// A regular grid of elevation samples.
///
/// Samples are stored row-major, northernmost row first, which is the
/// order both supported file formats use on disk.
pub struct Raster {
    /// Center of the southwest most sample.
    sw_corner_center: Coord<C>,

    /// Width of one cell in ground units.
    cell_width: C,

    /// Height of one cell in ground units.
    cell_height: C,

    /// Number of (columns, rows) in this raster.
    dimensions: (usize, usize),

    /// Elevation samples.
    samples: SampleStore,
}

pub(crate) enum SampleStore {
    /// Parsed samples, `NaN` where the source had no data.
    InMem(Box<[f32]>),

    /// Memory mapped big-endian `i16` HGT samples.
    MemMap(Mmap),
}

impl SampleStore {
    fn get_unchecked(&self, index: usize) -> Option<f32> {
        match self {
            Self::InMem(samples) => {
                let sample = samples[index];
                (!sample.is_nan()).then_some(sample)
            }
            Self::MemMap(raw) => {
                let start = index * size_of::<i16>();
                let end = start + size_of::<i16>();
                let sample = BE::read_i16(&raw[start..end]);
                (sample != HGT_VOID).then_some(f32::from(sample))
            }
        }
    }
}

/// How to derive an elevation from the samples surrounding a point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Interpolation {
    /// Value of the cell containing the point.
    Nearest,

    /// Weighted average of the four nearest sample centers.
    ///
    /// Falls back to [Interpolation::Nearest] when one of the four
    /// neighbors has no data.
    #[default]
    Bilinear,
}

impl Raster {
    /// Returns a raster over in-memory samples.
    ///
    /// `samples` are row-major, northernmost row first. `NaN` marks
    /// missing data.
    pub fn from_samples(
        sw_corner_center: Coord<C>,
        (cell_width, cell_height): (C, C),
        dimensions @ (cols, rows): (usize, usize),
        samples: Vec<f32>,
    ) -> Result<Self, DemError> {
        check_cell_size("cell_width", cell_width)?;
        check_cell_size("cell_height", cell_height)?;
        if samples.len() != cols * rows || samples.is_empty() {
            return Err(DemError::SampleCount {
                expected: cols * rows,
                found: samples.len(),
            });
        }
        Ok(Self::new(
            sw_corner_center,
            (cell_width, cell_height),
            dimensions,
            SampleStore::InMem(samples.into_boxed_slice()),
        ))
    }

    /// Opens the raster at `path`, picking a loader from the file
    /// extension.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DemError> {
        let path = path.as_ref();
        match path
            .extension()
            .and_then(std::ffi::OsStr::to_str)
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("asc") => Self::from_ascii_grid(path),
            Some("hgt") => Self::memmap_hgt(path),
            _ => Err(DemError::Format(path.to_owned())),
        }
    }

    pub(crate) fn new(
        sw_corner_center: Coord<C>,
        (cell_width, cell_height): (C, C),
        dimensions: (usize, usize),
        samples: SampleStore,
    ) -> Self {
        Self {
            sw_corner_center,
            cell_width,
            cell_height,
            dimensions,
            samples,
        }
    }

    /// Returns the width of one cell in ground units.
    pub fn cell_width(&self) -> C {
        self.cell_width
    }

    /// Returns the height of one cell in ground units.
    pub fn cell_height(&self) -> C {
        self.cell_height
    }

    /// Returns (columns, rows).
    pub fn dimensions(&self) -> (usize, usize) {
        self.dimensions
    }

    /// Returns the number of samples in this raster.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        let (x, y) = self.dimensions;
        x * y
    }

    pub fn sw_corner_center(&self) -> Coord<C> {
        self.sw_corner_center
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn ne_corner_center(&self) -> Coord<C> {
        Coord {
            x: self.sw_corner_center.x + (self.dimensions.0 - 1) as C * self.cell_width,
            y: self.sw_corner_center.y + (self.dimensions.1 - 1) as C * self.cell_height,
        }
    }

    /// Returns the value of the cell containing `coord`.
    ///
    /// `None` when `coord` is outside the raster or the cell has no
    /// data.
    pub fn get(&self, coord: Coord<C>) -> Option<f32> {
        let (fx, fy) = self.fractional_xy(coord)?;
        self.get_xy((nearest(fx, self.dimensions.0), nearest(fy, self.dimensions.1)))
    }

    /// Returns the elevation at `coord`.
    ///
    /// `None` when `coord` is outside the raster or there is no data
    /// at that location.
    pub fn sample(&self, coord: Coord<C>, interpolation: Interpolation) -> Option<C> {
        match interpolation {
            Interpolation::Nearest => self.get(coord).map(C::from),
            Interpolation::Bilinear => self.bilinear(coord),
        }
    }
}

/// Private API.
impl Raster {
    fn get_xy(&self, (x, y): (usize, usize)) -> Option<f32> {
        let idx_1d = self.xy_to_linear_index((x, y));
        self.samples.get_unchecked(idx_1d)
    }

    /// Returns `coord` in fractional sample units from the southwest
    /// sample center, or `None` if it falls outside the outer cell
    /// edges.
    #[allow(clippy::cast_precision_loss)]
    fn fractional_xy(&self, coord: Coord<C>) -> Option<(C, C)> {
        let fx = (coord.x - self.sw_corner_center.x) / self.cell_width;
        let fy = (coord.y - self.sw_corner_center.y) / self.cell_height;
        let (cols, rows) = self.dimensions;
        let inside = |f: C, n: usize| (-0.5..=(n as C - 0.5)).contains(&f);
        (inside(fx, cols) && inside(fy, rows)).then_some((fx, fy))
    }

    #[allow(clippy::cast_precision_loss)]
    fn bilinear(&self, coord: Coord<C>) -> Option<C> {
        let (fx, fy) = self.fractional_xy(coord)?;
        let (cols, rows) = self.dimensions;
        let (x0, x1, tx) = neighbors(fx, cols);
        let (y0, y1, ty) = neighbors(fy, rows);

        let corners = (
            self.get_xy((x0, y0)),
            self.get_xy((x1, y0)),
            self.get_xy((x0, y1)),
            self.get_xy((x1, y1)),
        );
        if let (Some(sw), Some(se), Some(nw), Some(ne)) = corners {
            let south = C::from(sw) + (C::from(se) - C::from(sw)) * tx;
            let north = C::from(nw) + (C::from(ne) - C::from(nw)) * tx;
            Some(south + (north - south) * ty)
        } else {
            self.get_xy((nearest(fx, cols), nearest(fy, rows)))
                .map(C::from)
        }
    }

    fn xy_to_linear_index(&self, (x, y): (usize, usize)) -> usize {
        self.dimensions.0 * (self.dimensions.1 - y - 1) + x
    }
}

pub(crate) fn check_cell_size(key: &str, value: C) -> Result<C, DemError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(DemError::CellSize {
            key: key.to_owned(),
            value: value.to_string(),
        })
    }
}

/// Index of the sample nearest to fractional position `f`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn nearest(f: C, n: usize) -> usize {
    (f.round().max(0.0) as usize).min(n - 1)
}

/// Lower and upper sample indices around `f` and the weight of the
/// upper one.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn neighbors(f: C, n: usize) -> (usize, usize, C) {
    let f = f.clamp(0.0, (n - 1) as C);
    let lo = f.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    (lo, hi, f - lo as C)
}
