//! ESRI ASCII grid loader.

use crate::{
    raster::{check_cell_size, SampleStore},
    DemError, Raster, C,
};
use geo::geometry::Coord;
use log::debug;
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

impl Raster {
    /// Returns a Raster read into memory from the ASCII grid at `path`.
    pub fn from_ascii_grid<P: AsRef<Path>>(path: P) -> Result<Self, DemError> {
        debug!("loading {:?}", path.as_ref());
        let file = BufReader::new(File::open(path)?);
        parse_ascii_grid(file)
    }
}

/// Where the grid's lower-left reference point sits.
#[derive(Clone, Copy)]
enum Anchor {
    Corner(C),
    Center(C),
}

#[derive(Default)]
struct Header {
    ncols: Option<usize>,
    nrows: Option<usize>,
    x: Option<Anchor>,
    y: Option<Anchor>,
    cellsize: Option<C>,
    dx: Option<C>,
    dy: Option<C>,
    nodata: Option<f32>,
}

impl Header {
    /// Consumes one `key value` header line. Returns `false` if `key`
    /// is not a header key, meaning the sample block has started.
    fn accept(&mut self, key: &str, value: &str) -> Result<bool, DemError> {
        match key.to_ascii_lowercase().as_str() {
            "ncols" => self.ncols = Some(parse_header(key, value)?),
            "nrows" => self.nrows = Some(parse_header(key, value)?),
            "xllcorner" => self.x = Some(Anchor::Corner(parse_header(key, value)?)),
            "xllcenter" => self.x = Some(Anchor::Center(parse_header(key, value)?)),
            "yllcorner" => self.y = Some(Anchor::Corner(parse_header(key, value)?)),
            "yllcenter" => self.y = Some(Anchor::Center(parse_header(key, value)?)),
            "cellsize" => self.cellsize = Some(parse_cell_size(key, value)?),
            "dx" | "xcellsize" => self.dx = Some(parse_cell_size(key, value)?),
            "dy" | "ycellsize" => self.dy = Some(parse_cell_size(key, value)?),
            "nodata_value" => self.nodata = Some(parse_header(key, value)?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn cell_size(&self) -> Result<(C, C), DemError> {
        match (self.dx, self.dy, self.cellsize) {
            (Some(dx), Some(dy), _) => Ok((dx, dy)),
            (None, None, Some(size)) => Ok((size, size)),
            (Some(_), None, _) => Err(DemError::MissingHeader("dy")),
            (None, Some(_), _) => Err(DemError::MissingHeader("dx")),
            (None, None, None) => Err(DemError::MissingHeader("cellsize")),
        }
    }
}

/// Parses an ESRI ASCII grid.
///
/// The header may use `cellsize` or `dx`/`dy` (also spelled
/// `xcellsize`/`ycellsize`) and either corner or center anchoring.
/// Samples equal to `NODATA_value` become missing data.
pub fn parse_ascii_grid<R: BufRead>(reader: R) -> Result<Raster, DemError> {
    let mut header = Header::default();
    let mut lines = reader.lines();
    let mut first_data_line = None;

    for line in lines.by_ref() {
        let line = line?;
        let mut tokens = line.split_whitespace();
        let Some(key) = tokens.next() else {
            continue;
        };
        let value = tokens.next().unwrap_or_default();
        if !header.accept(key, value)? {
            first_data_line = Some(line);
            break;
        }
    }

    let cols = header.ncols.ok_or(DemError::MissingHeader("ncols"))?;
    let rows = header.nrows.ok_or(DemError::MissingHeader("nrows"))?;
    let (cell_width, cell_height) = header.cell_size()?;
    let x = header.x.ok_or(DemError::MissingHeader("xllcorner"))?;
    let y = header.y.ok_or(DemError::MissingHeader("yllcorner"))?;

    let sw_corner_center = Coord {
        x: match x {
            Anchor::Corner(x) => x + cell_width / 2.0,
            Anchor::Center(x) => x,
        },
        y: match y {
            Anchor::Corner(y) => y + cell_height / 2.0,
            Anchor::Center(y) => y,
        },
    };

    let expected = cols * rows;
    let mut samples = Vec::with_capacity(expected);
    let mut push_line = |line: &str| -> Result<(), DemError> {
        for token in line.split_whitespace() {
            let sample = token.parse::<f32>().map_err(|_| DemError::Sample {
                index: samples.len(),
                value: token.to_owned(),
            })?;
            samples.push(match header.nodata {
                Some(nodata) if sample == nodata => f32::NAN,
                _ => sample,
            });
        }
        Ok(())
    };
    if let Some(line) = first_data_line {
        push_line(&line)?;
    }
    for line in lines {
        push_line(&line?)?;
    }

    if samples.len() != expected || expected == 0 {
        return Err(DemError::SampleCount {
            expected,
            found: samples.len(),
        });
    }

    debug!(
        "ascii grid; dimensions: {cols}x{rows}, cell: {cell_width}x{cell_height}, sw center: {sw_corner_center:?}"
    );

    Ok(Raster::new(
        sw_corner_center,
        (cell_width, cell_height),
        (cols, rows),
        SampleStore::InMem(samples.into_boxed_slice()),
    ))
}

fn parse_header<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, DemError> {
    value.parse().map_err(|_| DemError::Header {
        key: key.to_owned(),
        value: value.to_owned(),
    })
}

fn parse_cell_size(key: &str, value: &str) -> Result<C, DemError> {
    let size = value.parse::<C>().map_err(|_| DemError::CellSize {
        key: key.to_owned(),
        value: value.to_owned(),
    })?;
    check_cell_size(key, size)
}
