use clap::{Parser, ValueEnum};
use drape::dem::Interpolation;
use std::path::PathBuf;

/// Drape a 2D line onto an elevation raster, producing a 3D line.
#[derive(Parser, Debug, Clone)]
pub struct Cli {
    /// GeoJSON file holding exactly one line without elevation.
    #[arg(short, long)]
    pub line: PathBuf,

    /// Elevation raster (ESRI ASCII grid `.asc` or SRTM `.hgt`).
    #[arg(short, long)]
    pub dem: PathBuf,

    /// Output name. Derived from the line's file name and the current
    /// time when omitted or blank.
    #[arg(short, long)]
    pub out: Option<String>,

    /// Directory outputs are written to.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Directory for intermediate files [default: $TMPDIR/drape3d].
    #[arg(long)]
    pub scratch_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Sampling::Bilinear)]
    pub sampling: Sampling,

    /// Print a JSON summary of the run to stdout.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Sampling {
    /// Value of the cell under each point.
    Nearest,

    /// Interpolate between the four surrounding cells.
    Bilinear,
}

impl From<Sampling> for Interpolation {
    fn from(sampling: Sampling) -> Self {
        match sampling {
            Sampling::Nearest => Self::Nearest,
            Sampling::Bilinear => Self::Bilinear,
        }
    }
}
