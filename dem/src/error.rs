use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DemError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("missing grid header '{0}'")]
    MissingHeader(&'static str),

    #[error("invalid grid header {key} {value:?}")]
    Header { key: String, value: String },

    /// Cell dimensions must be finite positive numbers.
    #[error("invalid cell size {key} {value:?}")]
    CellSize { key: String, value: String },

    #[error("expected {expected} samples, found {found}")]
    SampleCount { expected: usize, found: usize },

    #[error("invalid sample {value:?} at index {index}")]
    Sample { index: usize, value: String },

    #[error("invalid HGT name {0}")]
    HgtName(PathBuf),

    #[error("invalid HGT file len {0} for {1}")]
    HgtLen(u64, PathBuf),

    #[error("unsupported raster format {0}")]
    Format(PathBuf),
}
