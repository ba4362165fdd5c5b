use dem::DemError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DrapeError {
    /// The line collection must hold exactly one record.
    #[error("line collection has {0} records, expected exactly one")]
    InvalidInputCount(usize),

    #[error("line {0:?} already has elevation (Z) values")]
    AlreadyHasElevation(String),

    #[error("invalid raster metadata: {0}")]
    RasterMetadataInvalid(String),

    #[error("densification failed: {0}")]
    DensificationFailed(String),

    /// Some vertices have no elevation. Only produced on request, see
    /// `ConversionReport::into_result`.
    #[error("{} of {total} points have no elevation", missing.len())]
    ElevationSamplingPartial { missing: Vec<usize>, total: usize },

    #[error("assembly failed: {0}")]
    AssemblyFailed(String),

    #[error("missing required parameter '{0}'")]
    Builder(&'static str),

    #[error("unsupported geometry: {0}")]
    UnsupportedGeometry(String),

    #[error("scratch workspace: {0}")]
    Scratch(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    GeoJson(#[from] geojson::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Dem(DemError),
}

impl From<DemError> for DrapeError {
    fn from(err: DemError) -> Self {
        match err {
            DemError::CellSize { .. } => Self::RasterMetadataInvalid(err.to_string()),
            err => Self::Dem(err),
        }
    }
}
