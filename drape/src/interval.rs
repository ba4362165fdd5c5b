use crate::{DrapeError, ElevationSurface};

/// Returns the mean of `surface`'s cell width and height, the spacing
/// at which lines are sampled.
pub fn sampling_interval<S: ElevationSurface + ?Sized>(surface: &S) -> Result<f64, DrapeError> {
    mean_cell_size(surface.cell_width(), surface.cell_height())
}

/// `(cell_width + cell_height) / 2`, requiring both to be finite and
/// positive.
pub fn mean_cell_size(cell_width: f64, cell_height: f64) -> Result<f64, DrapeError> {
    for (name, value) in [("width", cell_width), ("height", cell_height)] {
        if !(value.is_finite() && value > 0.0) {
            return Err(DrapeError::RasterMetadataInvalid(format!(
                "cell {name} {value} is not a positive number"
            )));
        }
    }
    Ok((cell_width + cell_height) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::mean_cell_size;
    use crate::DrapeError;

    #[test]
    fn test_mean_cell_size() {
        assert_eq!(mean_cell_size(10.0, 20.0).unwrap(), 15.0);
        assert_eq!(mean_cell_size(25.0, 25.0).unwrap(), 25.0);
    }

    #[test]
    fn test_mean_cell_size_commutes() {
        for (w, h) in [(10.0, 20.0), (0.1, 0.3), (3.0 / 3600.0, 1.0 / 3600.0)] {
            assert_eq!(
                mean_cell_size(w, h).unwrap(),
                mean_cell_size(h, w).unwrap()
            );
        }
    }

    #[test]
    fn test_rejects_bad_cell_sizes() {
        for (w, h) in [(0.0, 1.0), (1.0, -1.0), (f64::NAN, 1.0), (1.0, f64::INFINITY)] {
            assert!(matches!(
                mean_cell_size(w, h),
                Err(DrapeError::RasterMetadataInvalid(_))
            ));
        }
    }
}
