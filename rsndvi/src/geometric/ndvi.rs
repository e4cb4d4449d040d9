use ndarray::{Array2, Array3, Axis, Zip};

use crate::error::{NdviError, Result};

/// NDVI of a single pixel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NdviValue {
    Value(f64),
    /// NIR + Red == 0: the ratio is 0/0 or x/0
    Indeterminate,
}

impl NdviValue {
    /// Value stored in NDVI arrays: NaN for an indeterminate pixel
    pub fn to_f64(self) -> f64 {
        match self {
            NdviValue::Value(v) => v,
            NdviValue::Indeterminate => f64::NAN,
        }
    }

    pub fn is_indeterminate(&self) -> bool {
        matches!(self, NdviValue::Indeterminate)
    }
}

/// NDVI = (NIR - Red) / (NIR + Red)
///
/// Values range from -1 to 1 for non-negative reflectances:
/// - Dense vegetation: 0.6 to 0.9
/// - Sparse vegetation: 0.2 to 0.5
/// - Bare soil: 0.1 to 0.2
/// - Water/clouds: -1.0 to 0.0
pub fn ndvi_pixel(nir: f64, red: f64) -> NdviValue {
    let sum = nir + red;
    if sum == 0.0 || sum.is_nan() {
        return NdviValue::Indeterminate;
    }
    NdviValue::Value((nir - red) / sum)
}

/// Elementwise NDVI of two arrays shaped (bands, rows, cols).
///
/// The arrays must have the same shape; they are never broadcast.
pub fn compute_ndvi(nir: &Array3<f64>, red: &Array3<f64>) -> Result<Array3<f64>> {
    if nir.shape() != red.shape() {
        return Err(NdviError::ShapeMismatch {
            red: red.shape().to_vec(),
            nir: nir.shape().to_vec(),
        });
    }

    Ok(Zip::from(nir)
        .and(red)
        .map_collect(|&n, &r| ndvi_pixel(n, r).to_f64()))
}

/// Set every pixel outside the region to NaN, in all bands.
///
/// `inside` must match the (rows, cols) shape of `ndvi`.
pub fn apply_region_mask(ndvi: &mut Array3<f64>, inside: &Array2<bool>) -> Result<()> {
    let (_, rows, cols) = ndvi.dim();
    if inside.dim() != (rows, cols) {
        return Err(NdviError::ShapeMismatch {
            red: vec![rows, cols],
            nir: inside.shape().to_vec(),
        });
    }

    for mut plane in ndvi.axis_iter_mut(Axis(0)) {
        plane.zip_mut_with(inside, |value, &is_inside| {
            if !is_inside {
                *value = f64::NAN;
            }
        });
    }
    Ok(())
}
