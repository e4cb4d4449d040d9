use tracing::warn;

/// Zonal statistics of an NDVI array
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZonalStatistics {
    pub max: f64,
    pub mean: f64,
    pub min: f64,
    /// Number of non-NaN pixels the statistics were computed from
    pub valid_count: usize,
}

impl ZonalStatistics {
    /// Statistics of an array holding no valid pixel: every value is NaN
    pub fn indeterminate() -> Self {
        ZonalStatistics {
            max: f64::NAN,
            mean: f64::NAN,
            min: f64::NAN,
            valid_count: 0,
        }
    }

    pub fn is_indeterminate(&self) -> bool {
        self.valid_count == 0
    }
}

/// Max, mean and min of `values`, skipping NaN.
///
/// With no valid value the result is [`ZonalStatistics::indeterminate`].
pub fn zonal_statistics<'a, I>(values: I) -> ZonalStatistics
where
    I: IntoIterator<Item = &'a f64>,
{
    let mut max = f64::NEG_INFINITY;
    let mut min = f64::INFINITY;
    let mut sum = 0.0;
    let mut count = 0usize;

    for &v in values {
        if v.is_nan() {
            continue;
        }
        max = max.max(v);
        min = min.min(v);
        sum += v;
        count += 1;
    }

    if count == 0 {
        warn!("No valid pixel in the region of interest, statistics are NaN");
        return ZonalStatistics::indeterminate();
    }

    // Rounding can push the mean just outside [min, max] on constant input
    let mean = (sum / count as f64).clamp(min, max);

    ZonalStatistics {
        max,
        mean,
        min,
        valid_count: count,
    }
}
