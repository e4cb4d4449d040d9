use std::fs;
use std::path::Path;

use crate::commons::statistics::ZonalStatistics;
use crate::error::{NdviError, Result};

const LABELS: [&str; 3] = ["Max NDVI", "Mean NDVI", "Min NDVI"];

/// Values stored in a statistics file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatisticsRecord {
    pub max: f64,
    pub mean: f64,
    pub min: f64,
}

impl From<&ZonalStatistics> for StatisticsRecord {
    fn from(stats: &ZonalStatistics) -> Self {
        StatisticsRecord {
            max: stats.max,
            mean: stats.mean,
            min: stats.min,
        }
    }
}

/// Shortest representation that parses back to the same value.
///
/// Integral values keep a trailing `.0` and exponents outside [-4, 16) use
/// scientific notation with a signed two-digit exponent (`1e-05`, `1.5e+16`).
/// Non-finite values are written `nan`, `inf` and `-inf`.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let scientific = format!("{:e}", value);
    if let Some((mantissa, exponent)) = scientific.split_once('e') {
        let exponent: i32 = exponent.parse().unwrap_or(0);
        if value != 0.0 && !(-4..16).contains(&exponent) {
            let sign = if exponent < 0 { '-' } else { '+' };
            return format!("{}e{}{:02}", mantissa, sign, exponent.abs());
        }
    }

    let plain = format!("{}", value);
    if plain.contains('.') {
        plain
    } else {
        format!("{}.0", plain)
    }
}

/// Text content of the statistics file
pub fn render_statistics(stats: &ZonalStatistics) -> String {
    let values = [stats.max, stats.mean, stats.min];
    LABELS
        .iter()
        .zip(values)
        .map(|(label, value)| format!("{}: {}\n", label, format_value(value)))
        .collect()
}

/// Write the three statistics lines to `path`, creating the parent directory if needed
pub fn write_statistics<P: AsRef<Path>>(path: P, stats: &ZonalStatistics) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, render_statistics(stats))?;
    Ok(())
}

/// Parse the content written by [`render_statistics`]
pub fn parse_statistics(content: &str) -> Result<StatisticsRecord> {
    let mut values = [f64::NAN; 3];
    let mut lines = content.lines().filter(|line| !line.trim().is_empty());

    for (slot, label) in values.iter_mut().zip(LABELS) {
        let line = lines
            .next()
            .ok_or_else(|| NdviError::InvalidStatsFile(format!("missing line '{}'", label)))?;
        let (found, raw) = line
            .split_once(':')
            .ok_or_else(|| NdviError::InvalidStatsFile(format!("malformed line '{}'", line)))?;
        if found.trim() != label {
            return Err(NdviError::InvalidStatsFile(format!(
                "expected '{}', found '{}'",
                label,
                found.trim()
            )));
        }
        *slot = raw
            .trim()
            .parse()
            .map_err(|_| NdviError::InvalidStatsFile(format!("invalid number in '{}'", line)))?;
    }

    Ok(StatisticsRecord {
        max: values[0],
        mean: values[1],
        min: values[2],
    })
}

pub fn read_statistics<P: AsRef<Path>>(path: P) -> Result<StatisticsRecord> {
    let content = fs::read_to_string(path)?;
    parse_statistics(&content)
}
