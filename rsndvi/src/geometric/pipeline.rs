use anyhow::{Context, Result};
use ndarray::Array3;
use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::collect::polygon::{load_region, RegionOfInterest};
use crate::collect::raster::{mask_raster, MaskedImage, RasterSource};
use crate::commons::statistics::{zonal_statistics, ZonalStatistics};
use crate::config::NdviConfig;
use crate::export::png::{write_ndvi_png, PngOptions};
use crate::export::stats_file::write_statistics;
use crate::geometric::ndvi::{apply_region_mask, compute_ndvi};

/// Everything one NDVI run produced
#[derive(Debug, Clone)]
pub struct NdviOutcome {
    /// Polygon in the target CRS
    pub region: RegionOfInterest,
    pub red: MaskedImage,
    pub nir: MaskedImage,
    /// Shaped (bands, rows, cols), NaN outside the polygon and where NIR + Red == 0
    pub ndvi: Array3<f64>,
    pub statistics: ZonalStatistics,
    pub stats_path: PathBuf,
    pub image_path: PathBuf,
}

/// NDVI zonal statistics over a polygon
///
/// 1. Load the polygon and reproject it into the imagery CRS
/// 2. Mask and crop the red and NIR bands with it
/// 3. NDVI = (NIR - Red) / (NIR + Red)
/// 4. Max / mean / min ignoring NaN
/// 5. Write the statistics file and the PNG
pub struct NdviPipeline {
    config: NdviConfig,
}

impl NdviPipeline {
    pub fn new(config: NdviConfig) -> Self {
        NdviPipeline { config }
    }

    /// Run every stage and write the outputs
    pub fn run(&self) -> Result<NdviOutcome> {
        let config = &self.config;

        let region = load_region(&config.polygon_path, config.target_epsg).with_context(|| {
            format!("Failed to load polygon from {:?}", config.polygon_path)
        })?;

        let red_source = RasterSource::parse(&config.red_band_path)
            .with_context(|| format!("Invalid red band location: {}", config.red_band_path))?;
        let nir_source = RasterSource::parse(&config.nir_band_path)
            .with_context(|| format!("Invalid NIR band location: {}", config.nir_band_path))?;

        let red = mask_raster(&red_source, &region, config.anonymous_remote_access)
            .with_context(|| format!("Failed to mask red band {}", config.red_band_path))?;
        let nir = mask_raster(&nir_source, &region, config.anonymous_remote_access)
            .with_context(|| format!("Failed to mask NIR band {}", config.nir_band_path))?;
        info!(
            "Masked bands: red {:?}, nir {:?} ({} pixels inside the polygon)",
            red.shape(),
            nir.shape(),
            red.inside_count()
        );

        let (ndvi, statistics) = Self::analyse(&red, &nir)?;
        info!(
            "NDVI max {} / mean {} / min {} over {} pixels",
            statistics.max, statistics.mean, statistics.min, statistics.valid_count
        );

        fs::create_dir_all(&config.output_dir).with_context(|| {
            format!("Failed to create output directory: {:?}", config.output_dir)
        })?;

        let stats_path = config.stats_path();
        write_statistics(&stats_path, &statistics)
            .with_context(|| format!("Failed to write statistics to {:?}", stats_path))?;
        info!("Statistics saved to: {:?}", stats_path);

        let image_path = config.image_path();
        let options = PngOptions {
            min_size: config.image_min_size,
            ..PngOptions::default()
        };
        write_ndvi_png(&image_path, &ndvi, &options)
            .with_context(|| format!("Failed to write NDVI image to {:?}", image_path))?;

        Ok(NdviOutcome {
            region,
            red,
            nir,
            ndvi,
            statistics,
            stats_path,
            image_path,
        })
    }

    /// NDVI array and its zonal statistics from two masked bands
    pub fn analyse(red: &MaskedImage, nir: &MaskedImage) -> Result<(Array3<f64>, ZonalStatistics)> {
        let mut ndvi = compute_ndvi(&nir.data, &red.data).context("Failed to compute NDVI")?;
        apply_region_mask(&mut ndvi, &red.inside).context("Failed to apply polygon mask")?;

        let statistics = zonal_statistics(&ndvi);
        Ok((ndvi, statistics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo_core::GeoTransform;
    use ndarray::Array2;

    fn uniform(value: f64) -> MaskedImage {
        MaskedImage {
            data: Array3::from_elem((1, 2, 2), value),
            inside: Array2::from_elem((2, 2), true),
            transform: GeoTransform::new(600000.0, 100000.0, 10.0, -10.0),
            nodata: 0.0,
            epsg: Some(32636),
        }
    }

    #[test]
    fn test_analyse_uniform_scene() {
        let (ndvi, stats) = NdviPipeline::analyse(&uniform(100.0), &uniform(300.0)).unwrap();
        assert!(ndvi.iter().all(|&v| v == 0.5));
        assert_eq!(stats.max, 0.5);
        assert_eq!(stats.mean, 0.5);
        assert_eq!(stats.min, 0.5);
        assert_eq!(stats.valid_count, 4);
    }

    #[test]
    fn test_analyse_excludes_pixels_outside_polygon() {
        let mut red = uniform(100.0);
        red.inside[[1, 1]] = false;
        red.data[[0, 1, 1]] = -9999.0;
        let mut nir = uniform(300.0);
        nir.data[[0, 1, 1]] = -9999.0;

        let (ndvi, stats) = NdviPipeline::analyse(&red, &nir).unwrap();
        assert!(ndvi[[0, 1, 1]].is_nan());
        assert_eq!(stats.valid_count, 3);
        assert_eq!(stats.min, 0.5);
    }

    #[test]
    fn test_analyse_empty_images() {
        let empty = MaskedImage::empty(1, GeoTransform::new(0.0, 0.0, 10.0, -10.0), 0.0, None);
        let (ndvi, stats) = NdviPipeline::analyse(&empty, &empty).unwrap();
        assert!(ndvi.is_empty());
        assert!(stats.is_indeterminate());
    }

    #[test]
    fn test_analyse_shape_mismatch() {
        let red = uniform(100.0);
        let mut nir = uniform(300.0);
        nir.data = Array3::from_elem((1, 3, 2), 300.0);
        assert!(NdviPipeline::analyse(&red, &nir).is_err());
    }

    #[test]
    fn test_run_reports_missing_polygon() {
        let dir = tempfile::tempdir().unwrap();
        let config = NdviConfig {
            polygon_path: dir.path().join("missing.geojson"),
            output_dir: dir.path().join("output"),
            ..NdviConfig::default()
        };
        let err = NdviPipeline::new(config).run().unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to load polygon"));
        assert!(!dir.path().join("output").exists());
    }
}
