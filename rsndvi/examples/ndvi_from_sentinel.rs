use anyhow::Result;
use rsndvi::{NdviConfig, NdviPipeline};

/// Example: NDVI zonal statistics on a Sentinel-2 L2A tile read from the public S3 bucket
fn main() -> Result<()> {
    println!("=== Example: NDVI from Sentinel-2 (tile 36NYF, 2023-06-05) ===\n");

    let tile = "s3://sentinel-cogs/sentinel-s2-l2a-cogs/36/N/YF/2023/6/S2B_36NYF_20230605_0_L2A";

    let config = NdviConfig {
        red_band_path: format!("{}/B04.tif", tile),
        nir_band_path: format!("{}/B08.tif", tile),
        polygon_path: "sample_polygon.geojson".into(),
        output_dir: "./output".into(),
        ..NdviConfig::default()
    };

    println!("Inputs:");
    println!("  - Red band: {}", config.red_band_path);
    println!("  - NIR band: {}", config.nir_band_path);
    println!("  - Polygon: {:?}", config.polygon_path);
    println!("  - Target CRS: EPSG:{}\n", config.target_epsg);

    println!("Masking bands and computing NDVI = (NIR - Red) / (NIR + Red)...");
    let outcome = NdviPipeline::new(config).run()?;

    println!("\nNDVI computed over {} pixels", outcome.statistics.valid_count);
    println!("  - Max NDVI: {}", outcome.statistics.max);
    println!("  - Mean NDVI: {}", outcome.statistics.mean);
    println!("  - Min NDVI: {}", outcome.statistics.min);

    println!("\n✅ Done!");
    println!("  - Statistics: {:?}", outcome.stats_path);
    println!("  - Image: {:?}", outcome.image_path);

    Ok(())
}
