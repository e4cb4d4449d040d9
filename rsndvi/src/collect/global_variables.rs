use std::path::PathBuf;

/// Default folder receiving the statistics file and the PNG
pub const OUTPUT_PATH: &str = "./output";

/// WGS 84 / UTM zone 36N, projection of the Sentinel-2 tile 36NYF
pub const DEFAULT_TARGET_EPSG: i32 = 32636;

/// CRS assumed for GeoJSON files that do not declare one (RFC 7946)
pub const GEOJSON_DEFAULT_EPSG: i32 = 4326;

pub const DEFAULT_RED_BAND_PATH: &str = "s3/B04.tif";
pub const DEFAULT_NIR_BAND_PATH: &str = "s3/B08.tif";
pub const DEFAULT_POLYGON_PATH: &str = "sample_polygon.geojson";
pub const STATS_FILE_NAME: &str = "output.txt";
pub const IMAGE_FILE_NAME: &str = "ndvi.png";

pub fn get_output_path() -> PathBuf {
    PathBuf::from(OUTPUT_PATH)
}
