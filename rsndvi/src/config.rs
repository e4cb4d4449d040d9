use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::collect::global_variables::{
    get_output_path, DEFAULT_NIR_BAND_PATH, DEFAULT_POLYGON_PATH, DEFAULT_RED_BAND_PATH,
    DEFAULT_TARGET_EPSG, IMAGE_FILE_NAME, STATS_FILE_NAME,
};
use crate::error::Result;

/// Inputs and outputs of one NDVI run
///
/// Missing fields of a JSON configuration file take their default value,
/// which reproduces the Sentinel-2 tile 36NYF analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NdviConfig {
    /// Red band (Sentinel-2 B04): local path, `s3://`, `http(s)://` or `/vsi*`
    pub red_band_path: String,
    /// Near-infrared band (Sentinel-2 B08)
    pub nir_band_path: String,
    /// Vector file holding the region of interest
    pub polygon_path: PathBuf,
    /// Created if absent
    pub output_dir: PathBuf,
    pub stats_file_name: String,
    pub image_file_name: String,
    /// CRS the polygon is reprojected into, should match the imagery
    pub target_epsg: i32,
    /// Read remote rasters without AWS credentials
    pub anonymous_remote_access: bool,
    /// Minimum size in pixels of the NDVI panel of the PNG
    pub image_min_size: u32,
}

impl Default for NdviConfig {
    fn default() -> Self {
        NdviConfig {
            red_band_path: DEFAULT_RED_BAND_PATH.to_string(),
            nir_band_path: DEFAULT_NIR_BAND_PATH.to_string(),
            polygon_path: PathBuf::from(DEFAULT_POLYGON_PATH),
            output_dir: get_output_path(),
            stats_file_name: STATS_FILE_NAME.to_string(),
            image_file_name: IMAGE_FILE_NAME.to_string(),
            target_epsg: DEFAULT_TARGET_EPSG,
            anonymous_remote_access: true,
            image_min_size: 512,
        }
    }
}

impl NdviConfig {
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn stats_path(&self) -> PathBuf {
        self.output_dir.join(&self.stats_file_name)
    }

    pub fn image_path(&self) -> PathBuf {
        self.output_dir.join(&self.image_file_name)
    }
}
