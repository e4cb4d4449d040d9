//! Error types for rsndvi

use thiserror::Error;

/// Error type shared by the collection, index and export stages
#[derive(Error, Debug)]
pub enum NdviError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Projection error: {0}")]
    Projection(String),

    #[error("No geometry found in {0}")]
    EmptyGeometry(String),

    #[error("Unsupported geometry type: {0} (expected Polygon or MultiPolygon)")]
    UnsupportedGeometry(String),

    #[error("Band shape mismatch: red {red:?} vs nir {nir:?}")]
    ShapeMismatch { red: Vec<usize>, nir: Vec<usize> },

    #[error("Invalid statistics file: {0}")]
    InvalidStatsFile(String),

    #[error("Invalid raster location: {0}")]
    InvalidLocation(String),
}

/// Result alias for rsndvi operations
pub type Result<T> = std::result::Result<T, NdviError>;
