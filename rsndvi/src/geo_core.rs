use geo::{BoundingRect, Coord, Geometry, MapCoords};
use proj::Proj;
use serde::{Deserialize, Serialize};

use crate::collect::global_variables::DEFAULT_TARGET_EPSG;
use crate::error::{NdviError, Result};

/// CRS handling shared by the pipeline stages
/// Holds the target EPSG code every geometry is brought into before masking
#[derive(Debug, Clone, Copy)]
pub struct GeoCore {
    /// Target EPSG code (UTM zone of the imagery)
    pub epsg: i32,
}

impl GeoCore {
    /// Create a new GeoCore targeting the given EPSG code
    pub fn new(epsg: i32) -> Self {
        GeoCore { epsg }
    }

    /// Build a PROJ transformation between two EPSG codes
    pub fn proj_between(from_epsg: i32, to_epsg: i32) -> Result<Proj> {
        let from_crs = format!("EPSG:{}", from_epsg);
        let to_crs = format!("EPSG:{}", to_epsg);

        Proj::new_known_crs(&from_crs, &to_crs, None).map_err(|e| {
            NdviError::Projection(format!(
                "cannot create transformation {} -> {}: {}",
                from_crs, to_crs, e
            ))
        })
    }

    /// Transform coordinates from one CRS to another
    pub fn transform_coords(from_epsg: i32, to_epsg: i32, x: f64, y: f64) -> Result<(f64, f64)> {
        let proj = Self::proj_between(from_epsg, to_epsg)?;

        proj.convert((x, y))
            .map_err(|e| NdviError::Projection(format!("cannot transform ({}, {}): {}", x, y, e)))
    }

    /// Reproject every coordinate of `geometry` from `from_epsg` into this CRS.
    /// Returns the geometry untouched when both codes are equal.
    pub fn reproject(&self, geometry: &Geometry<f64>, from_epsg: i32) -> Result<Geometry<f64>> {
        if from_epsg == self.epsg {
            return Ok(geometry.clone());
        }

        let proj = Self::proj_between(from_epsg, self.epsg)?;
        let proj = &proj;

        geometry.try_map_coords(|c: Coord<f64>| {
            proj.convert((c.x, c.y))
                .map(|(x, y)| Coord { x, y })
                .map_err(|e| NdviError::Projection(format!("cannot transform ({}, {}): {}", c.x, c.y, e)))
        })
    }
}

impl Default for GeoCore {
    /// Defaults to EPSG:32636 (WGS 84 / UTM zone 36N)
    fn default() -> Self {
        GeoCore::new(DEFAULT_TARGET_EPSG)
    }
}

/// Bounding box structure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Bounding box of a geometry, `None` for an empty one
    pub fn of_geometry(geometry: &Geometry<f64>) -> Option<Self> {
        geometry.bounding_rect().map(|rect| {
            BoundingBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
        })
    }

    /// Corners in (x, y), clockwise from the lower-left one
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.min_x, self.min_y),
            (self.min_x, self.max_y),
            (self.max_x, self.max_y),
            (self.max_x, self.min_y),
        ]
    }
}

/// Affine transform between pixel (col, row) and map (x, y) coordinates.
/// Same coefficient order as GDAL:
/// `[origin_x, pixel_width, row_rotation, origin_y, col_rotation, pixel_height]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub pixel_width: f64,
    pub row_rotation: f64,
    pub origin_y: f64,
    pub col_rotation: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// North-up transform
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        GeoTransform {
            origin_x,
            pixel_width,
            row_rotation: 0.0,
            origin_y,
            col_rotation: 0.0,
            pixel_height,
        }
    }

    pub fn from_gdal(coeffs: [f64; 6]) -> Self {
        GeoTransform {
            origin_x: coeffs[0],
            pixel_width: coeffs[1],
            row_rotation: coeffs[2],
            origin_y: coeffs[3],
            col_rotation: coeffs[4],
            pixel_height: coeffs[5],
        }
    }

    /// Map coordinates of a fractional pixel position
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        let x = self.origin_x + col * self.pixel_width + row * self.row_rotation;
        let y = self.origin_y + col * self.col_rotation + row * self.pixel_height;
        (x, y)
    }

    /// Map coordinates of the center of pixel (col, row)
    pub fn pixel_center(&self, col: usize, row: usize) -> (f64, f64) {
        self.apply(col as f64 + 0.5, row as f64 + 0.5)
    }

    /// Fractional pixel position of a map coordinate.
    /// NaN for a degenerate transform.
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let det = self.pixel_width * self.pixel_height - self.row_rotation * self.col_rotation;
        if det.abs() < 1e-12 {
            return (f64::NAN, f64::NAN);
        }

        let dx = x - self.origin_x;
        let dy = y - self.origin_y;

        let col = (self.pixel_height * dx - self.row_rotation * dy) / det;
        let row = (-self.col_rotation * dx + self.pixel_width * dy) / det;
        (col, row)
    }

    /// Transform of a window starting at pixel (col_off, row_off)
    pub fn window(&self, col_off: usize, row_off: usize) -> Self {
        let (origin_x, origin_y) = self.apply(col_off as f64, row_off as f64);
        GeoTransform {
            origin_x,
            origin_y,
            ..*self
        }
    }
}
