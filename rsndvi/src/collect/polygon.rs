use gdal::vector::LayerAccess;
use gdal::Dataset;
use geo::{Geometry as GeoGeometry, Intersects, Point};
use geojson::{GeoJson, JsonObject};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::collect::global_variables::GEOJSON_DEFAULT_EPSG;
use crate::error::{NdviError, Result};
use crate::geo_core::{BoundingBox, GeoCore};

/// Region of interest: the polygon the zonal statistics are computed over
#[derive(Debug, Clone)]
pub struct RegionOfInterest {
    /// Polygon or MultiPolygon, expressed in `epsg`
    pub geometry: GeoGeometry<f64>,
    /// CRS of `geometry`
    pub epsg: i32,
    /// CRS declared by the vector file
    pub source_epsg: i32,
}

impl RegionOfInterest {
    /// Build a region from a geometry already expressed in `epsg`
    pub fn new(geometry: GeoGeometry<f64>, epsg: i32) -> Result<Self> {
        ensure_polygonal(&geometry)?;
        Ok(RegionOfInterest {
            geometry,
            epsg,
            source_epsg: epsg,
        })
    }

    pub fn bbox(&self) -> Option<BoundingBox> {
        BoundingBox::of_geometry(&self.geometry)
    }

    /// True when (x, y) lies inside the polygon or on its boundary
    pub fn covers(&self, x: f64, y: f64) -> bool {
        self.geometry.intersects(&Point::new(x, y))
    }
}

/// Read the first geometry of a vector file and reproject it into `target_epsg`.
///
/// GeoJSON files are parsed directly; any other format goes through OGR.
pub fn load_region<P: AsRef<Path>>(path: P, target_epsg: i32) -> Result<RegionOfInterest> {
    let path = path.as_ref();

    let (geometry, source_epsg) = if is_geojson(path) {
        read_geojson(path)?
    } else {
        read_ogr(path)?
    };
    ensure_polygonal(&geometry)?;

    info!(
        "Loaded polygon from {:?} (EPSG:{}), reprojecting to EPSG:{}",
        path, source_epsg, target_epsg
    );

    let geometry = GeoCore::new(target_epsg).reproject(&geometry, source_epsg)?;
    if let Some(bbox) = BoundingBox::of_geometry(&geometry) {
        debug!("Reprojected polygon bounds: {:?}", bbox);
    }

    Ok(RegionOfInterest {
        geometry,
        epsg: target_epsg,
        source_epsg,
    })
}

fn is_geojson(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "geojson" | "json"))
        .unwrap_or(false)
}

/// Parse a GeoJSON document and return its first geometry with the declared EPSG code
pub fn parse_geojson(content: &str, origin: &str) -> Result<(GeoGeometry<f64>, i32)> {
    let geojson: GeoJson = content.parse()?;

    let (geometry, members) = match geojson {
        GeoJson::FeatureCollection(fc) => {
            let geometry = fc.features.into_iter().find_map(|feature| feature.geometry);
            (geometry, fc.foreign_members)
        }
        GeoJson::Feature(feature) => (feature.geometry, feature.foreign_members),
        GeoJson::Geometry(geometry) => {
            let members = geometry.foreign_members.clone();
            (Some(geometry), members)
        }
    };

    let geometry = geometry.ok_or_else(|| NdviError::EmptyGeometry(origin.to_string()))?;
    let epsg = members
        .as_ref()
        .and_then(declared_epsg)
        .unwrap_or(GEOJSON_DEFAULT_EPSG);

    let geometry: GeoGeometry<f64> = geometry.try_into()?;
    Ok((geometry, epsg))
}

fn read_geojson(path: &Path) -> Result<(GeoGeometry<f64>, i32)> {
    let content = fs::read_to_string(path)?;
    parse_geojson(&content, &path.to_string_lossy())
}

/// Legacy named CRS member: `"crs": {"type": "name", "properties": {"name": "..."}}`
fn declared_epsg(members: &JsonObject) -> Option<i32> {
    members
        .get("crs")?
        .get("properties")?
        .get("name")?
        .as_str()
        .and_then(parse_crs_name)
}

/// EPSG code of a CRS name such as `EPSG:32636` or `urn:ogc:def:crs:EPSG::32636`
pub fn parse_crs_name(name: &str) -> Option<i32> {
    if name.ends_with("CRS84") {
        return Some(4326);
    }
    name.rsplit(':').next()?.trim().parse().ok()
}

fn read_ogr(path: &Path) -> Result<(GeoGeometry<f64>, i32)> {
    let dataset = Dataset::open(path)?;
    let mut layer = dataset.layer(0)?;

    let epsg = layer
        .spatial_ref()
        .and_then(|srs| srs.auth_code().ok())
        .unwrap_or(GEOJSON_DEFAULT_EPSG);

    let geometry = layer
        .features()
        .find_map(|feature| feature.geometry().map(|geometry| geometry.to_geo()))
        .transpose()?
        .ok_or_else(|| NdviError::EmptyGeometry(path.to_string_lossy().to_string()))?;

    Ok((geometry, epsg))
}

fn ensure_polygonal(geometry: &GeoGeometry<f64>) -> Result<()> {
    match geometry {
        GeoGeometry::Polygon(_) | GeoGeometry::MultiPolygon(_) => Ok(()),
        GeoGeometry::Point(_) => Err(NdviError::UnsupportedGeometry("Point".to_string())),
        GeoGeometry::Line(_) => Err(NdviError::UnsupportedGeometry("Line".to_string())),
        GeoGeometry::LineString(_) => Err(NdviError::UnsupportedGeometry("LineString".to_string())),
        GeoGeometry::MultiPoint(_) => Err(NdviError::UnsupportedGeometry("MultiPoint".to_string())),
        GeoGeometry::MultiLineString(_) => {
            Err(NdviError::UnsupportedGeometry("MultiLineString".to_string()))
        }
        GeoGeometry::GeometryCollection(_) => {
            Err(NdviError::UnsupportedGeometry("GeometryCollection".to_string()))
        }
        GeoGeometry::Rect(_) => Err(NdviError::UnsupportedGeometry("Rect".to_string())),
        GeoGeometry::Triangle(_) => Err(NdviError::UnsupportedGeometry("Triangle".to_string())),
    }
}
