use gdal::Dataset;
use ndarray::{Array2, Array3, Axis};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use url::Url;

use crate::collect::polygon::RegionOfInterest;
use crate::error::{NdviError, Result};
use crate::geo_core::{BoundingBox, GeoTransform};

/// Where a raster band is read from
#[derive(Debug, Clone, PartialEq)]
pub enum RasterSource {
    /// File on the local filesystem
    Local(PathBuf),
    /// Object storage or HTTP resource, read through a GDAL virtual filesystem
    Remote { uri: String, gdal_path: String },
}

impl RasterSource {
    /// Classify a location: `s3://`, `gs://` and `http(s)://` URIs are remote,
    /// `/vsi*` paths are passed to GDAL untouched, anything else is a local path.
    pub fn parse(location: &str) -> Result<Self> {
        if location.trim().is_empty() {
            return Err(NdviError::InvalidLocation("empty raster location".to_string()));
        }
        if location.starts_with("/vsi") {
            return Ok(RasterSource::Remote {
                uri: location.to_string(),
                gdal_path: location.to_string(),
            });
        }

        let url = match Url::parse(location) {
            Ok(url) => url,
            Err(_) => return Ok(RasterSource::Local(PathBuf::from(location))),
        };

        let prefix = match url.scheme() {
            "s3" => "/vsis3",
            "gs" => "/vsigs",
            "http" | "https" => {
                return Ok(RasterSource::Remote {
                    uri: location.to_string(),
                    gdal_path: format!("/vsicurl/{}", location),
                })
            }
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| NdviError::InvalidLocation(location.to_string()))?;
                return Ok(RasterSource::Local(path));
            }
            // Single-letter schemes are Windows drive letters
            scheme if scheme.len() == 1 => return Ok(RasterSource::Local(PathBuf::from(location))),
            _ => return Err(NdviError::InvalidLocation(location.to_string())),
        };

        let bucket = url
            .host_str()
            .ok_or_else(|| NdviError::InvalidLocation(format!("missing bucket in {}", location)))?;

        Ok(RasterSource::Remote {
            uri: location.to_string(),
            gdal_path: format!("{}/{}{}", prefix, bucket, url.path()),
        })
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, RasterSource::Remote { .. })
    }

    /// Path handed to `Dataset::open`
    pub fn gdal_path(&self) -> PathBuf {
        match self {
            RasterSource::Local(path) => path.clone(),
            RasterSource::Remote { gdal_path, .. } => PathBuf::from(gdal_path),
        }
    }
}

/// Pixel window of a raster, in pixel units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    pub col_off: usize,
    pub row_off: usize,
    pub width: usize,
    pub height: usize,
}

impl PixelWindow {
    /// Smallest window covering `bbox`, clipped to a raster of `cols` x `rows`.
    /// Fractional edges are widened to whole pixels.
    pub fn covering(transform: &GeoTransform, bbox: &BoundingBox, cols: usize, rows: usize) -> Self {
        let mut min_col = f64::INFINITY;
        let mut max_col = f64::NEG_INFINITY;
        let mut min_row = f64::INFINITY;
        let mut max_row = f64::NEG_INFINITY;

        for (x, y) in bbox.corners() {
            let (col, row) = transform.geo_to_pixel(x, y);
            min_col = min_col.min(col);
            max_col = max_col.max(col);
            min_row = min_row.min(row);
            max_row = max_row.max(row);
        }

        if !(min_col.is_finite() && max_col.is_finite() && min_row.is_finite() && max_row.is_finite()) {
            return PixelWindow::empty();
        }

        let col_start = min_col.floor().max(0.0);
        let col_stop = max_col.ceil().min(cols as f64);
        let row_start = min_row.floor().max(0.0);
        let row_stop = max_row.ceil().min(rows as f64);

        if col_stop <= col_start || row_stop <= row_start {
            return PixelWindow::empty();
        }

        PixelWindow {
            col_off: col_start as usize,
            row_off: row_start as usize,
            width: (col_stop - col_start) as usize,
            height: (row_stop - row_start) as usize,
        }
    }

    pub fn empty() -> Self {
        PixelWindow {
            col_off: 0,
            row_off: 0,
            width: 0,
            height: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Raster bands restricted to a region of interest
#[derive(Debug, Clone)]
pub struct MaskedImage {
    /// Samples shaped (bands, rows, cols); pixels outside the region hold `nodata`
    pub data: Array3<f64>,
    /// `true` where the pixel center lies inside the region
    pub inside: Array2<bool>,
    /// Transform of the cropped window
    pub transform: GeoTransform,
    pub nodata: f64,
    /// CRS of the source raster when it declares an EPSG code
    pub epsg: Option<i32>,
}

impl MaskedImage {
    /// Image with `bands` bands and no pixels
    pub fn empty(bands: usize, transform: GeoTransform, nodata: f64, epsg: Option<i32>) -> Self {
        MaskedImage {
            data: Array3::zeros((bands, 0, 0)),
            inside: Array2::from_elem((0, 0), false),
            transform,
            nodata,
            epsg,
        }
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of pixels inside the region
    pub fn inside_count(&self) -> usize {
        self.inside.iter().filter(|&&inside| inside).count()
    }
}

/// Mask an in-memory window: pixels whose center falls outside `region` are set to `nodata`.
///
/// `transform` is the transform of the window itself, `data` is shaped (bands, rows, cols).
pub fn mask_image(
    mut data: Array3<f64>,
    transform: GeoTransform,
    region: &RegionOfInterest,
    nodata: f64,
    epsg: Option<i32>,
) -> MaskedImage {
    let (_, rows, cols) = data.dim();

    let inside = Array2::from_shape_fn((rows, cols), |(row, col)| {
        let (x, y) = transform.pixel_center(col, row);
        region.covers(x, y)
    });

    for mut plane in data.axis_iter_mut(Axis(0)) {
        plane.zip_mut_with(&inside, |value, &is_inside| {
            if !is_inside {
                *value = nodata;
            }
        });
    }

    MaskedImage {
        data,
        inside,
        transform,
        nodata,
        epsg,
    }
}

const NO_SIGN_REQUEST: &str = "AWS_NO_SIGN_REQUEST";

/// Unsigned object storage requests on the current thread while alive.
/// Dropping it restores the option to its previous value.
pub struct UnsignedRequests {
    previous: String,
}

impl UnsignedRequests {
    pub fn enable() -> Result<Self> {
        let previous = gdal::config::get_thread_local_config_option(NO_SIGN_REQUEST, "")?;
        gdal::config::set_thread_local_config_option(NO_SIGN_REQUEST, "YES")?;
        Ok(UnsignedRequests { previous })
    }
}

impl Drop for UnsignedRequests {
    fn drop(&mut self) {
        let restored = if self.previous.is_empty() {
            gdal::config::clear_thread_local_config_option(NO_SIGN_REQUEST)
        } else {
            gdal::config::set_thread_local_config_option(NO_SIGN_REQUEST, &self.previous)
        };
        if let Err(e) = restored {
            warn!("Failed to reset {}: {}", NO_SIGN_REQUEST, e);
        }
    }
}

/// Open a raster, crop it to the bounding window of `region` and mask the pixels outside it.
///
/// The dataset is dropped before returning, on success and on error.
/// A region entirely outside the raster gives an empty image, not an error.
pub fn mask_raster(
    source: &RasterSource,
    region: &RegionOfInterest,
    anonymous: bool,
) -> Result<MaskedImage> {
    let _unsigned = if anonymous && source.is_remote() {
        Some(UnsignedRequests::enable()?)
    } else {
        None
    };

    let path = source.gdal_path();
    match source {
        RasterSource::Remote { uri, gdal_path } => info!("Reading raster {} through {}", uri, gdal_path),
        RasterSource::Local(local) => info!("Reading raster {:?}", local),
    }
    let dataset = Dataset::open(&path)?;

    let transform = GeoTransform::from_gdal(dataset.geo_transform()?);
    let (cols, rows) = dataset.raster_size();
    let band_count = dataset.raster_count();
    let nodata = dataset.rasterband(1)?.no_data_value().unwrap_or(0.0);

    let epsg = dataset
        .spatial_ref()
        .ok()
        .and_then(|srs| srs.auth_code().ok());
    match epsg {
        Some(code) if code != region.epsg => warn!(
            "Raster {:?} is in EPSG:{} but the polygon is in EPSG:{}; masking may be wrong",
            path, code, region.epsg
        ),
        None => warn!("Raster {:?} declares no EPSG code", path),
        _ => {}
    }

    let bbox = region
        .bbox()
        .ok_or_else(|| NdviError::EmptyGeometry("region of interest".to_string()))?;
    let window = PixelWindow::covering(&transform, &bbox, cols, rows);
    debug!("Polygon window on {:?}: {:?} (raster {}x{})", path, window, cols, rows);

    if window.is_empty() {
        warn!("Polygon does not overlap raster {:?}", path);
        return Ok(MaskedImage::empty(band_count, transform, nodata, epsg));
    }

    let mut data = Array3::from_elem((band_count, window.height, window.width), nodata);
    for (index, mut plane) in data.axis_iter_mut(Axis(0)).enumerate() {
        let band = dataset.rasterband(index + 1)?;
        let buffer = band.read_as::<f64>(
            (window.col_off as isize, window.row_off as isize),
            (window.width, window.height),
            (window.width, window.height),
            None,
        )?;
        for (dst, src) in plane.iter_mut().zip(buffer.data()) {
            *dst = *src;
        }
    }

    let window_transform = transform.window(window.col_off, window.row_off);
    Ok(mask_image(data, window_transform, region, nodata, epsg))
}
