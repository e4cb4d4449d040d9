use rsndvi::export::stats_file::read_statistics;
use rsndvi::{NdviConfig, NdviPipeline};
use std::fs;
use std::path::{Path, PathBuf};

/// 4x4 grid of 10 m cells whose upper-left corner is (600000, 100000)
fn write_grid(dir: &Path, name: &str, rows: [[i32; 4]; 4]) -> PathBuf {
    let mut content = String::from(
        "ncols 4\nnrows 4\nxllcorner 600000\nyllcorner 99960\ncellsize 10\nNODATA_value -9999\n",
    );
    for row in rows {
        let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        content.push_str(&line.join(" "));
        content.push('\n');
    }
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn write_polygon(dir: &Path, ring: &[(f64, f64)]) -> PathBuf {
    let coords: Vec<String> = ring.iter().map(|(x, y)| format!("[{}, {}]", x, y)).collect();
    let content = format!(
        r#"{{
  "type": "FeatureCollection",
  "crs": {{ "type": "name", "properties": {{ "name": "urn:ogc:def:crs:EPSG::32636" }} }},
  "features": [
    {{ "type": "Feature", "properties": {{}}, "geometry": {{ "type": "Polygon", "coordinates": [[{}]] }} }}
  ]
}}"#,
        coords.join(", ")
    );
    let path = dir.join("polygon.geojson");
    fs::write(&path, content).unwrap();
    path
}

const INNER_SQUARE: [(f64, f64); 5] = [
    (600010.0, 99970.0),
    (600030.0, 99970.0),
    (600030.0, 99990.0),
    (600010.0, 99990.0),
    (600010.0, 99970.0),
];

fn config(dir: &Path, red: &Path, nir: &Path, polygon: &Path) -> NdviConfig {
    NdviConfig {
        red_band_path: red.to_string_lossy().to_string(),
        nir_band_path: nir.to_string_lossy().to_string(),
        polygon_path: polygon.to_path_buf(),
        output_dir: dir.join("output"),
        image_min_size: 16,
        ..NdviConfig::default()
    }
}

#[test]
fn uniform_scene_gives_constant_ndvi() {
    let dir = tempfile::tempdir().unwrap();
    let red = write_grid(dir.path(), "red.asc", [[100; 4]; 4]);
    let nir = write_grid(dir.path(), "nir.asc", [[300; 4]; 4]);
    let polygon = write_polygon(dir.path(), &INNER_SQUARE);

    let outcome = NdviPipeline::new(config(dir.path(), &red, &nir, &polygon))
        .run()
        .unwrap();

    assert_eq!(outcome.red.shape(), &[1, 2, 2]);
    assert_eq!(outcome.nir.shape(), &[1, 2, 2]);
    assert!(outcome.ndvi.iter().all(|&v| (v - 0.5).abs() < 1e-12));
    assert_eq!(outcome.statistics.valid_count, 4);

    let content = fs::read_to_string(&outcome.stats_path).unwrap();
    assert_eq!(content, "Max NDVI: 0.5\nMean NDVI: 0.5\nMin NDVI: 0.5\n");

    let record = read_statistics(&outcome.stats_path).unwrap();
    assert_eq!((record.max, record.mean, record.min), (0.5, 0.5, 0.5));

    assert!(outcome.image_path.exists());
    assert_eq!(outcome.image_path, dir.path().join("output").join("ndvi.png"));
}

#[test]
fn zero_sum_pixels_are_left_out_of_statistics() {
    let dir = tempfile::tempdir().unwrap();
    let red = write_grid(
        dir.path(),
        "red.asc",
        [
            [100, 100, 100, 100],
            [100, 0, 200, 100],
            [100, 100, 100, 100],
            [100, 100, 100, 100],
        ],
    );
    let nir = write_grid(
        dir.path(),
        "nir.asc",
        [
            [300, 300, 300, 300],
            [300, 0, 200, 300],
            [300, 300, 900, 300],
            [300, 300, 300, 300],
        ],
    );
    let polygon = write_polygon(dir.path(), &INNER_SQUARE);

    let outcome = NdviPipeline::new(config(dir.path(), &red, &nir, &polygon))
        .run()
        .unwrap();

    assert!(outcome.ndvi[[0, 0, 0]].is_nan());
    assert_eq!(outcome.statistics.valid_count, 3);
    assert!((outcome.statistics.max - 0.8).abs() < 1e-12);
    assert!((outcome.statistics.min - 0.0).abs() < 1e-12);
    assert!((outcome.statistics.mean - 1.3 / 3.0).abs() < 1e-12);
    assert!(outcome.statistics.min <= outcome.statistics.mean);
    assert!(outcome.statistics.mean <= outcome.statistics.max);
}

#[test]
fn pixels_outside_the_polygon_are_masked() {
    let dir = tempfile::tempdir().unwrap();
    let red = write_grid(dir.path(), "red.asc", [[100; 4]; 4]);
    let nir = write_grid(
        dir.path(),
        "nir.asc",
        [
            [300, 300, 300, 300],
            [300, 300, 300, 300],
            [300, 300, 900, 300],
            [300, 300, 300, 300],
        ],
    );
    // Triangle keeping the centers of cells (1,1), (1,2) and (2,1) only
    let triangle = [
        (600010.0, 99990.0),
        (600035.0, 99990.0),
        (600010.0, 99965.0),
        (600010.0, 99990.0),
    ];
    let polygon = write_polygon(dir.path(), &triangle);

    let outcome = NdviPipeline::new(config(dir.path(), &red, &nir, &polygon))
        .run()
        .unwrap();

    assert_eq!(outcome.red.inside_count(), 3);
    assert!(outcome.ndvi[[0, 1, 1]].is_nan());
    assert_eq!(outcome.statistics.valid_count, 3);
    assert!((outcome.statistics.max - 0.5).abs() < 1e-12);
}

#[test]
fn polygon_outside_raster_gives_nan_statistics() {
    let dir = tempfile::tempdir().unwrap();
    let red = write_grid(dir.path(), "red.asc", [[100; 4]; 4]);
    let nir = write_grid(dir.path(), "nir.asc", [[300; 4]; 4]);
    let far_away = [
        (700000.0, 0.0),
        (700100.0, 0.0),
        (700100.0, 100.0),
        (700000.0, 0.0),
    ];
    let polygon = write_polygon(dir.path(), &far_away);

    let outcome = NdviPipeline::new(config(dir.path(), &red, &nir, &polygon))
        .run()
        .unwrap();

    assert!(outcome.ndvi.is_empty());
    assert!(outcome.statistics.is_indeterminate());

    let content = fs::read_to_string(&outcome.stats_path).unwrap();
    assert_eq!(content, "Max NDVI: nan\nMean NDVI: nan\nMin NDVI: nan\n");
    assert!(outcome.image_path.exists());
}

#[test]
fn missing_raster_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let nir = write_grid(dir.path(), "nir.asc", [[300; 4]; 4]);
    let polygon = write_polygon(dir.path(), &INNER_SQUARE);
    let red = dir.path().join("missing.tif");

    let err = NdviPipeline::new(config(dir.path(), &red, &nir, &polygon))
        .run()
        .unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to mask red band"));
}
