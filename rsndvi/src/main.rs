//! rsndvi - NDVI zonal statistics over a polygon

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use rsndvi::export::stats_file::render_statistics;
use rsndvi::{NdviConfig, NdviPipeline};

#[derive(Parser)]
#[command(name = "rsndvi")]
#[command(author, version, about = "NDVI zonal statistics over a polygon", long_about = None)]
struct Cli {
    /// JSON configuration file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Red band raster (local path, s3:// or http(s):// URI)
    #[arg(long)]
    red: Option<String>,

    /// Near-infrared band raster
    #[arg(long)]
    nir: Option<String>,

    /// Vector file holding the region of interest
    #[arg(short, long)]
    polygon: Option<PathBuf>,

    /// Folder receiving the statistics file and the PNG
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// EPSG code the polygon is reprojected into
    #[arg(short, long)]
    epsg: Option<i32>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Result<NdviConfig> {
        let mut config = match &self.config {
            Some(path) => NdviConfig::from_json_file(path)
                .with_context(|| format!("Failed to read configuration {:?}", path))?,
            None => NdviConfig::default(),
        };

        if let Some(red) = self.red {
            config.red_band_path = red;
        }
        if let Some(nir) = self.nir {
            config.nir_band_path = nir;
        }
        if let Some(polygon) = self.polygon {
            config.polygon_path = polygon;
        }
        if let Some(output_dir) = self.output_dir {
            config.output_dir = output_dir;
        }
        if let Some(epsg) = self.epsg {
            config.target_epsg = epsg;
        }

        Ok(config)
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = cli.into_config()?;
    info!(
        "NDVI over {:?} from red {} and NIR {}",
        config.polygon_path, config.red_band_path, config.nir_band_path
    );

    let outcome = NdviPipeline::new(config).run()?;

    print!("{}", render_statistics(&outcome.statistics));
    println!("  - Statistics: {:?}", outcome.stats_path);
    println!("  - Image: {:?}", outcome.image_path);

    Ok(())
}
