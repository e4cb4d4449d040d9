use image::{Rgb as Pixel, RgbImage};
use ndarray::{Array3, ArrayView2, Axis};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::commons::colormap::{Colormap, Rgb};
use crate::error::Result;
use crate::export::glyphs::{self, GLYPH_HEIGHT, GLYPH_WIDTH};

/// Layout of the rendered figure
#[derive(Debug, Clone, Copy)]
pub struct PngOptions {
    pub colormap: Colormap,
    /// Minimum size in pixels of the longest side of the NDVI panel
    pub min_size: u32,
    pub colorbar_width: u32,
    /// Values marked by a tick on the colorbar
    pub ticks: [f64; 5],
    pub margin: u32,
    /// Title drawn alongside the colorbar
    pub label: &'static str,
    /// Pixel size of one glyph dot in the tick values and the title
    pub text_scale: u32,
}

impl Default for PngOptions {
    fn default() -> Self {
        PngOptions {
            colormap: Colormap::ndvi(),
            min_size: 512,
            colorbar_width: 24,
            ticks: [-1.0, -0.5, 0.0, 0.5, 1.0],
            margin: 32,
            label: "NDVI",
            text_scale: 2,
        }
    }
}

const TICK_LENGTH: u32 = 6;
const LABEL_GAP: u32 = 3;
const FRAME: Pixel<u8> = Pixel(Rgb::BLACK.to_array());

const fn to_pixel(color: Rgb) -> Pixel<u8> {
    Pixel(color.to_array())
}

/// Tick value as printed next to the colorbar: `-1`, `-0.5`, `0`, ...
fn tick_label(value: f64) -> String {
    format!("{}", value)
}

/// Integer upscaling factor so that the longest side reaches `min_size`
fn scale_factor(rows: usize, cols: usize, min_size: u32) -> u32 {
    let longest = rows.max(cols).max(1) as u32;
    min_size.div_ceil(longest).max(1)
}

fn draw_frame(img: &mut RgbImage, x0: u32, y0: u32, width: u32, height: u32) {
    if width == 0 || height == 0 {
        return;
    }
    let (x1, y1) = (x0 + width - 1, y0 + height - 1);
    for x in x0..=x1 {
        img.put_pixel(x, y0, FRAME);
        img.put_pixel(x, y1, FRAME);
    }
    for y in y0..=y1 {
        img.put_pixel(x0, y, FRAME);
        img.put_pixel(x1, y, FRAME);
    }
}

/// Render the first band of `ndvi` next to a vertical colorbar labelled with its tick values and title.
///
/// NaN pixels take the colormap's NaN color. An array with no pixel renders a blank panel.
pub fn render_ndvi(ndvi: &Array3<f64>, options: &PngOptions) -> RgbImage {
    let band: Option<ArrayView2<f64>> = (!ndvi.is_empty()).then(|| ndvi.index_axis(Axis(0), 0));

    let (rows, cols) = band.as_ref().map(|b| b.dim()).unwrap_or((0, 0));
    let scale = scale_factor(rows, cols, options.min_size);
    let (panel_w, panel_h) = if rows == 0 || cols == 0 {
        warn!("NDVI array is empty, rendering a blank panel");
        (options.min_size.max(1), options.min_size.max(1))
    } else {
        (cols as u32 * scale, rows as u32 * scale)
    };

    let margin = options.margin.max(1);
    let text_scale = options.text_scale.max(1);
    let bar_x = margin + panel_w + margin;
    let labels_x = bar_x + options.colorbar_width + TICK_LENGTH + LABEL_GAP;
    let labels_w = options
        .ticks
        .iter()
        .map(|&tick| glyphs::text_width(&tick_label(tick), text_scale))
        .max()
        .unwrap_or(0);
    let title_x = labels_x + labels_w + LABEL_GAP;
    let width = title_x + GLYPH_WIDTH * text_scale + margin;
    let height = margin + panel_h + margin;

    let mut img = RgbImage::from_pixel(width, height, to_pixel(Rgb::WHITE));

    if let Some(band) = band {
        for y in 0..panel_h {
            for x in 0..panel_w {
                let value = band[[(y / scale) as usize, (x / scale) as usize]];
                img.put_pixel(margin + x, margin + y, to_pixel(options.colormap.color(value)));
            }
        }
    }
    draw_frame(&mut img, margin - 1, margin - 1, panel_w + 2, panel_h + 2);

    let cmap = options.colormap;
    for y in 0..panel_h {
        // Top of the bar is vmax
        let t = 1.0 - (y as f64 + 0.5) / panel_h as f64;
        let value = cmap.vmin + t * (cmap.vmax - cmap.vmin);
        let color = to_pixel(cmap.color(value));
        for x in 0..options.colorbar_width {
            img.put_pixel(bar_x + x, margin + y, color);
        }
    }
    draw_frame(&mut img, bar_x - 1, margin - 1, options.colorbar_width + 2, panel_h + 2);

    for &tick in &options.ticks {
        let t = cmap.normalize(tick);
        let y = margin + ((1.0 - t) * (panel_h - 1) as f64).round() as u32;
        let x0 = bar_x + options.colorbar_width;
        for x in x0..x0 + TICK_LENGTH {
            img.put_pixel(x, y, FRAME);
        }
        let text_y = y as i64 - (GLYPH_HEIGHT * text_scale / 2) as i64;
        glyphs::draw_text(&mut img, labels_x as i64, text_y, &tick_label(tick), text_scale, FRAME);
    }

    let title_h = glyphs::stacked_height(options.label, text_scale) as i64;
    let title_y = (margin + panel_h / 2) as i64 - title_h / 2;
    glyphs::draw_text_stacked(&mut img, title_x as i64, title_y, options.label, text_scale, FRAME);

    img
}

/// Render `ndvi` and save it as a PNG, creating the parent directory if needed
pub fn write_ndvi_png<P: AsRef<Path>>(path: P, ndvi: &Array3<f64>, options: &PngOptions) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let img = render_ndvi(ndvi, options);
    img.save_with_format(path, image::ImageFormat::Png)?;
    info!("NDVI image saved to: {:?} ({}x{})", path, img.width(), img.height());
    Ok(())
}
