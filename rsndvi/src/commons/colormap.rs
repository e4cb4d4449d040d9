//! Color schemes and multi-stop interpolation used to render NDVI rasters.

/// RGB color with channels in 0..=255
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    pub const WHITE: Self = Rgb::new(255, 255, 255);
    pub const BLACK: Self = Rgb::new(0, 0, 0);

    pub const fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// A color stop: position in [0, 1] mapped to a color
#[derive(Debug, Clone, Copy)]
pub struct ColorStop {
    pub t: f64,
    pub color: Rgb,
}

impl ColorStop {
    pub const fn new(t: f64, r: u8, g: u8, b: u8) -> Self {
        ColorStop {
            t,
            color: Rgb::new(r, g, b),
        }
    }
}

/// Available color schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorScheme {
    /// Diverging red -> yellow -> green (ColorBrewer RdYlGn, 11 classes)
    #[default]
    RdYlGn,
}

impl ColorScheme {
    fn stops(&self) -> &'static [ColorStop] {
        match self {
            ColorScheme::RdYlGn => RDYLGN_STOPS,
        }
    }
}

const RDYLGN_STOPS: &[ColorStop] = &[
    ColorStop::new(0.0, 165, 0, 38),
    ColorStop::new(0.1, 215, 48, 39),
    ColorStop::new(0.2, 244, 109, 67),
    ColorStop::new(0.3, 253, 174, 97),
    ColorStop::new(0.4, 254, 224, 139),
    ColorStop::new(0.5, 255, 255, 191),
    ColorStop::new(0.6, 217, 239, 139),
    ColorStop::new(0.7, 166, 217, 106),
    ColorStop::new(0.8, 102, 189, 99),
    ColorStop::new(0.9, 26, 152, 80),
    ColorStop::new(1.0, 0, 104, 55),
];

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn lerp_color(c1: Rgb, c2: Rgb, t: f64) -> Rgb {
    Rgb::new(
        lerp(c1.r as f64, c2.r as f64, t).round() as u8,
        lerp(c1.g as f64, c2.g as f64, t).round() as u8,
        lerp(c1.b as f64, c2.b as f64, t).round() as u8,
    )
}

fn multi_stop(stops: &[ColorStop], t: f64) -> Rgb {
    if t <= stops[0].t {
        return stops[0].color;
    }
    let last = stops[stops.len() - 1];
    if t >= last.t {
        return last.color;
    }
    for pair in stops.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if t <= hi.t {
            let ratio = (t - lo.t) / (hi.t - lo.t);
            return lerp_color(lo.color, hi.color, ratio);
        }
    }
    last.color
}

/// Color of normalized position `t` (clamped to [0, 1])
pub fn evaluate(scheme: ColorScheme, t: f64) -> Rgb {
    multi_stop(scheme.stops(), t)
}

/// Maps data values onto a color scheme over a fixed range
#[derive(Debug, Clone, Copy)]
pub struct Colormap {
    pub scheme: ColorScheme,
    pub vmin: f64,
    pub vmax: f64,
    /// Color of NaN pixels
    pub nan_color: Rgb,
}

impl Colormap {
    pub fn new(scheme: ColorScheme, vmin: f64, vmax: f64) -> Self {
        Colormap {
            scheme,
            vmin,
            vmax,
            nan_color: Rgb::WHITE,
        }
    }

    /// RdYlGn fixed to the NDVI domain [-1, 1]
    pub fn ndvi() -> Self {
        Colormap::new(ColorScheme::RdYlGn, -1.0, 1.0)
    }

    /// Position of `value` in [0, 1]; values outside the range are clamped
    pub fn normalize(&self, value: f64) -> f64 {
        let range = self.vmax - self.vmin;
        if range.abs() < f64::EPSILON {
            return 0.5;
        }
        ((value - self.vmin) / range).clamp(0.0, 1.0)
    }

    pub fn color(&self, value: f64) -> Rgb {
        if value.is_nan() {
            return self.nan_color;
        }
        evaluate(self.scheme, self.normalize(value))
    }
}

impl Default for Colormap {
    fn default() -> Self {
        Colormap::ndvi()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rdylgn_endpoints_and_center() {
        assert_eq!(evaluate(ColorScheme::RdYlGn, 0.0), Rgb::new(165, 0, 38));
        assert_eq!(evaluate(ColorScheme::RdYlGn, 0.5), Rgb::new(255, 255, 191));
        assert_eq!(evaluate(ColorScheme::RdYlGn, 1.0), Rgb::new(0, 104, 55));
    }

    #[test]
    fn interpolation_between_stops() {
        // Halfway between the 0.0 and 0.1 stops
        let c = evaluate(ColorScheme::RdYlGn, 0.05);
        assert_eq!((c.r, c.g), (190, 24));
        assert!(c.b == 38 || c.b == 39);
    }

    #[test]
    fn clamping_outside_unit_range() {
        assert_eq!(evaluate(ColorScheme::RdYlGn, -0.5), Rgb::new(165, 0, 38));
        assert_eq!(evaluate(ColorScheme::RdYlGn, 1.5), Rgb::new(0, 104, 55));
    }

    #[test]
    fn ndvi_colormap_range() {
        let cmap = Colormap::ndvi();
        assert_eq!(cmap.normalize(-1.0), 0.0);
        assert_eq!(cmap.normalize(0.0), 0.5);
        assert_eq!(cmap.normalize(1.0), 1.0);
        assert_eq!(cmap.normalize(3.0), 1.0);
        assert_eq!(cmap.color(f64::NAN), Rgb::WHITE);
        assert_eq!(cmap.color(0.0), Rgb::new(255, 255, 191));
    }
}
