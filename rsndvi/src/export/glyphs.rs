//! 5x7 bitmap glyphs for colorbar tick values and its title.

use image::{Rgb, RgbImage};

pub const GLYPH_WIDTH: u32 = 5;
pub const GLYPH_HEIGHT: u32 = 7;
/// Blank columns between two characters
const SPACING: u32 = 1;

/// Rows top to bottom, bit 4 is the leftmost column
fn glyph(c: char) -> Option<[u8; 7]> {
    let rows = match c {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        'D' => [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'N' => [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        _ => return None,
    };
    Some(rows)
}

/// Width in pixels of `text` drawn on one line
pub fn text_width(text: &str, scale: u32) -> u32 {
    let chars = text.chars().count() as u32;
    if chars == 0 {
        return 0;
    }
    (chars * (GLYPH_WIDTH + SPACING) - SPACING) * scale
}

/// Height in pixels of `text` drawn one character per line
pub fn stacked_height(text: &str, scale: u32) -> u32 {
    let chars = text.chars().count() as u32;
    if chars == 0 {
        return 0;
    }
    (chars * (GLYPH_HEIGHT + SPACING) - SPACING) * scale
}

/// Draw one character with its top-left corner at (x, y); pixels outside the image are skipped.
/// Unknown characters leave a blank cell.
fn draw_char(img: &mut RgbImage, x: i64, y: i64, c: char, scale: u32, color: Rgb<u8>) {
    let Some(rows) = glyph(c) else {
        return;
    };
    let scale = scale as i64;
    for (row, bits) in rows.iter().enumerate() {
        for col in 0..GLYPH_WIDTH {
            if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                continue;
            }
            for dy in 0..scale {
                for dx in 0..scale {
                    let px = x + col as i64 * scale + dx;
                    let py = y + row as i64 * scale + dy;
                    if px >= 0 && py >= 0 && (px as u32) < img.width() && (py as u32) < img.height() {
                        img.put_pixel(px as u32, py as u32, color);
                    }
                }
            }
        }
    }
}

/// Draw `text` left to right starting at (x, y)
pub fn draw_text(img: &mut RgbImage, x: i64, y: i64, text: &str, scale: u32, color: Rgb<u8>) {
    let advance = ((GLYPH_WIDTH + SPACING) * scale) as i64;
    for (i, c) in text.chars().enumerate() {
        draw_char(img, x + i as i64 * advance, y, c, scale, color);
    }
}

/// Draw `text` top to bottom, one character per line, starting at (x, y)
pub fn draw_text_stacked(img: &mut RgbImage, x: i64, y: i64, text: &str, scale: u32, color: Rgb<u8>) {
    let advance = ((GLYPH_HEIGHT + SPACING) * scale) as i64;
    for (i, c) in text.chars().enumerate() {
        draw_char(img, x, y + i as i64 * advance, c, scale, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INK: Rgb<u8> = Rgb([0, 0, 0]);

    fn inked(img: &RgbImage) -> usize {
        img.pixels().filter(|p| **p == INK).count()
    }

    #[test]
    fn test_text_metrics() {
        assert_eq!(text_width("", 1), 0);
        assert_eq!(text_width("1", 1), 5);
        assert_eq!(text_width("-0.5", 1), 23);
        assert_eq!(text_width("-0.5", 2), 46);
        assert_eq!(stacked_height("NDVI", 1), 31);
    }

    #[test]
    fn test_draw_one() {
        let mut img = RgbImage::from_pixel(8, 10, Rgb([255, 255, 255]));
        draw_text(&mut img, 1, 1, "1", 1, INK);
        // Stem of the "1" is the middle column
        for y in 1..8 {
            assert_eq!(*img.get_pixel(3, y), INK);
        }
        assert_eq!(inked(&img), 1 + 2 + 1 + 1 + 1 + 1 + 3);
    }

    #[test]
    fn test_scaled_and_clipped_drawing() {
        let mut img = RgbImage::from_pixel(6, 6, Rgb([255, 255, 255]));
        draw_text(&mut img, -2, -2, "N", 2, INK);
        assert!(inked(&img) > 0);

        let mut img = RgbImage::from_pixel(4, 4, Rgb([255, 255, 255]));
        draw_text(&mut img, 10, 10, "0", 1, INK);
        draw_text(&mut img, 0, 0, "?", 1, INK);
        assert_eq!(inked(&img), 0);
    }

    #[test]
    fn test_stacked_text() {
        let mut img = RgbImage::from_pixel(5, 31, Rgb([255, 255, 255]));
        draw_text_stacked(&mut img, 0, 0, "NDVI", 1, INK);
        // Blank separator row between "N" and "D"
        assert!((0..5).all(|x| *img.get_pixel(x, 7) != INK));
        // Top of the final "I"
        assert_eq!(*img.get_pixel(2, 24), INK);
    }
}
