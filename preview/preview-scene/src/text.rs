//! Bitmap text for titles, axis labels, and legend entries.

// Pixel coordinates stay far below any cast boundary
#![allow(clippy::cast_possible_wrap)]

use font8x8::legacy::BASIC_LEGACY;
use image::RgbaImage;

/// Glyph cell width in pixels.
pub(crate) const GLYPH_WIDTH: u32 = 8;

/// Glyph cell height in pixels.
pub(crate) const GLYPH_HEIGHT: u32 = 8;

/// Pixel width of `text` when drawn with [`draw_text`].
pub(crate) fn text_width(text: &str) -> u32 {
    u32::try_from(text.chars().count()).unwrap_or(u32::MAX) * GLYPH_WIDTH
}

/// Draw ASCII text with its top-left corner at `(x, y)`.
///
/// Characters outside the basic ASCII range are drawn as `?`. Pixels
/// falling outside the image are clipped.
pub(crate) fn draw_text(img: &mut RgbaImage, x: i64, y: i64, text: &str, color: [u8; 4]) {
    for (offset, ch) in text.chars().enumerate() {
        let glyph = BASIC_LEGACY
            .get(ch as usize)
            .unwrap_or(&BASIC_LEGACY[b'?' as usize]);

        let cell_x = x + (offset as i64) * i64::from(GLYPH_WIDTH);
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << col) == 0 {
                    continue;
                }
                let px = cell_x + i64::from(col);
                let py = y + row as i64;
                if px >= 0 && py >= 0 && px < i64::from(img.width()) && py < i64::from(img.height())
                {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    img.put_pixel(px as u32, py as u32, image::Rgba(color));
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn text_width_counts_cells() {
        assert_eq!(text_width(""), 0);
        assert_eq!(text_width("abc"), 24);
    }

    #[test]
    fn draw_text_marks_pixels() {
        let mut img = RgbaImage::new(64, 16);
        draw_text(&mut img, 0, 0, "X", [255, 255, 255, 255]);

        let lit = img.pixels().filter(|p| p.0[0] == 255).count();
        assert!(lit > 0);
    }

    #[test]
    fn draw_text_clips_at_borders() {
        let mut img = RgbaImage::new(4, 4);
        // Partially and fully out of bounds; must not panic.
        draw_text(&mut img, -3, -3, "W", [255, 255, 255, 255]);
        draw_text(&mut img, 100, 100, "W", [255, 255, 255, 255]);
    }
}
