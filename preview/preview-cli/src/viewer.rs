//! On-screen preview window.
//!
//! Blits the rendered PNG into a framebuffer window and keeps it open
//! until the user closes it or presses Escape.

use anyhow::Context;
use minifb::{Key, Window, WindowOptions};

/// Decode `png` and display it until the window is closed.
pub fn show(png: &[u8], title: &str) -> anyhow::Result<()> {
    let decoded = image::load_from_memory_with_format(png, image::ImageFormat::Png)
        .context("failed to decode the rendered preview")?
        .to_rgba8();
    let (width, height) = (decoded.width() as usize, decoded.height() as usize);
    let buffer = pack_argb(decoded.as_raw());

    let mut window = Window::new(title, width, height, WindowOptions::default())
        .context("failed to create a display window; use --output for headless rendering")?;
    window.set_target_fps(30);

    while window.is_open() && !window.is_key_down(Key::Escape) {
        window
            .update_with_buffer(&buffer, width, height)
            .context("failed to present the preview frame")?;
    }
    Ok(())
}

/// Pack RGBA bytes into the `0x00RRGGBB` pixels the window expects.
/// Alpha is dropped; the renderer already composited onto its
/// background.
fn pack_argb(rgba: &[u8]) -> Vec<u32> {
    rgba.chunks_exact(4)
        .map(|px| (u32::from(px[0]) << 16) | (u32::from(px[1]) << 8) | u32::from(px[2]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing_drops_alpha_and_orders_channels() {
        let rgba = [0x12, 0x34, 0x56, 0xff, 0x0b, 0x10, 0x21, 0x80];
        let packed = pack_argb(&rgba);
        assert_eq!(packed, vec![0x0012_3456, 0x000b_1021]);
    }

    #[test]
    fn packing_ignores_trailing_partial_pixel() {
        let rgba = [0xff, 0x00, 0x00, 0xff, 0x01, 0x02];
        assert_eq!(pack_argb(&rgba), vec![0x00ff_0000]);
    }
}
