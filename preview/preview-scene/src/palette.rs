//! Fixed 20-color palette for triangle highlighting.

/// The 20-entry qualitative palette used for highlighted triangles.
///
/// Colors alternate between a saturated and a lighter variant of ten
/// base hues.
pub const TAB20: [[u8; 3]; 20] = [
    [0x1f, 0x77, 0xb4],
    [0xae, 0xc7, 0xe8],
    [0xff, 0x7f, 0x0e],
    [0xff, 0xbb, 0x78],
    [0x2c, 0xa0, 0x2c],
    [0x98, 0xdf, 0x8a],
    [0xd6, 0x27, 0x28],
    [0xff, 0x98, 0x96],
    [0x94, 0x67, 0xbd],
    [0xc5, 0xb0, 0xd5],
    [0x8c, 0x56, 0x4b],
    [0xc4, 0x9c, 0x94],
    [0xe3, 0x77, 0xc2],
    [0xf7, 0xb6, 0xd2],
    [0x7f, 0x7f, 0x7f],
    [0xc7, 0xc7, 0xc7],
    [0xbc, 0xbd, 0x22],
    [0xdb, 0xdb, 0x8d],
    [0x17, 0xbe, 0xcf],
    [0x9e, 0xda, 0xe5],
];

/// Sample the palette at `t` in `[0, 1]`.
///
/// The unit interval is divided into 20 equal bins; values outside the
/// interval are clamped. This mirrors how a discrete colormap maps a
/// continuous coordinate onto its entries.
///
/// # Example
///
/// ```
/// use preview_scene::{tab20, TAB20};
///
/// assert_eq!(tab20(0.0), TAB20[0]);
/// assert_eq!(tab20(0.5), TAB20[10]);
/// assert_eq!(tab20(1.0), TAB20[19]);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn tab20(t: f64) -> [u8; 3] {
    let idx = ((t.max(0.0) * 20.0).floor() as usize).min(TAB20.len() - 1);
    TAB20[idx]
}
