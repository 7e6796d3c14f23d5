//! Software rasterizer and PNG serialization.
//!
//! Projects a [`Scene`] through its orthographic camera, auto-fits the
//! projected bounds into the viewport, and paints primitives
//! back-to-front (painter's algorithm) with alpha blending. A small
//! HUD (title, axis labels, legend) is drawn on top in image space.

// Pixel coordinates stay far below any cast boundary
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use preview_types::Point3;
use tracing::debug;

use crate::error::SceneResult;
use crate::scene::{Primitive, Scene, Style};
use crate::text::{draw_text, text_width, GLYPH_HEIGHT};

const TITLE_COLOR: [u8; 4] = [235, 235, 235, 255];
const LEGEND_TEXT_COLOR: [u8; 4] = [220, 220, 220, 255];
const AXIS_COLOR: [u8; 3] = [110, 110, 122];
const AXIS_LABEL_COLOR: [u8; 4] = [180, 180, 190, 255];

/// Parameters for rasterizing a scene.
#[derive(Debug, Clone)]
pub struct RasterParams {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Margin kept around the projected scene in pixels.
    pub margin: u32,
    /// Background fill, RGBA.
    pub background: [u8; 4],
}

impl Default for RasterParams {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            margin: 60,
            background: [0x0b, 0x10, 0x21, 0xff],
        }
    }
}

impl RasterParams {
    /// Create params with a custom size.
    #[must_use]
    pub const fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// Mapping from image-plane coordinates to pixel coordinates.
#[derive(Debug, Clone, Copy)]
struct Fit {
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Fit {
    fn apply(&self, x: f64, y: f64) -> [f32; 2] {
        [
            (x.mul_add(self.scale, self.offset_x)) as f32,
            (y.mul_add(-self.scale, self.offset_y)) as f32,
        ]
    }
}

/// One projected primitive awaiting paint, keyed by mean depth.
struct DrawItem {
    depth: f64,
    shape: Shape,
}

enum Shape {
    Tri {
        points: [[f32; 2]; 3],
        fill: Style,
        edge: Style,
        edge_width: f32,
    },
    Line {
        a: [f32; 2],
        b: [f32; 2],
        style: Style,
        width: f32,
        dashed: bool,
    },
    Dot {
        center: [f32; 2],
        style: Style,
        radius: f32,
    },
}

/// Rasterize a scene into an RGBA framebuffer.
pub(crate) fn rasterize(scene: &Scene, params: &RasterParams) -> RgbaImage {
    let mut img = RgbaImage::from_pixel(params.width, params.height, Rgba(params.background));

    let points = scene_points(scene);
    if points.is_empty() {
        draw_hud(&mut img, scene, params);
        return img;
    }

    let fit = fit_viewport(scene, &points, params);
    draw_axes(&mut img, scene, &points, fit);

    let mut items: Vec<DrawItem> = scene
        .primitives
        .iter()
        .map(|p| project_primitive(scene, p, fit))
        .collect();
    // Painter order: far to near
    items.sort_by(|a, b| a.depth.total_cmp(&b.depth));

    for item in &items {
        match &item.shape {
            Shape::Tri {
                points,
                fill,
                edge,
                edge_width,
            } => {
                fill_triangle(&mut img, *points, *fill);
                stroke_line(&mut img, points[0], points[1], *edge, *edge_width, false);
                stroke_line(&mut img, points[1], points[2], *edge, *edge_width, false);
                stroke_line(&mut img, points[2], points[0], *edge, *edge_width, false);
            }
            Shape::Line {
                a,
                b,
                style,
                width,
                dashed,
            } => stroke_line(&mut img, *a, *b, *style, *width, *dashed),
            Shape::Dot {
                center,
                style,
                radius,
            } => fill_disc(&mut img, *center, *radius, *style),
        }
    }

    draw_hud(&mut img, scene, params);

    debug!(
        items = items.len(),
        width = params.width,
        height = params.height,
        "Rasterized scene"
    );

    img
}

/// Encode a framebuffer as PNG bytes.
pub(crate) fn encode_png(img: &RgbaImage) -> SceneResult<Vec<u8>> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

// ============================================================================
// Projection and fitting
// ============================================================================

fn scene_points(scene: &Scene) -> Vec<Point3<f64>> {
    let mut points = Vec::new();
    for primitive in &scene.primitives {
        match primitive {
            Primitive::Polygon { vertices, .. } => points.extend_from_slice(vertices),
            Primitive::Segment3 { start, end, .. } => {
                points.push(*start);
                points.push(*end);
            }
            Primitive::Marker { position, .. } => points.push(*position),
        }
    }
    points
}

fn fit_viewport(scene: &Scene, points: &[Point3<f64>], params: &RasterParams) -> Fit {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for p in points {
        let proj = scene.camera.project(p);
        min_x = min_x.min(proj.x);
        max_x = max_x.max(proj.x);
        min_y = min_y.min(proj.y);
        max_y = max_y.max(proj.y);
    }

    let margin = f64::from(params.margin);
    let avail_w = (f64::from(params.width) - 2.0 * margin).max(1.0);
    let avail_h = (f64::from(params.height) - 2.0 * margin).max(1.0);

    let content_w = max_x - min_x;
    let content_h = max_y - min_y;
    let scale = if content_w > 0.0 && content_h > 0.0 {
        (avail_w / content_w).min(avail_h / content_h)
    } else if content_w > 0.0 {
        avail_w / content_w
    } else if content_h > 0.0 {
        avail_h / content_h
    } else {
        1.0
    };

    // Center the projected bounds in the viewport. Screen y grows
    // downward, so the y offset anchors the projected maximum.
    let offset_x = f64::from(params.width) / 2.0 - (min_x + max_x) / 2.0 * scale;
    let offset_y = f64::from(params.height) / 2.0 + (min_y + max_y) / 2.0 * scale;

    Fit {
        scale,
        offset_x,
        offset_y,
    }
}

fn project_point(scene: &Scene, p: &Point3<f64>, fit: Fit) -> ([f32; 2], f64) {
    let proj = scene.camera.project(p);
    (fit.apply(proj.x, proj.y), proj.depth)
}

fn project_primitive(scene: &Scene, primitive: &Primitive, fit: Fit) -> DrawItem {
    match primitive {
        Primitive::Polygon {
            vertices,
            fill,
            edge,
            edge_width,
            ..
        } => {
            let (a, da) = project_point(scene, &vertices[0], fit);
            let (b, db) = project_point(scene, &vertices[1], fit);
            let (c, dc) = project_point(scene, &vertices[2], fit);
            DrawItem {
                depth: (da + db + dc) / 3.0,
                shape: Shape::Tri {
                    points: [a, b, c],
                    fill: *fill,
                    edge: *edge,
                    edge_width: *edge_width,
                },
            }
        }
        Primitive::Segment3 {
            start,
            end,
            style,
            width,
            dashed,
            ..
        } => {
            let (a, da) = project_point(scene, start, fit);
            let (b, db) = project_point(scene, end, fit);
            DrawItem {
                depth: (da + db) / 2.0,
                shape: Shape::Line {
                    a,
                    b,
                    style: *style,
                    width: *width,
                    dashed: *dashed,
                },
            }
        }
        Primitive::Marker {
            position,
            style,
            radius,
            ..
        } => {
            let (center, depth) = project_point(scene, position, fit);
            DrawItem {
                depth,
                shape: Shape::Dot {
                    center,
                    style: *style,
                    radius: *radius,
                },
            }
        }
    }
}

// ============================================================================
// Painting
// ============================================================================

fn blend_pixel(img: &mut RgbaImage, x: i64, y: i64, color: [u8; 3], alpha: f32) {
    if x < 0 || y < 0 || x >= i64::from(img.width()) || y >= i64::from(img.height()) {
        return;
    }
    let pixel = img.get_pixel_mut(x as u32, y as u32);
    let a = alpha.clamp(0.0, 1.0);
    for channel in 0..3 {
        let src = f32::from(color[channel]);
        let dst = f32::from(pixel.0[channel]);
        pixel.0[channel] = src.mul_add(a, dst * (1.0 - a)).round() as u8;
    }
    pixel.0[3] = 255;
}

fn edge_function(a: [f32; 2], b: [f32; 2], c: [f32; 2]) -> f32 {
    (b[0] - a[0]).mul_add(c[1] - a[1], -((b[1] - a[1]) * (c[0] - a[0])))
}

fn fill_triangle(img: &mut RgbaImage, p: [[f32; 2]; 3], style: Style) {
    let area = edge_function(p[0], p[1], p[2]);
    if area.abs() < 1e-9 {
        return;
    }

    let min_x = p.iter().map(|v| v[0]).fold(f32::INFINITY, f32::min).floor() as i64;
    let max_x = p
        .iter()
        .map(|v| v[0])
        .fold(f32::NEG_INFINITY, f32::max)
        .ceil() as i64;
    let min_y = p.iter().map(|v| v[1]).fold(f32::INFINITY, f32::min).floor() as i64;
    let max_y = p
        .iter()
        .map(|v| v[1])
        .fold(f32::NEG_INFINITY, f32::max)
        .ceil() as i64;

    let min_x = min_x.max(0);
    let min_y = min_y.max(0);
    let max_x = max_x.min(i64::from(img.width()) - 1);
    let max_y = max_y.min(i64::from(img.height()) - 1);

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let sample = [x as f32 + 0.5, y as f32 + 0.5];
            let w0 = edge_function(p[1], p[2], sample);
            let w1 = edge_function(p[2], p[0], sample);
            let w2 = edge_function(p[0], p[1], sample);

            let inside = (w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0)
                || (w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0);
            if inside {
                blend_pixel(img, x, y, style.color, style.alpha);
            }
        }
    }
}

fn fill_disc(img: &mut RgbaImage, center: [f32; 2], radius: f32, style: Style) {
    let r = radius.max(0.5);
    let r2 = r * r;
    let min_x = (center[0] - r).floor() as i64;
    let max_x = (center[0] + r).ceil() as i64;
    let min_y = (center[1] - r).floor() as i64;
    let max_y = (center[1] + r).ceil() as i64;

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x as f32 + 0.5 - center[0];
            let dy = y as f32 + 0.5 - center[1];
            if dx.mul_add(dx, dy * dy) <= r2 {
                blend_pixel(img, x, y, style.color, style.alpha);
            }
        }
    }
}

const DASH_ON_PX: f32 = 6.0;
const DASH_PERIOD_PX: f32 = 10.0;

fn stroke_line(
    img: &mut RgbaImage,
    a: [f32; 2],
    b: [f32; 2],
    style: Style,
    width: f32,
    dashed: bool,
) {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    let length = dx.hypot(dy);
    let radius = (width / 2.0).max(0.5);

    if length < 1e-6 {
        fill_disc(img, a, radius, style);
        return;
    }

    let steps = (length / 0.5).ceil() as u32;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let dist = t * length;
        if dashed && dist.rem_euclid(DASH_PERIOD_PX) >= DASH_ON_PX {
            continue;
        }
        let point = [dx.mul_add(t, a[0]), dy.mul_add(t, a[1])];
        fill_disc(img, point, radius, style);
    }
}

// ============================================================================
// HUD: axes, title, legend
// ============================================================================

fn draw_axes(img: &mut RgbaImage, scene: &Scene, points: &[Point3<f64>], fit: Fit) {
    let Some(first) = points.first() else {
        return;
    };

    let mut min = *first;
    let mut max = *first;
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        min.z = min.z.min(p.z);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
        max.z = max.z.max(p.z);
    }

    let origin = min;
    let axes = [
        (Point3::new(max.x, min.y, min.z), "X"),
        (Point3::new(min.x, max.y, min.z), "Y"),
        (Point3::new(min.x, min.y, max.z), "Z"),
    ];

    let (o2, _) = project_point(scene, &origin, fit);
    for (tip, label) in axes {
        let (t2, _) = project_point(scene, &tip, fit);
        stroke_line(img, o2, t2, Style::solid(AXIS_COLOR), 1.0, false);
        draw_text(img, t2[0] as i64 + 4, t2[1] as i64 + 4, label, AXIS_LABEL_COLOR);
    }
}

fn draw_hud(img: &mut RgbaImage, scene: &Scene, params: &RasterParams) {
    if !scene.title.is_empty() {
        let x = (i64::from(params.width) - i64::from(text_width(&scene.title))) / 2;
        draw_text(img, x.max(0), 6, &scene.title, TITLE_COLOR);
    }

    let mut y: i64 = 6 + 2 * i64::from(GLYPH_HEIGHT);
    for (label, swatch) in scene.legend() {
        if y + i64::from(GLYPH_HEIGHT) + 2 > i64::from(params.height) {
            break;
        }
        for sy in 0..8 {
            for sx in 0..10 {
                blend_pixel(img, 8 + sx, y + sy, swatch.color, swatch.alpha.max(0.55));
            }
        }
        draw_text(img, 24, y, &label, LEGEND_TEXT_COLOR);
        y += i64::from(GLYPH_HEIGHT) + 6;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::scene::{assemble, SceneContent};
    use preview_types::{square_layer, unit_cube_mesh, ToolpathLayer};

    fn render(content: &SceneContent<'_>) -> RgbaImage {
        assemble(content).rasterize(&RasterParams::default())
    }

    #[test]
    fn default_params() {
        let params = RasterParams::default();
        assert_eq!(params.width, 800);
        assert_eq!(params.height, 600);
        assert_eq!(params.background, [0x0b, 0x10, 0x21, 0xff]);
    }

    #[test]
    fn empty_scene_is_background_only() {
        let layer = ToolpathLayer::default();
        let img = render(&SceneContent {
            meshes: &[],
            layer: &layer,
            show_contours: true,
            show_infill: true,
            raw_points: None,
            highlights: &[],
            title: String::new(),
        });

        let bg = Rgba([0x0b, 0x10, 0x21, 0xff]);
        assert!(img.pixels().all(|p| *p == bg));
    }

    #[test]
    fn toolpaths_leave_marks() {
        let layer = square_layer(0.5);
        let img = render(&SceneContent {
            meshes: &[],
            layer: &layer,
            show_contours: true,
            show_infill: true,
            raw_points: None,
            highlights: &[],
            title: "Layer 0 at z=0.5mm".to_string(),
        });

        let bg = Rgba([0x0b, 0x10, 0x21, 0xff]);
        let marked = img.pixels().filter(|p| **p != bg).count();
        assert!(marked > 100, "expected visible toolpath, got {marked} px");
    }

    #[test]
    fn mesh_faces_are_translucent() {
        let layer = ToolpathLayer::default();
        let meshes = [unit_cube_mesh()];
        let img = render(&SceneContent {
            meshes: &meshes,
            layer: &layer,
            show_contours: false,
            show_infill: false,
            raw_points: None,
            highlights: &[],
            title: String::new(),
        });

        // Face fill blends gray over the dark background: brighter than
        // the background, darker than the face color.
        let center = img.get_pixel(400, 300);
        assert!(center.0[0] > 0x0b);
        assert!(center.0[0] < 0x80);
    }

    #[test]
    fn encoded_png_has_signature() {
        let layer = square_layer(1.0);
        let scene = assemble(&SceneContent {
            meshes: &[],
            layer: &layer,
            show_contours: true,
            show_infill: false,
            raw_points: None,
            highlights: &[],
            title: "t".to_string(),
        });

        let png = scene.encode_png(&RasterParams::default()).unwrap();
        assert_eq!(&png[..8], &[0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a]);
    }

    #[test]
    fn blend_is_clipped() {
        let mut img = RgbaImage::new(4, 4);
        // Out-of-bounds writes must be ignored
        blend_pixel(&mut img, -1, 0, [255, 255, 255], 1.0);
        blend_pixel(&mut img, 0, 99, [255, 255, 255], 1.0);
        blend_pixel(&mut img, 1, 1, [255, 255, 255], 1.0);
        assert_eq!(img.get_pixel(1, 1).0, [255, 255, 255, 255]);
    }
}
