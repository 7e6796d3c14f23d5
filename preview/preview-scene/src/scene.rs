//! Scene assembly.
//!
//! Composes heterogeneous geometric primitives into a [`Scene`] with
//! deterministic styling and a deduplicated legend.

use preview_types::{Point3, ToolpathLayer, TriangleMesh};
use tracing::debug;

use crate::camera::Camera;
use crate::error::SceneResult;
use crate::intersect::TriangleHit;
use crate::palette::tab20;
use crate::raster::{self, RasterParams};

/// Fill and translucency for a primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    /// RGB color.
    pub color: [u8; 3],
    /// Opacity in `[0, 1]`.
    pub alpha: f32,
}

impl Style {
    /// Create an opaque style.
    #[must_use]
    pub const fn solid(color: [u8; 3]) -> Self {
        Self { color, alpha: 1.0 }
    }

    /// Create a translucent style.
    #[must_use]
    pub const fn translucent(color: [u8; 3], alpha: f32) -> Self {
        Self { color, alpha }
    }
}

const CONTOUR_COLOR: [u8; 3] = [0x1f, 0x77, 0xb4];
const INFILL_COLOR: [u8; 3] = [0xff, 0x7f, 0x0e];
const RAW_POINT_COLOR: [u8; 3] = [0xff, 0x00, 0x00];
const MESH_FACE_COLOR: [u8; 3] = [0x80, 0x80, 0x80];
const EDGE_COLOR: [u8; 3] = [0x00, 0x00, 0x00];

/// A renderable scene element.
#[derive(Debug, Clone)]
pub enum Primitive {
    /// A filled triangle with an outlined edge.
    Polygon {
        /// Vertex positions.
        vertices: [Point3<f64>; 3],
        /// Face fill style.
        fill: Style,
        /// Edge stroke style.
        edge: Style,
        /// Edge stroke width in pixels.
        edge_width: f32,
        /// Legend label, if any.
        label: Option<String>,
    },
    /// A straight line segment.
    Segment3 {
        /// Segment start.
        start: Point3<f64>,
        /// Segment end.
        end: Point3<f64>,
        /// Stroke style.
        style: Style,
        /// Stroke width in pixels.
        width: f32,
        /// Whether the stroke is dashed.
        dashed: bool,
        /// Legend label, if any.
        label: Option<String>,
    },
    /// A small discrete marker.
    Marker {
        /// Marker position.
        position: Point3<f64>,
        /// Marker style.
        style: Style,
        /// Marker radius in pixels.
        radius: f32,
        /// Legend label, if any.
        label: Option<String>,
    },
}

impl Primitive {
    fn label_and_swatch(&self) -> Option<(&str, Style)> {
        match self {
            Self::Polygon { fill, label, .. } => label.as_deref().map(|l| (l, *fill)),
            Self::Segment3 { style, label, .. } | Self::Marker { style, label, .. } => {
                label.as_deref().map(|l| (l, *style))
            }
        }
    }
}

/// A fully assembled 3D scene, ready to rasterize.
#[derive(Debug, Clone)]
pub struct Scene {
    /// Scene primitives in assembly order.
    pub primitives: Vec<Primitive>,
    /// Title drawn at the top of the image.
    pub title: String,
    /// Camera orientation.
    pub camera: Camera,
}

impl Scene {
    /// Create an empty scene with the fixed preview camera.
    #[must_use]
    pub fn new(title: String) -> Self {
        Self {
            primitives: Vec::new(),
            title,
            camera: Camera::default(),
        }
    }

    /// Legend entries: one per distinct label.
    ///
    /// Built as an ordered label-to-swatch mapping with
    /// overwrite-on-insert semantics: entries keep first-insertion
    /// order, the last writer for a given label wins.
    #[must_use]
    pub fn legend(&self) -> Vec<(String, Style)> {
        let mut entries: Vec<(String, Style)> = Vec::new();

        for primitive in &self.primitives {
            if let Some((label, swatch)) = primitive.label_and_swatch() {
                if let Some(existing) = entries.iter_mut().find(|(l, _)| l == label) {
                    existing.1 = swatch;
                } else {
                    entries.push((label.to_string(), swatch));
                }
            }
        }

        entries
    }

    /// Rasterize the scene into an RGBA framebuffer.
    #[must_use]
    pub fn rasterize(&self, params: &RasterParams) -> image::RgbaImage {
        raster::rasterize(self, params)
    }

    /// Rasterize and encode the scene as PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SceneError::PngEncode`] if the encoder fails.
    pub fn encode_png(&self, params: &RasterParams) -> SceneResult<Vec<u8>> {
        raster::encode_png(&self.rasterize(params))
    }
}

/// One mesh paired with its intersecting-triangle hits.
#[derive(Debug, Clone, Copy)]
pub struct MeshHighlights<'a> {
    /// The mesh the hits belong to.
    pub mesh: &'a TriangleMesh,
    /// Hits in ascending triangle-index order.
    pub hits: &'a [TriangleHit],
}

/// Everything the assembler needs to build a scene.
#[derive(Debug)]
pub struct SceneContent<'a> {
    /// Meshes to draw as translucent faces. Pass an empty slice to
    /// disable mesh display.
    pub meshes: &'a [TriangleMesh],
    /// The selected toolpath layer.
    pub layer: &'a ToolpathLayer,
    /// Draw the layer's contour segments.
    pub show_contours: bool,
    /// Draw the layer's infill segments.
    pub show_infill: bool,
    /// Raw slice-plane intersection points and the Z to project them to.
    pub raw_points: Option<(&'a [Point3<f64>], f64)>,
    /// Per-mesh triangle highlights.
    pub highlights: &'a [MeshHighlights<'a>],
    /// Image title.
    pub title: String,
}

/// Assemble a scene from meshes, toolpaths, raw points, and highlights.
///
/// Empty inputs simply yield an emptier scene; there are no error
/// conditions. Styling is deterministic:
///
/// - mesh faces: translucent gray fill, thin black edges, no label
/// - contours: solid blue, labeled "contour"
/// - infill: dashed orange, labeled "infill"
/// - raw points: red markers at the supplied Z, labeled
///   "raw intersections"
/// - highlighted triangles: palette color keyed by the hit's position
///   within its own mesh's hit list, labeled "tri {index}"
#[must_use]
pub fn assemble(content: &SceneContent<'_>) -> Scene {
    let mut scene = Scene::new(content.title.clone());

    for mesh in content.meshes {
        for index in 0..mesh.triangle_count() {
            if let Some(vertices) = mesh.triangle_points(index) {
                scene.primitives.push(Primitive::Polygon {
                    vertices,
                    fill: Style::translucent(MESH_FACE_COLOR, 0.2),
                    edge: Style::solid(EDGE_COLOR),
                    edge_width: 0.3,
                    label: None,
                });
            }
        }
    }

    if content.show_contours {
        for segment in &content.layer.contours {
            scene.primitives.push(Primitive::Segment3 {
                start: segment.start,
                end: segment.end,
                style: Style::solid(CONTOUR_COLOR),
                width: 2.0,
                dashed: false,
                label: Some("contour".to_string()),
            });
        }
    }

    if content.show_infill {
        for segment in &content.layer.infill {
            scene.primitives.push(Primitive::Segment3 {
                start: segment.start,
                end: segment.end,
                style: Style::solid(INFILL_COLOR),
                width: 1.0,
                dashed: true,
                label: Some("infill".to_string()),
            });
        }
    }

    if let Some((points, z)) = content.raw_points {
        // An empty raw set renders nothing, silently.
        for point in points {
            scene.primitives.push(Primitive::Marker {
                position: Point3::new(point.x, point.y, z),
                style: Style::translucent(RAW_POINT_COLOR, 0.8),
                radius: 2.0,
                label: Some("raw intersections".to_string()),
            });
        }
    }

    for highlight in content.highlights {
        let hit_count = highlight.hits.len();
        for (order, hit) in highlight.hits.iter().enumerate() {
            let Some(vertices) = highlight.mesh.triangle_points(hit.index) else {
                continue;
            };
            // Color is relative to this mesh's hit list, so identical
            // positions across meshes may collide in color.
            #[allow(clippy::cast_precision_loss)]
            let color = tab20(order as f64 / hit_count.max(1) as f64);
            scene.primitives.push(Primitive::Polygon {
                vertices,
                fill: Style::translucent(color, 0.5),
                edge: Style::solid(EDGE_COLOR),
                edge_width: 0.6,
                label: Some(format!("tri {}", hit.index)),
            });
        }
    }

    debug!(
        primitives = scene.primitives.len(),
        legend_entries = scene.legend().len(),
        "Assembled preview scene"
    );

    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use preview_types::{square_layer, unit_cube_mesh, ToolpathLayer};

    fn base_content<'a>(layer: &'a ToolpathLayer, meshes: &'a [TriangleMesh]) -> SceneContent<'a> {
        SceneContent {
            meshes,
            layer,
            show_contours: true,
            show_infill: true,
            raw_points: None,
            highlights: &[],
            title: "Layer 0 at z=0mm".to_string(),
        }
    }

    #[test]
    fn empty_inputs_yield_empty_scene() {
        let layer = ToolpathLayer::default();
        let scene = assemble(&base_content(&layer, &[]));
        assert!(scene.primitives.is_empty());
        assert!(scene.legend().is_empty());
    }

    #[test]
    fn legend_deduplicates_labels() {
        let layer = square_layer(0.5);
        let scene = assemble(&base_content(&layer, &[]));

        // 4 contour + 2 infill segments, but one legend entry each
        assert_eq!(scene.primitives.len(), 6);
        let legend = scene.legend();
        assert_eq!(legend.len(), 2);
        assert_eq!(legend[0].0, "contour");
        assert_eq!(legend[1].0, "infill");
    }

    #[test]
    fn mesh_faces_carry_no_label() {
        let layer = ToolpathLayer::default();
        let meshes = [unit_cube_mesh()];
        let scene = assemble(&base_content(&layer, &meshes));

        assert_eq!(scene.primitives.len(), 12);
        assert!(scene.legend().is_empty());
    }

    #[test]
    fn toggles_suppress_segments() {
        let layer = square_layer(0.5);
        let mut content = base_content(&layer, &[]);
        content.show_contours = false;
        content.show_infill = false;

        let scene = assemble(&content);
        assert!(scene.primitives.is_empty());
    }

    #[test]
    fn raw_points_projected_to_layer_z() {
        let layer = square_layer(1.0);
        let points = vec![Point3::new(0.5, 0.5, 99.0)];
        let mut content = base_content(&layer, &[]);
        content.show_contours = false;
        content.show_infill = false;
        content.raw_points = Some((&points, 1.0));

        let scene = assemble(&content);
        assert_eq!(scene.primitives.len(), 1);
        match &scene.primitives[0] {
            Primitive::Marker { position, .. } => {
                assert!((position.z - 1.0).abs() < f64::EPSILON);
            }
            other => panic!("expected marker, got {other:?}"),
        }
    }

    #[test]
    fn empty_raw_set_renders_nothing() {
        let layer = square_layer(1.0);
        let mut content = base_content(&layer, &[]);
        content.show_contours = false;
        content.show_infill = false;
        content.raw_points = Some((&[], 1.0));

        let scene = assemble(&content);
        assert!(scene.primitives.is_empty());
    }

    #[test]
    fn highlight_colors_follow_hit_order() {
        use crate::intersect::find_intersecting_default;
        use crate::palette::tab20;

        let mesh = unit_cube_mesh();
        let hits = find_intersecting_default(&mesh, 0.5);
        let layer = square_layer(0.5);
        let highlights = [MeshHighlights {
            mesh: &mesh,
            hits: &hits,
        }];
        let mut content = base_content(&layer, &[]);
        content.show_contours = false;
        content.show_infill = false;
        content.highlights = &highlights;

        let scene = assemble(&content);
        assert_eq!(scene.primitives.len(), hits.len());

        // First highlight takes the first palette bin
        match &scene.primitives[0] {
            Primitive::Polygon { fill, label, .. } => {
                assert_eq!(fill.color, tab20(0.0));
                assert_eq!(label.as_deref(), Some(format!("tri {}", hits[0].index).as_str()));
            }
            other => panic!("expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn legend_overwrite_keeps_insertion_order() {
        let mut scene = Scene::new(String::new());
        scene.primitives.push(Primitive::Marker {
            position: Point3::origin(),
            style: Style::solid([1, 2, 3]),
            radius: 1.0,
            label: Some("a".to_string()),
        });
        scene.primitives.push(Primitive::Marker {
            position: Point3::origin(),
            style: Style::solid([9, 9, 9]),
            radius: 1.0,
            label: Some("b".to_string()),
        });
        scene.primitives.push(Primitive::Marker {
            position: Point3::origin(),
            style: Style::solid([7, 7, 7]),
            radius: 1.0,
            label: Some("a".to_string()),
        });

        let legend = scene.legend();
        assert_eq!(legend.len(), 2);
        // "a" keeps its slot but takes the last writer's swatch
        assert_eq!(legend[0].0, "a");
        assert_eq!(legend[0].1.color, [7, 7, 7]);
        assert_eq!(legend[1].0, "b");
    }
}
