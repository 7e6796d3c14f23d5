//! The render pipeline.
//!
//! Orchestrates one preview render: open a planner session, slice,
//! select the layer, align raw intersection data, assemble the scene,
//! and serialize it to PNG.

use std::path::Path;

use preview_scene::{
    assemble, find_intersecting_default, MeshHighlights, RasterParams, SceneContent, TriangleHit,
};
use preview_types::{Point3, ToolpathLayer, TriangleMesh};
use tracing::{debug, info};

use crate::artifact::PreviewArtifact;
use crate::error::{PreviewError, PreviewResult};
use crate::options::RenderOptions;
use crate::planner::PlannerBinding;

/// The data gathered for one selected layer.
///
/// Produced by [`plan_layer`]; consumed by [`render_selection`] and by
/// adapters that print diagnostics about the selection.
#[derive(Debug, Clone)]
pub struct LayerSelection {
    /// The selected toolpath layer.
    pub layer: ToolpathLayer,
    /// Meshes loaded from the CAD file.
    pub meshes: Vec<TriangleMesh>,
    /// Raw intersection points aligned to the selected layer. Empty
    /// when the layer has no matching slicing pass.
    pub raw_points: Vec<Point3<f64>>,
    /// Total layer count reported by the planner.
    pub layer_count: usize,
    /// The clamped layer index actually selected.
    pub selected_layer: usize,
}

/// Run a planning session and gather the data for the requested layer.
///
/// The requested layer index is clamped into `[0, layer_count - 1]`;
/// out-of-range requests are redirected to the nearest valid layer
/// rather than rejected. The raw intersection list is aligned by
/// `round(z / max(1, layer_height))`; a missing entry yields an empty
/// point set, not an error.
///
/// # Errors
///
/// - [`PreviewError::InvalidParameter`] for out-of-domain options
/// - [`PreviewError::PlanningFailure`] if slicing yields zero layers
/// - whatever the planner session reports for `set_cad`/`slice_planar`
pub fn plan_layer(
    binding: &dyn PlannerBinding,
    cad_file: &Path,
    options: &RenderOptions,
) -> PreviewResult<LayerSelection> {
    options.validate()?;

    let mut session = binding.open_session()?;
    session.set_cad(cad_file)?;
    session.slice_planar(options.layer_height, options.infill_spacing)?;

    let layer_count = session.layer_count();
    if layer_count == 0 {
        return Err(PreviewError::no_layers());
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let selected_layer = options.layer.clamp(0, layer_count as i64 - 1) as usize;
    let layer = session
        .layer(selected_layer)
        .ok_or_else(PreviewError::no_layers)?;

    // The raw list is indexed by slicing pass (z over layer height),
    // which need not match the layer index; align rather than assume.
    let mut raw_layers = session.raw_layers();
    let raw_index = (layer.z / f64::from(options.layer_height.max(1))).round();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let raw_points = if raw_index >= 0.0 && (raw_index as usize) < raw_layers.len() {
        std::mem::take(&mut raw_layers[raw_index as usize])
    } else {
        Vec::new()
    };

    let meshes = session.meshes();

    info!(
        layer_count,
        selected_layer,
        z = layer.z,
        raw_points = raw_points.len(),
        meshes = meshes.len(),
        "Planned layer selection"
    );

    Ok(LayerSelection {
        layer,
        meshes,
        raw_points,
        layer_count,
        selected_layer,
    })
}

/// Render a gathered layer selection to a PNG artifact.
///
/// # Errors
///
/// Returns [`PreviewError::Render`] if PNG encoding fails.
pub fn render_selection(
    selection: &LayerSelection,
    options: &RenderOptions,
) -> PreviewResult<PreviewArtifact> {
    let hits: Vec<Vec<TriangleHit>> = if options.color_intersecting {
        selection
            .meshes
            .iter()
            .map(|mesh| find_intersecting_default(mesh, selection.layer.z))
            .collect()
    } else {
        Vec::new()
    };

    let highlights: Vec<MeshHighlights<'_>> = selection
        .meshes
        .iter()
        .zip(&hits)
        .map(|(mesh, hits)| MeshHighlights { mesh, hits })
        .collect();

    let content = SceneContent {
        meshes: if options.show_mesh {
            &selection.meshes
        } else {
            &[]
        },
        layer: &selection.layer,
        show_contours: options.show_contours,
        show_infill: options.show_infill,
        raw_points: if options.show_raw_intersections {
            Some((selection.raw_points.as_slice(), selection.layer.z))
        } else {
            None
        },
        highlights: &highlights,
        title: format!(
            "Layer {} at z={}mm",
            selection.selected_layer, selection.layer.z
        ),
    };

    let scene = assemble(&content);
    let png = scene.encode_png(&RasterParams::default())?;

    debug!(bytes = png.len(), "Encoded preview PNG");

    Ok(PreviewArtifact {
        png,
        layer_count: selection.layer_count,
        selected_layer: selection.selected_layer,
        z_height: selection.layer.z,
    })
}

/// Render one layer preview end to end.
///
/// Equivalent to [`plan_layer`] followed by [`render_selection`].
///
/// # Errors
///
/// See [`plan_layer`] and [`render_selection`].
pub fn render_preview(
    binding: &dyn PlannerBinding,
    cad_file: &Path,
    options: &RenderOptions,
) -> PreviewResult<PreviewArtifact> {
    let selection = plan_layer(binding, cad_file, options)?;
    render_selection(&selection, options)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fixture::FixtureBinding;
    use preview_types::square_layer;
    use std::path::Path;

    fn cad() -> &'static Path {
        Path::new("model.stl")
    }

    #[test]
    fn clamps_negative_layer_to_zero() {
        let binding = FixtureBinding::cube();
        let options = RenderOptions {
            layer: -5,
            ..RenderOptions::default()
        };

        let selection = plan_layer(&binding, cad(), &options).unwrap();
        assert_eq!(selection.selected_layer, 0);
    }

    #[test]
    fn clamps_overrange_layer_to_last() {
        let binding = FixtureBinding::cube();
        let options = RenderOptions {
            layer: 10_000,
            ..RenderOptions::default()
        };

        let selection = plan_layer(&binding, cad(), &options).unwrap();
        assert_eq!(selection.selected_layer, 3);
        assert_eq!(selection.layer_count, 4);
    }

    #[test]
    fn zero_layers_is_planning_failure() {
        let binding = FixtureBinding::empty();
        for color in [false, true] {
            let options = RenderOptions {
                color_intersecting: color,
                ..RenderOptions::default()
            };
            let err = render_preview(&binding, cad(), &options).unwrap_err();
            assert!(matches!(err, PreviewError::PlanningFailure(_)));
        }
    }

    #[test]
    fn raw_alignment_uses_z_over_layer_height() {
        // Layer at z=6 with layerHeight=2 maps to raw index 3.
        let mut binding = FixtureBinding::cube();
        binding.layers = vec![square_layer(6.0)];
        binding.raw_layers = vec![
            vec![],
            vec![],
            vec![],
            vec![preview_types::Point3::new(0.5, 0.5, 6.0)],
        ];

        let options = RenderOptions {
            layer_height: 2,
            ..RenderOptions::default()
        };
        let selection = plan_layer(&binding, cad(), &options).unwrap();
        assert_eq!(selection.raw_points.len(), 1);
    }

    #[test]
    fn missing_raw_entry_yields_empty_set() {
        // Raw index 3, but only 2 raw entries: no points, no error.
        let mut binding = FixtureBinding::cube();
        binding.layers = vec![square_layer(6.0)];
        binding.raw_layers = vec![
            vec![preview_types::Point3::new(0.0, 0.0, 0.0)],
            vec![preview_types::Point3::new(0.0, 0.0, 2.0)],
        ];

        let options = RenderOptions {
            layer_height: 2,
            show_raw_intersections: true,
            ..RenderOptions::default()
        };
        let selection = plan_layer(&binding, cad(), &options).unwrap();
        assert!(selection.raw_points.is_empty());

        // And the render still succeeds
        render_selection(&selection, &options).unwrap();
    }

    #[test]
    fn all_toggles_off_still_renders() {
        let binding = FixtureBinding::cube();
        let options = RenderOptions {
            show_mesh: false,
            show_contours: false,
            show_infill: false,
            show_raw_intersections: false,
            color_intersecting: false,
            ..RenderOptions::default()
        };

        let artifact = render_preview(&binding, cad(), &options).unwrap();
        assert_eq!(&artifact.png[..4], &[0x89, b'P', b'N', b'G']);
        assert_eq!(artifact.selected_layer, 0);
    }

    #[test]
    fn artifact_metadata_matches_selection() {
        let binding = FixtureBinding::cube();
        let options = RenderOptions {
            layer: 2,
            color_intersecting: true,
            show_raw_intersections: true,
            ..RenderOptions::default()
        };

        let artifact = render_preview(&binding, cad(), &options).unwrap();
        assert_eq!(artifact.layer_count, 4);
        assert_eq!(artifact.selected_layer, 2);
        assert!((artifact.z_height - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_options_are_rejected_before_planning() {
        let binding = FixtureBinding::cube();
        let options = RenderOptions {
            layer_height: 0,
            ..RenderOptions::default()
        };

        let err = render_preview(&binding, cad(), &options).unwrap_err();
        assert!(matches!(err, PreviewError::InvalidParameter(_)));
    }
}
