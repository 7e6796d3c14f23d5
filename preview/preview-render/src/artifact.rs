//! The rendered preview artifact.

/// A rendered layer preview: PNG bytes plus selection metadata.
#[derive(Debug, Clone)]
pub struct PreviewArtifact {
    /// Encoded PNG image.
    pub png: Vec<u8>,

    /// Total layer count reported by the planner.
    pub layer_count: usize,

    /// The layer index actually rendered, after clamping.
    pub selected_layer: usize,

    /// Z height of the rendered layer in mm.
    pub z_height: f64,
}
