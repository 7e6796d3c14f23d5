//! Canned planner doubles.
//!
//! [`FixtureBinding`] satisfies the planner contract with precomputed
//! data, so the rendering pipeline and the delivery adapters can be
//! exercised without the native engine. The canned layers are fixture
//! data, not a slicer: slicing parameters are accepted and ignored.

use std::path::Path;

use preview_types::{square_layer, unit_cube_mesh, Point3, ToolpathLayer, TriangleMesh};

use crate::error::PreviewResult;
use crate::planner::{PlannerBinding, PlannerSession};

/// A planner binding backed by canned data.
#[derive(Debug, Clone, Default)]
pub struct FixtureBinding {
    /// Layers returned in index order.
    pub layers: Vec<ToolpathLayer>,
    /// Raw intersection points per slicing pass.
    pub raw_layers: Vec<Vec<Point3<f64>>>,
    /// Meshes reported for the bound CAD file.
    pub meshes: Vec<TriangleMesh>,
}

impl FixtureBinding {
    /// A four-layer plan over the unit cube.
    ///
    /// Layers sit at z = 0, 1, 2, 3 mm with square toolpaths; each
    /// slicing pass contributes its four corner points as raw data.
    #[must_use]
    pub fn cube() -> Self {
        let layers: Vec<ToolpathLayer> = (0..4).map(|i| square_layer(f64::from(i))).collect();
        let raw_layers = layers
            .iter()
            .map(|layer| {
                vec![
                    Point3::new(0.0, 0.0, layer.z),
                    Point3::new(1.0, 0.0, layer.z),
                    Point3::new(1.0, 1.0, layer.z),
                    Point3::new(0.0, 1.0, layer.z),
                ]
            })
            .collect();

        Self {
            layers,
            raw_layers,
            meshes: vec![unit_cube_mesh()],
        }
    }

    /// A binding whose slicing pass produces no layers at all.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

impl PlannerBinding for FixtureBinding {
    fn open_session(&self) -> PreviewResult<Box<dyn PlannerSession>> {
        Ok(Box::new(FixtureSession {
            data: self.clone(),
        }))
    }
}

#[derive(Debug)]
struct FixtureSession {
    data: FixtureBinding,
}

impl PlannerSession for FixtureSession {
    fn set_cad(&mut self, _cad_file: &Path) -> PreviewResult<()> {
        Ok(())
    }

    fn slice_planar(&mut self, _layer_height_mm: u32, _infill_spacing: f64) -> PreviewResult<()> {
        Ok(())
    }

    fn layer_count(&self) -> usize {
        self.data.layers.len()
    }

    fn layer(&self, index: usize) -> Option<ToolpathLayer> {
        self.data.layers.get(index).cloned()
    }

    fn raw_layers(&self) -> Vec<Vec<Point3<f64>>> {
        self.data.raw_layers.clone()
    }

    fn meshes(&self) -> Vec<TriangleMesh> {
        self.data.meshes.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn cube_fixture_shape() {
        let binding = FixtureBinding::cube();
        let session = binding.open_session().unwrap();

        assert_eq!(session.layer_count(), 4);
        assert_eq!(session.raw_layers().len(), 4);
        assert_eq!(session.meshes().len(), 1);
        assert!(session.layer(3).is_some());
        assert!(session.layer(4).is_none());
    }

    #[test]
    fn empty_fixture_has_no_layers() {
        let binding = FixtureBinding::empty();
        let session = binding.open_session().unwrap();
        assert_eq!(session.layer_count(), 0);
    }
}
