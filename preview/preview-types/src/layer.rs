//! Toolpath layer types.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single toolpath line segment.
///
/// Segments are self-contained start/end pairs; they never reference
/// mesh points by index.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Segment {
    /// Segment start point.
    pub start: Point3<f64>,
    /// Segment end point.
    pub end: Point3<f64>,
}

impl Segment {
    /// Create a segment from two points.
    #[inline]
    #[must_use]
    pub const fn new(start: Point3<f64>, end: Point3<f64>) -> Self {
        Self { start, end }
    }

    /// Euclidean length of the segment.
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }
}

/// A single planar slice of a path plan.
///
/// Produced by the external planner for a given layer height and infill
/// spacing; consumed read-only by the preview pipeline. The Z height is
/// invariant once produced.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ToolpathLayer {
    /// Z height of this layer in mm.
    pub z: f64,

    /// Perimeter toolpath segments.
    pub contours: Vec<Segment>,

    /// Interior fill toolpath segments.
    pub infill: Vec<Segment>,
}

impl ToolpathLayer {
    /// Check if the layer carries no toolpath segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty() && self.infill.is_empty()
    }

    /// Total number of segments across contours and infill.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.contours.len() + self.infill.len()
    }
}

/// Helper function to create a canned square layer at the given height.
///
/// The layer traces a unit square perimeter with two horizontal infill
/// passes. Useful as a fixture for exercising the preview pipeline.
///
/// # Example
///
/// ```
/// use preview_types::square_layer;
///
/// let layer = square_layer(0.5);
/// assert_eq!(layer.contours.len(), 4);
/// assert_eq!(layer.infill.len(), 2);
/// ```
#[must_use]
pub fn square_layer(z: f64) -> ToolpathLayer {
    let corners = [
        Point3::new(0.0, 0.0, z),
        Point3::new(1.0, 0.0, z),
        Point3::new(1.0, 1.0, z),
        Point3::new(0.0, 1.0, z),
    ];

    let contours = vec![
        Segment::new(corners[0], corners[1]),
        Segment::new(corners[1], corners[2]),
        Segment::new(corners[2], corners[3]),
        Segment::new(corners[3], corners[0]),
    ];

    let infill = vec![
        Segment::new(Point3::new(0.0, 0.33, z), Point3::new(1.0, 0.33, z)),
        Segment::new(Point3::new(1.0, 0.66, z), Point3::new(0.0, 0.66, z)),
    ];

    ToolpathLayer {
        z,
        contours,
        infill,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn segment_length() {
        let seg = Segment::new(Point3::new(0.0, 0.0, 0.0), Point3::new(3.0, 4.0, 0.0));
        assert_relative_eq!(seg.length(), 5.0);
    }

    #[test]
    fn empty_layer() {
        let layer = ToolpathLayer::default();
        assert!(layer.is_empty());
        assert_eq!(layer.segment_count(), 0);
    }

    #[test]
    fn square_layer_fixture() {
        let layer = square_layer(2.0);
        assert!(!layer.is_empty());
        assert_eq!(layer.segment_count(), 6);
        assert_relative_eq!(layer.z, 2.0);

        // All segments lie in the layer plane
        for seg in layer.contours.iter().chain(&layer.infill) {
            assert_relative_eq!(seg.start.z, 2.0);
            assert_relative_eq!(seg.end.z, 2.0);
        }
    }
}
