//! Indexed triangle mesh as exposed by the path planner.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A triangle referencing its owning mesh's point list by index.
///
/// The index order is fixed and defines the face's vertex order. The
/// indices are only meaningful together with the [`TriangleMesh`] that
/// produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexedTriangle {
    /// Indices into the owning mesh's point list.
    pub vertices: [u32; 3],
}

impl IndexedTriangle {
    /// Create a triangle from three point indices.
    #[inline]
    #[must_use]
    pub const fn new(a: u32, b: u32, c: u32) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }
}

/// An indexed triangle mesh.
///
/// This mirrors the mesh records the external planner exposes: an
/// ordered point list plus an ordered triangle list referencing those
/// points by index. The preview pipeline only ever reads it.
///
/// # Example
///
/// ```
/// use preview_types::{unit_cube_mesh, TriangleMesh};
///
/// let cube = unit_cube_mesh();
/// assert_eq!(cube.point_count(), 8);
/// assert_eq!(cube.triangle_count(), 12);
/// assert!(cube.is_index_valid());
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TriangleMesh {
    /// Point positions.
    pub points: Vec<Point3<f64>>,

    /// Triangles as indices into the point list.
    pub triangles: Vec<IndexedTriangle>,
}

impl TriangleMesh {
    /// Create a new empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            points: Vec::new(),
            triangles: Vec::new(),
        }
    }

    /// Create a mesh from points and triangles.
    #[inline]
    #[must_use]
    pub const fn from_parts(points: Vec<Point3<f64>>, triangles: Vec<IndexedTriangle>) -> Self {
        Self { points, triangles }
    }

    /// Number of points in the mesh.
    #[inline]
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Number of triangles in the mesh.
    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Check if the mesh has no triangles.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Resolve a triangle's vertex positions.
    ///
    /// Returns `None` if `index` is out of range or the triangle
    /// references a point outside the point list.
    #[must_use]
    pub fn triangle_points(&self, index: usize) -> Option<[Point3<f64>; 3]> {
        let tri = self.triangles.get(index)?;
        let a = self.points.get(tri.vertices[0] as usize)?;
        let b = self.points.get(tri.vertices[1] as usize)?;
        let c = self.points.get(tri.vertices[2] as usize)?;
        Some([*a, *b, *c])
    }

    /// Z range covered by a triangle's vertices.
    ///
    /// Returns `(min_z, max_z)`, or `None` for an invalid triangle.
    #[must_use]
    pub fn triangle_z_range(&self, index: usize) -> Option<(f64, f64)> {
        let [a, b, c] = self.triangle_points(index)?;
        Some((a.z.min(b.z).min(c.z), a.z.max(b.z).max(c.z)))
    }

    /// Check that every triangle references valid point indices.
    #[must_use]
    pub fn is_index_valid(&self) -> bool {
        let count = self.points.len();
        self.triangles
            .iter()
            .all(|tri| tri.vertices.iter().all(|&v| (v as usize) < count))
    }
}

/// Helper function to create a unit cube mesh.
///
/// Creates a cube from (0,0,0) to (1,1,1), two triangles per face.
/// Useful as a fixture for exercising the preview pipeline.
///
/// # Example
///
/// ```
/// use preview_types::unit_cube_mesh;
///
/// let cube = unit_cube_mesh();
/// assert_eq!(cube.triangle_count(), 12);
/// ```
#[must_use]
pub fn unit_cube_mesh() -> TriangleMesh {
    let points = vec![
        Point3::new(0.0, 0.0, 0.0), // 0
        Point3::new(1.0, 0.0, 0.0), // 1
        Point3::new(1.0, 1.0, 0.0), // 2
        Point3::new(0.0, 1.0, 0.0), // 3
        Point3::new(0.0, 0.0, 1.0), // 4
        Point3::new(1.0, 0.0, 1.0), // 5
        Point3::new(1.0, 1.0, 1.0), // 6
        Point3::new(0.0, 1.0, 1.0), // 7
    ];

    let triangles = vec![
        // Bottom (z=0)
        IndexedTriangle::new(0, 2, 1),
        IndexedTriangle::new(0, 3, 2),
        // Top (z=1)
        IndexedTriangle::new(4, 5, 6),
        IndexedTriangle::new(4, 6, 7),
        // Front (y=0)
        IndexedTriangle::new(0, 1, 5),
        IndexedTriangle::new(0, 5, 4),
        // Back (y=1)
        IndexedTriangle::new(3, 7, 6),
        IndexedTriangle::new(3, 6, 2),
        // Left (x=0)
        IndexedTriangle::new(0, 4, 7),
        IndexedTriangle::new(0, 7, 3),
        // Right (x=1)
        IndexedTriangle::new(1, 2, 6),
        IndexedTriangle::new(1, 6, 5),
    ];

    TriangleMesh::from_parts(points, triangles)
}
