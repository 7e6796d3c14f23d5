//! Layer intersection analysis.
//!
//! Determines which mesh triangles straddle a given Z height. The test
//! is a conservative bounding-interval check on the vertex Z range, not
//! an exact plane-triangle intersection; triangles whose Z range merely
//! covers the query height are included. Good enough for visualization,
//! not for planning correctness.

use preview_types::{IndexedTriangle, TriangleMesh};

/// Default tolerance for the intersection test, in mm.
pub const DEFAULT_INTERSECT_TOLERANCE: f64 = 1e-5;

/// A triangle whose vertex Z range covers a query height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriangleHit {
    /// The triangle's position in its mesh's triangle list.
    pub index: usize,
    /// The triangle itself.
    pub triangle: IndexedTriangle,
}

/// Find the triangles of `mesh` whose vertex Z range covers `z`.
///
/// A triangle is a hit iff
/// `min(vertex z) - tolerance <= z <= max(vertex z) + tolerance`.
/// Triangles with invalid point indices are skipped.
///
/// Hits are returned in ascending triangle-index order, duplicate-free
/// and deterministic for repeated calls. An empty result is not an
/// error.
///
/// # Example
///
/// ```
/// use preview_scene::find_intersecting;
/// use preview_types::unit_cube_mesh;
///
/// let cube = unit_cube_mesh();
/// // Mid-height cuts only the 8 side triangles
/// assert_eq!(find_intersecting(&cube, 0.5, 1e-5).len(), 8);
/// // Everything straddles the bottom plane except the top face
/// assert_eq!(find_intersecting(&cube, 0.0, 1e-5).len(), 10);
/// ```
#[must_use]
pub fn find_intersecting(mesh: &TriangleMesh, z: f64, tolerance: f64) -> Vec<TriangleHit> {
    let mut hits = Vec::new();

    for (index, triangle) in mesh.triangles.iter().enumerate() {
        let Some((min_z, max_z)) = mesh.triangle_z_range(index) else {
            continue;
        };
        if min_z - tolerance <= z && z <= max_z + tolerance {
            hits.push(TriangleHit {
                index,
                triangle: *triangle,
            });
        }
    }

    hits
}

/// [`find_intersecting`] with the default tolerance.
#[inline]
#[must_use]
pub fn find_intersecting_default(mesh: &TriangleMesh, z: f64) -> Vec<TriangleHit> {
    find_intersecting(mesh, z, DEFAULT_INTERSECT_TOLERANCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use preview_types::{unit_cube_mesh, IndexedTriangle, Point3};

    #[test]
    fn hits_inside_range() {
        let cube = unit_cube_mesh();

        // Any z within [0, 1] hits at least the side faces
        for z in [0.0, 0.25, 0.5, 0.75, 1.0] {
            assert!(
                !find_intersecting_default(&cube, z).is_empty(),
                "expected hits at z={z}"
            );
        }
    }

    #[test]
    fn excludes_outside_range() {
        let cube = unit_cube_mesh();
        assert!(find_intersecting_default(&cube, -0.5).is_empty());
        assert!(find_intersecting_default(&cube, 1.5).is_empty());
    }

    #[test]
    fn tolerance_is_inclusive() {
        let cube = unit_cube_mesh();
        let tol = 1e-3;

        // Just outside the range but within tolerance
        assert!(!find_intersecting(&cube, 1.0 + 0.5e-3, tol).is_empty());
        // Outside range by more than tolerance
        assert!(find_intersecting(&cube, 1.0 + 2e-3, tol).is_empty());
    }

    #[test]
    fn hits_sorted_and_unique() {
        let cube = unit_cube_mesh();
        let hits = find_intersecting_default(&cube, 0.5);

        for pair in hits.windows(2) {
            assert!(pair[0].index < pair[1].index);
        }
    }

    #[test]
    fn empty_mesh_yields_no_hits() {
        let mesh = TriangleMesh::new();
        assert!(find_intersecting_default(&mesh, 0.0).is_empty());
    }

    #[test]
    fn invalid_triangle_is_skipped() {
        let mut mesh = TriangleMesh::new();
        mesh.points.push(Point3::new(0.0, 0.0, 0.0));
        mesh.points.push(Point3::new(1.0, 0.0, 0.0));
        mesh.points.push(Point3::new(0.0, 1.0, 0.0));
        mesh.triangles.push(IndexedTriangle::new(0, 1, 2));
        mesh.triangles.push(IndexedTriangle::new(0, 1, 9)); // dangling index

        let hits = find_intersecting_default(&mesh, 0.0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].index, 0);
    }
}
