//! Core data types for sliced-path layer previews.
//!
//! This crate provides the foundational types shared by the preview
//! pipeline:
//!
//! - [`TriangleMesh`] - An indexed triangle mesh as exposed by the planner
//! - [`IndexedTriangle`] - A face referencing mesh points by index
//! - [`ToolpathLayer`] - One planar slice of a path plan
//! - [`Segment`] - A single toolpath line segment
//!
//! # Units
//!
//! This library is **unit-agnostic**. All coordinates are `f64`.
//! Downstream crates assume millimeters.
//!
//! # Coordinate System
//!
//! Uses a **right-handed coordinate system**:
//! - X: width (left/right)
//! - Y: depth (front/back)
//! - Z: height (up/down, print direction)
//!
//! # Example
//!
//! ```
//! use preview_types::{IndexedTriangle, Point3, TriangleMesh};
//!
//! let mut mesh = TriangleMesh::new();
//! mesh.points.push(Point3::new(0.0, 0.0, 0.0));
//! mesh.points.push(Point3::new(1.0, 0.0, 0.0));
//! mesh.points.push(Point3::new(0.5, 1.0, 0.0));
//! mesh.triangles.push(IndexedTriangle::new(0, 1, 2));
//!
//! assert_eq!(mesh.triangle_count(), 1);
//! assert!(!mesh.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod layer;
mod mesh;

pub use layer::{square_layer, Segment, ToolpathLayer};
pub use mesh::{unit_cube_mesh, IndexedTriangle, TriangleMesh};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
