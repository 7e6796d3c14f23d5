//! Scene assembly and rasterization for sliced-path layer previews.
//!
//! This crate turns one layer of a path plan into a portable PNG image:
//!
//! - **Intersection analysis**: Find mesh triangles whose Z range covers
//!   a layer height ([`find_intersecting`])
//! - **Scene assembly**: Compose mesh faces, toolpath segments, raw
//!   intersection markers, and highlighted triangles into a [`Scene`]
//! - **Rasterization**: Project the scene through a fixed orthographic
//!   camera and paint it into an RGBA framebuffer
//! - **Serialization**: Encode the framebuffer as PNG bytes
//!
//! # Example
//!
//! ```
//! use preview_scene::{assemble, RasterParams, SceneContent};
//! use preview_types::{square_layer, unit_cube_mesh};
//!
//! let meshes = [unit_cube_mesh()];
//! let layer = square_layer(0.5);
//! let scene = assemble(&SceneContent {
//!     meshes: &meshes,
//!     layer: &layer,
//!     show_contours: true,
//!     show_infill: true,
//!     raw_points: None,
//!     highlights: &[],
//!     title: "Layer 0 at z=0.5mm".to_string(),
//! });
//!
//! let png = scene.encode_png(&RasterParams::default()).unwrap();
//! assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod camera;
mod error;
mod intersect;
mod palette;
mod raster;
mod scene;
mod text;

pub use camera::{Camera, Projected, DEFAULT_AZIMUTH_DEG, DEFAULT_ELEVATION_DEG};
pub use error::{SceneError, SceneResult};
pub use intersect::{
    find_intersecting, find_intersecting_default, TriangleHit, DEFAULT_INTERSECT_TOLERANCE,
};
pub use palette::{tab20, TAB20};
pub use raster::RasterParams;
pub use scene::{assemble, MeshHighlights, Primitive, Scene, SceneContent, Style};
