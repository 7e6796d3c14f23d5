//! Render orchestration for sliced-path layer previews.
//!
//! Drives a planning-engine session end to end: bind a CAD file, slice
//! it, select and clamp the requested layer, align the raw
//! intersection data, assemble a scene, and serialize it to a PNG
//! artifact.
//!
//! The planning engine itself is an external collaborator reached
//! through the [`PlannerBinding`]/[`PlannerSession`] contract. The
//! native engine is resolved late via [`engine::load_engine`], so the
//! whole pipeline can run (and be tested) against
//! [`fixture::FixtureBinding`] without any native dependency.
//!
//! # Example
//!
//! ```
//! use preview_render::fixture::FixtureBinding;
//! use preview_render::{render_preview, RenderOptions};
//!
//! let binding = FixtureBinding::cube();
//! let artifact = render_preview(
//!     &binding,
//!     std::path::Path::new("model.stl"),
//!     &RenderOptions::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(artifact.selected_layer, 0);
//! assert!(artifact.layer_count >= 1);
//! assert_eq!(&artifact.png[..4], &[0x89, b'P', b'N', b'G']);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod artifact;
pub mod engine;
mod error;
pub mod fixture;
mod options;
mod pipeline;
mod planner;

pub use artifact::PreviewArtifact;
pub use error::{PreviewError, PreviewResult};
pub use options::RenderOptions;
pub use pipeline::{plan_layer, render_preview, render_selection, LayerSelection};
pub use planner::{PlannerBinding, PlannerSession};

// Re-export the analyzer for adapters that print diagnostics
pub use preview_scene::{find_intersecting, find_intersecting_default, TriangleHit};
