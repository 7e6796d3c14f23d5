//! The external planning-engine contract.
//!
//! The slicing engine is consumed, never reimplemented: everything the
//! preview pipeline needs from it fits in the two traits below. The
//! native engine implements them over a shared library (see
//! [`crate::engine`]); tests substitute [`crate::fixture`] doubles.

use std::path::Path;

use preview_types::{Point3, ToolpathLayer, TriangleMesh};

use crate::error::PreviewResult;

/// One planning session, bound to a single CAD file.
///
/// Sessions are request-scoped: each render invocation opens its own
/// session, performs all computation, and drops it. No state is shared
/// between sessions.
pub trait PlannerSession: std::fmt::Debug {
    /// Bind the session to a CAD file by path.
    ///
    /// # Errors
    ///
    /// Returns a planning failure if the engine rejects the file.
    fn set_cad(&mut self, cad_file: &Path) -> PreviewResult<()>;

    /// Slice the bound CAD planar with the given layer height (mm) and
    /// grid infill spacing.
    ///
    /// # Errors
    ///
    /// Returns a planning failure if the engine reports one.
    fn slice_planar(&mut self, layer_height_mm: u32, infill_spacing: f64) -> PreviewResult<()>;

    /// Number of layers produced by the last slicing pass.
    fn layer_count(&self) -> usize;

    /// Fetch a layer by index, or `None` if out of range.
    fn layer(&self, index: usize) -> Option<ToolpathLayer>;

    /// Raw slice-plane intersection points, one entry per slicing
    /// pass. The entry index is derived from Z over layer height and
    /// is *not* guaranteed to equal a layer index.
    fn raw_layers(&self) -> Vec<Vec<Point3<f64>>>;

    /// The meshes loaded from the bound CAD file.
    fn meshes(&self) -> Vec<TriangleMesh>;
}

/// A resolved planning engine, able to open sessions.
///
/// This is the injected capability the delivery adapters hold. It is
/// shared immutably across invocations; every invocation opens a fresh
/// session so concurrent calls stay independent.
pub trait PlannerBinding: Send + Sync {
    /// Open a new planning session.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PreviewError::EngineUnavailable`] if the
    /// engine cannot construct a planner.
    fn open_session(&self) -> PreviewResult<Box<dyn PlannerSession>>;
}
