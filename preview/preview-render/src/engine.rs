//! Late-loaded native planner engine.
//!
//! The planning engine ships as a shared library built from the
//! printer firmware tree. It is resolved at call time so the rendering
//! core never links against it; when the library is absent, every
//! operation fails with [`PreviewError::EngineUnavailable`] and the
//! rest of the crate keeps working (tests use [`crate::fixture`]).
//!
//! # C ABI
//!
//! The library exposes a flat-buffer surface over the planner:
//!
//! ```text
//! pp_planner_new() -> ctx            pp_planner_free(ctx)
//! pp_set_cad(ctx, path) -> rc        pp_slice_planar(ctx, h, s) -> rc
//! pp_layer_count(ctx) -> n           pp_layer_z(ctx, i) -> z
//! pp_layer_segments(ctx, i, kind, &len) -> *f64   (6 per segment)
//! pp_raw_layer_count(ctx) -> n
//! pp_raw_layer_points(ctx, i, &len) -> *f64       (3 per point)
//! pp_mesh_count(ctx) -> n
//! pp_mesh_points(ctx, i, &len) -> *f64            (3 per point)
//! pp_mesh_triangles(ctx, i, &len) -> *u32         (3 per triangle)
//! ```
//!
//! Returned buffers stay valid until the next call on the same
//! context; everything is copied out immediately.

use std::ffi::{c_char, c_int, c_void, CString};
use std::path::Path;
use std::sync::Arc;

use libloading::{Library, Symbol};
use preview_types::{IndexedTriangle, Point3, Segment, ToolpathLayer, TriangleMesh};
use tracing::{debug, info};

use crate::error::{PreviewError, PreviewResult};
use crate::planner::{PlannerBinding, PlannerSession};

/// Segment kind selector for `pp_layer_segments`.
const SEGMENT_KIND_CONTOUR: c_int = 0;
const SEGMENT_KIND_INFILL: c_int = 1;

/// The platform-specific default library name (`libpathplan.so`,
/// `pathplan.dll`, ...).
#[must_use]
pub fn default_engine_library() -> std::ffi::OsString {
    libloading::library_filename("pathplan")
}

/// Load the native planner engine.
///
/// With `path = None` the platform default library name is resolved
/// through the normal dynamic-linker search path.
///
/// # Errors
///
/// Returns [`PreviewError::EngineUnavailable`] if the library cannot
/// be opened.
pub fn load_engine(path: Option<&Path>) -> PreviewResult<NativeBinding> {
    let name = path.map_or_else(default_engine_library, |p| p.as_os_str().to_os_string());

    // SAFETY: opening the library runs its initializers; the planner
    // library is trusted build output of this project.
    let library = unsafe { Library::new(&name) }
        .map_err(|e| PreviewError::EngineUnavailable(format!("{}: {e}", name.to_string_lossy())))?;

    info!(library = %name.to_string_lossy(), "Loaded planner engine");

    Ok(NativeBinding {
        library: Arc::new(library),
    })
}

/// A loaded native planner engine.
pub struct NativeBinding {
    library: Arc<Library>,
}

impl std::fmt::Debug for NativeBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeBinding").finish_non_exhaustive()
    }
}

impl PlannerBinding for NativeBinding {
    fn open_session(&self) -> PreviewResult<Box<dyn PlannerSession>> {
        // SAFETY: symbol signature matches the documented ABI.
        let create: Symbol<'_, unsafe extern "C" fn() -> *mut c_void> =
            unsafe { self.library.get(b"pp_planner_new\0") }.map_err(|e| {
                PreviewError::EngineUnavailable(format!("missing symbol pp_planner_new: {e}"))
            })?;
        // SAFETY: as above.
        let ctx = unsafe { create() };
        if ctx.is_null() {
            return Err(PreviewError::EngineUnavailable(
                "planner construction failed".to_string(),
            ));
        }

        debug!("Opened native planner session");
        Ok(Box::new(NativeSession {
            library: Arc::clone(&self.library),
            ctx,
        }))
    }
}

/// A binding that resolves the planner library anew for every
/// session.
///
/// Long-running hosts hold this instead of a [`NativeBinding`] so a
/// missing library surfaces as [`PreviewError::EngineUnavailable`] on
/// each request rather than failing the process at startup.
#[derive(Debug, Clone, Default)]
pub struct LazyNativeBinding {
    path: Option<std::path::PathBuf>,
}

impl LazyNativeBinding {
    /// Defer loading of the library at `path` (or the platform
    /// default when `None`).
    #[must_use]
    pub fn new(path: Option<std::path::PathBuf>) -> Self {
        Self { path }
    }
}

impl PlannerBinding for LazyNativeBinding {
    fn open_session(&self) -> PreviewResult<Box<dyn PlannerSession>> {
        load_engine(self.path.as_deref())?.open_session()
    }
}

#[derive(Debug)]
struct NativeSession {
    library: Arc<Library>,
    ctx: *mut c_void,
}

impl NativeSession {
    fn symbol<T>(&self, name: &[u8]) -> PreviewResult<Symbol<'_, T>> {
        // SAFETY: every lookup site pairs the name with the fn type
        // from the documented ABI.
        unsafe { self.library.get(name) }.map_err(|e| {
            PreviewError::EngineUnavailable(format!(
                "missing symbol {}: {e}",
                String::from_utf8_lossy(&name[..name.len().saturating_sub(1)])
            ))
        })
    }

    /// Copy a returned f64 buffer of `len * stride` values.
    fn copy_f64(ptr: *const f64, len: usize, stride: usize) -> Vec<f64> {
        if ptr.is_null() || len == 0 {
            return Vec::new();
        }
        // SAFETY: the ABI guarantees `len * stride` readable values
        // until the next call on this context.
        unsafe { std::slice::from_raw_parts(ptr, len * stride) }.to_vec()
    }

    fn layer_segments(&self, index: c_int, kind: c_int) -> PreviewResult<Vec<Segment>> {
        let fetch: Symbol<
            '_,
            unsafe extern "C" fn(*mut c_void, c_int, c_int, *mut usize) -> *const f64,
        > = self.symbol(b"pp_layer_segments\0")?;

        let mut len: usize = 0;
        // SAFETY: ctx is a live planner context; see module ABI notes.
        let ptr = unsafe { fetch(self.ctx, index, kind, &mut len) };
        let values = Self::copy_f64(ptr, len, 6);

        Ok(values
            .chunks_exact(6)
            .map(|c| {
                Segment::new(
                    Point3::new(c[0], c[1], c[2]),
                    Point3::new(c[3], c[4], c[5]),
                )
            })
            .collect())
    }
}

impl PlannerSession for NativeSession {
    fn set_cad(&mut self, cad_file: &Path) -> PreviewResult<()> {
        let set_cad: Symbol<'_, unsafe extern "C" fn(*mut c_void, *const c_char) -> c_int> =
            self.symbol(b"pp_set_cad\0")?;

        let path = cad_file.to_str().ok_or_else(|| {
            PreviewError::InvalidParameter(format!("non-UTF-8 path: {}", cad_file.display()))
        })?;
        let path = CString::new(path).map_err(|_| {
            PreviewError::InvalidParameter(format!("path contains NUL: {}", cad_file.display()))
        })?;

        // SAFETY: ctx is live and the string outlives the call.
        let rc = unsafe { set_cad(self.ctx, path.as_ptr()) };
        if rc == 0 {
            Ok(())
        } else {
            Err(PreviewError::PlanningFailure(format!(
                "planner rejected CAD file {} (rc {rc})",
                cad_file.display()
            )))
        }
    }

    fn slice_planar(&mut self, layer_height_mm: u32, infill_spacing: f64) -> PreviewResult<()> {
        let slice: Symbol<'_, unsafe extern "C" fn(*mut c_void, c_int, f64) -> c_int> =
            self.symbol(b"pp_slice_planar\0")?;

        let height = c_int::try_from(layer_height_mm).map_err(|_| {
            PreviewError::InvalidParameter(format!("layer height out of range: {layer_height_mm}"))
        })?;

        // SAFETY: ctx is live; see module ABI notes.
        let rc = unsafe { slice(self.ctx, height, infill_spacing) };
        if rc == 0 {
            Ok(())
        } else {
            Err(PreviewError::PlanningFailure(format!(
                "planar slicing failed (rc {rc})"
            )))
        }
    }

    fn layer_count(&self) -> usize {
        let Ok(count) = self.symbol::<unsafe extern "C" fn(*mut c_void) -> c_int>(
            b"pp_layer_count\0",
        ) else {
            return 0;
        };
        // SAFETY: ctx is live; see module ABI notes.
        usize::try_from(unsafe { count(self.ctx) }).unwrap_or(0)
    }

    fn layer(&self, index: usize) -> Option<ToolpathLayer> {
        if index >= self.layer_count() {
            return None;
        }
        let index = c_int::try_from(index).ok()?;

        let layer_z = self
            .symbol::<unsafe extern "C" fn(*mut c_void, c_int) -> f64>(b"pp_layer_z\0")
            .ok()?;
        // SAFETY: ctx is live and index is in range.
        let z = unsafe { layer_z(self.ctx, index) };

        let contours = self.layer_segments(index, SEGMENT_KIND_CONTOUR).ok()?;
        let infill = self.layer_segments(index, SEGMENT_KIND_INFILL).ok()?;

        Some(ToolpathLayer {
            z,
            contours,
            infill,
        })
    }

    fn raw_layers(&self) -> Vec<Vec<Point3<f64>>> {
        let Ok(count) = self.symbol::<unsafe extern "C" fn(*mut c_void) -> c_int>(
            b"pp_raw_layer_count\0",
        ) else {
            return Vec::new();
        };
        let Ok(points) = self.symbol::<unsafe extern "C" fn(
            *mut c_void,
            c_int,
            *mut usize,
        ) -> *const f64>(b"pp_raw_layer_points\0") else {
            return Vec::new();
        };

        // SAFETY: ctx is live; indices stay below the reported count.
        let total = unsafe { count(self.ctx) }.max(0);
        (0..total)
            .map(|i| {
                let mut len: usize = 0;
                // SAFETY: as above.
                let ptr = unsafe { points(self.ctx, i, &mut len) };
                Self::copy_f64(ptr, len, 3)
                    .chunks_exact(3)
                    .map(|c| Point3::new(c[0], c[1], c[2]))
                    .collect()
            })
            .collect()
    }

    fn meshes(&self) -> Vec<TriangleMesh> {
        let Ok(count) = self.symbol::<unsafe extern "C" fn(*mut c_void) -> c_int>(
            b"pp_mesh_count\0",
        ) else {
            return Vec::new();
        };
        let Ok(mesh_points) = self.symbol::<unsafe extern "C" fn(
            *mut c_void,
            c_int,
            *mut usize,
        ) -> *const f64>(b"pp_mesh_points\0") else {
            return Vec::new();
        };
        let Ok(mesh_triangles) = self.symbol::<unsafe extern "C" fn(
            *mut c_void,
            c_int,
            *mut usize,
        ) -> *const u32>(b"pp_mesh_triangles\0") else {
            return Vec::new();
        };

        // SAFETY: ctx is live; indices stay below the reported count.
        let total = unsafe { count(self.ctx) }.max(0);
        (0..total)
            .map(|i| {
                let mut point_len: usize = 0;
                // SAFETY: as above.
                let point_ptr = unsafe { mesh_points(self.ctx, i, &mut point_len) };
                let points = Self::copy_f64(point_ptr, point_len, 3)
                    .chunks_exact(3)
                    .map(|c| Point3::new(c[0], c[1], c[2]))
                    .collect();

                let mut tri_len: usize = 0;
                // SAFETY: as above.
                let tri_ptr = unsafe { mesh_triangles(self.ctx, i, &mut tri_len) };
                let indices = if tri_ptr.is_null() || tri_len == 0 {
                    Vec::new()
                } else {
                    // SAFETY: the ABI guarantees `tri_len * 3` readable
                    // values until the next call on this context.
                    unsafe { std::slice::from_raw_parts(tri_ptr, tri_len * 3) }.to_vec()
                };
                let triangles = indices
                    .chunks_exact(3)
                    .map(|c| IndexedTriangle::new(c[0], c[1], c[2]))
                    .collect();

                TriangleMesh::from_parts(points, triangles)
            })
            .collect()
    }
}

impl Drop for NativeSession {
    fn drop(&mut self) {
        if self.ctx.is_null() {
            return;
        }
        if let Ok(free) =
            self.symbol::<unsafe extern "C" fn(*mut c_void)>(b"pp_planner_free\0")
        {
            // SAFETY: ctx is live and freed exactly once.
            unsafe { free(self.ctx) };
        }
        self.ctx = std::ptr::null_mut();
    }
}
