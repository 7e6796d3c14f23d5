//! Orthographic camera for scene projection.

use nalgebra::{Point3, Vector3};

/// The fixed elevation used for layer previews, in degrees.
pub const DEFAULT_ELEVATION_DEG: f64 = 30.0;

/// The fixed azimuth used for layer previews, in degrees.
pub const DEFAULT_AZIMUTH_DEG: f64 = -60.0;

/// A point projected onto the camera's image plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    /// Horizontal image-plane coordinate (unscaled).
    pub x: f64,
    /// Vertical image-plane coordinate (unscaled, up-positive).
    pub y: f64,
    /// Distance along the view direction. Larger is closer to the
    /// camera; used for painter ordering.
    pub depth: f64,
}

/// An orthographic camera defined by elevation and azimuth.
///
/// The view direction points from the scene toward the camera:
/// `(cos e cos a, cos e sin a, sin e)` for elevation `e` and azimuth
/// `a`. Screen right and up form an orthonormal basis with it.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    right: Vector3<f64>,
    up: Vector3<f64>,
    view: Vector3<f64>,
}

impl Camera {
    /// Create a camera from elevation and azimuth angles in degrees.
    #[must_use]
    pub fn new(elevation_deg: f64, azimuth_deg: f64) -> Self {
        let e = elevation_deg.to_radians();
        let a = azimuth_deg.to_radians();

        let view = Vector3::new(e.cos() * a.cos(), e.cos() * a.sin(), e.sin());
        let right = Vector3::new(-a.sin(), a.cos(), 0.0);
        let up = view.cross(&right);

        Self { right, up, view }
    }

    /// Project a scene point onto the image plane.
    #[must_use]
    pub fn project(&self, p: &Point3<f64>) -> Projected {
        let v = p.coords;
        Projected {
            x: v.dot(&self.right),
            y: v.dot(&self.up),
            depth: v.dot(&self.view),
        }
    }
}

impl Default for Camera {
    /// The fixed preview orientation: elevation 30°, azimuth −60°.
    fn default() -> Self {
        Self::new(DEFAULT_ELEVATION_DEG, DEFAULT_AZIMUTH_DEG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn basis_is_orthonormal() {
        let cam = Camera::default();

        assert_relative_eq!(cam.right.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(cam.up.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(cam.view.norm(), 1.0, epsilon = 1e-12);

        assert_relative_eq!(cam.right.dot(&cam.up), 0.0, epsilon = 1e-12);
        assert_relative_eq!(cam.right.dot(&cam.view), 0.0, epsilon = 1e-12);
        assert_relative_eq!(cam.up.dot(&cam.view), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn front_view_is_identity_like() {
        // Elevation 0, azimuth 0: looking down +X; screen x follows +Y,
        // screen y follows +Z.
        let cam = Camera::new(0.0, 0.0);
        let p = cam.project(&Point3::new(0.0, 2.0, 3.0));

        assert_relative_eq!(p.x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 3.0, epsilon = 1e-12);
        assert_relative_eq!(p.depth, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn depth_increases_toward_camera() {
        let cam = Camera::default();
        // The view vector has positive x and z components for the
        // default orientation, so moving along it raises depth.
        let near = cam.project(&Point3::new(10.0, -10.0, 10.0));
        let far = cam.project(&Point3::new(-10.0, 10.0, -10.0));
        assert!(near.depth > far.depth);
    }
}
