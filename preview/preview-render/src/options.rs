//! Render options.

use crate::error::{PreviewError, PreviewResult};

/// Options controlling a single preview render.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Layer height in mm (integer, at least 1).
    pub layer_height: u32,

    /// Grid infill spacing in mm.
    pub infill_spacing: f64,

    /// Requested layer index. Out-of-range values are clamped to the
    /// nearest valid layer rather than rejected.
    pub layer: i64,

    /// Overlay the source mesh as translucent faces.
    pub show_mesh: bool,

    /// Draw contour (perimeter) segments.
    pub show_contours: bool,

    /// Draw infill segments.
    pub show_infill: bool,

    /// Draw raw slice-plane intersection points.
    pub show_raw_intersections: bool,

    /// Color mesh triangles intersecting the selected layer.
    pub color_intersecting: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            layer_height: 1,
            infill_spacing: 1.0,
            layer: 0,
            show_mesh: true,
            show_contours: true,
            show_infill: true,
            show_raw_intersections: false,
            color_intersecting: false,
        }
    }
}

impl RenderOptions {
    /// Check the options for out-of-domain values.
    ///
    /// # Errors
    ///
    /// Returns [`PreviewError::InvalidParameter`] if the layer height
    /// is zero or the infill spacing is not a positive finite number.
    pub fn validate(&self) -> PreviewResult<()> {
        if self.layer_height == 0 {
            return Err(PreviewError::InvalidParameter(
                format!("layer height must be at least 1, got {}", self.layer_height),
            ));
        }
        if !self.infill_spacing.is_finite() || self.infill_spacing <= 0.0 {
            return Err(PreviewError::InvalidParameter(format!(
                "infill spacing must be a positive number, got {}",
                self.infill_spacing
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_contract() {
        let options = RenderOptions::default();
        assert_eq!(options.layer_height, 1);
        assert!((options.infill_spacing - 1.0).abs() < f64::EPSILON);
        assert_eq!(options.layer, 0);
        assert!(options.show_mesh);
        assert!(options.show_contours);
        assert!(options.show_infill);
        assert!(!options.show_raw_intersections);
        assert!(!options.color_intersecting);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut options = RenderOptions::default();
        assert!(options.validate().is_ok());

        options.layer_height = 0;
        assert!(matches!(
            options.validate(),
            Err(PreviewError::InvalidParameter(_))
        ));

        options.layer_height = 1;
        options.infill_spacing = f64::NAN;
        assert!(options.validate().is_err());

        options.infill_spacing = -1.0;
        assert!(options.validate().is_err());
    }
}
