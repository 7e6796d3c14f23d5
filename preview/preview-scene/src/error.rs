//! Error types for scene rendering.

use thiserror::Error;

/// Errors that can occur while serializing a scene.
#[derive(Debug, Error)]
pub enum SceneError {
    /// PNG encoding failed.
    #[error("Failed to encode PNG: {0}")]
    PngEncode(#[from] image::ImageError),
}

/// Result type for scene operations.
pub type SceneResult<T> = std::result::Result<T, SceneError>;
