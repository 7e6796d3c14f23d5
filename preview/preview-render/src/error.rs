//! Error types for preview rendering.

use thiserror::Error;

/// Errors that can occur while producing a layer preview.
#[derive(Debug, Error)]
pub enum PreviewError {
    /// No input file or upload was provided by the caller.
    #[error("{0}")]
    MissingInput(String),

    /// A configuration value could not be parsed or is out of domain.
    #[error("{0}")]
    InvalidParameter(String),

    /// The external planning engine could not be loaded.
    #[error("Failed to load planner engine: {0}")]
    EngineUnavailable(String),

    /// Slicing produced no usable result.
    #[error("{0}")]
    PlanningFailure(String),

    /// Scene rasterization or encoding failed.
    #[error(transparent)]
    Render(#[from] preview_scene::SceneError),

    /// Filesystem error while handling input.
    #[error("Failed to access {path}: {source}")]
    Io {
        /// The path that failed.
        path: std::path::PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl PreviewError {
    /// The failure raised when slicing yields zero layers.
    #[must_use]
    pub fn no_layers() -> Self {
        Self::PlanningFailure("No layers generated; check STL or slicing parameters.".to_string())
    }

    /// Whether this error was caused by the caller's input (HTTP 400
    /// class) rather than an internal failure (HTTP 500 class).
    #[must_use]
    pub const fn is_caller_error(&self) -> bool {
        matches!(self, Self::MissingInput(_) | Self::InvalidParameter(_))
    }
}

/// Result type for preview rendering.
pub type PreviewResult<T> = std::result::Result<T, PreviewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_classes() {
        assert!(PreviewError::MissingInput("x".into()).is_caller_error());
        assert!(PreviewError::InvalidParameter("x".into()).is_caller_error());
        assert!(!PreviewError::no_layers().is_caller_error());
        assert!(!PreviewError::EngineUnavailable("x".into()).is_caller_error());
    }

    #[test]
    fn no_layers_message() {
        assert_eq!(
            format!("{}", PreviewError::no_layers()),
            "No layers generated; check STL or slicing parameters."
        );
    }
}
