use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during geometry processing
///
/// Data-quality problems inside a feature list are reported as warnings on
/// the build result, not through this type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Triangulation failed: {0}")]
    TriangulationError(String),

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Invalid extrusion parameters: {0}")]
    InvalidExtrusion(String),

    #[error("Invalid feature: {0}")]
    InvalidFeature(String),

    #[error("Boolean operation failed: {0}")]
    BooleanFailed(String),

    #[error("Empty mesh: {0}")]
    EmptyMesh(String),

    #[error("Element model error: {0}")]
    CoreError(#[from] nc_lite_core::Error),
}
