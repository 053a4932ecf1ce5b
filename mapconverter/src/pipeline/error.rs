//! Pipeline errors.

use thiserror::Error;

use crate::coord::CoordError;
use crate::provider::ProviderError;

/// Errors that can fail a render request.
///
/// Tile fetch failures are not among them: a missing tile renders as the
/// placeholder.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Missing, non-numeric or otherwise unusable request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Coord(#[from] CoordError),

    /// HTTP client could not be constructed
    #[error("Tile source unavailable: {0}")]
    Provider(#[from] ProviderError),

    #[error("Image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    /// Any other failure while rendering
    #[error("Render failed: {0}")]
    Render(String),
}

impl PipelineError {
    /// Whether the caller sent a bad request rather than the service failing.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, PipelineError::InvalidInput(_) | PipelineError::Coord(_))
    }
}

impl From<tokio::task::JoinError> for PipelineError {
    fn from(e: tokio::task::JoinError) -> Self {
        PipelineError::Render(format!("render task failed: {}", e))
    }
}
