//! Pipeline error types.

use docbind_backend::BackendError;
use docbind_chart::ChartError;
use docbind_core::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Rejected before any state change or request.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Chart(#[from] ChartError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The operation needs state the session does not have yet.
    #[error("{0}")]
    Precondition(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Backend(e) if e.is_transport())
    }
}
