//! Backend error types.

/// Errors that can occur at the backend boundary.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The request never produced a response (connection, timeout, I/O).
    #[error("request to {endpoint} failed: {message}")]
    Transport {
        /// The endpoint that was called.
        endpoint: String,
        /// Underlying error description.
        message: String,
    },

    /// The backend answered with a non-success status.
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("invalid response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// The backend processed the request and reported an error message.
    #[error("{endpoint} rejected the request: {message}")]
    Rejected { endpoint: String, message: String },

    /// The requested entity does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Local settings file I/O failed.
    #[error("settings file error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias used throughout the backend crate.
pub type Result<T> = std::result::Result<T, BackendError>;

impl BackendError {
    // -- Constructors --------------------------------------------------------

    pub fn transport(endpoint: impl Into<String>, message: impl ToString) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    pub fn decode(endpoint: impl Into<String>, message: impl ToString) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    pub fn rejected(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    // -- Predicates ----------------------------------------------------------

    /// Returns `true` if this is a [`BackendError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns `true` for failures of the round trip itself, as opposed to
    /// an error the backend reported about the request's content.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Status { .. } | Self::Decode { .. } | Self::Io(_)
        )
    }
}
