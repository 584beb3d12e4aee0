use pagecraft_core::error::CoreError;

/// Error type for store and service operations.
///
/// Wraps [`CoreError`] for domain errors and adds collaborator-specific
/// variants.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A domain-level error from `pagecraft_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The backing store failed.
    #[error("Store error: {0}")]
    Store(String),

    /// No brandkit id was given and no default brandkit is configured.
    #[error("No default brandkit is configured")]
    NoDefaultBrandkit,

    /// Malformed input handed to the preview binary.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for service return values.
pub type ServiceResult<T> = Result<T, ServiceError>;
