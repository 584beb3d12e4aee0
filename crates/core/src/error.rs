use crate::types::DbId;

/// Errors raised by write-time validation helpers.
///
/// Resolution and brandkit application never produce these: malformed
/// stored data is absorbed by fallback instead.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
