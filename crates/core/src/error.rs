// crates/core/src/error.rs
//! Service-layer error taxonomy.
//!
//! Domain and repository code raises one of these typed errors; the server's
//! route layer maps each variant to a fixed HTTP status and response
//! envelope. Nothing here is retried automatically.

use thiserror::Error;

/// Typed errors raised by domain/service code.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("payload too large: {size} bytes exceeds limit of {limit}")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Not-found error for a resource kind and id, e.g. `job abc123`.
    pub fn not_found(kind: &str, id: &str) -> Self {
        ServiceError::NotFound(format!("{kind} {id}"))
    }
}

/// Result type alias for service-layer functions.
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            ServiceError::not_found("job", "j-1").to_string(),
            "job j-1 not found"
        );
        assert_eq!(
            ServiceError::Validation("bad job type".into()).to_string(),
            "validation failed: bad job type"
        );
        assert_eq!(
            ServiceError::PayloadTooLarge {
                size: 2048,
                limit: 1024
            }
            .to_string(),
            "payload too large: 2048 bytes exceeds limit of 1024"
        );
    }
}
