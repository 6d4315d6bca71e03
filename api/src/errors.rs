//! Error types surfaced by the HTTP layer.

use axum::http::StatusCode;
use players_core::PlayerError;
use thiserror::Error;

/// Failures raised by player storage backends.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("KeyDB error: {0}")]
    KeyDb(#[from] redis::RedisError),

    #[error("corrupted player record {key}: {reason}")]
    CorruptedRecord { key: String, reason: String },

    #[error("player repository lock was poisoned")]
    LockPoisoned,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Player(#[from] PlayerError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ApiError {
    /// HTTP status reported to the client for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Player(PlayerError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Player(PlayerError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, ApiError::Player(_))
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_kinds_to_status_codes() {
        let invalid = ApiError::from(PlayerError::invalid("name is required"));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert!(invalid.is_client_error());

        let missing = ApiError::from(PlayerError::NotFound(999_999));
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let storage = ApiError::from(RepositoryError::LockPoisoned);
        assert_eq!(storage.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!storage.is_client_error());
    }
}
