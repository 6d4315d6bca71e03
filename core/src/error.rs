use thiserror::Error;

/// Client-input failures raised by the player rules.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlayerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("player {0} not found")]
    NotFound(i64),
}

impl PlayerError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        PlayerError::InvalidInput(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, PlayerError>;
