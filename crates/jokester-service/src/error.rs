use jokester_core::{StorageError, UserId, ValidationError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, JokeError>;

#[derive(Debug, Clone, Error)]
pub enum JokeError {
    #[error("joke not found: {0}")]
    NotFound(String),
    #[error("no joke available to pick from")]
    EmptyCollection,
    #[error("authentication required")]
    Unauthenticated,
    #[error("user {user} does not own joke {joke}")]
    Forbidden { joke: String, user: UserId },
    #[error("stored joke is malformed: {0}")]
    Validation(#[from] ValidationError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
