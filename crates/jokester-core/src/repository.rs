use crate::error::StorageError;
use crate::model::{JokeRow, NewJoke};
use async_trait::async_trait;

/// Type alias for repository results.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A read-only view of a joke store.
///
/// Rows come back unvalidated; callers narrow them with
/// [`crate::schema::validate`].
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Total number of jokes currently stored.
    async fn count(&self) -> Result<u64>;

    /// Up to `limit` rows carrying `id` and `name`, newest first.
    ///
    /// Returns `Err(InvalidArgument)` when `limit` is zero.
    async fn list_recent(&self, limit: usize) -> Result<Vec<JokeRow>>;

    /// Retrieves the full row for a joke id.
    /// Returns `None` if the id does not exist.
    async fn find_by_id(&self, id: &str) -> Result<Option<JokeRow>>;

    /// Retrieves the row at a zero-based position of a stable ordering.
    ///
    /// The ordering itself is implementation-defined; at a single point in time
    /// every offset in `0..count` resolves to a distinct joke.
    /// Returns `None` when `offset` is out of range.
    async fn find_at_offset(&self, offset: u64) -> Result<Option<JokeRow>>;
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Inserts a new joke. Returns `Err(Conflict)` if the id already exists.
    async fn insert(&self, joke: NewJoke) -> Result<()>;

    /// Deletes the joke with the given id.
    /// Returns `true` if the joke existed and was removed.
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// Rejects the zero limit every adapter refuses.
pub fn check_limit(limit: usize) -> Result<()> {
    if limit == 0 {
        return Err(StorageError::InvalidArgument(
            "list limit must be positive".to_string(),
        ));
    }
    Ok(())
}
