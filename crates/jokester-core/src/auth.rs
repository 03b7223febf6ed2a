use crate::model::{User, UserId};
use async_trait::async_trait;
use http::HeaderMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("identity backend failed: {0}")]
    Backend(String),
}

/// Resolves the caller of an inbound request.
///
/// Session mechanics live entirely behind this trait; the joke core only asks
/// who is calling.
#[async_trait]
pub trait Authenticator: Send + Sync + 'static {
    /// The calling user, if any.
    async fn get_user(&self, headers: &HeaderMap) -> Result<Option<User>, AuthError>;

    /// The calling user's id, if any.
    async fn get_user_id(&self, headers: &HeaderMap) -> Result<Option<UserId>, AuthError>;

    /// The calling user's id, failing with `Unauthenticated` when there is none.
    async fn require_user_id(&self, headers: &HeaderMap) -> Result<UserId, AuthError> {
        self.get_user_id(headers)
            .await?
            .ok_or(AuthError::Unauthenticated)
    }
}
