use async_trait::async_trait;
use dashmap::DashMap;
use http::HeaderMap;
use jokester_core::{AuthError, Authenticator, User, UserId};
use tracing::trace;

/// Request header naming the calling user.
pub const USER_HEADER: &str = "x-jokester-user";

/// Resolves callers from the [`USER_HEADER`] header against a user directory.
///
/// Stands in for a session store: a caller is authenticated iff the header
/// names a registered user. The header is taken at face value, so any client
/// can act as any registered user. Only use it for demos and local testing, or
/// behind a proxy that sets the header itself.
#[derive(Debug, Default)]
pub struct HeaderAuthenticator {
    users: DashMap<UserId, User>,
}

impl HeaderAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a user in the directory.
    pub fn register(&self, user: User) {
        self.users.insert(user.id.clone(), user);
    }

    fn claimed_id(headers: &HeaderMap) -> Option<UserId> {
        let raw = headers.get(USER_HEADER)?.to_str().ok()?;
        UserId::new(raw.trim()).ok()
    }
}

#[async_trait]
impl Authenticator for HeaderAuthenticator {
    async fn get_user(&self, headers: &HeaderMap) -> Result<Option<User>, AuthError> {
        let Some(id) = Self::claimed_id(headers) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|user| user.value().clone()))
    }

    async fn get_user_id(&self, headers: &HeaderMap) -> Result<Option<UserId>, AuthError> {
        let user = self.get_user(headers).await?;
        if user.is_none() {
            trace!("request carries no known user");
        }
        Ok(user.map(|user| user.id))
    }
}
