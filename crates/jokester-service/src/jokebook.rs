use crate::error::Result;
use async_trait::async_trait;
use jokester_core::{Joke, JokeHeadList, UserId};
use serde::Serialize;

/// A joke together with the viewer's relation to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JokeView {
    pub joke: Joke,
    /// True iff the viewer created the joke.
    pub is_owner: bool,
}

#[async_trait]
pub trait JokeBook: Send + Sync + 'static {
    /// Up to `limit` joke summaries, newest first.
    async fn list_recent(&self, limit: usize) -> Result<JokeHeadList>;

    /// Looks up one joke, computing ownership against `viewer`.
    async fn find(&self, id: &str, viewer: Option<&UserId>) -> Result<JokeView>;

    /// Picks one joke uniformly at random.
    async fn random(&self) -> Result<Joke>;

    /// Deletes a joke on behalf of `caller`, who must own it.
    async fn delete(&self, id: &str, caller: Option<&UserId>) -> Result<()>;
}
