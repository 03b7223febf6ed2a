use crate::error::{JokeError, Result};
use crate::jokebook::{JokeBook, JokeView};
use crate::random::{OffsetPicker, ThreadRngPicker};
use async_trait::async_trait;
use jokester_core::{validate, Joke, JokeHeadList, JokeOwner, JokeRow, Repository, UserId};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// How many count-then-offset reads random selection may make.
///
/// The store can shrink between `count` and `find_at_offset`; one retry
/// absorbs that race, a second miss is reported as an empty collection.
const RANDOM_ATTEMPTS: u32 = 2;

/// A concrete implementation of the [`JokeBook`] trait.
///
/// This service wraps a `Repository` and an `OffsetPicker` to handle:
/// - shape validation of every row it reads
/// - random selection over the current store
/// - the ownership check gating deletes
///
/// Store calls are not wrapped in a transaction.
#[derive(Debug, Clone)]
pub struct JokeService<R, P = ThreadRngPicker> {
    repository: Arc<R>,
    picker: P,
}

impl<R: Repository> JokeService<R> {
    /// Creates a new `JokeService` picking random jokes with the thread RNG.
    pub fn new(repository: R) -> Self {
        Self::with_picker(repository, ThreadRngPicker)
    }
}

impl<R: Repository, P: OffsetPicker> JokeService<R, P> {
    /// Creates a new `JokeService` with a custom offset picker.
    pub fn with_picker(repository: R, picker: P) -> Self {
        Self {
            repository: Arc::new(repository),
            picker,
        }
    }

    /// Returns a reference to the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    async fn fetch(&self, id: &str) -> Result<Option<JokeRow>> {
        trace!(joke_id = %id, "fetching joke row");
        Ok(self.repository.find_by_id(id).await?)
    }
}

#[async_trait]
impl<R: Repository, P: OffsetPicker> JokeBook for JokeService<R, P> {
    async fn list_recent(&self, limit: usize) -> Result<JokeHeadList> {
        let rows = self.repository.list_recent(limit).await?;
        let rows = Value::Array(rows.into_iter().map(JokeRow::into_value).collect());

        let heads: JokeHeadList = validate(&rows)?;
        debug!(limit, returned = heads.len(), "listed recent jokes");
        Ok(heads)
    }

    async fn find(&self, id: &str, viewer: Option<&UserId>) -> Result<JokeView> {
        let row = self
            .fetch(id)
            .await?
            .ok_or_else(|| JokeError::NotFound(id.to_string()))?;

        let joke: Joke = validate(row.as_value())?;
        // Viewing never fails on a drifted owner attribute; it only withholds ownership.
        let is_owner = match (viewer, validate::<JokeOwner>(row.as_value())) {
            (Some(viewer), Ok(owner)) => owner.is_owned_by(viewer),
            (Some(_), Err(err)) => {
                warn!(joke_id = %id, error = %err, "stored joke has no usable owner");
                false
            }
            (None, _) => false,
        };

        debug!(joke_id = %id, is_owner, "resolved joke");
        Ok(JokeView { joke, is_owner })
    }

    async fn random(&self) -> Result<Joke> {
        for attempt in 1..=RANDOM_ATTEMPTS {
            let count = self.repository.count().await?;
            if count == 0 {
                debug!(attempt, "no jokes to pick from");
                return Err(JokeError::EmptyCollection);
            }

            let offset = self.picker.pick(count);
            match self.repository.find_at_offset(offset).await? {
                Some(row) => {
                    let joke: Joke = validate(row.as_value())?;
                    debug!(joke_id = %joke.id, offset, count, "picked random joke");
                    return Ok(joke);
                }
                None => {
                    warn!(attempt, offset, count, "random offset fell outside the store");
                }
            }
        }

        Err(JokeError::EmptyCollection)
    }

    async fn delete(&self, id: &str, caller: Option<&UserId>) -> Result<()> {
        // Identity first: an anonymous caller must not learn whether the joke exists.
        let Some(caller) = caller else {
            debug!(joke_id = %id, "anonymous delete refused");
            return Err(JokeError::Unauthenticated);
        };

        let row = self
            .fetch(id)
            .await?
            .ok_or_else(|| JokeError::NotFound(id.to_string()))?;

        let owner: JokeOwner = validate(row.as_value())?;
        if !owner.is_owned_by(caller) {
            warn!(joke_id = %id, user_id = %caller, "delete refused, caller is not the jokester");
            return Err(JokeError::Forbidden {
                joke: id.to_string(),
                user: caller.clone(),
            });
        }

        if !self.repository.delete(id).await? {
            debug!(joke_id = %id, "joke vanished before delete");
            return Err(JokeError::NotFound(id.to_string()));
        }

        info!(joke_id = %id, user_id = %caller, "deleted joke");
        Ok(())
    }
}
