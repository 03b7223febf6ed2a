use async_trait::async_trait;
use dashmap::DashMap;
use jiff::Timestamp;
use jokester_core::model::{ID_FIELD, NAME_FIELD};
use jokester_core::repository::{check_limit, ReadRepository, Repository, Result};
use jokester_core::{JokeRow, NewJoke, StorageError};
use serde_json::{Map, Value};
use std::cmp::Reverse;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// In-memory storage entry for a joke row.
#[derive(Debug, Clone)]
struct Entry {
    row: JokeRow,
    created_at: Timestamp,
    /// Insertion order, breaks ties between equal timestamps.
    sequence: u64,
}

impl Entry {
    fn creation_key(&self) -> (Timestamp, u64) {
        (self.created_at, self.sequence)
    }

    /// Projects the row onto the listing columns, keeping absent fields absent.
    fn head_row(&self) -> JokeRow {
        let mut projected = Map::new();
        for field in [ID_FIELD, NAME_FIELD] {
            if let Some(value) = self.row.as_value().get(field) {
                projected.insert(field.to_string(), value.clone());
            }
        }
        JokeRow::new(Value::Object(projected))
    }
}

/// In-memory implementation of the Repository trait using DashMap.
///
/// Offsets enumerate jokes oldest first, which stays stable between calls as
/// long as the map is not mutated.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    storage: DashMap<String, Entry>,
    sequence: AtomicU64,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: DashMap::with_capacity(capacity),
            sequence: AtomicU64::new(0),
        }
    }

    /// Stores a row exactly as given, without shape checks.
    ///
    /// This mirrors a backend whose data has drifted from the declared shape.
    /// The row still needs a string `id` to be addressable.
    pub fn insert_row(&self, row: JokeRow, created_at: Timestamp) -> Result<()> {
        let id = row
            .id()
            .ok_or_else(|| StorageError::InvalidArgument("row has no string id".to_string()))?
            .to_owned();
        self.put(id, row, created_at)
    }

    fn put(&self, id: String, row: JokeRow, created_at: Timestamp) -> Result<()> {
        match self.storage.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(occupied) => {
                Err(StorageError::Conflict(occupied.key().clone()))
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(Entry {
                    row,
                    created_at,
                    sequence: self.sequence.fetch_add(1, Ordering::SeqCst),
                });
                Ok(())
            }
        }
    }

    /// Clones every entry out of the map so no shard guard outlives the call.
    fn snapshot(&self) -> Vec<Entry> {
        self.storage
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn count(&self) -> Result<u64> {
        Ok(self.storage.len() as u64)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<JokeRow>> {
        check_limit(limit)?;
        let mut entries = self.snapshot();
        entries.sort_by_key(|entry| Reverse(entry.creation_key()));

        let rows: Vec<_> = entries.iter().take(limit).map(Entry::head_row).collect();
        trace!(limit, returned = rows.len(), "listed recent jokes");
        Ok(rows)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<JokeRow>> {
        Ok(self.storage.get(id).map(|entry| entry.row.clone()))
    }

    async fn find_at_offset(&self, offset: u64) -> Result<Option<JokeRow>> {
        let Ok(offset) = usize::try_from(offset) else {
            return Ok(None);
        };
        let mut entries = self.snapshot();
        entries.sort_by_key(Entry::creation_key);

        Ok(entries.into_iter().nth(offset).map(|entry| entry.row))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert(&self, joke: NewJoke) -> Result<()> {
        let row = joke.to_row();
        self.put(joke.id, row, joke.created_at)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.storage.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::SignedDuration;
    use jokester_core::UserId;
    use serde_json::json;
    use std::collections::HashSet;

    fn joke(id: &str, name: &str, created_at: Timestamp) -> NewJoke {
        NewJoke::builder()
            .id(id)
            .name(name)
            .content(format!("{name} walks into a bar"))
            .jokester_id(UserId::new("u1").unwrap())
            .created_at(created_at)
            .build()
    }

    fn ids(rows: &[JokeRow]) -> Vec<&str> {
        rows.iter().filter_map(JokeRow::id).collect()
    }

    async fn seeded(n: i64) -> InMemoryRepository {
        let repo = InMemoryRepository::new();
        let base = Timestamp::now();
        for i in 0..n {
            let created_at = base + SignedDuration::from_secs(i);
            repo.insert(joke(&format!("j{i}"), &format!("Joke {i}"), created_at))
                .await
                .unwrap();
        }
        repo
    }

    #[tokio::test]
    async fn insert_and_find() {
        let repo = InMemoryRepository::new();
        repo.insert(joke("a", "Foo", Timestamp::now())).await.unwrap();

        let row = repo.find_by_id("a").await.unwrap().unwrap();
        assert_eq!(row.as_value()["name"], "Foo");
        assert_eq!(row.as_value()["jokesterId"], "u1");
    }

    #[tokio::test]
    async fn find_nonexistent() {
        let repo = InMemoryRepository::new();
        assert!(repo.find_by_id("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_conflict() {
        let repo = InMemoryRepository::new();
        repo.insert(joke("a", "Foo", Timestamp::now())).await.unwrap();

        let err = repo
            .insert(joke("a", "Other", Timestamp::now()))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));
    }

    #[tokio::test]
    async fn count_tracks_inserts_and_deletes() {
        let repo = seeded(3).await;
        assert_eq!(repo.count().await.unwrap(), 3);

        assert!(repo.delete("j1").await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn list_recent_newest_first() {
        let repo = seeded(7).await;

        let rows = repo.list_recent(5).await.unwrap();
        assert_eq!(ids(&rows), ["j6", "j5", "j4", "j3", "j2"]);
    }

    #[tokio::test]
    async fn list_recent_short_store() {
        let repo = seeded(3).await;

        let rows = repo.list_recent(5).await.unwrap();
        assert_eq!(ids(&rows), ["j2", "j1", "j0"]);
    }

    #[tokio::test]
    async fn list_recent_projects_head_columns() {
        let repo = seeded(1).await;

        let rows = repo.list_recent(5).await.unwrap();
        assert_eq!(rows[0].as_value(), &json!({ "id": "j0", "name": "Joke 0" }));
    }

    #[tokio::test]
    async fn list_recent_breaks_timestamp_ties_by_insertion() {
        let repo = InMemoryRepository::new();
        let now = Timestamp::now();
        repo.insert(joke("first", "First", now)).await.unwrap();
        repo.insert(joke("second", "Second", now)).await.unwrap();

        let rows = repo.list_recent(5).await.unwrap();
        assert_eq!(ids(&rows), ["second", "first"]);
    }

    #[tokio::test]
    async fn list_recent_rejects_zero_limit() {
        let repo = seeded(1).await;

        let err = repo.list_recent(0).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn offsets_are_distinct_and_bounded() {
        let repo = seeded(4).await;
        let count = repo.count().await.unwrap();

        let mut seen = HashSet::new();
        for offset in 0..count {
            let row = repo.find_at_offset(offset).await.unwrap().unwrap();
            seen.insert(row.id().unwrap().to_string());
        }
        assert_eq!(seen.len(), 4);
        assert!(repo.find_at_offset(count).await.unwrap().is_none());
        assert!(repo.find_at_offset(u64::MAX).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_nonexistent() {
        let repo = InMemoryRepository::new();
        assert!(!repo.delete("nope").await.unwrap());
    }

    #[tokio::test]
    async fn insert_row_keeps_drifted_shape() {
        let repo = InMemoryRepository::new();
        repo.insert_row(json!({ "id": "x", "name": 7 }).into(), Timestamp::now())
            .unwrap();

        let row = repo.find_by_id("x").await.unwrap().unwrap();
        assert_eq!(row.as_value()["name"], 7);

        let err = repo
            .insert_row(json!({ "name": "no id" }).into(), Timestamp::now())
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn concurrent_access() {
        use std::sync::Arc;

        let repo = Arc::new(InMemoryRepository::new());
        let mut handles = vec![];

        for i in 0..10u64 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.insert(joke(&format!("joke-{i:03}"), "Concurrent", Timestamp::now()))
                    .await
                    .unwrap();
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(repo.count().await.unwrap(), 10);
        for i in 0..10u64 {
            let row = repo.find_by_id(&format!("joke-{i:03}")).await.unwrap();
            assert!(row.is_some());
        }
    }
}
