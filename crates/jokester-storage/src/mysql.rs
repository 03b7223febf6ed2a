use async_trait::async_trait;
use jiff::Timestamp;
use jokester_core::model::{
    CONTENT_FIELD, CREATED_AT_FIELD, ID_FIELD, JOKESTER_ID_FIELD, NAME_FIELD,
};
use jokester_core::repository::{check_limit, ReadRepository, Repository, Result};
use jokester_core::{JokeRow, NewJoke, StorageError};
use serde_json::{Map, Value};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use tracing::trace;

/// Text columns of the `jokes` table and the row keys they surface as.
const HEAD_COLUMNS: &[(&str, &str)] = &[("id", ID_FIELD), ("name", NAME_FIELD)];
const JOKE_COLUMNS: &[(&str, &str)] = &[
    ("id", ID_FIELD),
    ("name", NAME_FIELD),
    ("content", CONTENT_FIELD),
    ("jokester_id", JOKESTER_ID_FIELD),
];

/// MySQL implementation of the repository contract.
///
/// `created_at` is stored as unix milliseconds. Deletes are hard deletes.
/// Offsets enumerate jokes by `(created_at, id)` ascending.
#[derive(Debug, Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    /// Creates a repository from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

fn parse_created_at(millis: i64) -> Result<Timestamp> {
    Timestamp::from_millisecond(millis).map_err(|e| {
        StorageError::InvalidData(format!("invalid created_at timestamp '{}': {e}", millis))
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

/// Converts a result row into an untyped joke row.
///
/// `NULL` columns surface as JSON `null` so the shape validator sees them.
fn to_joke_row(row: &MySqlRow, columns: &[(&str, &str)]) -> Result<JokeRow> {
    let mut object = Map::new();
    for (column, field) in columns {
        let value: Option<String> = row.try_get(*column).map_err(map_sqlx_error)?;
        object.insert(field.to_string(), value.map_or(Value::Null, Value::String));
    }
    Ok(JokeRow::new(Value::Object(object)))
}

fn to_full_joke_row(row: &MySqlRow) -> Result<JokeRow> {
    let mut joke = to_joke_row(row, JOKE_COLUMNS)?.into_value();
    let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;
    if let Value::Object(object) = &mut joke {
        object.insert(
            CREATED_AT_FIELD.to_string(),
            Value::String(parse_created_at(created_at)?.to_string()),
        );
    }
    Ok(JokeRow::new(joke))
}

#[async_trait]
impl ReadRepository for MySqlRepository {
    async fn count(&self) -> Result<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jokes")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        u64::try_from(total)
            .map_err(|_| StorageError::InvalidData(format!("negative joke count: {total}")))
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<JokeRow>> {
        check_limit(limit)?;
        let limit = u64::try_from(limit)
            .map_err(|_| StorageError::InvalidArgument(format!("limit too large: {limit}")))?;

        let rows = sqlx::query(
            r#"
            SELECT id, name
            FROM jokes
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        trace!(limit, returned = rows.len(), "listed recent jokes");
        rows.iter()
            .map(|row| to_joke_row(row, HEAD_COLUMNS))
            .collect()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<JokeRow>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, content, jokester_id, created_at
            FROM jokes
            WHERE id = ?
            LIMIT 1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(to_full_joke_row).transpose()
    }

    async fn find_at_offset(&self, offset: u64) -> Result<Option<JokeRow>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, content, jokester_id, created_at
            FROM jokes
            ORDER BY created_at, id
            LIMIT 1 OFFSET ?
            "#,
        )
        .bind(offset)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(to_full_joke_row).transpose()
    }
}

#[async_trait]
impl Repository for MySqlRepository {
    async fn insert(&self, joke: NewJoke) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO jokes (id, name, content, jokester_id, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(joke.id.as_str())
        .bind(joke.name)
        .bind(joke.content)
        .bind(joke.jokester_id.as_str())
        .bind(joke.created_at.as_millisecond())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(StorageError::Conflict(joke.id)),
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM jokes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
