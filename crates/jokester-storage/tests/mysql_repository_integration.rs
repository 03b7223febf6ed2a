use std::time::Duration;

use jiff::{SignedDuration, Timestamp};
use jokester_core::{validate, Joke, JokeHeadList, NewJoke, UserId};
use jokester_storage::{MySqlRepository, ReadRepository, Repository, StorageError};
use jokester_test_infra::mysql::{MySqlServer, MysqlConfig};
use serde_json::Value;
use sqlx::mysql::MySqlPoolOptions;

struct Fixture {
    _mysql: MySqlServer,
    repo: MySqlRepository,
}

impl Fixture {
    async fn start() -> Self {
        let mysql = MySqlServer::new(MysqlConfig::builder().build())
            .await
            .expect("start mysql");
        let url = mysql.database_url().await.expect("mysql url");
        let pool = connect_with_retry(&url).await;

        sqlx::query(include_str!("../ddl/mysql/jokes.sql"))
            .execute(&pool)
            .await
            .expect("create schema");

        Self {
            _mysql: mysql,
            repo: MySqlRepository::new(pool),
        }
    }
}

async fn connect_with_retry(url: &str) -> sqlx::MySqlPool {
    let mut last_error = None;

    for _ in 0..20 {
        match MySqlPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
        {
            Ok(pool) => return pool,
            Err(err) => {
                last_error = Some(err);
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        }
    }

    panic!("failed to connect mysql: {last_error:?}");
}

fn joke(id: &str, name: &str, created_at: Timestamp) -> NewJoke {
    NewJoke::builder()
        .id(id)
        .name(name)
        .content(format!("content of {name}"))
        .jokester_id(UserId::new("u1").unwrap())
        .created_at(created_at)
        .build()
}

#[tokio::test]
async fn insert_and_find_by_id() {
    let fixture = Fixture::start().await;

    fixture
        .repo
        .insert(joke("a", "Foo", Timestamp::now()))
        .await
        .unwrap();

    let row = fixture.repo.find_by_id("a").await.unwrap().unwrap();
    let joke: Joke = validate(row.as_value()).unwrap();
    assert_eq!(joke.name, "Foo");
    assert_eq!(joke.content, "content of Foo");
    assert_eq!(row.as_value()["jokesterId"], "u1");

    assert!(fixture.repo.find_by_id("z").await.unwrap().is_none());
}

#[tokio::test]
async fn insert_conflict() {
    let fixture = Fixture::start().await;

    fixture
        .repo
        .insert(joke("a", "Foo", Timestamp::now()))
        .await
        .unwrap();
    let err = fixture
        .repo
        .insert(joke("a", "Again", Timestamp::now()))
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Conflict(id) if id == "a"));
}

#[tokio::test]
async fn list_recent_newest_first_and_bounded() {
    let fixture = Fixture::start().await;
    let base = Timestamp::now();

    for (i, id) in ["a", "b", "c"].into_iter().enumerate() {
        let created_at = base + SignedDuration::from_secs(i as i64);
        fixture
            .repo
            .insert(joke(id, &id.to_uppercase(), created_at))
            .await
            .unwrap();
    }

    let rows = fixture.repo.list_recent(5).await.unwrap();
    let rows = Value::Array(rows.into_iter().map(|row| row.into_value()).collect());
    let heads: JokeHeadList = validate(&rows).unwrap();
    let ids: Vec<_> = heads.iter().map(|head| head.id.as_str()).collect();
    assert_eq!(ids, ["c", "b", "a"]);

    let rows = fixture.repo.list_recent(2).await.unwrap();
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn count_offset_and_delete() {
    let fixture = Fixture::start().await;
    let base = Timestamp::now();

    for i in 0..3i64 {
        fixture
            .repo
            .insert(joke(
                &format!("j{i}"),
                "Joke",
                base + SignedDuration::from_secs(i),
            ))
            .await
            .unwrap();
    }

    assert_eq!(fixture.repo.count().await.unwrap(), 3);

    let first = fixture.repo.find_at_offset(0).await.unwrap().unwrap();
    assert_eq!(first.id(), Some("j0"));
    assert!(fixture.repo.find_at_offset(3).await.unwrap().is_none());

    assert!(fixture.repo.delete("j0").await.unwrap());
    assert!(!fixture.repo.delete("j0").await.unwrap());
    assert_eq!(fixture.repo.count().await.unwrap(), 2);
}
