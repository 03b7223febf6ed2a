use crate::error::CoreError;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt::Display;
use typed_builder::TypedBuilder;

/// Row key holding the joke's primary key.
pub const ID_FIELD: &str = "id";
/// Row key holding the joke's title.
pub const NAME_FIELD: &str = "name";
/// Row key holding the joke's body.
pub const CONTENT_FIELD: &str = "content";
/// Row key holding the id of the user who created the joke.
pub const JOKESTER_ID_FIELD: &str = "jokesterId";
/// Row key holding the creation time.
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Identifier of a registered user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a user id, rejecting empty or whitespace-only values.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CoreError::InvalidUserId(
                "user id cannot be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registered user as resolved by the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

/// Listable summary of a joke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JokeHead {
    /// Primary key, immutable after creation.
    pub id: String,
    pub name: String,
}

/// Jokes in listing order, most recent first.
pub type JokeHeadList = Vec<JokeHead>;

/// The public joke entity.
///
/// The creator's id is deliberately absent: ownership is only ever read from
/// the stored row through [`JokeOwner`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Joke {
    pub id: String,
    pub name: String,
    pub content: String,
}

impl Joke {
    /// Projects the joke onto its listable summary.
    pub fn head(&self) -> JokeHead {
        JokeHead {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// Backend-only ownership attribute of a stored joke.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JokeOwner {
    pub jokester_id: UserId,
}

impl JokeOwner {
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.jokester_id == user_id
    }
}

/// A joke row as handed back by a store adapter.
///
/// Rows are untyped on purpose: they are only trusted after passing through
/// [`crate::schema::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct JokeRow(Value);

impl JokeRow {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Returns the row's id when it is present and a string.
    pub fn id(&self) -> Option<&str> {
        self.0.get(ID_FIELD).and_then(Value::as_str)
    }
}

impl From<Value> for JokeRow {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

/// Insert payload for a new joke.
#[derive(Debug, Clone, TypedBuilder)]
pub struct NewJoke {
    #[builder(setter(into))]
    pub id: String,
    #[builder(setter(into))]
    pub name: String,
    #[builder(setter(into))]
    pub content: String,
    pub jokester_id: UserId,
    #[builder(default = Timestamp::now())]
    pub created_at: Timestamp,
}

impl NewJoke {
    /// Renders the payload as the row a store would hand back for it.
    pub fn to_row(&self) -> JokeRow {
        JokeRow::new(json!({
            ID_FIELD: self.id,
            NAME_FIELD: self.name,
            CONTENT_FIELD: self.content,
            JOKESTER_ID_FIELD: self.jokester_id.as_str(),
            CREATED_AT_FIELD: self.created_at.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_rejects_blank() {
        assert!(UserId::new("").is_err());
        assert!(UserId::new("   ").is_err());
        assert_eq!(UserId::new("u1").unwrap().as_str(), "u1");
    }

    #[test]
    fn joke_head_projection() {
        let joke = Joke {
            id: "a".to_string(),
            name: "Foo".to_string(),
            content: "bar".to_string(),
        };
        assert_eq!(
            joke.head(),
            JokeHead {
                id: "a".to_string(),
                name: "Foo".to_string()
            }
        );
    }

    #[test]
    fn new_joke_row_carries_backend_fields() {
        let new = NewJoke::builder()
            .id("a")
            .name("Foo")
            .content("bar")
            .jokester_id(UserId::new("u1").unwrap())
            .build();

        let row = new.to_row();
        assert_eq!(row.id(), Some("a"));
        assert_eq!(row.as_value()[JOKESTER_ID_FIELD], "u1");
        assert!(row.as_value()[CREATED_AT_FIELD].is_string());
    }

    #[test]
    fn owner_check() {
        let owner = JokeOwner {
            jokester_id: UserId::new("u1").unwrap(),
        };
        assert!(owner.is_owned_by(&UserId::new("u1").unwrap()));
        assert!(!owner.is_owned_by(&UserId::new("u2").unwrap()));
    }
}
