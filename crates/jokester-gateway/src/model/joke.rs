use jokester_core::{Joke, JokeHeadList, User};
use serde::{Deserialize, Serialize};

/// Form value of `_method` that asks for a delete.
pub const DELETE_INTENT: &str = "delete";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JokeListResponse {
    pub user: Option<User>,
    pub joke_list_items: JokeHeadList,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomJokeResponse {
    pub random_joke: Joke,
}

/// Body of a form submitted against a single joke.
#[derive(Debug, Deserialize)]
pub struct JokeActionForm {
    #[serde(rename = "_method")]
    pub method: Option<String>,
}

impl JokeActionForm {
    pub fn is_delete(&self) -> bool {
        self.method.as_deref() == Some(DELETE_INTENT)
    }
}
