mod health;
mod joke;

pub use health::HealthResponse;
pub use joke::{JokeActionForm, JokeListResponse, RandomJokeResponse, DELETE_INTENT};
