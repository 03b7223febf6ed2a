mod health;
mod jokes;

pub use health::health_handler;
pub use jokes::{
    get_joke_handler, joke_action_handler, list_jokes_handler, random_joke_handler,
    RANDOM_JOKE_PATH,
};
