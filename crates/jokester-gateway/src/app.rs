use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    get_joke_handler, health_handler, joke_action_handler, list_jokes_handler,
    random_joke_handler, RANDOM_JOKE_PATH,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/jokes", get(list_jokes_handler))
            .route(RANDOM_JOKE_PATH, get(random_joke_handler))
            .route(
                "/jokes/{joke_id}",
                get(get_joke_handler).post(joke_action_handler),
            )
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
