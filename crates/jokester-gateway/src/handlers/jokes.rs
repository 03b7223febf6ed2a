use crate::error::{AppError, Result};
use crate::model::{JokeActionForm, JokeListResponse, RandomJokeResponse};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::Redirect;
use axum::{Form, Json};
use http::{HeaderMap, Uri};
use jokester_core::AuthError;
use jokester_service::{JokeError, JokeView};
use tracing::debug;

pub const NOT_FOUND_MESSAGE: &str = "What a joke! Not found";
pub const NO_RANDOM_JOKE_MESSAGE: &str = "No random joke found";
pub const DELETE_MISSING_MESSAGE: &str = "Can't delete what does not exist";
pub const NOT_OWNER_MESSAGE: &str = "Pssh, nice try. That's not your joke";
pub const UNSUPPORTED_INTENT_MESSAGE: &str = "Unsupported form intent";

/// Where a caller lands after deleting a joke.
pub const LISTING_PATH: &str = "/jokes";
/// Kept outside `/jokes/` so that every joke id stays addressable.
pub const RANDOM_JOKE_PATH: &str = "/random-joke";

pub async fn list_jokes_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<JokeListResponse>> {
    let joke_list_items = state.jokes().list_recent(state.list_limit()).await?;
    let user = state.auth().get_user(&headers).await?;

    Ok(Json(JokeListResponse {
        user,
        joke_list_items,
    }))
}

pub async fn random_joke_handler(
    State(state): State<AppState>,
) -> Result<Json<RandomJokeResponse>> {
    match state.jokes().random().await {
        Ok(random_joke) => Ok(Json(RandomJokeResponse { random_joke })),
        Err(JokeError::EmptyCollection) => Err(AppError::NotFound(NO_RANDOM_JOKE_MESSAGE)),
        Err(err) => Err(err.into()),
    }
}

pub async fn get_joke_handler(
    Path(joke_id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<JokeView>> {
    let viewer = state.auth().get_user_id(&headers).await?;

    match state.jokes().find(&joke_id, viewer.as_ref()).await {
        Ok(view) => Ok(Json(view)),
        Err(JokeError::NotFound(_)) => Err(AppError::NotFound(NOT_FOUND_MESSAGE)),
        Err(err) => Err(err.into()),
    }
}

/// Handles form submissions against a single joke. Only the delete intent is
/// supported.
pub async fn joke_action_handler(
    Path(joke_id): Path<String>,
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    Form(form): Form<JokeActionForm>,
) -> Result<Redirect> {
    if !form.is_delete() {
        debug!(joke_id = %joke_id, method = ?form.method, "ignoring unsupported form intent");
        return Err(AppError::BadRequest(UNSUPPORTED_INTENT_MESSAGE));
    }

    let login_required = || AppError::LoginRequired {
        redirect_to: uri.path().to_string(),
    };

    let user_id = match state.auth().require_user_id(&headers).await {
        Ok(user_id) => user_id,
        Err(AuthError::Unauthenticated) => return Err(login_required()),
        Err(err) => return Err(err.into()),
    };

    match state.jokes().delete(&joke_id, Some(&user_id)).await {
        Ok(()) => Ok(Redirect::to(LISTING_PATH)),
        Err(JokeError::NotFound(_)) => Err(AppError::NotFound(DELETE_MISSING_MESSAGE)),
        Err(JokeError::Forbidden { .. }) => Err(AppError::NotOwner(NOT_OWNER_MESSAGE)),
        Err(JokeError::Unauthenticated) => Err(login_required()),
        Err(err) => Err(err.into()),
    }
}
