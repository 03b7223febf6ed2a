use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use jokester_core::AuthError;
use jokester_service::JokeError;
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Where anonymous callers are sent to sign in.
pub const LOGIN_PATH: &str = "/login";

const INTERNAL_MESSAGE: &str = "Unexpected server error";

/// Outcomes the gateway renders instead of a successful response.
///
/// Handlers pick the endpoint-specific variant for every error they expect;
/// everything else converts into [`AppError::Unhandled`].
#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(&'static str),
    /// Authenticated but not allowed. Rendered as 401, not 403.
    #[error("not the owner: {0}")]
    NotOwner(&'static str),
    #[error("bad request: {0}")]
    BadRequest(&'static str),
    #[error("login required to access {redirect_to}")]
    LoginRequired { redirect_to: String },
    #[error("unhandled error: {0}")]
    Unhandled(String),
}

impl AppError {
    fn login_location(redirect_to: &str) -> String {
        match serde_urlencoded::to_string([("redirectTo", redirect_to)]) {
            Ok(query) => format!("{LOGIN_PATH}?{query}"),
            Err(_) => LOGIN_PATH.to_string(),
        }
    }
}

impl From<JokeError> for AppError {
    fn from(err: JokeError) -> Self {
        AppError::Unhandled(err.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Unhandled(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message).into_response(),
            AppError::NotOwner(message) => (StatusCode::UNAUTHORIZED, message).into_response(),
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            AppError::LoginRequired { redirect_to } => {
                Redirect::to(&Self::login_location(&redirect_to)).into_response()
            }
            AppError::Unhandled(message) => {
                error!(error = %message, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE).into_response()
            }
        }
    }
}
