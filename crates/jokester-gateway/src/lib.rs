//! HTTP surface of Jokester.
//!
//! Exposes the joke listing, random pick, single-joke view and the
//! ownership-gated delete action over axum, delegating all joke logic to a
//! [`jokester_service::JokeBook`].

pub mod app;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use auth::HeaderAuthenticator;
pub use state::AppState;
