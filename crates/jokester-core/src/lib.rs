//! Core types and traits for Jokester.
//!
//! This crate provides the joke data model, the runtime shape validator that
//! guards every record read from a store, the store contracts implemented by
//! `jokester-storage`, and the identity collaborator contract consumed by the
//! gateway.

pub mod auth;
pub mod error;
pub mod model;
pub mod repository;
pub mod schema;

pub use auth::{AuthError, Authenticator};
pub use error::{CoreError, StorageError};
pub use model::{Joke, JokeHead, JokeHeadList, JokeOwner, JokeRow, NewJoke, User, UserId};
pub use repository::{ReadRepository, Repository};
pub use schema::{validate, Issue, IssueKind, Shape, ValidationError};
