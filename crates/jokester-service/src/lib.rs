//! Joke access service.
//!
//! [`JokeService`] wraps a store adapter and is the only place rows are turned
//! into validated jokes. It implements the [`JokeBook`] trait consumed by the
//! gateway.

pub mod error;
pub mod jokebook;
pub mod random;
pub mod service;

pub use error::{JokeError, Result};
pub use jokebook::{JokeBook, JokeView};
pub use random::{OffsetPicker, ThreadRngPicker};
pub use service::JokeService;
