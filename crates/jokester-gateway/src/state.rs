use std::sync::Arc;

use jokester_core::Authenticator;
use jokester_service::JokeBook;

/// Number of jokes shown by the listing endpoint unless configured otherwise.
pub const DEFAULT_LIST_LIMIT: usize = 5;

#[derive(Clone)]
pub struct AppState {
    jokes: Arc<dyn JokeBook>,
    auth: Arc<dyn Authenticator>,
    list_limit: usize,
}

impl AppState {
    pub fn new(jokes: Arc<dyn JokeBook>, auth: Arc<dyn Authenticator>) -> Self {
        Self {
            jokes,
            auth,
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }

    /// Overrides how many jokes the listing endpoint returns. Zero is ignored.
    pub fn with_list_limit(mut self, list_limit: usize) -> Self {
        if list_limit > 0 {
            self.list_limit = list_limit;
        }
        self
    }

    pub fn jokes(&self) -> &dyn JokeBook {
        self.jokes.as_ref()
    }

    pub fn auth(&self) -> &dyn Authenticator {
        self.auth.as_ref()
    }

    pub fn list_limit(&self) -> usize {
        self.list_limit
    }
}
