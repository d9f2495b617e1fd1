use std::sync::Arc;

use crate::config;
use crate::services::{Messages, Projects, Users};
use crate::store::EntityStore;

/// Shared state handed to every request handler.
#[derive(Debug, Clone)]
pub struct App {
    pub config: Arc<config::Server>,
    pub store: Arc<dyn EntityStore>,
}

impl App {
    #[must_use]
    pub fn new(config: config::Server, store: Arc<dyn EntityStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }

    /// In-memory app with the test configuration.
    #[cfg(test)]
    pub(crate) fn new_for_tests() -> Self {
        Self::new(
            config::Server::for_tests(),
            Arc::new(crate::store::MemoryStore::new()),
        )
    }
}

impl App {
    #[must_use]
    pub fn projects(&self) -> Projects<'_> {
        Projects::new(self.store.as_ref())
    }

    #[must_use]
    pub fn users(&self) -> Users<'_> {
        Users::new(self.store.as_ref())
    }

    #[must_use]
    pub fn messages(&self) -> Messages<'_> {
        Messages::new(self.store.as_ref())
    }
}
