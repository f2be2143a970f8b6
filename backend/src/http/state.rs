//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::ResearchRepository;
use crate::services::{IdSource, RandomIdSource};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for record lookups
    pub repository: Arc<dyn ResearchRepository>,
    /// Key source for `/getone`
    pub id_source: Arc<dyn IdSource>,
}

impl AppState {
    /// Create application state with an unseeded random key source.
    pub fn new(repository: Arc<dyn ResearchRepository>) -> Self {
        Self::with_id_source(repository, Arc::new(RandomIdSource::new()))
    }

    /// Create application state with an explicit key source.
    pub fn with_id_source(
        repository: Arc<dyn ResearchRepository>,
        id_source: Arc<dyn IdSource>,
    ) -> Self {
        Self {
            repository,
            id_source,
        }
    }
}
