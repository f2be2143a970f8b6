//! Database module for research opportunity storage.
//!
//! This module provides abstractions for storage via the Repository pattern,
//! allowing different backends to be swapped easily.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (REST API)                           │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs)                            │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Trait (repository/) - Abstract Interface    │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴──────────────┐
//!     │  LocalRepository (in-memory) │  PostgresRepository (diesel)
//!     └──────────────────────────────┘
//! ```
//!
//! # Recommended Usage
//!
//! ```ignore
//! use research_registry::db::{services, RepositoryFactory};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = RepositoryFactory::from_env().await?;
//!     let records = services::get_range(repo.as_ref(), 10).await?;
//!     Ok(())
//! }
//! ```

// Feature flag priority: postgres > local
#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;

#[cfg(feature = "postgres-repo")]
pub use repositories::postgres::PostgresConfig;

pub use services::{
    delete_research_opportunity, get_range, get_research_opportunity, health_check,
    seed_from_fixture, store_research_opportunity,
};

pub use repo_config::RepositoryConfig;

pub use factory::{RepositoryFactory, RepositoryType};
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{
    ErrorContext, RepositoryError, RepositoryResult, ResearchRepository,
};

use std::sync::{Arc, OnceLock};

/// Global repository instance initialized once per process.
static REPOSITORY: OnceLock<Arc<dyn ResearchRepository>> = OnceLock::new();

/// Initialize the global repository singleton.
///
/// Uses `repository.toml` (or `$REPOSITORY_CONFIG`) when one can be found,
/// otherwise falls back to the environment.
pub async fn init_repository() -> RepositoryResult<Arc<dyn ResearchRepository>> {
    if let Some(repo) = REPOSITORY.get() {
        return Ok(Arc::clone(repo));
    }

    // An explicitly named config file must load; the search path is best-effort.
    let explicit = std::env::var(repo_config::CONFIG_PATH_ENV).is_ok();
    let repo = match RepositoryConfig::from_default_location() {
        Err(e) if explicit => return Err(e),
        Ok(config) => {
            log::info!("Using repository configuration file");
            RepositoryFactory::from_repository_config(&config).await?
        }
        Err(e) => {
            log::debug!("No repository config file ({}), using environment", e);
            RepositoryFactory::from_env().await?
        }
    };

    let _ = REPOSITORY.set(repo);
    get_repository().map(Arc::clone)
}

/// Get a reference to the initialized repository.
pub fn get_repository() -> RepositoryResult<&'static Arc<dyn ResearchRepository>> {
    REPOSITORY.get().ok_or_else(|| {
        RepositoryError::configuration("Repository not initialized. Call init_repository() first.")
    })
}
