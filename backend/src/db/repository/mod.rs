//! Repository trait definitions and error types.

pub mod error;
pub mod opportunity;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use opportunity::ResearchRepository;
