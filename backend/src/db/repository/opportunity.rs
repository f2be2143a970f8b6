//! Research opportunity repository trait.
//!
//! This trait defines the lookup and storage operations the service layer
//! delegates to. Backends decide where the records actually live.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{OpportunityId, ResearchOpportunity};

/// Repository trait for research opportunity records.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait ResearchRepository: Send + Sync {
    /// Check that the backing store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Fetch up to `count` records, ordered by ascending id.
    ///
    /// # Arguments
    /// * `count` - Maximum number of records to return
    ///
    /// # Returns
    /// * `Ok(Vec<ResearchOpportunity>)` - At most `count` records
    /// * `Err(RepositoryError)` - If the operation fails
    async fn get_range(&self, count: usize) -> RepositoryResult<Vec<ResearchOpportunity>>;

    /// Fetch a single record by id.
    ///
    /// # Returns
    /// * `Ok(ResearchOpportunity)` - The stored record
    /// * `Err(RepositoryError::NotFound)` - If no record has this id
    async fn get_research_opportunity(
        &self,
        id: OpportunityId,
    ) -> RepositoryResult<ResearchOpportunity>;

    /// Insert a record, replacing any existing record with the same id.
    async fn upsert_research_opportunity(
        &self,
        opportunity: &ResearchOpportunity,
    ) -> RepositoryResult<ResearchOpportunity>;

    /// Delete a record by id.
    ///
    /// # Returns
    /// * `Ok(true)` - A record was removed
    /// * `Ok(false)` - No record had this id
    async fn delete_research_opportunity(&self, id: OpportunityId) -> RepositoryResult<bool>;

    /// Number of stored records.
    async fn count(&self) -> RepositoryResult<usize>;
}
