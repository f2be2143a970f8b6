//! Service layer over the research repository.
//!
//! These functions are what the HTTP layer calls. They work with any
//! `ResearchRepository` implementation and add logging and input checks
//! that do not belong to a particular backend.

use std::path::Path;

use super::repositories::local::load_fixture;
use super::repository::{RepositoryError, RepositoryResult, ResearchRepository};
use crate::api::{OpportunityId, ResearchOpportunity};

/// Check whether the repository backend is reachable.
pub async fn health_check<R: ResearchRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

/// Fetch up to `count` research opportunities in ascending id order.
pub async fn get_range<R: ResearchRepository + ?Sized>(
    repo: &R,
    count: usize,
) -> RepositoryResult<Vec<ResearchOpportunity>> {
    log::debug!("Fetching up to {} research opportunities", count);
    let records = repo.get_range(count).await?;
    log::debug!("Fetched {} research opportunities", records.len());
    Ok(records)
}

/// Fetch a single research opportunity by id.
pub async fn get_research_opportunity<R: ResearchRepository + ?Sized>(
    repo: &R,
    id: OpportunityId,
) -> RepositoryResult<ResearchOpportunity> {
    log::debug!("Fetching research opportunity {}", id);
    repo.get_research_opportunity(id).await
}

/// Insert or replace a research opportunity.
///
/// Ids must be positive.
pub async fn store_research_opportunity<R: ResearchRepository + ?Sized>(
    repo: &R,
    opportunity: &ResearchOpportunity,
) -> RepositoryResult<ResearchOpportunity> {
    if opportunity.id.value() < 1 {
        return Err(RepositoryError::invalid(format!(
            "id must be positive, got {}",
            opportunity.id
        ))
        .during("store_research_opportunity")
        .for_opportunity(opportunity.id));
    }
    repo.upsert_research_opportunity(opportunity).await
}

/// Delete a research opportunity. Returns whether a record was removed.
pub async fn delete_research_opportunity<R: ResearchRepository + ?Sized>(
    repo: &R,
    id: OpportunityId,
) -> RepositoryResult<bool> {
    let removed = repo.delete_research_opportunity(id).await?;
    if removed {
        log::info!("Deleted research opportunity {}", id);
    }
    Ok(removed)
}

/// Load records from a JSON fixture file into the repository.
///
/// Returns the number of records stored.
pub async fn seed_from_fixture<R: ResearchRepository + ?Sized, P: AsRef<Path>>(
    repo: &R,
    path: P,
) -> RepositoryResult<usize> {
    let records = load_fixture(path.as_ref())?;
    for record in &records {
        store_research_opportunity(repo, record).await?;
    }
    log::info!(
        "Seeded {} research opportunities from {}",
        records.len(),
        path.as_ref().display()
    );
    Ok(records.len())
}
