//! In-memory repository implementation.
//!
//! Records live in a `BTreeMap` keyed by id, so range reads come back in
//! ascending id order without sorting. Used for local development and tests.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::api::{OpportunityId, ResearchOpportunity};
use crate::db::repository::{RepositoryError, RepositoryResult, ResearchRepository};

/// In-memory research opportunity store.
#[derive(Debug, Default)]
pub struct LocalRepository {
    records: RwLock<BTreeMap<i64, ResearchOpportunity>>,
}

impl LocalRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-populated with `records`.
    ///
    /// Later records replace earlier ones that share an id.
    pub fn with_records(records: impl IntoIterator<Item = ResearchOpportunity>) -> Self {
        let map = records
            .into_iter()
            .map(|record| (record.id.value(), record))
            .collect();
        Self {
            records: RwLock::new(map),
        }
    }

    /// Load a repository from a JSON fixture file holding an array of records.
    pub fn from_fixture<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        let records = load_fixture(path.as_ref())?;
        log::info!(
            "Loaded {} research opportunities from {}",
            records.len(),
            path.as_ref().display()
        );
        Ok(Self::with_records(records))
    }
}

/// Parse a JSON fixture file into records.
pub fn load_fixture(path: &Path) -> RepositoryResult<Vec<ResearchOpportunity>> {
    let content = fs::read_to_string(path).map_err(|e| {
        RepositoryError::configuration(format!("cannot read fixture: {}", e))
            .during("load_fixture")
            .with_detail(path.display().to_string())
    })?;

    serde_json::from_str(&content).map_err(|e| {
        RepositoryError::invalid(format!("fixture is not an array of records: {}", e))
            .during("load_fixture")
            .with_detail(path.display().to_string())
    })
}

#[async_trait]
impl ResearchRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }

    async fn get_range(&self, count: usize) -> RepositoryResult<Vec<ResearchOpportunity>> {
        let records = self.records.read();
        Ok(records.values().take(count).cloned().collect())
    }

    async fn get_research_opportunity(
        &self,
        id: OpportunityId,
    ) -> RepositoryResult<ResearchOpportunity> {
        self.records
            .read()
            .get(&id.value())
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(id).during("get_research_opportunity"))
    }

    async fn upsert_research_opportunity(
        &self,
        opportunity: &ResearchOpportunity,
    ) -> RepositoryResult<ResearchOpportunity> {
        self.records
            .write()
            .insert(opportunity.id.value(), opportunity.clone());
        Ok(opportunity.clone())
    }

    async fn delete_research_opportunity(&self, id: OpportunityId) -> RepositoryResult<bool> {
        Ok(self.records.write().remove(&id.value()).is_some())
    }

    async fn count(&self) -> RepositoryResult<usize> {
        Ok(self.records.read().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn seeded(ids: &[i64]) -> LocalRepository {
        LocalRepository::with_records(
            ids.iter()
                .map(|id| ResearchOpportunity::new(*id).with_attribute("title", format!("Study {}", id))),
        )
    }

    #[tokio::test]
    async fn test_get_range_is_ordered_and_bounded() {
        let repo = seeded(&[30, 10, 20, 40]);

        let records = repo.get_range(3).await.unwrap();
        let ids: Vec<i64> = records.iter().map(|r| r.id.value()).collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }

    #[tokio::test]
    async fn test_get_range_larger_than_store() {
        let repo = seeded(&[1, 2]);
        assert_eq!(repo.get_range(100).await.unwrap().len(), 2);
        assert!(repo.get_range(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let repo = seeded(&[1]);
        let err = repo
            .get_research_opportunity(OpportunityId::new(2))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.context().opportunity, Some(OpportunityId::new(2)));
        assert_eq!(err.context().operation, Some("get_research_opportunity"));
    }

    #[tokio::test]
    async fn test_upsert_replaces_and_delete_removes() {
        let repo = seeded(&[1]);
        let updated = ResearchOpportunity::new(1).with_attribute("title", "Renamed");
        repo.upsert_research_opportunity(&updated).await.unwrap();

        let fetched = repo
            .get_research_opportunity(OpportunityId::new(1))
            .await
            .unwrap();
        assert_eq!(fetched, updated);
        assert_eq!(repo.count().await.unwrap(), 1);

        assert!(repo
            .delete_research_opportunity(OpportunityId::new(1))
            .await
            .unwrap());
        assert!(!repo
            .delete_research_opportunity(OpportunityId::new(1))
            .await
            .unwrap());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_from_fixture() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": 2, "title": "b"}}, {{"id": 1, "title": "a"}}]"#
        )
        .unwrap();

        let repo = LocalRepository::from_fixture(file.path()).unwrap();
        let records = repo.get_range(10).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id.value(), 1);
    }

    #[test]
    fn test_from_fixture_rejects_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = LocalRepository::from_fixture(file.path()).unwrap_err();
        assert!(matches!(err, RepositoryError::Invalid { .. }));
    }

    #[test]
    fn test_from_fixture_missing_file() {
        let err = LocalRepository::from_fixture("/nonexistent/fixture.json").unwrap_err();
        assert!(matches!(err, RepositoryError::Configuration { .. }));
        assert_eq!(
            err.context().detail.as_deref(),
            Some("/nonexistent/fixture.json")
        );
    }
}
