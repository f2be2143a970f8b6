//! Example demonstrating repository pattern usage.
//!
//! Run with:
//! ```bash
//! cargo run --example repository_usage
//! ```

use std::sync::Arc;

use research_registry::api::{OpportunityId, ResearchOpportunity};
use research_registry::db::{services, RepositoryFactory, ResearchRepository};

/// Example 1: Repository from environment configuration
async fn example_from_env() -> Result<Arc<dyn ResearchRepository>, Box<dyn std::error::Error>> {
    println!("=== Example 1: Repository from environment ===");

    let repo = RepositoryFactory::from_env().await?;
    println!("Repository healthy: {}", services::health_check(repo.as_ref()).await?);
    println!("Stored records: {}", repo.count().await?);

    Ok(repo)
}

/// Example 2: Seeding and reading through the service layer
async fn example_services(repo: &dyn ResearchRepository) -> Result<(), Box<dyn std::error::Error>> {
    println!("\n=== Example 2: Service layer ===");

    for id in 1..=3 {
        let record = ResearchOpportunity::new(id)
            .with_attribute("title", format!("Example study {}", id))
            .with_attribute("remote", id % 2 == 0);
        services::store_research_opportunity(repo, &record).await?;
    }

    for record in services::get_range(repo, 2).await? {
        println!("  - {}", serde_json::to_string(&record)?);
    }

    match services::get_research_opportunity(repo, OpportunityId::new(99)).await {
        Ok(record) => println!("Unexpected record: {:?}", record),
        Err(e) if e.is_not_found() => println!("Record 99 is missing, as expected: {}", e),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let repo = example_from_env().await?;
    example_services(repo.as_ref()).await?;
    Ok(())
}
