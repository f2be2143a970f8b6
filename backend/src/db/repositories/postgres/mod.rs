//! Postgres backend built on Diesel.
//!
//! One row per opportunity: the id is the primary key and every other
//! attribute sits in a JSONB column. The migrations under `migrations/` are
//! embedded in the binary and applied when the repository is created.
//!
//! Settings come from `repository.toml` (see [`crate::db::repo_config`]) or
//! from the environment:
//!
//! | Variable | Default |
//! |---|---|
//! | `DATABASE_URL`, else `PG_DATABASE_URL` | required |
//! | `PG_POOL_MAX` | 10 |
//! | `PG_POOL_MIN` | 1 |
//! | `PG_CONN_TIMEOUT_SEC` | 30 |
//! | `PG_IDLE_TIMEOUT_SEC` | 600 |
//! | `PG_MAX_RETRIES` | 3 |
//! | `PG_RETRY_DELAY_MS` | 100 |

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel::upsert::excluded;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::str::FromStr;
use std::time::Duration;
use tokio::task;

use crate::api::{OpportunityId, ResearchOpportunity};
use crate::db::repository::{RepositoryError, RepositoryResult, ResearchRepository};

mod models;
mod schema;

use models::{NewOpportunityRow, OpportunityRow};
use schema::research_opportunities::dsl as opportunities;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Variables checked, in order, for the connection string.
const URL_VARS: [&str; 2] = ["DATABASE_URL", "PG_DATABASE_URL"];

/// Pool and retry settings for [`PostgresRepository`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    pub database_url: String,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
    pub connection_timeout_sec: u64,
    pub idle_timeout_sec: u64,
    /// Replays allowed after the first attempt of an operation.
    pub max_retries: u32,
    /// Wait before the first replay; doubled for each one after it.
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

impl PostgresConfig {
    /// Read the settings listed in the module docs from the environment.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// Fails only when no connection string is present. Numbers that do not
    /// parse keep their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = URL_VARS
            .iter()
            .find_map(|key| lookup(key).filter(|url| !url.trim().is_empty()))
            .ok_or_else(|| format!("{} must be set", URL_VARS.join(" or ")))?;

        let fallback = Self::default();
        Ok(Self {
            database_url,
            max_pool_size: parsed_or(&lookup, "PG_POOL_MAX", fallback.max_pool_size),
            min_pool_size: parsed_or(&lookup, "PG_POOL_MIN", fallback.min_pool_size),
            connection_timeout_sec: parsed_or(
                &lookup,
                "PG_CONN_TIMEOUT_SEC",
                fallback.connection_timeout_sec,
            ),
            idle_timeout_sec: parsed_or(&lookup, "PG_IDLE_TIMEOUT_SEC", fallback.idle_timeout_sec),
            max_retries: parsed_or(&lookup, "PG_MAX_RETRIES", fallback.max_retries),
            retry_delay_ms: parsed_or(&lookup, "PG_RETRY_DELAY_MS", fallback.retry_delay_ms),
        })
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            first_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

fn parsed_or<T, F>(lookup: &F, key: &str, fallback: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(fallback)
}

/// How often and how patiently a failed operation is replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RetryPolicy {
    max_retries: u32,
    first_delay: Duration,
}

impl RetryPolicy {
    /// Pause before replay number `retry` (zero-based).
    fn backoff(&self, retry: u32) -> Duration {
        self.first_delay
            .checked_mul(2u32.saturating_pow(retry))
            .unwrap_or(Duration::MAX)
    }
}

/// Research opportunities stored in Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    retry: RetryPolicy,
}

impl PostgresRepository {
    /// Open the pool and bring the schema up to date.
    ///
    /// Blocks on network I/O; async callers should go through
    /// `RepositoryFactory::create_postgres`.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(ConnectionManager::<PgConnection>::new(&config.database_url))
            .map_err(|e| {
                RepositoryError::connection(e.to_string())
                    .during("create_pool")
                    .with_detail(format!("max_size={}", config.max_pool_size))
            })?;

        let mut conn = pool
            .get()
            .map_err(|e| RepositoryError::from(e).during("run_migrations"))?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map(|versions| versions.len())
            .map_err(|e| {
                RepositoryError::internal(format!("migration failed: {}", e))
                    .during("run_migrations")
            })?;
        if applied > 0 {
            log::info!("Applied {} research registry migrations", applied);
        }
        drop(conn);

        Ok(Self {
            pool,
            retry: config.retry_policy(),
        })
    }

    /// Run `query` on a pooled connection inside the blocking thread pool.
    ///
    /// Retryable failures, whether checking out a connection or running the
    /// query, are replayed with exponential backoff until the policy runs out.
    async fn run<T, F>(&self, operation: &'static str, query: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: Fn(&mut PgConnection) -> QueryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        let policy = self.retry;

        task::spawn_blocking(move || {
            let mut retry = 0;
            loop {
                let outcome = pool
                    .get()
                    .map_err(RepositoryError::from)
                    .and_then(|mut conn| query(&mut conn).map_err(RepositoryError::from));

                match outcome {
                    Err(e) if e.is_retryable() && retry < policy.max_retries => {
                        let pause = policy.backoff(retry);
                        log::warn!("{} failed, retrying in {:?}: {}", operation, pause, e);
                        std::thread::sleep(pause);
                        retry += 1;
                    }
                    other => return other.map_err(|e| e.during(operation)),
                }
            }
        })
        .await
        .map_err(|e| RepositoryError::internal(format!("database worker: {}", e)).during(operation))?
    }
}

#[async_trait]
impl ResearchRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.run("health_check", |conn| {
            sql_query("SELECT 1").execute(conn).map(|_| true)
        })
        .await
    }

    async fn get_range(&self, count: usize) -> RepositoryResult<Vec<ResearchOpportunity>> {
        let limit = i64::try_from(count).unwrap_or(i64::MAX);
        let rows = self
            .run("get_range", move |conn| {
                opportunities::research_opportunities
                    .select(OpportunityRow::as_select())
                    .order(opportunities::opportunity_id.asc())
                    .limit(limit)
                    .load::<OpportunityRow>(conn)
            })
            .await?;

        Ok(rows.into_iter().map(ResearchOpportunity::from).collect())
    }

    async fn get_research_opportunity(
        &self,
        id: OpportunityId,
    ) -> RepositoryResult<ResearchOpportunity> {
        let row = self
            .run("get_research_opportunity", move |conn| {
                opportunities::research_opportunities
                    .find(id.value())
                    .select(OpportunityRow::as_select())
                    .first::<OpportunityRow>(conn)
                    .optional()
            })
            .await?;

        row.map(ResearchOpportunity::from)
            .ok_or_else(|| RepositoryError::not_found(id).during("get_research_opportunity"))
    }

    async fn upsert_research_opportunity(
        &self,
        opportunity: &ResearchOpportunity,
    ) -> RepositoryResult<ResearchOpportunity> {
        let row = NewOpportunityRow::from(opportunity);
        let stored = self
            .run("upsert_research_opportunity", move |conn| {
                diesel::insert_into(opportunities::research_opportunities)
                    .values(&row)
                    .on_conflict(opportunities::opportunity_id)
                    .do_update()
                    .set((
                        opportunities::attributes.eq(excluded(opportunities::attributes)),
                        opportunities::updated_at.eq(excluded(opportunities::updated_at)),
                    ))
                    .returning(OpportunityRow::as_returning())
                    .get_result::<OpportunityRow>(conn)
            })
            .await?;

        Ok(ResearchOpportunity::from(stored))
    }

    async fn delete_research_opportunity(&self, id: OpportunityId) -> RepositoryResult<bool> {
        let deleted = self
            .run("delete_research_opportunity", move |conn| {
                diesel::delete(opportunities::research_opportunities.find(id.value())).execute(conn)
            })
            .await?;
        Ok(deleted > 0)
    }

    async fn count(&self) -> RepositoryResult<usize> {
        let total: i64 = self
            .run("count", |conn| {
                opportunities::research_opportunities.count().get_result(conn)
            })
            .await?;
        Ok(usize::try_from(total).unwrap_or(0))
    }
}
