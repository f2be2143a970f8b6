//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for the actual lookup.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};

use super::dto::{HealthResponse, RangeQuery};
use super::error::AppError;
use super::state::AppState;
use crate::api::ResearchOpportunity;
use crate::db::services as db_services;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the repository is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
        timestamp: chrono::Utc::now(),
    }))
}

// =============================================================================
// Research Opportunities
// =============================================================================

/// GET /getrange?range=N
///
/// Return up to `range` records (default 10) in the order the repository yields them.
/// An empty `range=` counts as absent; anything non-numeric is a JSON 400.
pub async fn get_range(
    State(state): State<AppState>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> HandlerResult<Vec<ResearchOpportunity>> {
    let Query(query) = query.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let range = query.effective_range();
    if range < 1 {
        return Err(AppError::BadRequest(format!(
            "range must be a positive integer, got {}",
            range
        )));
    }

    let count = usize::try_from(range).unwrap_or(usize::MAX);
    let records = db_services::get_range(state.repository.as_ref(), count).await?;
    tracing::debug!(range, returned = records.len(), "served /getrange");

    Ok(Json(records))
}

/// GET /getone
///
/// Return the record under a key drawn from the injected id source.
pub async fn get_one(State(state): State<AppState>) -> HandlerResult<ResearchOpportunity> {
    let id = state.id_source.next_id();
    tracing::debug!(%id, "drew research opportunity key");

    let record = db_services::get_research_opportunity(state.repository.as_ref(), id).await?;
    Ok(Json(record))
}
