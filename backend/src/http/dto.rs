//! Data Transfer Objects for the HTTP API.

use serde::{de, Deserialize, Deserializer, Serialize};

pub use crate::api::ResearchOpportunity;
use crate::api::DEFAULT_RANGE;

/// Query parameters for `/getrange`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RangeQuery {
    /// Maximum number of records to return (default: 10)
    #[serde(default, deserialize_with = "blank_as_none")]
    pub range: Option<i64>,
}

/// `?range=` carries an empty string; treat it like an absent parameter.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().map(Some).map_err(|_| {
            de::Error::custom(format!("range must be an integer, got {:?}", raw))
        }),
        _ => Ok(None),
    }
}

impl RangeQuery {
    /// Requested range, falling back to the default.
    pub fn effective_range(&self) -> i64 {
        self.range.unwrap_or(DEFAULT_RANGE)
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Crate version
    pub version: String,
    /// Repository connection status
    pub database: String,
    /// Time the check ran
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
