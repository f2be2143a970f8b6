//! Public API surface for the research registry backend.
//!
//! This file holds the record types shared by the repository, service and
//! HTTP layers. All types derive Serialize/Deserialize for JSON serialization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Smallest key `/getone` may draw.
pub const MIN_OPPORTUNITY_ID: i64 = 1;

/// Largest key `/getone` may draw.
pub const MAX_OPPORTUNITY_ID: i64 = 9000;

/// Number of records returned by `/getrange` when no `range` is given.
pub const DEFAULT_RANGE: i64 = 10;

/// Research opportunity identifier (database primary key).
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct OpportunityId(pub i64);

impl OpportunityId {
    pub fn new(value: i64) -> Self {
        OpportunityId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// Whether this id lies in the key space `/getone` draws from.
    pub fn is_in_draw_range(&self) -> bool {
        (MIN_OPPORTUNITY_ID..=MAX_OPPORTUNITY_ID).contains(&self.0)
    }
}

impl std::fmt::Display for OpportunityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for OpportunityId {
    fn from(value: i64) -> Self {
        OpportunityId(value)
    }
}

/// A research opportunity record.
///
/// Only the `id` is interpreted by this crate. Every other field is carried
/// through untouched and flattened into the JSON object, so a record
/// serializes as `{"id": 42, "title": "...", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchOpportunity {
    pub id: OpportunityId,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl ResearchOpportunity {
    /// Create a record with no attributes.
    pub fn new(id: impl Into<OpportunityId>) -> Self {
        Self {
            id: id.into(),
            attributes: Map::new(),
        }
    }

    /// Set a single attribute, replacing any previous value.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Look up an attribute by name.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Attributes as a JSON object value (used for JSONB storage).
    pub fn attributes_value(&self) -> Value {
        Value::Object(self.attributes.clone())
    }

    /// Rebuild a record from a stored id and attribute object.
    ///
    /// A stored `id` key inside the attributes is dropped so the column value wins.
    pub fn from_parts(id: i64, attributes: Value) -> Self {
        let mut attributes = match attributes {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        attributes.remove("id");
        Self {
            id: OpportunityId(id),
            attributes,
        }
    }
}
