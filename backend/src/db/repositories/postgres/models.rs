use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

use super::schema::research_opportunities;
use crate::api::ResearchOpportunity;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = research_opportunities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)] // updated_at is maintained by the database
pub struct OpportunityRow {
    pub opportunity_id: i64,
    pub attributes: Value,
    pub updated_at: DateTime<Utc>,
}

impl From<OpportunityRow> for ResearchOpportunity {
    fn from(row: OpportunityRow) -> Self {
        ResearchOpportunity::from_parts(row.opportunity_id, row.attributes)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = research_opportunities)]
pub struct NewOpportunityRow {
    pub opportunity_id: i64,
    pub attributes: Value,
    pub updated_at: DateTime<Utc>,
}

impl From<&ResearchOpportunity> for NewOpportunityRow {
    fn from(opportunity: &ResearchOpportunity) -> Self {
        Self {
            opportunity_id: opportunity.id.value(),
            attributes: opportunity.attributes_value(),
            updated_at: Utc::now(),
        }
    }
}
