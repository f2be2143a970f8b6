//! Key sources for the random single-record lookup.
//!
//! `/getone` does not take a key from the client. It asks an [`IdSource`]
//! for one, which lets tests swap the random draw for a fixed sequence.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::api::{OpportunityId, MAX_OPPORTUNITY_ID, MIN_OPPORTUNITY_ID};

/// Provider of opportunity keys.
///
/// Every returned id lies in `[MIN_OPPORTUNITY_ID, MAX_OPPORTUNITY_ID]`.
pub trait IdSource: Send + Sync {
    fn next_id(&self) -> OpportunityId;
}

fn clamp_to_draw_range(value: i64) -> OpportunityId {
    OpportunityId::new(value.clamp(MIN_OPPORTUNITY_ID, MAX_OPPORTUNITY_ID))
}

/// Unseeded random keys drawn from UUID v4 randomness.
#[cfg(feature = "http-server")]
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdSource;

#[cfg(feature = "http-server")]
impl RandomIdSource {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "http-server")]
impl IdSource for RandomIdSource {
    fn next_id(&self) -> OpportunityId {
        let span = (MAX_OPPORTUNITY_ID - MIN_OPPORTUNITY_ID + 1) as u128;
        let bits = uuid::Uuid::new_v4().as_u128();
        OpportunityId::new(MIN_OPPORTUNITY_ID + (bits % span) as i64)
    }
}

/// Always returns the same key.
#[derive(Debug, Clone, Copy)]
pub struct FixedIdSource {
    id: OpportunityId,
}

impl FixedIdSource {
    /// Values outside the draw range are clamped into it.
    pub fn new(id: i64) -> Self {
        Self {
            id: clamp_to_draw_range(id),
        }
    }
}

impl IdSource for FixedIdSource {
    fn next_id(&self) -> OpportunityId {
        self.id
    }
}

/// Cycles through a list of keys in order.
#[derive(Debug)]
pub struct SequenceIdSource {
    ids: Vec<OpportunityId>,
    cursor: AtomicUsize,
}

impl SequenceIdSource {
    /// An empty list behaves like a fixed source of `MIN_OPPORTUNITY_ID`.
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
        let mut ids: Vec<OpportunityId> = ids.into_iter().map(clamp_to_draw_range).collect();
        if ids.is_empty() {
            ids.push(OpportunityId::new(MIN_OPPORTUNITY_ID));
        }
        Self {
            ids,
            cursor: AtomicUsize::new(0),
        }
    }
}

impl IdSource for SequenceIdSource {
    fn next_id(&self) -> OpportunityId {
        let position = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.ids[position % self.ids.len()]
    }
}
