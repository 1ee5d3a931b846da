//! Per-agent relationship store
//!
//! Every live pair gets a record at spawn time. A record is removed from
//! every survivor when either party dies.

use crate::core::types::{AgentId, SimTime};
use crate::entity::species::Species;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Upper bound of the random familiarity assigned at first meeting
pub const MAX_INITIAL_FAMILIARITY: f32 = 0.3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    /// 0.0 to ~0.3 at creation, grows with interaction
    pub familiarity: f32,
    /// 0.0 = hostile, 1.0 = close
    pub affinity: f32,
    pub last_interaction: SimTime,
    pub interaction_count: u32,
}

impl Relationship {
    pub fn new(familiarity: f32, affinity: f32, now: SimTime) -> Self {
        Self {
            familiarity,
            affinity,
            last_interaction: now,
            interaction_count: 0,
        }
    }

    pub fn record_interaction(&mut self, now: SimTime) {
        self.last_interaction = now;
        self.interaction_count += 1;
        self.familiarity = (self.familiarity + 0.05).min(1.0);
    }
}

/// Initial affinity of `me` toward `other`
pub fn initial_affinity(me: Species, other: Species) -> f32 {
    if me.preys_on(other) {
        0.2
    } else if other.preys_on(me) {
        0.1
    } else if me == other {
        0.8
    } else {
        0.5
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Relationships {
    entries: AHashMap<AgentId, Relationship>,
}

impl Relationships {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, other: AgentId, relationship: Relationship) {
        self.entries.insert(other, relationship);
    }

    pub fn get(&self, other: AgentId) -> Option<&Relationship> {
        self.entries.get(&other)
    }

    pub fn get_mut(&mut self, other: AgentId) -> Option<&mut Relationship> {
        self.entries.get_mut(&other)
    }

    pub fn remove(&mut self, other: AgentId) -> Option<Relationship> {
        self.entries.remove(&other)
    }

    pub fn contains(&self, other: AgentId) -> bool {
        self.entries.contains_key(&other)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AgentId, &Relationship)> {
        self.entries.iter()
    }
}
