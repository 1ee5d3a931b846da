//! Recent thoughts kept for display and prompts

use crate::core::types::SimTime;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Thoughts retained per agent
pub const THOUGHT_CAPACITY: usize = 10;

/// Where a thought came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThoughtSource {
    /// External decision provider
    Provider,
    /// Local weighted heuristic
    Heuristic,
    /// Hard-wired reaction such as the escape reflex or arrival checks
    Reflex,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thought {
    pub time: SimTime,
    pub text: String,
    pub source: ThoughtSource,
}

/// Bounded log of recent thoughts, oldest dropped first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThoughtLog {
    thoughts: VecDeque<Thought>,
    capacity: usize,
}

impl Default for ThoughtLog {
    fn default() -> Self {
        Self::new(THOUGHT_CAPACITY)
    }
}

impl ThoughtLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            thoughts: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, time: SimTime, text: impl Into<String>, source: ThoughtSource) {
        if self.thoughts.len() >= self.capacity {
            self.thoughts.pop_front();
        }
        self.thoughts.push_back(Thought {
            time,
            text: text.into(),
            source,
        });
    }

    pub fn latest(&self) -> Option<&Thought> {
        self.thoughts.back()
    }

    pub fn len(&self) -> usize {
        self.thoughts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thoughts.is_empty()
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Thought> {
        self.thoughts.iter()
    }
}
