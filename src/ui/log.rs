//! In-simulation action log shown alongside the agents

use crate::core::types::SimTime;
use serde::Serialize;
use std::collections::VecDeque;

/// Maximum action log entries to keep
pub const MAX_LOG_ENTRIES: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogCategory {
    Move,
    Arrival,
    Hunt,
    Combat,
    Death,
    Warning,
    System,
    Thought,
    Herd,
    Birth,
}

/// An entry in the action log
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub time: SimTime,
    pub message: String,
    pub category: LogCategory,
    /// Optional longer description for a detail view
    pub detail: Option<String>,
}

/// Bounded log; the oldest entry is dropped once full
#[derive(Debug, Clone)]
pub struct ActionLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::new(MAX_LOG_ENTRIES)
    }
}

impl ActionLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn add(&mut self, time: SimTime, message: impl Into<String>, category: LogCategory) {
        self.push(time, message.into(), category, None);
    }

    pub fn add_detailed(
        &mut self,
        time: SimTime,
        message: impl Into<String>,
        category: LogCategory,
        detail: impl Into<String>,
    ) {
        self.push(time, message.into(), category, Some(detail.into()));
    }

    fn push(&mut self, time: SimTime, message: String, category: LogCategory, detail: Option<String>) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            time,
            message,
            category,
            detail,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Most recent `n` entries, oldest first
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().skip(self.entries.len().saturating_sub(n))
    }

    pub fn count(&self, category: LogCategory) -> usize {
        self.entries.iter().filter(|e| e.category == category).count()
    }
}
