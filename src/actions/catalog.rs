//! Action and activity definitions

use crate::core::error::{Result, SimError};
use serde::{Deserialize, Serialize};

/// A discrete decision outcome.
///
/// Declaration order is the tie-break order of the weighted heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Hunt,
    Escape,
    Eat,
    Drink,
    Rest,
    Routine,
    Explore,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::Hunt,
        Action::Escape,
        Action::Eat,
        Action::Drink,
        Action::Rest,
        Action::Routine,
        Action::Explore,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Action::Hunt => "hunt",
            Action::Escape => "escape",
            Action::Eat => "eat",
            Action::Drink => "drink",
            Action::Rest => "rest",
            Action::Routine => "routine",
            Action::Explore => "explore",
        }
    }

    /// Parse a canonical tag, ignoring case and surrounding whitespace
    pub fn from_tag(tag: &str) -> Result<Self> {
        let needle = tag.trim();
        Action::ALL
            .into_iter()
            .find(|a| a.tag().eq_ignore_ascii_case(needle))
            .ok_or_else(|| SimError::InvalidAction(tag.to_string()))
    }

    /// Activity an agent enters when this action is dispatched
    pub fn activity(&self) -> Activity {
        match self {
            Action::Hunt => Activity::Hunting,
            Action::Escape => Activity::Escaping,
            Action::Eat => Activity::Eating,
            Action::Drink => Activity::Drinking,
            Action::Rest => Activity::Resting,
            Action::Routine => Activity::Routine,
            Action::Explore => Activity::Exploring,
        }
    }

    /// Display thought used when nothing more specific was said
    pub fn default_thought(&self) -> &'static str {
        match self {
            Action::Hunt => "Getting ready to hunt...",
            Action::Escape => "Looking for somewhere safe...",
            Action::Eat => "Looking for food...",
            Action::Drink => "Looking for water...",
            Action::Rest => "Taking a rest...",
            Action::Routine => "Following my daily routine...",
            Action::Explore => "Exploring somewhere new...",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.tag())
    }
}

/// What an agent is currently doing, shown to the UI and used for speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    #[default]
    Idle,
    Hunting,
    Escaping,
    Eating,
    Drinking,
    Resting,
    Routine,
    Exploring,
    Dead,
}

impl Activity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Activity::Idle => "idle",
            Activity::Hunting => "hunting",
            Activity::Escaping => "escaping",
            Activity::Eating => "eating",
            Activity::Drinking => "drinking",
            Activity::Resting => "resting",
            Activity::Routine => "routine",
            Activity::Exploring => "exploring",
            Activity::Dead => "dead",
        }
    }
}
