//! Free-text persona plus numeric trait weights

use serde::{Deserialize, Serialize};

/// Trait weights (0.0 to 1.0)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Traits {
    #[serde(default = "half")]
    pub aggression: f32,
    /// How active the animal is
    #[serde(default = "half")]
    pub energy: f32,
    #[serde(default = "half")]
    pub sociability: f32,
    #[serde(default = "half")]
    pub intelligence: f32,
    #[serde(default = "half")]
    pub leadership: f32,
}

fn half() -> f32 {
    0.5
}

impl Default for Traits {
    fn default() -> Self {
        Self {
            aggression: 0.5,
            energy: 0.5,
            sociability: 0.5,
            intelligence: 0.5,
            leadership: 0.5,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Personality {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub traits: Traits,
}

impl Personality {
    pub fn new(description: impl Into<String>, traits: Traits) -> Self {
        Self {
            description: description.into(),
            traits,
        }
    }

    /// Traits as (name, value) pairs for prompts and display
    pub fn trait_pairs(&self) -> [(&'static str, f32); 5] {
        [
            ("aggression", self.traits.aggression),
            ("energy", self.traits.energy),
            ("sociability", self.traits.sociability),
            ("intelligence", self.traits.intelligence),
            ("leadership", self.traits.leadership),
        ]
    }
}
