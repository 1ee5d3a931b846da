//! Starting roster loaded from TOML
//!
//! ```toml
//! [[agent]]
//! name = "Leo"
//! species = "lion"
//! age = 8
//! gender = "male"
//! hp = 100
//! max_hp = 100
//!
//! [agent.personality]
//! description = "Pride leader"
//!
//! [agent.routine]
//! morning = ["Lowland", "Forest"]
//! ```

use crate::core::calendar::TimePeriod;
use crate::core::error::{Result, SimError};
use crate::core::types::Gender;
use crate::entity::personality::Personality;
use crate::entity::species::Species;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Place names an agent visits in each period of the day
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyRoutine {
    #[serde(default)]
    pub morning: Vec<String>,
    #[serde(default)]
    pub afternoon: Vec<String>,
    #[serde(default)]
    pub evening: Vec<String>,
    #[serde(default)]
    pub night: Vec<String>,
}

impl DailyRoutine {
    pub fn places(&self, period: TimePeriod) -> &[String] {
        match period {
            TimePeriod::Morning => &self.morning,
            TimePeriod::Afternoon => &self.afternoon,
            TimePeriod::Evening => &self.evening,
            TimePeriod::Night => &self.night,
        }
    }

    /// Random place for the period, if the period has any
    pub fn pick<R: Rng + ?Sized>(&self, period: TimePeriod, rng: &mut R) -> Option<&str> {
        self.places(period).choose(rng).map(|s| s.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HomePosition {
    pub x: f32,
    pub z: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    pub species: Species,
    pub age: f32,
    pub gender: Gender,
    pub hp: f32,
    pub max_hp: f32,
    #[serde(default)]
    pub personality: Personality,
    #[serde(default)]
    pub routine: DailyRoutine,
    /// Fixed home; sampled from the species' home terrain when absent
    #[serde(default)]
    pub home: Option<HomePosition>,
}

impl RosterEntry {
    /// Minimal entry with default personality and an empty routine
    pub fn new(name: impl Into<String>, species: Species, gender: Gender, age: f32, max_hp: f32) -> Self {
        Self {
            name: name.into(),
            species,
            age,
            gender,
            hp: max_hp,
            max_hp,
            personality: Personality::default(),
            routine: DailyRoutine::default(),
            home: None,
        }
    }

    pub fn with_home(mut self, x: f32, z: f32) -> Self {
        self.home = Some(HomePosition { x, z });
        self
    }

    fn validate(&self) -> Result<()> {
        if self.max_hp <= 0.0 || self.hp < 0.0 || self.hp > self.max_hp {
            return Err(SimError::Config(format!(
                "{}: hp {} must be within [0, max_hp {}]",
                self.name, self.hp, self.max_hp
            )));
        }
        if self.age < 0.0 {
            return Err(SimError::Config(format!("{}: negative age", self.name)));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    #[serde(rename = "agent", default)]
    pub agents: Vec<RosterEntry>,
}

impl Roster {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let roster: Roster = toml::from_str(contents)?;
        for entry in &roster.agents {
            entry.validate()?;
        }
        Ok(roster)
    }
}
