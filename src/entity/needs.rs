//! Scalar drives that push animals toward food, water and rest

use crate::core::config::NeedsConfig;
use serde::{Deserialize, Serialize};

/// Per-agent needs, each clamped to [0, 1]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Needs {
    /// 0.0 = fed, 1.0 = starving
    pub hunger: f32,
    /// 0.0 = watered, 1.0 = parched
    pub thirst: f32,
    /// 0.0 = exhausted, 1.0 = fully rested
    pub energy: f32,
}

impl Default for Needs {
    fn default() -> Self {
        Self {
            hunger: 0.0,
            thirst: 0.0,
            energy: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NeedType {
    Hunger,
    Thirst,
    Energy,
}

impl Needs {
    /// Drift needs over `dt` seconds. Resting animals regain energy instead of losing it.
    pub fn decay(&mut self, dt: f32, resting: bool, config: &NeedsConfig) {
        self.hunger = (self.hunger + config.hunger_rate * dt).clamp(0.0, 1.0);
        self.thirst = (self.thirst + config.thirst_rate * dt).clamp(0.0, 1.0);
        let energy_delta = if resting {
            config.energy_recovery
        } else {
            -config.energy_drain
        };
        self.energy = (self.energy + energy_delta * dt).clamp(0.0, 1.0);
    }

    /// Reduce a need. For energy this means restoring it.
    pub fn satisfy(&mut self, need: NeedType, amount: f32) {
        match need {
            NeedType::Hunger => self.hunger = (self.hunger - amount).clamp(0.0, 1.0),
            NeedType::Thirst => self.thirst = (self.thirst - amount).clamp(0.0, 1.0),
            NeedType::Energy => self.energy = (self.energy + amount).clamp(0.0, 1.0),
        }
    }

    /// hp regenerated over `dt` seconds
    pub fn regen(&self, dt: f32, config: &NeedsConfig) -> f32 {
        if self.energy > config.regen_energy_floor {
            config.hp_regen * dt
        } else {
            0.0
        }
    }
}
