//! Simulation configuration with documented constants
//!
//! All tunable numbers live here, grouped by the system that reads them.
//! Every section deserializes from TOML with per-field defaults, so a config
//! file only needs to name the values it overrides.

use crate::core::error::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Inclusive range of seconds (or any scalar) sampled uniformly
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

impl Span {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn sample<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.max <= self.min {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }

    fn check(&self, name: &str) -> std::result::Result<(), String> {
        if self.min < 0.0 || self.max < self.min {
            return Err(format!("{name}: expected 0 <= min <= max, got {}..{}", self.min, self.max));
        }
        Ok(())
    }
}

/// Movement speed model: base x global multiplier x species x situation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedConfig {
    /// World units per simulated second before any multiplier
    pub base_speed: f32,
    /// Global scale applied to every agent
    pub speed_multiplier: f32,
    pub normal: f32,
    pub hunting: f32,
    pub escaping: f32,
    pub resting: f32,
    pub exploring: f32,
    /// Agents stand this far above the terrain surface
    pub height_offset: f32,
    /// Distance below which a movement target counts as reached
    pub arrival_threshold: f32,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            base_speed: 12.0,
            speed_multiplier: 0.5,
            normal: 1.0,
            hunting: 1.2,
            escaping: 1.4,
            resting: 0.2,
            exploring: 0.6,
            height_offset: 1.0,
            arrival_threshold: 0.5,
        }
    }
}

/// Needs drift and satisfaction rates (per simulated second)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NeedsConfig {
    pub hunger_rate: f32,
    pub thirst_rate: f32,
    pub energy_drain: f32,
    /// Energy regained per second while resting
    pub energy_recovery: f32,
    /// hp regained per second while energy is above `regen_energy_floor`
    pub hp_regen: f32,
    pub regen_energy_floor: f32,
    pub eat_rate: f32,
    pub drink_rate: f32,
    /// Minimum thirst for the standing auto-drink at water
    pub auto_drink_threshold: f32,
    /// How long an eating/drinking episode lasts before reverting to rest
    pub consumption_duration: f64,
}

impl Default for NeedsConfig {
    fn default() -> Self {
        Self {
            hunger_rate: 0.02,
            thirst_rate: 0.03,
            energy_drain: 0.01,
            energy_recovery: 0.05,
            hp_regen: 0.5,
            regen_energy_floor: 0.5,
            eat_rate: 0.15,
            drink_rate: 0.25,
            auto_drink_threshold: 0.1,
            consumption_duration: 5.0,
        }
    }
}

/// Sensing and engagement distances (world units)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    /// Radius for the nearby predator/prey partition
    pub sensing_radius: f32,
    /// Radius of the pre-emptive escape reflex
    pub escape_radius: f32,
    /// Radius searched when a predator starts a hunt
    pub hunting_radius: f32,
    pub strike_range: f32,
    /// A hunted target further than this is abandoned
    pub give_up_range: f32,
    /// A fleeing agent this far from its hunter stops fleeing
    pub escape_clear_distance: f32,
    pub grid_cell_size: f32,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            sensing_radius: 12.0,
            escape_radius: 12.0,
            hunting_radius: 15.0,
            strike_range: 2.0,
            give_up_range: 20.0,
            escape_clear_distance: 25.0,
            grid_cell_size: 10.0,
        }
    }
}

/// Decision timers and fallback thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Interval between decisions, re-rolled after each one
    pub think_interval: Span,
    /// Delay before a freshly spawned agent first thinks
    pub first_think_delay: Span,
    /// Idle time before the out-of-band default action fires
    pub idle_action_delay: Span,
    pub default_hunger_threshold: f32,
    pub default_thirst_threshold: f32,
    /// Fraction of max hp below which the default action rests
    pub default_hp_fraction: f32,
    /// Hunger above which a predator's `eat` becomes a hunt
    pub predator_hunt_hunger: f32,
    /// Needs re-checked on arrival: above these the agent eats or drinks next
    pub arrival_hunger_threshold: f32,
    pub arrival_thirst_threshold: f32,
    /// Fraction of max hp below which an arriving agent rests
    pub arrival_hp_fraction: f32,
    /// Range of the flight projection when escaping
    pub escape_distance: Span,
    /// Random samples tried when looking for a terrain category
    pub terrain_search_attempts: u32,
    pub terrain_search_radius: f32,
    /// Seconds before an unanswered provider request counts as failed
    pub provider_timeout: f64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            think_interval: Span::new(2.0, 8.0),
            first_think_delay: Span::new(0.0, 2.0),
            idle_action_delay: Span::new(3.0, 5.0),
            default_hunger_threshold: 0.3,
            default_thirst_threshold: 0.3,
            default_hp_fraction: 0.7,
            predator_hunt_hunger: 0.3,
            arrival_hunger_threshold: 0.7,
            arrival_thirst_threshold: 0.7,
            arrival_hp_fraction: 0.5,
            escape_distance: Span::new(30.0, 50.0),
            terrain_search_attempts: 30,
            terrain_search_radius: 60.0,
            provider_timeout: 20.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Seconds between two attacks by the same agent
    pub attack_cooldown: f64,
    /// Hunger removed from a predator that makes a kill
    pub kill_hunger_relief: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            attack_cooldown: 3.0,
            kill_hunger_relief: 0.3,
        }
    }
}

/// Flocking weights and herd sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HerdConfig {
    pub max_size: usize,
    pub flock_radius: f32,
    pub threat_radius: f32,
    pub separation_weight: f32,
    pub predator_weight: f32,
    pub cohesion_weight: f32,
    /// Fraction of the agent's speed used for flocking steps
    pub step_multiplier: f32,
    pub steering_epsilon: f32,
    /// Base spacing between formation slots
    pub formation_spacing: f32,
    pub default_cohesion: f32,
}

impl Default for HerdConfig {
    fn default() -> Self {
        Self {
            max_size: 8,
            flock_radius: 10.0,
            threat_radius: 15.0,
            separation_weight: 1.5,
            predator_weight: 1.2,
            cohesion_weight: 1.0,
            step_multiplier: 0.3,
            steering_epsilon: 0.01,
            formation_spacing: 3.0,
            default_cohesion: 0.8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReproductionConfig {
    pub adult_age: f32,
    /// Years of age gained per simulated second
    pub ageing_rate: f32,
    pub breeding_cooldown: f64,
    pub mate_radius: f32,
    pub conception_probability: f64,
    pub gestation_duration: f64,
    pub min_litter: u32,
    pub max_litter: u32,
    /// Offspring spawn within this distance of the mother
    pub birth_jitter: f32,
    /// Offspring max hp as a fraction of the mother's
    pub offspring_hp_fraction: f32,
}

impl Default for ReproductionConfig {
    fn default() -> Self {
        Self {
            adult_age: 3.0,
            ageing_rate: 1.0 / 600.0,
            breeding_cooldown: 60.0,
            mate_radius: 10.0,
            conception_probability: 0.7,
            gestation_duration: 120.0,
            min_litter: 1,
            max_litter: 3,
            birth_jitter: 2.0,
            offspring_hp_fraction: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Time of day at startup, in minutes after midnight
    pub start_minutes: f64,
    /// Simulated minutes of day that pass per simulated second
    pub day_minutes_per_second: f64,
    pub seed: u64,
    /// Minimum roster size before rayon is used for bulk passes
    pub parallel_threshold: usize,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            start_minutes: 8.0 * 60.0,
            day_minutes_per_second: 10.0,
            seed: 42,
            parallel_threshold: 256,
        }
    }
}

/// Configuration for every simulation system
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub speed: SpeedConfig,
    pub needs: NeedsConfig,
    pub perception: PerceptionConfig,
    pub decision: DecisionConfig,
    pub combat: CombatConfig,
    pub herd: HerdConfig,
    pub reproduction: ReproductionConfig,
    pub clock: ClockConfig,
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from a TOML file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(contents)?;
        config.validate().map_err(SimError::Config)?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.decision.think_interval.check("decision.think_interval")?;
        self.decision.first_think_delay.check("decision.first_think_delay")?;
        self.decision.idle_action_delay.check("decision.idle_action_delay")?;
        self.decision.escape_distance.check("decision.escape_distance")?;

        let timeout = self.decision.provider_timeout;
        if !timeout.is_finite() || timeout <= 0.0 {
            return Err(format!("decision.provider_timeout must be finite and positive, got {}", timeout));
        }

        if self.speed.base_speed <= 0.0 || self.speed.speed_multiplier <= 0.0 {
            return Err("speed.base_speed and speed.speed_multiplier must be positive".into());
        }

        // Situational ordering is what makes fleeing prey outrun hunters
        let s = &self.speed;
        if !(s.escaping >= s.hunting && s.hunting >= s.normal && s.normal >= s.exploring && s.exploring >= s.resting) {
            return Err("speed situations must satisfy escaping >= hunting >= normal >= exploring >= resting".into());
        }

        if self.needs.hunger_rate < 0.0 || self.needs.thirst_rate < 0.0 || self.needs.energy_drain < 0.0 {
            return Err("need rates must not be negative".into());
        }

        if self.perception.strike_range >= self.perception.give_up_range {
            return Err(format!(
                "perception.strike_range ({}) must be < give_up_range ({})",
                self.perception.strike_range, self.perception.give_up_range
            ));
        }

        if self.perception.grid_cell_size <= 0.0 {
            return Err("perception.grid_cell_size must be positive".into());
        }

        if !(0.0..=1.0).contains(&self.reproduction.conception_probability) {
            return Err("reproduction.conception_probability must be within [0, 1]".into());
        }

        if self.reproduction.min_litter == 0 || self.reproduction.min_litter > self.reproduction.max_litter {
            return Err("reproduction litter range must satisfy 1 <= min_litter <= max_litter".into());
        }

        if self.herd.max_size == 0 {
            return Err("herd.max_size must be at least 1".into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SimulationConfig::from_toml(
            r#"
            [combat]
            attack_cooldown = 1.5

            [perception]
            escape_radius = 8.0
            "#,
        )
        .unwrap();
        assert_eq!(config.combat.attack_cooldown, 1.5);
        assert_eq!(config.combat.kill_hunger_relief, 0.3);
        assert_eq!(config.perception.escape_radius, 8.0);
        assert_eq!(config.perception.sensing_radius, 12.0);
    }

    #[test]
    fn test_invalid_situation_ordering_rejected() {
        let mut config = SimulationConfig::default();
        config.speed.resting = 2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_litter_rejected() {
        let result = SimulationConfig::from_toml(
            r#"
            [reproduction]
            min_litter = 4
            max_litter = 3
            "#,
        );
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn test_unbounded_provider_timeout_rejected() {
        let result = SimulationConfig::from_toml(
            r#"
            [decision]
            provider_timeout = inf
            "#,
        );
        assert!(matches!(result, Err(SimError::Config(_))));

        let mut config = SimulationConfig::default();
        config.decision.provider_timeout = 0.0;
        assert!(config.validate().is_err());
        config.decision.provider_timeout = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_span_sample_within_bounds() {
        use rand::SeedableRng;
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(1);
        let span = Span::new(2.0, 8.0);
        for _ in 0..100 {
            let v = span.sample(&mut rng);
            assert!((2.0..=8.0).contains(&v));
        }
        assert_eq!(Span::new(3.0, 3.0).sample(&mut rng), 3.0);
    }
}
