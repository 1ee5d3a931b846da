//! The simulated animal

use crate::actions::Activity;
use crate::core::types::{AgentId, Gender, HerdId, LocationId, SimTime, Vec3};
use crate::entity::needs::Needs;
use crate::entity::personality::Personality;
use crate::entity::relationships::Relationships;
use crate::entity::roster::DailyRoutine;
use crate::entity::species::Species;
use crate::entity::thoughts::{ThoughtLog, ThoughtSource};
use serde::{Deserialize, Serialize};

/// Pursuit and flight state. Both halves may be active at once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HuntState {
    pub is_hunting: bool,
    pub target: Option<AgentId>,
    /// Set once the hunter first reaches strike range
    pub started: bool,
    pub is_being_hunted: bool,
    pub hunter: Option<AgentId>,
    pub last_attack_time: Option<SimTime>,
}

impl HuntState {
    pub fn stop_hunting(&mut self) {
        self.is_hunting = false;
        self.target = None;
        self.started = false;
    }

    pub fn stop_fleeing(&mut self) {
        self.is_being_hunted = false;
        self.hunter = None;
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReproductionState {
    pub is_adult: bool,
    pub is_pregnant: bool,
    /// Seconds of gestation so far
    pub pregnancy_elapsed: f64,
    pub father: Option<AgentId>,
    pub last_breeding_time: Option<SimTime>,
    pub offspring: Vec<String>,
    pub parents: Vec<String>,
}

/// Timestamps that decide when each per-agent event is due
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionTimers {
    pub next_think_at: SimTime,
    pub last_action_time: SimTime,
    /// Idle time before the liveness default action fires, re-rolled each time
    pub idle_delay: f64,
    /// When a consumption episode reverts to resting
    pub activity_expires_at: Option<SimTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub species: Species,
    /// Years
    pub age: f32,
    pub gender: Gender,
    pub personality: Personality,
    pub routine: DailyRoutine,
    pub home: Option<LocationId>,

    pub hp: f32,
    pub max_hp: f32,
    pub attack_power: f32,
    pub defense: f32,
    pub size: f32,
    /// Units per second before the situation multiplier
    pub speed: f32,

    pub needs: Needs,
    pub alive: bool,

    pub position: Vec3,
    /// Heading around the vertical axis
    pub rotation: f32,
    pub current_location: Option<LocationId>,
    pub target_location: Option<LocationId>,
    pub movement_target: Option<Vec3>,
    /// Where an escaping agent heads once the hunter is shaken off
    pub flee_destination: Option<Vec3>,

    pub activity: Activity,
    pub thought: String,
    pub is_thinking: bool,
    pub thoughts: ThoughtLog,

    pub hunt: HuntState,
    pub herd: Option<HerdId>,
    pub reproduction: ReproductionState,
    pub relationships: Relationships,
    pub timers: DecisionTimers,
}

impl Agent {
    pub fn is_predator(&self) -> bool {
        self.species.is_predator()
    }

    /// Whether this agent hunts `other`
    pub fn preys_on(&self, other: &Agent) -> bool {
        self.species.preys_on(other.species)
    }

    pub fn hp_fraction(&self) -> f32 {
        if self.max_hp > 0.0 {
            self.hp / self.max_hp
        } else {
            0.0
        }
    }

    /// Set the display thought and record it
    pub fn think(&mut self, now: SimTime, text: impl Into<String>, source: ThoughtSource) {
        let text = text.into();
        self.thoughts.push(now, text.clone(), source);
        self.thought = text;
    }

    pub fn is_moving(&self) -> bool {
        self.movement_target.is_some()
    }

    /// Turn to face a planar direction
    pub fn face(&mut self, direction: Vec3) {
        let dir = direction.planar();
        if dir.length() > 0.0001 {
            self.rotation = dir.yaw();
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Bare agent for unit tests
    pub fn agent(id: u32, species: Species, gender: Gender) -> Agent {
        let profile = species.profile();
        Agent {
            id: AgentId(id),
            name: format!("{}-{}", species, id),
            species,
            age: 5.0,
            gender,
            personality: Personality::default(),
            routine: DailyRoutine::default(),
            home: None,
            hp: 100.0,
            max_hp: 100.0,
            attack_power: profile.attack_power,
            defense: profile.defense,
            size: profile.size,
            speed: 6.0 * profile.speed_multiplier,
            needs: Needs::default(),
            alive: true,
            position: Vec3::ZERO,
            rotation: 0.0,
            current_location: None,
            target_location: None,
            movement_target: None,
            flee_destination: None,
            activity: Activity::Idle,
            thought: String::new(),
            is_thinking: false,
            thoughts: ThoughtLog::default(),
            hunt: HuntState::default(),
            herd: None,
            reproduction: ReproductionState { is_adult: true, ..Default::default() },
            relationships: Relationships::new(),
            timers: DecisionTimers::default(),
        }
    }
}
