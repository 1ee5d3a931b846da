//! Read-only per-agent view for display layers

use crate::core::types::{AgentId, Gender, HerdId, Vec3};
use crate::entity::agent::Agent;
use crate::entity::species::Species;
use crate::world::location::LocationCatalog;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub name: String,
    pub species: Species,
    pub hp: f32,
    pub max_hp: f32,
    pub hunger: f32,
    pub thirst: f32,
    pub energy: f32,
    pub location_name: String,
    pub thought: String,
    pub activity: &'static str,
    pub is_alive: bool,
    pub gender: Gender,
    pub age: f32,
    pub is_pregnant: bool,
    pub offspring_count: usize,
    pub position: Vec3,
    pub rotation: f32,
    pub herd: Option<HerdId>,
}

impl AgentSnapshot {
    pub fn capture(agent: &Agent, locations: &LocationCatalog) -> Self {
        Self {
            id: agent.id,
            name: agent.name.clone(),
            species: agent.species,
            hp: agent.hp,
            max_hp: agent.max_hp,
            hunger: agent.needs.hunger,
            thirst: agent.needs.thirst,
            energy: agent.needs.energy,
            location_name: locations.name_of(agent.current_location).to_string(),
            thought: agent.thought.clone(),
            activity: agent.activity.as_str(),
            is_alive: agent.alive,
            gender: agent.gender,
            age: agent.age,
            is_pregnant: agent.reproduction.is_pregnant,
            offspring_count: agent.reproduction.offspring.len(),
            position: agent.position,
            rotation: agent.rotation,
            herd: agent.herd,
        }
    }

    /// One-line summary for the terminal
    pub fn status_line(&self) -> String {
        let state = if self.is_alive { self.activity } else { "dead" };
        format!(
            "{:<10} {:<8} hp {:>5.1}/{:<5.1} hunger {:>3.0}% thirst {:>3.0}% {:<9} @ {}",
            self.name,
            self.species,
            self.hp,
            self.max_hp,
            self.hunger * 100.0,
            self.thirst * 100.0,
            state,
            self.location_name,
        )
    }
}
