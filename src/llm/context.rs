//! Situation summaries for decision prompts
//!
//! Captures what an agent knows about itself and its surroundings at the
//! moment it starts thinking. The capture is owned data so the request can
//! outlive the borrow of the world.

use crate::core::types::AgentId;
use crate::ecs::world::World;
use crate::entity::species::Species;
use crate::llm::parser::DECISION_SYSTEM_PROMPT;
use crate::simulation::perception::Perception;

/// Snapshot of one agent's situation
#[derive(Debug, Clone)]
pub struct SituationContext {
    pub name: String,
    pub species: Species,
    pub hp: f32,
    pub max_hp: f32,
    pub hunger: f32,
    pub thirst: f32,
    pub location_name: String,
    pub time_of_day: String,
    pub clock: String,
    pub nearby_predators: Vec<String>,
    pub nearby_prey: Vec<String>,
    pub personality: String,
}

impl SituationContext {
    /// Capture the situation of `id` given what it currently perceives
    pub fn from_world(world: &World, id: AgentId, perception: &Perception) -> Option<Self> {
        let agent = world.agent(id)?;
        let names = |ids: &[AgentId]| -> Vec<String> {
            ids.iter()
                .filter_map(|&other| world.agent(other))
                .map(|a| a.name.clone())
                .collect()
        };

        Some(Self {
            name: agent.name.clone(),
            species: agent.species,
            hp: agent.hp,
            max_hp: agent.max_hp,
            hunger: agent.needs.hunger,
            thirst: agent.needs.thirst,
            location_name: world.locations.name_of(agent.current_location).to_string(),
            time_of_day: world.clock.time_period().as_str().to_string(),
            clock: world.clock.clock_label(),
            nearby_predators: names(&perception.predators),
            nearby_prey: names(&perception.prey),
            personality: agent.personality.description.clone(),
        })
    }

    /// User-turn text describing the situation
    pub fn summary(&self) -> String {
        let list = |names: &[String]| {
            if names.is_empty() {
                "none".to_string()
            } else {
                names.join(", ")
            }
        };

        let mut s = String::new();
        s.push_str(&format!("Current situation of {} ({}):\n", self.name, self.species));
        s.push_str(&format!("- HP: {:.0}/{:.0}\n", self.hp, self.max_hp));
        s.push_str(&format!("- Hunger: {:.1}%\n", self.hunger * 100.0));
        s.push_str(&format!("- Thirst: {:.1}%\n", self.thirst * 100.0));
        s.push_str(&format!("- Location: {}\n", self.location_name));
        s.push_str(&format!("- Time of day: {} ({})\n", self.time_of_day, self.clock));
        s.push_str(&format!("- Nearby predators: {}\n", list(&self.nearby_predators)));
        s.push_str(&format!("- Nearby prey: {}\n", list(&self.nearby_prey)));
        if !self.personality.is_empty() {
            s.push_str(&format!("\nPersonality: {}\n", self.personality));
        }
        s.push_str("\nChoose the most appropriate action.");
        s
    }

    /// System prompt: shared action menu plus the species persona
    pub fn persona_prompt(&self) -> String {
        format!("{}\n\n{}", self.species.persona(), DECISION_SYSTEM_PROMPT)
    }
}
