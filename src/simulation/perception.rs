//! Perception system - who is dangerous and who is food

use crate::core::types::AgentId;
use crate::ecs::world::World;

/// What one agent notices around it. Both lists are nearest first.
#[derive(Debug, Clone)]
pub struct Perception {
    pub observer: AgentId,
    /// Living agents that prey on the observer
    pub predators: Vec<AgentId>,
    /// Living agents the observer preys on
    pub prey: Vec<AgentId>,
}

impl Perception {
    pub fn predator_nearby(&self) -> bool {
        !self.predators.is_empty()
    }

    pub fn prey_nearby(&self) -> bool {
        !self.prey.is_empty()
    }
}

/// Partition living neighbours within `radius` into predators and prey
pub fn perceive(world: &World, id: AgentId, radius: f32) -> Perception {
    let mut perception = Perception {
        observer: id,
        predators: Vec::new(),
        prey: Vec::new(),
    };
    let Some(me) = world.agent(id) else {
        return perception;
    };

    for (other_id, _) in world.nearby(id, radius) {
        let Some(other) = world.agent(other_id) else {
            continue;
        };
        if other.preys_on(me) {
            perception.predators.push(other_id);
        } else if me.preys_on(other) {
            perception.prey.push(other_id);
        }
    }
    perception
}

/// Closest living predator of `id` within `radius`
pub fn nearest_predator(world: &World, id: AgentId, radius: f32) -> Option<(AgentId, f32)> {
    let me = world.agent(id)?;
    world
        .nearby(id, radius)
        .into_iter()
        .find(|(other, _)| world.agent(*other).map(|o| o.preys_on(me)).unwrap_or(false))
}

/// Closest living prey of `id` within `radius`
pub fn nearest_prey(world: &World, id: AgentId, radius: f32) -> Option<(AgentId, f32)> {
    let me = world.agent(id)?;
    world
        .nearby(id, radius)
        .into_iter()
        .find(|(other, _)| world.agent(*other).map(|o| me.preys_on(o)).unwrap_or(false))
}
