//! Needs drift and consumption
//!
//! Eating and drinking happen while an agent stands at a matching spot.
//! An episode has an explicit expiry time; once it passes the agent goes
//! back to resting.

use crate::actions::Activity;
use crate::core::types::AgentId;
use crate::ecs::world::World;
use crate::entity::agent::Agent;
use crate::entity::needs::NeedType;
use crate::entity::thoughts::ThoughtSource;
use crate::world::location::Location;
use crate::world::terrain::TerrainCategory;

/// Distance within which an agent counts as standing at its current location
const AT_LOCATION_RADIUS: f32 = 2.0;

fn standing_at<'w>(world: &'w World, agent: &Agent) -> Option<&'w Location> {
    let location = world.locations.get(agent.current_location?)?;
    let position = location.position?;
    (position.planar_distance(&agent.position) <= AT_LOCATION_RADIUS).then_some(location)
}

/// At a food location, or on the species' diet terrain
pub fn at_food(world: &World, agent: &Agent) -> bool {
    standing_at(world, agent).map(|l| l.kind.is_food()).unwrap_or(false)
        || world.terrain.category(agent.position.x, agent.position.z) == agent.species.profile().diet
}

/// At a water location, or standing in the river
pub fn at_water(world: &World, agent: &Agent) -> bool {
    standing_at(world, agent).map(|l| l.kind.is_water()).unwrap_or(false)
        || world.terrain.category(agent.position.x, agent.position.z) == TerrainCategory::River
}

pub fn at_rest(world: &World, agent: &Agent) -> bool {
    standing_at(world, agent).map(|l| l.kind.is_rest()).unwrap_or(false)
}

/// Drift needs and regenerate hp
pub fn update_needs(world: &mut World, id: AgentId, dt: f32) {
    let config = world.config.needs.clone();
    let Some(agent) = world.agent_mut(id) else {
        return;
    };
    if !agent.alive {
        return;
    }
    let resting = agent.activity == Activity::Resting;
    agent.needs.decay(dt, resting, &config);
    let regen = agent.needs.regen(dt, &config);
    agent.hp = (agent.hp + regen).clamp(0.0, agent.max_hp);
}

/// Episode expiry, then eating/drinking at the current spot
pub fn update_consumption(world: &mut World, id: AgentId, dt: f32) {
    let now = world.now();
    let eat_rate = world.config.needs.eat_rate;
    let drink_rate = world.config.needs.drink_rate;
    let auto_drink = world.config.needs.auto_drink_threshold;

    let (activity, food, water, thirst) = {
        let Some(agent) = world.agent(id) else {
            return;
        };
        if !agent.alive || agent.movement_target.is_some() {
            return;
        }
        (agent.activity, at_food(world, agent), at_water(world, agent), agent.needs.thirst)
    };

    let Some(agent) = world.agent_mut(id) else {
        return;
    };

    if let Some(expires) = agent.timers.activity_expires_at {
        if now >= expires {
            agent.timers.activity_expires_at = None;
            if matches!(activity, Activity::Eating | Activity::Drinking) {
                agent.activity = Activity::Resting;
                agent.think(now, "That hit the spot. Time to rest.", ThoughtSource::Reflex);
            }
            return;
        }
    }

    if activity == Activity::Eating && food {
        agent.needs.satisfy(NeedType::Hunger, eat_rate * dt);
    }
    if water && (activity == Activity::Drinking || thirst > auto_drink) {
        agent.needs.satisfy(NeedType::Thirst, drink_rate * dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::core::types::{Gender, Vec3};
    use crate::entity::roster::RosterEntry;
    use crate::entity::species::Species;
    use crate::world::location::{LocationCatalog, LocationKind};
    use crate::world::terrain::FlatTerrain;

    fn world_at_pond() -> (World, AgentId) {
        let mut w = World::new(SimulationConfig::default(), Box::new(FlatTerrain(10.0)), LocationCatalog::new());
        let pond = w.locations.add("Pond", LocationKind::Pond, Some(Vec3::new(0.0, 10.0, 0.0)));
        let id = w.spawn(RosterEntry::new("Tusk", Species::Elephant, Gender::Male, 8.0, 150.0).with_home(0.0, 0.0));
        w.agents[id.index()].current_location = Some(pond);
        (w, id)
    }

    #[test]
    fn test_needs_stay_clamped() {
        let (mut w, id) = world_at_pond();
        update_needs(&mut w, id, 1000.0);
        let a = w.agent(id).unwrap();
        assert_eq!(a.needs.hunger, 1.0);
        assert_eq!(a.needs.thirst, 1.0);
        assert_eq!(a.needs.energy, 0.0);
        assert!(a.hp <= a.max_hp);
    }

    #[test]
    fn test_standing_auto_drink() {
        let (mut w, id) = world_at_pond();
        w.agents[id.index()].needs.thirst = 0.5;
        update_consumption(&mut w, id, 1.0);
        assert!((w.agent(id).unwrap().needs.thirst - 0.25).abs() < 1e-5);

        // Below the threshold nothing happens
        w.agents[id.index()].needs.thirst = 0.05;
        update_consumption(&mut w, id, 1.0);
        assert_eq!(w.agent(id).unwrap().needs.thirst, 0.05);
    }

    #[test]
    fn test_episode_expires_to_resting() {
        let (mut w, id) = world_at_pond();
        w.agents[id.index()].activity = Activity::Drinking;
        w.agents[id.index()].timers.activity_expires_at = Some(w.now() + 5.0);

        update_consumption(&mut w, id, 0.1);
        assert_eq!(w.agent(id).unwrap().activity, Activity::Drinking);

        w.clock.advance(5.0);
        update_consumption(&mut w, id, 0.1);
        let a = w.agent(id).unwrap();
        assert_eq!(a.activity, Activity::Resting);
        assert!(a.timers.activity_expires_at.is_none());
    }
}
