//! Behavior execution - turn a chosen action into a target
//!
//! Every branch ends with the agent either moving, hunting or resting in
//! place. Nothing here fails: a missing target is logged as a warning and
//! the agent rests where it stands.

use crate::actions::{Action, Activity};
use crate::core::types::{AgentId, Vec3};
use crate::ecs::world::World;
use crate::entity::thoughts::ThoughtSource;
use crate::simulation::movement::{move_to_location, move_to_point};
use crate::simulation::perception::{nearest_predator, nearest_prey};
use crate::simulation::tick::SimulationEvent;
use crate::ui::log::LogCategory;
use crate::world::location::sample_category_near;
use crate::world::terrain::TerrainCategory;
use rand::seq::SliceRandom;
use rand::Rng;
use std::f32::consts::TAU;

const SAFE_TERRAIN: [TerrainCategory; 2] = [TerrainCategory::Forest, TerrainCategory::Mountain];

/// Adopt `action`: set activity and thought, then resolve its target
pub fn dispatch(world: &mut World, id: AgentId, action: Action, thought: impl Into<String>, source: ThoughtSource) {
    if !adopt(world, id, action, thought.into(), source) {
        return;
    }

    match action {
        Action::Hunt => start_hunting(world, id),
        Action::Escape => find_safe_location(world, id),
        Action::Eat => find_food(world, id),
        Action::Drink => find_water(world, id),
        Action::Rest => rest(world, id),
        Action::Routine => follow_routine(world, id),
        Action::Explore => explore(world, id),
    }
}

/// Record the decision without resolving a target. False for dead agents.
pub(crate) fn adopt(world: &mut World, id: AgentId, action: Action, thought: String, source: ThoughtSource) -> bool {
    let now = world.now();

    let name = {
        let Some(agent) = world.agent_mut(id) else {
            return false;
        };
        if !agent.alive {
            return false;
        }
        agent.activity = action.activity();
        agent.timers.last_action_time = now;
        agent.timers.activity_expires_at = None;
        if action != Action::Hunt && action != Action::Eat {
            agent.hunt.stop_hunting();
        }
        agent.think(now, thought.clone(), source);
        agent.name.clone()
    };

    tracing::info!(agent = %id, %name, %action, ?source, "decision");
    world.log.add(now, format!("{}: \"{}\"", name, thought), LogCategory::Thought);
    world.events.push(SimulationEvent::Decision { agent: id, action, source });
    true
}

fn set_activity(world: &mut World, id: AgentId, activity: Activity) {
    if let Some(agent) = world.agent_mut(id) {
        agent.activity = activity;
    }
}

fn warn(world: &mut World, id: AgentId, message: &str) {
    let now = world.now();
    let name = world.agent(id).map(|a| a.name.clone()).unwrap_or_default();
    tracing::warn!(agent = %id, %name, "{}", message);
    world.log.add(now, format!("{} {}", name, message), LogCategory::Warning);
}

/// Stop where the agent stands and rest
pub fn rest_in_place(world: &mut World, id: AgentId) {
    if let Some(agent) = world.agent_mut(id) {
        agent.activity = Activity::Resting;
        agent.movement_target = None;
        agent.target_location = None;
    }
}

/// Lock on to the nearest prey in hunting range, or explore
pub fn start_hunting(world: &mut World, id: AgentId) {
    let now = world.now();
    let radius = world.config.perception.hunting_radius;
    let is_predator = world.agent(id).map(|a| a.is_predator()).unwrap_or(false);

    let found = if is_predator { nearest_prey(world, id, radius) } else { None };
    let Some((prey, distance)) = found else {
        set_activity(world, id, Activity::Exploring);
        explore(world, id);
        return;
    };

    let (name, prey_name) = {
        let prey_name = world.agent(prey).map(|p| p.name.clone()).unwrap_or_default();
        let Some(agent) = world.agent_mut(id) else {
            return;
        };
        agent.activity = Activity::Hunting;
        agent.hunt.is_hunting = true;
        agent.hunt.target = Some(prey);
        agent.hunt.started = false;
        (agent.name.clone(), prey_name)
    };

    tracing::info!(hunter = %id, %prey, distance, "hunt started");
    world.log.add(now, format!("{} spots {}", name, prey_name), LogCategory::Hunt);
    world.events.push(SimulationEvent::HuntStarted { hunter: id, target: prey });
}

/// Run directly away from the threat, preferring forest or mountain cover
pub fn find_safe_location(world: &mut World, id: AgentId) {
    let sensing = world.config.perception.sensing_radius;
    let Some(agent) = world.agent(id) else {
        return;
    };
    let position = agent.position;
    let threat = agent
        .hunt
        .hunter
        .filter(|&h| world.is_alive(h))
        .or_else(|| nearest_predator(world, id, sensing).map(|(p, _)| p))
        .and_then(|p| world.agent(p))
        .map(|p| p.position);

    let Some(threat) = threat else {
        seek_shelter(world, id);
        return;
    };

    let mut away = (position - threat).planar();
    if away.length() < 0.0001 {
        let angle = world.rng.gen_range(0.0..TAU);
        away = Vec3::flat(angle.cos(), angle.sin());
    }
    let distance = world.config.decision.escape_distance.sample(&mut world.rng) as f32;
    let raw = position + away.normalize() * distance;

    let mut destination = raw;
    let mut location = None;
    if !world.terrain.category(raw.x, raw.z).is_safe() {
        let cover = world
            .locations
            .nearest_of_terrain(raw, &SAFE_TERRAIN, world.terrain.as_ref())
            .and_then(|loc| world.locations.get(loc))
            .and_then(|loc| loc.position.map(|p| (loc.id, p)));
        if let Some((loc, p)) = cover {
            destination = p;
            location = Some(loc);
        }
    }

    move_to_point(world, id, destination, location);
    let target = world.agent(id).and_then(|a| a.movement_target);
    if let Some(agent) = world.agent_mut(id) {
        agent.flee_destination = target;
    }
}

fn seek_shelter(world: &mut World, id: AgentId) {
    let shelters = world.locations.matching(|k| k.is_shelter());
    let pick = shelters.choose(&mut world.rng).copied();
    let moved = match pick {
        Some(loc) => move_to_location(world, id, loc),
        None => false,
    };
    if !moved {
        warn(world, id, "could not find a safe place");
        rest_in_place(world, id);
    }
}

/// Graze on diet terrain near the agent, else visit a food location.
/// Hungry predators hunt instead.
pub fn find_food(world: &mut World, id: AgentId) {
    let redirect = world.config.decision.predator_hunt_hunger;
    let attempts = world.config.decision.terrain_search_attempts;
    let radius = world.config.decision.terrain_search_radius;
    let Some((position, diet, hunts)) = world
        .agent(id)
        .map(|a| (a.position, a.species.profile().diet, a.is_predator() && a.needs.hunger > redirect))
    else {
        return;
    };
    if hunts {
        set_activity(world, id, Activity::Hunting);
        start_hunting(world, id);
        return;
    }

    if let Some(point) = sample_category_near(world.terrain.as_ref(), &mut world.rng, position, diet, attempts, radius) {
        move_to_point(world, id, point, None);
        return;
    }

    let food = world.locations.matching(|k| k.is_food());
    let pick = food.choose(&mut world.rng).copied();
    let moved = match pick {
        Some(loc) => move_to_location(world, id, loc),
        None => false,
    };
    if !moved {
        warn(world, id, "could not find food");
        rest_in_place(world, id);
    }
}

/// Visit a water location, else find river terrain
pub fn find_water(world: &mut World, id: AgentId) {
    let attempts = world.config.decision.terrain_search_attempts;
    let radius = world.config.decision.terrain_search_radius;

    let water = world.locations.matching(|k| k.is_water());
    let pick = water.choose(&mut world.rng).copied();
    if let Some(loc) = pick {
        if move_to_location(world, id, loc) {
            return;
        }
    }

    let Some(position) = world.agent(id).map(|a| a.position) else {
        return;
    };
    let river = sample_category_near(
        world.terrain.as_ref(),
        &mut world.rng,
        position,
        TerrainCategory::River,
        attempts,
        radius,
    );
    match river {
        Some(point) => move_to_point(world, id, point, None),
        None => {
            warn(world, id, "could not find water");
            rest_in_place(world, id);
        }
    }
}

/// Shelter, then home, then right here
pub fn rest(world: &mut World, id: AgentId) {
    let shelters = world.locations.matching(|k| k.is_shelter());
    let pick = shelters.choose(&mut world.rng).copied();
    if let Some(loc) = pick {
        if move_to_location(world, id, loc) {
            return;
        }
    }
    if let Some(home) = world.agent(id).and_then(|a| a.home) {
        if move_to_location(world, id, home) {
            return;
        }
    }
    warn(world, id, "could not find a place to rest");
    rest_in_place(world, id);
}

/// Random routine place for the current period
pub(crate) fn pick_routine_place(world: &mut World, id: AgentId) -> Option<String> {
    let period = world.clock.time_period();
    let agent = world.agents.get(id.index())?;
    agent.routine.pick(period, &mut world.rng).map(str::to_string)
}

/// True when `place` names the catalog location the agent stands at
pub(crate) fn is_current_place(world: &World, id: AgentId, place: &str) -> bool {
    let current = world.agent(id).and_then(|a| a.current_location);
    current.is_some() && world.locations.by_name(place) == current
}

/// Visit a place from the daily routine for the current period
pub fn follow_routine(world: &mut World, id: AgentId) {
    let Some(place) = pick_routine_place(world, id) else {
        set_activity(world, id, Activity::Exploring);
        explore(world, id);
        return;
    };
    if is_current_place(world, id, &place) {
        // Already there
        return;
    }
    visit_routine_place(world, id, &place);
}

/// Head for a named routine place: a catalog entry, else a terrain category
pub(crate) fn visit_routine_place(world: &mut World, id: AgentId, place: &str) {
    let attempts = world.config.decision.terrain_search_attempts;
    let radius = world.config.decision.terrain_search_radius;
    let Some(position) = world.agent(id).map(|a| a.position) else {
        return;
    };

    if let Some(loc) = world.locations.by_name(place) {
        if move_to_location(world, id, loc) {
            return;
        }
    }

    let sampled = TerrainCategory::from_name(place).and_then(|category| {
        sample_category_near(world.terrain.as_ref(), &mut world.rng, position, category, attempts, radius)
    });
    match sampled {
        Some(point) => move_to_point(world, id, point, None),
        None => {
            tracing::debug!(agent = %id, %place, "routine place not found");
            set_activity(world, id, Activity::Exploring);
            explore(world, id);
        }
    }
}

/// Visit a random known location other than the current one
pub fn explore(world: &mut World, id: AgentId) {
    let current = world.agent(id).and_then(|a| a.current_location);
    let candidates: Vec<_> = world
        .locations
        .matching(|_| true)
        .into_iter()
        .filter(|&loc| Some(loc) != current)
        .collect();

    let pick = candidates.choose(&mut world.rng).copied();
    let moved = match pick {
        Some(loc) => move_to_location(world, id, loc),
        None => false,
    };
    if !moved {
        warn(world, id, "found nowhere new to explore");
        rest_in_place(world, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::core::types::Gender;
    use crate::entity::roster::RosterEntry;
    use crate::entity::species::Species;
    use crate::world::location::{LocationCatalog, LocationKind};
    use crate::world::terrain::{FlatTerrain, TerrainQuery};

    /// Hills with a band of forest far to the west
    struct WestForest;

    impl TerrainQuery for WestForest {
        fn height(&self, x: f32, _z: f32) -> f32 {
            if x < -60.0 {
                5.0
            } else {
                10.0
            }
        }
    }

    fn world(height: f32) -> World {
        World::new(SimulationConfig::default(), Box::new(FlatTerrain(height)), LocationCatalog::new())
    }

    #[test]
    fn test_empty_catalog_rests_in_place() {
        // Hills everywhere: no grazing terrain for zebras, no river
        let mut w = world(10.0);
        let id = w.spawn(RosterEntry::new("Stripe", Species::Zebra, Gender::Female, 4.0, 70.0).with_home(0.0, 0.0));

        dispatch(&mut w, id, Action::Eat, "hungry", ThoughtSource::Heuristic);
        let agent = w.agent(id).unwrap();
        assert_eq!(agent.activity, Activity::Resting);
        assert!(agent.movement_target.is_none());
        assert_eq!(w.log.count(LogCategory::Warning), 1);

        dispatch(&mut w, id, Action::Drink, "thirsty", ThoughtSource::Heuristic);
        assert_eq!(w.agent(id).unwrap().activity, Activity::Resting);
        assert_eq!(w.log.count(LogCategory::Warning), 2);
    }

    #[test]
    fn test_grazes_on_diet_terrain() {
        let mut w = world(1.0);
        let id = w.spawn(RosterEntry::new("Stripe", Species::Zebra, Gender::Female, 4.0, 70.0).with_home(0.0, 0.0));
        dispatch(&mut w, id, Action::Eat, "hungry", ThoughtSource::Heuristic);
        let agent = w.agent(id).unwrap();
        assert_eq!(agent.activity, Activity::Eating);
        assert!(agent.movement_target.is_some());
    }

    #[test]
    fn test_hungry_predator_eat_becomes_hunt() {
        let mut w = world(1.0);
        let lion = w.spawn(RosterEntry::new("Leo", Species::Lion, Gender::Male, 8.0, 100.0).with_home(0.0, 0.0));
        let zebra = w.spawn(RosterEntry::new("Stripe", Species::Zebra, Gender::Female, 4.0, 70.0).with_home(6.0, 0.0));
        w.agents[lion.index()].needs.hunger = 0.6;
        w.rebuild_grid();

        dispatch(&mut w, lion, Action::Eat, "hungry", ThoughtSource::Heuristic);
        let agent = w.agent(lion).unwrap();
        assert!(agent.hunt.is_hunting);
        assert_eq!(agent.hunt.target, Some(zebra));
        assert_eq!(agent.activity, Activity::Hunting);
    }

    #[test]
    fn test_non_predator_hunt_explores() {
        let mut w = world(1.0);
        w.locations.add("Grassland", LocationKind::Grassland, Some(Vec3::new(30.0, 1.0, 0.0)));
        let id = w.spawn(RosterEntry::new("Stripe", Species::Zebra, Gender::Female, 4.0, 70.0).with_home(0.0, 0.0));
        dispatch(&mut w, id, Action::Hunt, "?", ThoughtSource::Heuristic);
        let agent = w.agent(id).unwrap();
        assert!(!agent.hunt.is_hunting);
        assert_eq!(agent.activity, Activity::Exploring);
        assert_eq!(agent.movement_target, Some(Vec3::new(30.0, 2.0, 0.0)));
    }

    #[test]
    fn test_escape_runs_away_to_cover() {
        // Hills terrain is not safe and there is one forest location to fall back on
        let mut w = world(10.0);
        let forest = w.locations.add("Forest", LocationKind::Forest, Some(Vec3::new(-40.0, 10.0, 0.0)));
        let zebra = w.spawn(RosterEntry::new("Stripe", Species::Zebra, Gender::Female, 4.0, 70.0).with_home(0.0, 0.0));
        w.spawn(RosterEntry::new("Leo", Species::Lion, Gender::Male, 8.0, 100.0).with_home(5.0, 0.0));
        w.rebuild_grid();

        dispatch(&mut w, zebra, Action::Escape, "run", ThoughtSource::Reflex);
        // FlatTerrain(10) is Hills everywhere, so the forest entry never matches by terrain
        let agent = w.agent(zebra).unwrap();
        let target = agent.movement_target.unwrap();
        assert!(target.x < -29.0, "should flee away from the lion, got {:?}", target);
        assert_eq!(agent.flee_destination, agent.movement_target);
        assert_ne!(agent.target_location, Some(forest));
    }

    #[test]
    fn test_escape_substitutes_forest_cover() {
        let mut w = World::new(SimulationConfig::default(), Box::new(WestForest), LocationCatalog::new());
        let forest = w.locations.add("Acacia Grove", LocationKind::Forest, Some(Vec3::new(-80.0, 5.0, 0.0)));
        w.locations.add("Far Grove", LocationKind::Forest, Some(Vec3::new(-200.0, 5.0, 0.0)));
        let zebra = w.spawn(RosterEntry::new("Stripe", Species::Zebra, Gender::Female, 4.0, 70.0).with_home(0.0, 0.0));
        w.spawn(RosterEntry::new("Leo", Species::Lion, Gender::Male, 8.0, 100.0).with_home(5.0, 0.0));
        w.rebuild_grid();

        dispatch(&mut w, zebra, Action::Escape, "run", ThoughtSource::Reflex);

        // The raw projection lands on hills, so the nearest forest replaces it
        let agent = w.agent(zebra).unwrap();
        assert_eq!(agent.target_location, Some(forest));
        assert_eq!(agent.movement_target, Some(Vec3::new(-80.0, 6.0, 0.0)));
        assert_eq!(agent.flee_destination, agent.movement_target);
    }

    fn with_routine(w: &mut World, morning: &[&str]) -> AgentId {
        let mut entry = RosterEntry::new("Twiga", Species::Giraffe, Gender::Female, 6.0, 150.0).with_home(0.0, 0.0);
        entry.routine.morning = morning.iter().map(|p| p.to_string()).collect();
        w.spawn(entry)
    }

    #[test]
    fn test_routine_visits_named_location() {
        let mut w = world(1.0);
        let tree = w.locations.add("Marula Tree", LocationKind::Tree, Some(Vec3::new(15.0, 1.0, 5.0)));
        let id = with_routine(&mut w, &["Marula Tree"]);

        dispatch(&mut w, id, Action::Routine, "routine", ThoughtSource::Heuristic);
        let agent = w.agent(id).unwrap();
        assert_eq!(agent.activity, Activity::Routine);
        assert_eq!(agent.target_location, Some(tree));
        assert_eq!(agent.movement_target, Some(Vec3::new(15.0, 2.0, 5.0)));
    }

    #[test]
    fn test_routine_samples_terrain_category() {
        let mut w = world(1.0);
        let id = with_routine(&mut w, &["lowland"]);

        dispatch(&mut w, id, Action::Routine, "routine", ThoughtSource::Heuristic);
        let agent = w.agent(id).unwrap();
        assert!(agent.target_location.is_none());
        let target = agent.movement_target.unwrap();
        let radius = w.config.decision.terrain_search_radius;
        assert!(target.x.abs() <= radius && target.z.abs() <= radius);
        assert_eq!(target.y, 2.0);
    }

    #[test]
    fn test_routine_at_current_place_stays_put() {
        let mut w = world(1.0);
        let id = with_routine(&mut w, &["Twiga's home"]);

        dispatch(&mut w, id, Action::Routine, "routine", ThoughtSource::Heuristic);
        let agent = w.agent(id).unwrap();
        assert!(agent.movement_target.is_none());
        assert_eq!(agent.current_location, agent.home);
    }

    #[test]
    fn test_empty_routine_explores() {
        let mut w = world(1.0);
        w.locations.add("Big Rock", LocationKind::BigRock, Some(Vec3::new(20.0, 1.0, 0.0)));
        let id = with_routine(&mut w, &[]);

        dispatch(&mut w, id, Action::Routine, "routine", ThoughtSource::Heuristic);
        let agent = w.agent(id).unwrap();
        assert_eq!(agent.activity, Activity::Exploring);
        assert_eq!(agent.movement_target, Some(Vec3::new(20.0, 2.0, 0.0)));
    }
}
