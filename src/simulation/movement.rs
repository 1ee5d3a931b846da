//! Movement, arrival, pursuit and flight
//!
//! Agents move in straight lines. After every horizontal step the height is
//! re-snapped to the terrain plus the standing offset.

use crate::actions::{Action, Activity};
use crate::combat::attack;
use crate::core::config::SpeedConfig;
use crate::core::types::{AgentId, LocationId, Vec3};
use crate::ecs::world::World;
use crate::entity::agent::Agent;
use crate::entity::thoughts::ThoughtSource;
use crate::simulation::action_execute::dispatch;
use crate::simulation::consumption::{at_food, at_rest, at_water};
use crate::simulation::tick::SimulationEvent;
use crate::ui::log::LogCategory;

/// Situation multiplier; the hunted state wins over everything else
pub fn situation_multiplier(agent: &Agent, speed: &SpeedConfig) -> f32 {
    if agent.hunt.is_being_hunted {
        speed.escaping
    } else if agent.hunt.is_hunting {
        speed.hunting
    } else if agent.activity == Activity::Resting {
        speed.resting
    } else if agent.activity == Activity::Exploring {
        speed.exploring
    } else {
        speed.normal
    }
}

pub fn effective_speed(agent: &Agent, speed: &SpeedConfig) -> f32 {
    agent.speed * situation_multiplier(agent, speed)
}

/// Move `agent` up to `max_step` toward `target` on the plane. Returns the
/// remaining planar distance.
fn step_toward(world: &mut World, id: AgentId, target: Vec3, max_step: f32) -> f32 {
    let Some(agent) = world.agent(id) else {
        return 0.0;
    };
    let offset = (target - agent.position).planar();
    let distance = offset.length();
    if distance <= f32::EPSILON {
        return 0.0;
    }
    let travel = max_step.min(distance);
    let next = agent.position + offset.normalize() * travel;
    let grounded = world.ground(next.x, next.z);
    if let Some(agent) = world.agent_mut(id) {
        agent.position = grounded;
        agent.face(offset);
    }
    distance - travel
}

/// Move `distance` along `direction`, re-snapping height
pub(crate) fn step_along(world: &mut World, id: AgentId, direction: Vec3, distance: f32) {
    let Some(agent) = world.agent(id) else {
        return;
    };
    let dir = direction.planar().normalize();
    let next = agent.position + dir * distance;
    let grounded = world.ground(next.x, next.z);
    if let Some(agent) = world.agent_mut(id) {
        agent.position = grounded;
        agent.face(dir);
    }
}

/// Head for a catalog location, placing it first if it has no position yet
pub fn move_to_location(world: &mut World, id: AgentId, location: LocationId) -> bool {
    let position = world
        .locations
        .resolve_position(location, world.terrain.as_ref(), &mut world.rng);
    match position {
        Some(point) => {
            move_to_point(world, id, point, Some(location));
            true
        }
        None => false,
    }
}

/// Head for a point. A herd leader also sets the herd's shared target.
pub fn move_to_point(world: &mut World, id: AgentId, point: Vec3, location: Option<LocationId>) {
    let now = world.now();
    let target = world.ground(point.x, point.z);
    let destination = match location {
        Some(loc) => world.locations.name_of(Some(loc)).to_string(),
        None => format!("({:.0}, {:.0})", target.x, target.z),
    };

    let (name, from, herd, speed, species) = {
        let Some(agent) = world.agent_mut(id) else {
            return;
        };
        agent.target_location = location;
        agent.movement_target = Some(target);
        agent.timers.last_action_time = now;
        let from = agent.position;
        agent.face(target - from);
        (agent.name.clone(), from, agent.herd, agent.speed, agent.species)
    };

    if let Some(herd_id) = herd {
        if let Some(herd) = world.herds.get_mut(herd_id) {
            if herd.is_leader(id) && herd.len() > 1 {
                if let Err(err) = herd.direct(id, Some(target), from) {
                    tracing::warn!(%err, "herd direction rejected");
                }
            }
        }
    }

    let origin = world.locations.name_of(world.agent(id).and_then(|a| a.current_location)).to_string();
    tracing::debug!(agent = %id, %destination, "move started");
    world.log.add_detailed(
        now,
        format!("{} heads to {}", name, destination),
        LogCategory::Move,
        format!("from: {}\nto: {}\nspeed: {:.2}\nspecies: {}", origin, destination, speed, species),
    );
    world.events.push(SimulationEvent::MoveStarted { agent: id, destination });
}

/// Advance toward the movement target or the herd formation slot
pub fn update_movement(world: &mut World, id: AgentId, dt: f32) {
    let threshold = world.config.speed.arrival_threshold;
    let spacing = world.config.herd.formation_spacing;

    let (target, follow, step) = {
        let Some(agent) = world.agent(id) else {
            return;
        };
        if !agent.alive {
            return;
        }
        // Pursuit and flight own movement while their counterpart lives
        if agent.hunt.is_hunting && agent.hunt.target.map(|t| world.is_alive(t)).unwrap_or(false) {
            return;
        }
        if agent.hunt.is_being_hunted && agent.hunt.hunter.map(|h| world.is_alive(h)).unwrap_or(false) {
            return;
        }
        let follow = agent.herd.and_then(|h| world.herds.follow_target(h, id, spacing));
        (agent.movement_target, follow, effective_speed(agent, &world.config.speed) * dt)
    };

    if let Some(slot) = follow {
        step_toward(world, id, slot, step);
        return;
    }

    let Some(target) = target else {
        return;
    };
    let distance = match world.agent(id) {
        Some(agent) => agent.position.planar_distance(&target),
        None => return,
    };
    let remaining = if distance < threshold {
        0.0
    } else {
        step_toward(world, id, target, step)
    };
    if remaining < threshold {
        on_arrival(world, id);
    }
}

/// Arrival at the movement target. Fires once: the target is cleared first.
pub fn on_arrival(world: &mut World, id: AgentId) {
    let now = world.now();
    let (name, location, activity, position, herd) = {
        let Some(agent) = world.agent_mut(id) else {
            return;
        };
        agent.movement_target = None;
        let arrived_at = agent.target_location.take();
        if arrived_at.is_some() {
            agent.current_location = arrived_at;
        }
        (agent.name.clone(), arrived_at, agent.activity, agent.position, agent.herd)
    };

    if let Some(herd) = herd.and_then(|h| world.herds.get_mut(h)) {
        if herd.is_leader(id) {
            // Leader-only write, cannot fail here
            let _ = herd.direct(id, None, position);
        }
    }

    let place = match location {
        Some(_) => world.locations.name_of(location).to_string(),
        None => "open ground".to_string(),
    };
    tracing::debug!(agent = %id, %place, "arrived");
    world.log.add(now, format!("{} arrived at {}", name, place), LogCategory::Arrival);
    world.events.push(SimulationEvent::Arrived { agent: id, location });

    let serves = {
        let Some(agent) = world.agent(id) else {
            return;
        };
        match activity {
            Activity::Eating => at_food(world, agent),
            Activity::Drinking => at_water(world, agent),
            Activity::Resting => at_rest(world, agent),
            Activity::Escaping => true,
            _ => false,
        }
    };

    if serves {
        let duration = world.config.needs.consumption_duration;
        if let Some(agent) = world.agent_mut(id) {
            if activity == Activity::Escaping {
                agent.hunt.stop_fleeing();
                agent.flee_destination = None;
                agent.activity = Activity::Resting;
                agent.think(now, "Safe, for now...", ThoughtSource::Reflex);
            }
            agent.timers.activity_expires_at = Some(now + duration);
        }
        return;
    }

    let action = {
        let Some(agent) = world.agent(id) else {
            return;
        };
        let cfg = &world.config.decision;
        if agent.needs.hunger > cfg.arrival_hunger_threshold {
            Action::Eat
        } else if agent.needs.thirst > cfg.arrival_thirst_threshold {
            Action::Drink
        } else if agent.hp < agent.max_hp * cfg.arrival_hp_fraction {
            Action::Rest
        } else {
            Action::Explore
        }
    };
    dispatch(world, id, action, action.default_thought(), ThoughtSource::Reflex);
}

/// Pursuit (with attacks in strike range) and flight
pub fn update_hunting(world: &mut World, id: AgentId, dt: f32) {
    pursue(world, id, dt);
    flee(world, id, dt);
}

fn pursue(world: &mut World, id: AgentId, dt: f32) {
    let strike = world.config.perception.strike_range;
    let give_up = world.config.perception.give_up_range;
    let now = world.now();

    let (target, position, step, started, name) = {
        let Some(agent) = world.agent(id) else {
            return;
        };
        if !agent.alive || !agent.hunt.is_hunting {
            return;
        }
        (
            agent.hunt.target,
            agent.position,
            effective_speed(agent, &world.config.speed) * dt,
            agent.hunt.started,
            agent.name.clone(),
        )
    };

    let prey = target.and_then(|t| world.agent(t)).filter(|t| t.alive).map(|t| (t.id, t.position, t.name.clone()));
    let Some((prey, prey_position, prey_name)) = prey else {
        abandon_hunt(world, id, target, "My prey is gone...");
        return;
    };

    let distance = position.planar_distance(&prey_position);
    if distance <= strike {
        if !started {
            if let Some(agent) = world.agent_mut(id) {
                agent.hunt.started = true;
            }
            world.log.add(now, format!("{} starts hunting {}", name, prey_name), LogCategory::Hunt);
        }
        attack(world, id, prey);
    } else if distance > give_up {
        world.log.add(now, format!("{} lost track of {}", name, prey_name), LogCategory::Hunt);
        abandon_hunt(world, id, Some(prey), "It got away...");
    } else {
        step_toward(world, id, prey_position, step.min(distance - strike * 0.5));
    }
}

fn abandon_hunt(world: &mut World, id: AgentId, target: Option<AgentId>, thought: &str) {
    if let Some(agent) = world.agent_mut(id) {
        agent.hunt.stop_hunting();
    }
    tracing::debug!(agent = %id, ?target, "hunt abandoned");
    world.events.push(SimulationEvent::HuntAbandoned { hunter: id, target });
    dispatch(world, id, Action::Explore, thought, ThoughtSource::Reflex);
}

fn flee(world: &mut World, id: AgentId, dt: f32) {
    let clear = world.config.perception.escape_clear_distance;
    let threshold = world.config.speed.arrival_threshold;
    let flock_radius = world.config.herd.flock_radius;
    let now = world.now();

    let (hunter, position, destination, herd, step, name) = {
        let Some(agent) = world.agent(id) else {
            return;
        };
        if !agent.alive || !agent.hunt.is_being_hunted {
            return;
        }
        (
            agent.hunt.hunter,
            agent.position,
            agent.flee_destination,
            agent.herd,
            effective_speed(agent, &world.config.speed) * dt,
            agent.name.clone(),
        )
    };

    let threat = hunter.and_then(|h| world.agent(h)).filter(|h| h.alive).map(|h| (h.position, h.name.clone()));
    let Some((threat_position, hunter_name)) = threat else {
        if let Some(agent) = world.agent_mut(id) {
            agent.hunt.stop_fleeing();
        }
        return;
    };

    let reached = destination
        .map(|d| position.planar_distance(&d) <= threshold)
        .unwrap_or(false);
    let herd_safe = herd
        .and_then(|h| world.herds.get(h))
        .and_then(|h| h.shared_target())
        .map(|t| position.planar_distance(&t) <= flock_radius)
        .unwrap_or(false);

    if position.planar_distance(&threat_position) > clear || reached || herd_safe {
        if let Some(agent) = world.agent_mut(id) {
            agent.hunt.stop_fleeing();
            if reached {
                agent.flee_destination = None;
            }
        }
        tracing::debug!(agent = %id, "escaped");
        world.log.add(now, format!("{} escaped from {}", name, hunter_name), LogCategory::Hunt);
        return;
    }

    let mut away = (position - threat_position).planar();
    if away.length() < 0.0001 {
        away = destination.map(|d| d - position).unwrap_or(Vec3::flat(1.0, 0.0));
    }
    step_along(world, id, away, step);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::core::types::Gender;
    use crate::entity::roster::RosterEntry;
    use crate::entity::species::Species;
    use crate::world::location::{LocationCatalog, LocationKind};
    use crate::world::terrain::FlatTerrain;

    fn world() -> World {
        World::new(SimulationConfig::default(), Box::new(FlatTerrain(1.0)), LocationCatalog::new())
    }

    #[test]
    fn test_situation_precedence() {
        let cfg = SpeedConfig::default();
        let mut w = world();
        let id = w.spawn(RosterEntry::new("Stripe", Species::Zebra, Gender::Female, 4.0, 70.0));
        let agent = &mut w.agents[id.index()];
        agent.activity = Activity::Resting;
        assert_eq!(situation_multiplier(agent, &cfg), cfg.resting);
        agent.hunt.is_hunting = true;
        assert_eq!(situation_multiplier(agent, &cfg), cfg.hunting);
        agent.hunt.is_being_hunted = true;
        assert_eq!(situation_multiplier(agent, &cfg), cfg.escaping);
    }

    #[test]
    fn test_move_snaps_to_terrain() {
        let mut w = world();
        let id = w.spawn(RosterEntry::new("Tusk", Species::Elephant, Gender::Male, 8.0, 150.0).with_home(0.0, 0.0));
        move_to_point(&mut w, id, Vec3::new(20.0, -7.0, 0.0), None);
        update_movement(&mut w, id, 0.5);
        let agent = w.agent(id).unwrap();
        assert_eq!(agent.position.y, 2.0);
        assert!(agent.position.x > 0.0);
        assert_eq!(agent.movement_target, Some(Vec3::new(20.0, 2.0, 0.0)));
    }

    #[test]
    fn test_arrival_sets_current_location() {
        let mut w = world();
        let pond = w.locations.add("Pond", LocationKind::Pond, Some(Vec3::new(3.0, 1.0, 0.0)));
        let id = w.spawn(RosterEntry::new("Tusk", Species::Elephant, Gender::Male, 8.0, 150.0).with_home(0.0, 0.0));
        w.agents[id.index()].activity = Activity::Drinking;
        assert!(move_to_location(&mut w, id, pond));

        for _ in 0..20 {
            update_movement(&mut w, id, 0.1);
        }
        let agent = w.agent(id).unwrap();
        assert_eq!(agent.current_location, Some(pond));
        assert!(agent.movement_target.is_none());
        assert!(agent.timers.activity_expires_at.is_some());
    }

    #[test]
    fn test_leader_move_sets_shared_target() {
        let mut w = world();
        let leader = w.spawn(RosterEntry::new("A", Species::Zebra, Gender::Female, 4.0, 70.0).with_home(0.0, 0.0));
        let follower = w.spawn(RosterEntry::new("B", Species::Zebra, Gender::Male, 4.0, 70.0).with_home(2.0, 2.0));
        let herd = w.agent(leader).unwrap().herd.unwrap();

        move_to_point(&mut w, leader, Vec3::flat(40.0, 0.0), None);
        assert_eq!(w.herds.get(herd).unwrap().shared_target(), Some(Vec3::new(40.0, 2.0, 0.0)));

        // Followers never write the shared target
        move_to_point(&mut w, follower, Vec3::flat(-40.0, 0.0), None);
        assert_eq!(w.herds.get(herd).unwrap().shared_target(), Some(Vec3::new(40.0, 2.0, 0.0)));
    }

    #[test]
    fn test_pursuit_gives_up_beyond_range() {
        let mut w = world();
        let lion = w.spawn(RosterEntry::new("Leo", Species::Lion, Gender::Male, 8.0, 100.0).with_home(0.0, 0.0));
        let zebra = w.spawn(RosterEntry::new("Stripe", Species::Zebra, Gender::Female, 4.0, 70.0).with_home(30.0, 0.0));
        w.agents[lion.index()].hunt.is_hunting = true;
        w.agents[lion.index()].hunt.target = Some(zebra);

        update_hunting(&mut w, lion, 0.1);

        let agent = w.agent(lion).unwrap();
        assert!(!agent.hunt.is_hunting);
        assert!(agent.hunt.target.is_none());
        assert!(w
            .events
            .iter()
            .any(|e| matches!(e, SimulationEvent::HuntAbandoned { hunter, .. } if *hunter == lion)));
    }

    #[test]
    fn test_flight_moves_away_from_hunter() {
        let mut w = world();
        let lion = w.spawn(RosterEntry::new("Leo", Species::Lion, Gender::Male, 8.0, 100.0).with_home(0.0, 0.0));
        let zebra = w.spawn(RosterEntry::new("Stripe", Species::Zebra, Gender::Female, 4.0, 70.0).with_home(5.0, 0.0));
        w.agents[zebra.index()].hunt.is_being_hunted = true;
        w.agents[zebra.index()].hunt.hunter = Some(lion);

        update_hunting(&mut w, zebra, 1.0);
        let agent = w.agent(zebra).unwrap();
        // 9 units/s * 1.4
        assert!((agent.position.x - (5.0 + 12.6)).abs() < 1e-3);
        assert!(agent.hunt.is_being_hunted);

        w.agents[zebra.index()].position = Vec3::new(40.0, 2.0, 0.0);
        update_hunting(&mut w, zebra, 0.1);
        assert!(!w.agent(zebra).unwrap().hunt.is_being_hunted);
    }

    fn arrive_hungry(w: &mut World) -> AgentId {
        let id = w.spawn(RosterEntry::new("Stripe", Species::Zebra, Gender::Female, 4.0, 70.0).with_home(0.0, 0.0));
        w.agents[id.index()].needs.hunger = 0.5;
        w.agents[id.index()].activity = Activity::Exploring;
        move_to_point(w, id, Vec3::flat(1.0, 0.0), None);
        for _ in 0..3 {
            update_movement(w, id, 0.1);
        }
        id
    }

    #[test]
    fn test_arrival_recheck_uses_configured_thresholds() {
        // Below the default 0.7: nothing new to explore, so it rests
        let mut w = world();
        let id = arrive_hungry(&mut w);
        assert_eq!(w.agent(id).unwrap().activity, Activity::Resting);

        let mut w = world();
        w.config.decision.arrival_hunger_threshold = 0.4;
        let id = arrive_hungry(&mut w);
        assert_eq!(w.agent(id).unwrap().activity, Activity::Eating);
    }

    fn hunted_follower(w: &mut World, herd_target: Vec3) -> AgentId {
        let leader = w.spawn(RosterEntry::new("A", Species::Zebra, Gender::Female, 4.0, 70.0).with_home(0.0, 0.0));
        let follower = w.spawn(RosterEntry::new("B", Species::Zebra, Gender::Male, 4.0, 70.0).with_home(2.0, 0.0));
        let lion = w.spawn(RosterEntry::new("Leo", Species::Lion, Gender::Male, 8.0, 100.0).with_home(6.0, 0.0));
        move_to_point(w, leader, herd_target, None);
        w.agents[follower.index()].hunt.is_being_hunted = true;
        w.agents[follower.index()].hunt.hunter = Some(lion);
        follower
    }

    #[test]
    fn test_flight_ends_near_herd_target() {
        let mut w = world();
        let follower = hunted_follower(&mut w, Vec3::flat(-5.0, 0.0));

        update_hunting(&mut w, follower, 0.1);
        let agent = w.agent(follower).unwrap();
        assert!(!agent.hunt.is_being_hunted);
        assert!(agent.hunt.hunter.is_none());
        assert_eq!(agent.position, Vec3::new(2.0, 2.0, 0.0));
    }

    #[test]
    fn test_flight_continues_far_from_herd_target() {
        let mut w = world();
        let follower = hunted_follower(&mut w, Vec3::flat(-40.0, 0.0));

        update_hunting(&mut w, follower, 0.1);
        let agent = w.agent(follower).unwrap();
        assert!(agent.hunt.is_being_hunted);
        assert!(agent.position.x < 2.0);
    }
}
