//! Tick system - orchestrates simulation updates
//!
//! One tick drains provider replies, advances the clock, then walks the
//! roster in order running each living agent's full update pass:
//! needs -> herd -> reproduction -> movement -> decision -> hunting -> consumption.
//!
//! Agents born during the pass are appended after the roster snapshot and
//! first updated on the following tick.

use crate::actions::Action;
use crate::core::types::{AgentId, HerdId, LocationId, Vec3};
use crate::ecs::world::World;
use crate::entity::thoughts::ThoughtSource;
use crate::herd::flocking::{compute_steering, is_eligible};
use crate::simulation::action_select::{apply_provider_replies, check_escape, update_thinking};
use crate::simulation::consumption::{update_consumption, update_needs};
use crate::simulation::movement::{step_along, update_hunting, update_movement};
use crate::simulation::reproduction::{give_birth, update_reproduction};

/// Events generated during simulation tick
///
/// These events are returned by `run_simulation_tick` for display and tests.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationEvent {
    /// An action was dispatched to an agent
    Decision {
        agent: AgentId,
        action: Action,
        source: ThoughtSource,
    },
    /// An agent set off toward a destination
    MoveStarted {
        agent: AgentId,
        /// Location name, or coordinates for an open-ground point
        destination: String,
    },
    /// An agent reached its movement target
    Arrived {
        agent: AgentId,
        /// `None` when the target was an open-ground point
        location: Option<LocationId>,
    },
    HuntStarted {
        hunter: AgentId,
        target: AgentId,
    },
    HuntAbandoned {
        hunter: AgentId,
        target: Option<AgentId>,
    },
    /// Combat: attacker hit target
    Attack {
        attacker: AgentId,
        target: AgentId,
        damage: f32,
        /// Target hp after the hit
        target_hp: f32,
    },
    Death {
        agent: AgentId,
        killer: Option<AgentId>,
    },
    /// Pre-emptive flight from a predator inside the escape radius
    EscapeTriggered {
        agent: AgentId,
        predator: AgentId,
    },
    Conceived {
        mother: AgentId,
        father: AgentId,
    },
    Birth {
        mother: AgentId,
        offspring: Vec<AgentId>,
    },
    /// The decision provider failed and the heuristic stood in
    ProviderFailure {
        agent: AgentId,
        error: String,
    },
    /// A herd lost its leader and the next member took over
    LeaderPromoted {
        herd: HerdId,
        leader: AgentId,
    },
}

/// Run a single simulation tick of `dt` simulated seconds
pub fn run_simulation_tick(world: &mut World, dt: f64) -> Vec<SimulationEvent> {
    apply_provider_replies(world);
    world.clock.advance(dt);
    world.rebuild_grid_for_step(dt as f32);

    let steering = compute_steering(
        &world.agents,
        &world.grid,
        &world.herds,
        &world.config.herd,
        world.config.clock.parallel_threshold,
    );

    let step = dt as f32;
    let roster_len = world.agents.len();
    let mut due_births = Vec::new();

    for index in 0..roster_len {
        let id = AgentId(index as u32);
        if !world.is_alive(id) {
            continue;
        }

        update_needs(world, id, step);
        flock(world, id, steering.get(index).copied().flatten(), step);
        update_reproduction(world, id, dt, &mut due_births);
        check_escape(world, id);
        update_movement(world, id, step);
        update_thinking(world, id);
        update_hunting(world, id, step);
        update_consumption(world, id, step);
    }

    for mother in due_births {
        give_birth(world, mother);
    }

    let events = std::mem::take(&mut world.events);
    tracing::trace!(time = world.now(), events = events.len(), living = world.living_count(), "tick complete");
    events
}

/// Apply this agent's precomputed steering if flocking still applies.
///
/// Earlier agents in the pass may have given it a target or a hunter since
/// the steering was computed, so eligibility is checked again.
fn flock(world: &mut World, id: AgentId, direction: Option<Vec3>, dt: f32) {
    let Some(direction) = direction else {
        return;
    };
    let spacing = world.config.herd.formation_spacing;
    let multiplier = world.config.herd.step_multiplier;
    let distance = match world.agent(id) {
        Some(agent) if is_eligible(agent, &world.herds, spacing) => agent.speed * multiplier * dt,
        _ => return,
    };
    step_along(world, id, direction, distance);
}
