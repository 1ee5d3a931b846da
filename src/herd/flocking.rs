//! Boids-style steering for herd species
//!
//! Steering for every eligible agent is computed from the start-of-tick
//! positions, then applied one agent at a time during the tick loop. The
//! computation is read-only, so it runs on rayon above the parallel threshold.

use crate::core::config::HerdConfig;
use crate::core::types::{AgentId, Vec3};
use crate::entity::agent::Agent;
use crate::herd::HerdRegistry;
use crate::spatial::SparseHashGrid;
use rayon::prelude::*;

/// Whether flocking may move this agent this tick.
///
/// Flocking is the lowest-priority mover: an explicit target, a hunt, a
/// flight or an active follow order all take precedence.
pub fn is_eligible(agent: &Agent, herds: &HerdRegistry, spacing: f32) -> bool {
    if !agent.alive || !agent.species.forms_herd() {
        return false;
    }
    if agent.movement_target.is_some() || agent.hunt.is_hunting || agent.hunt.is_being_hunted {
        return false;
    }
    match agent.herd {
        Some(herd) => herds.follow_target(herd, agent.id, spacing).is_none(),
        None => true,
    }
}

/// Weighted steering vector for `me` from its neighbours
pub fn steering<'a>(me: &Agent, neighbours: impl Iterator<Item = &'a Agent>, config: &HerdConfig) -> Vec3 {
    let mut separation = Vec3::ZERO;
    let mut predator = Vec3::ZERO;
    let mut centroid = Vec3::ZERO;
    let mut flock_count = 0usize;

    for other in neighbours {
        if other.id == me.id || !other.alive {
            continue;
        }
        let offset = (me.position - other.position).planar();
        let d = offset.length();

        if other.species == me.species && d <= config.flock_radius {
            if d > 0.0001 {
                separation += offset.normalize() * (1.0 / d);
            }
            centroid += other.position.planar();
            flock_count += 1;
        } else if other.preys_on(me) && d <= config.threat_radius && d > 0.0001 {
            predator += offset.normalize() * (1.0 / d);
        }
    }

    let cohesion = if flock_count > 0 {
        centroid * (1.0 / flock_count as f32) - me.position.planar()
    } else {
        Vec3::ZERO
    };

    separation * config.separation_weight + predator * config.predator_weight + cohesion * config.cohesion_weight
}

/// Unit steering directions for every agent, `None` where flocking does not apply
pub fn compute_steering(
    agents: &[Agent],
    grid: &SparseHashGrid,
    herds: &HerdRegistry,
    config: &HerdConfig,
    parallel_threshold: usize,
) -> Vec<Option<Vec3>> {
    let radius = config.flock_radius.max(config.threat_radius);
    let position_of = |id: AgentId| agents.get(id.index()).filter(|a| a.alive).map(|a| a.position);

    let one = |agent: &Agent| -> Option<Vec3> {
        if !is_eligible(agent, herds, config.formation_spacing) {
            return None;
        }
        let nearby = grid.query_radius(agent.position, radius, position_of);
        let steer = steering(agent, nearby.iter().filter_map(|id| agents.get(id.index())), config);
        if steer.length() > config.steering_epsilon {
            Some(steer.normalize())
        } else {
            None
        }
    };

    if agents.len() >= parallel_threshold {
        agents.par_iter().map(one).collect()
    } else {
        agents.iter().map(one).collect()
    }
}
