//! Death transition and reference cleanup
//!
//! Dead agents stay in the roster so ids remain stable. Everything that
//! could point at them is cleared here, in one pass.

use crate::actions::Activity;
use crate::core::types::AgentId;
use crate::ecs::world::World;
use crate::entity::agent::HuntState;
use crate::simulation::tick::SimulationEvent;
use crate::ui::log::LogCategory;

/// Kill an agent. Returns false if it was already dead or unknown.
pub fn kill(world: &mut World, id: AgentId, killer: Option<AgentId>) -> bool {
    let now = world.now();

    let (name, herd, position) = {
        let Some(agent) = world.agent_mut(id) else {
            return false;
        };
        if !agent.alive {
            return false;
        }
        agent.alive = false;
        agent.hp = 0.0;
        agent.activity = Activity::Dead;
        agent.thought = String::new();
        agent.is_thinking = false;
        agent.movement_target = None;
        agent.target_location = None;
        agent.flee_destination = None;
        agent.hunt = HuntState::default();
        agent.reproduction.is_pregnant = false;
        agent.reproduction.father = None;
        agent.timers.activity_expires_at = None;
        (agent.name.clone(), agent.herd.take(), agent.position)
    };

    for other in world.agents.iter_mut() {
        other.relationships.remove(id);
        if other.hunt.target == Some(id) {
            other.hunt.stop_hunting();
        }
        if other.hunt.hunter == Some(id) {
            other.hunt.stop_fleeing();
        }
        if other.reproduction.father == Some(id) {
            other.reproduction.father = None;
        }
    }

    if let Some(herd) = herd {
        if let Some(leader) = world.herds.remove_member(herd, id) {
            let leader_name = world.agent(leader).map(|a| a.name.clone()).unwrap_or_default();
            world.log.add(
                now,
                format!("{} now leads the herd", leader_name),
                LogCategory::Herd,
            );
            world.events.push(SimulationEvent::LeaderPromoted { herd, leader });
        }
    }

    world.grid.remove(id, position);

    let cause = killer
        .and_then(|k| world.agent(k))
        .map(|k| format!("killed by {}", k.name))
        .unwrap_or_else(|| "unknown causes".to_string());
    tracing::info!(agent = %id, %name, %cause, "agent died");
    world.log.add(now, format!("{} has died ({})", name, cause), LogCategory::Death);
    world.events.push(SimulationEvent::Death { agent: id, killer });

    true
}
