//! Action selection - the escape reflex, the weighted heuristic and the
//! liveness default
//!
//! Decisions happen on a per-agent timer. With a decision provider the
//! request is handed to the bridge and the agent keeps its current activity
//! until the reply is drained; without one (or when it fails) the weighted
//! heuristic picks the action synchronously.

use crate::actions::Action;
use crate::core::types::AgentId;
use crate::ecs::world::World;
use crate::entity::thoughts::ThoughtSource;
use crate::llm::context::SituationContext;
use crate::simulation::action_execute::{adopt, dispatch, is_current_place, pick_routine_place, visit_routine_place};
use crate::simulation::perception::{nearest_predator, perceive, Perception};
use crate::simulation::tick::SimulationEvent;
use crate::ui::log::LogCategory;

/// Everything the weighted heuristic looks at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionInputs {
    pub hunger: f32,
    pub thirst: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub is_predator: bool,
    pub predator_nearby: bool,
    pub prey_nearby: bool,
}

impl DecisionInputs {
    pub fn gather(world: &World, id: AgentId, perception: &Perception) -> Option<Self> {
        let agent = world.agent(id)?;
        Some(Self {
            hunger: agent.needs.hunger,
            thirst: agent.needs.thirst,
            hp: agent.hp,
            max_hp: agent.max_hp,
            is_predator: agent.is_predator(),
            predator_nearby: perception.predator_nearby(),
            prey_nearby: perception.prey_nearby(),
        })
    }
}

fn slot(action: Action) -> usize {
    action as usize
}

/// Priority of every action, indexed in declaration order
pub fn score_actions(inputs: &DecisionInputs) -> [i32; 7] {
    let mut scores = [0; 7];

    if inputs.hunger > 0.7 {
        scores[slot(Action::Eat)] += 3;
    }
    if inputs.thirst > 0.7 {
        scores[slot(Action::Drink)] += 3;
    }
    if inputs.hp < inputs.max_hp * 0.5 {
        scores[slot(Action::Rest)] += 2;
    }
    if inputs.predator_nearby {
        scores[slot(Action::Escape)] += 4;
    }
    if inputs.prey_nearby && inputs.hunger > 0.3 {
        scores[slot(Action::Hunt)] += 3;
    }
    if inputs.is_predator && inputs.hunger > 0.5 {
        scores[slot(Action::Hunt)] += 2;
    }

    scores
}

/// Strictly highest score; ties go to the first-declared action
pub fn select_action(scores: &[i32; 7]) -> Action {
    let mut best = Action::ALL[0];
    for action in Action::ALL {
        if scores[slot(action)] > scores[slot(best)] {
            best = action;
        }
    }
    best
}

/// Display thought for a heuristic choice
pub fn heuristic_thought(action: Action, inputs: &DecisionInputs) -> &'static str {
    match action {
        Action::Hunt if inputs.prey_nearby => "Prey spotted!",
        Action::Escape => "I sense danger!",
        Action::Eat => "My stomach is empty...",
        Action::Drink => "My throat is parched...",
        Action::Rest => "I'm worn out...",
        other => other.default_thought(),
    }
}

/// Weighted heuristic decision for `id`.
///
/// A visible predator also marks the agent as hunted by the nearest one.
pub fn default_thought(world: &mut World, id: AgentId) -> Option<(Action, String)> {
    let radius = world.config.perception.sensing_radius;
    let perception = perceive(world, id, radius);
    let inputs = DecisionInputs::gather(world, id, &perception)?;

    if let Some(&hunter) = perception.predators.first() {
        let agent = world.agent_mut(id)?;
        agent.hunt.is_being_hunted = true;
        agent.hunt.hunter = Some(hunter);
    }

    let action = select_action(&score_actions(&inputs));
    Some((action, heuristic_thought(action, &inputs).to_string()))
}

/// Pre-emptive escape: a non-predator with a living predator inside the
/// escape radius flees at once, bypassing scoring and the provider.
///
/// Returns true when an escape was dispatched. An agent already fleeing
/// from that predator is left alone.
pub fn check_escape(world: &mut World, id: AgentId) -> bool {
    let radius = world.config.perception.escape_radius;
    let current = match world.agent(id) {
        Some(agent) if agent.alive && !agent.is_predator() => agent.hunt.hunter.filter(|_| agent.hunt.is_being_hunted),
        _ => return false,
    };
    let Some((predator, distance)) = nearest_predator(world, id, radius) else {
        return false;
    };
    if current == Some(predator) {
        return false;
    }

    if let Some(agent) = world.agent_mut(id) {
        agent.hunt.is_being_hunted = true;
        agent.hunt.hunter = Some(predator);
    }
    let predator_name = world.agent(predator).map(|p| p.name.clone()).unwrap_or_default();
    tracing::debug!(agent = %id, %predator, distance, "escape reflex");
    world.events.push(SimulationEvent::EscapeTriggered { agent: id, predator });
    dispatch(
        world,
        id,
        Action::Escape,
        format!("{} is too close!", predator_name),
        ThoughtSource::Reflex,
    );
    true
}

/// Run one decision without a provider: reflex first, then the heuristic
pub fn decide(world: &mut World, id: AgentId) -> Option<Action> {
    if !world.is_alive(id) {
        return None;
    }
    if check_escape(world, id) {
        return Some(Action::Escape);
    }
    let (action, thought) = default_thought(world, id)?;
    dispatch(world, id, action, thought, ThoughtSource::Heuristic);
    Some(action)
}

pub(crate) fn schedule_next_think(world: &mut World, id: AgentId) {
    let now = world.now();
    let interval = world.config.decision.think_interval.sample(&mut world.rng);
    if let Some(agent) = world.agent_mut(id) {
        agent.timers.next_think_at = now + interval;
    }
}

/// Hand the decision to the provider. False when no request was made.
fn request_provider_decision(world: &mut World, id: AgentId) -> bool {
    if world.bridge.is_none() {
        return false;
    }
    // The reflex never waits on the network
    if check_escape(world, id) {
        schedule_next_think(world, id);
        return true;
    }

    let perception = perceive(world, id, world.config.perception.sensing_radius);
    let Some(context) = SituationContext::from_world(world, id, &perception) else {
        return false;
    };
    let Some(bridge) = world.bridge.as_mut() else {
        return false;
    };
    bridge.request(id, &context);
    if let Some(agent) = world.agent_mut(id) {
        agent.is_thinking = true;
    }
    tracing::debug!(agent = %id, "decision requested from provider");
    true
}

/// Timer-driven decision plus the idle liveness check
pub fn update_thinking(world: &mut World, id: AgentId) {
    let now = world.now();
    let due = match world.agent(id) {
        Some(agent) => agent.alive && !agent.is_thinking && now >= agent.timers.next_think_at,
        None => false,
    };

    if due && !request_provider_decision(world, id) {
        decide(world, id);
        schedule_next_think(world, id);
    }

    check_idle(world, id);
}

/// Force a default action on an agent that has been idle too long
pub fn check_idle(world: &mut World, id: AgentId) {
    let now = world.now();
    let spacing = world.config.herd.formation_spacing;
    let idle = match world.agent(id) {
        Some(a) => {
            a.alive
                && a.movement_target.is_none()
                && !a.hunt.is_hunting
                && !a.hunt.is_being_hunted
                && a.timers.activity_expires_at.is_none()
                && a.herd.and_then(|h| world.herds.follow_target(h, id, spacing)).is_none()
                && now - a.timers.last_action_time > a.timers.idle_delay
        }
        None => false,
    };
    if !idle {
        return;
    }

    default_action(world, id);
    let delay = world.config.decision.idle_action_delay.sample(&mut world.rng);
    if let Some(agent) = world.agent_mut(id) {
        agent.timers.idle_delay = delay;
        agent.timers.last_action_time = now;
    }
}

/// Threshold-driven action that never consults the provider.
///
/// With no pressing need the agent heads for a routine place, or explores
/// when the routine puts it where it already stands.
pub fn default_action(world: &mut World, id: AgentId) -> Option<Action> {
    let cfg = &world.config.decision;
    let agent = world.agent(id)?;
    if !agent.alive {
        return None;
    }

    let need = if agent.needs.hunger > cfg.default_hunger_threshold {
        Some(Action::Eat)
    } else if agent.needs.thirst > cfg.default_thirst_threshold {
        Some(Action::Drink)
    } else if agent.hp < agent.max_hp * cfg.default_hp_fraction {
        Some(Action::Rest)
    } else {
        None
    };
    if let Some(action) = need {
        dispatch(world, id, action, action.default_thought(), ThoughtSource::Heuristic);
        return Some(action);
    }

    match pick_routine_place(world, id) {
        Some(place) if !is_current_place(world, id, &place) => {
            let action = Action::Routine;
            if adopt(world, id, action, action.default_thought().to_string(), ThoughtSource::Heuristic) {
                visit_routine_place(world, id, &place);
            }
            Some(action)
        }
        _ => {
            let action = Action::Explore;
            dispatch(world, id, action, action.default_thought(), ThoughtSource::Heuristic);
            Some(action)
        }
    }
}

/// Apply every provider reply that has arrived.
///
/// Each reply clears the re-entrancy guard and re-rolls the timer, whatever
/// its outcome. Failures fall back to the heuristic.
pub fn apply_provider_replies(world: &mut World) {
    let replies = match world.bridge.as_mut() {
        Some(bridge) => bridge.drain(),
        None => return,
    };

    for reply in replies {
        let id = reply.agent;
        let alive = match world.agent_mut(id) {
            Some(agent) => {
                agent.is_thinking = false;
                agent.alive
            }
            None => continue,
        };
        schedule_next_think(world, id);
        if !alive {
            tracing::debug!(agent = %id, "dropping provider reply for dead agent");
            continue;
        }

        match reply.result {
            Ok(decision) => {
                dispatch(world, id, decision.action, decision.reason, ThoughtSource::Provider);
            }
            Err(err) => {
                let now = world.now();
                let name = world.agent(id).map(|a| a.name.clone()).unwrap_or_default();
                tracing::warn!(agent = %id, error = %err, "decision provider failed, using heuristic");
                world.log.add_detailed(
                    now,
                    format!("{} could not think clearly", name),
                    LogCategory::Warning,
                    err.to_string(),
                );
                world.events.push(SimulationEvent::ProviderFailure {
                    agent: id,
                    error: err.to_string(),
                });
                if let Some((action, thought)) = default_thought(world, id) {
                    dispatch(world, id, action, thought, ThoughtSource::Heuristic);
                }
            }
        }
    }
}
