//! Reproduction - ageing, mate search, conception, gestation and birth
//!
//! Births are queued during the agent pass and resolved after it, so
//! newborns are never visited by the tick that created them.

use crate::core::types::{AgentId, Gender};
use crate::ecs::world::World;
use crate::entity::agent::Agent;
use crate::entity::roster::RosterEntry;
use crate::simulation::tick::SimulationEvent;
use crate::ui::log::LogCategory;
use rand::Rng;

fn breeding_ready(agent: &Agent, now: f64, cooldown: f64) -> bool {
    agent.alive
        && agent.reproduction.is_adult
        && agent
            .reproduction
            .last_breeding_time
            .map(|last| now - last >= cooldown)
            .unwrap_or(true)
}

/// Age the agent, advance gestation and look for a mate.
/// Mothers whose gestation is complete are pushed onto `due`.
pub fn update_reproduction(world: &mut World, id: AgentId, dt: f64, due: &mut Vec<AgentId>) {
    let now = world.now();
    let cfg = world.config.reproduction.clone();

    let (seeks_mate, grew_up, name) = {
        let Some(agent) = world.agent_mut(id) else {
            return;
        };
        if !agent.alive {
            return;
        }

        agent.age += cfg.ageing_rate * dt as f32;
        let grew_up = !agent.reproduction.is_adult && agent.age >= cfg.adult_age;
        if grew_up {
            agent.reproduction.is_adult = true;
        }

        if agent.reproduction.is_pregnant {
            agent.reproduction.pregnancy_elapsed += dt;
            if agent.reproduction.pregnancy_elapsed >= cfg.gestation_duration && !due.contains(&id) {
                due.push(id);
            }
        }

        let seeks = agent.gender == Gender::Female
            && !agent.reproduction.is_pregnant
            && breeding_ready(agent, now, cfg.breeding_cooldown);
        (seeks, grew_up, agent.name.clone())
    };

    if grew_up {
        tracing::debug!(agent = %id, "reached adulthood");
        world.log.add(now, format!("{} is fully grown", name), LogCategory::System);
    }

    if seeks_mate {
        if let Some(mate) = find_mate(world, id) {
            breed(world, id, mate);
        }
    }
}

/// Nearest adult living male of the same species within the mate radius
pub fn find_mate(world: &World, id: AgentId) -> Option<AgentId> {
    let me = world.agent(id)?;
    let radius = world.config.reproduction.mate_radius;
    world
        .nearby(id, radius)
        .into_iter()
        .map(|(other, _)| other)
        .find(|&other| {
            world
                .agent(other)
                .map(|o| o.alive && o.species == me.species && o.gender == Gender::Male && o.reproduction.is_adult)
                .unwrap_or(false)
        })
}

/// Attempt conception between `a` and `b`.
///
/// Both parties must be adult, alive, of the same species and opposite
/// genders, with the female not already pregnant and both past their
/// cooldown. A qualifying attempt stamps both breeding times whether or not
/// the roll succeeds.
pub fn breed(world: &mut World, a: AgentId, b: AgentId) -> bool {
    let now = world.now();
    let cooldown = world.config.reproduction.breeding_cooldown;
    let probability = world.config.reproduction.conception_probability;

    let (mother, father) = {
        let (Some(x), Some(y)) = (world.agent(a), world.agent(b)) else {
            return false;
        };
        if a == b || x.species != y.species || x.gender == y.gender {
            return false;
        }
        if !breeding_ready(x, now, cooldown) || !breeding_ready(y, now, cooldown) {
            return false;
        }
        if x.gender == Gender::Female {
            (a, b)
        } else {
            (b, a)
        }
    };
    if world.agent(mother).map(|m| m.reproduction.is_pregnant).unwrap_or(true) {
        return false;
    }

    for id in [mother, father] {
        if let Some(agent) = world.agent_mut(id) {
            agent.reproduction.last_breeding_time = Some(now);
        }
    }

    if !world.rng.gen_bool(probability) {
        tracing::debug!(%mother, %father, "mating without conception");
        return false;
    }

    let names = {
        let Some(m) = world.agent_mut(mother) else {
            return false;
        };
        m.reproduction.is_pregnant = true;
        m.reproduction.pregnancy_elapsed = 0.0;
        m.reproduction.father = Some(father);
        m.name.clone()
    };
    let father_name = world.agent(father).map(|f| f.name.clone()).unwrap_or_default();

    tracing::info!(%mother, %father, "conceived");
    world.log.add(
        now,
        format!("{} and {} are expecting", names, father_name),
        LogCategory::Birth,
    );
    world.events.push(SimulationEvent::Conceived { mother, father });
    true
}

/// Deliver a litter. Returns the new agents' ids (empty if the mother is
/// dead or not pregnant).
pub fn give_birth(world: &mut World, mother: AgentId) -> Vec<AgentId> {
    let now = world.now();
    let cfg = world.config.reproduction.clone();

    let Some(m) = world.agent(mother) else {
        return Vec::new();
    };
    if !m.alive || !m.reproduction.is_pregnant {
        return Vec::new();
    }
    let mother_name = m.name.clone();
    let species = m.species;
    let personality = m.personality.clone();
    let routine = m.routine.clone();
    let max_hp = m.max_hp * cfg.offspring_hp_fraction;
    let origin = m.position;
    let home = m.home;
    let herd = m.herd;
    let father = m.reproduction.father;
    let born_before = m.reproduction.offspring.len();

    let father_name = father.and_then(|f| world.agent(f)).filter(|f| f.alive).map(|f| f.name.clone());
    let mut parents = vec![mother_name.clone()];
    parents.extend(father_name.iter().cloned());

    let litter = world.rng.gen_range(cfg.min_litter..=cfg.max_litter);
    let mut born = Vec::with_capacity(litter as usize);
    let mut names = Vec::with_capacity(litter as usize);

    for n in 0..litter as usize {
        let name = format!("{} Jr. {}", mother_name, born_before + n + 1);
        let gender = if world.rng.gen_bool(0.5) { Gender::Male } else { Gender::Female };
        let jx = world.rng.gen_range(-cfg.birth_jitter..=cfg.birth_jitter);
        let jz = world.rng.gen_range(-cfg.birth_jitter..=cfg.birth_jitter);
        let position = world.ground(origin.x + jx, origin.z + jz);

        let mut entry = RosterEntry::new(name.clone(), species, gender, 0.0, max_hp);
        entry.personality = personality.clone();
        entry.routine = routine.clone();

        let mut child = world.build_agent(entry, position);
        child.home = home;
        child.current_location = home;
        child.reproduction.parents = parents.clone();
        let id = world.insert_agent(child);

        if let Some(herd) = herd {
            if world.herds.join(herd, id) {
                if let Some(agent) = world.agent_mut(id) {
                    agent.herd = Some(herd);
                }
            }
        }

        born.push(id);
        names.push(name);
    }

    if let Some(m) = world.agent_mut(mother) {
        m.reproduction.offspring.extend(names.iter().cloned());
        m.reproduction.is_pregnant = false;
        m.reproduction.pregnancy_elapsed = 0.0;
        m.reproduction.father = None;
    }
    if let Some(f) = father.and_then(|f| world.agent_mut(f)).filter(|f| f.alive) {
        f.reproduction.offspring.extend(names.iter().cloned());
    }

    tracing::info!(%mother, count = born.len(), "birth");
    world.log.add_detailed(
        now,
        format!("{} gave birth to {} young", mother_name, born.len()),
        LogCategory::Birth,
        names.join(", "),
    );
    world.events.push(SimulationEvent::Birth {
        mother,
        offspring: born.clone(),
    });
    born
}
