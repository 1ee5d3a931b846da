//! Attack resolution
//!
//! NO RANDOMNESS. Damage is attack minus defense, never less than one.

use crate::combat::death;
use crate::core::types::AgentId;
use crate::ecs::world::World;
use crate::entity::needs::NeedType;
use crate::simulation::tick::SimulationEvent;
use crate::ui::log::LogCategory;

/// Damage dealt by one attack
pub fn damage(attack_power: f32, defense: f32) -> f32 {
    (attack_power - defense).max(1.0)
}

/// Whether the attacker's cooldown has elapsed at `now`
pub fn off_cooldown(last_attack: Option<f64>, now: f64, cooldown: f64) -> bool {
    match last_attack {
        Some(last) => now - last >= cooldown,
        None => true,
    }
}

/// Strike `target` once.
///
/// Returns the damage dealt, or `None` when the attack did not happen
/// (cooldown, dead or unknown participants). A killing blow runs the death
/// cascade, ends the attacker's hunt and feeds it.
pub fn attack(world: &mut World, attacker: AgentId, target: AgentId) -> Option<f32> {
    let now = world.now();
    let cooldown = world.config.combat.attack_cooldown;

    let (attack_power, attacker_name) = {
        let a = world.agent(attacker)?;
        if !a.alive || !off_cooldown(a.hunt.last_attack_time, now, cooldown) {
            return None;
        }
        (a.attack_power, a.name.clone())
    };
    let defense = {
        let t = world.agent(target)?;
        if !t.alive || attacker == target {
            return None;
        }
        t.defense
    };

    let dealt = damage(attack_power, defense);

    {
        let a = world.agent_mut(attacker)?;
        a.hunt.last_attack_time = Some(now);
        if let Some(rel) = a.relationships.get_mut(target) {
            rel.record_interaction(now);
        }
    }

    let (target_hp, target_name) = {
        let t = world.agent_mut(target)?;
        t.hp = (t.hp - dealt).max(0.0);
        if let Some(rel) = t.relationships.get_mut(attacker) {
            rel.record_interaction(now);
        }
        (t.hp, t.name.clone())
    };

    tracing::info!(%attacker, %target, damage = dealt, target_hp, "attack");
    world.log.add(
        now,
        format!("{} hits {} for {:.0} damage", attacker_name, target_name, dealt),
        LogCategory::Combat,
    );
    world.events.push(SimulationEvent::Attack {
        attacker,
        target,
        damage: dealt,
        target_hp,
    });

    if target_hp <= 0.0 {
        death::kill(world, target, Some(attacker));
        let relief = world.config.combat.kill_hunger_relief;
        if let Some(a) = world.agent_mut(attacker) {
            a.hunt.stop_hunting();
            a.needs.satisfy(NeedType::Hunger, relief);
        }
        world.log.add(
            now,
            format!("{} feeds on {}", attacker_name, target_name),
            LogCategory::Hunt,
        );
    }

    Some(dealt)
}
