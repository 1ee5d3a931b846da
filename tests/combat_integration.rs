//! Combat system integration tests
//!
//! End-to-end checks of the attack path: damage, cooldown, the kill and
//! the death cascade that clears every reference to the dead.

use savanna_sim::actions::Activity;
use savanna_sim::combat::{attack, damage, kill};
use savanna_sim::core::config::SimulationConfig;
use savanna_sim::core::types::{AgentId, Gender};
use savanna_sim::ecs::world::World;
use savanna_sim::entity::roster::RosterEntry;
use savanna_sim::entity::species::Species;
use savanna_sim::simulation::tick::{run_simulation_tick, SimulationEvent};
use savanna_sim::world::location::LocationCatalog;
use savanna_sim::world::terrain::FlatTerrain;

fn world() -> World {
    World::new(SimulationConfig::default(), Box::new(FlatTerrain(1.0)), LocationCatalog::new())
}

fn lion_and_zebra(world: &mut World, gap: f32) -> (AgentId, AgentId) {
    let lion = world.spawn(RosterEntry::new("Leo", Species::Lion, Gender::Male, 6.0, 200.0).with_home(0.0, 0.0));
    let zebra = world.spawn(RosterEntry::new("Stripe", Species::Zebra, Gender::Female, 4.0, 190.0).with_home(gap, 0.0));
    world.rebuild_grid();
    (lion, zebra)
}

fn start_hunt(world: &mut World, hunter: AgentId, prey: AgentId) {
    let agent = &mut world.agents[hunter.index()];
    agent.hunt.is_hunting = true;
    agent.hunt.target = Some(prey);
    agent.activity = Activity::Hunting;
}

/// A lion finishing off a wounded zebra
#[test]
fn test_killing_blow_feeds_the_hunter() {
    let mut world = world();
    let (lion, zebra) = lion_and_zebra(&mut world, 1.5);
    world.agents[zebra.index()].hp = 5.0;
    world.agents[lion.index()].needs.hunger = 0.6;
    start_hunt(&mut world, lion, zebra);

    assert_eq!(attack(&mut world, lion, zebra), Some(50.0));

    let prey = world.agent(zebra).unwrap();
    assert_eq!(prey.hp, 0.0);
    assert!(!prey.alive);
    assert_eq!(prey.activity, Activity::Dead);

    let hunter = world.agent(lion).unwrap();
    assert!((hunter.needs.hunger - 0.3).abs() < 1e-6);
    assert!(!hunter.hunt.is_hunting);
    assert!(hunter.hunt.target.is_none());

    let events = std::mem::take(&mut world.events);
    assert!(events.contains(&SimulationEvent::Death {
        agent: zebra,
        killer: Some(lion),
    }));
}

#[test]
fn test_pursuit_in_strike_range_attacks_during_tick() {
    let mut world = world();
    let (lion, zebra) = lion_and_zebra(&mut world, 1.5);
    world.agents[zebra.index()].hp = 5.0;
    // Keep the timed decision out of the way
    world.agents[lion.index()].timers.next_think_at = 1_000.0;
    world.agents[zebra.index()].timers.next_think_at = 1_000.0;
    start_hunt(&mut world, lion, zebra);

    let events = run_simulation_tick(&mut world, 0.1);

    assert!(events.iter().any(|e| matches!(
        e,
        SimulationEvent::Attack { attacker, target, damage, target_hp }
            if *attacker == lion && *target == zebra && *damage == 50.0 && *target_hp == 0.0
    )));
    assert!(!world.agent(zebra).unwrap().alive);
}

#[test]
fn test_cooldown_allows_one_hit_per_window() {
    let mut world = world();
    let (lion, zebra) = lion_and_zebra(&mut world, 1.0);

    assert_eq!(attack(&mut world, lion, zebra), Some(50.0));
    assert_eq!(attack(&mut world, lion, zebra), None);
    world.clock.advance(2.9);
    assert_eq!(attack(&mut world, lion, zebra), None);
    assert_eq!(world.agent(zebra).unwrap().hp, 140.0);

    world.clock.advance(0.1);
    assert_eq!(attack(&mut world, lion, zebra), Some(50.0));
    assert_eq!(world.agent(zebra).unwrap().hp, 90.0);
}

#[test]
fn test_strong_defense_still_takes_one() {
    assert_eq!(damage(20.0, 95.0), 1.0);
    assert_eq!(damage(40.0, 40.0), 1.0);

    let mut world = world();
    let zebra = world.spawn(RosterEntry::new("Stripe", Species::Zebra, Gender::Male, 4.0, 190.0).with_home(0.0, 0.0));
    let elephant =
        world.spawn(RosterEntry::new("Tembo", Species::Elephant, Gender::Male, 9.0, 280.0).with_home(1.0, 0.0));
    assert_eq!(attack(&mut world, zebra, elephant), Some(1.0));
    assert_eq!(world.agent(elephant).unwrap().hp, 279.0);
}

#[test]
fn test_dead_stay_dead() {
    let mut world = world();
    let (lion, zebra) = lion_and_zebra(&mut world, 1.0);
    assert!(kill(&mut world, zebra, Some(lion)));
    assert!(!kill(&mut world, zebra, Some(lion)));

    world.clock.advance(10.0);
    assert_eq!(attack(&mut world, lion, zebra), None);

    for _ in 0..50 {
        run_simulation_tick(&mut world, 0.1);
    }
    let prey = world.agent(zebra).unwrap();
    assert!(!prey.alive);
    assert_eq!(prey.hp, 0.0);
    assert_eq!(world.agent(lion).unwrap().hunt.target, None);
}

#[test]
fn test_death_clears_every_reference() {
    let mut world = world();
    let lion = world.spawn(RosterEntry::new("Leo", Species::Lion, Gender::Male, 6.0, 200.0).with_home(0.0, 0.0));
    let hyena = world.spawn(RosterEntry::new("Shenzi", Species::Hyena, Gender::Female, 5.0, 120.0).with_home(3.0, 0.0));
    let zebra = world.spawn(RosterEntry::new("Stripe", Species::Zebra, Gender::Female, 4.0, 190.0).with_home(6.0, 0.0));
    let gazelle = world.spawn(RosterEntry::new("Swala", Species::Gazelle, Gender::Male, 4.0, 80.0).with_home(9.0, 0.0));

    // The hyena chases the zebra, the zebra and gazelle flee the lion
    start_hunt(&mut world, hyena, zebra);
    for prey in [zebra, gazelle] {
        let agent = &mut world.agents[prey.index()];
        agent.hunt.is_being_hunted = true;
        agent.hunt.hunter = Some(lion);
    }

    kill(&mut world, lion, None);
    kill(&mut world, zebra, Some(hyena));

    for id in [hyena, gazelle] {
        let agent = world.agent(id).unwrap();
        assert!(agent.alive);
        assert!(!agent.relationships.contains(lion));
        assert!(!agent.relationships.contains(zebra));
        assert_ne!(agent.hunt.hunter, Some(lion));
        assert_ne!(agent.hunt.target, Some(zebra));
    }
    assert!(!world.agent(gazelle).unwrap().hunt.is_being_hunted);
    assert!(!world.agent(hyena).unwrap().hunt.is_hunting);
    assert_eq!(world.living_count(), 2);
}
