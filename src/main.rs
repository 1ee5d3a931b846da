//! Savanna Sim - Entry Point
//!
//! Loads the config and starting roster, optionally connects the LLM
//! decision provider, then either runs a fixed number of ticks or drops
//! into a small command loop.

use savanna_sim::core::config::SimulationConfig;
use savanna_sim::core::error::Result;
use savanna_sim::ecs::world::World;
use savanna_sim::entity::roster::Roster;
use savanna_sim::llm::provider::{DecisionBridge, LlmDecisionProvider};
use savanna_sim::simulation::tick::{run_simulation_tick, SimulationEvent};

use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

/// Savanna Sim - animal agents on a procedural savanna
#[derive(Parser, Debug)]
#[command(name = "savanna-sim")]
#[command(about = "Run the savanna agent simulation headless or interactively")]
struct Args {
    /// Simulation config (TOML); built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Starting roster (TOML)
    #[arg(long, default_value = "data/roster.toml")]
    roster: PathBuf,

    /// Random seed, overrides the config
    #[arg(long)]
    seed: Option<u64>,

    /// Ticks to run in headless mode
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Simulated seconds per tick
    #[arg(long, default_value_t = 0.1)]
    dt: f64,

    /// Start the command loop instead of running headless
    #[arg(long, short = 'i')]
    interactive: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("savanna_sim=info")))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.clock.seed = seed;
    }
    let roster = Roster::load(&args.roster)?;

    tracing::info!(seed = config.clock.seed, agents = roster.agents.len(), "Savanna Sim starting...");

    // Runtime for provider calls; ticks stay on this thread
    let rt = Runtime::new()?;

    let timeout = config.decision.provider_timeout;
    let mut world = World::savanna(config);
    world.spawn_roster(&roster);

    match LlmDecisionProvider::from_env() {
        Ok(provider) => {
            world.set_provider(DecisionBridge::new(Arc::new(provider), rt.handle().clone(), timeout));
            tracing::info!("LLM decision provider enabled");
        }
        Err(_) => {
            tracing::warn!("LLM_API_KEY not set - using the local heuristic only");
        }
    }

    if args.interactive {
        repl(&mut world, args.dt)?;
    } else {
        for _ in 0..args.ticks {
            let events = run_simulation_tick(&mut world, args.dt);
            report(&world, &events);
        }
        display_status(&world);
    }

    println!(
        "\nFinal state: {} of {} animals alive at day {} {}",
        world.living_count(),
        world.agents.len(),
        world.clock.current_day(),
        world.clock.clock_label()
    );
    Ok(())
}

fn repl(world: &mut World, dt: f64) -> Result<()> {
    println!("\n=== SAVANNA SIM ===");
    println!();
    println!("Commands:");
    println!("  tick / t        - Advance simulation by one tick");
    println!("  run <n>         - Run n simulation ticks");
    println!("  status / s      - Show every animal");
    println!("  agent <name>    - Show one animal in detail");
    println!("  quit / q        - Exit");
    println!();

    loop {
        print!("[day {} {}] > ", world.clock.current_day(), world.clock.clock_label());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        match input.split_once(' ').unwrap_or((input, "")) {
            ("quit" | "q", _) => break,
            ("tick" | "t", _) => {
                let events = run_simulation_tick(world, dt);
                report(world, &events);
            }
            ("run", n) => match n.trim().parse::<u32>() {
                Ok(n) => {
                    println!("Running {} ticks...", n);
                    for _ in 0..n {
                        let events = run_simulation_tick(world, dt);
                        report(world, &events);
                    }
                }
                Err(_) => println!("Usage: run <number>"),
            },
            ("status" | "s", _) => display_status(world),
            ("agent", name) => display_agent(world, name.trim()),
            _ => println!("Unknown command. Available: tick, run <n>, status, agent <name>, quit"),
        }
    }
    Ok(())
}

/// Print the notable events of a tick
fn report(world: &World, events: &[SimulationEvent]) {
    let name = |id| world.agent(id).map(|a| a.name.as_str()).unwrap_or("?");
    for event in events {
        match event {
            SimulationEvent::Death { agent, killer } => match killer {
                Some(k) => println!("  ✝ {} was killed by {}", name(*agent), name(*k)),
                None => println!("  ✝ {} died", name(*agent)),
            },
            SimulationEvent::Birth { mother, offspring } => {
                println!("  ★ {} gave birth to {} young", name(*mother), offspring.len())
            }
            SimulationEvent::HuntStarted { hunter, target } => {
                println!("  ⚔ {} is hunting {}", name(*hunter), name(*target))
            }
            SimulationEvent::LeaderPromoted { leader, .. } => {
                println!("  ⚑ {} now leads the herd", name(*leader))
            }
            _ => {}
        }
    }
}

fn display_status(world: &World) {
    println!();
    println!(
        "--- Day {} {} ({}) - {} alive ---",
        world.clock.current_day(),
        world.clock.clock_label(),
        world.clock.time_period().as_str(),
        world.living_count()
    );
    for snapshot in world.snapshots() {
        println!("{}", snapshot.status_line());
    }
    println!();
    println!("Recent:");
    for entry in world.log.recent(8) {
        println!("  [{:>7.1}s] {}", entry.time, entry.message);
    }
}

fn display_agent(world: &World, name: &str) {
    let Some(id) = world.find_by_name(name) else {
        println!("No animal named '{}'", name);
        return;
    };
    let Ok(snapshot) = world.snapshot(id) else {
        return;
    };
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{}", json),
        Err(e) => println!("Could not render {}: {}", name, e),
    }
    if let Some(agent) = world.agent(id) {
        println!("Recent thoughts:");
        for thought in agent.thoughts.iter() {
            println!("  [{:>7.1}s] {}", thought.time, thought.text);
        }
    }
}
