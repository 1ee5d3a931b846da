//! World context - owns every agent and the collaborators they consult
//!
//! All systems take `&mut World` instead of reaching for globals, so a
//! simulation instance is self-contained and can be built in a test.

use crate::actions::Activity;
use crate::core::calendar::SimClock;
use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{AgentId, HerdId, Vec3};
use crate::entity::agent::{Agent, DecisionTimers, HuntState, ReproductionState};
use crate::entity::needs::Needs;
use crate::entity::relationships::{initial_affinity, Relationship, Relationships, MAX_INITIAL_FAMILIARITY};
use crate::entity::roster::{Roster, RosterEntry};
use crate::entity::species::Species;
use crate::entity::thoughts::ThoughtLog;
use crate::herd::HerdRegistry;
use crate::llm::provider::DecisionBridge;
use crate::simulation::tick::SimulationEvent;
use crate::spatial::SparseHashGrid;
use crate::ui::log::{ActionLog, LogCategory};
use crate::ui::snapshot::AgentSnapshot;
use crate::world::location::LocationCatalog;
use crate::world::terrain::{NoiseTerrain, TerrainCategory, TerrainQuery};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::f32::consts::TAU;

const HOME_SAMPLE_ATTEMPTS: u32 = 200;
const HOME_SAMPLE_EXTENT: f32 = 150.0;

/// The simulation world containing all agents
pub struct World {
    pub config: SimulationConfig,
    pub clock: SimClock,
    pub agents: Vec<Agent>,
    pub herds: HerdRegistry,
    pub locations: LocationCatalog,
    pub terrain: Box<dyn TerrainQuery>,
    pub grid: SparseHashGrid,
    pub rng: ChaCha8Rng,
    pub log: ActionLog,
    /// Events raised since the last tick returned
    pub events: Vec<SimulationEvent>,
    pub(crate) bridge: Option<DecisionBridge>,
}

impl World {
    pub fn new(config: SimulationConfig, terrain: Box<dyn TerrainQuery>, locations: LocationCatalog) -> Self {
        let clock = SimClock::new(config.clock.start_minutes, config.clock.day_minutes_per_second);
        let grid = SparseHashGrid::new(config.perception.grid_cell_size);
        let rng = ChaCha8Rng::seed_from_u64(config.clock.seed);
        Self {
            config,
            clock,
            agents: Vec::new(),
            herds: HerdRegistry::new(),
            locations,
            terrain,
            grid,
            rng,
            log: ActionLog::default(),
            events: Vec::new(),
            bridge: None,
        }
    }

    /// Procedural terrain plus the default savanna catalog
    pub fn savanna(config: SimulationConfig) -> Self {
        let seed = config.clock.seed;
        let terrain = NoiseTerrain::new(seed);
        // Separate stream so catalog placement does not shift agent randomness
        let mut placement_rng = ChaCha8Rng::seed_from_u64(seed ^ 0x5A5A_5A5A);
        let locations = LocationCatalog::savanna(&terrain, &mut placement_rng);
        Self::new(config, Box::new(terrain), locations)
    }

    /// Route decisions through an external provider
    pub fn set_provider(&mut self, bridge: DecisionBridge) {
        self.bridge = Some(bridge);
        self.log.add(self.now(), "Decision provider connected", LogCategory::System);
    }

    pub fn has_provider(&self) -> bool {
        self.bridge.is_some()
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.index())
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id.index())
    }

    pub fn try_agent(&self, id: AgentId) -> Result<&Agent> {
        self.agent(id).ok_or(SimError::AgentNotFound(id))
    }

    pub fn is_alive(&self, id: AgentId) -> bool {
        self.agent(id).map(|a| a.alive).unwrap_or(false)
    }

    pub fn find_by_name(&self, name: &str) -> Option<AgentId> {
        self.agents
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name.trim()))
            .map(|a| a.id)
    }

    pub fn living(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter().filter(|a| a.alive)
    }

    pub fn living_count(&self) -> usize {
        self.living().count()
    }

    /// Point on the ground at (x, z), lifted by the standing offset
    pub fn ground(&self, x: f32, z: f32) -> Vec3 {
        Vec3::new(x, self.terrain.height(x, z) + self.config.speed.height_offset, z)
    }

    pub fn rebuild_grid(&mut self) {
        let living = self.agents.iter().filter(|a| a.alive).map(|a| (a.id, a.position));
        self.grid.rebuild(living);
    }

    /// Rebuild the grid ahead of a `dt` step. Within one tick an agent takes
    /// at most a movement step, a pursuit or flight step and a flocking step,
    /// so queries widen by that distance for the fastest agent.
    pub fn rebuild_grid_for_step(&mut self, dt: f32) {
        self.rebuild_grid();
        let fastest = self.living().map(|a| a.speed).fold(0.0, f32::max);
        let per_second = 2.0 * self.config.speed.escaping + self.config.herd.step_multiplier;
        self.grid.set_max_drift(fastest * per_second * dt.max(0.0));
    }

    /// Living agents other than `id` within `radius`, nearest first (ties by id)
    pub fn nearby(&self, id: AgentId, radius: f32) -> Vec<(AgentId, f32)> {
        let Some(me) = self.agent(id) else {
            return Vec::new();
        };
        let center = me.position;
        let agents = &self.agents;
        let mut found: Vec<(AgentId, f32)> = self
            .grid
            .query_radius(center, radius, |other| {
                agents.get(other.index()).filter(|a| a.alive).map(|a| a.position)
            })
            .into_iter()
            .filter(|&other| other != id)
            .filter_map(|other| agents.get(other.index()).map(|a| (other, a.position.planar_distance(&center))))
            .collect();
        found.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        found
    }

    /// Spawn every roster entry in order
    pub fn spawn_roster(&mut self, roster: &Roster) -> Vec<AgentId> {
        let ids: Vec<AgentId> = roster.agents.iter().cloned().map(|entry| self.spawn(entry)).collect();
        self.log.add(
            self.now(),
            format!("{} animals appeared on the savanna", ids.len()),
            LogCategory::System,
        );
        ids
    }

    /// Create an agent at its home, register the home, link relationships and herd
    pub fn spawn(&mut self, entry: RosterEntry) -> AgentId {
        let index = self.agents.len();
        let position = match entry.home {
            Some(home) => self.ground(home.x, home.z),
            None => self.sample_home(entry.species, index),
        };
        let home = self
            .locations
            .add_home(format!("{}'s home", entry.name), position);

        let mut agent = self.build_agent(entry, position);
        agent.home = Some(home);
        agent.current_location = Some(home);
        let id = self.insert_agent(agent);

        let species = self.agents[id.index()].species;
        let herd = if species.forms_herd() {
            self.join_or_create_herd(id, species)
        } else {
            None
        };
        self.agents[id.index()].herd = herd;
        id
    }

    /// Agent record with stats from the species table and fresh state
    pub(crate) fn build_agent(&mut self, entry: RosterEntry, position: Vec3) -> Agent {
        let profile = entry.species.profile();
        let speed_cfg = &self.config.speed;
        let now = self.now();
        let decision = &self.config.decision;
        let next_think_at = now + decision.first_think_delay.sample(&mut self.rng);
        let idle_delay = decision.idle_action_delay.sample(&mut self.rng);
        let is_adult = entry.age >= self.config.reproduction.adult_age;

        Agent {
            id: AgentId(self.agents.len() as u32),
            name: entry.name,
            species: entry.species,
            age: entry.age,
            gender: entry.gender,
            personality: entry.personality,
            routine: entry.routine,
            home: None,
            hp: entry.hp.clamp(0.0, entry.max_hp),
            max_hp: entry.max_hp,
            attack_power: profile.attack_power,
            defense: profile.defense,
            size: profile.size,
            speed: speed_cfg.base_speed * speed_cfg.speed_multiplier * profile.speed_multiplier,
            needs: Needs::default(),
            alive: true,
            position,
            rotation: 0.0,
            current_location: None,
            target_location: None,
            movement_target: None,
            flee_destination: None,
            activity: Activity::Idle,
            thought: "Starting the day on the savanna...".to_string(),
            is_thinking: false,
            thoughts: ThoughtLog::default(),
            hunt: HuntState::default(),
            herd: None,
            reproduction: ReproductionState {
                is_adult,
                ..Default::default()
            },
            relationships: Relationships::new(),
            timers: DecisionTimers {
                next_think_at,
                last_action_time: now,
                idle_delay,
                activity_expires_at: None,
            },
        }
    }

    /// Append an agent and create symmetric relationships with every living agent
    pub(crate) fn insert_agent(&mut self, mut agent: Agent) -> AgentId {
        let id = AgentId(self.agents.len() as u32);
        agent.id = id;
        let now = self.now();

        for other in self.agents.iter_mut().filter(|o| o.alive) {
            let mine = Relationship::new(
                self.rng.gen_range(0.0..MAX_INITIAL_FAMILIARITY),
                initial_affinity(agent.species, other.species),
                now,
            );
            let theirs = Relationship::new(
                self.rng.gen_range(0.0..MAX_INITIAL_FAMILIARITY),
                initial_affinity(other.species, agent.species),
                now,
            );
            agent.relationships.insert(other.id, mine);
            other.relationships.insert(id, theirs);
        }

        tracing::debug!(%id, name = %agent.name, species = %agent.species, "agent spawned");
        self.grid.insert(id, agent.position);
        self.agents.push(agent);
        id
    }

    fn join_or_create_herd(&mut self, id: AgentId, species: Species) -> Option<HerdId> {
        let max = self.config.herd.max_size;
        if let Some(herd) = self.herds.find_joinable(species, max) {
            self.herds.join(herd, id);
            return Some(herd);
        }
        let formation = species.profile().formation?;
        Some(self.herds.create(species, id, formation, self.config.herd.default_cohesion))
    }

    /// Random point on the species' home terrain, or a fixed ring slot
    fn sample_home(&mut self, species: Species, index: usize) -> Vec3 {
        let wanted = species.profile().home;
        for _ in 0..HOME_SAMPLE_ATTEMPTS {
            let x = self.rng.gen_range(-HOME_SAMPLE_EXTENT..=HOME_SAMPLE_EXTENT);
            let z = self.rng.gen_range(-HOME_SAMPLE_EXTENT..=HOME_SAMPLE_EXTENT);
            let category = self.terrain.category(x, z);
            if category == wanted && category != TerrainCategory::River {
                return self.ground(x, z);
            }
        }

        tracing::debug!(?species, index, "no home terrain found, using ring slot");
        let angle = TAU * (index % 12) as f32 / 12.0;
        let radius = 30.0 + (index / 12) as f32 * 10.0;
        self.ground(angle.cos() * radius, angle.sin() * radius)
    }

    /// Display snapshots for every agent, dead ones included
    pub fn snapshots(&self) -> Vec<AgentSnapshot> {
        let locations = &self.locations;
        if self.agents.len() >= self.config.clock.parallel_threshold {
            self.agents
                .par_iter()
                .map(|a| AgentSnapshot::capture(a, locations))
                .collect()
        } else {
            self.agents.iter().map(|a| AgentSnapshot::capture(a, locations)).collect()
        }
    }

    pub fn snapshot(&self, id: AgentId) -> Result<AgentSnapshot> {
        Ok(AgentSnapshot::capture(self.try_agent(id)?, &self.locations))
    }
}
