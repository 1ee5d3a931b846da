//! Sparse hash grid for neighbour queries on the ground plane

use crate::core::types::{AgentId, Vec3};
use ahash::AHashMap;

/// Buckets agent ids by (x, z) cell.
///
/// The grid is rebuilt once per tick, so agents that move during the tick
/// can drift out of their bucket. Radius queries widen by the drift allowed
/// since the rebuild, plus one extra ring of cells, and callers filter
/// candidates by live position.
pub struct SparseHashGrid {
    cell_size: f32,
    cells: AHashMap<(i32, i32), Vec<AgentId>>,
    max_drift: f32,
}

impl SparseHashGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: AHashMap::new(),
            max_drift: 0.0,
        }
    }

    /// Furthest any agent may move before the next rebuild
    pub fn set_max_drift(&mut self, distance: f32) {
        self.max_drift = if distance.is_finite() { distance.max(0.0) } else { 0.0 };
    }

    pub fn max_drift(&self) -> f32 {
        self.max_drift
    }

    #[inline]
    fn cell_coord(&self, pos: Vec3) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.z / self.cell_size).floor() as i32,
        )
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.max_drift = 0.0;
    }

    pub fn insert(&mut self, agent: AgentId, pos: Vec3) {
        let coord = self.cell_coord(pos);
        self.cells.entry(coord).or_default().push(agent);
    }

    pub fn remove(&mut self, agent: AgentId, pos: Vec3) {
        let coord = self.cell_coord(pos);
        if let Some(cell) = self.cells.get_mut(&coord) {
            cell.retain(|&a| a != agent);
        }
    }

    /// Candidate ids whose bucket may hold an agent within `radius` of `center`.
    /// Unsorted and unfiltered.
    pub fn candidates(&self, center: Vec3, radius: f32) -> impl Iterator<Item = AgentId> + '_ {
        let (cx, cz) = self.cell_coord(center);
        let reach = ((radius + self.max_drift) / self.cell_size).ceil() as i32 + 1;

        (-reach..=reach).flat_map(move |dx| {
            (-reach..=reach).flat_map(move |dz| {
                self.cells
                    .get(&(cx + dx, cz + dz))
                    .into_iter()
                    .flatten()
                    .copied()
            })
        })
    }

    /// Ids within `radius` of `center` by current position, in ascending id order
    pub fn query_radius(&self, center: Vec3, radius: f32, position_of: impl Fn(AgentId) -> Option<Vec3>) -> Vec<AgentId> {
        let mut found: Vec<AgentId> = self
            .candidates(center, radius)
            .filter(|&id| {
                position_of(id)
                    .map(|pos| pos.planar_distance(&center) <= radius)
                    .unwrap_or(false)
            })
            .collect();
        found.sort_unstable();
        found.dedup();
        found
    }

    pub fn rebuild(&mut self, agents: impl Iterator<Item = (AgentId, Vec3)>) {
        self.clear();
        for (agent, pos) in agents {
            self.insert(agent, pos);
        }
    }

    pub fn len(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.values().all(Vec::is_empty)
    }
}
