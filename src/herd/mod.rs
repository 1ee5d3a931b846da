//! Herd membership and leader-owned group movement
//!
//! Only the leader may set the shared movement target. Members read it
//! through `Herd::shared_target` and only ever write their own position.

pub mod flocking;
pub mod formation;

use crate::core::error::{Result, SimError};
use crate::core::types::{AgentId, HerdId, Vec3};
use crate::entity::species::Species;
use formation::Formation;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Herd {
    pub id: HerdId,
    pub species: Species,
    leader: AgentId,
    /// Leader first, then followers in join order
    members: Vec<AgentId>,
    pub formation: Formation,
    /// 0.0 (scattered) to 1.0 (tight)
    pub cohesion: f32,
    shared_target: Option<Vec3>,
    /// Direction the leader set off in, used to orient line formations
    heading: Vec3,
}

impl Herd {
    fn new(id: HerdId, species: Species, leader: AgentId, formation: Formation, cohesion: f32) -> Self {
        Self {
            id,
            species,
            leader,
            members: vec![leader],
            formation,
            cohesion,
            shared_target: None,
            heading: Vec3::ZERO,
        }
    }

    pub fn leader(&self) -> AgentId {
        self.leader
    }

    pub fn is_leader(&self, agent: AgentId) -> bool {
        self.leader == agent
    }

    pub fn members(&self) -> &[AgentId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn shared_target(&self) -> Option<Vec3> {
        self.shared_target
    }

    pub fn heading(&self) -> Vec3 {
        self.heading
    }

    /// Set or clear the shared movement target. Leader only.
    pub fn direct(&mut self, agent: AgentId, target: Option<Vec3>, from: Vec3) -> Result<()> {
        if agent != self.leader {
            return Err(SimError::NotHerdLeader { herd: self.id, agent });
        }
        if let Some(t) = target {
            self.heading = (t - from).planar().normalize();
        }
        self.shared_target = target;
        Ok(())
    }

    /// Follower slot (0-based, leader excluded)
    pub fn slot_of(&self, agent: AgentId) -> Option<usize> {
        self.members
            .iter()
            .filter(|&&m| m != self.leader)
            .position(|&m| m == agent)
    }

    pub fn follower_count(&self) -> usize {
        self.members.len().saturating_sub(1)
    }

    fn join(&mut self, agent: AgentId) {
        if !self.members.contains(&agent) {
            self.members.push(agent);
        }
    }

    /// Drop a member; returns the new leader when the leader left
    fn remove(&mut self, agent: AgentId) -> Option<AgentId> {
        self.members.retain(|&m| m != agent);
        if self.leader != agent {
            return None;
        }
        self.shared_target = None;
        let next = self.members.first().copied()?;
        self.leader = next;
        Some(next)
    }
}

#[derive(Debug, Clone, Default)]
pub struct HerdRegistry {
    herds: Vec<Herd>,
}

impl HerdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: HerdId) -> Option<&Herd> {
        self.herds.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: HerdId) -> Option<&mut Herd> {
        self.herds.get_mut(id.0 as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Herd> {
        self.herds.iter()
    }

    pub fn len(&self) -> usize {
        self.herds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.herds.is_empty()
    }

    /// First same-species herd with room
    pub fn find_joinable(&self, species: Species, max_size: usize) -> Option<HerdId> {
        self.herds
            .iter()
            .find(|h| h.species == species && !h.is_empty() && h.len() < max_size)
            .map(|h| h.id)
    }

    pub fn create(&mut self, species: Species, leader: AgentId, formation: Formation, cohesion: f32) -> HerdId {
        let id = HerdId(self.herds.len() as u32);
        self.herds.push(Herd::new(id, species, leader, formation, cohesion));
        tracing::debug!(herd = %id, %leader, ?species, "herd created");
        id
    }

    /// Join an agent to an existing herd; an empty herd is re-led by the newcomer
    pub fn join(&mut self, id: HerdId, agent: AgentId) -> bool {
        let Some(herd) = self.get_mut(id) else {
            return false;
        };
        if herd.is_empty() {
            herd.leader = agent;
        }
        herd.join(agent);
        true
    }

    /// Remove an agent from its herd, promoting a new leader if needed
    pub fn remove_member(&mut self, id: HerdId, agent: AgentId) -> Option<AgentId> {
        let herd = self.get_mut(id)?;
        let promoted = herd.remove(agent);
        if let Some(new_leader) = promoted {
            tracing::info!(herd = %id, %new_leader, "herd leader promoted");
        }
        promoted
    }

    /// Formation target for a follower, `None` when it should not follow
    pub fn follow_target(&self, id: HerdId, agent: AgentId, spacing: f32) -> Option<Vec3> {
        let herd = self.get(id)?;
        if herd.is_leader(agent) || herd.len() < 2 {
            return None;
        }
        let target = herd.shared_target()?;
        let slot = herd.slot_of(agent)?;
        Some(target + formation::slot_offset(herd.formation, slot, herd.follower_count(), spacing, herd.heading()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_three() -> (HerdRegistry, HerdId) {
        let mut reg = HerdRegistry::new();
        let id = reg.create(Species::Zebra, AgentId(0), Formation::Loose, 0.8);
        reg.join(id, AgentId(1));
        reg.join(id, AgentId(2));
        (reg, id)
    }

    #[test]
    fn test_only_leader_directs() {
        let (mut reg, id) = registry_with_three();
        let herd = reg.get_mut(id).unwrap();
        let err = herd.direct(AgentId(1), Some(Vec3::flat(10.0, 0.0)), Vec3::ZERO);
        assert!(matches!(err, Err(SimError::NotHerdLeader { agent: AgentId(1), .. })));
        assert!(herd.shared_target().is_none());

        herd.direct(AgentId(0), Some(Vec3::flat(10.0, 0.0)), Vec3::ZERO).unwrap();
        assert_eq!(herd.shared_target(), Some(Vec3::flat(10.0, 0.0)));
    }

    #[test]
    fn test_leader_death_promotes_next_member() {
        let (mut reg, id) = registry_with_three();
        reg.get_mut(id)
            .unwrap()
            .direct(AgentId(0), Some(Vec3::flat(5.0, 5.0)), Vec3::ZERO)
            .unwrap();

        assert_eq!(reg.remove_member(id, AgentId(0)), Some(AgentId(1)));
        let herd = reg.get(id).unwrap();
        assert_eq!(herd.leader(), AgentId(1));
        assert_eq!(herd.members(), &[AgentId(1), AgentId(2)]);
        assert!(herd.shared_target().is_none());
    }

    #[test]
    fn test_follower_removal_keeps_leader() {
        let (mut reg, id) = registry_with_three();
        assert_eq!(reg.remove_member(id, AgentId(2)), None);
        assert_eq!(reg.get(id).unwrap().leader(), AgentId(0));
    }

    #[test]
    fn test_find_joinable_respects_capacity() {
        let (reg, _) = registry_with_three();
        assert!(reg.find_joinable(Species::Zebra, 8).is_some());
        assert!(reg.find_joinable(Species::Zebra, 3).is_none());
        assert!(reg.find_joinable(Species::Gazelle, 8).is_none());
    }

    #[test]
    fn test_follow_target_only_for_followers() {
        let (mut reg, id) = registry_with_three();
        assert!(reg.follow_target(id, AgentId(1), 3.0).is_none());
        reg.get_mut(id)
            .unwrap()
            .direct(AgentId(0), Some(Vec3::flat(20.0, 0.0)), Vec3::ZERO)
            .unwrap();
        assert!(reg.follow_target(id, AgentId(0), 3.0).is_none());
        let t = reg.follow_target(id, AgentId(1), 3.0).unwrap();
        assert!(t.planar_distance(&Vec3::flat(20.0, 0.0)) > 0.0);
    }
}
