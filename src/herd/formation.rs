//! Formation slot placement for herd followers
//!
//! Followers aim at the shared target plus an offset that depends on the
//! herd's formation and the follower's slot among the members.

use crate::core::types::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Formation {
    /// Wide ring that grows with each slot
    Loose,
    /// Compact ring around the target
    Tight,
    /// Single file perpendicular to the direction of travel
    Line,
}

impl Formation {
    /// Multiplier applied to the base spacing
    pub fn spread(&self) -> f32 {
        match self {
            Formation::Loose => 1.5,
            Formation::Tight => 0.6,
            Formation::Line => 1.0,
        }
    }
}

/// Offset from the shared target for follower `slot` of `count` followers.
///
/// `heading` is the leader's direction of travel; only its planar part is used.
pub fn slot_offset(formation: Formation, slot: usize, count: usize, spacing: f32, heading: Vec3) -> Vec3 {
    let count = count.max(1);
    let step = spacing * formation.spread();
    match formation {
        Formation::Line => {
            let dir = heading.planar().normalize();
            // Perpendicular on the ground plane; default to the x axis when stationary
            let side = if dir == Vec3::ZERO {
                Vec3::new(1.0, 0.0, 0.0)
            } else {
                Vec3::new(dir.z, 0.0, -dir.x)
            };
            // Alternate sides: slot 0 -> +1, slot 1 -> -1, slot 2 -> +2 ...
            let rank = (slot / 2 + 1) as f32;
            let sign = if slot % 2 == 0 { 1.0 } else { -1.0 };
            side * (rank * sign * step)
        }
        Formation::Tight => {
            let angle = TAU * slot as f32 / count as f32;
            Vec3::new(angle.cos() * step, 0.0, angle.sin() * step)
        }
        Formation::Loose => {
            let angle = TAU * slot as f32 / count as f32;
            let radius = step * (1.0 + slot as f32 / 4.0);
            Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_slots_are_perpendicular_to_heading() {
        let heading = Vec3::new(0.0, 0.0, 1.0);
        let a = slot_offset(Formation::Line, 0, 4, 3.0, heading);
        let b = slot_offset(Formation::Line, 1, 4, 3.0, heading);
        assert!(a.z.abs() < 1e-5 && b.z.abs() < 1e-5);
        assert!((a.x + b.x).abs() < 1e-5);
        assert!((a.x.abs() - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_tight_is_closer_than_loose() {
        let tight = slot_offset(Formation::Tight, 2, 5, 3.0, Vec3::ZERO).length();
        let loose = slot_offset(Formation::Loose, 2, 5, 3.0, Vec3::ZERO).length();
        assert!(tight < loose);
    }

    #[test]
    fn test_offsets_stay_on_ground_plane() {
        for formation in [Formation::Loose, Formation::Tight, Formation::Line] {
            for slot in 0..6 {
                assert_eq!(slot_offset(formation, slot, 6, 3.0, Vec3::new(1.0, 5.0, 1.0)).y, 0.0);
            }
        }
    }
}
