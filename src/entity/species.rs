//! Per-species configuration records
//!
//! Everything that varies by animal type is looked up here once, so the
//! decision and movement code never branches on species directly.

use crate::herd::formation::Formation;
use crate::world::terrain::TerrainCategory;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Lion,
    Elephant,
    Giraffe,
    Zebra,
    Hyena,
    Meerkat,
    Gazelle,
}

/// Static stats and behaviour flags for one species
#[derive(Debug, Clone, Copy)]
pub struct SpeciesProfile {
    pub attack_power: f32,
    pub defense: f32,
    /// Body scale relative to a zebra
    pub size: f32,
    pub speed_multiplier: f32,
    pub prey: &'static [Species],
    pub diet: TerrainCategory,
    pub home: TerrainCategory,
    /// Herd formation, `None` for species that do not form herds
    pub formation: Option<Formation>,
}

const LION: SpeciesProfile = SpeciesProfile {
    attack_power: 90.0,
    defense: 70.0,
    size: 1.2,
    speed_multiplier: 1.2,
    prey: &[Species::Zebra, Species::Giraffe, Species::Gazelle],
    diet: TerrainCategory::Lowland,
    home: TerrainCategory::Hills,
    formation: None,
};

const ELEPHANT: SpeciesProfile = SpeciesProfile {
    attack_power: 60.0,
    defense: 95.0,
    size: 2.0,
    speed_multiplier: 0.6,
    prey: &[],
    diet: TerrainCategory::Lowland,
    home: TerrainCategory::Lowland,
    formation: Some(Formation::Line),
};

const GIRAFFE: SpeciesProfile = SpeciesProfile {
    attack_power: 30.0,
    defense: 50.0,
    size: 1.8,
    speed_multiplier: 0.8,
    prey: &[],
    diet: TerrainCategory::Forest,
    home: TerrainCategory::Lowland,
    formation: None,
};

const ZEBRA: SpeciesProfile = SpeciesProfile {
    attack_power: 20.0,
    defense: 40.0,
    size: 1.0,
    speed_multiplier: 1.5,
    prey: &[],
    diet: TerrainCategory::Lowland,
    home: TerrainCategory::Lowland,
    formation: Some(Formation::Loose),
};

const HYENA: SpeciesProfile = SpeciesProfile {
    attack_power: 50.0,
    defense: 45.0,
    size: 0.8,
    speed_multiplier: 1.0,
    prey: &[Species::Zebra, Species::Gazelle],
    diet: TerrainCategory::Lowland,
    home: TerrainCategory::Hills,
    formation: None,
};

const MEERKAT: SpeciesProfile = SpeciesProfile {
    attack_power: 15.0,
    defense: 30.0,
    size: 0.4,
    speed_multiplier: 1.3,
    prey: &[],
    diet: TerrainCategory::Hills,
    home: TerrainCategory::Mountain,
    formation: None,
};

const GAZELLE: SpeciesProfile = SpeciesProfile {
    attack_power: 10.0,
    defense: 35.0,
    size: 0.6,
    speed_multiplier: 1.6,
    prey: &[],
    diet: TerrainCategory::Lowland,
    home: TerrainCategory::Lowland,
    formation: Some(Formation::Tight),
};

impl Species {
    pub const ALL: [Species; 7] = [
        Species::Lion,
        Species::Elephant,
        Species::Giraffe,
        Species::Zebra,
        Species::Hyena,
        Species::Meerkat,
        Species::Gazelle,
    ];

    pub fn profile(&self) -> &'static SpeciesProfile {
        match self {
            Species::Lion => &LION,
            Species::Elephant => &ELEPHANT,
            Species::Giraffe => &GIRAFFE,
            Species::Zebra => &ZEBRA,
            Species::Hyena => &HYENA,
            Species::Meerkat => &MEERKAT,
            Species::Gazelle => &GAZELLE,
        }
    }

    pub fn is_predator(&self) -> bool {
        !self.profile().prey.is_empty()
    }

    /// Whether `self` hunts `other`
    pub fn preys_on(&self, other: Species) -> bool {
        self.profile().prey.contains(&other)
    }

    pub fn forms_herd(&self) -> bool {
        self.profile().formation.is_some()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Species::Lion => "lion",
            Species::Elephant => "elephant",
            Species::Giraffe => "giraffe",
            Species::Zebra => "zebra",
            Species::Hyena => "hyena",
            Species::Meerkat => "meerkat",
            Species::Gazelle => "gazelle",
        }
    }

    /// Persona line handed to the decision provider
    pub fn persona(&self) -> &'static str {
        match self {
            Species::Lion => "You are a lion, an apex predator of the savanna. You hunt zebra, giraffe and gazelle.",
            Species::Elephant => "You are an elephant. You are huge, slow and travel with your herd.",
            Species::Giraffe => "You are a giraffe. You browse the treetops of the forest edge.",
            Species::Zebra => "You are a zebra. You graze the lowland in a herd and fear lions and hyenas.",
            Species::Hyena => "You are a hyena, an opportunistic predator of zebra and gazelle.",
            Species::Meerkat => "You are a meerkat. You are small, alert and live among the rocks.",
            Species::Gazelle => "You are a gazelle. You are the fastest grazer and flee at the first sign of danger.",
        }
    }
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predator_relations() {
        assert!(Species::Lion.preys_on(Species::Zebra));
        assert!(Species::Hyena.preys_on(Species::Gazelle));
        assert!(!Species::Hyena.preys_on(Species::Giraffe));
        assert!(!Species::Zebra.is_predator());
    }

    #[test]
    fn test_herd_species() {
        let herd: Vec<_> = Species::ALL.iter().filter(|s| s.forms_herd()).collect();
        assert_eq!(herd, vec![&Species::Elephant, &Species::Zebra, &Species::Gazelle]);
    }

    #[test]
    fn test_predators_never_herd() {
        for s in Species::ALL {
            assert!(!(s.is_predator() && s.forms_herd()), "{s} is both");
        }
    }
}
