//! Terrain height queries and height-band categories
//!
//! The simulation only ever asks for a height at (x, z). Any deterministic
//! height function works; `NoiseTerrain` is the default procedural one.

use noise::{NoiseFn, Perlin, Seedable};
use serde::{Deserialize, Serialize};

/// Deterministic, pure height lookup over the ground plane
pub trait TerrainQuery: Send + Sync {
    fn height(&self, x: f32, z: f32) -> f32;

    fn category(&self, x: f32, z: f32) -> TerrainCategory {
        TerrainCategory::from_height(self.height(x, z))
    }
}

/// Height-band classification of the ground
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainCategory {
    River,    // [-inf, 0)
    Lowland,  // [0, 3)
    Forest,   // [3, 8)
    Hills,    // [8, 15)
    Mountain, // [15, 25)
    Alpine,   // [25, inf)
}

impl TerrainCategory {
    pub fn from_height(height: f32) -> Self {
        if height < 0.0 {
            TerrainCategory::River
        } else if height < 3.0 {
            TerrainCategory::Lowland
        } else if height < 8.0 {
            TerrainCategory::Forest
        } else if height < 15.0 {
            TerrainCategory::Hills
        } else if height < 25.0 {
            TerrainCategory::Mountain
        } else {
            TerrainCategory::Alpine
        }
    }

    /// Categories an escaping animal heads for
    pub fn is_safe(&self) -> bool {
        matches!(self, TerrainCategory::Forest | TerrainCategory::Mountain)
    }

    /// Parse a routine place name such as "lowland" or "hills"
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "river" => Some(TerrainCategory::River),
            "lowland" => Some(TerrainCategory::Lowland),
            "forest" => Some(TerrainCategory::Forest),
            "hills" => Some(TerrainCategory::Hills),
            "mountain" => Some(TerrainCategory::Mountain),
            "alpine" => Some(TerrainCategory::Alpine),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TerrainCategory::River => "river",
            TerrainCategory::Lowland => "lowland",
            TerrainCategory::Forest => "forest",
            TerrainCategory::Hills => "hills",
            TerrainCategory::Mountain => "mountain",
            TerrainCategory::Alpine => "alpine",
        }
    }
}

/// Layered Perlin height field
pub struct NoiseTerrain {
    noise: Perlin,
    /// Base frequency (lower = larger features)
    frequency: f64,
    octaves: u32,
    persistence: f64,
    lacunarity: f64,
    /// Peak-to-trough amplitude in world units
    amplitude: f32,
    /// Added after scaling so most of the map sits in the lowland band
    offset: f32,
}

impl NoiseTerrain {
    pub fn new(seed: u64) -> Self {
        Self {
            noise: Perlin::new(1).set_seed(seed as u32),
            frequency: 0.012,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            amplitude: 18.0,
            offset: 4.0,
        }
    }
}

impl TerrainQuery for NoiseTerrain {
    fn height(&self, x: f32, z: f32) -> f32 {
        let mut total = 0.0;
        let mut freq = self.frequency;
        let mut amp = 1.0;
        let mut norm = 0.0;
        for _ in 0..self.octaves {
            total += self.noise.get([x as f64 * freq, z as f64 * freq]) * amp;
            norm += amp;
            amp *= self.persistence;
            freq *= self.lacunarity;
        }
        (total / norm) as f32 * self.amplitude + self.offset
    }
}

/// Constant-height terrain, mostly for tests
#[derive(Debug, Clone, Copy)]
pub struct FlatTerrain(pub f32);

impl TerrainQuery for FlatTerrain {
    fn height(&self, _x: f32, _z: f32) -> f32 {
        self.0
    }
}
