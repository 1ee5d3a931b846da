//! Environment collaborators: terrain height and named locations

pub mod location;
pub mod terrain;

pub use location::{Location, LocationCatalog, LocationKind};
pub use terrain::{FlatTerrain, NoiseTerrain, TerrainCategory, TerrainQuery};
