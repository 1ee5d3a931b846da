//! Named points of interest and the catalog that owns them

use crate::core::types::{LocationId, Vec3};
use crate::world::terrain::{TerrainCategory, TerrainQuery};
use ordered_float::OrderedFloat;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Half-width of the square in which positionless locations are placed
const LAZY_PLACEMENT_EXTENT: f32 = 50.0;

/// What a location is: a terrain feature, a terrain region, or a home
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    // Features
    Grassland,
    Tree,
    Pond,
    Cave,
    FallenLog,
    BigRock,
    // Regions
    River,
    Lowland,
    Forest,
    Hills,
    Mountain,
    Home,
}

impl LocationKind {
    pub fn activities(&self) -> &'static [&'static str] {
        match self {
            LocationKind::Grassland => &["eat", "rest", "explore"],
            LocationKind::Tree => &["eat", "rest"],
            LocationKind::Pond => &["drink"],
            LocationKind::Cave => &["rest", "shelter"],
            LocationKind::FallenLog => &["rest"],
            LocationKind::BigRock => &["rest", "shelter"],
            LocationKind::River => &["drink"],
            LocationKind::Lowland => &["eat", "explore"],
            LocationKind::Forest => &["eat", "shelter"],
            LocationKind::Hills => &["rest", "explore"],
            LocationKind::Mountain => &["shelter"],
            LocationKind::Home => &["rest"],
        }
    }

    pub fn is_water(&self) -> bool {
        matches!(self, LocationKind::Pond | LocationKind::River)
    }

    pub fn is_food(&self) -> bool {
        matches!(
            self,
            LocationKind::Grassland | LocationKind::Tree | LocationKind::Lowland | LocationKind::Forest
        )
    }

    /// Rest spots that predators are assumed not to patrol
    pub fn is_shelter(&self) -> bool {
        matches!(self, LocationKind::Cave | LocationKind::BigRock)
    }

    pub fn is_rest(&self) -> bool {
        self.activities().contains(&"rest")
    }

    /// Terrain category a region kind stands for
    pub fn region(&self) -> Option<TerrainCategory> {
        match self {
            LocationKind::River => Some(TerrainCategory::River),
            LocationKind::Lowland => Some(TerrainCategory::Lowland),
            LocationKind::Forest => Some(TerrainCategory::Forest),
            LocationKind::Hills => Some(TerrainCategory::Hills),
            LocationKind::Mountain => Some(TerrainCategory::Mountain),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub kind: LocationKind,
    /// Assigned lazily on first use when absent
    pub position: Option<Vec3>,
    pub is_home: bool,
}

impl Location {
    pub fn activities(&self) -> &'static [&'static str] {
        self.kind.activities()
    }
}

/// Read-mostly catalog of every known location
#[derive(Debug, Clone, Default)]
pub struct LocationCatalog {
    locations: Vec<Location>,
}

impl LocationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default savanna catalog: positionless features plus one sampled point per region
    pub fn savanna<R: Rng + ?Sized>(terrain: &dyn TerrainQuery, rng: &mut R) -> Self {
        let mut catalog = Self::new();
        for (name, kind) in [
            ("Grassland", LocationKind::Grassland),
            ("Acacia Tree", LocationKind::Tree),
            ("Watering Pond", LocationKind::Pond),
            ("Cave", LocationKind::Cave),
            ("Fallen Log", LocationKind::FallenLog),
            ("Big Rock", LocationKind::BigRock),
        ] {
            catalog.add(name, kind, None);
        }

        for (name, kind) in [
            ("River", LocationKind::River),
            ("Lowland", LocationKind::Lowland),
            ("Forest", LocationKind::Forest),
            ("Hills", LocationKind::Hills),
            ("Mountain", LocationKind::Mountain),
        ] {
            let position = kind
                .region()
                .and_then(|category| sample_category(terrain, rng, category, 200, 150.0));
            catalog.add(name, kind, position);
        }

        catalog
    }

    pub fn add(&mut self, name: impl Into<String>, kind: LocationKind, position: Option<Vec3>) -> LocationId {
        let id = LocationId(self.locations.len() as u32);
        self.locations.push(Location {
            id,
            name: name.into(),
            kind,
            position,
            is_home: kind == LocationKind::Home,
        });
        id
    }

    pub fn add_home(&mut self, name: impl Into<String>, position: Vec3) -> LocationId {
        self.add(name, LocationKind::Home, Some(position))
    }

    pub fn get(&self, id: LocationId) -> Option<&Location> {
        self.locations.get(id.0 as usize)
    }

    pub fn all(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn by_kind(&self, kind: LocationKind) -> Vec<LocationId> {
        self.locations.iter().filter(|l| l.kind == kind).map(|l| l.id).collect()
    }

    /// Locations matching a predicate on their kind, homes excluded
    pub fn matching(&self, pred: impl Fn(LocationKind) -> bool) -> Vec<LocationId> {
        self.locations
            .iter()
            .filter(|l| !l.is_home && pred(l.kind))
            .map(|l| l.id)
            .collect()
    }

    pub fn by_name(&self, name: &str) -> Option<LocationId> {
        self.locations
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(name.trim()))
            .map(|l| l.id)
    }

    pub fn name_of(&self, id: Option<LocationId>) -> &str {
        id.and_then(|id| self.get(id)).map(|l| l.name.as_str()).unwrap_or("unknown")
    }

    /// Position of a location, assigning a random one if it has none yet
    pub fn resolve_position<R: Rng + ?Sized>(
        &mut self,
        id: LocationId,
        terrain: &dyn TerrainQuery,
        rng: &mut R,
    ) -> Option<Vec3> {
        let location = self.locations.get_mut(id.0 as usize)?;
        if let Some(pos) = location.position {
            return Some(pos);
        }
        let x = rng.gen_range(-LAZY_PLACEMENT_EXTENT..=LAZY_PLACEMENT_EXTENT);
        let z = rng.gen_range(-LAZY_PLACEMENT_EXTENT..=LAZY_PLACEMENT_EXTENT);
        let pos = Vec3::new(x, terrain.height(x, z), z);
        location.position = Some(pos);
        tracing::debug!(location = %location.name, x, z, "assigned lazy location position");
        Some(pos)
    }

    /// Nearest positioned, non-home location standing on one of `categories`
    pub fn nearest_of_terrain(
        &self,
        from: Vec3,
        categories: &[TerrainCategory],
        terrain: &dyn TerrainQuery,
    ) -> Option<LocationId> {
        self.locations
            .iter()
            .filter(|l| !l.is_home)
            .filter_map(|l| l.position.map(|p| (l.id, p)))
            .filter(|(_, p)| categories.contains(&terrain.category(p.x, p.z)))
            .min_by_key(|(id, p)| (OrderedFloat(p.planar_distance(&from)), id.0))
            .map(|(id, _)| id)
    }
}

/// Random point within `radius` of the origin whose terrain matches `category`
pub fn sample_category<R: Rng + ?Sized>(
    terrain: &dyn TerrainQuery,
    rng: &mut R,
    category: TerrainCategory,
    attempts: u32,
    radius: f32,
) -> Option<Vec3> {
    sample_category_near(terrain, rng, Vec3::ZERO, category, attempts, radius)
}

/// Random point within `radius` of `center` whose terrain matches `category`
pub fn sample_category_near<R: Rng + ?Sized>(
    terrain: &dyn TerrainQuery,
    rng: &mut R,
    center: Vec3,
    category: TerrainCategory,
    attempts: u32,
    radius: f32,
) -> Option<Vec3> {
    for _ in 0..attempts {
        let x = center.x + rng.gen_range(-radius..=radius);
        let z = center.z + rng.gen_range(-radius..=radius);
        let h = terrain.height(x, z);
        if TerrainCategory::from_height(h) == category {
            return Some(Vec3::new(x, h, z));
        }
    }
    None
}
