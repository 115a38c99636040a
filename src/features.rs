//! Placed scenery and breakable elements.
//!
//! Features are the scenery the generator places on a chunk (buildings, trees,
//! roads, rocks...). Destructible elements are the breakable parts: either bound
//! to a feature (a building's windows, a tree's branches) or free-standing
//! (barrels, fences, signs).

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::biomes::BiomeId;
use crate::coords::{ElementId, FeatureId, WorldPos};
use crate::error::DestroyError;

/// How long spawned debris lives, in seconds
pub const DEBRIS_LIFETIME: f32 = 5.0;

/// Horizontal spread of debris around the destroyed element
const DEBRIS_SPREAD: f32 = 1.5;

/// Kinds of placeable scenery
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Building,
    Tree,
    Bush,
    Road,
    Rock,
    Wreck,
}

impl FeatureKind {
    pub fn name(&self) -> &'static str {
        match self {
            FeatureKind::Building => "building",
            FeatureKind::Tree => "tree",
            FeatureKind::Bush => "bush",
            FeatureKind::Road => "road",
            FeatureKind::Rock => "rock",
            FeatureKind::Wreck => "wreck",
        }
    }

    /// Whether features of this kind can be broken apart
    pub fn is_destructible(&self) -> bool {
        matches!(self, FeatureKind::Building | FeatureKind::Tree | FeatureKind::Wreck)
    }

    pub fn max_health(&self) -> f32 {
        match self {
            FeatureKind::Building => 500.0,
            FeatureKind::Tree => 100.0,
            FeatureKind::Bush => 20.0,
            FeatureKind::Road => 1000.0,
            FeatureKind::Rock => 300.0,
            FeatureKind::Wreck => 200.0,
        }
    }

    /// RGB color for previews
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            FeatureKind::Building => (150, 150, 160),
            FeatureKind::Tree => (20, 90, 30),
            FeatureKind::Bush => (70, 130, 50),
            FeatureKind::Road => (60, 60, 60),
            FeatureKind::Rock => (120, 110, 100),
            FeatureKind::Wreck => (140, 70, 40),
        }
    }
}

impl std::fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Kind-specific geometry hints for the rendering and physics layers
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureGeometry {
    Building { height: f32, width: f32, depth: f32, floors: u32 },
    Tree { height: f32, canopy_radius: f32 },
    Bush { radius: f32 },
    Road { length: f32, width: f32, heading: f32 },
    Rock { radius: f32 },
    Wreck { length: f32, heading: f32 },
}

impl FeatureGeometry {
    pub fn kind(&self) -> FeatureKind {
        match self {
            FeatureGeometry::Building { .. } => FeatureKind::Building,
            FeatureGeometry::Tree { .. } => FeatureKind::Tree,
            FeatureGeometry::Bush { .. } => FeatureKind::Bush,
            FeatureGeometry::Road { .. } => FeatureKind::Road,
            FeatureGeometry::Rock { .. } => FeatureKind::Rock,
            FeatureGeometry::Wreck { .. } => FeatureKind::Wreck,
        }
    }

    /// Approximate radius of the ground footprint
    pub fn footprint_radius(&self) -> f32 {
        match *self {
            FeatureGeometry::Building { width, depth, .. } => 0.5 * (width * width + depth * depth).sqrt(),
            FeatureGeometry::Tree { canopy_radius, .. } => canopy_radius,
            FeatureGeometry::Bush { radius } | FeatureGeometry::Rock { radius } => radius,
            FeatureGeometry::Road { length, .. } | FeatureGeometry::Wreck { length, .. } => 0.5 * length,
        }
    }
}

/// A placed scenery instance. Owned by exactly one chunk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: FeatureId,
    pub geometry: FeatureGeometry,
    pub position: WorldPos,
    /// Biome the feature was placed for
    pub biome: BiomeId,
    pub scale: f32,
    /// Rotation around the vertical axis, radians
    pub rotation: f32,
    pub health: f32,
    pub max_health: f32,
    pub destructible: bool,
}

impl Feature {
    pub fn kind(&self) -> FeatureKind {
        self.geometry.kind()
    }

    /// Remove health, never going below zero
    pub fn take_damage(&mut self, amount: f32) {
        if amount > 0.0 {
            self.health = (self.health - amount).max(0.0);
        }
    }

    pub fn is_intact(&self) -> bool {
        self.health > 0.0
    }
}

/// Kinds of breakable element
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestructibleKind {
    // Bound to a parent feature
    Window,
    Branch,
    Panel,

    // Free-standing
    Barrel,
    Crate,
    Fence,
    Pole,
    Sign,
}

impl DestructibleKind {
    pub fn name(&self) -> &'static str {
        match self {
            DestructibleKind::Window => "window",
            DestructibleKind::Branch => "branch",
            DestructibleKind::Panel => "panel",
            DestructibleKind::Barrel => "barrel",
            DestructibleKind::Crate => "crate",
            DestructibleKind::Fence => "fence",
            DestructibleKind::Pole => "pole",
            DestructibleKind::Sign => "sign",
        }
    }

    pub fn max_health(&self) -> f32 {
        match self {
            DestructibleKind::Window => 10.0,
            DestructibleKind::Branch => 20.0,
            DestructibleKind::Panel => 40.0,
            DestructibleKind::Barrel => 30.0,
            DestructibleKind::Crate => 25.0,
            DestructibleKind::Fence => 50.0,
            DestructibleKind::Pole => 60.0,
            DestructibleKind::Sign => 15.0,
        }
    }

    /// Number of debris pieces spawned on destruction
    pub fn debris_count(&self) -> usize {
        match self {
            DestructibleKind::Window => 3,
            DestructibleKind::Branch => 2,
            DestructibleKind::Panel => 4,
            DestructibleKind::Barrel => 5,
            DestructibleKind::Crate => 6,
            DestructibleKind::Fence => 4,
            DestructibleKind::Pole => 3,
            DestructibleKind::Sign => 2,
        }
    }

    pub fn is_free_standing(&self) -> bool {
        !matches!(self, DestructibleKind::Window | DestructibleKind::Branch | DestructibleKind::Panel)
    }
}

impl std::fmt::Display for DestructibleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A breakable instance, bound to a feature or free-standing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DestructibleElement {
    pub id: ElementId,
    pub kind: DestructibleKind,
    pub position: WorldPos,
    /// Feature this element is part of, if any
    pub parent: Option<FeatureId>,
    pub health: f32,
    pub max_health: f32,
    pub destroyed: bool,
    pub destroyed_at: Option<DateTime<Utc>>,
}

impl DestructibleElement {
    pub fn new(id: ElementId, kind: DestructibleKind, position: WorldPos, parent: Option<FeatureId>) -> Self {
        Self {
            id,
            kind,
            position,
            parent,
            health: kind.max_health(),
            max_health: kind.max_health(),
            destroyed: false,
            destroyed_at: None,
        }
    }

    /// Apply damage. Health only ever decreases; reaching zero marks the element
    /// destroyed. Returns whether this call destroyed it. Non-positive amounts
    /// are ignored.
    pub fn apply_damage(&mut self, amount: f32) -> Result<bool, DestroyError> {
        if self.destroyed {
            return Err(DestroyError::AlreadyDestroyed(self.id));
        }
        if !(amount > 0.0) {
            return Ok(false);
        }

        self.health = (self.health - amount).max(0.0);
        if self.health <= 0.0 {
            self.destroyed = true;
            self.destroyed_at = Some(Utc::now());
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// A short-lived fragment thrown off by a destroyed element
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Debris {
    /// Kind of the element that broke
    pub source: DestructibleKind,
    pub position: WorldPos,
    /// Initial velocity (x, y, z), world units per second
    pub velocity: [f32; 3],
    /// Seconds until the fragment should be removed
    pub lifetime: f32,
}

/// Spawn debris for a destroyed element: random offsets near the element and
/// outward, upward velocities.
pub fn spawn_debris<R: Rng>(element: &DestructibleElement, rng: &mut R) -> Vec<Debris> {
    (0..element.kind.debris_count())
        .map(|_| {
            let dx = rng.gen_range(-DEBRIS_SPREAD..=DEBRIS_SPREAD);
            let dz = rng.gen_range(-DEBRIS_SPREAD..=DEBRIS_SPREAD);
            let dy = rng.gen_range(0.0..1.0);

            // Push outward along the offset direction
            let len = (dx * dx + dz * dz).sqrt().max(0.1);
            let speed = rng.gen_range(2.0..6.0);
            let velocity = [dx / len * speed, rng.gen_range(2.0..5.0), dz / len * speed];

            Debris {
                source: element.kind,
                position: WorldPos::new(
                    element.position.x + dx,
                    element.position.y + dy,
                    element.position.z + dz,
                ),
                velocity,
                lifetime: DEBRIS_LIFETIME,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::ChunkAddress;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn make_element(kind: DestructibleKind) -> DestructibleElement {
        DestructibleElement::new(
            ElementId::new(ChunkAddress::new(0, 0), 0),
            kind,
            WorldPos::new(10.0, 5.0, 10.0),
            None,
        )
    }

    #[test]
    fn test_destructible_feature_kinds() {
        assert!(FeatureKind::Building.is_destructible());
        assert!(FeatureKind::Tree.is_destructible());
        assert!(!FeatureKind::Road.is_destructible());
        assert!(!FeatureKind::Rock.is_destructible());
    }

    #[test]
    fn test_geometry_kind_matches() {
        let g = FeatureGeometry::Tree { height: 9.0, canopy_radius: 3.0 };
        assert_eq!(g.kind(), FeatureKind::Tree);
        assert_eq!(g.footprint_radius(), 3.0);
    }

    #[test]
    fn test_damage_is_monotone_and_saturates() {
        let mut element = make_element(DestructibleKind::Barrel);
        assert_eq!(element.apply_damage(10.0), Ok(false));
        assert_eq!(element.health, 20.0);
        assert_eq!(element.apply_damage(-50.0), Ok(false));
        assert_eq!(element.health, 20.0);
        assert_eq!(element.apply_damage(f32::NAN), Ok(false));
        assert_eq!(element.health, 20.0);
        assert_eq!(element.apply_damage(100.0), Ok(true));
        assert_eq!(element.health, 0.0);
        assert!(element.destroyed);
        assert!(element.destroyed_at.is_some());
    }

    #[test]
    fn test_damage_after_destroy_fails() {
        let mut element = make_element(DestructibleKind::Sign);
        element.apply_damage(f32::INFINITY).unwrap();
        assert_eq!(
            element.apply_damage(1.0),
            Err(DestroyError::AlreadyDestroyed(element.id))
        );
        assert_eq!(element.health, 0.0);
    }

    #[test]
    fn test_debris_near_element() {
        let element = make_element(DestructibleKind::Crate);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let debris = spawn_debris(&element, &mut rng);
        assert_eq!(debris.len(), DestructibleKind::Crate.debris_count());
        for d in &debris {
            assert_eq!(d.source, DestructibleKind::Crate);
            assert_eq!(d.lifetime, DEBRIS_LIFETIME);
            assert!(d.position.distance_xz(&element.position) <= DEBRIS_SPREAD * 1.5);
            assert!(d.position.y >= element.position.y);
            assert!(d.velocity[1] > 0.0);
        }
    }

    #[test]
    fn test_feature_damage_saturates() {
        let mut feature = Feature {
            id: FeatureId { chunk: ChunkAddress::new(0, 0), index: 0 },
            geometry: FeatureGeometry::Rock { radius: 1.0 },
            position: WorldPos::default(),
            biome: BiomeId(0),
            scale: 1.0,
            rotation: 0.0,
            health: 5.0,
            max_health: 5.0,
            destructible: false,
        };
        feature.take_damage(3.0);
        assert_eq!(feature.health, 2.0);
        feature.take_damage(10.0);
        assert_eq!(feature.health, 0.0);
        assert!(!feature.is_intact());
    }
}
