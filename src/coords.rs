//! Coordinate types for the chunked terrain plane.
//!
//! World space is continuous `(x, z)` with `y` up. Chunks tile the `(x, z)` plane
//! in squares of `chunk_size` world units; chunk `(cx, cz)` covers
//! `[cx * size, (cx + 1) * size) x [cz * size, (cz + 1) * size)`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseIdError;

/// Integer address of one chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkAddress {
    pub x: i32,
    pub z: i32,
}

impl ChunkAddress {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk owning the world point `(x, z)`
    pub fn containing(x: f64, z: f64, chunk_size: usize) -> Self {
        let size = chunk_size as f64;
        Self {
            x: (x / size).floor() as i32,
            z: (z / size).floor() as i32,
        }
    }

    /// World coordinates of the chunk's minimum corner
    pub fn origin(&self, chunk_size: usize) -> (f64, f64) {
        (
            self.x as f64 * chunk_size as f64,
            self.z as f64 * chunk_size as f64,
        )
    }

    /// World-space area covered by the chunk
    pub fn bounds(&self, chunk_size: usize) -> WorldBounds {
        let (min_x, min_z) = self.origin(chunk_size);
        WorldBounds {
            min_x,
            min_z,
            max_x: min_x + chunk_size as f64,
            max_z: min_z + chunk_size as f64,
        }
    }
}

impl fmt::Display for ChunkAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Point in world space (`y` is elevation).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl WorldPos {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Horizontal distance, ignoring elevation
    pub fn distance_xz(&self, other: &WorldPos) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }
}

/// Axis-aligned rectangle on the `(x, z)` plane, max edges exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub min_x: f64,
    pub min_z: f64,
    pub max_x: f64,
    pub max_z: f64,
}

impl WorldBounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn depth(&self) -> f64 {
        self.max_z - self.min_z
    }

    pub fn contains(&self, x: f64, z: f64) -> bool {
        x >= self.min_x && x < self.max_x && z >= self.min_z && z < self.max_z
    }
}

/// Identifier of a placed feature: owning chunk plus index in its feature list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureId {
    pub chunk: ChunkAddress,
    pub index: u32,
}

/// Identifier of a destructible element: owning chunk plus index in its
/// destructible list. Formats as `x:z:index`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId {
    pub chunk: ChunkAddress,
    pub index: u32,
}

impl ElementId {
    pub const fn new(chunk: ChunkAddress, index: u32) -> Self {
        Self { chunk, index }
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.chunk.x, self.chunk.z, self.index)
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.chunk.x, self.chunk.z, self.index)
    }
}

impl FromStr for ElementId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let mut next = || parts.next().ok_or_else(|| ParseIdError::new(s));
        let x = next()?.parse::<i32>().map_err(|_| ParseIdError::new(s))?;
        let z = next()?.parse::<i32>().map_err(|_| ParseIdError::new(s))?;
        let index = next()?.parse::<u32>().map_err(|_| ParseIdError::new(s))?;
        if parts.next().is_some() {
            return Err(ParseIdError::new(s));
        }
        Ok(ElementId::new(ChunkAddress::new(x, z), index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_containing_handles_negatives() {
        assert_eq!(ChunkAddress::containing(0.0, 0.0, 256), ChunkAddress::new(0, 0));
        assert_eq!(ChunkAddress::containing(255.9, 256.0, 256), ChunkAddress::new(0, 1));
        assert_eq!(ChunkAddress::containing(-0.5, -256.0, 256), ChunkAddress::new(-1, -1));
        assert_eq!(ChunkAddress::containing(-256.5, 10.0, 256), ChunkAddress::new(-2, 0));
    }

    #[test]
    fn test_chunks_tile_without_gaps() {
        let size = 32;
        let a = ChunkAddress::new(2, -1).bounds(size);
        let b = ChunkAddress::new(3, -1).bounds(size);
        assert_eq!(a.max_x, b.min_x);
        assert!(!a.contains(a.max_x, a.min_z));
        assert!(b.contains(b.min_x, b.min_z));
    }

    #[test]
    fn test_element_id_parse() {
        let id: ElementId = "-3:7:12".parse().unwrap();
        assert_eq!(id, ElementId::new(ChunkAddress::new(-3, 7), 12));
        assert_eq!(id.to_string(), "-3:7:12");
        assert!("1:2".parse::<ElementId>().is_err());
        assert!("1:2:3:4".parse::<ElementId>().is_err());
        assert!("a:2:3".parse::<ElementId>().is_err());
        assert!("1:2:-3".parse::<ElementId>().is_err());
    }
}
