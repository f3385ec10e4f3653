//! Chunk coordinates and observer regions.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Index of a chunk on the quantized grid.
///
/// Chunk `(x, y, z)` is centered on `(x, y, z) * chunk_size` in world space and
/// spans half a chunk in every direction. Storing indices instead of world
/// positions keeps equality and hashing exact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub const ZERO: ChunkCoord = ChunkCoord { x: 0, y: 0, z: 0 };

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// World-space center of this chunk. Index 0 always maps to `+0.0`.
    pub fn center(&self, chunk_size: f32) -> Vec3 {
        Vec3::new(
            self.x as f32 * chunk_size,
            self.y as f32 * chunk_size,
            self.z as f32 * chunk_size,
        )
    }

    /// Inclusive world-space bounds `(min, max)` of this chunk.
    pub fn bounds(&self, chunk_size: f32) -> (Vec3, Vec3) {
        let center = self.center(chunk_size);
        let half = Vec3::splat(chunk_size * 0.5);
        (center - half, center + half)
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Axis-aligned region of interest reported by an observer.
///
/// `half_extents` is the distance from the center to each face. Callers that
/// hold a full box size must go through [`Region::from_size`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl Region {
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    /// Build a region from a full box size (width, height, depth).
    pub fn from_size(center: Vec3, size: Vec3) -> Self {
        Self {
            center,
            half_extents: size * 0.5,
        }
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.half_extents.abs()
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.half_extents.abs()
    }

    pub fn is_finite(&self) -> bool {
        self.center.is_finite() && self.half_extents.is_finite()
    }
}
