//! Grid quantization
//!
//! Maps continuous axis-aligned regions onto the discrete set of chunks they
//! overlap. Chunks are centered on multiples of the chunk size, and every
//! rounding step uses round-half-to-even so the same input always lands on
//! the same chunk.

use glam::Vec3;

use crate::core::{ChunkCoord, ConfigError, RegionError};

/// Pure quantization over a fixed chunk size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkGrid {
    chunk_size: f32,
}

impl ChunkGrid {
    pub fn new(chunk_size: f32) -> Result<Self, ConfigError> {
        if !chunk_size.is_finite() || chunk_size <= 0.0 {
            return Err(ConfigError::InvalidChunkSize(chunk_size));
        }
        Ok(Self { chunk_size })
    }

    pub fn chunk_size(&self) -> f32 {
        self.chunk_size
    }

    /// Round `value` to the nearest multiple of the chunk size.
    ///
    /// Never returns `-0.0`.
    pub fn quantize(&self, value: f32) -> f32 {
        let snapped = self.chunk_size * (value / self.chunk_size).round_ties_even();
        if snapped == 0.0 { 0.0 } else { snapped }
    }

    /// Index of the chunk whose center is nearest to `value`, or `None`
    /// when that index does not fit in an `i32`.
    pub fn cell(&self, value: f32) -> Option<i32> {
        let index = (value / self.chunk_size).round_ties_even();
        // i32::MAX is not representable as f32; 2^31 is the first index out of range
        if (-2_147_483_648.0..2_147_483_648.0).contains(&index) {
            Some(index as i32)
        } else {
            None
        }
    }

    pub fn coord_of(&self, point: Vec3) -> Option<ChunkCoord> {
        Some(ChunkCoord::new(
            self.cell(point.x)?,
            self.cell(point.y)?,
            self.cell(point.z)?,
        ))
    }

    /// Inclusive per-axis cell range covered by the box. Negative half
    /// extents are treated as their magnitude.
    pub fn span(&self, center: Vec3, half_extents: Vec3) -> Result<CellSpan, RegionError> {
        let half = half_extents.abs();
        let out_of_range = || RegionError::OutOfRange {
            center,
            half_extents,
        };
        Ok(CellSpan {
            min: self.coord_of(center - half).ok_or_else(out_of_range)?,
            max: self.coord_of(center + half).ok_or_else(out_of_range)?,
        })
    }

    /// Every chunk overlapped by the box, in x-major order.
    pub fn coordinates_overlapping(
        &self,
        center: Vec3,
        half_extents: Vec3,
    ) -> Result<Vec<ChunkCoord>, RegionError> {
        Ok(self.span(center, half_extents)?.iter().collect())
    }
}

/// Inclusive box of chunk indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSpan {
    pub min: ChunkCoord,
    pub max: ChunkCoord,
}

impl CellSpan {
    /// Number of chunks in the span, `None` if it does not fit in a `usize`.
    pub fn len(&self) -> Option<usize> {
        let axis = |lo: i32, hi: i32| usize::try_from((i64::from(hi) - i64::from(lo) + 1).max(0)).ok();
        axis(self.min.x, self.max.x)?
            .checked_mul(axis(self.min.y, self.max.y)?)?
            .checked_mul(axis(self.min.z, self.max.z)?)
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        (self.min.x..=self.max.x).contains(&coord.x)
            && (self.min.y..=self.max.y).contains(&coord.y)
            && (self.min.z..=self.max.z).contains(&coord.z)
    }

    pub fn iter(&self) -> impl Iterator<Item = ChunkCoord> + use<> {
        let (min, max) = (self.min, self.max);
        (min.x..=max.x).flat_map(move |x| {
            (min.y..=max.y).flat_map(move |y| (min.z..=max.z).map(move |z| ChunkCoord::new(x, y, z)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(size: f32) -> ChunkGrid {
        ChunkGrid::new(size).unwrap()
    }

    #[test]
    fn rejects_bad_chunk_sizes() {
        assert!(ChunkGrid::new(0.0).is_err());
        assert!(ChunkGrid::new(-16.0).is_err());
        assert!(ChunkGrid::new(f32::NAN).is_err());
        assert!(ChunkGrid::new(f32::INFINITY).is_err());
    }

    #[test]
    fn quantize_is_idempotent_and_aligned() {
        let g = grid(1000.0);
        let samples = [
            -123456.7, -2500.0, -1499.9, -500.0, -0.3, 0.0, 0.4, 499.9, 500.0, 1500.0, 2500.1,
            987654.0,
        ];
        for s in samples {
            let q = g.quantize(s);
            assert_eq!(g.quantize(q), q, "quantize not idempotent for {s}");
            assert_eq!((q / 1000.0).fract(), 0.0, "{q} is not a multiple of the chunk size");
        }
    }

    #[test]
    fn quantize_never_yields_negative_zero() {
        let g = grid(1000.0);
        let q = g.quantize(-0.0000001 * 1000.0);
        assert_eq!(q, 0.0);
        assert!(q.is_sign_positive());
        assert!(g.quantize(-0.0).is_sign_positive());
        assert!(g.quantize(-499.0).is_sign_positive());
    }

    #[test]
    fn quantize_rounds_half_to_even() {
        let g = grid(1000.0);
        assert_eq!(g.quantize(500.0), 0.0);
        assert_eq!(g.quantize(1500.0), 2000.0);
        assert_eq!(g.quantize(2500.0), 2000.0);
        assert_eq!(g.quantize(-1500.0), -2000.0);
    }

    #[test]
    fn centered_half_chunk_covers_one_chunk() {
        let g = grid(1000.0);
        let coords = g.coordinates_overlapping(Vec3::ZERO, Vec3::splat(500.0)).unwrap();
        assert_eq!(coords, vec![ChunkCoord::ZERO]);
    }

    #[test]
    fn offset_region_covers_two_chunks() {
        let g = grid(1000.0);
        let coords = g
            .coordinates_overlapping(Vec3::new(1500.0, 0.0, 0.0), Vec3::new(600.0, 0.0, 0.0))
            .unwrap();
        assert_eq!(coords, vec![ChunkCoord::new(1, 0, 0), ChunkCoord::new(2, 0, 0)]);
        let world: Vec<Vec3> = coords.iter().map(|c| c.center(g.chunk_size())).collect();
        assert_eq!(world, vec![Vec3::new(1000.0, 0.0, 0.0), Vec3::new(2000.0, 0.0, 0.0)]);
    }

    #[test]
    fn negative_half_extents_use_magnitude() {
        let g = grid(10.0);
        let a = g.coordinates_overlapping(Vec3::ZERO, Vec3::new(-12.0, 3.0, -3.0)).unwrap();
        let b = g.coordinates_overlapping(Vec3::ZERO, Vec3::new(12.0, 3.0, 3.0)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn span_len_matches_iteration() {
        let g = grid(4.0);
        let span = g.span(Vec3::new(1.0, -7.0, 3.0), Vec3::new(9.0, 5.0, 1.0)).unwrap();
        assert_eq!(span.len(), Some(span.iter().count()));
        assert!(!span.is_empty());
        assert!(span.iter().all(|coord| span.contains(coord)));
        assert!(!span.contains(ChunkCoord::new(span.max.x + 1, span.min.y, span.min.z)));
    }

    #[test]
    fn every_point_in_region_is_covered() {
        let g = grid(10.0);
        let center = Vec3::new(3.3, -17.1, 42.0);
        let half = Vec3::new(26.0, 8.2, 0.7);
        let coords = g.coordinates_overlapping(center, half).unwrap();

        let steps = 12;
        for i in 0..=steps {
            for j in 0..=steps {
                for k in 0..=steps {
                    let t = Vec3::new(i as f32, j as f32, k as f32) / steps as f32;
                    let point = center - half + t * half * 2.0;
                    let owner = g.coord_of(point).unwrap();
                    assert!(coords.contains(&owner), "{point} not covered");
                }
            }
        }
    }

    #[test]
    fn no_returned_chunk_lies_outside_region() {
        let g = grid(10.0);
        let center = Vec3::new(3.3, -17.1, 42.0);
        let half = Vec3::new(26.0, 8.2, 0.7);
        let (lo, hi) = (center - half, center + half);

        for coord in g.coordinates_overlapping(center, half).unwrap() {
            let (min, max) = coord.bounds(g.chunk_size());
            assert!(min.cmple(hi).all() && max.cmpge(lo).all(), "{coord} is outside");
        }
    }

    #[test]
    fn cells_at_the_edge_of_the_index_range() {
        let g = grid(1.0);
        // 2^31 - 128 is the largest f32 below 2^31
        assert_eq!(g.cell(2_147_483_520.0), Some(2_147_483_520));
        assert_eq!(g.cell(-2_147_483_648.0), Some(i32::MIN));
        assert_eq!(g.cell(2_147_483_648.0), None);
        assert_eq!(g.cell(3e9), None);
        assert_eq!(g.cell(-5e12), None);
    }

    #[test]
    fn cell_center_matches_quantize_near_the_edge() {
        let g = grid(1.0);
        let value = 2_147_483_520.0;
        let coord = g.coord_of(Vec3::new(value, 0.0, 0.0)).unwrap();
        assert_eq!(coord.center(g.chunk_size()).x, g.quantize(value));
    }

    #[test]
    fn distinct_far_values_never_share_a_cell() {
        let g = grid(1.0);
        assert!(g.span(Vec3::new(3e9, 0.0, 0.0), Vec3::ZERO).is_err());
        assert!(g.span(Vec3::new(5e12, 0.0, 0.0), Vec3::ZERO).is_err());
        assert_eq!(
            g.span(Vec3::ZERO, Vec3::new(3e9, 0.0, 0.0)),
            Err(RegionError::OutOfRange {
                center: Vec3::ZERO,
                half_extents: Vec3::new(3e9, 0.0, 0.0)
            })
        );
    }

    #[test]
    fn huge_span_len_does_not_overflow() {
        let g = grid(1.0);
        let span = g.span(Vec3::ZERO, Vec3::splat(1e9)).unwrap();
        assert_eq!(span.len(), None);
        assert!(!span.is_empty());
    }
}
