/// Integer voxel positions and chunk/section coordinate math
///
/// Positions are plain values, copied freely and never owned by any system.
/// The identity hash is the hot key for the planner's node map, so it has to
/// be cheap and collision-free over realistic world coordinates.
use bevy::math::{IVec2, IVec3, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Edge length of a cubic chunk section (16x16x16 voxels)
pub const SECTION_SIZE: i32 = 16;

/// The four cardinal XZ step directions (east, west, south, north)
pub const CARDINALS_XZ: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// The four diagonal XZ step directions
pub const DIAGONALS_XZ: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// A voxel-centered integer block position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const ZERO: Self = Self { x: 0, y: 0, z: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Identity hash: Horner-chained large odd primes over x, y, z.
    /// Collision-free in practice for world coordinates within 26 bits.
    #[inline]
    pub fn long_hash(&self) -> i64 {
        let mut hash: i64 = 3241;
        hash = hash.wrapping_mul(3_457_689).wrapping_add(self.x as i64);
        hash = hash.wrapping_mul(8_734_625).wrapping_add(self.y as i64);
        hash = hash.wrapping_mul(2_873_465).wrapping_add(self.z as i64);
        hash
    }

    /// Floor a continuous position onto its containing voxel
    #[inline]
    pub fn from_vec3(v: Vec3) -> Self {
        Self {
            x: v.x.floor() as i32,
            y: v.y.floor() as i32,
            z: v.z.floor() as i32,
        }
    }

    /// Center of this voxel in continuous space
    #[inline]
    pub fn center(&self) -> Vec3 {
        Vec3::new(
            self.x as f32 + 0.5,
            self.y as f32 + 0.5,
            self.z as f32 + 0.5,
        )
    }

    /// Bottom-center of this voxel (where a standing agent's feet rest)
    #[inline]
    pub fn bottom_center(&self) -> Vec3 {
        Vec3::new(self.x as f32 + 0.5, self.y as f32, self.z as f32 + 0.5)
    }

    #[inline]
    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    #[inline]
    pub fn up(&self) -> Self {
        self.offset(0, 1, 0)
    }

    #[inline]
    pub fn down(&self) -> Self {
        self.offset(0, -1, 0)
    }

    /// The chunk column containing this position
    #[inline]
    pub fn chunk(&self) -> ChunkPos {
        ChunkPos::from_block(self.x, self.z)
    }

    /// The 16x16x16 section containing this position
    #[inline]
    pub fn section(&self) -> SectionPos {
        SectionPos {
            x: self.x.div_euclid(SECTION_SIZE),
            y: self.y.div_euclid(SECTION_SIZE),
            z: self.z.div_euclid(SECTION_SIZE),
        }
    }

    /// Index of this voxel inside its section payload: y*256 + z*16 + x
    #[inline]
    pub fn section_index(&self) -> usize {
        let lx = self.x.rem_euclid(SECTION_SIZE) as usize;
        let ly = self.y.rem_euclid(SECTION_SIZE) as usize;
        let lz = self.z.rem_euclid(SECTION_SIZE) as usize;
        ly * 256 + lz * 16 + lx
    }

    /// Straight-line distance between voxel centers
    #[inline]
    pub fn dist_to(&self, other: BlockPos) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        let dz = (self.z - other.z) as f64;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Horizontal (XZ-plane) distance between voxel centers
    #[inline]
    pub fn dist_xz_to(&self, other: BlockPos) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dz = (self.z - other.z) as f64;
        (dx * dx + dz * dz).sqrt()
    }

    /// Horizontal distance to an arbitrary XZ point
    #[inline]
    pub fn dist_xz_to_point(&self, x: f64, z: f64) -> f64 {
        let dx = self.x as f64 + 0.5 - x;
        let dz = self.z as f64 + 0.5 - z;
        (dx * dx + dz * dz).sqrt()
    }

    /// Per-axis sign of the step from `self` to `other`
    #[inline]
    pub fn direction_to(&self, other: BlockPos) -> IVec3 {
        IVec3::new(
            (other.x - self.x).signum(),
            (other.y - self.y).signum(),
            (other.z - self.z).signum(),
        )
    }
}

impl From<IVec3> for BlockPos {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<BlockPos> for IVec3 {
    fn from(p: BlockPos) -> Self {
        IVec3::new(p.x, p.y, p.z)
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A chunk column coordinate (XZ only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    #[inline]
    pub fn from_block(block_x: i32, block_z: i32) -> Self {
        Self {
            x: block_x.div_euclid(SECTION_SIZE),
            z: block_z.div_euclid(SECTION_SIZE),
        }
    }

    /// The 32x32-chunk region containing this column
    #[inline]
    pub fn region(&self) -> (i32, i32) {
        (self.x.div_euclid(32), self.z.div_euclid(32))
    }

    /// Chebyshev distance in chunks
    pub fn distance_to(&self, other: &ChunkPos) -> i32 {
        let dx = (self.x - other.x).abs();
        let dz = (self.z - other.z).abs();
        dx.max(dz)
    }

    /// Block position of this chunk's lowest-coordinate corner at a given y
    pub fn base_block(&self, y: i32) -> BlockPos {
        BlockPos::new(self.x * SECTION_SIZE, y, self.z * SECTION_SIZE)
    }

    pub fn as_ivec2(&self) -> IVec2 {
        IVec2::new(self.x, self.z)
    }
}

/// A cubic 16x16x16 section coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_long_hash_deterministic() {
        let a = BlockPos::new(12, 64, -7);
        let b = BlockPos::new(12, 64, -7);
        assert_eq!(a.long_hash(), b.long_hash());
    }

    #[test]
    fn test_long_hash_no_collisions_in_dense_cube() {
        let mut seen = HashSet::new();
        for x in -20..20 {
            for y in 0..40 {
                for z in -20..20 {
                    assert!(
                        seen.insert(BlockPos::new(x, y, z).long_hash()),
                        "hash collision at ({}, {}, {})",
                        x,
                        y,
                        z
                    );
                }
            }
        }
    }

    #[test]
    fn test_long_hash_no_collisions_at_world_scale() {
        // Sparse sample across the 26-bit coordinate range
        let mut seen = HashSet::new();
        for x in (-30_000_000..30_000_000).step_by(1_234_567) {
            for z in (-30_000_000..30_000_000).step_by(2_345_678) {
                for y in [-64, 0, 63, 255, 319] {
                    assert!(seen.insert(BlockPos::new(x, y, z).long_hash()));
                }
            }
        }
    }

    #[test]
    fn test_vec3_round_trip_on_integer_vectors() {
        let pos = BlockPos::new(-3, 64, 17);
        let v = Vec3::new(pos.x as f32, pos.y as f32, pos.z as f32);
        assert_eq!(BlockPos::from_vec3(v), pos);

        // Fractional positions floor onto the containing voxel
        assert_eq!(
            BlockPos::from_vec3(Vec3::new(-0.5, 64.9, 17.2)),
            BlockPos::new(-1, 64, 17)
        );
    }

    #[test]
    fn test_chunk_and_section_coords() {
        let pos = BlockPos::new(-1, 70, 33);
        assert_eq!(pos.chunk(), ChunkPos::new(-1, 2));
        assert_eq!(pos.section(), SectionPos { x: -1, y: 4, z: 2 });

        // index = y*256 + z*16 + x over euclidean local coords
        let local = BlockPos::new(15, 6, 1);
        assert_eq!(local.section_index(), 6 * 256 + 1 * 16 + 15);
        assert_eq!(BlockPos::new(-1, 0, 0).section_index(), 15);
    }

    #[test]
    fn test_region_coords() {
        assert_eq!(ChunkPos::new(0, 0).region(), (0, 0));
        assert_eq!(ChunkPos::new(31, 31).region(), (0, 0));
        assert_eq!(ChunkPos::new(32, -1).region(), (1, -1));
        assert_eq!(ChunkPos::new(-33, 5).region(), (-2, 0));
    }

    #[test]
    fn test_direction_to() {
        let a = BlockPos::new(0, 64, 0);
        assert_eq!(a.direction_to(BlockPos::new(3, 64, 0)), IVec3::new(1, 0, 0));
        assert_eq!(
            a.direction_to(BlockPos::new(-2, 63, 5)),
            IVec3::new(-1, -1, 1)
        );
    }
}
