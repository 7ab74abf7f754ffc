/// 2-bit-per-voxel chunk cache
///
/// The planner's fast path: every loaded voxel collapses into one of four
/// navigation categories (`Air`, `Water`, `Avoid`, `Solid`) packed two bits
/// each into 1024-byte 16x16x16 sections. Columns are keyed by chunk XZ and
/// evicted oldest-first past a soft cap. The event bridge keeps the cache
/// consistent within one tick of the live world.
///
/// Unloaded chunks read as `None`. Passability helpers treat unknown as
/// passable; walk-on helpers treat unknown as NOT standable - callers that
/// need the distinction use `voxel_at` directly.
use bevy::log::debug;
use bevy::prelude::Resource;
use std::collections::HashMap;

use crate::blocks::{BlockKindId, BlockPropertyTable, NavClass};
use crate::types::{BlockPos, ChunkPos, SECTION_SIZE};
use crate::world::adapter::{Block, GameAdapter};

/// Category for a live block observation. Openable blocks (doors, trapdoors,
/// fence gates) classify by their current open state - the `Maybe`
/// passability recheck happens here, at classification time.
pub fn classify_block(block: &Block, table: &BlockPropertyTable) -> NavClass {
    let props = table.props(block.kind);
    if props.openable() {
        if block.open {
            NavClass::Air
        } else {
            NavClass::Solid
        }
    } else {
        props.nav_class()
    }
}

/// Default soft cap on resident columns
pub const DEFAULT_COLUMN_CAP: usize = 1024;

#[inline]
fn encode(class: NavClass) -> u8 {
    match class {
        NavClass::Air => 0b00,
        NavClass::Water => 0b01,
        NavClass::Avoid => 0b10,
        NavClass::Solid => 0b11,
    }
}

#[inline]
fn decode(bits: u8) -> NavClass {
    match bits & 0b11 {
        0b00 => NavClass::Air,
        0b01 => NavClass::Water,
        0b10 => NavClass::Avoid,
        _ => NavClass::Solid,
    }
}

/// One 16x16x16 section, 2 bits per voxel (1024 bytes)
#[derive(Clone)]
pub struct CachedSection {
    data: [u8; 1024],
}

impl CachedSection {
    /// All-air section
    pub fn empty() -> Self {
        Self { data: [0u8; 1024] }
    }

    pub fn from_bytes(data: [u8; 1024]) -> Self {
        Self { data }
    }

    pub fn bytes(&self) -> &[u8; 1024] {
        &self.data
    }

    /// Voxel index is y*256 + z*16 + x within the section
    #[inline]
    pub fn get(&self, index: usize) -> NavClass {
        let byte = self.data[index >> 2];
        decode(byte >> ((index & 3) * 2))
    }

    #[inline]
    pub fn set(&mut self, index: usize, class: NavClass) {
        let shift = (index & 3) * 2;
        let slot = &mut self.data[index >> 2];
        *slot = (*slot & !(0b11 << shift)) | (encode(class) << shift);
    }

    /// True when every voxel is air (skipped at save time)
    pub fn is_all_air(&self) -> bool {
        self.data.iter().all(|b| *b == 0)
    }
}

struct CachedColumn {
    sections: HashMap<i32, CachedSection>,
    last_touched: u64,
}

/// Column map keyed by chunk XZ with LRU eviction past a soft cap
#[derive(Resource)]
pub struct ChunkCache {
    columns: HashMap<(i32, i32), CachedColumn>,
    soft_cap: usize,
    /// Inclusive world floor and exclusive ceiling in block Y
    floor_y: i32,
    ceiling_y: i32,
    touch_counter: u64,
    /// Metrics
    pub hits: u64,
    pub misses: u64,
}

impl ChunkCache {
    pub fn new(floor_y: i32, ceiling_y: i32) -> Self {
        Self::with_cap(floor_y, ceiling_y, DEFAULT_COLUMN_CAP)
    }

    pub fn with_cap(floor_y: i32, ceiling_y: i32, soft_cap: usize) -> Self {
        Self {
            columns: HashMap::new(),
            soft_cap,
            floor_y,
            ceiling_y,
            touch_counter: 0,
            hits: 0,
            misses: 0,
        }
    }

    pub fn floor_y(&self) -> i32 {
        self.floor_y
    }

    pub fn ceiling_y(&self) -> i32 {
        self.ceiling_y
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_column_cached(&self, chunk: ChunkPos) -> bool {
        self.columns.contains_key(&(chunk.x, chunk.z))
    }

    /// Cached category at a position, or `None` when the column is unknown
    pub fn voxel_at(&mut self, pos: BlockPos) -> Option<NavClass> {
        if pos.y < self.floor_y || pos.y >= self.ceiling_y {
            // Outside the world's vertical range nothing is ever solid
            return Some(NavClass::Air);
        }
        let chunk = pos.chunk();
        self.touch_counter += 1;
        let touch = self.touch_counter;
        match self.columns.get_mut(&(chunk.x, chunk.z)) {
            Some(column) => {
                column.last_touched = touch;
                self.hits += 1;
                let section_y = pos.y.div_euclid(SECTION_SIZE);
                Some(
                    column
                        .sections
                        .get(&section_y)
                        .map(|s| s.get(pos.section_index()))
                        .unwrap_or(NavClass::Air),
                )
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Passability fast path: unknown chunks count as passable
    pub fn is_passable(&mut self, pos: BlockPos) -> bool {
        matches!(
            self.voxel_at(pos),
            Some(NavClass::Air) | Some(NavClass::Water) | None
        )
    }

    /// Walk-on fast path: unknown chunks are never standable
    pub fn is_walk_on(&mut self, pos: BlockPos) -> bool {
        matches!(self.voxel_at(pos), Some(NavClass::Solid))
    }

    /// Classify and cache every voxel of a freshly loaded chunk column
    pub fn load_column(
        &mut self,
        chunk: ChunkPos,
        adapter: &dyn GameAdapter,
        table: &BlockPropertyTable,
    ) {
        let mut sections: HashMap<i32, CachedSection> = HashMap::new();
        let base_x = chunk.x * SECTION_SIZE;
        let base_z = chunk.z * SECTION_SIZE;

        for y in self.floor_y..self.ceiling_y {
            let section_y = y.div_euclid(SECTION_SIZE);
            for lz in 0..SECTION_SIZE {
                for lx in 0..SECTION_SIZE {
                    let pos = BlockPos::new(base_x + lx, y, base_z + lz);
                    let class = match adapter.block_at(pos) {
                        Some(block) => classify_block(&block, table),
                        None => NavClass::Air,
                    };
                    if class != NavClass::Air {
                        sections
                            .entry(section_y)
                            .or_insert_with(CachedSection::empty)
                            .set(pos.section_index(), class);
                    }
                }
            }
        }

        self.touch_counter += 1;
        self.columns.insert(
            (chunk.x, chunk.z),
            CachedColumn {
                sections,
                last_touched: self.touch_counter,
            },
        );
        self.evict_over_cap();
        debug!(
            "🗺️ Cached chunk column ({}, {}) - {} resident",
            chunk.x,
            chunk.z,
            self.columns.len()
        );
    }

    /// Reclassify a single voxel after a block update. `open` is the live
    /// openable state for `Maybe`-passability kinds; ignored otherwise.
    pub fn on_block_update(
        &mut self,
        pos: BlockPos,
        kind: BlockKindId,
        open: bool,
        table: &BlockPropertyTable,
    ) {
        if pos.y < self.floor_y || pos.y >= self.ceiling_y {
            return;
        }
        let chunk = pos.chunk();
        self.touch_counter += 1;
        let touch = self.touch_counter;
        if let Some(column) = self.columns.get_mut(&(chunk.x, chunk.z)) {
            column.last_touched = touch;
            let section_y = pos.y.div_euclid(SECTION_SIZE);
            let class = classify_block(
                &Block {
                    pos,
                    kind,
                    open,
                    growth: 0,
                },
                table,
            );
            match column.sections.get_mut(&section_y) {
                Some(section) => section.set(pos.section_index(), class),
                None => {
                    if class != NavClass::Air {
                        let mut section = CachedSection::empty();
                        section.set(pos.section_index(), class);
                        column.sections.insert(section_y, section);
                    }
                }
            }
        }
        // Updates for uncached columns are dropped; the column classifies
        // fully on its next load event.
    }

    /// Drop a column when its chunk unloads
    pub fn unload_column(&mut self, chunk: ChunkPos) {
        self.columns.remove(&(chunk.x, chunk.z));
    }

    /// Remove everything (dimension change)
    pub fn clear(&mut self) {
        self.columns.clear();
    }

    fn evict_over_cap(&mut self) {
        while self.columns.len() > self.soft_cap {
            let oldest = self
                .columns
                .iter()
                .min_by_key(|(_, c)| c.last_touched)
                .map(|(k, _)| *k);
            match oldest {
                Some(key) => {
                    self.columns.remove(&key);
                    debug!("🧹 Evicted chunk column ({}, {}) over soft cap", key.0, key.1);
                }
                None => break,
            }
        }
    }

    // --- persistence access (crate-internal) ---

    pub(crate) fn iter_columns(
        &self,
    ) -> impl Iterator<Item = ((i32, i32), &HashMap<i32, CachedSection>)> {
        self.columns
            .iter()
            .map(|(key, column)| (*key, &column.sections))
    }

    pub(crate) fn insert_loaded_column(
        &mut self,
        chunk_x: i32,
        chunk_z: i32,
        sections: HashMap<i32, CachedSection>,
    ) {
        self.touch_counter += 1;
        self.columns.insert(
            (chunk_x, chunk_z),
            CachedColumn {
                sections,
                last_touched: self.touch_counter,
            },
        );
        self.evict_over_cap();
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{sandbox_table, BlockKindId};

    #[test]
    fn test_section_packing_round_trip() {
        let mut section = CachedSection::empty();
        let classes = [NavClass::Air, NavClass::Water, NavClass::Avoid, NavClass::Solid];
        for index in 0..4096 {
            section.set(index, classes[index % 4]);
        }
        for index in 0..4096 {
            assert_eq!(section.get(index), classes[index % 4]);
        }
    }

    #[test]
    fn test_set_does_not_disturb_neighbors() {
        let mut section = CachedSection::empty();
        section.set(5, NavClass::Solid);
        section.set(6, NavClass::Water);
        assert_eq!(section.get(4), NavClass::Air);
        assert_eq!(section.get(5), NavClass::Solid);
        assert_eq!(section.get(6), NavClass::Water);
        assert_eq!(section.get(7), NavClass::Air);
    }

    #[test]
    fn test_unknown_column_reads_none() {
        let mut cache = ChunkCache::new(-64, 320);
        assert_eq!(cache.voxel_at(BlockPos::new(5, 64, 5)), None);
        assert!(cache.is_passable(BlockPos::new(5, 64, 5)));
        assert!(!cache.is_walk_on(BlockPos::new(5, 64, 5)));
    }

    #[test]
    fn test_block_update_reflects_last_write() {
        let table = sandbox_table();
        let stone = table.id_by_name("stone").unwrap();
        let air = BlockKindId(0);
        let mut cache = ChunkCache::new(-64, 320);
        cache.insert_loaded_column(0, 0, HashMap::new());

        let pos = BlockPos::new(3, 64, 3);
        cache.on_block_update(pos, stone, false, &table);
        assert_eq!(cache.voxel_at(pos), Some(NavClass::Solid));

        cache.on_block_update(pos, air, false, &table);
        assert_eq!(cache.voxel_at(pos), Some(NavClass::Air));

        // Linearizable per voxel: last update wins
        for _ in 0..8 {
            cache.on_block_update(pos, stone, false, &table);
            cache.on_block_update(pos, air, false, &table);
        }
        cache.on_block_update(pos, stone, false, &table);
        assert_eq!(cache.voxel_at(pos), Some(NavClass::Solid));
    }

    #[test]
    fn test_eviction_is_oldest_first() {
        let mut cache = ChunkCache::with_cap(-64, 320, 2);
        cache.insert_loaded_column(0, 0, HashMap::new());
        cache.insert_loaded_column(1, 0, HashMap::new());

        // Touch (0,0) so (1,0) becomes the eviction candidate
        let _ = cache.voxel_at(BlockPos::new(1, 64, 1));

        cache.insert_loaded_column(2, 0, HashMap::new());
        assert!(cache.is_column_cached(ChunkPos::new(0, 0)));
        assert!(!cache.is_column_cached(ChunkPos::new(1, 0)));
        assert!(cache.is_column_cached(ChunkPos::new(2, 0)));
    }

    #[test]
    fn test_out_of_range_y_is_air() {
        let mut cache = ChunkCache::new(-64, 320);
        assert_eq!(cache.voxel_at(BlockPos::new(0, 400, 0)), Some(NavClass::Air));
        assert_eq!(cache.voxel_at(BlockPos::new(0, -100, 0)), Some(NavClass::Air));
    }
}
