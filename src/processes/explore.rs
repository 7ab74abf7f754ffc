/// Explore process: visit unvisited chunks
///
/// Three targeting modes: an outward spiral from the starting chunk, a
/// seeded random walk, and a fixed compass direction. Visited chunks are
/// memoized so the process never re-targets ground it has covered, and
/// the planner's visited-chunk set is folded in as free knowledge.
use bevy::log::debug;
use rand::Rng;
use rand_pcg::Pcg64;
use std::collections::HashSet;

use super::{Priority, Process, ProcessCtx, ProcessTick};
use crate::pathfinding::goals::Goal;
use crate::types::ChunkPos;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExploreMode {
    /// Outward ring-by-ring spiral from the activation chunk
    Spiral,
    /// Seeded random chunk offsets
    Random,
    /// Keep heading one compass direction
    Directional { dx: i32, dz: i32 },
}

#[derive(Debug, Clone)]
pub struct ExploreConfig {
    pub mode: ExploreMode,
    /// RNG seed for the random mode (deterministic runs)
    pub seed: u64,
    /// Random mode hop radius in chunks
    pub hop_radius: i32,
    /// Stop after visiting this many chunks; zero explores forever
    pub max_chunks: usize,
}

impl Default for ExploreConfig {
    fn default() -> Self {
        Self {
            mode: ExploreMode::Spiral,
            seed: 0x5eed,
            hop_radius: 8,
            max_chunks: 0,
        }
    }
}

pub struct ExploreProcess {
    config: ExploreConfig,
    visited: HashSet<ChunkPos>,
    target: Option<ChunkPos>,
    origin: Option<ChunkPos>,
    rng: Pcg64,
    visited_count: usize,
}

impl ExploreProcess {
    pub fn new(config: ExploreConfig) -> Self {
        let rng = Pcg64::new(config.seed as u128, 0xa02bdbf7bb3c0a7);
        Self {
            config,
            visited: HashSet::new(),
            target: None,
            origin: None,
            rng,
            visited_count: 0,
        }
    }

    /// Spiral enumeration: rings of increasing Chebyshev radius around the
    /// origin, skipping anything already visited
    fn next_spiral(&self, origin: ChunkPos) -> Option<ChunkPos> {
        for radius in 1i32..64 {
            for dz in -radius..=radius {
                for dx in -radius..=radius {
                    if dx.abs().max(dz.abs()) != radius {
                        continue; // interior of the ring
                    }
                    let chunk = ChunkPos::new(origin.x + dx, origin.z + dz);
                    if !self.visited.contains(&chunk) {
                        return Some(chunk);
                    }
                }
            }
        }
        None
    }

    fn next_random(&mut self, current: ChunkPos) -> ChunkPos {
        loop {
            let dx = self.rng.gen_range(-self.config.hop_radius..=self.config.hop_radius);
            let dz = self.rng.gen_range(-self.config.hop_radius..=self.config.hop_radius);
            if dx == 0 && dz == 0 {
                continue;
            }
            let chunk = ChunkPos::new(current.x + dx, current.z + dz);
            if !self.visited.contains(&chunk) {
                return chunk;
            }
        }
    }

    fn next_directional(&self, current: ChunkPos, dx: i32, dz: i32) -> ChunkPos {
        let mut chunk = ChunkPos::new(current.x + dx, current.z + dz);
        while self.visited.contains(&chunk) {
            chunk = ChunkPos::new(chunk.x + dx, chunk.z + dz);
        }
        chunk
    }
}

impl Process for ExploreProcess {
    fn name(&self) -> &'static str {
        "explore"
    }

    fn priority(&self) -> Priority {
        Priority::Low
    }

    fn on_activate(&mut self) {
        self.target = None;
        self.origin = None;
    }

    fn tick(&mut self, ctx: &mut ProcessCtx) -> ProcessTick {
        let current = ctx.self_pos().chunk();
        let origin = *self.origin.get_or_insert(current);
        self.visited.insert(current);

        // A reached or abandoned target forces a fresh pick
        let arrived = self.target == Some(current);
        if arrived || ctx.path_unreachable {
            if let Some(done) = self.target.take() {
                self.visited.insert(done);
                if arrived {
                    self.visited_count += 1;
                    debug!("🗺️ Explored chunk ({}, {})", done.x, done.z);
                }
            }
        }

        if self.config.max_chunks > 0 && self.visited_count >= self.config.max_chunks {
            return ProcessTick::Complete(format!("explored {} chunks", self.visited_count));
        }

        match self.target {
            Some(_) => ProcessTick::ContinuePathing,
            None => {
                let next = match self.config.mode {
                    ExploreMode::Spiral => self.next_spiral(origin),
                    ExploreMode::Random => Some(self.next_random(current)),
                    ExploreMode::Directional { dx, dz } => {
                        if dx == 0 && dz == 0 {
                            return ProcessTick::Fail("zero explore direction".to_string());
                        }
                        Some(self.next_directional(current, dx, dz))
                    }
                };
                match next {
                    Some(chunk) => {
                        debug!("🗺️ Exploring toward chunk ({}, {})", chunk.x, chunk.z);
                        self.target = Some(chunk);
                        ProcessTick::NewGoal(Goal::Chunk { chunk })
                    }
                    None => ProcessTick::Complete("nothing left to explore".to_string()),
                }
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::BehaviorStack;
    use crate::events::TrackerManager;
    use crate::world::chunk_cache::ChunkCache;
    use crate::world::sandbox::SandboxWorld;

    fn run_tick(
        process: &mut ExploreProcess,
        world: &mut SandboxWorld,
        unreachable: bool,
    ) -> ProcessTick {
        let trackers = TrackerManager::default();
        let stack = BehaviorStack::new();
        let table = world.table().clone();
        let mut cache = ChunkCache::new(-64, 320);
        let mut ctx = ProcessCtx {
            adapter: world,
            trackers: &trackers,
            stack: &stack,
            table: &table,
            cache: &mut cache,
            tick: 0,
            path_unreachable: unreachable,
            executing_path: false,
        };
        process.tick(&mut ctx)
    }

    #[test]
    fn test_spiral_targets_ring_one_first() {
        let mut world = SandboxWorld::flat(64, 63);
        let mut process = ExploreProcess::new(ExploreConfig::default());
        process.on_activate();

        let verdict = run_tick(&mut process, &mut world, false);
        let ProcessTick::NewGoal(Goal::Chunk { chunk }) = verdict else {
            panic!("expected a chunk goal, got {:?}", verdict);
        };
        assert_eq!(chunk.distance_to(&ChunkPos::new(0, 0)), 1);
    }

    #[test]
    fn test_unreachable_target_is_skipped() {
        let mut world = SandboxWorld::flat(64, 63);
        let mut process = ExploreProcess::new(ExploreConfig::default());
        process.on_activate();

        let first = match run_tick(&mut process, &mut world, false) {
            ProcessTick::NewGoal(Goal::Chunk { chunk }) => chunk,
            other => panic!("unexpected {:?}", other),
        };
        let second = match run_tick(&mut process, &mut world, true) {
            ProcessTick::NewGoal(Goal::Chunk { chunk }) => chunk,
            other => panic!("unexpected {:?}", other),
        };
        assert_ne!(first, second);
    }

    #[test]
    fn test_random_mode_is_deterministic_per_seed() {
        let mut world = SandboxWorld::flat(64, 63);
        let config = ExploreConfig {
            mode: ExploreMode::Random,
            seed: 1234,
            ..Default::default()
        };
        let mut a = ExploreProcess::new(config.clone());
        let mut b = ExploreProcess::new(config);
        a.on_activate();
        b.on_activate();
        assert_eq!(
            run_tick(&mut a, &mut world, false),
            run_tick(&mut b, &mut world, false)
        );
    }

    #[test]
    fn test_directional_mode_marches_on() {
        let mut world = SandboxWorld::flat(64, 63);
        let mut process = ExploreProcess::new(ExploreConfig {
            mode: ExploreMode::Directional { dx: 1, dz: 0 },
            ..Default::default()
        });
        process.on_activate();

        let verdict = run_tick(&mut process, &mut world, false);
        assert_eq!(
            verdict,
            ProcessTick::NewGoal(Goal::Chunk {
                chunk: ChunkPos::new(1, 0)
            })
        );
    }
}
