/// Mine process: find matching blocks, path to them, dig them out
///
/// State machine: Searching → Targeting → Mining. The scan sweeps a cube
/// around the agent on a cooldown; unreachable targets are blacklisted for
/// the rest of the run.
use bevy::log::{debug, info};
use std::collections::HashSet;

use super::{Priority, Process, ProcessCtx, ProcessTick};
use crate::blocks::BlockKindId;
use crate::pathfinding::goals::Goal;
use crate::types::BlockPos;
use crate::util::TimerGame;

#[derive(Debug, Clone)]
pub struct MineConfig {
    /// Block kind names to mine
    pub targets: Vec<String>,
    /// Scan half-extent in blocks
    pub radius: i32,
    pub y_min: i32,
    pub y_max: i32,
    /// Stop after this many blocks
    pub max_blocks: usize,
    /// Ticks between scans (2 s at 20 TPS)
    pub scan_interval_ticks: u64,
}

impl Default for MineConfig {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            radius: 24,
            y_min: -64,
            y_max: 320,
            max_blocks: 64,
            scan_interval_ticks: 40,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum MineState {
    Searching,
    Targeting(BlockPos),
    Mining(BlockPos),
}

pub struct MineProcess {
    config: MineConfig,
    state: MineState,
    scan_timer: Option<TimerGame>,
    blacklist: HashSet<BlockPos>,
    mined: usize,
}

impl MineProcess {
    pub fn new(config: MineConfig) -> Self {
        Self {
            config,
            state: MineState::Searching,
            scan_timer: None,
            blacklist: HashSet::new(),
            mined: 0,
        }
    }

    fn target_ids(&self, ctx: &ProcessCtx) -> Vec<BlockKindId> {
        self.config
            .targets
            .iter()
            .filter_map(|name| ctx.table.id_by_name(name))
            .collect()
    }

    fn is_wanted(&self, ctx: &ProcessCtx, pos: BlockPos, ids: &[BlockKindId]) -> bool {
        ctx.adapter
            .block_at(pos)
            .map(|b| ids.contains(&b.kind))
            .unwrap_or(false)
    }

    /// Nearest matching, non-blacklisted block within the scan volume
    fn scan(&self, ctx: &ProcessCtx, ids: &[BlockKindId]) -> Option<BlockPos> {
        let center = ctx.self_pos();
        let y_lo = (center.y - self.config.radius).max(self.config.y_min);
        let y_hi = (center.y + self.config.radius).min(self.config.y_max);

        let mut best: Option<(f64, BlockPos)> = None;
        for y in y_lo..=y_hi {
            for dz in -self.config.radius..=self.config.radius {
                for dx in -self.config.radius..=self.config.radius {
                    let pos = BlockPos::new(center.x + dx, y, center.z + dz);
                    if self.blacklist.contains(&pos) {
                        continue;
                    }
                    if !self.is_wanted(ctx, pos, ids) {
                        continue;
                    }
                    let dist = center.dist_to(pos);
                    if best.map(|(d, _)| dist < d).unwrap_or(true) {
                        best = Some((dist, pos));
                    }
                }
            }
        }
        best.map(|(_, pos)| pos)
    }
}

impl Process for MineProcess {
    fn name(&self) -> &'static str {
        "mine"
    }

    fn priority(&self) -> Priority {
        Priority::Normal
    }

    fn on_activate(&mut self) {
        self.state = MineState::Searching;
        self.scan_timer = None;
        self.blacklist.clear();
        self.mined = 0;
    }

    fn on_deactivate(&mut self) {
        self.state = MineState::Searching;
    }

    fn tick(&mut self, ctx: &mut ProcessCtx) -> ProcessTick {
        let ids = self.target_ids(ctx);
        if ids.is_empty() {
            return ProcessTick::Fail("no minable block kinds configured".to_string());
        }

        match self.state {
            MineState::Searching => {
                if let Some(timer) = self.scan_timer {
                    if !timer.has_elapsed(ctx.tick, self.config.scan_interval_ticks) {
                        return ProcessTick::Wait("scan cooldown".to_string());
                    }
                }
                self.scan_timer = Some(TimerGame::new(ctx.tick));

                match self.scan(ctx, &ids) {
                    Some(pos) => {
                        debug!("⛏️ Mine target acquired at {}", pos);
                        self.state = MineState::Targeting(pos);
                        ProcessTick::NewGoal(Goal::GetToBlock { pos })
                    }
                    None => ProcessTick::Wait("no matching blocks in range".to_string()),
                }
            }

            MineState::Targeting(pos) => {
                if !self.is_wanted(ctx, pos, &ids) {
                    // Someone else took it
                    self.state = MineState::Searching;
                    return ProcessTick::Wait("target vanished".to_string());
                }
                if ctx.path_unreachable {
                    debug!("⛏️ Target {} unreachable - blacklisting", pos);
                    self.blacklist.insert(pos);
                    self.state = MineState::Searching;
                    return ProcessTick::Wait("target unreachable".to_string());
                }
                if (Goal::GetToBlock { pos }).is_end(ctx.self_pos()) {
                    if let Err(e) = ctx.adapter.dig(pos, true) {
                        self.blacklist.insert(pos);
                        self.state = MineState::Searching;
                        return ProcessTick::Wait(format!("dig rejected: {}", e));
                    }
                    self.state = MineState::Mining(pos);
                    return ProcessTick::Wait("digging".to_string());
                }
                ProcessTick::ContinuePathing
            }

            MineState::Mining(pos) => {
                if self.is_wanted(ctx, pos, &ids) {
                    if !ctx.adapter.is_digging() {
                        // The dig was interrupted; re-issue
                        if ctx.adapter.dig(pos, true).is_err() {
                            self.blacklist.insert(pos);
                            self.state = MineState::Searching;
                        }
                    }
                    return ProcessTick::Wait("digging".to_string());
                }
                self.mined += 1;
                info!("⛏️ Mined block {}/{}", self.mined, self.config.max_blocks);
                if self.mined >= self.config.max_blocks {
                    return ProcessTick::Complete(format!("mined {} blocks", self.mined));
                }
                self.state = MineState::Searching;
                self.scan_timer = None;
                ProcessTick::Wait("looking for the next block".to_string())
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
        process: &mut MineProcess,
        world: &mut SandboxWorld,
        tick: u64,
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
            tick,
            path_unreachable: unreachable,
            executing_path: false,
        };
        process.tick(&mut ctx)
    }

    #[test]
    fn test_finds_nearest_ore_and_emits_goal() {
        let mut world = SandboxWorld::flat(32, 63);
        world.set_block_named(BlockPos::new(6, 63, 0), "coal_ore");
        world.set_block_named(BlockPos::new(15, 63, 0), "coal_ore");

        let mut process = MineProcess::new(MineConfig {
            targets: vec!["coal_ore".to_string()],
            radius: 20,
            ..Default::default()
        });
        process.on_activate();

        let verdict = run_tick(&mut process, &mut world, 0, false);
        assert_eq!(
            verdict,
            ProcessTick::NewGoal(Goal::GetToBlock {
                pos: BlockPos::new(6, 63, 0)
            })
        );
    }

    #[test]
    fn test_unreachable_target_is_blacklisted() {
        let mut world = SandboxWorld::flat(32, 63);
        world.set_block_named(BlockPos::new(6, 63, 0), "coal_ore");
        world.set_block_named(BlockPos::new(10, 63, 0), "coal_ore");

        let mut process = MineProcess::new(MineConfig {
            targets: vec!["coal_ore".to_string()],
            radius: 20,
            scan_interval_ticks: 0,
            ..Default::default()
        });
        process.on_activate();

        assert!(matches!(
            run_tick(&mut process, &mut world, 0, false),
            ProcessTick::NewGoal(_)
        ));
        // Planner reports the first target unreachable
        run_tick(&mut process, &mut world, 1, true);
        // Next scan must pick the other block
        let verdict = run_tick(&mut process, &mut world, 2, false);
        assert_eq!(
            verdict,
            ProcessTick::NewGoal(Goal::GetToBlock {
                pos: BlockPos::new(10, 63, 0)
            })
        );
    }

    #[test]
    fn test_digs_when_adjacent_and_counts_completion() {
        let mut world = SandboxWorld::flat(32, 63);
        let ore = BlockPos::new(1, 63, 0);
        world.set_block_named(ore, "coal_ore");

        let mut process = MineProcess::new(MineConfig {
            targets: vec!["coal_ore".to_string()],
            max_blocks: 1,
            scan_interval_ticks: 0,
            ..Default::default()
        });
        process.on_activate();

        // Agent at (0,64,0) is already adjacent to (1,63,0)
        assert!(matches!(
            run_tick(&mut process, &mut world, 0, false),
            ProcessTick::NewGoal(_)
        ));
        let verdict = run_tick(&mut process, &mut world, 1, false);
        assert_eq!(verdict, ProcessTick::Wait("digging".to_string()));
        assert!(world.is_digging());

        // Let the dig finish (coal ore, bare hands)
        for _ in 0..200 {
            world.step();
        }
        let verdict = run_tick(&mut process, &mut world, 2, false);
        assert_eq!(verdict, ProcessTick::Complete("mined 1 blocks".to_string()));
    }

    #[test]
    fn test_no_targets_configured_fails() {
        let mut world = SandboxWorld::flat(16, 63);
        let mut process = MineProcess::new(MineConfig::default());
        process.on_activate();
        assert!(matches!(
            run_tick(&mut process, &mut world, 0, false),
            ProcessTick::Fail(_)
        ));
    }
}
