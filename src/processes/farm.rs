/// Farm process: harvest mature crops and replant
///
/// State machine: Searching → Moving → Harvesting → Planting. A crop is
/// harvestable once its growth stage reaches the threshold; after the
/// harvest the same farmland gets a fresh seed when one is in the
/// inventory.
use bevy::log::debug;
use std::collections::HashSet;

use super::{Priority, Process, ProcessCtx, ProcessTick};
use crate::pathfinding::goals::Goal;
use crate::types::BlockPos;
use crate::util::TimerGame;

#[derive(Debug, Clone)]
pub struct FarmConfig {
    /// Crop block kind
    pub crop: String,
    /// Inventory item planted after a harvest
    pub seed_item: String,
    /// Harvest at or above this growth stage
    pub growth_threshold: u8,
    /// Scan half-extent in blocks
    pub radius: i32,
    pub scan_interval_ticks: u64,
    /// Stop after this many harvests; zero farms forever
    pub max_harvests: usize,
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            crop: "wheat".to_string(),
            seed_item: "wheat".to_string(),
            growth_threshold: 7,
            radius: 16,
            scan_interval_ticks: 40,
            max_harvests: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum FarmState {
    Searching,
    Moving(BlockPos),
    Harvesting(BlockPos),
    Planting(BlockPos),
}

pub struct FarmProcess {
    config: FarmConfig,
    state: FarmState,
    scan_timer: Option<TimerGame>,
    blacklist: HashSet<BlockPos>,
    harvested: usize,
}

impl FarmProcess {
    pub fn new(config: FarmConfig) -> Self {
        Self {
            config,
            state: FarmState::Searching,
            scan_timer: None,
            blacklist: HashSet::new(),
            harvested: 0,
        }
    }

    fn is_mature_crop(&self, ctx: &ProcessCtx, pos: BlockPos) -> bool {
        let Some(crop_kind) = ctx.table.id_by_name(&self.config.crop) else {
            return false;
        };
        ctx.adapter
            .block_at(pos)
            .map(|b| b.kind == crop_kind && b.growth >= self.config.growth_threshold)
            .unwrap_or(false)
    }

    fn scan(&self, ctx: &ProcessCtx) -> Option<BlockPos> {
        let center = ctx.self_pos();
        let mut best: Option<(f64, BlockPos)> = None;
        for dy in -4..=4 {
            for dz in -self.config.radius..=self.config.radius {
                for dx in -self.config.radius..=self.config.radius {
                    let pos = center.offset(dx, dy, dz);
                    if self.blacklist.contains(&pos) || !self.is_mature_crop(ctx, pos) {
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

    fn seed_slot(&self, ctx: &ProcessCtx) -> Option<usize> {
        ctx.adapter
            .inventory_items()
            .iter()
            .position(|item| item.name == self.config.seed_item && item.count > 0)
    }
}

impl Process for FarmProcess {
    fn name(&self) -> &'static str {
        "farm"
    }

    fn priority(&self) -> Priority {
        Priority::Normal
    }

    fn on_activate(&mut self) {
        self.state = FarmState::Searching;
        self.scan_timer = None;
        self.blacklist.clear();
        self.harvested = 0;
    }

    fn tick(&mut self, ctx: &mut ProcessCtx) -> ProcessTick {
        match self.state {
            FarmState::Searching => {
                if let Some(timer) = self.scan_timer {
                    if !timer.has_elapsed(ctx.tick, self.config.scan_interval_ticks) {
                        return ProcessTick::Wait("scan cooldown".to_string());
                    }
                }
                self.scan_timer = Some(TimerGame::new(ctx.tick));
                match self.scan(ctx) {
                    Some(pos) => {
                        debug!("🌾 Mature crop at {}", pos);
                        self.state = FarmState::Moving(pos);
                        ProcessTick::NewGoal(Goal::GetToBlock { pos })
                    }
                    None => ProcessTick::Wait("no mature crops".to_string()),
                }
            }

            FarmState::Moving(pos) => {
                if !self.is_mature_crop(ctx, pos) {
                    self.state = FarmState::Searching;
                    return ProcessTick::Wait("crop vanished".to_string());
                }
                if ctx.path_unreachable {
                    self.blacklist.insert(pos);
                    self.state = FarmState::Searching;
                    return ProcessTick::Wait("crop unreachable".to_string());
                }
                if (Goal::GetToBlock { pos }).is_end(ctx.self_pos()) {
                    if let Err(e) = ctx.adapter.dig(pos, true) {
                        self.blacklist.insert(pos);
                        self.state = FarmState::Searching;
                        return ProcessTick::Wait(format!("harvest rejected: {}", e));
                    }
                    self.state = FarmState::Harvesting(pos);
                    return ProcessTick::Wait("harvesting".to_string());
                }
                ProcessTick::ContinuePathing
            }

            FarmState::Harvesting(pos) => {
                let Some(crop_kind) = ctx.table.id_by_name(&self.config.crop) else {
                    return ProcessTick::Fail(format!("unknown crop '{}'", self.config.crop));
                };
                let still_there = ctx
                    .adapter
                    .block_at(pos)
                    .map(|b| b.kind == crop_kind)
                    .unwrap_or(false);
                if still_there {
                    return ProcessTick::Wait("harvesting".to_string());
                }
                self.harvested += 1;
                self.state = FarmState::Planting(pos);
                ProcessTick::Wait("replanting".to_string())
            }

            FarmState::Planting(pos) => {
                match self.seed_slot(ctx) {
                    Some(slot) => {
                        if ctx.adapter.equipped_slot() != slot {
                            if ctx.adapter.equip(slot).is_err() {
                                self.state = FarmState::Searching;
                                return ProcessTick::Wait("could not equip seeds".to_string());
                            }
                        }
                        // Plant against the farmland below the harvested spot
                        if let Err(e) = ctx
                            .adapter
                            .place_block(pos.down(), bevy::math::IVec3::new(0, 1, 0))
                        {
                            debug!("🌾 Replant at {} failed: {}", pos, e);
                        }
                    }
                    None => {
                        debug!("🌾 No '{}' left to replant", self.config.seed_item);
                    }
                }
                if self.config.max_harvests > 0 && self.harvested >= self.config.max_harvests {
                    return ProcessTick::Complete(format!("harvested {} crops", self.harvested));
                }
                self.state = FarmState::Searching;
                self.scan_timer = None;
                ProcessTick::Wait("looking for the next crop".to_string())
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
