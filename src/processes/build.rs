/// Build process: realize a blueprint block by block
///
/// State machine: Planning → Moving → Breaking → Placing. Planning picks
/// the next unsatisfied blueprint entry; misplaced blocks are corrected
/// first when enabled. Scaffolding falls out of the planner's place moves,
/// not special-cased here.
use bevy::log::debug;
use std::collections::HashSet;

use super::{Priority, Process, ProcessCtx, ProcessTick};
use crate::pathfinding::goals::Goal;
use crate::types::BlockPos;

/// One desired block in the blueprint
#[derive(Debug, Clone, PartialEq)]
pub struct BuildTarget {
    pub pos: BlockPos,
    pub kind_name: String,
}

#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub blueprint: Vec<BuildTarget>,
    /// Dig out blocks that do not match the blueprint
    pub correct_misplaced: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            blueprint: Vec::new(),
            correct_misplaced: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BuildState {
    Planning,
    Moving(usize),
    Breaking(usize),
    Placing(usize),
}

pub struct BuildProcess {
    config: BuildConfig,
    state: BuildState,
    blacklist: HashSet<usize>,
    placed: usize,
}

impl BuildProcess {
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            state: BuildState::Planning,
            blacklist: HashSet::new(),
            placed: 0,
        }
    }

    /// Does the world already satisfy blueprint entry `index`?
    fn satisfied(&self, ctx: &ProcessCtx, index: usize) -> bool {
        let target = &self.config.blueprint[index];
        let Some(wanted) = ctx.table.id_by_name(&target.kind_name) else {
            return true; // unknown kinds are unbuildable; treat as done
        };
        ctx.adapter
            .block_at(target.pos)
            .map(|b| b.kind == wanted)
            .unwrap_or(false)
    }

    /// Must the current occupant be dug out first?
    fn needs_clearing(&self, ctx: &ProcessCtx, index: usize) -> bool {
        let target = &self.config.blueprint[index];
        match ctx.adapter.block_at(target.pos) {
            Some(block) => {
                let props = ctx.table.props(block.kind);
                let occupied = !props.fully_passable() && !props.water();
                occupied && self.config.correct_misplaced
            }
            None => false,
        }
    }

    fn material_slot(&self, ctx: &ProcessCtx, index: usize) -> Option<usize> {
        let name = &self.config.blueprint[index].kind_name;
        ctx.adapter
            .inventory_items()
            .iter()
            .position(|item| &item.name == name && item.count > 0)
    }
}

impl Process for BuildProcess {
    fn name(&self) -> &'static str {
        "build"
    }

    fn priority(&self) -> Priority {
        Priority::Normal
    }

    fn on_activate(&mut self) {
        self.state = BuildState::Planning;
        self.blacklist.clear();
        self.placed = 0;
    }

    fn tick(&mut self, ctx: &mut ProcessCtx) -> ProcessTick {
        if self.config.blueprint.is_empty() {
            return ProcessTick::Complete("empty blueprint".to_string());
        }

        match self.state {
            BuildState::Planning => {
                let next = (0..self.config.blueprint.len())
                    .filter(|i| !self.blacklist.contains(i))
                    .find(|&i| !self.satisfied(ctx, i));
                match next {
                    Some(index) => {
                        let pos = self.config.blueprint[index].pos;
                        debug!("🏗️ Next blueprint block: {} ({})", pos, self.config.blueprint[index].kind_name);
                        self.state = BuildState::Moving(index);
                        ProcessTick::NewGoal(Goal::GetToBlock { pos })
                    }
                    None => {
                        if self.blacklist.is_empty() {
                            ProcessTick::Complete(format!("blueprint done, {} placed", self.placed))
                        } else {
                            ProcessTick::Fail(format!(
                                "{} blueprint blocks unreachable",
                                self.blacklist.len()
                            ))
                        }
                    }
                }
            }

            BuildState::Moving(index) => {
                let pos = self.config.blueprint[index].pos;
                if ctx.path_unreachable {
                    self.blacklist.insert(index);
                    self.state = BuildState::Planning;
                    return ProcessTick::Wait("blueprint block unreachable".to_string());
                }
                if (Goal::GetToBlock { pos }).is_end(ctx.self_pos()) {
                    self.state = if self.needs_clearing(ctx, index) {
                        BuildState::Breaking(index)
                    } else {
                        BuildState::Placing(index)
                    };
                    return ProcessTick::Wait("working on blueprint block".to_string());
                }
                ProcessTick::ContinuePathing
            }

            BuildState::Breaking(index) => {
                let pos = self.config.blueprint[index].pos;
                if !self.needs_clearing(ctx, index) {
                    self.state = BuildState::Placing(index);
                    return ProcessTick::Wait("cleared".to_string());
                }
                if !ctx.adapter.is_digging() {
                    if let Err(e) = ctx.adapter.dig(pos, true) {
                        debug!("🏗️ Cannot clear {}: {}", pos, e);
                        self.blacklist.insert(index);
                        self.state = BuildState::Planning;
                    }
                }
                ProcessTick::Wait("clearing misplaced block".to_string())
            }

            BuildState::Placing(index) => {
                if self.satisfied(ctx, index) {
                    self.placed += 1;
                    self.state = BuildState::Planning;
                    return ProcessTick::Wait("block placed".to_string());
                }
                let Some(slot) = self.material_slot(ctx, index) else {
                    return ProcessTick::Fail(format!(
                        "out of '{}'",
                        self.config.blueprint[index].kind_name
                    ));
                };
                if ctx.adapter.equipped_slot() != slot {
                    if ctx.adapter.equip(slot).is_err() {
                        return ProcessTick::Wait("equipping material".to_string());
                    }
                }
                let pos = self.config.blueprint[index].pos;
                if let Err(e) = ctx
                    .adapter
                    .place_block(pos.down(), bevy::math::IVec3::new(0, 1, 0))
                {
                    debug!("🏗️ Placement at {} failed: {}", pos, e);
                    self.blacklist.insert(index);
                    self.state = BuildState::Planning;
                }
                ProcessTick::Wait("placing".to_string())
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
