/// Per-step movement execution state machine
///
/// The planner amortized dig and place work into each step's cost; here it
/// actually happens, one actuation at a time. Adapter calls return
/// immediately, so each phase polls the world for completion on later
/// ticks instead of blocking: a dig is done when the target block reads
/// passable, a placement when the target reads solid.
use bevy::log::{debug, warn};
use bevy::math::IVec3;

use crate::blocks::BlockPropertyTable;
use crate::pathfinding::path::PathStep;
use crate::types::BlockPos;
use crate::world::adapter::GameAdapter;

/// Movement status reported to the executor each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementStatus {
    /// Clearing or placing blocks before traveling
    Prepping,
    /// An actuation is in flight; polling for completion
    Waiting,
    /// Traveling toward the step destination
    Running,
    /// The destination voxel is reached
    Success,
    /// The step cannot complete from here
    Unreachable,
    /// The step failed (interruption, lost blocks, timeout)
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Breaking,
    Placing,
    Traveling,
}

/// Executes one path step across ticks; `reset` re-arms it for the next
/// step or for re-execution after a replan
#[derive(Debug)]
pub struct MoveExecution {
    phase: Phase,
    break_index: usize,
    place_index: usize,
    dig_issued: bool,
    ticks_in_step: u32,
    null_voxel: Option<BlockPos>,
    null_strikes: u8,
}

impl Default for MoveExecution {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveExecution {
    pub fn new() -> Self {
        Self {
            phase: Phase::Breaking,
            break_index: 0,
            place_index: 0,
            dig_issued: false,
            ticks_in_step: 0,
            null_voxel: None,
            null_strikes: 0,
        }
    }

    /// Restore per-instance state for re-execution after a replan
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Block lookup with the two-strike WorldUnavailable demotion: a single
    /// null read waits (chunk may be mid-load); two consecutive on the same
    /// voxel fail the step so the executor replans.
    fn observe(
        &mut self,
        adapter: &dyn GameAdapter,
        pos: BlockPos,
    ) -> Result<crate::world::adapter::Block, MovementStatus> {
        match adapter.block_at(pos) {
            Some(block) => {
                if self.null_voxel == Some(pos) {
                    self.null_voxel = None;
                    self.null_strikes = 0;
                }
                Ok(block)
            }
            None => {
                if self.null_voxel == Some(pos) {
                    self.null_strikes += 1;
                } else {
                    self.null_voxel = Some(pos);
                    self.null_strikes = 1;
                }
                if self.null_strikes >= 2 {
                    warn!("🌫️ Block at {} unavailable twice - failing step", pos);
                    Err(MovementStatus::Failed)
                } else {
                    Err(MovementStatus::Waiting)
                }
            }
        }
    }

    /// Advance this step by one tick
    pub fn execute(
        &mut self,
        adapter: &mut dyn GameAdapter,
        table: &BlockPropertyTable,
        step: &PathStep,
        sprint: bool,
        timeout_ticks: u32,
    ) -> MovementStatus {
        self.ticks_in_step += 1;
        if self.ticks_in_step > timeout_ticks {
            warn!("⏱️ Step toward {} timed out after {} ticks", step.pos, timeout_ticks);
            return MovementStatus::Unreachable;
        }

        loop {
            match self.phase {
                Phase::Breaking => {
                    let Some(&target) = step.to_break.get(self.break_index) else {
                        self.phase = Phase::Placing;
                        continue;
                    };
                    let block = match self.observe(adapter, target) {
                        Ok(block) => block,
                        Err(status) => return status,
                    };
                    if table.props(block.kind).passability()
                        != crate::blocks::Passability::No
                        || block.open
                    {
                        // Cleared; move to the next queued break
                        self.break_index += 1;
                        self.dig_issued = false;
                        continue;
                    }
                    if !self.dig_issued {
                        if let Err(e) = adapter.dig(target, true) {
                            warn!("⛏️ Dig at {} rejected: {}", target, e);
                            return MovementStatus::Unreachable;
                        }
                        self.dig_issued = true;
                        return MovementStatus::Prepping;
                    }
                    return MovementStatus::Waiting;
                }

                Phase::Placing => {
                    let Some(&target) = step.to_place.get(self.place_index) else {
                        self.phase = Phase::Traveling;
                        continue;
                    };
                    let block = match self.observe(adapter, target) {
                        Ok(block) => block,
                        Err(status) => return status,
                    };
                    if table.props(block.kind).walk_on() {
                        self.place_index += 1;
                        continue;
                    }
                    let Some(slot) = throwaway_slot(adapter, table) else {
                        warn!("🧱 No throwaway block left to place at {}", target);
                        return MovementStatus::Unreachable;
                    };
                    if adapter.equipped_slot() != slot {
                        if let Err(e) = adapter.equip(slot) {
                            warn!("🧱 Equip for placement failed: {}", e);
                            return MovementStatus::Failed;
                        }
                        return MovementStatus::Prepping;
                    }
                    let Some((reference, face)) = placement_reference(adapter, table, target)
                    else {
                        return MovementStatus::Unreachable;
                    };
                    if let Err(e) = adapter.place_block(reference, face) {
                        warn!("🧱 Placement at {} rejected: {}", target, e);
                        return MovementStatus::Unreachable;
                    }
                    return MovementStatus::Prepping;
                }

                Phase::Traveling => {
                    let agent = adapter.self_block_pos();
                    if agent == step.pos {
                        adapter.stop_moving();
                        debug!("🏁 Reached step {}", step.pos);
                        return MovementStatus::Success;
                    }

                    // Same-level travel probes one block ahead so a wall
                    // raised across the segment fails the step instead of
                    // stalling against it
                    if step.pos.y == agent.y {
                        let position = adapter.self_position();
                        let delta = step.pos.bottom_center() - position;
                        let probe_point = if delta.length() > 1.0 {
                            position + delta / delta.length()
                        } else {
                            step.pos.bottom_center()
                        };
                        let probe = BlockPos::from_vec3(probe_point);
                        for voxel in [probe, probe.up()] {
                            if step.to_break.contains(&voxel) {
                                continue;
                            }
                            let blocked = adapter
                                .block_at(voxel)
                                .map(|b| {
                                    table.props(b.kind).passability()
                                        == crate::blocks::Passability::No
                                        && !b.open
                                })
                                .unwrap_or(false);
                            if blocked {
                                warn!("🧱 Segment toward {} obstructed at {}", step.pos, voxel);
                                return MovementStatus::Failed;
                            }
                        }
                    }

                    adapter.move_toward(step.pos.bottom_center(), sprint);
                    return MovementStatus::Running;
                }
            }
        }
    }
}

/// First placeable, unprotected block stack in the inventory
fn throwaway_slot(adapter: &dyn GameAdapter, table: &BlockPropertyTable) -> Option<usize> {
    adapter
        .inventory_items()
        .iter()
        .enumerate()
        .find(|(_, item)| {
            item.count > 0
                && table
                    .id_by_name(&item.name)
                    .map(|kind| table.props(kind).walk_on() && !table.props(kind).falling())
                    .unwrap_or(false)
        })
        .map(|(slot, _)| slot)
}

/// A solid neighbor to place against, preferring the face below
fn placement_reference(
    adapter: &dyn GameAdapter,
    table: &BlockPropertyTable,
    target: BlockPos,
) -> Option<(BlockPos, IVec3)> {
    let faces = [
        (target.down(), IVec3::new(0, 1, 0)),
        (target.offset(-1, 0, 0), IVec3::new(1, 0, 0)),
        (target.offset(1, 0, 0), IVec3::new(-1, 0, 0)),
        (target.offset(0, 0, -1), IVec3::new(0, 0, 1)),
        (target.offset(0, 0, 1), IVec3::new(0, 0, -1)),
        (target.up(), IVec3::new(0, -1, 0)),
    ];
    faces.into_iter().find(|(reference, _)| {
        adapter
            .block_at(*reference)
            .map(|b| table.props(b.kind).walk_on())
            .unwrap_or(false)
    })
}
