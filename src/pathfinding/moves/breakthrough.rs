/// Break-and-walk: tunneling through obstructions
///
/// Horizontal: clear the blocked body voxels of an adjacent column (head
/// block first) and walk in. Vertical: dig straight down through the floor
/// beneath the feet. Break time comes from the context's dig formula; an
/// infinite break time on any required block kills the candidate.
use super::costs::{fall_cost, WALK_ONE_BLOCK_COST};
use super::{MoveCandidate, MoveKind};
use crate::pathfinding::context::CalculationContext;
use crate::types::{BlockPos, CARDINALS_XZ};

pub fn candidates(ctx: &mut CalculationContext, src: BlockPos, out: &mut Vec<MoveCandidate>) {
    if !ctx.settings.can_dig {
        return;
    }

    for (dx, dz) in CARDINALS_XZ {
        let dest = src.offset(dx, 0, dz);
        if !ctx.walk_on(dest.down()) {
            continue;
        }

        let mut to_break = Vec::new();
        let mut dig_ticks = 0.0;
        // Head block first so nothing falls on the agent mid-dig
        for voxel in [dest.up(), dest] {
            if ctx.passable(voxel) {
                continue;
            }
            let ticks = ctx.break_time(voxel);
            if !ticks.is_finite() {
                dig_ticks = f64::INFINITY;
                break;
            }
            dig_ticks += ticks;
            to_break.push(voxel);
        }
        if to_break.is_empty() || !dig_ticks.is_finite() {
            continue; // fully open columns belong to the walk family
        }
        // A sand or gravel stack above the opening would pour down into it
        if ctx.falling_at(dest.offset(0, 2, 0)) {
            continue;
        }

        let cost = WALK_ONE_BLOCK_COST
            + dig_ticks
            + ctx.settings.break_penalty * to_break.len() as f64;
        out.push(MoveCandidate {
            kind: MoveKind::BreakAndWalk,
            dest,
            cost,
            to_break,
            to_place: Vec::new(),
        });
    }

    // Straight down through the floor
    let below = src.down();
    if !ctx.passable(below) && ctx.walk_on(below.down()) {
        let ticks = ctx.break_time(below);
        if ticks.is_finite() && !ctx.falling_at(src.offset(0, 2, 0)) {
            out.push(MoveCandidate {
                kind: MoveKind::BreakAndWalk,
                dest: below,
                cost: ticks + ctx.settings.break_penalty + fall_cost(1),
                to_break: vec![below],
                to_place: Vec::new(),
            });
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
