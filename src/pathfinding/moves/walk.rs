/// Flat walks: the four cardinals and the four diagonals
///
/// Diagonals require BOTH corner columns to be passable so the agent body
/// never clips a wall edge. Wading through water is a walk at water speed
/// and needs the swim flag.
use super::costs::{SPRINT_ONE_BLOCK_COST, SQRT_2, WALK_ONE_BLOCK_COST, WALK_ONE_IN_WATER_COST};
use super::{MoveCandidate, MoveKind};
use crate::pathfinding::context::CalculationContext;
use crate::types::{BlockPos, CARDINALS_XZ, DIAGONALS_XZ};

fn flat_support(ctx: &mut CalculationContext, feet: BlockPos) -> Option<f64> {
    if ctx.water_at(feet) {
        if !ctx.settings.allow_swim {
            return None;
        }
        // Wading: stay buoyed by water or a floor below
        if ctx.water_at(feet.down()) || ctx.walk_on(feet.down()) {
            return Some(WALK_ONE_IN_WATER_COST);
        }
        return None;
    }
    if ctx.walk_on(feet.down()) {
        let cost = if ctx.settings.allow_sprint {
            SPRINT_ONE_BLOCK_COST
        } else {
            WALK_ONE_BLOCK_COST
        };
        return Some(cost);
    }
    None
}

pub fn candidates(ctx: &mut CalculationContext, src: BlockPos, out: &mut Vec<MoveCandidate>) {
    for (dx, dz) in CARDINALS_XZ {
        let dest = src.offset(dx, 0, dz);
        if !ctx.passable_body(dest) {
            continue;
        }
        if let Some(cost) = flat_support(ctx, dest) {
            out.push(MoveCandidate::simple(MoveKind::Walk, dest, cost));
        }
    }

    for (dx, dz) in DIAGONALS_XZ {
        let dest = src.offset(dx, 0, dz);
        if !ctx.passable_body(dest) {
            continue;
        }
        // No corner clipping: both adjacent columns must be open
        if !ctx.passable_body(src.offset(dx, 0, 0)) || !ctx.passable_body(src.offset(0, 0, dz)) {
            continue;
        }
        let Some(base) = flat_support(ctx, dest) else {
            continue;
        };
        // Diagonals never sprint
        let base = base.max(WALK_ONE_BLOCK_COST);
        out.push(MoveCandidate::simple(
            MoveKind::Diagonal,
            dest,
            base * SQRT_2,
        ));
    }
}

// ============================================================================
// TESTS
// ============================================================================
