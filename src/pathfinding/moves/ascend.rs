/// One-block step-ups
///
/// The agent jumps onto an adjacent block one higher. Needs headroom above
/// the current position for the jump arc and a clear body at the landing.
use super::costs::WALK_ONE_BLOCK_COST;
use super::{MoveCandidate, MoveKind};
use crate::pathfinding::context::CalculationContext;
use crate::types::{BlockPos, CARDINALS_XZ};

pub fn candidates(ctx: &mut CalculationContext, src: BlockPos, out: &mut Vec<MoveCandidate>) {
    // Jump arc clearance above the head
    if !ctx.passable(src.offset(0, 2, 0)) {
        return;
    }
    for (dx, dz) in CARDINALS_XZ {
        let dest = src.offset(dx, 1, dz);
        if !ctx.walk_on(dest.down()) {
            continue;
        }
        if !ctx.passable_body(dest) {
            continue;
        }
        out.push(MoveCandidate::simple(
            MoveKind::AscendBlock,
            dest,
            WALK_ONE_BLOCK_COST + ctx.settings.jump_penalty,
        ));
    }
}

// ============================================================================
// TESTS
// ============================================================================
