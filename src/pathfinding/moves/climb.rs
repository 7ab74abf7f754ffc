/// Ladder and vine climbing
///
/// Climbable blocks cache as passable air, so the generator confirms the
/// live block at the exact position before offering a climb.
use super::costs::{LADDER_DOWN_ONE_COST, LADDER_UP_ONE_COST};
use super::{MoveCandidate, MoveKind};
use crate::pathfinding::context::CalculationContext;
use crate::types::BlockPos;

pub fn candidates(ctx: &mut CalculationContext, src: BlockPos, out: &mut Vec<MoveCandidate>) {
    if !ctx.settings.allow_climb {
        return;
    }

    if ctx.climbable_at(src) {
        let up = src.up();
        if ctx.passable(up) {
            out.push(MoveCandidate::simple(
                MoveKind::ClimbUp,
                up,
                LADDER_UP_ONE_COST,
            ));
        }
    }

    let down = src.down();
    if ctx.climbable_at(down) && ctx.passable(down) {
        out.push(MoveCandidate::simple(
            MoveKind::ClimbDown,
            down,
            LADDER_DOWN_ONE_COST,
        ));
    }
}
