/// Vertical swimming inside water columns
use super::costs::SWIM_ONE_BLOCK_COST;
use super::{MoveCandidate, MoveKind};
use crate::pathfinding::context::CalculationContext;
use crate::types::BlockPos;

pub fn candidates(ctx: &mut CalculationContext, src: BlockPos, out: &mut Vec<MoveCandidate>) {
    if !ctx.settings.allow_swim || !ctx.water_at(src) {
        return;
    }

    let up = src.up();
    if ctx.passable(up) {
        out.push(MoveCandidate::simple(
            MoveKind::SwimAscend,
            up,
            SWIM_ONE_BLOCK_COST,
        ));
    }

    let down = src.down();
    if ctx.water_at(down) {
        out.push(MoveCandidate::simple(
            MoveKind::SwimDescend,
            down,
            SWIM_ONE_BLOCK_COST,
        ));
    }
}
