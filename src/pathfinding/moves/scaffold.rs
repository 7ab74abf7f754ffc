/// Scaffolding: placing throwaway blocks to create footing
///
/// Place-and-walk bridges a floorless adjacent column by placing a block
/// under it. Pillar jumps straight up, placing a block beneath the feet.
/// Both need the place flag and a placeable, unprotected block in the
/// inventory.
use super::costs::WALK_ONE_BLOCK_COST;
use super::{MoveCandidate, MoveKind};
use crate::pathfinding::context::CalculationContext;
use crate::types::{BlockPos, CARDINALS_XZ};

pub fn candidates(ctx: &mut CalculationContext, src: BlockPos, out: &mut Vec<MoveCandidate>) {
    if !ctx.settings.can_place || !ctx.has_throwaway() {
        return;
    }

    for (dx, dz) in CARDINALS_XZ {
        let dest = src.offset(dx, 0, dz);
        if !ctx.passable_body(dest) {
            continue;
        }
        if ctx.walk_on(dest.down()) || ctx.water_at(dest) {
            continue; // footing already exists; other families cover it
        }
        if !ctx.passable(dest.down()) {
            continue; // avoid-class support; nothing to place into
        }
        out.push(MoveCandidate {
            kind: MoveKind::PlaceAndWalk,
            dest,
            cost: WALK_ONE_BLOCK_COST + ctx.settings.place_penalty,
            to_break: Vec::new(),
            to_place: vec![dest.down()],
        });
    }

    // Pillar: jump and place beneath the feet
    if ctx.walk_on(src.down()) {
        let up = src.up();
        if ctx.passable(up) && ctx.passable(src.offset(0, 2, 0)) {
            out.push(MoveCandidate {
                kind: MoveKind::Pillar,
                dest: up,
                cost: 2.0 * ctx.settings.jump_penalty + ctx.settings.place_penalty,
                to_break: Vec::new(),
                to_place: vec![src],
            });
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
