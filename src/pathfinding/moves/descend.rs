/// Step-downs and falls
///
/// A one-block descend is a walk off an edge. Anything deeper becomes a
/// fall: the generator scans down for a landing and accepts it when the
/// drop stays within the safe-fall height, or within the water-cushion
/// height when the landing column is water and swimming is allowed.
use super::costs::{fall_cost, WALK_ONE_BLOCK_COST};
use super::{MoveCandidate, MoveKind};
use crate::pathfinding::context::CalculationContext;
use crate::types::{BlockPos, CARDINALS_XZ};

/// Hard scan limit; worlds are shallower than this
const MAX_FALL_SCAN: i32 = 256;

pub fn candidates(ctx: &mut CalculationContext, src: BlockPos, out: &mut Vec<MoveCandidate>) {
    for (dx, dz) in CARDINALS_XZ {
        let forward = src.offset(dx, 0, dz);
        // The body passes through the edge column on the way down
        if !ctx.passable_body(forward) {
            continue;
        }
        let below = forward.down();
        if !ctx.passable(below) {
            continue; // floor is level; plain walk territory
        }

        if ctx.walk_on(below.down()) {
            out.push(MoveCandidate::simple(
                MoveKind::DescendBlock,
                below,
                WALK_ONE_BLOCK_COST + fall_cost(1),
            ));
            continue;
        }

        // Deeper drop: scan for a landing
        let mut feet = below;
        let mut drop = 1;
        while drop <= MAX_FALL_SCAN {
            if ctx.water_at(feet) {
                // Water cushions the landing
                if ctx.settings.allow_swim && drop <= ctx.settings.max_fall_height_water {
                    out.push(MoveCandidate::simple(
                        MoveKind::Fall,
                        feet,
                        WALK_ONE_BLOCK_COST + fall_cost(drop),
                    ));
                }
                break;
            }
            if ctx.walk_on(feet.down()) {
                if drop <= ctx.settings.effective_max_fall() {
                    out.push(MoveCandidate::simple(
                        MoveKind::Fall,
                        feet,
                        WALK_ONE_BLOCK_COST + fall_cost(drop),
                    ));
                }
                break;
            }
            if !ctx.passable(feet.down()) {
                break; // lava or other avoid-class below: no landing
            }
            feet = feet.down();
            drop += 1;
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
