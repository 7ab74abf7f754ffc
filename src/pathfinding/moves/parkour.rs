/// Sprint jumps across gaps
///
/// Enabled only when both the parkour and sprint flags are set. Covers
/// gaps of 2–4 blocks in a cardinal direction with validated headroom over
/// the whole arc and a solid landing.
use super::costs::SPRINT_ONE_BLOCK_COST;
use super::{MoveCandidate, MoveKind};
use crate::pathfinding::context::CalculationContext;
use crate::types::{BlockPos, CARDINALS_XZ};

const MIN_JUMP: i32 = 2;
const MAX_JUMP: i32 = 4;

pub fn candidates(ctx: &mut CalculationContext, src: BlockPos, out: &mut Vec<MoveCandidate>) {
    if !ctx.settings.allow_parkour || !ctx.settings.allow_sprint {
        return;
    }
    // Launch arc needs clearance above the head
    if !ctx.passable(src.offset(0, 2, 0)) {
        return;
    }

    for (dx, dz) in CARDINALS_XZ {
        let first = src.offset(dx, 0, dz);
        if !ctx.passable_body(first) {
            continue;
        }
        if ctx.walk_on(first.down()) {
            continue; // not a gap; plain walking covers it
        }

        'distances: for dist in MIN_JUMP..=MAX_JUMP {
            // Every column crossed mid-air must be open feet-to-arc
            for i in 1..dist {
                let column = src.offset(dx * i, 0, dz * i);
                if !ctx.passable_body(column) || !ctx.passable(column.offset(0, 2, 0)) {
                    break 'distances;
                }
            }
            let landing = src.offset(dx * dist, 0, dz * dist);
            if !ctx.passable_body(landing) {
                break;
            }
            if ctx.walk_on(landing.down()) {
                out.push(MoveCandidate::simple(
                    MoveKind::ParkourJump,
                    landing,
                    SPRINT_ONE_BLOCK_COST * dist as f64 + 2.0 * ctx.settings.jump_penalty,
                ));
                break;
            }
            // Landing column is open but floorless: the gap continues
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathfinding::moves::harness::Harness;

    /// Open a gap in the floor from x=1 to x=gap_len at z=0
    fn carve_gap(h: &mut Harness, gap_len: i32) {
        for x in 1..=gap_len {
            h.set(BlockPos::new(x, 63, 0), "air");
        }
    }

    #[test]
    fn test_disabled_without_flag() {
        let mut h = Harness::flat();
        carve_gap(&mut h, 2);
        let mut out = Vec::new();
        let mut ctx = h.ctx();
        candidates(&mut ctx, BlockPos::new(0, 64, 0), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_two_block_gap_jump() {
        let mut h = Harness::flat();
        h.frame.allow_parkour = true;
        carve_gap(&mut h, 2);
        let mut out = Vec::new();
        let mut ctx = h.ctx();
        candidates(&mut ctx, BlockPos::new(0, 64, 0), &mut out);
        let jump = out
            .iter()
            .find(|c| c.kind == MoveKind::ParkourJump)
            .expect("two-block gap is jumpable");
        assert_eq!(jump.dest, BlockPos::new(3, 64, 0));
    }

    #[test]
    fn test_five_block_gap_is_too_far() {
        let mut h = Harness::flat();
        h.frame.allow_parkour = true;
        carve_gap(&mut h, 5);
        let mut out = Vec::new();
        let mut ctx = h.ctx();
        candidates(&mut ctx, BlockPos::new(0, 64, 0), &mut out);
        assert!(!out
            .iter()
            .any(|c| c.kind == MoveKind::ParkourJump && c.dest.x > 0 && c.dest.z == 0));
    }

    #[test]
    fn test_arc_headroom_is_validated() {
        let mut h = Harness::flat();
        h.frame.allow_parkour = true;
        carve_gap(&mut h, 2);
        h.set(BlockPos::new(2, 66, 0), "stone"); // low ceiling mid-arc
        let mut out = Vec::new();
        let mut ctx = h.ctx();
        candidates(&mut ctx, BlockPos::new(0, 64, 0), &mut out);
        assert!(!out
            .iter()
            .any(|c| c.kind == MoveKind::ParkourJump && c.dest == BlockPos::new(3, 64, 0)));
    }
}
