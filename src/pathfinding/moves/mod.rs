/// Movement primitives: the closed set of one-step transitions
///
/// Each family module generates candidate moves from a source position:
/// destination, cost in ticks, and the blocks that must be broken or placed
/// first so the planner can amortize their cost into `g`. Candidates with
/// infinite cost never leave a generator.
pub mod ascend;
pub mod breakthrough;
pub mod climb;
pub mod costs;
pub mod descend;
pub mod parkour;
pub mod scaffold;
pub mod swim;
pub mod walk;

use crate::pathfinding::context::CalculationContext;
use crate::types::BlockPos;

/// The closed movement set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Walk,
    Diagonal,
    AscendBlock,
    DescendBlock,
    Fall,
    ParkourJump,
    SwimAscend,
    SwimDescend,
    ClimbUp,
    ClimbDown,
    BreakAndWalk,
    PlaceAndWalk,
    Pillar,
}

impl MoveKind {
    /// Does executing this move change the world (dig or place)?
    pub fn mutates_world(&self) -> bool {
        matches!(
            self,
            MoveKind::BreakAndWalk | MoveKind::PlaceAndWalk | MoveKind::Pillar
        )
    }
}

/// One candidate transition out of a node
#[derive(Debug, Clone, PartialEq)]
pub struct MoveCandidate {
    pub kind: MoveKind,
    pub dest: BlockPos,
    /// Intrinsic cost plus break/place amortization, in ticks
    pub cost: f64,
    pub to_break: Vec<BlockPos>,
    pub to_place: Vec<BlockPos>,
}

impl MoveCandidate {
    pub fn simple(kind: MoveKind, dest: BlockPos, cost: f64) -> Self {
        Self {
            kind,
            dest,
            cost,
            to_break: Vec::new(),
            to_place: Vec::new(),
        }
    }
}

/// The voxels the agent body occupies while executing a move from `src` to
/// `dest`: feet and head at both endpoints, the swept columns of straight
/// runs (smoothing produces multi-block steps), and the full column of a
/// fall. Used for interruption detection.
pub fn valid_positions(src: BlockPos, dest: BlockPos) -> Vec<BlockPos> {
    let mut positions = vec![src, src.up(), dest, dest.up()];

    // Falls sweep the whole descended column
    if dest.y < src.y - 1 && src.x == dest.x && src.z == dest.z {
        for y in dest.y..src.y {
            positions.push(BlockPos::new(src.x, y, src.z));
        }
    }

    // Same-level straight runs sweep every column they cross. Diagonal
    // sweeps also include the corner columns, since the agent floors into
    // one of them for an instant at each voxel boundary.
    let dx = dest.x - src.x;
    let dz = dest.z - src.z;
    if dest.y == src.y && (dx == 0 || dz == 0 || dx.abs() == dz.abs()) {
        let steps = dx.abs().max(dz.abs());
        for i in 1..=steps {
            let column = BlockPos::new(src.x + dx.signum() * i, src.y, src.z + dz.signum() * i);
            positions.push(column);
            positions.push(column.up());
            if dx != 0 && dz != 0 {
                for corner in [
                    BlockPos::new(column.x - dx.signum(), src.y, column.z),
                    BlockPos::new(column.x, src.y, column.z - dz.signum()),
                ] {
                    positions.push(corner);
                    positions.push(corner.up());
                }
            }
        }
    }

    positions.sort_by_key(|p| (p.x, p.y, p.z));
    positions.dedup();
    positions
}

/// Expand every movement family from `src` into `out`.
/// `out` is a pooled scratch buffer; the caller clears and returns it.
pub fn generate(ctx: &mut CalculationContext, src: BlockPos, out: &mut Vec<MoveCandidate>) {
    walk::candidates(ctx, src, out);
    ascend::candidates(ctx, src, out);
    descend::candidates(ctx, src, out);
    parkour::candidates(ctx, src, out);
    swim::candidates(ctx, src, out);
    climb::candidates(ctx, src, out);
    breakthrough::candidates(ctx, src, out);
    scaffold::candidates(ctx, src, out);

    // Behavior-frame position avoidance and cost sanity, applied once
    out.retain(|candidate| {
        candidate.cost.is_finite()
            && candidate.cost >= 0.0
            && !ctx.frame.is_position_avoided(candidate.dest)
    });
}

// ============================================================================
// TEST HARNESS
// ============================================================================
