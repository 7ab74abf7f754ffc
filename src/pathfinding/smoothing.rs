/// Path smoothing: line-of-sight collapse and direction merging
///
/// Both passes only ever REMOVE interior nodes - smoothing never invents a
/// position absent from the planned path and never touches the endpoints.
/// Only plain walking steps participate; anything that digs, places,
/// climbs, swims, or jumps is a commitment the executor must see intact.
use crate::pathfinding::context::CalculationContext;
use crate::pathfinding::moves::MoveKind;
use crate::pathfinding::path::{NavPath, PathStep};
use crate::types::BlockPos;

/// Line-of-sight window in blocks
const LOS_WINDOW: i32 = 5;

/// Steps that may be consumed by smoothing
fn is_simple(step: &PathStep) -> bool {
    step.to_break.is_empty()
        && step.to_place.is_empty()
        && matches!(
            step.kind,
            None | Some(MoveKind::Walk) | Some(MoveKind::Diagonal)
        )
}

/// Per-axis signed step direction
fn direction(from: BlockPos, to: BlockPos) -> (i32, i32, i32) {
    (
        (to.x - from.x).signum(),
        (to.y - from.y).signum(),
        (to.z - from.z).signum(),
    )
}

/// Is the straight grid segment from `a` to `b` walkable?
///
/// Requires: aligned direction (axis or perfect diagonal), |Δy| ≤ 1, every
/// interior waypoint with a walkable floor and a passable body, and no
/// corner clipping on diagonal steps.
fn segment_walkable(ctx: &mut CalculationContext, a: BlockPos, b: BlockPos) -> bool {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let dz = b.z - a.z;
    if dy.abs() > 1 {
        return false;
    }
    let aligned = dx == 0 || dz == 0 || dx.abs() == dz.abs();
    if !aligned {
        return false;
    }
    let steps = dx.abs().max(dz.abs());
    if steps > LOS_WINDOW {
        return false;
    }
    let step_x = dx.signum();
    let step_z = dz.signum();

    let mut current = a;
    for _ in 0..steps.saturating_sub(1) {
        let next = BlockPos::new(current.x + step_x, a.y, current.z + step_z);
        if !ctx.passable(next) || !ctx.passable(next.up()) || !ctx.walk_on(next.down()) {
            return false;
        }
        if step_x != 0 && step_z != 0 {
            // Diagonal steps must not clip either corner
            let corner_a = BlockPos::new(current.x + step_x, a.y, current.z);
            let corner_b = BlockPos::new(current.x, a.y, current.z + step_z);
            if !ctx.passable(corner_a)
                || !ctx.passable(corner_a.up())
                || !ctx.passable(corner_b)
                || !ctx.passable(corner_b.up())
            {
                return false;
            }
        }
        current = next;
    }
    true
}

/// Greedy line-of-sight collapse: from each kept node, jump to the farthest
/// reachable simple node within the window
fn los_collapse(steps: &[PathStep], ctx: &mut CalculationContext) -> Vec<PathStep> {
    let mut kept: Vec<PathStep> = Vec::with_capacity(steps.len());
    let mut i = 0;
    kept.push(steps[0].clone());

    while i + 1 < steps.len() {
        let mut target = i + 1;
        // Everything between i and a candidate j must be simple and the
        // direct segment walkable
        let mut j = i + 2;
        while j < steps.len() {
            let span_simple = steps[i + 1..=j].iter().all(is_simple);
            if !span_simple {
                break;
            }
            if segment_walkable(ctx, steps[i].pos, steps[j].pos) {
                target = j;
                j += 1;
            } else {
                break;
            }
        }

        let mut step = steps[target].clone();
        if target > i + 1 {
            // The arrival became a straight run
            let dir = direction(steps[i].pos, step.pos);
            step.kind = Some(if dir.0 != 0 && dir.2 != 0 {
                MoveKind::Diagonal
            } else {
                MoveKind::Walk
            });
        }
        kept.push(step);
        i = target;
    }
    kept
}

/// Drop interior nodes whose incoming direction equals their outgoing one
fn direction_merge(steps: &[PathStep]) -> Vec<PathStep> {
    if steps.len() <= 2 {
        return steps.to_vec();
    }
    let mut kept: Vec<PathStep> = Vec::with_capacity(steps.len());
    kept.push(steps[0].clone());
    for k in 1..steps.len() - 1 {
        let step = &steps[k];
        let next = &steps[k + 1];
        let dir_in = direction(kept[kept.len() - 1].pos, step.pos);
        let dir_out = direction(step.pos, next.pos);
        if dir_in == dir_out && is_simple(step) && is_simple(next) {
            continue;
        }
        kept.push(step.clone());
    }
    kept.push(steps[steps.len() - 1].clone());
    kept
}

/// Smooth a computed path. Idempotent; preserves the first and last nodes;
/// the result is never longer than the input.
pub fn smooth_path(path: &NavPath, ctx: &mut CalculationContext) -> NavPath {
    let steps = path.steps();
    if steps.len() <= 2 {
        return path.clone();
    }
    let collapsed = los_collapse(steps, ctx);
    let merged = direction_merge(&collapsed);
    NavPath::new(merged)
}

// ============================================================================
// TESTS
// ============================================================================
