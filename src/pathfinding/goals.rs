/// Goal set: terminal predicates plus admissible heuristics
///
/// Every goal is a pure pair of `is_end` and `heuristic`. Heuristics return
/// ticks ≥ 0 and never over-estimate the minimum remaining cost, with two
/// documented exceptions: `And` sums child heuristics (not admissible in
/// general - planner optimality is not guaranteed for it) and the `RunAway`
/// family returns negative values, degrading A* to greedy descent away from
/// the repulsors, which is exactly the behavior those goals exist for.
use bevy::log::debug;

use crate::errors::{NavigatorError, Result};
use crate::pathfinding::moves::costs::{
    HEURISTIC_DOWN_COST, HEURISTIC_UP_COST, HEURISTIC_XZ_COST,
};
use crate::types::{BlockPos, ChunkPos, SECTION_SIZE};
use crate::world::adapter::EntityId;

/// How far ahead a directional goal projects its target point
const DIRECTION_REACH: f64 = 100.0;

/// Minimum target displacement before a follow goal wants a replan
const FOLLOW_REPLAN_DISTANCE: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Goal {
    /// Stand exactly at a block
    Block { pos: BlockPos },
    /// Reach an XZ column at any height
    Xz { x: i32, z: i32 },
    /// Reach a Y level anywhere
    YLevel { y: i32 },
    /// Get within a radius of a center
    Near { center: BlockPos, radius: f64 },
    /// Stand with feet at the block or directly under it
    TwoBlocks { pos: BlockPos },
    /// Stand at or directly adjacent to a block (for digging it)
    GetToBlock { pos: BlockPos },
    /// Stand anywhere inside an axis-aligned box
    Aabb { min: BlockPos, max: BlockPos },
    /// Any child satisfied; heuristic is the min over children
    Composite(Vec<Goal>),
    /// All children satisfied; heuristic is the SUM over children, which is
    /// not admissible - optimality is not guaranteed for this goal
    And(Vec<Goal>),
    /// Anywhere the inner goal is NOT satisfied
    Inverted(Box<Goal>),
    /// Stay within a radius of a tracked entity's last sampled position
    Follow {
        entity: EntityId,
        radius: f64,
        target: BlockPos,
    },
    /// Reach the half-space `buffer` blocks out from a block along a
    /// cardinal XZ direction
    BlockSide {
        pos: BlockPos,
        dx: i32,
        dz: i32,
        buffer: f64,
    },
    /// Reach any position inside a chunk column
    Chunk { chunk: ChunkPos },
    /// Head a fixed direction from an origin (projected far target)
    DirectionXz { x: i32, z: i32 },
    /// Get at least `min_dist` from every point; negative heuristic
    RunAway { points: Vec<BlockPos>, min_dist: f64 },
    /// Get at least `min_dist` from every repulsor entity position sampled
    /// at plan time; negative heuristic
    RunAwayFromEntities {
        positions: Vec<BlockPos>,
        min_dist: f64,
        xz_only: bool,
    },
}

#[inline]
fn xz_cost(dx: f64, dz: f64) -> f64 {
    (dx * dx + dz * dz).sqrt() * HEURISTIC_XZ_COST
}

#[inline]
fn y_cost(dy: f64) -> f64 {
    if dy > 0.0 {
        dy * HEURISTIC_UP_COST
    } else {
        -dy * HEURISTIC_DOWN_COST
    }
}

fn travel_cost(from: BlockPos, to: BlockPos) -> f64 {
    xz_cost((to.x - from.x) as f64, (to.z - from.z) as f64) + y_cost((to.y - from.y) as f64)
}

impl Goal {
    // --- validated constructors ---------------------------------------------

    /// Any-of composite; empty children are invalid
    pub fn composite(children: Vec<Goal>) -> Result<Goal> {
        if children.is_empty() {
            return Err(NavigatorError::invalid_input("empty composite goal"));
        }
        Ok(Goal::Composite(children))
    }

    /// All-of composite; empty children are invalid. The summed heuristic
    /// is not admissible, so the planner may return sub-optimal paths.
    pub fn and(children: Vec<Goal>) -> Result<Goal> {
        if children.is_empty() {
            return Err(NavigatorError::invalid_input("empty AND goal"));
        }
        debug!("GoalAnd: summed heuristic is not admissible; optimality not guaranteed");
        Ok(Goal::And(children))
    }

    /// Directional goal from an origin; a zero direction is invalid
    pub fn direction_xz(origin: BlockPos, dx: i32, dz: i32) -> Result<Goal> {
        if dx == 0 && dz == 0 {
            return Err(NavigatorError::invalid_input("zero direction in DirectionXZ goal"));
        }
        let len = ((dx * dx + dz * dz) as f64).sqrt();
        Ok(Goal::DirectionXz {
            x: origin.x + (dx as f64 / len * DIRECTION_REACH).round() as i32,
            z: origin.z + (dz as f64 / len * DIRECTION_REACH).round() as i32,
        })
    }

    pub fn run_away(points: Vec<BlockPos>, min_dist: f64) -> Result<Goal> {
        if points.is_empty() {
            return Err(NavigatorError::invalid_input("RunAway goal with no points"));
        }
        Ok(Goal::RunAway { points, min_dist })
    }

    pub fn run_away_from_entities(
        positions: Vec<BlockPos>,
        min_dist: f64,
        xz_only: bool,
    ) -> Result<Goal> {
        if positions.is_empty() {
            return Err(NavigatorError::invalid_input(
                "RunAwayFromEntities goal with no repulsors",
            ));
        }
        Ok(Goal::RunAwayFromEntities {
            positions,
            min_dist,
            xz_only,
        })
    }

    pub fn follow(entity: EntityId, radius: f64, target: BlockPos) -> Goal {
        Goal::Follow {
            entity,
            radius,
            target,
        }
    }

    /// Re-sample a follow target. Returns true when the target moved far
    /// enough that the current plan should be recomputed. This is the only
    /// mutating operation on any goal; `is_end` and `heuristic` stay pure.
    pub fn advance(&mut self, new_target: BlockPos) -> bool {
        if let Goal::Follow { target, .. } = self {
            let moved = target.dist_to(new_target) >= FOLLOW_REPLAN_DISTANCE;
            if moved {
                *target = new_target;
            }
            moved
        } else {
            false
        }
    }

    // --- the pure pair ------------------------------------------------------

    pub fn is_end(&self, pos: BlockPos) -> bool {
        match self {
            Goal::Block { pos: goal } => pos == *goal,
            Goal::Xz { x, z } => pos.x == *x && pos.z == *z,
            Goal::YLevel { y } => pos.y == *y,
            Goal::Near { center, radius } => center.dist_to(pos) <= *radius,
            Goal::TwoBlocks { pos: goal } => pos == *goal || pos == goal.down(),
            Goal::GetToBlock { pos: goal } => {
                (pos.x - goal.x).abs() <= 1
                    && (pos.y - goal.y).abs() <= 1
                    && (pos.z - goal.z).abs() <= 1
            }
            Goal::Aabb { min, max } => {
                pos.x >= min.x
                    && pos.x <= max.x
                    && pos.y >= min.y
                    && pos.y <= max.y
                    && pos.z >= min.z
                    && pos.z <= max.z
            }
            Goal::Composite(children) => children.iter().any(|g| g.is_end(pos)),
            Goal::And(children) => children.iter().all(|g| g.is_end(pos)),
            Goal::Inverted(inner) => !inner.is_end(pos),
            Goal::Follow { radius, target, .. } => target.dist_to(pos) <= *radius,
            Goal::BlockSide {
                pos: goal,
                dx,
                dz,
                buffer,
            } => {
                let s = ((pos.x - goal.x) * dx + (pos.z - goal.z) * dz) as f64;
                s >= *buffer
            }
            Goal::Chunk { chunk } => pos.chunk() == *chunk,
            Goal::DirectionXz { x, z } => pos.x == *x && pos.z == *z,
            Goal::RunAway { points, min_dist } => {
                points.iter().all(|p| p.dist_to(pos) >= *min_dist)
            }
            Goal::RunAwayFromEntities {
                positions,
                min_dist,
                xz_only,
            } => positions.iter().all(|p| {
                let d = if *xz_only {
                    p.dist_xz_to(pos)
                } else {
                    p.dist_to(pos)
                };
                d >= *min_dist
            }),
        }
    }

    pub fn heuristic(&self, pos: BlockPos) -> f64 {
        match self {
            Goal::Block { pos: goal } => travel_cost(pos, *goal),
            Goal::Xz { x, z } => xz_cost((x - pos.x) as f64, (z - pos.z) as f64),
            Goal::YLevel { y } => y_cost((y - pos.y) as f64),
            Goal::Near { center, radius } => {
                let d = (center.dist_to(pos) - radius).max(0.0);
                d * HEURISTIC_XZ_COST
            }
            Goal::TwoBlocks { pos: goal } => {
                travel_cost(pos, *goal).min(travel_cost(pos, goal.down()))
            }
            Goal::GetToBlock { pos: goal } => {
                let dx = ((pos.x - goal.x).abs() - 1).max(0) as f64;
                // Remaining vertical travel once the ±1 adjacency band is free
                let dy = (pos.y - goal.y).clamp(-1, 1) - (pos.y - goal.y);
                let dz = ((pos.z - goal.z).abs() - 1).max(0) as f64;
                xz_cost(dx, dz) + y_cost(dy as f64)
            }
            Goal::Aabb { min, max } => {
                let clamped = BlockPos::new(
                    pos.x.clamp(min.x, max.x),
                    pos.y.clamp(min.y, max.y),
                    pos.z.clamp(min.z, max.z),
                );
                travel_cost(pos, clamped)
            }
            Goal::Composite(children) => children
                .iter()
                .map(|g| g.heuristic(pos))
                .fold(f64::INFINITY, f64::min),
            Goal::And(children) => children.iter().map(|g| g.heuristic(pos)).sum(),
            Goal::Inverted(inner) => {
                if inner.is_end(pos) {
                    f64::INFINITY
                } else {
                    0.0
                }
            }
            Goal::Follow { target, .. } => travel_cost(pos, *target),
            Goal::BlockSide {
                pos: goal,
                dx,
                dz,
                buffer,
            } => {
                let s = ((pos.x - goal.x) * dx + (pos.z - goal.z) * dz) as f64;
                (buffer - s).max(0.0) * HEURISTIC_XZ_COST
            }
            Goal::Chunk { chunk } => {
                let center_x = chunk.x * SECTION_SIZE + SECTION_SIZE / 2;
                let center_z = chunk.z * SECTION_SIZE + SECTION_SIZE / 2;
                let dx = ((center_x - pos.x).abs() - SECTION_SIZE / 2).max(0) as f64;
                let dz = ((center_z - pos.z).abs() - SECTION_SIZE / 2).max(0) as f64;
                xz_cost(dx, dz)
            }
            Goal::DirectionXz { x, z } => xz_cost((x - pos.x) as f64, (z - pos.z) as f64),
            Goal::RunAway { points, min_dist: _ } => {
                -points.iter().map(|p| p.dist_to(pos)).sum::<f64>() * HEURISTIC_XZ_COST
            }
            Goal::RunAwayFromEntities {
                positions,
                xz_only,
                ..
            } => {
                let total: f64 = positions
                    .iter()
                    .map(|p| {
                        if *xz_only {
                            p.dist_xz_to(pos)
                        } else {
                            p.dist_to(pos)
                        }
                    })
                    .sum();
                -total * HEURISTIC_XZ_COST
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_goal_zero_at_target() {
        let goal = Goal::Block {
            pos: BlockPos::new(5, 64, 0),
        };
        assert!(goal.is_end(BlockPos::new(5, 64, 0)));
        assert_eq!(goal.heuristic(BlockPos::new(5, 64, 0)), 0.0);
        assert!(goal.heuristic(BlockPos::new(0, 64, 0)) > 0.0);
    }

    #[test]
    fn test_heuristic_underestimates_straight_walk() {
        // 6-block straight walk costs 6 * WALK; heuristic must not exceed it
        let goal = Goal::Block {
            pos: BlockPos::new(6, 64, 0),
        };
        let h = goal.heuristic(BlockPos::new(0, 64, 0));
        assert!(h <= 6.0 * crate::pathfinding::moves::costs::WALK_ONE_BLOCK_COST);
    }

    #[test]
    fn test_composite_takes_min() {
        let goal = Goal::composite(vec![
            Goal::Block {
                pos: BlockPos::new(100, 64, 0),
            },
            Goal::Block {
                pos: BlockPos::new(2, 64, 0),
            },
        ])
        .unwrap();
        let near = Goal::Block {
            pos: BlockPos::new(2, 64, 0),
        }
        .heuristic(BlockPos::ZERO);
        assert_eq!(goal.heuristic(BlockPos::ZERO), near);
        assert!(goal.is_end(BlockPos::new(100, 64, 0)));
    }

    #[test]
    fn test_and_sums_children() {
        let a = Goal::Xz { x: 3, z: 0 };
        let b = Goal::YLevel { y: 70 };
        let and = Goal::and(vec![a.clone(), b.clone()]).unwrap();
        let p = BlockPos::new(0, 64, 0);
        assert_eq!(and.heuristic(p), a.heuristic(p) + b.heuristic(p));
        assert!(!and.is_end(BlockPos::new(3, 64, 0)));
        assert!(and.is_end(BlockPos::new(3, 70, 0)));
    }

    #[test]
    fn test_empty_composites_are_invalid() {
        assert!(matches!(
            Goal::composite(vec![]),
            Err(NavigatorError::InvalidInput(_))
        ));
        assert!(matches!(Goal::and(vec![]), Err(NavigatorError::InvalidInput(_))));
    }

    #[test]
    fn test_zero_direction_is_invalid() {
        assert!(matches!(
            Goal::direction_xz(BlockPos::ZERO, 0, 0),
            Err(NavigatorError::InvalidInput(_))
        ));
        assert!(Goal::direction_xz(BlockPos::ZERO, 1, 0).is_ok());
    }

    #[test]
    fn test_inverted_forces_movement() {
        let inner = Goal::Near {
            center: BlockPos::new(0, 64, 0),
            radius: 5.0,
        };
        let goal = Goal::Inverted(Box::new(inner));
        assert!(!goal.is_end(BlockPos::new(0, 64, 0)));
        assert!(goal.heuristic(BlockPos::new(0, 64, 0)).is_infinite());
        assert!(goal.is_end(BlockPos::new(10, 64, 0)));
        assert_eq!(goal.heuristic(BlockPos::new(10, 64, 0)), 0.0);
    }

    #[test]
    fn test_run_away_heuristic_strictly_decreases_with_distance() {
        let goal = Goal::run_away_from_entities(vec![BlockPos::new(0, 64, 0)], 16.0, false)
            .unwrap();
        assert!(!goal.is_end(BlockPos::new(0, 64, 0)));
        assert!(goal.is_end(BlockPos::new(50, 64, 50)));

        let mut last = goal.heuristic(BlockPos::new(0, 64, 0));
        for step in 1..20 {
            let h = goal.heuristic(BlockPos::new(step * 3, 64, step * 3));
            assert!(h < last, "heuristic must fall along the escape");
            last = h;
        }
    }

    #[test]
    fn test_follow_advance_is_the_only_mutation() {
        let mut goal = Goal::follow(7, 3.0, BlockPos::new(10, 64, 0));
        // Small wiggle below a block does not trigger a replan
        assert!(!goal.advance(BlockPos::new(10, 64, 0)));
        assert!(goal.advance(BlockPos::new(14, 64, 0)));
        assert!(goal.is_end(BlockPos::new(13, 64, 1)));

        // Pure reads do not change the target
        let before = goal.clone();
        let _ = goal.heuristic(BlockPos::ZERO);
        let _ = goal.is_end(BlockPos::ZERO);
        assert_eq!(goal, before);
    }

    #[test]
    fn test_get_to_block_adjacency() {
        let goal = Goal::GetToBlock {
            pos: BlockPos::new(5, 64, 5),
        };
        assert!(goal.is_end(BlockPos::new(4, 64, 5)));
        assert!(goal.is_end(BlockPos::new(5, 63, 5)));
        assert!(goal.is_end(BlockPos::new(6, 65, 6)));
        assert!(!goal.is_end(BlockPos::new(3, 64, 5)));
    }

    #[test]
    fn test_chunk_goal() {
        let goal = Goal::Chunk {
            chunk: ChunkPos::new(2, -1),
        };
        assert!(goal.is_end(BlockPos::new(33, 64, -16)));
        assert!(!goal.is_end(BlockPos::new(31, 64, -16)));
        assert_eq!(goal.heuristic(BlockPos::new(40, 64, -8)), 0.0);
    }
}
