/// Favoring: additive cost multipliers biasing A*
///
/// Two contributors combine at each voxel: a corridor bonus (below 1) for
/// voxels within one block of the previous path, so replans hug the old
/// route instead of oscillating, and an avoidance repulsion (above 0) from
/// designated points, saturating at a cap. Recomputed on demand per replan;
/// deterministic for identical inputs.
use std::collections::HashMap;

use crate::pathfinding::path::NavPath;
use crate::types::BlockPos;

/// Strongest corridor discount at the tail of the previous path
const CORRIDOR_MAX_BONUS: f64 = 0.35;

/// Per-point repulsion saturation
const AVOIDANCE_CAP: f64 = 10.0;

/// One avoidance point with its repulsion weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Avoidance {
    pub center: BlockPos,
    pub weight: f64,
}

#[derive(Debug, Default)]
pub struct Favoring {
    /// Voxel hash → corridor factor (< 1.0)
    corridor: HashMap<i64, f64>,
    avoidances: Vec<Avoidance>,
}

impl Favoring {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the favoring state for one replan
    pub fn compute(previous_path: Option<&NavPath>, avoidances: Vec<Avoidance>) -> Self {
        let mut corridor = HashMap::new();
        if let Some(path) = previous_path {
            let len = path.len().max(1) as f64;
            for (index, step) in path.steps().iter().enumerate() {
                // Bonus deepens toward the path tail, where the agent will
                // rejoin the old route
                let factor = 1.0 - CORRIDOR_MAX_BONUS * ((index + 1) as f64 / len);
                for dx in -1..=1 {
                    for dy in -1..=1 {
                        for dz in -1..=1 {
                            let hash = step.pos.offset(dx, dy, dz).long_hash();
                            let entry = corridor.entry(hash).or_insert(1.0f64);
                            if factor < *entry {
                                *entry = factor;
                            }
                        }
                    }
                }
            }
        }
        Self {
            corridor,
            avoidances,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.corridor.is_empty() && self.avoidances.is_empty()
    }

    /// Cost multiplier at a voxel: corridor factor plus repulsion penalty
    pub fn multiplier(&self, pos: BlockPos) -> f64 {
        let mut value = self
            .corridor
            .get(&pos.long_hash())
            .copied()
            .unwrap_or(1.0);
        for avoidance in &self.avoidances {
            let dist = avoidance.center.dist_to(pos).max(0.5);
            value += (avoidance.weight / dist).min(AVOIDANCE_CAP);
        }
        value
    }
}

// ============================================================================
// TESTS
// ============================================================================
