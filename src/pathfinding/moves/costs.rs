/// Movement cost constants, all in game ticks
///
/// Derived from the agent's travel speeds (blocks per second at 20 ticks
/// per second). Heuristic constants deliberately under-estimate the real
/// move costs so goal heuristics stay admissible.

/// Walking one block: 20 / 4.317
pub const WALK_ONE_BLOCK_COST: f64 = 20.0 / 4.317;

/// Sprinting one block: 20 / 5.612
pub const SPRINT_ONE_BLOCK_COST: f64 = 20.0 / 5.612;

/// Wading one block through water: 20 / 2.2
pub const WALK_ONE_IN_WATER_COST: f64 = 20.0 / 2.2;

/// Swimming one block vertically: 20 / 1.8
pub const SWIM_ONE_BLOCK_COST: f64 = 20.0 / 1.8;

/// Climbing one block up a ladder or vine: 20 / 2.35
pub const LADDER_UP_ONE_COST: f64 = 20.0 / 2.35;

/// Sliding one block down a ladder or vine: 20 / 3.0
pub const LADDER_DOWN_ONE_COST: f64 = 20.0 / 3.0;

/// Extra ticks for the jump arc of a one-block ascend
pub const JUMP_ONE_BLOCK_COST: f64 = 2.0;

/// Center-to-center diagonal distance
pub const SQRT_2: f64 = std::f64::consts::SQRT_2;

/// Free-fall time for `blocks` of drop, from t = sqrt(2d/g) at g = 32 b/s²
pub fn fall_cost(blocks: i32) -> f64 {
    5.0 * (blocks.max(0) as f64).sqrt()
}

/// Heuristic tick cost per horizontal block (≤ every real horizontal move)
pub const HEURISTIC_XZ_COST: f64 = SPRINT_ONE_BLOCK_COST;

/// Heuristic tick cost per ascended block (≤ walk + jump)
pub const HEURISTIC_UP_COST: f64 = 4.0;

/// Heuristic tick cost per descended block (falls amortize very cheap)
pub const HEURISTIC_DOWN_COST: f64 = 1.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fall_cost_grows_sublinearly() {
        assert_eq!(fall_cost(0), 0.0);
        assert!(fall_cost(1) < fall_cost(4));
        assert!(fall_cost(4) < 2.0 * fall_cost(2));
    }

    #[test]
    fn test_heuristic_constants_underestimate_real_moves() {
        assert!(HEURISTIC_XZ_COST <= WALK_ONE_BLOCK_COST);
        assert!(HEURISTIC_XZ_COST <= SPRINT_ONE_BLOCK_COST + 1e-9);
        assert!(HEURISTIC_UP_COST <= WALK_ONE_BLOCK_COST + JUMP_ONE_BLOCK_COST);
    }
}
