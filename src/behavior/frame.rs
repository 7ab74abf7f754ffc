/// One frame of behavior preference state
///
/// Frames are plain data: predicates are tagged records rather than
/// closures so a frame can be serialized, inspected, and replayed.
/// Predicate vectors evaluate in insertion order and short-circuit on the
/// first hit; heuristic modifiers compose left-to-right.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::types::BlockPos;
use crate::world::adapter::{EntityId, GameEntity};

/// Tagged position predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PositionPredicate {
    Exact(BlockPos),
    Box { min: BlockPos, max: BlockPos },
    Radius { center: BlockPos, radius: f64 },
}

impl PositionPredicate {
    pub fn matches(&self, pos: BlockPos) -> bool {
        match self {
            PositionPredicate::Exact(p) => *p == pos,
            PositionPredicate::Box { min, max } => {
                pos.x >= min.x
                    && pos.x <= max.x
                    && pos.y >= min.y
                    && pos.y <= max.y
                    && pos.z >= min.z
                    && pos.z <= max.z
            }
            PositionPredicate::Radius { center, radius } => center.dist_to(pos) <= *radius,
        }
    }
}

/// Entities a behavior must ignore (follow targets, combat exclusions)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityExclusion {
    ById(EntityId),
    ByName(String),
}

impl EntityExclusion {
    pub fn matches(&self, entity: &GameEntity) -> bool {
        match self {
            EntityExclusion::ById(id) => entity.id == *id,
            EntityExclusion::ByName(name) => entity.name == *name,
        }
    }
}

/// Force a specific inventory item when digging a given block kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolPreference {
    pub block_kind: String,
    pub item_name: String,
}

/// Tagged heuristic adjustment, applied left-to-right over the goal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HeuristicModifier {
    /// Multiply the heuristic by a constant
    Scale(f64),
    /// Flat penalty for every block above a Y level
    PenalizeAbove { y: i32, penalty: f64 },
    /// Flat penalty inside a radius around a point
    PenalizeNear {
        center: BlockPos,
        radius: f64,
        penalty: f64,
    },
}

impl HeuristicModifier {
    pub fn apply(&self, pos: BlockPos, h: f64) -> f64 {
        match self {
            HeuristicModifier::Scale(factor) => h * factor,
            HeuristicModifier::PenalizeAbove { y, penalty } => {
                if pos.y > *y {
                    h + penalty * (pos.y - y) as f64
                } else {
                    h
                }
            }
            HeuristicModifier::PenalizeNear {
                center,
                radius,
                penalty,
            } => {
                if center.dist_to(pos) <= *radius {
                    h + penalty
                } else {
                    h
                }
            }
        }
    }
}

/// The full preference record copied on stack push
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorFrame {
    // Flags
    pub escape_lava: bool,
    pub swim_through_lava: bool,
    pub allow_sprint: bool,
    pub allow_parkour: bool,
    pub allow_break: bool,
    pub allow_place: bool,
    pub allow_swim: bool,
    pub allow_climb: bool,
    pub allow_water_bucket: bool,

    // Numeric knobs (all costs in ticks)
    pub follow_distance: f64,
    pub follow_give_up_distance: f64,
    pub block_break_penalty: f64,
    pub block_place_penalty: f64,
    pub jump_penalty: f64,
    pub max_fall_height: i32,
    pub max_fall_height_water: i32,

    // Sets
    pub protected_items: HashSet<String>,
    pub avoid_break_kinds: HashSet<String>,

    // Predicate vectors (insertion order, first hit wins)
    pub avoid_positions: Vec<PositionPredicate>,
    pub avoid_break_positions: Vec<PositionPredicate>,
    pub entity_exclusions: Vec<EntityExclusion>,
    pub tool_preferences: Vec<ToolPreference>,
    pub heuristic_modifiers: Vec<HeuristicModifier>,
}

impl Default for BehaviorFrame {
    fn default() -> Self {
        Self {
            escape_lava: true,
            swim_through_lava: false,
            allow_sprint: true,
            allow_parkour: false,
            allow_break: true,
            allow_place: true,
            allow_swim: true,
            allow_climb: true,
            allow_water_bucket: false,
            follow_distance: 3.0,
            follow_give_up_distance: 64.0,
            block_break_penalty: 20.0,
            block_place_penalty: 20.0,
            jump_penalty: 2.0,
            max_fall_height: 3,
            max_fall_height_water: 255,
            protected_items: HashSet::new(),
            avoid_break_kinds: HashSet::new(),
            avoid_positions: Vec::new(),
            avoid_break_positions: Vec::new(),
            entity_exclusions: Vec::new(),
            tool_preferences: Vec::new(),
            heuristic_modifiers: Vec::new(),
        }
    }
}

impl BehaviorFrame {
    pub fn is_position_avoided(&self, pos: BlockPos) -> bool {
        self.avoid_positions.iter().any(|p| p.matches(pos))
    }

    pub fn is_break_avoided(&self, pos: BlockPos) -> bool {
        self.avoid_break_positions.iter().any(|p| p.matches(pos))
    }

    pub fn is_entity_excluded(&self, entity: &GameEntity) -> bool {
        self.entity_exclusions.iter().any(|e| e.matches(entity))
    }

    pub fn is_item_protected(&self, name: &str) -> bool {
        self.protected_items.contains(name)
    }

    /// Forced item for a block kind, if any preference matches
    pub fn forced_tool(&self, block_kind: &str) -> Option<&str> {
        self.tool_preferences
            .iter()
            .find(|p| p.block_kind == block_kind)
            .map(|p| p.item_name.as_str())
    }

    /// Run the goal heuristic through every modifier, left to right
    pub fn modify_heuristic(&self, pos: BlockPos, h: f64) -> f64 {
        self.heuristic_modifiers
            .iter()
            .fold(h, |acc, modifier| modifier.apply(pos, acc))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_predicates() {
        let frame = BehaviorFrame {
            avoid_positions: vec![
                PositionPredicate::Exact(BlockPos::new(1, 64, 1)),
                PositionPredicate::Box {
                    min: BlockPos::new(10, 60, 10),
                    max: BlockPos::new(20, 70, 20),
                },
            ],
            ..Default::default()
        };
        assert!(frame.is_position_avoided(BlockPos::new(1, 64, 1)));
        assert!(frame.is_position_avoided(BlockPos::new(15, 65, 12)));
        assert!(!frame.is_position_avoided(BlockPos::new(2, 64, 1)));
    }

    #[test]
    fn test_heuristic_modifiers_compose_left_to_right() {
        let frame = BehaviorFrame {
            heuristic_modifiers: vec![
                HeuristicModifier::Scale(2.0),
                HeuristicModifier::PenalizeAbove { y: 64, penalty: 5.0 },
            ],
            ..Default::default()
        };
        // Scale first, then the flat penalty: 10*2 + 5*2 = 30 at y=66
        let h = frame.modify_heuristic(BlockPos::new(0, 66, 0), 10.0);
        assert_eq!(h, 30.0);

        // Reversed order gives a different result, so order matters
        let reversed = BehaviorFrame {
            heuristic_modifiers: vec![
                HeuristicModifier::PenalizeAbove { y: 64, penalty: 5.0 },
                HeuristicModifier::Scale(2.0),
            ],
            ..Default::default()
        };
        assert_eq!(reversed.modify_heuristic(BlockPos::new(0, 66, 0), 10.0), 40.0);
    }

    #[test]
    fn test_frame_round_trips_through_ron() {
        let frame = BehaviorFrame {
            avoid_positions: vec![PositionPredicate::Radius {
                center: BlockPos::new(0, 64, 0),
                radius: 5.0,
            }],
            ..Default::default()
        };
        let text = ron::to_string(&frame).unwrap();
        let back: BehaviorFrame = ron::from_str(&text).unwrap();
        assert_eq!(back, frame);
    }
}
