/// Behavior preference state: frames of flags, knobs, sets, and tagged
/// predicate records that pathfinding and the processes consult.
pub mod frame;
pub mod stack;

pub use frame::{
    BehaviorFrame, EntityExclusion, HeuristicModifier, PositionPredicate, ToolPreference,
};
pub use stack::BehaviorStack;
