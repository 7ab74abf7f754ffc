/// Pathfinding: the cost-aware, time-sliced A* core and everything it
/// consumes - the open-set heap, the node arena, the calculation context,
/// movement primitives, goals, favoring, and the path smoother.
pub mod astar;
pub mod context;
pub mod favoring;
pub mod goals;
pub mod heap;
pub mod moves;
pub mod node;
pub mod path;
pub mod smoothing;

pub use astar::{
    PathResult, Planner, PlannerMetrics, DEFAULT_FAILURE_TIMEOUT_MS, DEFAULT_PRIMARY_TIMEOUT_MS,
    DEFAULT_SLICE_BUDGET_MS,
};
pub use context::{CalculationContext, PlanSettings, ToolCache};
pub use favoring::{Avoidance, Favoring};
pub use goals::Goal;
pub use heap::OpenSet;
pub use moves::{MoveCandidate, MoveKind};
pub use node::{NodeArena, PathNode};
pub use path::{NavPath, PathStep};
pub use smoothing::smooth_path;
