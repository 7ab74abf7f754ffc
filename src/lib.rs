pub mod behavior;
pub mod blocks;
pub mod config;
pub mod errors;
pub mod events;
pub mod executor;
pub mod pathfinding;
pub mod processes;
pub mod simulation;
pub mod types;
pub mod util;
pub mod world;

pub use behavior::{BehaviorFrame, BehaviorStack};
pub use blocks::{sandbox_registry, sandbox_table, BlockKindId, BlockPropertyTable, Passability};
pub use config::NavigatorConfig;
pub use errors::{NavigatorError, Result};
pub use events::{EventBus, TrackerManager};
pub use executor::{ExecutorOutcome, MovementStatus, PathExecutor};
pub use pathfinding::{
    smooth_path, CalculationContext, Favoring, Goal, MoveKind, NavPath, PathResult, Planner,
    ToolCache,
};
pub use processes::{
    BuildProcess, CombatMode, CombatProcess, ExploreMode, ExploreProcess, FarmProcess,
    FollowProcess, GatherProcess, MineProcess, Priority, Process, ProcessScheduler, ProcessTick,
};
pub use simulation::{
    BlockTable, NavSet, NavigatorPlugin, SimulationTick, WorldHandle,
};
pub use types::{BlockPos, ChunkPos};
pub use world::{Block, GameAdapter, GameEntity, Item, SandboxWorld, WorldEvent};
