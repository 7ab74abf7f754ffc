/// High-level behaviors: priority-arbitrated processes owning the planner
///
/// A process is a capability record behind a four-method interface:
/// activate, deactivate, tick, priority. Each concrete process keeps a
/// small internal state machine and reports one verdict per tick - keep
/// pathing, set a new goal, wait, complete, or fail. At most one process
/// is active at a time; the scheduler arbitrates by priority.
pub mod build;
pub mod combat;
pub mod explore;
pub mod farm;
pub mod follow;
pub mod gather;
pub mod mine;
pub mod scheduler;

use crate::behavior::BehaviorStack;
use crate::blocks::BlockPropertyTable;
use crate::events::TrackerManager;
use crate::pathfinding::goals::Goal;
use crate::world::adapter::GameAdapter;
use crate::world::chunk_cache::ChunkCache;

pub use build::{BuildProcess, BuildTarget};
pub use combat::{CombatMode, CombatProcess};
pub use explore::{ExploreMode, ExploreProcess};
pub use farm::FarmProcess;
pub use follow::FollowProcess;
pub use gather::GatherProcess;
pub use mine::MineProcess;
pub use scheduler::{ProcessScheduler, SchedulerCommand};

/// Scheduler arbitration priority; higher wins
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Low,
    Normal,
    High,
}

/// Process lifecycle as the scheduler sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Idle,
    Active,
    Paused,
    Complete,
    Failed,
}

/// One tick's verdict from the active process
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessTick {
    /// Leave planner state unchanged
    ContinuePathing,
    /// Replace the planner goal
    NewGoal(Goal),
    /// Stop pathing this tick, stay active
    Wait(String),
    /// Done; deactivate with a status message
    Complete(String),
    /// Unrecoverable; deactivate with a status message
    Fail(String),
}

/// Everything a process may consult or actuate during its tick
pub struct ProcessCtx<'a> {
    pub adapter: &'a mut dyn GameAdapter,
    pub trackers: &'a TrackerManager,
    pub stack: &'a BehaviorStack,
    pub table: &'a BlockPropertyTable,
    pub cache: &'a mut ChunkCache,
    pub tick: u64,
    /// The planner reported NoPath or Timeout for the current goal
    pub path_unreachable: bool,
    /// The executor is currently carrying a path
    pub executing_path: bool,
}

impl<'a> ProcessCtx<'a> {
    pub fn self_pos(&self) -> crate::types::BlockPos {
        self.adapter.self_block_pos()
    }
}

/// The capability interface every behavior implements
pub trait Process: Send + Sync {
    fn name(&self) -> &'static str;
    fn priority(&self) -> Priority;
    fn on_activate(&mut self) {}
    fn on_deactivate(&mut self) {}
    fn tick(&mut self, ctx: &mut ProcessCtx) -> ProcessTick;
}
