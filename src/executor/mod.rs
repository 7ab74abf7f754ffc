/// Path executor: walks the smoothed path one movement at a time
///
/// The executor never mutates the path; it owns a cursor and the per-step
/// movement state machine. A `Success` advances the cursor, `Unreachable`
/// or `Failed` clears the path and asks the planner to replan from the
/// agent's current position. Leaving the current movement's valid voxel
/// set counts as a failure.
pub mod movement;

use bevy::log::{debug, info, warn};
use bevy::prelude::Resource;

use crate::blocks::BlockPropertyTable;
use crate::pathfinding::moves::valid_positions;
use crate::pathfinding::path::NavPath;
use crate::types::BlockPos;
use crate::world::adapter::GameAdapter;

pub use movement::{MoveExecution, MovementStatus};

/// Default per-step tick allowance before a step counts as unreachable
pub const DEFAULT_STEP_TIMEOUT_TICKS: u32 = 400;

/// What the executor did this tick
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutorOutcome {
    /// No path installed
    Idle,
    /// Executing the current step
    Moving,
    /// The whole path completed this tick
    Finished,
    /// The path was abandoned; replan from the agent's position
    RequestReplan(String),
}

#[derive(Resource)]
pub struct PathExecutor {
    path: Option<NavPath>,
    execution: MoveExecution,
    /// Source voxel of the step in flight (for the valid-position check)
    step_origin: BlockPos,
    pub step_timeout_ticks: u32,
    pub sprint: bool,
    /// Paths completed since startup (metrics)
    pub paths_completed: u64,
}

impl Default for PathExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl PathExecutor {
    pub fn new() -> Self {
        Self {
            path: None,
            execution: MoveExecution::new(),
            step_origin: BlockPos::ZERO,
            step_timeout_ticks: DEFAULT_STEP_TIMEOUT_TICKS,
            sprint: true,
            paths_completed: 0,
        }
    }

    pub fn has_path(&self) -> bool {
        self.path.is_some()
    }

    pub fn path(&self) -> Option<&NavPath> {
        self.path.as_ref()
    }

    /// Install a fresh path; the cursor skips the origin step
    pub fn set_path(&mut self, mut path: NavPath) {
        self.step_origin = path.start();
        path.advance();
        debug!(
            "🛤️ Executor took a path: {} → {} ({} steps)",
            path.start(),
            path.end(),
            path.len()
        );
        self.path = Some(path);
        self.execution.reset();
    }

    /// Drop the current path (cancellation)
    pub fn clear(&mut self, adapter: &mut dyn GameAdapter) {
        if self.path.take().is_some() {
            adapter.stop_moving();
        }
        self.execution.reset();
    }

    /// Run the current movement for one tick
    pub fn tick(
        &mut self,
        adapter: &mut dyn GameAdapter,
        table: &BlockPropertyTable,
    ) -> ExecutorOutcome {
        let Some(path) = self.path.as_mut() else {
            return ExecutorOutcome::Idle;
        };

        if path.is_complete() {
            adapter.stop_moving();
            self.path = None;
            self.paths_completed += 1;
            info!("🏁 Path complete");
            return ExecutorOutcome::Finished;
        }

        let step = match path.current_step() {
            Some(step) => step.clone(),
            None => {
                self.path = None;
                return ExecutorOutcome::Idle;
            }
        };

        // Interruption detection: the agent must stay inside the current
        // movement's occupied-voxel set
        let agent = adapter.self_block_pos();
        let valid = valid_positions(self.step_origin, step.pos);
        if !valid.contains(&agent) {
            warn!(
                "🚷 Agent at {} left the movement's valid positions - replanning",
                agent
            );
            self.path = None;
            self.execution.reset();
            adapter.stop_moving();
            return ExecutorOutcome::RequestReplan("left movement voxels".to_string());
        }

        match self
            .execution
            .execute(adapter, table, &step, self.sprint, self.step_timeout_ticks)
        {
            MovementStatus::Success => {
                self.step_origin = step.pos;
                path.advance();
                self.execution.reset();
                if path.is_complete() {
                    adapter.stop_moving();
                    self.path = None;
                    self.paths_completed += 1;
                    info!("🏁 Path complete");
                    return ExecutorOutcome::Finished;
                }
                ExecutorOutcome::Moving
            }
            MovementStatus::Prepping | MovementStatus::Waiting | MovementStatus::Running => {
                ExecutorOutcome::Moving
            }
            MovementStatus::Unreachable => {
                self.path = None;
                self.execution.reset();
                adapter.stop_moving();
                ExecutorOutcome::RequestReplan("movement unreachable".to_string())
            }
            MovementStatus::Failed => {
                self.path = None;
                self.execution.reset();
                adapter.stop_moving();
                ExecutorOutcome::RequestReplan("movement failed".to_string())
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
    use crate::pathfinding::path::PathStep;
    use crate::world::sandbox::SandboxWorld;
    use bevy::math::Vec3;

    fn straight_path(xs: &[i32]) -> NavPath {
        NavPath::new(
            xs.iter()
                .map(|x| PathStep::at(BlockPos::new(*x, 64, 0)))
                .collect(),
        )
    }

    #[test]
    fn test_executor_walks_whole_path() {
        let mut world = SandboxWorld::flat(16, 63);
        let table = world.table().clone();
        let mut executor = PathExecutor::new();
        executor.set_path(straight_path(&[0, 1, 2, 3]));

        let mut finished = false;
        for _ in 0..300 {
            match executor.tick(&mut world, &table) {
                ExecutorOutcome::Finished => {
                    finished = true;
                    break;
                }
                ExecutorOutcome::RequestReplan(reason) => panic!("unexpected replan: {}", reason),
                _ => {}
            }
            world.step();
        }
        assert!(finished);
        assert_eq!(world.self_block_pos(), BlockPos::new(3, 64, 0));
        assert_eq!(executor.paths_completed, 1);
    }

    #[test]
    fn test_leaving_valid_positions_requests_replan() {
        let mut world = SandboxWorld::flat(16, 63);
        let table = world.table().clone();
        let mut executor = PathExecutor::new();
        executor.set_path(straight_path(&[0, 1, 2]));

        // Knock the agent far off the route
        world.teleport_agent(Vec3::new(10.5, 64.0, 10.5));
        let outcome = executor.tick(&mut world, &table);
        assert!(matches!(outcome, ExecutorOutcome::RequestReplan(_)));
        assert!(!executor.has_path());
    }

    #[test]
    fn test_idle_without_path() {
        let mut world = SandboxWorld::flat(16, 63);
        let table = world.table().clone();
        let mut executor = PathExecutor::new();
        assert_eq!(executor.tick(&mut world, &table), ExecutorOutcome::Idle);
    }
}
