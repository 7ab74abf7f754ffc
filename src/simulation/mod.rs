/// Navigation pipeline wiring
///
/// One Bevy plugin owns the per-tick ordering, which is invariant across
/// all behaviors:
///
/// # Execution Order
/// 1. Trackers  - sync the tick counter, dirty-mark trackers, dimension reset
/// 2. Events    - drain the adapter feed through the bridge and the bus
/// 3. Process   - tick the active process; interpret its verdict
/// 4. Planner   - run one A* slice within the tick budget
/// 5. Executor  - drive the current movement; request replans
/// 6. Controls  - hand the tick back to the host; metrics
pub mod tick;

use bevy::prelude::*;

use crate::behavior::{BehaviorStack, PositionPredicate};
use crate::blocks::BlockPropertyTable;
use crate::config::NavigatorConfig;
use crate::events::{drain_world_events, EventBus, TrackerManager};
use crate::executor::{ExecutorOutcome, PathExecutor};
use crate::pathfinding::favoring::{Avoidance, Favoring};
use crate::pathfinding::path::NavPath;
use crate::pathfinding::smoothing::smooth_path;
use crate::pathfinding::{CalculationContext, PathResult, Planner, ToolCache};
use crate::processes::{ProcessCtx, ProcessScheduler, SchedulerCommand};
use crate::world::adapter::GameAdapter;
use crate::world::chunk_cache::ChunkCache;
use crate::world::persistence::{load_cache, save_cache};

pub use tick::{every_n_ticks, log_tick_metrics, SimulationTick, TickMetrics};

/// Interval for the rolling metrics log line
const METRICS_LOG_INTERVAL_TICKS: u64 = 200;

/// The per-tick pipeline phases, executed strictly in this order
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum NavSet {
    Trackers,
    Events,
    Process,
    Planner,
    Executor,
    Controls,
}

/// The game adapter as a resource; created by the host at bootstrap
#[derive(Resource)]
pub struct WorldHandle(pub Box<dyn GameAdapter>);

impl WorldHandle {
    pub fn new(adapter: Box<dyn GameAdapter>) -> Self {
        Self(adapter)
    }

    pub fn get(&self) -> &dyn GameAdapter {
        self.0.as_ref()
    }

    pub fn get_mut(&mut self) -> &mut dyn GameAdapter {
        self.0.as_mut()
    }
}

/// The block property table as a resource; built once per world load
#[derive(Resource)]
pub struct BlockTable(pub BlockPropertyTable);

/// Favoring state for the current plan, rebuilt per goal change
#[derive(Resource, Default)]
pub struct FavoringState(pub Favoring);

/// The last successfully computed path, feeding the corridor bonus
#[derive(Resource, Default)]
pub struct PreviousPath(pub Option<NavPath>);

/// Plugin that installs the whole navigation pipeline.
///
/// The host inserts `WorldHandle`, `BlockTable`, and (optionally) a
/// `NavigatorConfig` before startup; everything else is created here.
pub struct NavigatorPlugin;

impl Plugin for NavigatorPlugin {
    fn build(&self, app: &mut App) {
        info!("🔌 NavigatorPlugin: installing navigation pipeline...");
        app.init_resource::<NavigatorConfig>()
            .init_resource::<SimulationTick>()
            .init_resource::<TickMetrics>()
            .init_resource::<EventBus>()
            .init_resource::<TrackerManager>()
            .init_resource::<ToolCache>()
            .init_resource::<BehaviorStack>()
            .init_resource::<ProcessScheduler>()
            .init_resource::<FavoringState>()
            .init_resource::<PreviousPath>()
            .configure_sets(
                Update,
                (
                    NavSet::Trackers,
                    NavSet::Events,
                    NavSet::Process,
                    NavSet::Planner,
                    NavSet::Executor,
                    NavSet::Controls,
                )
                    .chain(),
            )
            .add_systems(Startup, setup_navigator)
            .add_systems(Update, begin_tick_system.in_set(NavSet::Trackers))
            .add_systems(Update, drain_events_system.in_set(NavSet::Events))
            .add_systems(Update, process_tick_system.in_set(NavSet::Process))
            .add_systems(Update, planner_slice_system.in_set(NavSet::Planner))
            .add_systems(Update, executor_tick_system.in_set(NavSet::Executor))
            .add_systems(
                Update,
                (finish_tick_system, persist_cache_on_exit).in_set(NavSet::Controls),
            )
            .add_systems(
                Update,
                log_tick_metrics
                    .after(NavSet::Controls)
                    .run_if(every_n_ticks(METRICS_LOG_INTERVAL_TICKS)),
            );
        info!("✅ NavigatorPlugin: pipeline installed");
    }
}

/// Startup: build the config-sized resources and load any persisted cache
fn setup_navigator(mut commands: Commands, config: Res<NavigatorConfig>) {
    let mut cache = ChunkCache::with_cap(
        config.cache.floor_y,
        config.cache.ceiling_y,
        config.cache.column_cap,
    );
    if let Some(persistence) = &config.cache.persistence {
        match load_cache(
            &mut cache,
            std::path::Path::new(&persistence.base_dir),
            &persistence.world_name,
            persistence.server_addr.as_deref(),
        ) {
            Ok(columns) => info!("📂 Restored {} cached chunk columns", columns),
            Err(e) => warn!("⚠️ Cache restore failed, continuing in memory: {}", e),
        }
    }

    let mut planner = Planner::new();
    planner.primary_timeout_ms = config.planner.primary_timeout_ms;
    planner.failure_timeout_ms = config.planner.failure_timeout_ms;

    let mut executor = PathExecutor::new();
    executor.step_timeout_ticks = config.executor.step_timeout_ticks;
    executor.sprint = config.executor.sprint;

    commands.insert_resource(cache);
    commands.insert_resource(planner);
    commands.insert_resource(executor);
}

/// Trackers phase: mirror the game clock and dirty-mark every tracker
fn begin_tick_system(
    world: Res<WorldHandle>,
    mut tick: ResMut<SimulationTick>,
    mut trackers: ResMut<TrackerManager>,
    mut metrics: ResMut<TickMetrics>,
) {
    metrics.start_tick();
    tick.set(world.get().game_tick());
    trackers.begin_tick(world.get().dimension_id());
}

/// Events phase: drain the adapter through the bridge
fn drain_events_system(
    mut world: ResMut<WorldHandle>,
    mut bus: ResMut<EventBus>,
    mut cache: ResMut<ChunkCache>,
    table: Res<BlockTable>,
    mut trackers: ResMut<TrackerManager>,
    mut tools: ResMut<ToolCache>,
) {
    drain_world_events(
        world.get_mut(),
        &mut bus,
        &mut cache,
        &table.0,
        &mut trackers,
        &mut tools,
    );
}

/// Turn the behavior frame's avoidance predicates into favoring repulsors
fn avoidances_from_frame(stack: &BehaviorStack) -> Vec<Avoidance> {
    stack
        .top()
        .avoid_positions
        .iter()
        .map(|predicate| match predicate {
            PositionPredicate::Exact(pos) => Avoidance {
                center: *pos,
                weight: 2.0,
            },
            PositionPredicate::Radius { center, radius } => Avoidance {
                center: *center,
                weight: radius.max(2.0),
            },
            PositionPredicate::Box { min, max } => Avoidance {
                center: crate::types::BlockPos::new(
                    (min.x + max.x) / 2,
                    (min.y + max.y) / 2,
                    (min.z + max.z) / 2,
                ),
                weight: 2.0,
            },
        })
        .collect()
}

/// Process phase: tick the active process, interpret the verdict
#[allow(clippy::too_many_arguments)]
fn process_tick_system(
    mut scheduler: ResMut<ProcessScheduler>,
    mut world: ResMut<WorldHandle>,
    trackers: Res<TrackerManager>,
    stack: Res<BehaviorStack>,
    table: Res<BlockTable>,
    mut cache: ResMut<ChunkCache>,
    tick: Res<SimulationTick>,
    mut planner: ResMut<Planner>,
    mut executor: ResMut<PathExecutor>,
    mut favoring: ResMut<FavoringState>,
    previous: Res<PreviousPath>,
) {
    // NoPath, or a timeout that produced no usable approach, both mean the
    // process should give up on this goal
    let path_unreachable = planner.is_finished()
        && match planner.last_result() {
            Some(PathResult::NoPath) => true,
            Some(PathResult::Timeout(path)) => path.len() <= 1,
            _ => false,
        };
    let executing_path = executor.has_path();

    let command = {
        let mut ctx = ProcessCtx {
            adapter: world.get_mut(),
            trackers: &trackers,
            stack: &stack,
            table: &table.0,
            cache: &mut cache,
            tick: tick.get(),
            path_unreachable,
            executing_path,
        };
        scheduler.tick(&mut ctx)
    };

    match command {
        SchedulerCommand::SetGoal(goal) => {
            favoring.0 = Favoring::compute(previous.0.as_ref(), avoidances_from_frame(&stack));
            let start = world.get().self_block_pos();
            planner.set_goal(goal, start);
        }
        SchedulerCommand::StopPathing => {
            // Immediate, synchronous cancellation
            planner.cancel();
            executor.clear(world.get_mut());
        }
        SchedulerCommand::ContinuePathing | SchedulerCommand::None => {}
    }
}

/// Planner phase: one time-sliced A* step
#[allow(clippy::too_many_arguments)]
fn planner_slice_system(
    mut planner: ResMut<Planner>,
    world: Res<WorldHandle>,
    table: Res<BlockTable>,
    mut cache: ResMut<ChunkCache>,
    mut tools: ResMut<ToolCache>,
    favoring: Res<FavoringState>,
    stack: Res<BehaviorStack>,
    config: Res<NavigatorConfig>,
    mut executor: ResMut<PathExecutor>,
    mut previous: ResMut<PreviousPath>,
) {
    if planner.goal().is_none() || planner.is_finished() {
        return;
    }

    let mut ctx = CalculationContext::new(
        world.get(),
        &table.0,
        &mut cache,
        &mut tools,
        &favoring.0,
        stack.top(),
    );
    let result = planner.compute(&mut ctx, config.planner.slice_budget_ms);

    match result {
        PathResult::Success(path) => {
            let smoothed = smooth_path(&path, &mut ctx);
            previous.0 = Some(path);
            executor.set_path(smoothed);
        }
        PathResult::Timeout(path) if path.len() > 1 => {
            // Accept the best-so-far approach; the executor finishing it
            // will trigger a replan toward the goal
            let smoothed = smooth_path(&path, &mut ctx);
            previous.0 = Some(path);
            executor.set_path(smoothed);
        }
        PathResult::Partial(_) | PathResult::Timeout(_) | PathResult::NoPath => {}
    }
}

/// Executor phase: drive the current movement, route replan requests
fn executor_tick_system(
    mut executor: ResMut<PathExecutor>,
    mut world: ResMut<WorldHandle>,
    table: Res<BlockTable>,
    mut planner: ResMut<Planner>,
) {
    match executor.tick(world.get_mut(), &table.0) {
        ExecutorOutcome::RequestReplan(reason) => {
            debug!("🔁 Replanning: {}", reason);
            let start = world.get().self_block_pos();
            planner.replan_from(start);
        }
        ExecutorOutcome::Finished => {
            // A partial approach finished short of the goal: plan onward
            if let Some(goal) = planner.goal() {
                let pos = world.get().self_block_pos();
                if !goal.is_end(pos) {
                    planner.replan_from(pos);
                }
            }
        }
        ExecutorOutcome::Idle | ExecutorOutcome::Moving => {}
    }
}

/// Controls phase: hand the tick to the host and close the metrics window
fn finish_tick_system(mut world: ResMut<WorldHandle>, mut metrics: ResMut<TickMetrics>) {
    world.get_mut().host_tick();
    metrics.end_tick();
}

/// Save the chunk cache when the app shuts down
fn persist_cache_on_exit(
    mut exit: EventReader<AppExit>,
    cache: Res<ChunkCache>,
    config: Res<NavigatorConfig>,
) {
    if exit.is_empty() {
        return;
    }
    exit.clear();
    if let Some(persistence) = &config.cache.persistence {
        match save_cache(
            &cache,
            std::path::Path::new(&persistence.base_dir),
            &persistence.world_name,
            persistence.server_addr.as_deref(),
        ) {
            Ok(columns) => info!("💾 Persisted {} chunk columns on exit", columns),
            Err(e) => warn!("⚠️ Cache persist failed: {}", e),
        }
    }
}
