/// Time-sliced, cost-aware, incremental A*
///
/// One planner instance owns one search session at a time. `compute` runs
/// until its slice budget expires, then returns `Partial` with the best
/// approach seen so far; the next call resumes the same session. Session
/// state (arena, open set, best-so-far) lives on the instance and is
/// dropped whenever a new goal is set, the search is cancelled, or a
/// result is returned.
use bevy::log::{debug, info, warn};
use bevy::prelude::Resource;
use std::collections::HashSet;

use crate::pathfinding::context::CalculationContext;
use crate::pathfinding::goals::Goal;
use crate::pathfinding::heap::OpenSet;
use crate::pathfinding::moves::{self, MoveCandidate};
use crate::pathfinding::node::NodeArena;
use crate::pathfinding::path::{NavPath, PathStep};
use crate::types::{BlockPos, ChunkPos};
use crate::util::{ScratchPool, Stopwatch};

/// Default per-slice budget in milliseconds
pub const DEFAULT_SLICE_BUDGET_MS: f64 = 5.0;

/// Default cumulative budget before the search settles for a usable
/// best-so-far approach
pub const DEFAULT_PRIMARY_TIMEOUT_MS: f64 = 500.0;

/// Default cumulative budget before a search that produced no approach at
/// all gives up with `NoPath`
pub const DEFAULT_FAILURE_TIMEOUT_MS: f64 = 2000.0;

/// Search outcome; even the degraded variants carry the best-so-far
/// approach path when one exists
#[derive(Debug, Clone, PartialEq)]
pub enum PathResult {
    Success(NavPath),
    Partial(NavPath),
    Timeout(NavPath),
    NoPath,
}

impl PathResult {
    pub fn path(&self) -> Option<&NavPath> {
        match self {
            PathResult::Success(p) | PathResult::Partial(p) | PathResult::Timeout(p) => Some(p),
            PathResult::NoPath => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PathResult::Partial(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Idle,
    Running,
    Finished,
}

/// Search counters, reset per session
#[derive(Debug, Default, Clone, Copy)]
pub struct PlannerMetrics {
    pub nodes_popped: u64,
    pub nodes_considered: u64,
    pub slices: u64,
}

#[derive(Resource)]
pub struct Planner {
    goal: Option<Goal>,
    start: BlockPos,

    arena: NodeArena,
    open: OpenSet,
    best_index: Option<u32>,
    best_h: f64,
    visited_chunks: HashSet<ChunkPos>,
    cumulative: Stopwatch,
    state: SessionState,
    last_result: Option<PathResult>,
    pool: ScratchPool<MoveCandidate>,

    /// Cumulative budget; elapsing with a usable approach yields `Timeout`
    pub primary_timeout_ms: f64,
    /// Cumulative budget; elapsing with NO approach yields `NoPath`
    pub failure_timeout_ms: f64,
    pub metrics: PlannerMetrics,
}

impl Default for Planner {
    fn default() -> Self {
        Self::new()
    }
}

impl Planner {
    pub fn new() -> Self {
        Self {
            goal: None,
            start: BlockPos::ZERO,
            arena: NodeArena::new(),
            open: OpenSet::new(),
            best_index: None,
            best_h: f64::INFINITY,
            visited_chunks: HashSet::new(),
            cumulative: Stopwatch::new(),
            state: SessionState::Idle,
            last_result: None,
            pool: ScratchPool::new(),
            primary_timeout_ms: DEFAULT_PRIMARY_TIMEOUT_MS,
            failure_timeout_ms: DEFAULT_FAILURE_TIMEOUT_MS,
            metrics: PlannerMetrics::default(),
        }
    }

    pub fn goal(&self) -> Option<&Goal> {
        self.goal.as_ref()
    }

    pub fn start(&self) -> BlockPos {
        self.start
    }

    pub fn is_planning(&self) -> bool {
        self.state == SessionState::Running
    }

    pub fn is_finished(&self) -> bool {
        self.state == SessionState::Finished
    }

    pub fn last_result(&self) -> Option<&PathResult> {
        self.last_result.as_ref()
    }

    /// Chunks touched by the current session's expansions
    pub fn visited_chunks(&self) -> &HashSet<ChunkPos> {
        &self.visited_chunks
    }

    /// Install a goal and search origin, discarding any session in flight
    pub fn set_goal(&mut self, goal: Goal, start: BlockPos) {
        debug!("🧭 Planner goal set from {}", start);
        self.goal = Some(goal);
        self.start = start;
        self.reset_session();
    }

    /// Keep the goal but restart the search from a new origin (replan)
    pub fn replan_from(&mut self, start: BlockPos) {
        debug!("🧭 Planner replanning from {}", start);
        self.start = start;
        self.reset_session();
    }

    /// Cancel the session and drop the goal. Immediate and synchronous:
    /// all partial search state is discarded here.
    pub fn cancel(&mut self) {
        self.goal = None;
        self.reset_session();
    }

    fn reset_session(&mut self) {
        self.arena.clear();
        self.open = OpenSet::new();
        self.best_index = None;
        self.best_h = f64::INFINITY;
        self.visited_chunks.clear();
        self.cumulative.reset();
        self.state = SessionState::Idle;
        self.last_result = None;
        self.metrics = PlannerMetrics::default();
    }

    /// Run one slice of the search within `slice_budget_ms`.
    ///
    /// Returns `Partial` when the slice expires with the frontier alive; a
    /// later call resumes. `Success`, `Timeout`, and `NoPath` are terminal:
    /// repeated calls on a finished session return the same result.
    pub fn compute(&mut self, ctx: &mut CalculationContext, slice_budget_ms: f64) -> PathResult {
        if self.state == SessionState::Finished {
            return self.last_result.clone().unwrap_or(PathResult::NoPath);
        }
        let Some(goal) = self.goal.clone() else {
            return PathResult::NoPath;
        };

        let slice = crate::util::TimerReal::new();
        self.cumulative.start();
        self.metrics.slices += 1;

        if self.state == SessionState::Idle {
            let h = ctx.heuristic(&goal, self.start);
            if h.is_nan() {
                warn!("🚫 Planner rejected goal: NaN heuristic at start {}", self.start);
                return self.finish(PathResult::NoPath);
            }
            let index = self.arena.insert(self.start, 0.0, h);
            self.open.push(&mut self.arena, index);
            self.best_index = Some(index);
            self.best_h = h;
            self.state = SessionState::Running;
        }

        loop {
            // Budget checks sit at expansion boundaries, never inside a
            // primitive's cost evaluation. The primary timeout settles for
            // the best-so-far approach when one exists; a search that has
            // produced no approach keeps running until the failure timeout,
            // which gives up outright. A usable approach is never discarded
            // by either budget, whatever their relative values.
            let cumulative_ms = self.cumulative.elapsed_ms();
            if cumulative_ms >= self.primary_timeout_ms.min(self.failure_timeout_ms) {
                let best = self.best_path();
                if best.len() > 1 {
                    info!(
                        "⌛ Planner timeout after {} nodes - settling for best-so-far",
                        self.metrics.nodes_popped
                    );
                    return self.finish(PathResult::Timeout(best));
                }
                if cumulative_ms >= self.failure_timeout_ms {
                    info!("⌛ Planner failure timeout with no approach - giving up");
                    return self.finish(PathResult::NoPath);
                }
            }
            if slice.elapsed_ms() >= slice_budget_ms {
                self.cumulative.stop();
                return PathResult::Partial(self.best_path());
            }

            let Some(current) = self.open.pop(&mut self.arena) else {
                debug!(
                    "🚫 Planner frontier empty after {} nodes - no path",
                    self.metrics.nodes_popped
                );
                return self.finish(PathResult::NoPath);
            };
            self.metrics.nodes_popped += 1;

            let (current_pos, current_g, current_h) = {
                let node = self.arena.node(current);
                (node.pos, node.g, node.h)
            };

            if goal.is_end(current_pos) {
                let path = self.reconstruct(current);
                info!(
                    "✅ Planner success: {} steps, cost {:.1} ticks, {} nodes considered",
                    path.len(),
                    path.cost(),
                    self.metrics.nodes_considered
                );
                return self.finish(PathResult::Success(path));
            }

            if current_h < self.best_h {
                self.best_h = current_h;
                self.best_index = Some(current);
            }

            let mut candidates = self.pool.take();
            moves::generate(ctx, current_pos, &mut candidates);
            for candidate in &candidates {
                self.metrics.nodes_considered += 1;
                let step = candidate.cost * ctx.favoring_multiplier(candidate.dest);
                let tentative_g = current_g + step;

                match self.arena.lookup(candidate.dest) {
                    Some(existing) => {
                        if self.arena.node(existing).g <= tentative_g {
                            continue;
                        }
                        let node = self.arena.node_mut(existing);
                        node.g = tentative_g;
                        node.parent = Some(current);
                        node.kind = Some(candidate.kind);
                        node.to_break = candidate.to_break.clone();
                        node.to_place = candidate.to_place.clone();
                        if self.open.contains(&self.arena, existing) {
                            self.open.update(&mut self.arena, existing);
                        } else {
                            self.open.push(&mut self.arena, existing);
                        }
                    }
                    None => {
                        let h = ctx.heuristic(&goal, candidate.dest);
                        let index = self.arena.insert(candidate.dest, tentative_g, h);
                        let node = self.arena.node_mut(index);
                        node.parent = Some(current);
                        node.kind = Some(candidate.kind);
                        node.to_break = candidate.to_break.clone();
                        node.to_place = candidate.to_place.clone();
                        self.open.push(&mut self.arena, index);
                    }
                }
                self.visited_chunks.insert(candidate.dest.chunk());
            }
            self.pool.put(candidates);
        }
    }

    fn finish(&mut self, result: PathResult) -> PathResult {
        self.cumulative.stop();
        self.state = SessionState::Finished;
        self.last_result = Some(result.clone());
        result
    }

    /// Best-so-far approach path (always at least the start node)
    fn best_path(&self) -> NavPath {
        match self.best_index {
            Some(index) => self.reconstruct(index),
            None => NavPath::new(vec![PathStep::at(self.start)]),
        }
    }

    fn reconstruct(&self, tip: u32) -> NavPath {
        let mut steps = Vec::new();
        let mut cursor = Some(tip);
        while let Some(index) = cursor {
            let node = self.arena.node(index);
            steps.push(PathStep {
                pos: node.pos,
                kind: node.kind,
                to_break: node.to_break.clone(),
                to_place: node.to_place.clone(),
                g: node.g,
            });
            cursor = node.parent;
        }
        steps.reverse();
        NavPath::new(steps)
    }
}

// ============================================================================
// TESTS
// ============================================================================
