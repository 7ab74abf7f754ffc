/// The executable path that leaves the planner
///
/// A path is a sequence of steps from the search origin to the goal. Each
/// step carries the movement that reaches it plus the blocks that must be
/// broken or placed first. The executor owns a cursor over the steps; the
/// path itself is immutable once built.
use crate::pathfinding::moves::MoveKind;
use crate::types::BlockPos;

#[derive(Debug, Clone, PartialEq)]
pub struct PathStep {
    pub pos: BlockPos,
    /// Movement that arrives at `pos`; `None` for the origin step
    pub kind: Option<MoveKind>,
    pub to_break: Vec<BlockPos>,
    pub to_place: Vec<BlockPos>,
    /// Accumulated cost from the origin
    pub g: f64,
}

impl PathStep {
    /// A bare positional step (origin, tests, smoothing survivors)
    pub fn at(pos: BlockPos) -> Self {
        Self {
            pos,
            kind: None,
            to_break: Vec::new(),
            to_place: Vec::new(),
            g: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavPath {
    steps: Vec<PathStep>,
    current: usize,
}

impl NavPath {
    /// Build a path; `steps` must be non-empty and start at the origin
    pub fn new(steps: Vec<PathStep>) -> Self {
        debug_assert!(!steps.is_empty(), "a path always has its origin step");
        Self { steps, current: 0 }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn start(&self) -> BlockPos {
        self.steps[0].pos
    }

    pub fn end(&self) -> BlockPos {
        self.steps[self.steps.len() - 1].pos
    }

    /// Total planned cost (the last step's g)
    pub fn cost(&self) -> f64 {
        self.steps.last().map(|s| s.g).unwrap_or(0.0)
    }

    pub fn positions(&self) -> impl Iterator<Item = BlockPos> + '_ {
        self.steps.iter().map(|s| s.pos)
    }

    // --- executor cursor ----------------------------------------------------

    /// The step currently being executed (`None` once complete)
    pub fn current_step(&self) -> Option<&PathStep> {
        self.steps.get(self.current)
    }

    /// The step after the current one
    pub fn next_step(&self) -> Option<&PathStep> {
        self.steps.get(self.current + 1)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn advance(&mut self) {
        if self.current < self.steps.len() {
            self.current += 1;
        }
    }

    pub fn is_complete(&self) -> bool {
        self.current >= self.steps.len()
    }

    pub fn remaining(&self) -> &[PathStep] {
        &self.steps[self.current.min(self.steps.len())..]
    }
}
