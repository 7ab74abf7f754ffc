/// The process scheduler: a named registry with priority arbitration
///
/// Activation succeeds only when no strictly-higher-priority process is
/// active; the displaced process is deactivated first. The scheduler
/// interprets each tick verdict into a planner command and owns every
/// lifecycle transition.
use bevy::log::{debug, info, warn};
use bevy::prelude::Resource;

use super::{Lifecycle, Process, ProcessCtx, ProcessTick};
use crate::errors::{NavigatorError, Result};
use crate::pathfinding::goals::Goal;

/// What the planner should do after this scheduler tick
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerCommand {
    /// No active process
    None,
    /// Install a new goal and start pathing toward it
    SetGoal(Goal),
    /// Keep whatever the planner is doing
    ContinuePathing,
    /// Stop pathing this tick
    StopPathing,
}

struct Slot {
    process: Box<dyn Process>,
    lifecycle: Lifecycle,
}

#[derive(Resource, Default)]
pub struct ProcessScheduler {
    slots: Vec<Slot>,
    active: Option<usize>,
}

impl ProcessScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a process under its own name; duplicate names are invalid
    pub fn register(&mut self, process: Box<dyn Process>) -> Result<()> {
        if self.index_of(process.name()).is_some() {
            return Err(NavigatorError::invalid_input(format!(
                "process '{}' is already registered",
                process.name()
            )));
        }
        self.slots.push(Slot {
            process,
            lifecycle: Lifecycle::Idle,
        });
        Ok(())
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.process.name() == name)
    }

    pub fn lifecycle(&self, name: &str) -> Option<Lifecycle> {
        self.index_of(name).map(|i| self.slots[i].lifecycle)
    }

    pub fn active_name(&self) -> Option<&'static str> {
        self.active.map(|i| self.slots[i].process.name())
    }

    /// Activate a process by name. Fails (leaving all state unchanged)
    /// when a strictly-higher-priority process is currently active.
    pub fn activate(&mut self, name: &str) -> Result<()> {
        let index = self.index_of(name).ok_or_else(|| {
            NavigatorError::invalid_input(format!("unknown process '{}'", name))
        })?;

        if let Some(current) = self.active {
            if current == index {
                return Ok(());
            }
            if self.slots[current].process.priority() > self.slots[index].process.priority() {
                return Err(NavigatorError::interrupted(format!(
                    "'{}' outranks '{}'",
                    self.slots[current].process.name(),
                    name
                )));
            }
            self.deactivate_slot(current);
        }

        info!("▶️ Activating process '{}'", name);
        self.slots[index].lifecycle = Lifecycle::Active;
        self.slots[index].process.on_activate();
        self.active = Some(index);
        Ok(())
    }

    /// Deactivate whatever is active (cancellation path)
    pub fn deactivate_active(&mut self) {
        if let Some(index) = self.active.take() {
            self.deactivate_slot(index);
        }
    }

    fn deactivate_slot(&mut self, index: usize) {
        let slot = &mut self.slots[index];
        info!("⏹️ Deactivating process '{}'", slot.process.name());
        if matches!(slot.lifecycle, Lifecycle::Active | Lifecycle::Paused) {
            slot.lifecycle = Lifecycle::Idle;
        }
        slot.process.on_deactivate();
        if self.active == Some(index) {
            self.active = None;
        }
    }

    /// Pause the active process; it stays active but its ticks are skipped
    pub fn pause_active(&mut self) {
        if let Some(index) = self.active {
            self.slots[index].lifecycle = Lifecycle::Paused;
        }
    }

    pub fn resume_active(&mut self) {
        if let Some(index) = self.active {
            if self.slots[index].lifecycle == Lifecycle::Paused {
                self.slots[index].lifecycle = Lifecycle::Active;
            }
        }
    }

    /// Tick the active process and interpret its verdict
    pub fn tick(&mut self, ctx: &mut ProcessCtx) -> SchedulerCommand {
        let Some(index) = self.active else {
            return SchedulerCommand::None;
        };

        if self.slots[index].lifecycle == Lifecycle::Paused {
            debug!("⏸️ '{}' is paused", self.slots[index].process.name());
            return SchedulerCommand::StopPathing;
        }

        let verdict = self.slots[index].process.tick(ctx);
        match verdict {
            ProcessTick::NewGoal(goal) => SchedulerCommand::SetGoal(goal),
            ProcessTick::ContinuePathing => SchedulerCommand::ContinuePathing,
            ProcessTick::Wait(status) => {
                debug!("⏳ '{}': {}", self.slots[index].process.name(), status);
                SchedulerCommand::StopPathing
            }
            ProcessTick::Complete(status) => {
                info!("✅ '{}' complete: {}", self.slots[index].process.name(), status);
                self.slots[index].lifecycle = Lifecycle::Complete;
                self.slots[index].process.on_deactivate();
                self.active = None;
                SchedulerCommand::StopPathing
            }
            ProcessTick::Fail(status) => {
                warn!("❌ '{}' failed: {}", self.slots[index].process.name(), status);
                self.slots[index].lifecycle = Lifecycle::Failed;
                self.slots[index].process.on_deactivate();
                self.active = None;
                SchedulerCommand::StopPathing
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
    use crate::behavior::BehaviorStack;
    use crate::events::TrackerManager;
    use crate::world::chunk_cache::ChunkCache;
    use crate::world::sandbox::SandboxWorld;
    use crate::Priority;

    struct Scripted {
        name: &'static str,
        priority: Priority,
        verdict: ProcessTick,
        activations: usize,
        deactivations: usize,
    }

    impl Scripted {
        fn boxed(name: &'static str, priority: Priority, verdict: ProcessTick) -> Box<Self> {
            Box::new(Self {
                name,
                priority,
                verdict,
                activations: 0,
                deactivations: 0,
            })
        }
    }

    impl Process for Scripted {
        fn name(&self) -> &'static str {
            self.name
        }
        fn priority(&self) -> Priority {
            self.priority
        }
        fn on_activate(&mut self) {
            self.activations += 1;
        }
        fn on_deactivate(&mut self) {
            self.deactivations += 1;
        }
        fn tick(&mut self, _ctx: &mut ProcessCtx) -> ProcessTick {
            self.verdict.clone()
        }
    }

    fn test_ctx_parts() -> (SandboxWorld, TrackerManager, BehaviorStack, ChunkCache) {
        let world = SandboxWorld::flat(16, 63);
        (
            world,
            TrackerManager::default(),
            BehaviorStack::new(),
            ChunkCache::new(-64, 320),
        )
    }

    macro_rules! ctx {
        ($world:ident, $trackers:ident, $stack:ident, $cache:ident, $table:ident) => {
            ProcessCtx {
                adapter: &mut $world,
                trackers: &$trackers,
                stack: &$stack,
                table: &$table,
                cache: &mut $cache,
                tick: 0,
                path_unreachable: false,
                executing_path: false,
            }
        };
    }

    #[test]
    fn test_at_most_one_active() {
        let mut scheduler = ProcessScheduler::new();
        scheduler
            .register(Scripted::boxed("a", Priority::Normal, ProcessTick::ContinuePathing))
            .unwrap();
        scheduler
            .register(Scripted::boxed("b", Priority::Normal, ProcessTick::ContinuePathing))
            .unwrap();

        scheduler.activate("a").unwrap();
        assert_eq!(scheduler.active_name(), Some("a"));
        scheduler.activate("b").unwrap();
        assert_eq!(scheduler.active_name(), Some("b"));
        assert_eq!(scheduler.lifecycle("a"), Some(Lifecycle::Idle));
        assert_eq!(scheduler.lifecycle("b"), Some(Lifecycle::Active));
    }

    #[test]
    fn test_lower_priority_activation_fails_and_leaves_state() {
        let mut scheduler = ProcessScheduler::new();
        scheduler
            .register(Scripted::boxed("combat", Priority::High, ProcessTick::ContinuePathing))
            .unwrap();
        scheduler
            .register(Scripted::boxed("explore", Priority::Low, ProcessTick::ContinuePathing))
            .unwrap();

        scheduler.activate("combat").unwrap();
        let err = scheduler.activate("explore");
        assert!(err.is_err());
        assert_eq!(scheduler.active_name(), Some("combat"));
        assert_eq!(scheduler.lifecycle("explore"), Some(Lifecycle::Idle));
        assert_eq!(scheduler.lifecycle("combat"), Some(Lifecycle::Active));
    }

    #[test]
    fn test_complete_verdict_deactivates() {
        let mut scheduler = ProcessScheduler::new();
        scheduler
            .register(Scripted::boxed(
                "done",
                Priority::Normal,
                ProcessTick::Complete("finished".to_string()),
            ))
            .unwrap();
        scheduler.activate("done").unwrap();

        let (mut world, trackers, stack, mut cache) = test_ctx_parts();
        let table = world.table().clone();
        let mut ctx = ctx!(world, trackers, stack, cache, table);
        let command = scheduler.tick(&mut ctx);
        assert_eq!(command, SchedulerCommand::StopPathing);
        assert_eq!(scheduler.active_name(), None);
        assert_eq!(scheduler.lifecycle("done"), Some(Lifecycle::Complete));
    }

    #[test]
    fn test_paused_process_waits_without_ticking() {
        let mut scheduler = ProcessScheduler::new();
        scheduler
            .register(Scripted::boxed(
                "slow",
                Priority::Normal,
                ProcessTick::Fail("must not run".to_string()),
            ))
            .unwrap();
        scheduler.activate("slow").unwrap();
        scheduler.pause_active();

        let (mut world, trackers, stack, mut cache) = test_ctx_parts();
        let table = world.table().clone();
        let mut ctx = ctx!(world, trackers, stack, cache, table);
        assert_eq!(scheduler.tick(&mut ctx), SchedulerCommand::StopPathing);
        // Still active and paused, the Fail verdict never ran
        assert_eq!(scheduler.active_name(), Some("slow"));
        assert_eq!(scheduler.lifecycle("slow"), Some(Lifecycle::Paused));

        scheduler.resume_active();
        let mut ctx = ctx!(world, trackers, stack, cache, table);
        scheduler.tick(&mut ctx);
        assert_eq!(scheduler.lifecycle("slow"), Some(Lifecycle::Failed));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut scheduler = ProcessScheduler::new();
        scheduler
            .register(Scripted::boxed("x", Priority::Normal, ProcessTick::ContinuePathing))
            .unwrap();
        assert!(scheduler
            .register(Scripted::boxed("x", Priority::Low, ProcessTick::ContinuePathing))
            .is_err());
    }
}
