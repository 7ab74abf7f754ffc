/// Follow process: shadow an entity by id or name
///
/// The follow goal holds the target's last sampled position; the process
/// calls the goal's explicit `advance` once per tick and replans only when
/// the target actually moved. A vanished target is chased to its last
/// known position for a grace window before the process fails.
use bevy::log::debug;

use super::{Priority, Process, ProcessCtx, ProcessTick};
use crate::pathfinding::goals::Goal;
use crate::types::BlockPos;
use crate::world::adapter::EntityId;

#[derive(Debug, Clone)]
pub struct FollowConfig {
    /// Target entity id; name matching is used when absent
    pub target_id: Option<EntityId>,
    pub target_name: Option<String>,
    /// Hold this distance from the target
    pub follow_distance: f64,
    /// Fail beyond this distance
    pub give_up_distance: f64,
    /// Ticks to chase the last known position after losing sight
    pub reacquire_ticks: u64,
}

impl Default for FollowConfig {
    fn default() -> Self {
        Self {
            target_id: None,
            target_name: None,
            follow_distance: 3.0,
            give_up_distance: 64.0,
            reacquire_ticks: 200,
        }
    }
}

pub struct FollowProcess {
    config: FollowConfig,
    goal: Option<Goal>,
    last_known: Option<(BlockPos, u64)>,
}

impl FollowProcess {
    pub fn new(config: FollowConfig) -> Self {
        Self {
            config,
            goal: None,
            last_known: None,
        }
    }

    fn resolve<'t>(&self, ctx: &'t ProcessCtx) -> Option<&'t crate::world::adapter::GameEntity> {
        if let Some(id) = self.config.target_id {
            return ctx.trackers.entities.get(id);
        }
        if let Some(name) = &self.config.target_name {
            return ctx.trackers.entities.by_name(name);
        }
        None
    }
}

impl Process for FollowProcess {
    fn name(&self) -> &'static str {
        "follow"
    }

    fn priority(&self) -> Priority {
        Priority::Normal
    }

    fn on_activate(&mut self) {
        self.goal = None;
        self.last_known = None;
    }

    fn tick(&mut self, ctx: &mut ProcessCtx) -> ProcessTick {
        if self.config.target_id.is_none() && self.config.target_name.is_none() {
            return ProcessTick::Fail("no follow target configured".to_string());
        }

        match self.resolve(ctx) {
            Some(entity) => {
                let entity_id = entity.id;
                let target_pos = entity.block_pos();
                self.last_known = Some((target_pos, ctx.tick));

                let distance = target_pos.dist_to(ctx.self_pos());
                if distance > self.config.give_up_distance {
                    return ProcessTick::Fail(format!(
                        "target {:.0} blocks away, give-up is {:.0}",
                        distance, self.config.give_up_distance
                    ));
                }

                let goal = self.goal.get_or_insert_with(|| {
                    Goal::follow(entity_id, self.config.follow_distance, target_pos)
                });
                let moved = goal.advance(target_pos);

                if goal.is_end(ctx.self_pos()) {
                    return ProcessTick::Wait("holding follow distance".to_string());
                }
                if moved || !ctx.executing_path {
                    debug!("🐾 Following target to {}", target_pos);
                    return ProcessTick::NewGoal(goal.clone());
                }
                ProcessTick::ContinuePathing
            }
            None => {
                let Some((last_pos, seen_tick)) = self.last_known else {
                    return ProcessTick::Wait("waiting for target to appear".to_string());
                };
                if ctx.tick.saturating_sub(seen_tick) > self.config.reacquire_ticks {
                    return ProcessTick::Fail("lost the follow target".to_string());
                }
                // Chase the last known position hoping to re-acquire
                if ctx.self_pos().dist_to(last_pos) <= self.config.follow_distance {
                    return ProcessTick::Wait("at last known position".to_string());
                }
                ProcessTick::NewGoal(Goal::Near {
                    center: last_pos,
                    radius: self.config.follow_distance,
                })
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
