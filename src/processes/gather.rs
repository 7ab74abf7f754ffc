/// Gather process: collect dropped items off the ground
///
/// State machine: Scanning → Approaching. Drops come from the item
/// tracker; walking over a drop picks it up, which the process observes as
/// the entity disappearing from the tracker.
use bevy::log::debug;
use std::collections::HashSet;

use super::{Priority, Process, ProcessCtx, ProcessTick};
use crate::pathfinding::goals::Goal;
use crate::types::BlockPos;
use crate::world::adapter::EntityId;

/// Pickup reach in blocks
const PICKUP_RADIUS: f64 = 1.2;

#[derive(Debug, Clone)]
pub struct GatherConfig {
    /// Item names to collect; empty collects everything
    pub item_filter: Vec<String>,
    /// Ignore drops farther than this
    pub radius: f32,
    /// Consecutive empty scans before completing
    pub give_up_scans: u32,
}

impl Default for GatherConfig {
    fn default() -> Self {
        Self {
            item_filter: Vec::new(),
            radius: 48.0,
            give_up_scans: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum GatherState {
    Scanning,
    Approaching { id: EntityId, pos: BlockPos },
}

pub struct GatherProcess {
    config: GatherConfig,
    state: GatherState,
    blacklist: HashSet<EntityId>,
    empty_scans: u32,
    collected: usize,
}

impl GatherProcess {
    pub fn new(config: GatherConfig) -> Self {
        Self {
            config,
            state: GatherState::Scanning,
            blacklist: HashSet::new(),
            empty_scans: 0,
            collected: 0,
        }
    }

    fn wanted(&self, name: &str) -> bool {
        self.config.item_filter.is_empty()
            || self.config.item_filter.iter().any(|f| f == name)
    }
}

impl Process for GatherProcess {
    fn name(&self) -> &'static str {
        "gather"
    }

    fn priority(&self) -> Priority {
        Priority::Normal
    }

    fn on_activate(&mut self) {
        self.state = GatherState::Scanning;
        self.blacklist.clear();
        self.empty_scans = 0;
        self.collected = 0;
    }

    fn tick(&mut self, ctx: &mut ProcessCtx) -> ProcessTick {
        match self.state {
            GatherState::Scanning => {
                let from = ctx.adapter.self_position();
                let candidates = ctx
                    .trackers
                    .items
                    .matching(from, |item| self.wanted(&item.name));
                let target = candidates.into_iter().find(|(id, pos)| {
                    !self.blacklist.contains(id)
                        && pos.dist_to(ctx.self_pos()) <= self.config.radius as f64
                });

                match target {
                    Some((id, pos)) => {
                        debug!("🧺 Gathering drop {} at {}", id, pos);
                        self.empty_scans = 0;
                        self.state = GatherState::Approaching { id, pos };
                        ProcessTick::NewGoal(Goal::Near {
                            center: pos,
                            radius: PICKUP_RADIUS,
                        })
                    }
                    None => {
                        self.empty_scans += 1;
                        if self.empty_scans >= self.config.give_up_scans {
                            ProcessTick::Complete(format!("gathered {} drops", self.collected))
                        } else {
                            ProcessTick::Wait("no drops in range".to_string())
                        }
                    }
                }
            }

            GatherState::Approaching { id, pos } => {
                let Some(entity) = ctx.trackers.entities.get(id) else {
                    // Picked up (or despawned); either way move on
                    self.collected += 1;
                    self.state = GatherState::Scanning;
                    return ProcessTick::Wait("drop collected".to_string());
                };
                if ctx.path_unreachable {
                    self.blacklist.insert(id);
                    self.state = GatherState::Scanning;
                    return ProcessTick::Wait("drop unreachable".to_string());
                }
                let live_pos = entity.block_pos();
                if live_pos.dist_to(pos) > 2.0 {
                    // The drop drifted; retarget
                    self.state = GatherState::Approaching { id, pos: live_pos };
                    return ProcessTick::NewGoal(Goal::Near {
                        center: live_pos,
                        radius: PICKUP_RADIUS,
                    });
                }
                ProcessTick::ContinuePathing
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
    use crate::world::adapter::{EntityKind, Item, WorldEvent};
    use crate::world::chunk_cache::ChunkCache;
    use crate::world::sandbox::SandboxWorld;
    use bevy::math::Vec3;

    fn run_tick(
        process: &mut GatherProcess,
        world: &mut SandboxWorld,
        trackers: &TrackerManager,
    ) -> ProcessTick {
        let stack = BehaviorStack::new();
        let table = world.table().clone();
        let mut cache = ChunkCache::new(-64, 320);
        let mut ctx = ProcessCtx {
            adapter: world,
            trackers,
            stack: &stack,
            table: &table,
            cache: &mut cache,
            tick: 0,
            path_unreachable: false,
            executing_path: false,
        };
        process.tick(&mut ctx)
    }

    fn drop_event(id: EntityId, x: f32, name: &str) -> WorldEvent {
        WorldEvent::EntitySpawn {
            entity: crate::world::adapter::GameEntity {
                id,
                position: Vec3::new(x, 64.0, 0.0),
                velocity: Vec3::ZERO,
                name: "item".to_string(),
                is_valid: true,
                health: None,
                kind: EntityKind::DroppedItem {
                    item: Item::plain(name, 1),
                },
            },
        }
    }

    #[test]
    fn test_targets_nearest_matching_drop() {
        let mut world = SandboxWorld::flat(32, 63);
        let mut trackers = TrackerManager::default();
        trackers.on_event(&drop_event(1, 20.0, "coal"));
        trackers.on_event(&drop_event(2, 6.0, "coal"));
        trackers.on_event(&drop_event(3, 2.0, "dirt"));

        let mut process = GatherProcess::new(GatherConfig {
            item_filter: vec!["coal".to_string()],
            ..Default::default()
        });
        process.on_activate();

        let verdict = run_tick(&mut process, &mut world, &trackers);
        assert_eq!(
            verdict,
            ProcessTick::NewGoal(Goal::Near {
                center: BlockPos::new(6, 64, 0),
                radius: PICKUP_RADIUS,
            })
        );
    }

    #[test]
    fn test_pickup_advances_to_next_scan() {
        let mut world = SandboxWorld::flat(32, 63);
        let mut trackers = TrackerManager::default();
        trackers.on_event(&drop_event(1, 4.0, "coal"));

        let mut process = GatherProcess::new(GatherConfig::default());
        process.on_activate();
        assert!(matches!(
            run_tick(&mut process, &mut world, &trackers),
            ProcessTick::NewGoal(_)
        ));

        // Item entity disappears (picked up)
        trackers.on_event(&WorldEvent::EntityGone { id: 1 });
        let verdict = run_tick(&mut process, &mut world, &trackers);
        assert_eq!(verdict, ProcessTick::Wait("drop collected".to_string()));
    }

    #[test]
    fn test_completes_after_empty_scans() {
        let mut world = SandboxWorld::flat(32, 63);
        let trackers = TrackerManager::default();
        let mut process = GatherProcess::new(GatherConfig {
            give_up_scans: 3,
            ..Default::default()
        });
        process.on_activate();

        assert!(matches!(
            run_tick(&mut process, &mut world, &trackers),
            ProcessTick::Wait(_)
        ));
        assert!(matches!(
            run_tick(&mut process, &mut world, &trackers),
            ProcessTick::Wait(_)
        ));
        assert!(matches!(
            run_tick(&mut process, &mut world, &trackers),
            ProcessTick::Complete(_)
        ));
    }
}
