/// Combat process: attack, flee, kite, or defend
///
/// Each mode runs its own nested sub-state machine over the same target
/// selection: the nearest non-excluded hostile inside the engage radius.
/// Attacks are cooldown-gated; the defend mode raises a shield between
/// swings.
use bevy::log::debug;

use super::{Priority, Process, ProcessCtx, ProcessTick};
use crate::pathfinding::goals::Goal;
use crate::types::BlockPos;
use crate::util::TimerGame;
use crate::world::adapter::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatMode {
    Attack,
    Flee,
    Kite,
    Defend,
}

#[derive(Debug, Clone)]
pub struct CombatConfig {
    pub mode: CombatMode,
    /// Hostiles beyond this are ignored
    pub engage_radius: f32,
    /// Melee reach
    pub attack_range: f64,
    pub attack_cooldown_ticks: u64,
    /// Flee mode keeps at least this far from every hostile
    pub min_flee_distance: f64,
    /// Attack mode breaks off and flees below this health
    pub flee_below_health: f32,
    /// Kite ring
    pub kite_min: f64,
    pub kite_max: f64,
    pub use_shield: bool,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            mode: CombatMode::Attack,
            engage_radius: 16.0,
            attack_range: 3.0,
            attack_cooldown_ticks: 12,
            min_flee_distance: 24.0,
            flee_below_health: 6.0,
            kite_min: 4.0,
            kite_max: 8.0,
            use_shield: true,
        }
    }
}

/// Attack-mode sub-states
#[derive(Debug, Clone, Copy, PartialEq)]
enum AttackState {
    Approaching,
    Striking,
}

pub struct CombatProcess {
    config: CombatConfig,
    attack_state: AttackState,
    target: Option<EntityId>,
    cooldown: Option<TimerGame>,
    shield_up: bool,
}

impl CombatProcess {
    pub fn new(config: CombatConfig) -> Self {
        Self {
            config,
            attack_state: AttackState::Approaching,
            target: None,
            cooldown: None,
            shield_up: false,
        }
    }

    fn cooldown_ready(&self, tick: u64) -> bool {
        self.cooldown
            .map(|t| t.has_elapsed(tick, self.config.attack_cooldown_ticks))
            .unwrap_or(true)
    }

    fn swing(&mut self, ctx: &mut ProcessCtx, target: EntityId) {
        if let Err(e) = ctx.adapter.attack(target) {
            debug!("⚔️ Swing at {} missed: {}", target, e);
        }
        // The swing consumed the attack window either way
        self.cooldown = Some(TimerGame::new(ctx.tick));
    }

    /// Every hostile position inside the engage radius, for the repulsors
    fn hostile_positions(&self, ctx: &ProcessCtx) -> Vec<BlockPos> {
        let from = ctx.adapter.self_position();
        ctx.trackers
            .entities
            .hostiles_within(from, self.config.engage_radius)
            .into_iter()
            .filter(|e| !ctx.stack.top().is_entity_excluded(e))
            .map(|e| e.block_pos())
            .collect()
    }

    fn lower_shield(&mut self, ctx: &mut ProcessCtx) {
        if self.shield_up {
            let _ = ctx.adapter.deactivate_item();
            self.shield_up = false;
        }
    }
}

impl Process for CombatProcess {
    fn name(&self) -> &'static str {
        "combat"
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    fn on_activate(&mut self) {
        self.attack_state = AttackState::Approaching;
        self.target = None;
        self.cooldown = None;
        self.shield_up = false;
    }

    fn on_deactivate(&mut self) {
        self.shield_up = false;
    }

    fn tick(&mut self, ctx: &mut ProcessCtx) -> ProcessTick {
        let from = ctx.adapter.self_position();
        let nearest = ctx
            .trackers
            .entities
            .hostiles_within(from, self.config.engage_radius)
            .into_iter()
            .filter(|e| !ctx.stack.top().is_entity_excluded(e))
            .min_by(|a, b| {
                let da = (a.position - from).length_squared();
                let db = (b.position - from).length_squared();
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|e| (e.id, e.block_pos()));

        let Some((target_id, target_pos)) = nearest else {
            self.target = None;
            self.lower_shield(ctx);
            return match self.config.mode {
                CombatMode::Flee => ProcessTick::Complete("escaped".to_string()),
                _ => ProcessTick::Wait("no hostiles in range".to_string()),
            };
        };

        if self.target != Some(target_id) {
            debug!("⚔️ Combat target is now entity {}", target_id);
            self.target = Some(target_id);
            self.attack_state = AttackState::Approaching;
        }
        let distance = target_pos.dist_to(ctx.self_pos());

        // Too hurt to trade hits: break off regardless of mode
        if self.config.mode == CombatMode::Attack
            && ctx.trackers.vitals.health <= self.config.flee_below_health
        {
            let repulsors = self.hostile_positions(ctx);
            if let Ok(goal) =
                Goal::run_away_from_entities(repulsors, self.config.min_flee_distance, false)
            {
                debug!("🩸 Low health - disengaging");
                return ProcessTick::NewGoal(goal);
            }
        }

        match self.config.mode {
            CombatMode::Attack => match self.attack_state {
                AttackState::Approaching => {
                    if distance <= self.config.attack_range {
                        self.attack_state = AttackState::Striking;
                        return ProcessTick::Wait("closing in".to_string());
                    }
                    ProcessTick::NewGoal(Goal::Near {
                        center: target_pos,
                        radius: self.config.attack_range - 1.0,
                    })
                }
                AttackState::Striking => {
                    if distance > self.config.attack_range {
                        self.attack_state = AttackState::Approaching;
                        return ProcessTick::NewGoal(Goal::Near {
                            center: target_pos,
                            radius: self.config.attack_range - 1.0,
                        });
                    }
                    if self.cooldown_ready(ctx.tick) {
                        self.swing(ctx, target_id);
                        return ProcessTick::Wait("striking".to_string());
                    }
                    ProcessTick::Wait("attack on cooldown".to_string())
                }
            },

            CombatMode::Flee => {
                let repulsors = self.hostile_positions(ctx);
                match Goal::run_away_from_entities(repulsors, self.config.min_flee_distance, false)
                {
                    Ok(goal) => {
                        if goal.is_end(ctx.self_pos()) {
                            ProcessTick::Complete("escaped".to_string())
                        } else {
                            ProcessTick::NewGoal(goal)
                        }
                    }
                    Err(_) => ProcessTick::Complete("escaped".to_string()),
                }
            }

            CombatMode::Kite => {
                if distance < self.config.kite_min {
                    let repulsors = self.hostile_positions(ctx);
                    if let Ok(goal) =
                        Goal::run_away_from_entities(repulsors, self.config.kite_max, true)
                    {
                        return ProcessTick::NewGoal(goal);
                    }
                }
                if distance > self.config.kite_max {
                    return ProcessTick::NewGoal(Goal::Near {
                        center: target_pos,
                        radius: self.config.kite_min.max(1.0),
                    });
                }
                // Inside the ring: poke on cooldown
                if distance <= self.config.attack_range && self.cooldown_ready(ctx.tick) {
                    self.swing(ctx, target_id);
                    return ProcessTick::Wait("kite strike".to_string());
                }
                ProcessTick::Wait("holding the ring".to_string())
            }

            CombatMode::Defend => {
                let threatened = distance <= self.config.attack_range * 1.5;
                if self.config.use_shield {
                    if threatened && !self.shield_up && ctx.adapter.activate_item().is_ok() {
                        self.shield_up = true;
                    } else if !threatened {
                        self.lower_shield(ctx);
                    }
                }
                if distance <= self.config.attack_range && self.cooldown_ready(ctx.tick) {
                    // Drop the shield just long enough to swing
                    self.lower_shield(ctx);
                    self.swing(ctx, target_id);
                    return ProcessTick::Wait("counterattack".to_string());
                }
                ProcessTick::Wait("holding ground".to_string())
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
    use crate::world::adapter::{EntityKind, GameEntity, WorldEvent};
    use crate::world::chunk_cache::ChunkCache;
    use crate::world::sandbox::SandboxWorld;
    use bevy::math::Vec3;

    fn hostile_at(trackers: &mut TrackerManager, id: EntityId, x: f32) {
        trackers.on_event(&WorldEvent::EntitySpawn {
            entity: GameEntity {
                id,
                position: Vec3::new(x, 64.0, 0.0),
                velocity: Vec3::ZERO,
                name: "zombie".to_string(),
                is_valid: true,
                health: Some(20.0),
                kind: EntityKind::Mob { hostile: true },
            },
        });
    }

    fn run_tick(
        process: &mut CombatProcess,
        world: &mut SandboxWorld,
        trackers: &TrackerManager,
        tick: u64,
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
            tick,
            path_unreachable: false,
            executing_path: false,
        };
        process.tick(&mut ctx)
    }

    #[test]
    fn test_attack_mode_approaches_then_strikes() {
        let mut world = SandboxWorld::flat(32, 63);
        let mut trackers = TrackerManager::default();
        hostile_at(&mut trackers, 1, 10.0);

        let mut process = CombatProcess::new(CombatConfig::default());
        process.on_activate();
        assert!(matches!(
            run_tick(&mut process, &mut world, &trackers, 0),
            ProcessTick::NewGoal(Goal::Near { .. })
        ));

        // Target walks into reach
        trackers.on_event(&WorldEvent::EntityMoved {
            id: 1,
            position: Vec3::new(2.0, 64.0, 0.0),
        });
        run_tick(&mut process, &mut world, &trackers, 1); // enters Striking
        let verdict = run_tick(&mut process, &mut world, &trackers, 2);
        assert_eq!(verdict, ProcessTick::Wait("striking".to_string()));
        // Immediately after a swing the cooldown gates the next one
        let verdict = run_tick(&mut process, &mut world, &trackers, 3);
        assert_eq!(verdict, ProcessTick::Wait("attack on cooldown".to_string()));
        // After the cooldown the next swing lands
        let verdict = run_tick(&mut process, &mut world, &trackers, 20);
        assert_eq!(verdict, ProcessTick::Wait("striking".to_string()));
    }

    #[test]
    fn test_flee_mode_runs_away_and_completes() {
        let mut world = SandboxWorld::flat(64, 63);
        let mut trackers = TrackerManager::default();
        hostile_at(&mut trackers, 1, 4.0);

        let mut process = CombatProcess::new(CombatConfig {
            mode: CombatMode::Flee,
            ..Default::default()
        });
        process.on_activate();
        assert!(matches!(
            run_tick(&mut process, &mut world, &trackers, 0),
            ProcessTick::NewGoal(Goal::RunAwayFromEntities { .. })
        ));

        // Hostile leaves the engage radius entirely
        trackers.on_event(&WorldEvent::EntityMoved {
            id: 1,
            position: Vec3::new(500.0, 64.0, 0.0),
        });
        assert!(matches!(
            run_tick(&mut process, &mut world, &trackers, 1),
            ProcessTick::Complete(_)
        ));
    }

    #[test]
    fn test_kite_mode_backs_off_when_crowded() {
        let mut world = SandboxWorld::flat(64, 63);
        let mut trackers = TrackerManager::default();
        hostile_at(&mut trackers, 1, 2.0);

        let mut process = CombatProcess::new(CombatConfig {
            mode: CombatMode::Kite,
            ..Default::default()
        });
        process.on_activate();
        assert!(matches!(
            run_tick(&mut process, &mut world, &trackers, 0),
            ProcessTick::NewGoal(Goal::RunAwayFromEntities { xz_only: true, .. })
        ));
    }

    #[test]
    fn test_low_health_breaks_off_the_attack() {
        let mut world = SandboxWorld::flat(32, 63);
        let mut trackers = TrackerManager::default();
        hostile_at(&mut trackers, 1, 10.0);
        trackers.on_event(&WorldEvent::Health { health: 4.0 });

        let mut process = CombatProcess::new(CombatConfig::default());
        process.on_activate();
        assert!(matches!(
            run_tick(&mut process, &mut world, &trackers, 0),
            ProcessTick::NewGoal(Goal::RunAwayFromEntities { .. })
        ));
    }

    #[test]
    fn test_waits_when_no_hostiles() {
        let mut world = SandboxWorld::flat(32, 63);
        let trackers = TrackerManager::default();
        let mut process = CombatProcess::new(CombatConfig::default());
        process.on_activate();
        assert_eq!(
            run_tick(&mut process, &mut world, &trackers, 0),
            ProcessTick::Wait("no hostiles in range".to_string())
        );
    }
}
