/// World-state trackers fed by the event bridge
///
/// Trackers digest the event stream into queryable snapshots for the
/// behaviors: live entities, dropped items, and the agent's own vitals.
/// The manager marks every tracker dirty at the start of each tick and
/// resets them all when the dimension changes.
use bevy::log::info;
use bevy::math::Vec3;
use bevy::prelude::Resource;
use std::collections::HashMap;

use crate::types::BlockPos;
use crate::world::adapter::{EntityId, EntityKind, GameEntity, Item, WorldEvent};

/// Shared tracker contract
pub trait Tracker {
    fn name(&self) -> &'static str;
    fn on_event(&mut self, event: &WorldEvent);
    /// Called at the start of every tick before events drain
    fn mark_dirty(&mut self);
    /// Called on dimension change; discard everything
    fn reset(&mut self);
}

/// Live entity snapshots keyed by id
#[derive(Default)]
pub struct EntityTracker {
    entities: HashMap<EntityId, GameEntity>,
    dirty: bool,
}

impl EntityTracker {
    pub fn get(&self, id: EntityId) -> Option<&GameEntity> {
        self.entities.get(&id)
    }

    pub fn all(&self) -> impl Iterator<Item = &GameEntity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn by_name(&self, name: &str) -> Option<&GameEntity> {
        self.entities.values().find(|e| e.name == name)
    }

    /// Nearest hostile mob to a position, if any
    pub fn nearest_hostile(&self, from: Vec3) -> Option<&GameEntity> {
        self.entities
            .values()
            .filter(|e| matches!(e.kind, EntityKind::Mob { hostile: true }))
            .min_by(|a, b| {
                let da = (a.position - from).length_squared();
                let db = (b.position - from).length_squared();
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    pub fn hostiles_within(&self, from: Vec3, radius: f32) -> Vec<&GameEntity> {
        let r2 = radius * radius;
        self.entities
            .values()
            .filter(|e| matches!(e.kind, EntityKind::Mob { hostile: true }))
            .filter(|e| (e.position - from).length_squared() <= r2)
            .collect()
    }
}

impl Tracker for EntityTracker {
    fn name(&self) -> &'static str {
        "entities"
    }

    fn on_event(&mut self, event: &WorldEvent) {
        match event {
            WorldEvent::EntitySpawn { entity } => {
                self.entities.insert(entity.id, entity.clone());
            }
            WorldEvent::EntityGone { id } => {
                self.entities.remove(id);
            }
            WorldEvent::EntityMoved { id, position } => {
                if let Some(entity) = self.entities.get_mut(id) {
                    entity.position = *position;
                }
            }
            _ => {}
        }
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn reset(&mut self) {
        self.entities.clear();
        self.dirty = false;
    }
}

/// Dropped-item entities, the gather process's food source
#[derive(Default)]
pub struct DroppedItemTracker {
    items: HashMap<EntityId, (Vec3, Item)>,
    dirty: bool,
}

impl DroppedItemTracker {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Matching drops, nearest first
    pub fn matching(
        &self,
        from: Vec3,
        filter: impl Fn(&Item) -> bool,
    ) -> Vec<(EntityId, BlockPos)> {
        let mut found: Vec<(EntityId, Vec3)> = self
            .items
            .iter()
            .filter(|(_, (_, item))| filter(item))
            .map(|(id, (pos, _))| (*id, *pos))
            .collect();
        found.sort_by(|a, b| {
            let da = (a.1 - from).length_squared();
            let db = (b.1 - from).length_squared();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        });
        found
            .into_iter()
            .map(|(id, pos)| (id, BlockPos::from_vec3(pos)))
            .collect()
    }
}

impl Tracker for DroppedItemTracker {
    fn name(&self) -> &'static str {
        "dropped_items"
    }

    fn on_event(&mut self, event: &WorldEvent) {
        match event {
            WorldEvent::EntitySpawn { entity } => {
                if let EntityKind::DroppedItem { item } = &entity.kind {
                    self.items.insert(entity.id, (entity.position, item.clone()));
                }
            }
            WorldEvent::EntityGone { id } => {
                self.items.remove(id);
            }
            WorldEvent::EntityMoved { id, position } => {
                if let Some((pos, _)) = self.items.get_mut(id) {
                    *pos = *position;
                }
            }
            _ => {}
        }
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn reset(&mut self) {
        self.items.clear();
        self.dirty = false;
    }
}

/// The agent's own health and food, plus a death latch
pub struct VitalsTracker {
    pub health: f32,
    pub food: f32,
    pub died: bool,
    dirty: bool,
}

impl Default for VitalsTracker {
    fn default() -> Self {
        // Full vitals until the first health/food event arrives
        Self {
            health: 20.0,
            food: 20.0,
            died: false,
            dirty: false,
        }
    }
}

impl Tracker for VitalsTracker {
    fn name(&self) -> &'static str {
        "vitals"
    }

    fn on_event(&mut self, event: &WorldEvent) {
        match event {
            WorldEvent::Health { health } => self.health = *health,
            WorldEvent::Food { food } => self.food = *food,
            WorldEvent::Death => self.died = true,
            _ => {}
        }
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Owns the trackers and the dimension-reset hook
#[derive(Resource, Default)]
pub struct TrackerManager {
    pub entities: EntityTracker,
    pub items: DroppedItemTracker,
    pub vitals: VitalsTracker,
    last_dimension: Option<i32>,
}

impl TrackerManager {
    /// Start-of-tick hook: dirty-mark everything and reset on dimension change
    pub fn begin_tick(&mut self, dimension: i32) {
        if self.last_dimension != Some(dimension) {
            if self.last_dimension.is_some() {
                info!("🌀 Dimension changed - resetting all trackers");
            }
            self.entities.reset();
            self.items.reset();
            self.vitals.reset();
            self.last_dimension = Some(dimension);
        }
        self.entities.mark_dirty();
        self.items.mark_dirty();
        self.vitals.mark_dirty();
    }

    pub fn on_event(&mut self, event: &WorldEvent) {
        self.entities.on_event(event);
        self.items.on_event(event);
        self.vitals.on_event(event);
    }
}

// ============================================================================
// TESTS
// ============================================================================
