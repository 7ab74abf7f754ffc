/// In-memory sandbox world implementing the game-client adapter
///
/// A reference host for the demo binary and the integration tests: a flat
/// bounded world with block overrides, a handful of entities, and a crude
/// one-agent physics step. Real deployments replace this with a bridge to
/// the actual game client.
use bevy::math::{IVec3, Vec3};
use std::collections::HashMap;

use crate::blocks::{sandbox_table, BlockKindId, BlockPropertyTable};
use crate::errors::{NavigatorError, Result};
use crate::types::{BlockPos, ChunkPos, SECTION_SIZE};
use crate::world::adapter::{
    Block, Controls, EntityId, EntityKind, GameAdapter, GameEntity, Item, WorldEvent,
};

/// Walk speed in blocks per tick (sprint is ~30% faster)
const WALK_SPEED: f32 = 0.216;
const SPRINT_SPEED: f32 = 0.28;

pub struct SandboxWorld {
    table: BlockPropertyTable,
    air: BlockKindId,
    floor_kind: BlockKindId,
    floor_y: i32,
    /// Loaded square half-extent in blocks; outside is unloaded
    extent: i32,
    overrides: HashMap<BlockPos, BlockKindId>,
    open_states: HashMap<BlockPos, bool>,
    growth_states: HashMap<BlockPos, u8>,

    // Agent state
    position: Vec3,
    velocity: Vec3,
    on_ground: bool,
    yaw: f32,
    pitch: f32,
    height: f32,
    dimension: i32,

    // Inventory
    items: Vec<Item>,
    equipped: usize,
    item_active: bool,

    // Entities
    entities: HashMap<EntityId, GameEntity>,
    next_entity_id: EntityId,

    // Actuation state
    controls: Controls,
    move_target: Option<(Vec3, bool)>,
    digging: Option<(BlockPos, u32)>,

    pending: Vec<WorldEvent>,
    tick: u64,
}

impl SandboxWorld {
    /// Flat stone floor at `floor_y` covering |x|,|z| <= extent, agent
    /// standing at the origin on top of it
    pub fn flat(extent: i32, floor_y: i32) -> Self {
        let table = sandbox_table();
        let air = table.id_by_name("air").expect("registry has air");
        let floor_kind = table.id_by_name("stone").expect("registry has stone");
        Self {
            table,
            air,
            floor_kind,
            floor_y,
            extent,
            overrides: HashMap::new(),
            open_states: HashMap::new(),
            growth_states: HashMap::new(),
            position: Vec3::new(0.5, (floor_y + 1) as f32, 0.5),
            velocity: Vec3::ZERO,
            on_ground: true,
            yaw: 0.0,
            pitch: 0.0,
            height: 1.8,
            dimension: 0,
            items: vec![Item::plain("bread", 8)],
            equipped: 0,
            item_active: false,
            entities: HashMap::new(),
            next_entity_id: 1,
            controls: Controls::default(),
            move_target: None,
            digging: None,
            pending: Vec::new(),
            tick: 0,
        }
    }

    pub fn table(&self) -> &BlockPropertyTable {
        &self.table
    }

    pub fn kind(&self, name: &str) -> BlockKindId {
        self.table
            .id_by_name(name)
            .unwrap_or_else(|| panic!("unknown sandbox block kind '{}'", name))
    }

    /// Queue a ChunkColumnLoad for every loaded chunk so the bridge can
    /// populate the chunk cache; call once after world setup
    pub fn emit_initial_chunk_loads(&mut self) {
        let chunk_extent = self.extent.div_euclid(SECTION_SIZE) + 1;
        for cx in -chunk_extent..=chunk_extent {
            for cz in -chunk_extent..=chunk_extent {
                self.pending.push(WorldEvent::ChunkColumnLoad {
                    chunk: ChunkPos::new(cx, cz),
                });
            }
        }
    }

    /// Place a block during setup or gameplay; emits a block update
    pub fn set_block(&mut self, pos: BlockPos, kind: BlockKindId) {
        self.overrides.insert(pos, kind);
        self.pending.push(WorldEvent::BlockUpdate { pos, kind });
    }

    pub fn set_block_named(&mut self, pos: BlockPos, name: &str) {
        let kind = self.kind(name);
        self.set_block(pos, kind);
    }

    pub fn set_open(&mut self, pos: BlockPos, open: bool) {
        self.open_states.insert(pos, open);
    }

    pub fn set_growth(&mut self, pos: BlockPos, growth: u8) {
        self.growth_states.insert(pos, growth);
    }

    pub fn teleport_agent(&mut self, pos: Vec3) {
        self.position = pos;
        self.pending.push(WorldEvent::Move { position: pos });
    }

    pub fn give_item(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn spawn_entity(
        &mut self,
        name: &str,
        position: Vec3,
        kind: EntityKind,
        health: Option<f32>,
    ) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        let entity = GameEntity {
            id,
            position,
            velocity: Vec3::ZERO,
            name: name.to_string(),
            is_valid: true,
            health,
            kind,
        };
        self.entities.insert(id, entity.clone());
        self.pending.push(WorldEvent::EntitySpawn { entity });
        id
    }

    pub fn despawn_entity(&mut self, id: EntityId) {
        if self.entities.remove(&id).is_some() {
            self.pending.push(WorldEvent::EntityGone { id });
        }
    }

    pub fn move_entity(&mut self, id: EntityId, position: Vec3) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.position = position;
            self.pending.push(WorldEvent::EntityMoved { id, position });
        }
    }

    pub fn change_dimension(&mut self, dimension: i32) {
        self.dimension = dimension;
        self.overrides.clear();
        self.entities.clear();
    }

    /// Can the agent body stand at this continuous position?
    fn is_body_clear(&self, position: Vec3) -> bool {
        let feet = BlockPos::from_vec3(position);
        for voxel in [feet, feet.up()] {
            let Some(kind) = self.kind_at(voxel) else {
                continue; // unloaded edges do not collide
            };
            let props = self.table.props(kind);
            let solid = !props.fully_passable() && !props.walk_through() && !props.water();
            if solid && !self.open_states.get(&voxel).copied().unwrap_or(false) {
                return false;
            }
        }
        true
    }

    fn kind_at(&self, pos: BlockPos) -> Option<BlockKindId> {
        if pos.x.abs() > self.extent || pos.z.abs() > self.extent {
            return None;
        }
        if let Some(kind) = self.overrides.get(&pos) {
            return Some(*kind);
        }
        if pos.y == self.floor_y {
            Some(self.floor_kind)
        } else {
            Some(self.air)
        }
    }

    /// Advance the sandbox one game tick: digging progress, then movement
    pub fn step(&mut self) {
        self.tick += 1;

        // Digging
        if let Some((pos, remaining)) = self.digging {
            if remaining <= 1 {
                self.digging = None;
                self.overrides.insert(pos, self.air);
                self.pending.push(WorldEvent::BlockUpdate {
                    pos,
                    kind: self.air,
                });
            } else {
                self.digging = Some((pos, remaining - 1));
            }
        }

        // Movement: rise first, then translate, then drop, so step-ups do
        // not clip the block being climbed. Horizontal motion collides
        // against non-passable blocks.
        if let Some((target, sprint)) = self.move_target {
            let speed = if sprint { SPRINT_SPEED } else { WALK_SPEED };
            let before = self.position;

            if target.y > self.position.y + 0.05 {
                self.position.y += speed.min(target.y - self.position.y);
            } else {
                let delta_xz = Vec3::new(target.x - self.position.x, 0.0, target.z - self.position.z);
                let dist_xz = delta_xz.length();
                if dist_xz > 0.05 {
                    let step = delta_xz * (speed.min(dist_xz) / dist_xz);
                    let tentative = self.position + step;
                    if self.is_body_clear(tentative) {
                        self.position = tentative;
                    }
                } else if target.y < self.position.y - 0.05 {
                    self.position.y -= speed.min(self.position.y - target.y);
                } else {
                    self.move_target = None;
                }
            }

            self.velocity = self.position - before;
            if self.velocity.length_squared() > 0.0 {
                self.pending.push(WorldEvent::Move {
                    position: self.position,
                });
            }
        } else {
            self.velocity = Vec3::ZERO;
        }

        let below = BlockPos::from_vec3(self.position).down();
        self.on_ground = self
            .kind_at(below)
            .map(|kind| self.table.props(kind).walk_on())
            .unwrap_or(false);
    }
}

impl GameAdapter for SandboxWorld {
    fn block_at(&self, pos: BlockPos) -> Option<Block> {
        self.kind_at(pos).map(|kind| Block {
            pos,
            kind,
            open: self.open_states.get(&pos).copied().unwrap_or(false),
            growth: self.growth_states.get(&pos).copied().unwrap_or(0),
        })
    }

    fn entities(&self) -> Vec<GameEntity> {
        self.entities.values().cloned().collect()
    }

    fn game_tick(&self) -> u64 {
        self.tick
    }

    fn dimension_id(&self) -> i32 {
        self.dimension
    }

    fn self_position(&self) -> Vec3 {
        self.position
    }

    fn self_velocity(&self) -> Vec3 {
        self.velocity
    }

    fn self_on_ground(&self) -> bool {
        self.on_ground
    }

    fn self_yaw(&self) -> f32 {
        self.yaw
    }

    fn self_pitch(&self) -> f32 {
        self.pitch
    }

    fn self_height(&self) -> f32 {
        self.height
    }

    fn inventory_items(&self) -> Vec<Item> {
        self.items.clone()
    }

    fn equip(&mut self, slot: usize) -> Result<()> {
        if slot >= self.items.len() {
            return Err(NavigatorError::invalid_input(format!(
                "equip slot {} out of range ({} items)",
                slot,
                self.items.len()
            )));
        }
        self.equipped = slot;
        Ok(())
    }

    fn equipped_slot(&self) -> usize {
        self.equipped
    }

    fn activate_item(&mut self) -> Result<()> {
        self.item_active = true;
        Ok(())
    }

    fn deactivate_item(&mut self) -> Result<()> {
        self.item_active = false;
        Ok(())
    }

    fn dig(&mut self, pos: BlockPos, force_look: bool) -> Result<()> {
        let kind = self
            .kind_at(pos)
            .ok_or_else(|| NavigatorError::world_unavailable(format!("dig target {}", pos)))?;
        let props = *self.table.props(kind);
        if !props.diggable() {
            return Err(NavigatorError::invalid_input(format!(
                "block at {} is not diggable",
                pos
            )));
        }
        if force_look {
            self.look_at(pos.center());
        }
        let tool_speed = self
            .items
            .get(self.equipped)
            .filter(|item| item.tool_class == props.best_tool)
            .map(|item| item.tool_speed)
            .unwrap_or(1.0);
        let ticks = ((props.hardness * 30.0 / tool_speed).ceil() as u32).max(1);
        self.digging = Some((pos, ticks));
        Ok(())
    }

    fn stop_digging(&mut self) {
        self.digging = None;
    }

    fn is_digging(&self) -> bool {
        self.digging.is_some()
    }

    fn place_block(&mut self, reference: BlockPos, face: IVec3) -> Result<()> {
        let target = reference.offset(face.x, face.y, face.z);
        let item = self
            .items
            .get_mut(self.equipped)
            .ok_or_else(|| NavigatorError::invalid_input("no item equipped"))?;
        let kind = self
            .table
            .id_by_name(&item.name)
            .ok_or_else(|| NavigatorError::invalid_input(format!("{} is not placeable", item.name)))?;
        if item.count == 0 {
            return Err(NavigatorError::invalid_input(format!("{} stack empty", item.name)));
        }
        item.count -= 1;
        self.overrides.insert(target, kind);
        self.pending.push(WorldEvent::BlockUpdate { pos: target, kind });
        Ok(())
    }

    fn attack(&mut self, entity: EntityId) -> Result<()> {
        let Some(target) = self.entities.get_mut(&entity) else {
            return Err(NavigatorError::world_unavailable(format!(
                "attack target {} despawned",
                entity
            )));
        };
        if let Some(health) = target.health.as_mut() {
            *health -= 4.0;
            if *health <= 0.0 {
                self.despawn_entity(entity);
            }
        }
        Ok(())
    }

    fn look(&mut self, yaw: f32, pitch: f32, _force_sync: bool) {
        self.yaw = yaw;
        self.pitch = pitch;
    }

    fn look_at(&mut self, point: Vec3) {
        let delta = point - (self.position + Vec3::new(0.0, self.height * 0.9, 0.0));
        let yaw = delta.z.atan2(delta.x);
        let pitch = (-delta.y).atan2(delta.length() + 1e-6);
        self.look(yaw, pitch, false);
    }

    fn set_controls(&mut self, controls: Controls) {
        self.controls = controls;
    }

    fn move_toward(&mut self, target: Vec3, sprint: bool) {
        self.move_target = Some((target, sprint));
        self.controls.forward = true;
        self.controls.sprint = sprint;
    }

    fn stop_moving(&mut self) {
        self.move_target = None;
        self.controls = Controls::default();
    }

    fn poll_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.pending)
    }

    fn host_tick(&mut self) {
        self.step();
    }

    fn as_any_mut(&mut self) -> Option<&mut dyn std::any::Any> {
        Some(self)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_world_layout() {
        let world = SandboxWorld::flat(32, 63);
        let floor = world.block_at(BlockPos::new(5, 63, -5)).unwrap();
        assert_eq!(floor.kind, world.kind("stone"));
        let above = world.block_at(BlockPos::new(5, 64, -5)).unwrap();
        assert_eq!(above.kind, world.kind("air"));
        assert!(world.block_at(BlockPos::new(100, 63, 0)).is_none());
    }

    #[test]
    fn test_dig_completes_via_block_update() {
        let mut world = SandboxWorld::flat(16, 63);
        let target = BlockPos::new(2, 63, 0);
        world.poll_events();
        world.dig(target, true).unwrap();
        assert!(world.is_digging());

        // Stone at hardness 1.5 digs in 45 ticks bare-handed
        for _ in 0..45 {
            world.step();
        }
        assert!(!world.is_digging());
        let events = world.poll_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, WorldEvent::BlockUpdate { pos, .. } if *pos == target)));
        assert_eq!(world.block_at(target).unwrap().kind, world.kind("air"));
    }

    #[test]
    fn test_move_toward_reaches_target() {
        let mut world = SandboxWorld::flat(16, 63);
        let target = Vec3::new(3.5, 64.0, 0.5);
        world.move_toward(target, false);
        for _ in 0..40 {
            world.step();
        }
        assert!((world.self_position() - target).length() < 0.05);
    }

    #[test]
    fn test_place_block_from_equipped_stack() {
        let mut world = SandboxWorld::flat(16, 63);
        world.give_item(Item::plain("cobblestone", 4));
        world.equip(1).unwrap();
        world
            .place_block(BlockPos::new(1, 63, 0), IVec3::new(0, 1, 0))
            .unwrap();
        assert_eq!(
            world.block_at(BlockPos::new(1, 64, 0)).unwrap().kind,
            world.kind("cobblestone")
        );
        assert_eq!(world.inventory_items()[1].count, 3);
    }
}
