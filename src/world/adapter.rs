/// Game-client adapter contract
///
/// Everything the core needs from the host game lives behind this trait:
/// block lookups, entity snapshots, the agent's own state, actuation calls,
/// and the polled world-event feed the bridge drains each tick. The core
/// never talks to the game any other way.
use bevy::math::{IVec3, Vec3};

use crate::blocks::{BlockKindId, ToolClass};
use crate::errors::Result;
use crate::types::{BlockPos, ChunkPos};

/// Entity identifier assigned by the game client
pub type EntityId = u32;

/// A block observation at an exact position
///
/// `open` carries live openable state (doors, trapdoors, gates) so the
/// `Maybe` passability cases can be resolved without another lookup.
/// `growth` is the crop growth stage, zero for everything else.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block {
    pub pos: BlockPos,
    pub kind: BlockKindId,
    pub open: bool,
    pub growth: u8,
}

impl Block {
    pub fn new(pos: BlockPos, kind: BlockKindId) -> Self {
        Self {
            pos,
            kind,
            open: false,
            growth: 0,
        }
    }
}

/// Broad entity category the trackers and processes filter on
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Player,
    Mob { hostile: bool },
    DroppedItem { item: Item },
    Other,
}

/// Snapshot of one world entity
#[derive(Debug, Clone, PartialEq)]
pub struct GameEntity {
    pub id: EntityId,
    pub position: Vec3,
    pub velocity: Vec3,
    pub name: String,
    pub is_valid: bool,
    pub health: Option<f32>,
    pub kind: EntityKind,
}

impl GameEntity {
    pub fn block_pos(&self) -> BlockPos {
        BlockPos::from_vec3(self.position)
    }
}

/// One inventory stack
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub name: String,
    pub count: u32,
    pub tool_class: ToolClass,
    /// Dig speed multiplier; 1.0 for non-tools
    pub tool_speed: f32,
}

impl Item {
    pub fn plain(name: &str, count: u32) -> Self {
        Self {
            name: name.to_string(),
            count,
            tool_class: ToolClass::None,
            tool_speed: 1.0,
        }
    }

    pub fn tool(name: &str, class: ToolClass, speed: f32) -> Self {
        Self {
            name: name.to_string(),
            count: 1,
            tool_class: class,
            tool_speed: speed,
        }
    }
}

/// Per-tick movement inputs the executor emits
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Controls {
    pub forward: bool,
    pub jump: bool,
    pub sprint: bool,
    pub sneak: bool,
}

/// World events the adapter feeds the core, drained once per tick.
///
/// This set is closed; downstream code subscribes by `WorldEventKind`.
#[derive(Debug, Clone, PartialEq)]
pub enum WorldEvent {
    BlockUpdate { pos: BlockPos, kind: BlockKindId },
    ChunkColumnLoad { chunk: ChunkPos },
    ChunkColumnUnload { chunk: ChunkPos },
    EntitySpawn { entity: GameEntity },
    EntityGone { id: EntityId },
    EntityMoved { id: EntityId, position: Vec3 },
    Move { position: Vec3 },
    Health { health: f32 },
    Food { food: f32 },
    Death,
    WindowOpen { window_id: u32 },
    WindowClose { window_id: u32 },
}

/// Subscription key for the event bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorldEventKind {
    BlockUpdate,
    ChunkColumnLoad,
    ChunkColumnUnload,
    EntitySpawn,
    EntityGone,
    EntityMoved,
    Move,
    Health,
    Food,
    Death,
    WindowOpen,
    WindowClose,
}

impl WorldEvent {
    pub fn kind(&self) -> WorldEventKind {
        match self {
            WorldEvent::BlockUpdate { .. } => WorldEventKind::BlockUpdate,
            WorldEvent::ChunkColumnLoad { .. } => WorldEventKind::ChunkColumnLoad,
            WorldEvent::ChunkColumnUnload { .. } => WorldEventKind::ChunkColumnUnload,
            WorldEvent::EntitySpawn { .. } => WorldEventKind::EntitySpawn,
            WorldEvent::EntityGone { .. } => WorldEventKind::EntityGone,
            WorldEvent::EntityMoved { .. } => WorldEventKind::EntityMoved,
            WorldEvent::Move { .. } => WorldEventKind::Move,
            WorldEvent::Health { .. } => WorldEventKind::Health,
            WorldEvent::Food { .. } => WorldEventKind::Food,
            WorldEvent::Death => WorldEventKind::Death,
            WorldEvent::WindowOpen { .. } => WorldEventKind::WindowOpen,
            WorldEvent::WindowClose { .. } => WorldEventKind::WindowClose,
        }
    }
}

impl WorldEventKind {
    /// Wire name of the event, matching the game client's emitter names
    pub fn name(&self) -> &'static str {
        match self {
            WorldEventKind::BlockUpdate => "blockUpdate",
            WorldEventKind::ChunkColumnLoad => "chunkColumnLoad",
            WorldEventKind::ChunkColumnUnload => "chunkColumnUnload",
            WorldEventKind::EntitySpawn => "entitySpawn",
            WorldEventKind::EntityGone => "entityGone",
            WorldEventKind::EntityMoved => "entityMoved",
            WorldEventKind::Move => "move",
            WorldEventKind::Health => "health",
            WorldEventKind::Food => "food",
            WorldEventKind::Death => "death",
            WorldEventKind::WindowOpen => "windowOpen",
            WorldEventKind::WindowClose => "windowClose",
        }
    }
}

/// The full inbound/outbound contract with the game client.
///
/// Actuation calls return immediately; completion is observed through the
/// event feed (a dig completes when the block updates to air, a placement
/// when the target position updates to the placed kind).
pub trait GameAdapter: Send + Sync {
    // --- world queries ---

    /// Block at an exact position; `None` means the chunk is not loaded
    fn block_at(&self, pos: BlockPos) -> Option<Block>;

    /// Snapshot of all tracked entities
    fn entities(&self) -> Vec<GameEntity>;

    /// Resolve a single entity by id (despawned entities return `None`)
    fn entity(&self, id: EntityId) -> Option<GameEntity> {
        self.entities().into_iter().find(|e| e.id == id)
    }

    /// World age in game ticks
    fn game_tick(&self) -> u64;

    /// Dimension discriminator; trackers reset when this changes
    fn dimension_id(&self) -> i32;

    // --- self state ---

    fn self_position(&self) -> Vec3;
    fn self_velocity(&self) -> Vec3;
    fn self_on_ground(&self) -> bool;
    fn self_yaw(&self) -> f32;
    fn self_pitch(&self) -> f32;
    fn self_height(&self) -> f32;

    fn self_block_pos(&self) -> BlockPos {
        BlockPos::from_vec3(self.self_position())
    }

    // --- inventory ---

    fn inventory_items(&self) -> Vec<Item>;
    fn equip(&mut self, slot: usize) -> Result<()>;
    fn equipped_slot(&self) -> usize;
    fn activate_item(&mut self) -> Result<()>;
    fn deactivate_item(&mut self) -> Result<()>;

    // --- actuation ---

    fn dig(&mut self, pos: BlockPos, force_look: bool) -> Result<()>;
    fn stop_digging(&mut self);
    fn is_digging(&self) -> bool;
    fn place_block(&mut self, reference: BlockPos, face: IVec3) -> Result<()>;
    fn attack(&mut self, entity: EntityId) -> Result<()>;
    fn look(&mut self, yaw: f32, pitch: f32, force_sync: bool);
    fn look_at(&mut self, point: Vec3);
    fn set_controls(&mut self, controls: Controls);

    /// Steer toward a continuous-space target this tick
    fn move_toward(&mut self, target: Vec3, sprint: bool);

    /// Clear all movement inputs
    fn stop_moving(&mut self);

    // --- events ---

    /// Drain the pending world events accumulated since the last call
    fn poll_events(&mut self) -> Vec<WorldEvent>;

    /// Advance the host's own simulation by one tick, if it has one.
    /// Real game clients tick themselves and leave this a no-op; the
    /// sandbox steps its physics here.
    fn host_tick(&mut self) {}

    /// Downcast hook for hosts that need their concrete adapter back out
    /// of the resource handle
    fn as_any_mut(&mut self) -> Option<&mut dyn std::any::Any> {
        None
    }
}
