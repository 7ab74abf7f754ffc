/// Per-block-kind property table
///
/// Built once per world load from the game registry. Every query is O(1) on
/// a compact kind integer so the cost function can interrogate the world
/// without touching live block state. The `Maybe` passability cases (doors,
/// trapdoors, fence gates) force consumers back to the live block at the
/// exact position.
use bevy::log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Compact block-kind identifier assigned by the external registry at init
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockKindId(pub u16);

impl BlockKindId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Tool family that digs a block fastest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolClass {
    #[default]
    None,
    Pickaxe,
    Axe,
    Shovel,
    Hoe,
    Sword,
}

/// Ternary passability derived from the flag set
///
/// `Maybe` means the table alone cannot answer and the caller must consult
/// the live block at the exact position (open doors, trapdoors, gates).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Passability {
    Yes,
    No,
    Maybe,
}

/// 2-bit navigation category a voxel collapses into at cache time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavClass {
    Air,
    Water,
    Avoid,
    Solid,
}

// Flag bits for the compact property record
const WALK_ON: u16 = 1 << 0;
const WALK_THROUGH: u16 = 1 << 1;
const FULLY_PASSABLE: u16 = 1 << 2;
const WATER: u16 = 1 << 3;
const LAVA: u16 = 1 << 4;
const AVOID_BREAK: u16 = 1 << 5;
const CLIMBABLE: u16 = 1 << 6;
const FALLING: u16 = 1 << 7;
const FENCE: u16 = 1 << 8;
const CARPET: u16 = 1 << 9;
const OPENABLE: u16 = 1 << 10;
const DIGGABLE: u16 = 1 << 11;

/// Registry-facing descriptor for one block kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockKindDef {
    pub name: String,
    pub walk_on: bool,
    pub walk_through: bool,
    pub fully_passable: bool,
    pub water: bool,
    pub lava: bool,
    pub avoid_break: bool,
    pub climbable: bool,
    pub falling: bool,
    pub fence: bool,
    pub carpet: bool,
    pub openable: bool,
    pub diggable: bool,
    /// Dig hardness in the game's units; ignored when `diggable` is false
    pub hardness: f32,
    pub best_tool: ToolClass,
}

impl BlockKindDef {
    /// Descriptor with every flag cleared; builders flip what they need
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            walk_on: false,
            walk_through: false,
            fully_passable: false,
            water: false,
            lava: false,
            avoid_break: false,
            climbable: false,
            falling: false,
            fence: false,
            carpet: false,
            openable: false,
            diggable: false,
            hardness: 0.0,
            best_tool: ToolClass::None,
        }
    }
}

/// Compact per-kind record stored in the table
#[derive(Debug, Clone, Copy)]
pub struct BlockProps {
    bits: u16,
    pub hardness: f32,
    pub best_tool: ToolClass,
}

impl BlockProps {
    fn from_def(def: &BlockKindDef) -> Self {
        let mut bits = 0u16;
        let mut set = |cond: bool, bit: u16| {
            if cond {
                bits |= bit;
            }
        };
        set(def.walk_on, WALK_ON);
        set(def.walk_through, WALK_THROUGH);
        set(def.fully_passable, FULLY_PASSABLE);
        set(def.water, WATER);
        set(def.lava, LAVA);
        set(def.avoid_break, AVOID_BREAK);
        set(def.climbable, CLIMBABLE);
        set(def.falling, FALLING);
        set(def.fence, FENCE);
        set(def.carpet, CARPET);
        set(def.openable, OPENABLE);
        set(def.diggable, DIGGABLE);
        Self {
            bits,
            hardness: def.hardness,
            best_tool: def.best_tool,
        }
    }

    #[inline]
    pub fn walk_on(&self) -> bool {
        self.bits & WALK_ON != 0
    }

    #[inline]
    pub fn walk_through(&self) -> bool {
        self.bits & WALK_THROUGH != 0
    }

    #[inline]
    pub fn fully_passable(&self) -> bool {
        self.bits & FULLY_PASSABLE != 0
    }

    #[inline]
    pub fn water(&self) -> bool {
        self.bits & WATER != 0
    }

    #[inline]
    pub fn lava(&self) -> bool {
        self.bits & LAVA != 0
    }

    #[inline]
    pub fn avoid_break(&self) -> bool {
        self.bits & AVOID_BREAK != 0
    }

    #[inline]
    pub fn climbable(&self) -> bool {
        self.bits & CLIMBABLE != 0
    }

    #[inline]
    pub fn falling(&self) -> bool {
        self.bits & FALLING != 0
    }

    #[inline]
    pub fn fence(&self) -> bool {
        self.bits & FENCE != 0
    }

    #[inline]
    pub fn carpet(&self) -> bool {
        self.bits & CARPET != 0
    }

    #[inline]
    pub fn openable(&self) -> bool {
        self.bits & OPENABLE != 0
    }

    #[inline]
    pub fn diggable(&self) -> bool {
        self.bits & DIGGABLE != 0
    }

    /// Derive the ternary passability for an agent body voxel
    pub fn passability(&self) -> Passability {
        if self.openable() {
            // Doors, trapdoors, fence gates depend on live block state
            return Passability::Maybe;
        }
        if self.fully_passable() || self.walk_through() || self.water() {
            return Passability::Yes;
        }
        Passability::No
    }

    /// Collapse this kind into its 2-bit cache category
    pub fn nav_class(&self) -> NavClass {
        if self.lava() || self.avoid_break() {
            NavClass::Avoid
        } else if self.water() {
            NavClass::Water
        } else if self.fully_passable() || self.walk_through() {
            NavClass::Air
        } else {
            NavClass::Solid
        }
    }
}

/// O(1) property lookups keyed by compact kind id
///
/// Unknown ids fall back to a conservative solid, non-diggable record so a
/// registry mismatch degrades to caution instead of a panic.
#[derive(Debug, Clone)]
pub struct BlockPropertyTable {
    props: Vec<BlockProps>,
    names: Vec<String>,
    ids_by_name: HashMap<String, BlockKindId>,
    fallback: BlockProps,
}

impl BlockPropertyTable {
    /// Build the table from the registry's kind descriptors.
    /// Kind ids are assigned by descriptor index.
    pub fn build(defs: &[BlockKindDef]) -> Self {
        let mut props = Vec::with_capacity(defs.len());
        let mut names = Vec::with_capacity(defs.len());
        let mut ids_by_name = HashMap::with_capacity(defs.len());
        for (index, def) in defs.iter().enumerate() {
            props.push(BlockProps::from_def(def));
            names.push(def.name.clone());
            let id = BlockKindId(index as u16);
            if ids_by_name.insert(def.name.clone(), id).is_some() {
                warn!("duplicate block kind name '{}' in registry", def.name);
            }
        }
        let fallback = BlockProps {
            bits: 0,
            hardness: f32::INFINITY,
            best_tool: ToolClass::None,
        };
        Self {
            props,
            names,
            ids_by_name,
            fallback,
        }
    }

    #[inline]
    pub fn props(&self, kind: BlockKindId) -> &BlockProps {
        self.props.get(kind.index()).unwrap_or(&self.fallback)
    }

    pub fn id_by_name(&self, name: &str) -> Option<BlockKindId> {
        self.ids_by_name.get(name).copied()
    }

    pub fn name(&self, kind: BlockKindId) -> &str {
        self.names
            .get(kind.index())
            .map(|n| n.as_str())
            .unwrap_or("unknown")
    }

    pub fn kind_count(&self) -> usize {
        self.props.len()
    }

    #[inline]
    pub fn passability(&self, kind: BlockKindId) -> Passability {
        self.props(kind).passability()
    }

    #[inline]
    pub fn nav_class(&self, kind: BlockKindId) -> NavClass {
        self.props(kind).nav_class()
    }
}

// ============================================================================
// TESTS
// ============================================================================
