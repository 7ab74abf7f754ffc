/// Calculation context: the facade the planner consumes
///
/// A single context is built per planner slice and threaded through every
/// movement generator. It bundles the chunk cache fast path, the property
/// table, the live adapter for the cases the cache cannot answer, the
/// favoring multiplier, and the per-run settings snapshotted from the
/// behavior frame when the plan started.
use bevy::prelude::Resource;
use std::collections::HashMap;

use crate::behavior::frame::BehaviorFrame;
use crate::blocks::{BlockKindId, BlockPropertyTable, NavClass, Passability};
use crate::pathfinding::favoring::Favoring;
use crate::pathfinding::goals::Goal;
use crate::types::BlockPos;
use crate::world::adapter::GameAdapter;
use crate::world::chunk_cache::ChunkCache;

/// Ticks added on top of the raw dig formula per break
const DIG_TICK_SURCHARGE: f64 = 1.0;

/// Best-tool selection cache, invalidated on inventory change events
#[derive(Resource, Default)]
pub struct ToolCache {
    best: HashMap<BlockKindId, (usize, f32)>,
    valid: bool,
    /// Rebuilds since startup (metrics)
    pub invalidations: u64,
}

impl ToolCache {
    pub fn invalidate(&mut self) {
        if self.valid {
            self.valid = false;
            self.invalidations += 1;
        }
        self.best.clear();
    }

    /// Best inventory slot and dig-speed multiplier for a block kind.
    /// Honors forced-tool preferences from the behavior frame first.
    pub fn best_for(
        &mut self,
        kind: BlockKindId,
        adapter: &dyn GameAdapter,
        table: &BlockPropertyTable,
        frame: &BehaviorFrame,
    ) -> (usize, f32) {
        if !self.valid {
            self.best.clear();
            self.valid = true;
        }
        if let Some(cached) = self.best.get(&kind) {
            return *cached;
        }

        let items = adapter.inventory_items();
        let props = table.props(kind);

        let picked = if let Some(forced) = frame.forced_tool(table.name(kind)) {
            items
                .iter()
                .position(|item| item.name == forced)
                .map(|slot| (slot, items[slot].tool_speed))
        } else {
            items
                .iter()
                .enumerate()
                .filter(|(_, item)| item.tool_class == props.best_tool)
                .filter(|(_, item)| !frame.is_item_protected(&item.name))
                .max_by(|a, b| {
                    a.1.tool_speed
                        .partial_cmp(&b.1.tool_speed)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .map(|(slot, item)| (slot, item.tool_speed))
        };

        let best = picked.unwrap_or((adapter.equipped_slot(), 1.0));
        self.best.insert(kind, best);
        best
    }
}

/// Per-run flags and knobs snapshotted from the behavior frame
#[derive(Debug, Clone)]
pub struct PlanSettings {
    pub can_dig: bool,
    pub can_place: bool,
    pub allow_sprint: bool,
    pub allow_parkour: bool,
    pub allow_swim: bool,
    pub allow_climb: bool,
    /// A water bucket arrests any fall, so the water-cushion fall cap
    /// applies everywhere
    pub allow_water_bucket: bool,
    pub escape_lava: bool,
    pub swim_through_lava: bool,
    pub max_fall_height: i32,
    pub max_fall_height_water: i32,
    pub break_penalty: f64,
    pub place_penalty: f64,
    pub jump_penalty: f64,
}

impl PlanSettings {
    pub fn from_frame(frame: &BehaviorFrame) -> Self {
        Self {
            can_dig: frame.allow_break,
            can_place: frame.allow_place,
            allow_sprint: frame.allow_sprint,
            allow_parkour: frame.allow_parkour,
            allow_swim: frame.allow_swim,
            allow_climb: frame.allow_climb,
            allow_water_bucket: frame.allow_water_bucket,
            escape_lava: frame.escape_lava,
            swim_through_lava: frame.swim_through_lava,
            max_fall_height: frame.max_fall_height,
            max_fall_height_water: frame.max_fall_height_water,
            break_penalty: frame.block_break_penalty,
            place_penalty: frame.block_place_penalty,
            jump_penalty: frame.jump_penalty,
        }
    }

    /// Effective safe-fall height given the water-bucket allowance
    pub fn effective_max_fall(&self) -> i32 {
        if self.allow_water_bucket {
            self.max_fall_height_water
        } else {
            self.max_fall_height
        }
    }
}

impl Default for PlanSettings {
    fn default() -> Self {
        Self::from_frame(&BehaviorFrame::default())
    }
}

/// Single-writer-per-run facade passed through A*
pub struct CalculationContext<'a> {
    pub adapter: &'a dyn GameAdapter,
    pub table: &'a BlockPropertyTable,
    pub cache: &'a mut ChunkCache,
    pub tool_cache: &'a mut ToolCache,
    pub favoring: &'a Favoring,
    pub frame: &'a BehaviorFrame,
    pub settings: PlanSettings,

    self_on_ground: bool,
    self_in_water: bool,
    self_in_lava: bool,
    throwaway_slot: Option<usize>,
}

impl<'a> CalculationContext<'a> {
    pub fn new(
        adapter: &'a dyn GameAdapter,
        table: &'a BlockPropertyTable,
        cache: &'a mut ChunkCache,
        tool_cache: &'a mut ToolCache,
        favoring: &'a Favoring,
        frame: &'a BehaviorFrame,
    ) -> Self {
        let settings = PlanSettings::from_frame(frame);
        let self_on_ground = adapter.self_on_ground();
        let feet = adapter.self_block_pos();
        let (self_in_water, self_in_lava) = adapter
            .block_at(feet)
            .map(|b| {
                let props = table.props(b.kind);
                (props.water(), props.lava())
            })
            .unwrap_or((false, false));
        let throwaway_slot = adapter
            .inventory_items()
            .iter()
            .enumerate()
            .find(|(_, item)| {
                item.count > 0
                    && !frame.is_item_protected(&item.name)
                    && table
                        .id_by_name(&item.name)
                        .map(|kind| table.props(kind).walk_on() && !table.props(kind).falling())
                        .unwrap_or(false)
            })
            .map(|(slot, _)| slot);
        Self {
            adapter,
            table,
            cache,
            tool_cache,
            favoring,
            frame,
            settings,
            self_on_ground,
            self_in_water,
            self_in_lava,
            throwaway_slot,
        }
    }

    // --- world queries -----------------------------------------------------

    /// Can the agent body occupy this voxel? Cache fast path; unknown chunks
    /// count as passable. Avoid-class voxels (lava, protected blocks) open
    /// up only for lava-tolerant frames, or while the agent is already in
    /// lava and allowed to wade out.
    #[inline]
    pub fn passable(&mut self, pos: BlockPos) -> bool {
        match self.cache.voxel_at(pos) {
            Some(NavClass::Air) | Some(NavClass::Water) | None => true,
            Some(NavClass::Solid) => false,
            Some(NavClass::Avoid) => {
                if !(self.settings.swim_through_lava
                    || (self.settings.escape_lava && self.self_in_lava))
                {
                    return false;
                }
                // Lava tolerance must not open up other avoid-class cells
                self.adapter
                    .block_at(pos)
                    .map(|b| self.table.props(b.kind).lava())
                    .unwrap_or(false)
            }
        }
    }

    /// Feet and head voxels both passable
    #[inline]
    pub fn passable_body(&mut self, pos: BlockPos) -> bool {
        self.passable(pos) && self.passable(pos.up())
    }

    /// Passability with the live `Maybe` recheck; used at committed steps
    /// (smoothing validation, executor pre-flight), never in hot expansion
    pub fn passable_checked(&mut self, pos: BlockPos) -> bool {
        match self.cache.voxel_at(pos) {
            Some(NavClass::Air) | Some(NavClass::Water) | None => true,
            Some(NavClass::Avoid) => false,
            Some(NavClass::Solid) => match self.adapter.block_at(pos) {
                Some(block) => {
                    self.table.passability(block.kind) == Passability::Maybe && block.open
                }
                None => false,
            },
        }
    }

    /// Can the agent stand on this voxel? Unknown chunks are never floors.
    #[inline]
    pub fn walk_on(&mut self, pos: BlockPos) -> bool {
        self.cache.is_walk_on(pos)
    }

    #[inline]
    pub fn water_at(&mut self, pos: BlockPos) -> bool {
        self.cache.voxel_at(pos) == Some(NavClass::Water)
    }

    #[inline]
    pub fn avoid_at(&mut self, pos: BlockPos) -> bool {
        self.cache.voxel_at(pos) == Some(NavClass::Avoid)
    }

    /// Live climbable check (ladders and vines cache as air)
    pub fn climbable_at(&self, pos: BlockPos) -> bool {
        self.adapter
            .block_at(pos)
            .map(|b| self.table.props(b.kind).climbable())
            .unwrap_or(false)
    }

    /// Live falling-block check (sand, gravel) for dig-safety gating
    pub fn falling_at(&self, pos: BlockPos) -> bool {
        self.adapter
            .block_at(pos)
            .map(|b| self.table.props(b.kind).falling())
            .unwrap_or(false)
    }

    // --- costs -------------------------------------------------------------

    /// Break time in ticks for the block at `pos`, or `+∞` when it cannot
    /// or must not be broken. Infinity is absorbing: no additive penalty
    /// ever rescues an unbreakable block.
    pub fn break_time(&mut self, pos: BlockPos) -> f64 {
        if !self.settings.can_dig {
            return f64::INFINITY;
        }
        if self.frame.is_break_avoided(pos) {
            return f64::INFINITY;
        }
        let Some(block) = self.adapter.block_at(pos) else {
            return f64::INFINITY;
        };
        let props = *self.table.props(block.kind);
        if !props.diggable() || props.avoid_break() {
            return f64::INFINITY;
        }
        if self
            .frame
            .avoid_break_kinds
            .contains(self.table.name(block.kind))
        {
            return f64::INFINITY;
        }
        if !props.hardness.is_finite() || props.hardness < 0.0 {
            return f64::INFINITY;
        }

        let (_, tool_speed) =
            self.tool_cache
                .best_for(block.kind, self.adapter, self.table, self.frame);
        let mut ticks = props.hardness as f64 * 30.0 / tool_speed.max(0.01) as f64;
        if !self.self_on_ground {
            ticks *= 5.0;
        }
        if self.self_in_water {
            ticks *= 5.0;
        }
        ticks + DIG_TICK_SURCHARGE
    }

    /// Combined corridor-bonus / avoidance-repulsion multiplier at `pos`
    #[inline]
    pub fn favoring_multiplier(&self, pos: BlockPos) -> f64 {
        self.favoring.multiplier(pos)
    }

    /// Goal heuristic with the frame's modifiers composed over it
    pub fn heuristic(&self, goal: &Goal, pos: BlockPos) -> f64 {
        self.frame.modify_heuristic(pos, goal.heuristic(pos))
    }

    /// Is a scaffolding block available to place?
    pub fn has_throwaway(&self) -> bool {
        self.throwaway_slot.is_some()
    }

    pub fn throwaway_slot(&self) -> Option<usize> {
        self.throwaway_slot
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::ToolClass;
    use crate::world::adapter::Item;
    use crate::world::sandbox::SandboxWorld;

    fn ctx_parts(world: &SandboxWorld) -> (BlockPropertyTable, ChunkCache, ToolCache, Favoring) {
        let table = world.table().clone();
        let mut cache = ChunkCache::new(48, 90);
        for cx in -2..=2 {
            for cz in -2..=2 {
                cache.load_column(crate::types::ChunkPos::new(cx, cz), world, &table);
            }
        }
        (table, cache, ToolCache::default(), Favoring::default())
    }

    #[test]
    fn test_break_time_uses_best_tool() {
        let mut world = SandboxWorld::flat(40, 63);
        world.give_item(Item::tool("iron_pickaxe", ToolClass::Pickaxe, 6.0));
        let (table, mut cache, mut tools, favoring) = ctx_parts(&world);
        let frame = BehaviorFrame::default();
        let mut ctx =
            CalculationContext::new(&world, &table, &mut cache, &mut tools, &favoring, &frame);

        let pos = BlockPos::new(3, 63, 3);
        let ticks = ctx.break_time(pos);
        // stone hardness 1.5, pickaxe speed 6: 1.5*30/6 + 1
        assert!((ticks - 8.5).abs() < 1e-9);
    }

    #[test]
    fn test_break_time_infinite_when_digging_disabled() {
        let world = SandboxWorld::flat(40, 63);
        let (table, mut cache, mut tools, favoring) = ctx_parts(&world);
        let mut frame = BehaviorFrame::default();
        frame.allow_break = false;
        let mut ctx =
            CalculationContext::new(&world, &table, &mut cache, &mut tools, &favoring, &frame);
        assert!(ctx.break_time(BlockPos::new(3, 63, 3)).is_infinite());
    }

    #[test]
    fn test_break_time_infinite_for_bedrock_and_avoided() {
        let mut world = SandboxWorld::flat(40, 63);
        world.set_block_named(BlockPos::new(1, 63, 0), "bedrock");
        let (table, mut cache, mut tools, favoring) = ctx_parts(&world);

        let mut frame = BehaviorFrame::default();
        frame
            .avoid_break_positions
            .push(crate::behavior::frame::PositionPredicate::Exact(
                BlockPos::new(2, 63, 0),
            ));
        let mut ctx =
            CalculationContext::new(&world, &table, &mut cache, &mut tools, &favoring, &frame);

        assert!(ctx.break_time(BlockPos::new(1, 63, 0)).is_infinite());
        assert!(ctx.break_time(BlockPos::new(2, 63, 0)).is_infinite());
        // Plain stone next to them is finite
        assert!(ctx.break_time(BlockPos::new(3, 63, 0)).is_finite());
    }

    #[test]
    fn test_tool_cache_invalidation_recomputes() {
        let mut world = SandboxWorld::flat(40, 63);
        let (table, mut cache, mut tools, favoring) = ctx_parts(&world);
        let frame = BehaviorFrame::default();

        {
            let mut ctx =
                CalculationContext::new(&world, &table, &mut cache, &mut tools, &favoring, &frame);
            let bare = ctx.break_time(BlockPos::new(3, 63, 3));
            assert!((bare - 46.0).abs() < 1e-9); // 1.5*30/1 + 1
        }

        world.give_item(Item::tool("iron_pickaxe", ToolClass::Pickaxe, 6.0));
        // Without invalidation the stale cache still answers; after
        // invalidation the new tool is found
        {
            let mut ctx =
                CalculationContext::new(&world, &table, &mut cache, &mut tools, &favoring, &frame);
            assert!((ctx.break_time(BlockPos::new(3, 63, 3)) - 46.0).abs() < 1e-9);
        }
        tools.invalidate();
        {
            let mut ctx =
                CalculationContext::new(&world, &table, &mut cache, &mut tools, &favoring, &frame);
            assert!((ctx.break_time(BlockPos::new(3, 63, 3)) - 8.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_lava_is_impassable_unless_tolerated() {
        let mut world = SandboxWorld::flat(40, 63);
        let lava = BlockPos::new(2, 64, 0);
        world.set_block_named(lava, "lava");
        let (table, mut cache, mut tools, favoring) = ctx_parts(&world);

        {
            let frame = BehaviorFrame::default();
            let mut ctx =
                CalculationContext::new(&world, &table, &mut cache, &mut tools, &favoring, &frame);
            assert!(!ctx.passable(lava));
        }
        {
            let mut frame = BehaviorFrame::default();
            frame.swim_through_lava = true;
            let mut ctx =
                CalculationContext::new(&world, &table, &mut cache, &mut tools, &favoring, &frame);
            assert!(ctx.passable(lava));
        }
    }

    #[test]
    fn test_escape_lava_opens_lava_only_from_inside() {
        let mut world = SandboxWorld::flat(40, 63);
        let lava = BlockPos::new(2, 64, 0);
        world.set_block_named(lava, "lava");
        // A chest is avoid-class too but must stay impassable
        let chest = BlockPos::new(3, 64, 0);
        world.set_block_named(chest, "chest");
        let (table, mut cache, mut tools, favoring) = ctx_parts(&world);

        // Standing on stone: escape_lava alone does not open lava
        {
            let frame = BehaviorFrame::default();
            let mut ctx =
                CalculationContext::new(&world, &table, &mut cache, &mut tools, &favoring, &frame);
            assert!(!ctx.passable(lava));
        }

        // Standing in lava: wading out is allowed, chests stay closed
        world.set_block_named(BlockPos::new(0, 64, 0), "lava");
        let (table, mut cache, mut tools, favoring) = ctx_parts(&world);
        let frame = BehaviorFrame::default();
        let mut ctx =
            CalculationContext::new(&world, &table, &mut cache, &mut tools, &favoring, &frame);
        assert!(ctx.passable(lava));
        assert!(!ctx.passable(chest));
    }

    #[test]
    fn test_throwaway_detection() {
        let mut world = SandboxWorld::flat(40, 63);
        {
            let (table, mut cache, mut tools, favoring) = ctx_parts(&world);
            let frame = BehaviorFrame::default();
            let ctx =
                CalculationContext::new(&world, &table, &mut cache, &mut tools, &favoring, &frame);
            // Bread is not placeable
            assert!(!ctx.has_throwaway());
        }
        world.give_item(Item::plain("cobblestone", 32));
        let (table, mut cache, mut tools, favoring) = ctx_parts(&world);
        let frame = BehaviorFrame::default();
        let ctx =
            CalculationContext::new(&world, &table, &mut cache, &mut tools, &favoring, &frame);
        assert!(ctx.has_throwaway());
    }
}
