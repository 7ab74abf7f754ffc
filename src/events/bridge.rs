/// Per-bot bridge from the game adapter's event feed into the core
///
/// Drains the adapter once per tick, applies the core's own reactions
/// (chunk cache maintenance, tool-cache invalidation, tracker updates),
/// then publishes every event on the bus for downstream subscribers.
/// Core reactions always run, whether or not anything is subscribed.
use bevy::log::debug;

use crate::blocks::BlockPropertyTable;
use crate::events::bus::EventBus;
use crate::events::trackers::TrackerManager;
use crate::pathfinding::ToolCache;
use crate::world::adapter::{GameAdapter, WorldEvent};
use crate::world::chunk_cache::ChunkCache;

/// Drain and dispatch all pending world events. Returns the event count.
pub fn drain_world_events(
    adapter: &mut dyn GameAdapter,
    bus: &mut EventBus,
    cache: &mut ChunkCache,
    table: &BlockPropertyTable,
    trackers: &mut TrackerManager,
    tool_cache: &mut ToolCache,
) -> usize {
    let events = adapter.poll_events();
    if events.is_empty() {
        return 0;
    }

    for event in &events {
        // Core reactions first so subscribers observe the updated caches
        match event {
            WorldEvent::BlockUpdate { pos, kind } => {
                // Re-fetch for live openable state (the Maybe passability cases)
                let open = adapter.block_at(*pos).map(|b| b.open).unwrap_or(false);
                cache.on_block_update(*pos, *kind, open, table);
            }
            WorldEvent::ChunkColumnLoad { chunk } => {
                cache.load_column(*chunk, &*adapter, table);
            }
            WorldEvent::ChunkColumnUnload { chunk } => {
                cache.unload_column(*chunk);
            }
            WorldEvent::WindowClose { .. } => {
                // Inventory transactions commit on window close
                tool_cache.invalidate();
            }
            WorldEvent::Death => {
                tool_cache.invalidate();
            }
            _ => {}
        }

        trackers.on_event(event);
        bus.publish(event);
    }

    debug!("📨 Bridged {} world events", events.len());
    events.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::NavClass;
    use crate::types::BlockPos;
    use crate::world::sandbox::SandboxWorld;

    #[test]
    fn test_bridge_populates_chunk_cache() {
        let mut world = SandboxWorld::flat(20, 63);
        world.emit_initial_chunk_loads();
        let table = world.table().clone();

        let mut bus = EventBus::new();
        let mut cache = ChunkCache::new(-64, 320);
        let mut trackers = TrackerManager::default();
        let mut tool_cache = ToolCache::default();

        let count = drain_world_events(
            &mut world,
            &mut bus,
            &mut cache,
            &table,
            &mut trackers,
            &mut tool_cache,
        );
        assert!(count > 0);
        assert_eq!(
            cache.voxel_at(BlockPos::new(0, 63, 0)),
            Some(NavClass::Solid)
        );
        assert_eq!(cache.voxel_at(BlockPos::new(0, 64, 0)), Some(NavClass::Air));
    }

    #[test]
    fn test_bridge_keeps_cache_consistent_on_updates() {
        let mut world = SandboxWorld::flat(20, 63);
        world.emit_initial_chunk_loads();
        let table = world.table().clone();

        let mut bus = EventBus::new();
        let mut cache = ChunkCache::new(-64, 320);
        let mut trackers = TrackerManager::default();
        let mut tool_cache = ToolCache::default();

        drain_world_events(&mut world, &mut bus, &mut cache, &table, &mut trackers, &mut tool_cache);

        world.set_block_named(BlockPos::new(2, 64, 2), "stone");
        drain_world_events(&mut world, &mut bus, &mut cache, &table, &mut trackers, &mut tool_cache);
        assert_eq!(
            cache.voxel_at(BlockPos::new(2, 64, 2)),
            Some(NavClass::Solid)
        );
    }
}
