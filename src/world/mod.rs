/// World access: the game-client adapter contract, the 2-bit chunk cache,
/// its optional region-file persistence, and the in-memory sandbox world
/// used by the demo binary and the integration tests.
pub mod adapter;
pub mod chunk_cache;
pub mod persistence;
pub mod sandbox;

pub use adapter::{
    Block, Controls, EntityId, EntityKind, GameAdapter, GameEntity, Item, WorldEvent, WorldEventKind,
};
pub use chunk_cache::{CachedSection, ChunkCache};
pub use persistence::{load_cache, save_cache};
pub use sandbox::SandboxWorld;
