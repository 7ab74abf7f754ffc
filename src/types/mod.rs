/// Core value types shared across the navigation engine
pub mod position;

pub use position::{
    BlockPos, ChunkPos, SectionPos, CARDINALS_XZ, DIAGONALS_XZ, SECTION_SIZE,
};
