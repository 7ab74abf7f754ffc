/// Small shared utilities: timers and allocation-free scratch buffers
pub mod scratch;
pub mod timers;

pub use scratch::ScratchPool;
pub use timers::{Stopwatch, TimerGame, TimerReal};
