/// Event-driven communication: the priority bus, the adapter bridge, and
/// the world-state trackers the behaviors query.
pub mod bridge;
pub mod bus;
pub mod trackers;

pub use bridge::drain_world_events;
pub use bus::{EventBus, HandlerFn, SubscriptionId};
pub use trackers::{DroppedItemTracker, EntityTracker, Tracker, TrackerManager, VitalsTracker};
