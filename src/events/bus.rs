/// Priority-ordered typed pub-sub over world events
///
/// Handlers register against one event kind with a priority (higher fires
/// first) and an optional once flag. The handler list is kept sorted at
/// registration time so publishing is a straight walk. A failing handler is
/// logged and never aborts the remaining handlers.
use bevy::log::warn;
use bevy::prelude::Resource;
use std::collections::HashMap;

use crate::errors::Result;
use crate::world::adapter::{WorldEvent, WorldEventKind};

pub type HandlerFn = Box<dyn FnMut(&WorldEvent) -> Result<()> + Send + Sync>;

/// Opaque handle for unsubscribing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Handler {
    id: SubscriptionId,
    name: String,
    priority: i32,
    once: bool,
    func: HandlerFn,
}

/// The event bus; one per bot, created at bootstrap and passed by handle
#[derive(Resource, Default)]
pub struct EventBus {
    handlers: HashMap<WorldEventKind, Vec<Handler>>,
    next_id: u64,
    /// Total events published (metrics)
    pub published: u64,
    /// Handler invocations that returned an error (metrics)
    pub handler_errors: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; higher priority fires first, equal priorities
    /// fire in registration order
    pub fn subscribe(
        &mut self,
        kind: WorldEventKind,
        name: &str,
        priority: i32,
        func: HandlerFn,
    ) -> SubscriptionId {
        self.register(kind, name, priority, false, func)
    }

    /// Register a handler that fires once and then unregisters itself
    pub fn once(
        &mut self,
        kind: WorldEventKind,
        name: &str,
        priority: i32,
        func: HandlerFn,
    ) -> SubscriptionId {
        self.register(kind, name, priority, true, func)
    }

    fn register(
        &mut self,
        kind: WorldEventKind,
        name: &str,
        priority: i32,
        once: bool,
        func: HandlerFn,
    ) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        let list = self.handlers.entry(kind).or_default();
        // Sorted insert keeps publish a plain walk; stable for equal priority
        let at = list
            .iter()
            .position(|h| h.priority < priority)
            .unwrap_or(list.len());
        list.insert(
            at,
            Handler {
                id,
                name: name.to_string(),
                priority,
                once,
                func,
            },
        );
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for list in self.handlers.values_mut() {
            if let Some(at) = list.iter().position(|h| h.id == id) {
                list.remove(at);
                return true;
            }
        }
        false
    }

    pub fn handler_count(&self, kind: WorldEventKind) -> usize {
        self.handlers.get(&kind).map(|l| l.len()).unwrap_or(0)
    }

    /// Fire all handlers registered for this event's kind.
    /// Returns the number of handlers invoked.
    pub fn publish(&mut self, event: &WorldEvent) -> usize {
        self.published += 1;
        let Some(list) = self.handlers.get_mut(&event.kind()) else {
            return 0;
        };
        let mut fired = 0;
        let mut spent: Vec<SubscriptionId> = Vec::new();
        for handler in list.iter_mut() {
            if let Err(e) = (handler.func)(event) {
                self.handler_errors += 1;
                warn!(
                    "⚠️ Event handler '{}' failed on {}: {}",
                    handler.name,
                    event.kind().name(),
                    e
                );
            }
            fired += 1;
            if handler.once {
                spent.push(handler.id);
            }
        }
        list.retain(|h| !spent.contains(&h.id));
        fired
    }
}

// ============================================================================
// TESTS
// ============================================================================
