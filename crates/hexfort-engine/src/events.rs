//! Typed event bus — synchronous, in-process publish/subscribe.
//!
//! Handlers registered for an event's kind run inline, in registration
//! order, on the emitter's task. A panicking handler is caught and logged;
//! it never prevents later handlers from running and never aborts the
//! emitter.

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use hexfort_types::{Aid, AttackId, Bid, Cid, ItemId, Sid, Uid};
use hexfort_types::attack::AttackPhase;

// =============================================================================
// Events
// =============================================================================

/// Everything the core announces on the bus.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A building or research item was completed.
    ItemCompleted { empire_uid: Uid, iid: ItemId },
    /// An attack moved to a new phase.
    AttackPhaseChanged {
        attack_id: AttackId,
        attacker_uid: Uid,
        defender_uid: Uid,
        army_aid: Aid,
        phase: AttackPhase,
    },
    /// An attack finished its siege; a battle should be instantiated.
    BattleStartRequested {
        attack_id: AttackId,
        attacker_uid: Uid,
        defender_uid: Uid,
        army_aid: Aid,
    },
    /// A battle concluded.
    BattleFinished { battle_id: Bid, defender_won: bool },
    /// A critter was killed (observer-grade battle event).
    CritterDied { battle_id: Bid, cid: Cid },
    /// A critter reached the castle (observer-grade battle event).
    CritterFinished { battle_id: Bid, cid: Cid },
    /// A structure fired a shot (observer-grade battle event).
    StructureShot { battle_id: Bid, sid: Sid, cid: Cid },
}

/// Discriminator used for subscription routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventKind {
    ItemCompleted,
    AttackPhaseChanged,
    BattleStartRequested,
    BattleFinished,
    CritterDied,
    CritterFinished,
    StructureShot,
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ItemCompleted { .. } => EventKind::ItemCompleted,
            Self::AttackPhaseChanged { .. } => EventKind::AttackPhaseChanged,
            Self::BattleStartRequested { .. } => EventKind::BattleStartRequested,
            Self::BattleFinished { .. } => EventKind::BattleFinished,
            Self::CritterDied { .. } => EventKind::CritterDied,
            Self::CritterFinished { .. } => EventKind::CritterFinished,
            Self::StructureShot { .. } => EventKind::StructureShot,
        }
    }
}

// =============================================================================
// Bus
// =============================================================================

type Handler = Box<dyn Fn(&GameEvent) + Send>;

/// Opaque handle for unsubscribing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerId(u64);

/// Synchronous typed event bus.
#[derive(Default)]
pub struct EventBus {
    handlers: BTreeMap<EventKind, Vec<(HandlerId, Handler)>>,
    next_id: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count: usize = self.handlers.values().map(Vec::len).sum();
        f.debug_struct("EventBus").field("handlers", &count).finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one event kind. Returns a handle for
    /// `unsubscribe`.
    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> HandlerId
    where
        F: Fn(&GameEvent) + Send + 'static,
    {
        self.next_id += 1;
        let id = HandlerId(self.next_id);
        self.handlers
            .entry(kind)
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    pub fn unsubscribe(&mut self, id: HandlerId) {
        for handlers in self.handlers.values_mut() {
            handlers.retain(|(hid, _)| *hid != id);
        }
    }

    /// Deliver an event to every handler registered for its kind, in
    /// registration order. Panics inside a handler are contained.
    pub fn emit(&self, event: &GameEvent) {
        let Some(handlers) = self.handlers.get(&event.kind()) else {
            return;
        };
        for (id, handler) in handlers {
            let result = catch_unwind(AssertUnwindSafe(|| handler(event)));
            if result.is_err() {
                tracing::error!(?event, handler = id.0, "event handler panicked");
            }
        }
    }

    /// Remove all handlers.
    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn died(cid: Cid) -> GameEvent {
        GameEvent::CritterDied { battle_id: 1, cid }
    }

    #[test]
    fn emit_triggers_handler() {
        let mut bus = EventBus::new();
        let seen = Arc::new(AtomicU32::new(0));
        let seen2 = seen.clone();
        bus.subscribe(EventKind::CritterDied, move |_| {
            seen2.fetch_add(1, Ordering::SeqCst);
        });
        bus.emit(&died(42));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn no_cross_kind_delivery() {
        let mut bus = EventBus::new();
        let seen = Arc::new(AtomicU32::new(0));
        let seen2 = seen.clone();
        bus.subscribe(EventKind::CritterDied, move |_| {
            seen2.fetch_add(1, Ordering::SeqCst);
        });
        bus.emit(&GameEvent::CritterFinished {
            battle_id: 1,
            cid: 1,
        });
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn handlers_run_in_registration_order() {
        let mut bus = EventBus::new();
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        for tag in 1..=3u32 {
            let order = order.clone();
            bus.subscribe(EventKind::CritterDied, move |_| {
                order.lock().unwrap().push(tag);
            });
        }
        bus.emit(&died(1));
        assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn panicking_handler_does_not_stop_later_handlers() {
        let mut bus = EventBus::new();
        let seen = Arc::new(AtomicU32::new(0));
        bus.subscribe(EventKind::CritterDied, |_| panic!("boom"));
        let seen2 = seen.clone();
        bus.subscribe(EventKind::CritterDied, move |_| {
            seen2.fetch_add(1, Ordering::SeqCst);
        });
        bus.emit(&died(1));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsubscribe_removes_handler() {
        let mut bus = EventBus::new();
        let seen = Arc::new(AtomicU32::new(0));
        let seen2 = seen.clone();
        let id = bus.subscribe(EventKind::CritterDied, move |_| {
            seen2.fetch_add(1, Ordering::SeqCst);
        });
        bus.unsubscribe(id);
        bus.emit(&died(1));
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn clear_removes_everything() {
        let mut bus = EventBus::new();
        bus.subscribe(EventKind::CritterDied, |_| panic!("should be gone"));
        bus.clear();
        bus.emit(&died(1));
    }
}
