//! Session surface contract — the only thing the simulation core needs
//! from the network layer.
//!
//! Battle simulators receive an `Outbound` at spawn time and push their
//! deltas and summaries through it. Implementations must be best-effort
//! and non-blocking: a slow recipient gets its message dropped, never a
//! stalled battle loop.

use std::collections::BTreeSet;

use hexfort_types::messages::ServerMessage;
use hexfort_types::Uid;

/// Best-effort delivery to connected sessions.
pub trait Outbound: Send + Sync {
    /// Deliver to a single session. Returns false when the uid has no
    /// session or its buffer is full; the message is dropped.
    fn send(&self, uid: Uid, message: &ServerMessage) -> bool;

    /// Fan a message out to a set of sessions. Returns the number of
    /// successful deliveries.
    fn broadcast(&self, uids: &BTreeSet<Uid>, message: &ServerMessage) -> usize {
        uids.iter().filter(|uid| self.send(**uid, message)).count()
    }
}

/// Discards everything; for tests and headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOutbound;

impl Outbound for NullOutbound {
    fn send(&self, _uid: Uid, _message: &ServerMessage) -> bool {
        false
    }
}
