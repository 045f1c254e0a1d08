//! Session hub — uid-bound outbound channels with drop-on-full
//! backpressure.
//!
//! Each WebSocket connection registers a bounded channel under its uid
//! after authentication. `send` serialises and `try_send`s: a full buffer
//! means the message is dropped and counted, never a blocked battle loop.

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tokio::sync::mpsc;

use hexfort_engine::Outbound;
use hexfort_types::messages::ServerMessage;
use hexfort_types::Uid;

#[derive(Debug, Default)]
pub struct SessionHub {
    sessions: Mutex<HashMap<Uid, mpsc::Sender<String>>>,
    dropped: AtomicU64,
}

impl SessionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a session's outbound channel to a uid. A reconnect replaces
    /// the previous session.
    pub fn register(&self, uid: Uid, tx: mpsc::Sender<String>) {
        self.sessions.lock().unwrap().insert(uid, tx);
        metrics::gauge!("hexfort_sessions").set(self.session_count() as f64);
    }

    pub fn unregister(&self, uid: Uid) {
        self.sessions.lock().unwrap().remove(&uid);
        metrics::gauge!("hexfort_sessions").set(self.session_count() as f64);
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    /// Messages dropped because a session buffer was full.
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn send_raw(&self, uid: Uid, json: &str) -> bool {
        let tx = {
            let sessions = self.sessions.lock().unwrap();
            sessions.get(&uid).cloned()
        };
        let Some(tx) = tx else {
            return false;
        };
        match tx.try_send(json.to_string()) {
            Ok(()) => true,
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("hexfort_messages_dropped_total").increment(1);
                false
            }
        }
    }
}

impl Outbound for SessionHub {
    fn send(&self, uid: Uid, message: &ServerMessage) -> bool {
        let json = match serde_json::to_string(message) {
            Ok(json) => json,
            Err(error) => {
                tracing::error!(%error, "server message failed to serialise");
                return false;
            }
        };
        self.send_raw(uid, &json)
    }

    fn broadcast(&self, uids: &BTreeSet<Uid>, message: &ServerMessage) -> usize {
        let json = match serde_json::to_string(message) {
            Ok(json) => json,
            Err(error) => {
                tracing::error!(%error, "server message failed to serialise");
                return 0;
            }
        };
        uids.iter().filter(|uid| self.send_raw(**uid, &json)).count()
    }
}
