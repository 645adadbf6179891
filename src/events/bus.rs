//! # Event bus for broadcasting runtime events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`]. Publishing is a
//! plain synchronous call, so the single-threaded scheduler and the dataflow
//! engine can emit events without an executor; receiving happens in the async
//! [`Runtime`](crate::Runtime) driver.
//!
//! ```text
//! Publishers (same thread):             Listener (async):
//!   Scheduler ──┐
//!   PubSub    ──┼──────► Bus ───────► Runtime listener ────► SubscriberSet
//!   Engine    ──┤  (broadcast chan)
//!   Node      ──┘
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks.
//! - **Bounded capacity**: lagging receivers get `RecvError::Lagged(n)` and skip `n` items.
//! - **No persistence**: events are dropped if nobody is listening.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime events.
///
/// Cheap to clone; every clone publishes into the same channel.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers; dropped if there are none.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that observes events sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new(1024)
    }
}
