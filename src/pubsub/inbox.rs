//! # Inbox: queue between the broker client and the scheduler.
//!
//! The broker client may receive on any thread; it only holds an
//! [`InboxSender`]. The node drains the [`Inbox`] one message per cycle, so
//! handler invocations are serialized with the rest of the scheduler.
//!
//! ## Rules
//! - **Bounded**: at most `capacity` messages wait; `push()` never blocks
//! - **Overflow**: a message that does not fit is dropped and `InboxOverflow` is published

use std::cell::RefCell;

use tokio::sync::mpsc;

use crate::events::{Bus, Event, EventKind};
use crate::pubsub::transport::Message;

/// Sending half handed to the broker client. Cheap to clone and `Send`.
#[derive(Clone, Debug)]
pub struct InboxSender {
    tx: mpsc::Sender<Message>,
    bus: Bus,
}

impl InboxSender {
    /// Queues a received message.
    ///
    /// Returns `false` if the message was dropped because the inbox is full
    /// or gone; the drop is reported on the bus.
    pub fn push(&self, msg: Message) -> bool {
        let (msg, reason) = match self.tx.try_send(msg) {
            Ok(()) => return true,
            Err(mpsc::error::TrySendError::Full(msg)) => (msg, "full"),
            Err(mpsc::error::TrySendError::Closed(msg)) => (msg, "closed"),
        };
        self.bus.publish(
            Event::new(EventKind::InboxOverflow)
                .with_topic(msg.topic)
                .with_reason(reason),
        );
        false
    }
}

/// Receiving half, owned by the node.
#[derive(Debug)]
pub struct Inbox {
    sender: InboxSender,
    rx: RefCell<mpsc::Receiver<Message>>,
}

impl Inbox {
    /// Creates an empty inbox holding at most `capacity` messages (minimum 1).
    pub fn new(capacity: usize, bus: Bus) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        Self {
            sender: InboxSender { tx, bus },
            rx: RefCell::new(rx),
        }
    }

    /// A new sending handle.
    pub fn sender(&self) -> InboxSender {
        self.sender.clone()
    }

    /// Takes the oldest queued message, if any.
    pub fn next(&self) -> Option<Message> {
        self.rx.borrow_mut().try_recv().ok()
    }

    /// Drops every queued message; returns how many were dropped.
    pub fn clear(&self) -> usize {
        let mut rx = self.rx.borrow_mut();
        let mut dropped = 0;
        while rx.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }

    /// Number of queued messages.
    pub fn len(&self) -> usize {
        self.rx.borrow().len()
    }

    /// True if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.rx.borrow().is_empty()
    }
}
