//! # Broker transport boundary.
//!
//! The broker client is an external collaborator. The core only needs three
//! primitives from it, plus a way to hand incoming messages back: the client
//! pushes every received [`Message`] into an [`InboxSender`](crate::InboxSender)
//! and the node drains them one per scheduler cycle.
//!
//! Methods take `&self`; implementations use interior mutability, matching the
//! single-threaded model of the scheduler.

use crate::error::TransportError;

/// A message received from, or destined to, the broker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Topic the message was published on.
    pub topic: String,
    /// Textual payload.
    pub payload: String,
}

impl Message {
    /// Creates a message.
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

/// Subscribe/unsubscribe/publish primitives of the broker client.
pub trait Transport {
    /// Starts receiving messages on `topic`.
    fn subscribe(&self, topic: &str) -> Result<(), TransportError>;

    /// Stops receiving messages on `topic`.
    fn unsubscribe(&self, topic: &str) -> Result<(), TransportError>;

    /// Publishes `payload` on `topic`.
    fn publish(&self, topic: &str, payload: &str) -> Result<(), TransportError>;
}
