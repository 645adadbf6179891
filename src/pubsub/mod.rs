//! Message routing between the broker client and the dataflow engine.
//!
//! - [`Transport`]: what the core needs from the broker client;
//! - [`Inbox`]/[`InboxSender`]: queue of received messages, drained once per cycle;
//! - [`PubSub`]: topic → handler routes, owned and reference counted.

mod inbox;
mod router;
mod transport;

pub use inbox::{Inbox, InboxSender};
pub use router::{Handler, Owner, PubSub};
pub use transport::{Message, Transport};

#[cfg(test)]
pub(crate) use transport::testing;
