//! Runtime events: types and broadcast bus.
//!
//! Every notable transition in the node (task lifecycle, route changes,
//! configuration pushes, link drops, reconnect scheduling) is published as an
//! [`Event`]. Nothing in the core reads events back; they exist for logs.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Scheduler`, `DependentTask`, `PubSub`, `Engine`, `Node`,
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: `Runtime`'s listener, which fans out to a `SubscriberSet`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
