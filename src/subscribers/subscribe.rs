//! # Core subscriber trait
//!
//! Each subscriber is driven by its own worker fed by a bounded queue owned by
//! the [`SubscriberSet`](crate::SubscriberSet). A slow subscriber only delays
//! itself; overflowing its queue drops events for it alone.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use pinwire::{Event, EventKind, Subscribe};
//!
//! struct Drops;
//!
//! #[async_trait]
//! impl Subscribe for Drops {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::MessageUnrouted {
//!             // count it...
//!         }
//!     }
//!     fn name(&self) -> &'static str { "drops" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event subscribers.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for overflow/panic reports).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
