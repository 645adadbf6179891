//! # Event subscribers.
//!
//! Subscribers consume the [`Event`](crate::Event)s published on the
//! [`Bus`](crate::Bus). The scheduler never waits on them: the
//! [`Runtime`](crate::Runtime) listener hands each event to a [`SubscriberSet`],
//! which queues it per subscriber and returns immediately.
//!
//! ```text
//! Scheduler/Engine/Node ── publish ──► Bus ──► Runtime listener ──► SubscriberSet
//!                                                         ┌──────────┼──────────┐
//!                                                         ▼          ▼          ▼
//!                                                     LogWriter   metrics    custom
//! ```

mod set;
mod subscribe;

#[cfg(feature = "logging")]
mod log;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
