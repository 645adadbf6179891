//! # pinwire
//!
//! **pinwire** is the runtime of a networked field device: a cooperative task
//! scheduler and a dataflow engine that turns a remotely pushed configuration
//! document into a live, rewireable graph of pin/topic routes.
//!
//! Everything runs on one thread. Work is expressed as polled [`Task`]s, never
//! as blocking calls; cancellation is cooperative and flag based.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ broker client│   │   wireless   │   │  discovery   │   external collaborators
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            │ Inbox            │ on_*_connect     │ on_credentials
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Node (provisioning + reconnect glue)                             │
//! │  - Links (wireless, broker) → Dependency flags                    │
//! │  - Dependent/Timed tasks: resolve broker, request config, inbox   │
//! └──────┬──────────────────────────────────┬─────────────────────────┘
//!        ▼                                  ▼
//! ┌──────────────────────────┐     ┌──────────────────────────────────┐
//! │  Engine (dataflow)       │────►│  PubSub (topic → owned routes)   │──► Transport
//! │  - apply_config          │     └──────────────────────────────────┘
//! │  - retarget pin/<id>/src │
//! │  - Role handlers         │
//! └──────────────────────────┘
//!        │ tasks
//!        ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Scheduler (live set, insertion order, setup/check/finish)        │
//! │  polled every tick by Runtime::run                                │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                ▼ publish(Event)
//!                   Bus ──► Runtime listener ──► SubscriberSet ──► LogWriter, ...
//! ```
//!
//! ### Task lifecycle
//! ```text
//! queue(task) ──► next poll: setup()
//!                 every poll: check() ──true──► finish(), dropped
//!
//! DependentTask: dead dependency ──► finished, inner finish skipped
//! TimedTask:     work() at most once per delay, finished when work() == true
//! interval:      work() every period until clear_interval(ref)
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                           |
//! |-------------------|---------------------------------------------------------------|----------------------------------------------|
//! | **Tasks**         | Polled three-phase work and its decorators.                   | [`Task`], [`TaskFn`], [`TimedTask`], [`DependentTask`] |
//! | **Scheduling**    | Cooperative live set, timeouts and intervals.                 | [`Scheduler`], [`Runtime`]                   |
//! | **Dataflow**      | Config documents to routes; atomic source retargeting.        | [`Engine`], [`Role`]                         |
//! | **Routing**       | Owner-scoped, reference-counted topic routes.                 | [`PubSub`], [`Transport`], [`Inbox`]         |
//! | **Connectivity**  | Provisioning, link lifecycles, reconnect backoff.             | [`Node`], [`Link`], [`BackoffPolicy`]        |
//! | **Subscriber API**| Observe runtime events (logging, metrics, custom).            | [`Subscribe`], [`Event`]                     |
//! | **Errors**        | Typed, non-fatal errors.                                      | [`ConfigError`], [`OutputError`], [`RuntimeError`] |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use std::time::Duration;
//! use pinwire::{ManualClock, Scheduler};
//!
//! let clock = ManualClock::new();
//! let sched = Scheduler::new(clock.clone());
//! let beats = Rc::new(Cell::new(0));
//!
//! let b = beats.clone();
//! let heartbeat = sched.set_interval(move |_| b.set(b.get() + 1), Duration::from_secs(1), true);
//!
//! sched.poll();
//! clock.advance(Duration::from_secs(1));
//! sched.poll();
//! sched.clear_interval(heartbeat);
//! sched.poll();
//!
//! assert_eq!(beats.get(), 2);
//! assert!(sched.is_empty());
//! ```
mod clock;
mod core;
mod error;
mod events;
mod net;
mod policies;
mod pubsub;
mod subscribers;
mod tasks;

pub mod dataflow;
pub mod roles;

// ---- Public re-exports ----

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use core::{Runtime, RuntimeConfig, Scheduler};
pub use dataflow::{Engine, Input, NodeConfig, PublishPolicy, Role};
pub use error::{ConfigError, CredentialsError, OutputError, RuntimeError, TransportError};
pub use events::{Bus, Event, EventKind};
pub use net::{
    BrokerLink, Credentials, Discovery, Link, Node, NodeBuilder, Wireless, discovery_message,
};
pub use policies::{BackoffPolicy, JitterPolicy};
pub use pubsub::{Handler, Inbox, InboxSender, Message, Owner, PubSub, Transport};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{
    CompositeTask, Context, Dependency, DependentTask, Liveness, Task, TaskFn, TaskRef, TimedTask,
};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
