//! # Runtime events emitted by the scheduler, the dataflow engine and the node.
//!
//! [`EventKind`] classifies events into:
//! - **Task lifecycle**: setup ran, task finished, dependent task aborted, interval cleared
//! - **Routing**: topic subscribed/unsubscribed, message without a route, inbox overflow,
//!   transport failure
//! - **Dataflow**: config applied/rejected, control payload rejected, input retargeted,
//!   output rejected, reset
//! - **Connectivity**: link up/down, reconnect scheduled, credentials received/rejected
//! - **Subscribers**: overflow and panic of log consumers
//!
//! ## Ordering
//! Each event carries a process-wide sequence number (`seq`) that increases
//! monotonically, so consumers can restore emission order.
//!
//! ## Example
//! ```rust
//! use pinwire::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::SourceRetargeted)
//!     .with_topic("pin/10/src")
//!     .with_pin(5);
//!
//! assert_eq!(ev.kind, EventKind::SourceRetargeted);
//! assert_eq!(ev.topic.as_deref(), Some("pin/10/src"));
//! assert_eq!(ev.pin, Some(5));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Next `seq` value; shared by every bus in the process.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// What happened on the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Task lifecycle ===
    /// A task ran its one-time setup.
    ///
    /// Sets: `task` (name), `attempt` (task ref id)
    TaskStarted,

    /// A task reported finished and its completion callback ran.
    ///
    /// Sets: `task`, `attempt` (task ref id)
    TaskFinished,

    /// A dependent task observed a dead dependency; its completion side effect is skipped.
    ///
    /// Sets: `task`
    TaskAborted,

    /// An interval was cancelled by its owner.
    ///
    /// Sets: `attempt` (task ref id)
    IntervalCleared,

    // === Routing ===
    /// A topic gained its first route and was subscribed on the transport.
    ///
    /// Sets: `topic`
    Subscribed,

    /// A topic lost its last route and was unsubscribed on the transport.
    ///
    /// Sets: `topic`
    Unsubscribed,

    /// A message arrived for a topic without routes and was dropped.
    ///
    /// Sets: `topic`
    MessageUnrouted,

    /// A received message did not fit in the inbox and was dropped.
    ///
    /// Sets: `topic`, `reason` (`full` or `closed`)
    InboxOverflow,

    /// The transport refused a request.
    ///
    /// Sets: `topic`, `reason`
    TransportFailed,

    // === Dataflow ===
    /// A configuration document was installed.
    ///
    /// Sets: `pin` (node id)
    ConfigApplied,

    /// A configuration document was rejected; current state untouched.
    ///
    /// Sets: `reason`
    ConfigRejected,

    /// A control payload (source retarget) was rejected.
    ///
    /// Sets: `topic`, `reason`
    ControlRejected,

    /// An input switched to a new upstream source.
    ///
    /// Sets: `topic` (control topic), `pin` (new source, absent when cleared)
    SourceRetargeted,

    /// A role could not publish an output value.
    ///
    /// Sets: `task` (listener name), `reason`
    OutputRejected,

    /// The dataflow state was discarded.
    NodeReset,

    // === Connectivity ===
    /// A link (wireless, broker) came up.
    ///
    /// Sets: `task` (link name)
    LinkUp,

    /// A link went down; its dependency flag was revoked.
    ///
    /// Sets: `task` (link name)
    LinkDown,

    /// A reconnect attempt was scheduled.
    ///
    /// Sets: `task` (link name), `delay_ms`, `attempt`
    ReconnectScheduled,

    /// Provisioning credentials were received.
    CredentialsReceived,

    /// A provisioning reply could not be parsed.
    ///
    /// Sets: `reason`
    CredentialsRejected,

    // === Subscribers ===
    /// A subscriber's queue was full or closed; the event was dropped for it.
    ///
    /// Sets: `task` (subscriber name), `reason`
    SubscriberOverflow,

    /// A subscriber panicked while handling an event.
    ///
    /// Sets: `task` (subscriber name), `reason` (panic message)
    SubscriberPanicked,

    /// The async driver was asked to stop.
    ShutdownRequested,
}

/// One node event. Only `seq`, `at` and `kind` are always set; see each
/// [`EventKind`] for the optional fields it fills in.
#[derive(Clone, Debug)]
pub struct Event {
    /// Emission order across the process.
    pub seq: u64,
    /// Wall-clock time of emission, for logs only.
    pub at: SystemTime,
    /// Kind of transition.
    pub kind: EventKind,

    /// Task, link or subscriber name, if applicable.
    pub task: Option<Arc<str>>,
    /// Topic involved, if applicable.
    pub topic: Option<Arc<str>>,
    /// Pin or node id involved, if applicable.
    pub pin: Option<u32>,
    /// Error text or other detail for humans.
    pub reason: Option<Arc<str>>,
    /// Delay before the next attempt in milliseconds.
    pub delay_ms: Option<u32>,
    /// Attempt count or task ref id.
    pub attempt: Option<u64>,
}

impl Event {
    /// Stamps a new event of `kind`.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            topic: None,
            pin: None,
            reason: None,
            delay_ms: None,
            attempt: None,
        }
    }

    /// Attaches a task, link or subscriber name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a topic.
    #[inline]
    pub fn with_topic(mut self, topic: impl Into<Arc<str>>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Attaches a pin or node id.
    #[inline]
    pub fn with_pin(mut self, pin: u32) -> Self {
        self.pin = Some(pin);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches an attempt count or task ref id.
    #[inline]
    pub fn with_attempt(mut self, n: u64) -> Self {
        self.attempt = Some(n);
        self
    }

    /// `SubscriberOverflow` for `subscriber`.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(reason)
    }

    /// `SubscriberPanicked` for `subscriber`, with the panic message.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }
}
