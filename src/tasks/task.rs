//! # Task abstraction.
//!
//! A [`Task`] is owned by the scheduler from the moment it is queued until it
//! finishes. Callbacks receive a [`Context`] carrying the task's stable
//! [`TaskRef`], the scheduler clock and a handle for queueing further work.
//!
//! # Example
//! ```
//! use pinwire::{Context, Task};
//!
//! struct Countdown(u32);
//!
//! impl Task for Countdown {
//!     fn name(&self) -> &str { "countdown" }
//!     fn setup(&mut self, _ctx: &Context<'_>) {}
//!     fn check(&mut self, _ctx: &Context<'_>) -> bool {
//!         self.0 = self.0.saturating_sub(1);
//!         self.0 == 0
//!     }
//!     fn finish(&mut self, _ctx: &Context<'_>) {}
//! }
//! ```

use std::fmt;

use crate::core::Scheduler;
use crate::events::Event;

/// Stable identity of a queued task.
///
/// Valid for the task's whole life in the scheduler; never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskRef(pub(crate) u64);

impl TaskRef {
    /// Raw numeric id.
    pub fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// Per-call view handed to task callbacks.
pub struct Context<'a> {
    task: TaskRef,
    scheduler: &'a Scheduler,
}

impl<'a> Context<'a> {
    pub(crate) fn new(task: TaskRef, scheduler: &'a Scheduler) -> Self {
        Self { task, scheduler }
    }

    /// The task being driven.
    pub fn task(&self) -> TaskRef {
        self.task
    }

    /// Current reading of the scheduler clock.
    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    /// Scheduler driving this task; may be used to queue more work.
    pub fn scheduler(&self) -> &'a Scheduler {
        self.scheduler
    }

    /// Publishes an event on the scheduler's bus.
    pub fn publish(&self, ev: Event) {
        self.scheduler.bus().publish(ev);
    }
}

/// # Run-to-completion unit of polled work.
///
/// The scheduler calls `setup` exactly once on the first poll, then `check`
/// on that and every following poll until it returns `true`, then `finish`
/// exactly once, after which the task is dropped. No callback may block.
pub trait Task {
    /// Returns a human-readable task name.
    fn name(&self) -> &str {
        "task"
    }

    /// One-time initialization.
    fn setup(&mut self, ctx: &Context<'_>);

    /// Repeated readiness check; `true` means finished.
    fn check(&mut self, ctx: &Context<'_>) -> bool;

    /// One-time completion callback.
    fn finish(&mut self, ctx: &Context<'_>);
}

impl<T: Task + ?Sized> Task for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn setup(&mut self, ctx: &Context<'_>) {
        (**self).setup(ctx)
    }

    fn check(&mut self, ctx: &Context<'_>) -> bool {
        (**self).check(ctx)
    }

    fn finish(&mut self, ctx: &Context<'_>) {
        (**self).finish(ctx)
    }
}
