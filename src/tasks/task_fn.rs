//! # Function-backed task (`TaskFn`)
//!
//! [`TaskFn`] assembles a [`Task`] from up to three closures. Missing phases
//! default to a no-op setup, a check that is immediately done, and a no-op
//! finish, so `TaskFn::new("x").on_finish(f)` runs `f` on the next poll.
//!
//! ## Example
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use pinwire::{ManualClock, Scheduler, TaskFn};
//!
//! let sched = Scheduler::new(ManualClock::new());
//! let ticks = Rc::new(Cell::new(0));
//!
//! let t = ticks.clone();
//! sched.queue(
//!     TaskFn::new("three-ticks").on_check(move |_| {
//!         t.set(t.get() + 1);
//!         t.get() == 3
//!     }),
//! );
//!
//! for _ in 0..5 {
//!     sched.poll();
//! }
//! assert_eq!(ticks.get(), 3);
//! assert!(sched.is_empty());
//! ```

use std::borrow::Cow;
use std::fmt;

use crate::tasks::task::{Context, Task};

type PhaseFn = Box<dyn FnMut(&Context<'_>)>;
type CheckFn = Box<dyn FnMut(&Context<'_>) -> bool>;

/// Closure-backed task.
pub struct TaskFn {
    name: Cow<'static, str>,
    setup: PhaseFn,
    check: CheckFn,
    finish: PhaseFn,
}

impl TaskFn {
    /// Creates a task that does nothing and finishes on its first poll.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            setup: Box::new(|_| {}),
            check: Box::new(|_| true),
            finish: Box::new(|_| {}),
        }
    }

    /// Sets the one-time setup callback.
    pub fn on_setup(mut self, f: impl FnMut(&Context<'_>) + 'static) -> Self {
        self.setup = Box::new(f);
        self
    }

    /// Sets the readiness check.
    pub fn on_check(mut self, f: impl FnMut(&Context<'_>) -> bool + 'static) -> Self {
        self.check = Box::new(f);
        self
    }

    /// Sets the completion callback.
    pub fn on_finish(mut self, f: impl FnMut(&Context<'_>) + 'static) -> Self {
        self.finish = Box::new(f);
        self
    }
}

impl fmt::Debug for TaskFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskFn").field("name", &self.name).finish()
    }
}

impl Task for TaskFn {
    fn name(&self) -> &str {
        &self.name
    }

    fn setup(&mut self, ctx: &Context<'_>) {
        (self.setup)(ctx)
    }

    fn check(&mut self, ctx: &Context<'_>) -> bool {
        (self.check)(ctx)
    }

    fn finish(&mut self, ctx: &Context<'_>) {
        (self.finish)(ctx)
    }
}
