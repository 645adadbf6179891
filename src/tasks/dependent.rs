//! # Dependent task.
//!
//! [`DependentTask`] wraps an inner task in a [`CompositeTask`] and watches a
//! set of [`Dependency`] flags. On every check, before the inner task is
//! consulted, all flags are read; if any is dead the task is marked aborted
//! and reports finished. An aborted task skips the inner `finish`, so no
//! stale completion side effect can fire after its session ended.
//!
//! ```text
//! check:  any dep dead? ──yes──► aborted = true, finished
//!                       └─no──► inner.check()
//! finish: aborted? ──yes──► (nothing)
//!                  └─no──► inner.finish()
//! ```

use crate::events::{Event, EventKind};
use crate::tasks::composite::CompositeTask;
use crate::tasks::dependency::Dependency;
use crate::tasks::task::{Context, Task};

/// Composite task cancelled by dead dependencies.
pub struct DependentTask {
    deps: Vec<Dependency>,
    inner: CompositeTask,
    aborted: bool,
}

impl DependentTask {
    /// Wraps `inner`, gated by `deps`.
    pub fn new(deps: impl IntoIterator<Item = Dependency>, inner: impl Task + 'static) -> Self {
        Self {
            deps: deps.into_iter().collect(),
            inner: CompositeTask::new(inner),
            aborted: false,
        }
    }

    /// Whether a dead dependency cut this task short.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }
}

impl Task for DependentTask {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn setup(&mut self, ctx: &Context<'_>) {
        self.inner.setup(ctx)
    }

    fn check(&mut self, ctx: &Context<'_>) -> bool {
        if self.deps.iter().any(|dep| !dep.is_alive()) {
            self.aborted = true;
            return true;
        }
        self.inner.check(ctx)
    }

    fn finish(&mut self, ctx: &Context<'_>) {
        if self.aborted {
            ctx.publish(Event::new(EventKind::TaskAborted).with_task(self.inner.name()));
            return;
        }
        self.inner.finish(ctx)
    }
}
