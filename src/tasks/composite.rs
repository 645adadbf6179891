//! # Composite task.
//!
//! [`CompositeTask`] forwards `setup`, `check` and `finish` to an inner task.
//! On its own it changes nothing; decorators such as
//! [`DependentTask`](crate::DependentTask) embed it and override only the
//! phase they care about.

use crate::tasks::task::{Context, Task};

/// Task that delegates every phase to an inner task.
pub struct CompositeTask {
    inner: Box<dyn Task>,
}

impl CompositeTask {
    /// Wraps `inner`.
    pub fn new(inner: impl Task + 'static) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }

    /// Unwraps the inner task.
    pub fn into_inner(self) -> Box<dyn Task> {
        self.inner
    }
}

impl Task for CompositeTask {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn setup(&mut self, ctx: &Context<'_>) {
        self.inner.setup(ctx)
    }

    fn check(&mut self, ctx: &Context<'_>) -> bool {
        self.inner.check(ctx)
    }

    fn finish(&mut self, ctx: &Context<'_>) {
        self.inner.finish(ctx)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::{ManualClock, Scheduler, TaskFn};

    #[test]
    fn test_forwards_phases_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (a, b, c) = (log.clone(), log.clone(), log.clone());
        let inner = TaskFn::new("inner")
            .on_setup(move |_| a.borrow_mut().push("setup"))
            .on_check(move |_| {
                b.borrow_mut().push("check");
                b.borrow().len() == 3
            })
            .on_finish(move |_| c.borrow_mut().push("finish"));

        let sched = Scheduler::new(ManualClock::new());
        let composite = CompositeTask::new(inner);
        assert_eq!(composite.name(), "inner");
        sched.queue(composite);

        sched.poll();
        sched.poll();
        sched.poll();

        assert_eq!(*log.borrow(), vec!["setup", "check", "check", "finish"]);
    }
}
