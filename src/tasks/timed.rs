//! # Timed task: work behind a minimum interval.
//!
//! [`TimedTask`] runs `work` at most once every `delay` and finishes when
//! `work` returns `true`; `callback` then runs once. It is the building block
//! for retry loops ("try to resolve the broker every 2s until it answers") and
//! for the scheduler's timeout helper.
//!
//! ```text
//! setup:  baseline = now - (immediate ? delay : 0)
//! check:  now - baseline >= delay ? { baseline = now; work() } : false
//! finish: callback()
//! ```
//!
//! The gate is re-armed from the moment of each fire, not accumulated, so a
//! late poll never causes a burst of catch-up calls.

use std::borrow::Cow;
use std::time::Duration;

use crate::clock::millis;
use crate::tasks::task::{Context, Task};

/// Debounced/periodic task.
pub struct TimedTask {
    name: Cow<'static, str>,
    work: Box<dyn FnMut(&Context<'_>) -> bool>,
    callback: Box<dyn FnMut(&Context<'_>)>,
    delay_ms: u64,
    immediate: bool,
    baseline: u64,
}

impl TimedTask {
    /// Creates an immediate timed task: the first check fires `work` right away.
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        work: impl FnMut(&Context<'_>) -> bool + 'static,
        callback: impl FnMut(&Context<'_>) + 'static,
        delay: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            work: Box::new(work),
            callback: Box::new(callback),
            delay_ms: millis(delay),
            immediate: true,
            baseline: 0,
        }
    }

    /// When `false`, the first fire waits a full `delay` after setup.
    pub fn immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }

    /// The configured interval.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Task for TimedTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn setup(&mut self, ctx: &Context<'_>) {
        let backdate = if self.immediate { self.delay_ms } else { 0 };
        self.baseline = ctx.now_ms().wrapping_sub(backdate);
    }

    fn check(&mut self, ctx: &Context<'_>) -> bool {
        let now = ctx.now_ms();
        if now.wrapping_sub(self.baseline) < self.delay_ms {
            return false;
        }
        self.baseline = now;
        (self.work)(ctx)
    }

    fn finish(&mut self, ctx: &Context<'_>) {
        (self.callback)(ctx)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::{ManualClock, Scheduler};

    fn counting(
        delay: Duration,
        immediate: bool,
        done_after: u32,
    ) -> (TimedTask, Rc<Cell<u32>>, Rc<Cell<u32>>) {
        let fires = Rc::new(Cell::new(0));
        let callbacks = Rc::new(Cell::new(0));
        let (f, c) = (fires.clone(), callbacks.clone());
        let task = TimedTask::new(
            "counting",
            move |_| {
                f.set(f.get() + 1);
                f.get() >= done_after
            },
            move |_| c.set(c.get() + 1),
            delay,
        )
        .immediate(immediate);
        (task, fires, callbacks)
    }

    #[test]
    fn test_immediate_fires_on_first_poll() {
        let clock = ManualClock::new();
        let sched = Scheduler::new(clock.clone());
        let (task, fires, _) = counting(Duration::from_millis(100), true, u32::MAX);
        sched.queue(task);

        sched.poll();
        assert_eq!(fires.get(), 1);

        clock.advance(Duration::from_millis(99));
        sched.poll();
        assert_eq!(fires.get(), 1);

        clock.advance(Duration::from_millis(1));
        sched.poll();
        assert_eq!(fires.get(), 2);
    }

    #[test]
    fn test_deferred_waits_full_delay() {
        let clock = ManualClock::new();
        clock.set(5_000);
        let sched = Scheduler::new(clock.clone());
        let (task, fires, _) = counting(Duration::from_millis(100), false, u32::MAX);
        sched.queue(task);

        sched.poll();
        clock.advance(Duration::from_millis(99));
        sched.poll();
        assert_eq!(fires.get(), 0);

        clock.advance(Duration::from_millis(1));
        sched.poll();
        assert_eq!(fires.get(), 1);
    }

    #[test]
    fn test_immediate_at_clock_zero_still_fires() {
        let sched = Scheduler::new(ManualClock::new());
        let (task, fires, _) = counting(Duration::from_secs(2), true, u32::MAX);
        sched.queue(task);
        sched.poll();
        assert_eq!(fires.get(), 1);
    }

    #[test]
    fn test_rearms_from_fire_time() {
        let clock = ManualClock::new();
        let sched = Scheduler::new(clock.clone());
        let (task, fires, _) = counting(Duration::from_millis(100), false, u32::MAX);
        sched.queue(task);
        sched.poll();

        // one late poll fires once, not three times
        clock.advance(Duration::from_millis(350));
        sched.poll();
        sched.poll();
        assert_eq!(fires.get(), 1);

        clock.advance(Duration::from_millis(100));
        sched.poll();
        assert_eq!(fires.get(), 2);
    }

    #[test]
    fn test_callback_runs_once_when_work_succeeds() {
        let clock = ManualClock::new();
        let sched = Scheduler::new(clock.clone());
        let (task, fires, callbacks) = counting(Duration::from_millis(10), true, 2);
        sched.queue(task);

        sched.poll();
        assert_eq!(callbacks.get(), 0);
        clock.advance(Duration::from_millis(10));
        sched.poll();
        assert_eq!((fires.get(), callbacks.get()), (2, 1));
        assert!(sched.is_empty());

        clock.advance(Duration::from_millis(10));
        sched.poll();
        assert_eq!((fires.get(), callbacks.get()), (2, 1));
    }
}
