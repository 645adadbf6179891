//! # Cooperative scheduler.
//!
//! The [`Scheduler`] owns every live task and drives them with [`Scheduler::poll`].
//! One poll is one cycle over the live set in insertion order:
//!
//! ```text
//! for task in live (insertion order):
//!   ├─ not started? ─► setup(), started = true
//!   ├─ check() == true ─► finish(), drop task
//!   └─ otherwise ─► keep for next cycle
//! ```
//!
//! ## Rules
//! - Single thread, no preemption: a callback that blocks stalls every task.
//! - Tasks queued from inside a callback join the live set on the **next** cycle.
//! - No borrow of scheduler state is held while a callback runs, so callbacks may
//!   freely queue tasks, clear intervals, or read the clock.
//! - `Scheduler` is a cheap handle (`Rc`); clones drive the same live set.
//!
//! ## Helpers
//! - [`Scheduler::set_timeout`]: one-shot delayed call
//! - [`Scheduler::set_interval`] / [`Scheduler::clear_interval`]: repeating work with external cancellation

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::clock::Clock;
use crate::events::{Bus, Event, EventKind};
use crate::tasks::{Context, Task, TaskRef, TimedTask};

struct Slot {
    id: TaskRef,
    started: bool,
    task: Box<dyn Task>,
}

struct Inner {
    clock: Box<dyn Clock>,
    bus: Bus,
    live: RefCell<Vec<Slot>>,
    queued: RefCell<Vec<Slot>>,
    intervals: RefCell<HashSet<TaskRef>>,
    next_id: Cell<u64>,
}

/// Handle to the single cooperative scheduler of a node.
#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<Inner>,
}

impl Scheduler {
    /// Creates a scheduler with its own event bus.
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self::with_bus(clock, Bus::default())
    }

    /// Creates a scheduler publishing on `bus`.
    pub fn with_bus(clock: impl Clock + 'static, bus: Bus) -> Self {
        Self {
            inner: Rc::new(Inner {
                clock: Box::new(clock),
                bus,
                live: RefCell::new(Vec::new()),
                queued: RefCell::new(Vec::new()),
                intervals: RefCell::new(HashSet::new()),
                next_id: Cell::new(1),
            }),
        }
    }

    /// Current clock reading in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.inner.clock.now_ms()
    }

    /// Event bus shared by everything driven by this scheduler.
    pub fn bus(&self) -> &Bus {
        &self.inner.bus
    }

    /// Hands `task` to the scheduler; it is first polled on the next cycle.
    pub fn queue(&self, task: impl Task + 'static) -> TaskRef {
        let id = TaskRef(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner.queued.borrow_mut().push(Slot {
            id,
            started: false,
            task: Box::new(task),
        });
        id
    }

    /// Runs one cycle over all live tasks.
    pub fn poll(&self) {
        let mut live = std::mem::take(&mut *self.inner.live.borrow_mut());
        live.append(&mut *self.inner.queued.borrow_mut());

        let mut kept = Vec::with_capacity(live.len());
        for mut slot in live {
            let ctx = Context::new(slot.id, self);
            if !slot.started {
                slot.task.setup(&ctx);
                slot.started = true;
                self.publish_lifecycle(EventKind::TaskStarted, &slot);
            }
            if slot.task.check(&ctx) {
                slot.task.finish(&ctx);
                self.publish_lifecycle(EventKind::TaskFinished, &slot);
            } else {
                kept.push(slot);
            }
        }

        // tasks queued during this cycle stay in `queued` until the next one
        *self.inner.live.borrow_mut() = kept;
    }

    /// Calls `callback` once, `delay` after the task is first polled.
    pub fn set_timeout(
        &self,
        callback: impl FnMut(&Context<'_>) + 'static,
        delay: Duration,
    ) -> TaskRef {
        self.queue(TimedTask::new("timeout", |_| true, callback, delay).immediate(false))
    }

    /// Calls `work` every `every` until [`clear_interval`](Self::clear_interval) is
    /// called with the returned ref. With `immediate`, the first call happens on
    /// the first poll.
    pub fn set_interval(
        &self,
        mut work: impl FnMut(&Context<'_>) + 'static,
        every: Duration,
        immediate: bool,
    ) -> TaskRef {
        let timed = TimedTask::new(
            "interval",
            move |ctx| {
                work(ctx);
                false
            },
            |_| {},
            every,
        )
        .immediate(immediate);
        let id = self.queue(IntervalTask { timed });
        // live from the moment it is queued, so a clear before the first poll still cancels
        self.inner.intervals.borrow_mut().insert(id);
        id
    }

    /// Cancels an interval. The task reports finished on its next check.
    ///
    /// Unknown or already-cleared refs are ignored.
    pub fn clear_interval(&self, interval: TaskRef) {
        if self.inner.intervals.borrow_mut().remove(&interval) {
            self.inner.bus.publish(
                Event::new(EventKind::IntervalCleared).with_attempt(interval.id()),
            );
        }
    }

    fn interval_is_live(&self, interval: TaskRef) -> bool {
        self.inner.intervals.borrow().contains(&interval)
    }

    /// Whether `task` is still owned by the scheduler.
    ///
    /// Tasks are invisible to this call while their own cycle is running.
    pub fn contains(&self, task: TaskRef) -> bool {
        let live = self.inner.live.borrow();
        let queued = self.inner.queued.borrow();
        live.iter().chain(queued.iter()).any(|slot| slot.id == task)
    }

    /// Number of tasks owned by the scheduler (live and queued).
    pub fn len(&self) -> usize {
        self.inner.live.borrow().len() + self.inner.queued.borrow().len()
    }

    /// True if no task is owned by the scheduler.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn publish_lifecycle(&self, kind: EventKind, slot: &Slot) {
        self.inner.bus.publish(
            Event::new(kind)
                .with_task(slot.task.name())
                .with_attempt(slot.id.id()),
        );
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("now_ms", &self.now_ms())
            .field("tasks", &self.len())
            .finish()
    }
}

/// Timed task that also stops once its ref leaves the interval set.
struct IntervalTask {
    timed: TimedTask,
}

impl Task for IntervalTask {
    fn name(&self) -> &str {
        "interval"
    }

    fn setup(&mut self, ctx: &Context<'_>) {
        self.timed.setup(ctx)
    }

    fn check(&mut self, ctx: &Context<'_>) -> bool {
        if !ctx.scheduler().interval_is_live(ctx.task()) {
            return true;
        }
        self.timed.check(ctx)
    }

    fn finish(&mut self, _ctx: &Context<'_>) {}
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::{ManualClock, TaskFn};

    type Log = Rc<RefCell<Vec<String>>>;

    fn traced(name: &'static str, log: &Log, checks_until_done: u32) -> TaskFn {
        let (a, b, c) = (log.clone(), log.clone(), log.clone());
        let n = Rc::new(Cell::new(0));
        TaskFn::new(name)
            .on_setup(move |_| a.borrow_mut().push(format!("{name}:setup")))
            .on_check(move |_| {
                n.set(n.get() + 1);
                b.borrow_mut().push(format!("{name}:check"));
                n.get() >= checks_until_done
            })
            .on_finish(move |_| c.borrow_mut().push(format!("{name}:finish")))
    }

    #[test]
    fn test_lifecycle_runs_each_phase_in_order() {
        let log: Log = Rc::default();
        let sched = Scheduler::new(ManualClock::new());
        sched.queue(traced("a", &log, 2));

        for _ in 0..4 {
            sched.poll();
        }

        assert_eq!(
            *log.borrow(),
            vec!["a:setup", "a:check", "a:check", "a:finish"]
        );
        assert!(sched.is_empty());
    }

    #[test]
    fn test_insertion_order_within_cycle() {
        let log: Log = Rc::default();
        let sched = Scheduler::new(ManualClock::new());
        sched.queue(traced("a", &log, 2));
        sched.queue(traced("b", &log, 1));

        sched.poll();
        assert_eq!(
            *log.borrow(),
            vec!["a:setup", "a:check", "b:setup", "b:check", "b:finish"]
        );
        assert_eq!(sched.len(), 1);
    }

    #[test]
    fn test_task_queued_from_callback_runs_next_cycle() {
        let sched = Scheduler::new(ManualClock::new());
        let ran = Rc::new(Cell::new(false));

        let r = ran.clone();
        sched.queue(TaskFn::new("spawner").on_finish(move |ctx| {
            let r = r.clone();
            ctx.scheduler()
                .queue(TaskFn::new("child").on_finish(move |_| r.set(true)));
        }));

        sched.poll();
        assert!(!ran.get());
        assert_eq!(sched.len(), 1);

        sched.poll();
        assert!(ran.get());
        assert!(sched.is_empty());
    }

    #[test]
    fn test_context_carries_stable_ref() {
        let sched = Scheduler::new(ManualClock::new());
        let seen = Rc::new(RefCell::new(Vec::new()));

        let (a, b) = (seen.clone(), seen.clone());
        let id = sched.queue(
            TaskFn::new("self")
                .on_setup(move |ctx| a.borrow_mut().push(ctx.task()))
                .on_finish(move |ctx| b.borrow_mut().push(ctx.task())),
        );
        assert!(sched.contains(id));
        sched.poll();

        assert_eq!(*seen.borrow(), vec![id, id]);
        assert!(!sched.contains(id));
    }

    #[test]
    fn test_timeout_fires_once_after_delay() {
        let clock = ManualClock::new();
        let sched = Scheduler::new(clock.clone());
        let fired = Rc::new(Cell::new(0));

        let f = fired.clone();
        sched.set_timeout(move |_| f.set(f.get() + 1), Duration::from_secs(2));
        sched.poll();
        clock.advance(Duration::from_millis(1999));
        sched.poll();
        assert_eq!(fired.get(), 0);

        clock.advance(Duration::from_millis(1));
        sched.poll();
        sched.poll();
        assert_eq!(fired.get(), 1);
        assert!(sched.is_empty());
    }

    #[test]
    fn test_interval_fires_until_cleared() {
        let clock = ManualClock::new();
        let sched = Scheduler::new(clock.clone());
        let fired = Rc::new(Cell::new(0));

        let f = fired.clone();
        let interval = sched.set_interval(
            move |_| f.set(f.get() + 1),
            Duration::from_millis(100),
            true,
        );

        sched.poll();
        assert_eq!(fired.get(), 1);
        for _ in 0..3 {
            clock.advance(Duration::from_millis(100));
            sched.poll();
        }
        assert_eq!(fired.get(), 4);

        sched.clear_interval(interval);
        clock.advance(Duration::from_millis(100));
        sched.poll();
        assert_eq!(fired.get(), 4, "no work after clear");
        assert!(!sched.contains(interval), "removed within one poll");
    }

    #[test]
    fn test_interval_cleared_before_first_poll() {
        let sched = Scheduler::new(ManualClock::new());
        let fired = Rc::new(Cell::new(0));

        let f = fired.clone();
        let interval = sched.set_interval(move |_| f.set(f.get() + 1), Duration::ZERO, true);
        sched.clear_interval(interval);
        sched.poll();

        assert_eq!(fired.get(), 0);
        assert!(sched.is_empty());
    }

    #[test]
    fn test_clear_unknown_interval_is_noop() {
        let sched = Scheduler::new(ManualClock::new());
        let mut rx = sched.bus().subscribe();
        let one_shot = sched.queue(TaskFn::new("one-shot"));

        sched.clear_interval(one_shot);
        sched.clear_interval(TaskRef(999));

        assert!(rx.try_recv().is_err());
        assert!(sched.contains(one_shot));
    }

    #[test]
    fn test_interval_cleared_from_another_task() {
        let clock = ManualClock::new();
        let sched = Scheduler::new(clock.clone());
        let fired = Rc::new(Cell::new(0));
        let ready = Rc::new(Cell::new(false));

        let f = fired.clone();
        let interval =
            sched.set_interval(move |_| f.set(f.get() + 1), Duration::from_millis(10), true);
        let r = ready.clone();
        sched.queue(
            TaskFn::new("waiter")
                .on_check(move |_| r.get())
                .on_finish(move |ctx| ctx.scheduler().clear_interval(interval)),
        );

        sched.poll();
        ready.set(true);
        clock.advance(Duration::from_millis(10));
        sched.poll();
        assert_eq!(fired.get(), 2);

        clock.advance(Duration::from_millis(10));
        sched.poll();
        assert_eq!(fired.get(), 2);
        assert!(sched.is_empty());
    }

    #[test]
    fn test_lifecycle_events_are_published() {
        let sched = Scheduler::new(ManualClock::new());
        let mut rx = sched.bus().subscribe();
        let id = sched.queue(TaskFn::new("evt"));
        sched.poll();

        let started = rx.try_recv().unwrap();
        assert_eq!(started.kind, EventKind::TaskStarted);
        assert_eq!(started.task.as_deref(), Some("evt"));
        assert_eq!(started.attempt, Some(id.id()));
        assert_eq!(rx.try_recv().unwrap().kind, EventKind::TaskFinished);
    }
}
