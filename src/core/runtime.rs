//! # Runtime: async driver for the cooperative scheduler.
//!
//! The [`Runtime`] owns the event bus, the [`Scheduler`] and the subscriber list.
//! It polls the scheduler once per tick on the calling task and forwards bus
//! events to subscribers until the given token is cancelled.
//!
//! ```text
//! Runtime::run(token)
//!   ├─ subscriber_listener(): Bus.subscribe() ─► SubscriberSet::emit(&Event)
//!   ├─ loop:
//!   │    ├─ token.cancelled() ─► break
//!   │    └─ tick             ─► scheduler.poll()
//!   └─ shutdown:
//!        ├─ Bus.publish(ShutdownRequested)
//!        └─ listener drains the bus, SubscriberSet::shutdown()
//! ```
//!
//! The scheduler is `!Send`, so `run` must be awaited on the thread that owns
//! it (a current-thread runtime or a `LocalSet`). Subscriber workers are
//! ordinary spawned tasks.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use pinwire::{MonotonicClock, Runtime, RuntimeConfig, TaskFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let rt = Runtime::new(RuntimeConfig::default(), MonotonicClock::new(), Vec::new());
//!     rt.scheduler().queue(TaskFn::new("hello").on_finish(|_| println!("hello")));
//!
//!     let token = CancellationToken::new();
//!     let stop = token.clone();
//!     let stopper = async move {
//!         tokio::time::sleep(Duration::from_millis(20)).await;
//!         stop.cancel();
//!     };
//!     tokio::join!(rt.run(token), stopper);
//! }
//! ```

use std::sync::Arc;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::clock::Clock;
use crate::core::config::RuntimeConfig;
use crate::core::scheduler::Scheduler;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::{Subscribe, SubscriberSet};

/// Drives one node: scheduler polling plus event delivery.
pub struct Runtime {
    cfg: RuntimeConfig,
    scheduler: Scheduler,
    subs: Vec<Arc<dyn Subscribe>>,
}

impl Runtime {
    /// Creates a runtime; the bus is sized from `cfg.bus_capacity`.
    pub fn new(
        cfg: RuntimeConfig,
        clock: impl Clock + 'static,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        Self {
            scheduler: Scheduler::with_bus(clock, bus),
            cfg,
            subs: subscribers,
        }
    }

    /// The runtime configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.cfg
    }

    /// Handle to the scheduler polled by [`run`](Self::run).
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// The event bus.
    pub fn bus(&self) -> &Bus {
        self.scheduler.bus()
    }

    /// Polls the scheduler every tick until `token` is cancelled.
    ///
    /// Returns once every subscriber has seen the final `ShutdownRequested`.
    pub async fn run(&self, token: CancellationToken) {
        let stop = CancellationToken::new();
        let listener = self.subscriber_listener(stop.clone());

        let mut tick = tokio::time::interval(self.cfg.tick_clamped());
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = tick.tick() => self.scheduler.poll(),
            }
        }

        self.bus().publish(Event::new(EventKind::ShutdownRequested));
        stop.cancel();
        let _ = listener.await;
    }

    /// Subscribes to the bus and forwards events to a fresh subscriber set.
    fn subscriber_listener(&self, stop: CancellationToken) -> JoinHandle<()> {
        let mut rx = self.bus().subscribe();
        let set = SubscriberSet::new(self.subs.clone(), self.bus().clone());
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    ev = rx.recv() => match ev {
                        Ok(ev) => set.emit(&ev),
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    },
                    _ = stop.cancelled() => {
                        loop {
                            match rx.try_recv() {
                                Ok(ev) => set.emit(&ev),
                                Err(TryRecvError::Lagged(_)) => continue,
                                Err(_) => break,
                            }
                        }
                        break;
                    }
                }
            }
            set.shutdown().await;
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::tasks::TaskFn;
    use crate::MonotonicClock;

    #[derive(Default)]
    struct Recorder {
        kinds: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: &Event) {
            self.kinds.lock().unwrap().push(ev.kind);
        }
        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    async fn cancel_after(token: CancellationToken, after: Duration) {
        tokio::time::sleep(after).await;
        token.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_until_cancelled() {
        let rt = Runtime::new(RuntimeConfig::default(), MonotonicClock::new(), Vec::new());
        let polls = Rc::new(Cell::new(0u32));

        let p = polls.clone();
        rt.scheduler().queue(TaskFn::new("forever").on_check(move |_| {
            p.set(p.get() + 1);
            false
        }));

        let token = CancellationToken::new();
        tokio::join!(
            rt.run(token.clone()),
            cancel_after(token, Duration::from_millis(50))
        );

        assert!(polls.get() >= 10, "polled {} times", polls.get());
        assert_eq!(rt.scheduler().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fires_on_driver_clock() {
        let rt = Runtime::new(RuntimeConfig::default(), MonotonicClock::new(), Vec::new());
        let fired = Rc::new(Cell::new(false));

        let f = fired.clone();
        rt.scheduler()
            .set_timeout(move |_| f.set(true), Duration::from_millis(30));

        let token = CancellationToken::new();
        tokio::join!(
            rt.run(token.clone()),
            cancel_after(token, Duration::from_millis(100))
        );
        assert!(fired.get());
        assert!(rt.scheduler().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_lifecycle_and_shutdown() {
        let rec = Arc::new(Recorder::default());
        let rt = Runtime::new(
            RuntimeConfig::default(),
            MonotonicClock::new(),
            vec![rec.clone()],
        );
        rt.scheduler().queue(TaskFn::new("once"));

        let token = CancellationToken::new();
        tokio::join!(
            rt.run(token.clone()),
            cancel_after(token, Duration::from_millis(10))
        );

        let kinds = rec.kinds.lock().unwrap().clone();
        assert!(kinds.contains(&EventKind::TaskStarted));
        assert!(kinds.contains(&EventKind::TaskFinished));
        assert_eq!(kinds.last(), Some(&EventKind::ShutdownRequested));
    }
}
