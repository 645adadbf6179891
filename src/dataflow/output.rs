//! # Output publish policy.
//!
//! Roles that emit values pick between two modes through their parameters:
//! - **on change**: publish whenever the observed value changes;
//! - **periodic**: publish at most once per `period`, whatever the value.
//!
//! [`PublishPolicy`] holds that state and the time of the last publish. It is
//! shared (`Rc`) between the parameter handlers that write it and the listener
//! task that reads it.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use crate::dataflow::payload::{parse_bool, parse_period};
use crate::pubsub::Handler;

/// Change-triggered vs periodic publishing, plus time since last publish.
#[derive(Debug)]
pub struct PublishPolicy {
    on_change: Cell<bool>,
    period_ms: Cell<u64>,
    last_ms: Cell<u64>,
}

impl PublishPolicy {
    /// On-change mode, 5 s period.
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            on_change: Cell::new(true),
            period_ms: Cell::new(5000),
            last_ms: Cell::new(0),
        })
    }

    /// Whether publishes are change-triggered.
    pub fn on_change(&self) -> bool {
        self.on_change.get()
    }

    /// Minimum spacing of periodic publishes.
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms.get())
    }

    /// Milliseconds since the last [`mark`](Self::mark).
    pub fn since_last(&self, now_ms: u64) -> u64 {
        now_ms.wrapping_sub(self.last_ms.get())
    }

    /// Records a publish at `now_ms`.
    pub fn mark(&self, now_ms: u64) {
        self.last_ms.set(now_ms);
    }

    /// Decides whether a sample warrants a publish.
    ///
    /// `changed` is the role's own notion of "different enough".
    pub fn should_publish(&self, now_ms: u64, changed: bool) -> bool {
        if self.on_change() {
            changed
        } else {
            self.since_last(now_ms) >= self.period_ms.get()
        }
    }

    /// Handlers for the `[publish_on_change, publish_period]` parameters.
    pub fn param_handlers(self: &Rc<Self>) -> Vec<Handler> {
        let mode = Rc::clone(self);
        let period = Rc::clone(self);
        vec![
            Rc::new(move |s: &str| mode.on_change.set(parse_bool(s))),
            Rc::new(move |s: &str| period.period_ms.set(parse_period(s))),
        ]
    }
}
