//! Sampling task shared by roles that publish a local reading.
//!
//! ```text
//! setup: last = sample(), publish(last)
//! check: v = sample()
//!        policy.should_publish(now, changed(last, v)) ─► last = v, publish(v)
//!        never finishes on its own
//! ```
//!
//! Roles wrap it in a [`DependentTask`](crate::DependentTask) gated on their
//! own liveness, so a reset stops it.

use std::rc::Rc;

use crate::dataflow::{Engine, PublishPolicy};
use crate::events::{Event, EventKind};
use crate::tasks::{Context, Task};

/// A local reading a role publishes to `outputs[0]`.
pub(crate) trait Sampler {
    type Value: Copy;

    /// Takes one reading (and mirrors it locally if the role does).
    fn sample(&self) -> Self::Value;

    /// Whether `now` differs enough from `last` to publish in on-change mode.
    fn changed(&self, last: Self::Value, now: Self::Value) -> bool;

    /// Wire payload of a reading.
    fn payload(&self, value: Self::Value) -> String;
}

pub(crate) struct Listener<S: Sampler> {
    name: &'static str,
    engine: Engine,
    policy: Rc<PublishPolicy>,
    sampler: Rc<S>,
    last: Option<S::Value>,
}

impl<S: Sampler> Listener<S> {
    pub(crate) fn new(
        name: &'static str,
        engine: &Engine,
        policy: &Rc<PublishPolicy>,
        sampler: &Rc<S>,
    ) -> Self {
        Self {
            name,
            engine: engine.clone(),
            policy: Rc::clone(policy),
            sampler: Rc::clone(sampler),
            last: None,
        }
    }

    fn send(&mut self, ctx: &Context<'_>, value: S::Value) {
        self.last = Some(value);
        let payload = self.sampler.payload(value);
        if let Err(e) = self.engine.publish_output(0, &payload) {
            ctx.publish(
                Event::new(EventKind::OutputRejected)
                    .with_task(self.name)
                    .with_reason(e.as_message()),
            );
        }
        self.policy.mark(ctx.now_ms());
    }
}

impl<S: Sampler> Task for Listener<S> {
    fn name(&self) -> &str {
        self.name
    }

    fn setup(&mut self, ctx: &Context<'_>) {
        let value = self.sampler.sample();
        self.send(ctx, value);
    }

    fn check(&mut self, ctx: &Context<'_>) -> bool {
        let value = self.sampler.sample();
        let changed = match self.last {
            Some(last) => self.sampler.changed(last, value),
            None => true,
        };
        if self.policy.should_publish(ctx.now_ms(), changed) {
            self.send(ctx, value);
        }
        false
    }

    fn finish(&mut self, _ctx: &Context<'_>) {}
}
