//! Built-in device roles.
//!
//! | Role | Blueprint | Params | Inputs | Output |
//! |---|---|---|---|---|
//! | [`Dimmer`] | `vlx_led` | none | `[power, brightness]` | none |
//! | [`Switch`] | `vlx_switch` | `[publish_on_change, publish_period]` | none | `true`/`false` |
//! | [`Slider`] | `vlx_slider` | `[publish_on_change, publish_period]` | none | integer percent |
//!
//! Hardware is reached through the traits in [`hal`].

pub mod hal;

mod dimmer;
mod listener;
mod slider;
mod switch;

pub use dimmer::Dimmer;
pub use slider::Slider;
pub use switch::Switch;

#[cfg(test)]
pub(crate) mod testing {
    use std::rc::Rc;

    use crate::dataflow::{Engine, Role};
    use crate::pubsub::testing::RecordingTransport;
    use crate::pubsub::{Message, PubSub};
    use crate::{ManualClock, Scheduler};

    /// An engine over a recording transport and a manual clock.
    pub(crate) struct Bench {
        pub(crate) clock: ManualClock,
        pub(crate) sched: Scheduler,
        pub(crate) transport: Rc<RecordingTransport>,
        pub(crate) engine: Engine,
    }

    impl Bench {
        pub(crate) fn new(role: Rc<dyn Role>) -> Self {
            let clock = ManualClock::new();
            let sched = Scheduler::new(clock.clone());
            let transport = Rc::new(RecordingTransport::default());
            let pubsub = PubSub::new(transport.clone(), sched.bus().clone());
            let engine = Engine::new(sched.clone(), pubsub, role);
            Self {
                clock,
                sched,
                transport,
                engine,
            }
        }
    }

    pub(crate) fn published(b: &Bench) -> Vec<Message> {
        b.transport.published.borrow().clone()
    }
}
