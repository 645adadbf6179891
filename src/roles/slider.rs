//! `vlx_slider`: publishes an averaged analog reading as a percentage.
//!
//! A reading is the mean of 10 conversions, scaled down by 100. It is sent as
//! `reading / 40 × 100`, truncated to an integer. In on-change mode a reading
//! must move by more than 1 to be published.

use std::cell::RefCell;
use std::rc::Rc;

use crate::dataflow::{Engine, PublishPolicy, Role};
use crate::pubsub::Handler;
use crate::roles::hal::AnalogPin;
use crate::roles::listener::{Listener, Sampler};
use crate::tasks::{DependentTask, Liveness};

const READS_PER_SAMPLE: u32 = 10;

struct Hardware {
    input: RefCell<Box<dyn AnalogPin>>,
}

impl Sampler for Hardware {
    type Value = i32;

    fn sample(&self) -> i32 {
        let mut input = self.input.borrow_mut();
        let sum: u32 = (0..READS_PER_SAMPLE).map(|_| u32::from(input.read())).sum();
        ((f64::from(sum) / f64::from(READS_PER_SAMPLE)).round() / 100.0) as i32
    }

    fn changed(&self, last: i32, now: i32) -> bool {
        (now - last).abs() > 1
    }

    fn payload(&self, value: i32) -> String {
        ((f64::from(value) / 40.0 * 100.0) as i32).to_string()
    }
}

/// Slider role.
pub struct Slider {
    hw: Rc<Hardware>,
    policy: Rc<PublishPolicy>,
    liveness: RefCell<Liveness>,
}

impl Slider {
    /// Creates the role over its analog input.
    pub fn new(input: impl AnalogPin + 'static) -> Self {
        Self {
            hw: Rc::new(Hardware {
                input: RefCell::new(Box::new(input)),
            }),
            policy: PublishPolicy::new(),
            liveness: RefCell::new(Liveness::new()),
        }
    }

    /// Current publish policy.
    pub fn policy(&self) -> &PublishPolicy {
        &self.policy
    }
}

impl Role for Slider {
    fn blueprint(&self) -> &str {
        "vlx_slider"
    }

    fn param_handlers(&self) -> Vec<Handler> {
        self.policy.param_handlers()
    }

    fn setup_listeners(&self, engine: &Engine) {
        let dep = self.liveness.borrow().dependency();
        engine.scheduler().queue(DependentTask::new(
            [dep],
            Listener::new("slider-listener", engine, &self.policy, &self.hw),
        ));
    }

    fn reset(&self) {
        self.liveness.borrow_mut().revoke();
    }
}
