//! `vlx_switch`: publishes a digital input as `true`/`false`.
//!
//! Parameters `[publish_on_change, publish_period]` select the
//! [`PublishPolicy`]. The status LED mirrors the input on every sample.

use std::cell::RefCell;
use std::rc::Rc;

use crate::dataflow::{Engine, PublishPolicy, Role};
use crate::pubsub::Handler;
use crate::roles::hal::{DigitalPin, StatusLed};
use crate::roles::listener::{Listener, Sampler};
use crate::tasks::{DependentTask, Liveness};

struct Hardware {
    input: RefCell<Box<dyn DigitalPin>>,
    led: RefCell<Box<dyn StatusLed>>,
}

impl Sampler for Hardware {
    type Value = bool;

    fn sample(&self) -> bool {
        let on = self.input.borrow_mut().is_high();
        self.led.borrow_mut().set(on);
        on
    }

    fn changed(&self, last: bool, now: bool) -> bool {
        last != now
    }

    fn payload(&self, value: bool) -> String {
        value.to_string()
    }
}

/// Switch role.
pub struct Switch {
    hw: Rc<Hardware>,
    policy: Rc<PublishPolicy>,
    liveness: RefCell<Liveness>,
}

impl Switch {
    /// Creates the role over its input and indicator.
    pub fn new(input: impl DigitalPin + 'static, led: impl StatusLed + 'static) -> Self {
        Self {
            hw: Rc::new(Hardware {
                input: RefCell::new(Box::new(input)),
                led: RefCell::new(Box::new(led)),
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

impl Role for Switch {
    fn blueprint(&self) -> &str {
        "vlx_switch"
    }

    fn param_handlers(&self) -> Vec<Handler> {
        self.policy.param_handlers()
    }

    fn setup_listeners(&self, engine: &Engine) {
        let dep = self.liveness.borrow().dependency();
        engine.scheduler().queue(DependentTask::new(
            [dep],
            Listener::new("switch-listener", engine, &self.policy, &self.hw),
        ));
    }

    fn reset(&self) {
        self.liveness.borrow_mut().revoke();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use super::*;
    use crate::pubsub::Message;
    use crate::roles::testing::{Bench, published};

    struct Pin(Rc<Cell<bool>>);
    impl DigitalPin for Pin {
        fn is_high(&mut self) -> bool {
            self.0.get()
        }
    }

    struct Led(Rc<Cell<bool>>);
    impl StatusLed for Led {
        fn set(&mut self, on: bool) {
            self.0.set(on);
        }
    }

    fn bench(params: &str) -> (Bench, Rc<Cell<bool>>, Rc<Cell<bool>>) {
        let (pin, led) = (Rc::new(Cell::new(false)), Rc::new(Cell::new(true)));
        let role = Rc::new(Switch::new(Pin(pin.clone()), Led(led.clone())));
        let bench = Bench::new(role);
        bench
            .engine
            .apply_config(&format!(r#"{{"id":1,"params":{params},"outputs":[20]}}"#))
            .unwrap();
        bench.engine.setup_listeners();
        (bench, pin, led)
    }

    #[test]
    fn test_publishes_on_change() {
        let (b, pin, led) = bench(r#"[{"id":1,"value":"true"},{"id":2,"value":"5000"}]"#);

        b.sched.poll();
        assert_eq!(published(&b), vec![Message::new("pin/20", "false")]);
        assert!(!led.get());

        b.sched.poll();
        assert_eq!(published(&b).len(), 1);

        pin.set(true);
        b.sched.poll();
        assert!(led.get());
        assert_eq!(published(&b).last(), Some(&Message::new("pin/20", "true")));
        assert_eq!(published(&b).len(), 2);
    }

    #[test]
    fn test_periodic_mode_ignores_changes() {
        let (b, pin, _) = bench(r#"[{"id":1,"value":"false"},{"id":2,"value":"1000"}]"#);

        b.sched.poll();
        pin.set(true);
        b.clock.advance(Duration::from_millis(999));
        b.sched.poll();
        assert_eq!(published(&b).len(), 1);

        b.clock.advance(Duration::from_millis(1));
        b.sched.poll();
        assert_eq!(published(&b).last(), Some(&Message::new("pin/20", "true")));
    }

    #[test]
    fn test_reset_stops_listener() {
        let (b, pin, _) = bench(r#"[{"id":1,"value":"true"},{"id":2,"value":"0"}]"#);
        b.sched.poll();
        assert_eq!(b.sched.len(), 1);

        b.engine.reset();
        pin.set(true);
        b.sched.poll();
        assert!(b.sched.is_empty());
        assert_eq!(published(&b).len(), 1);
    }
}
