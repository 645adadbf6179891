//! `vlx_led`: a PWM dimmer driven by two inputs, `[power, brightness]`.
//!
//! duty = power × brightness / 100 × 255, with brightness clamped to `0..=100`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::dataflow::payload::{parse_bool, parse_int};
use crate::dataflow::Role;
use crate::pubsub::Handler;
use crate::roles::hal::PwmChannel;

struct State {
    pwm: RefCell<Box<dyn PwmChannel>>,
    power: Cell<bool>,
    brightness: Cell<u8>,
}

impl State {
    fn update(&self) {
        let duty = if self.power.get() {
            (f64::from(self.brightness.get()) / 100.0 * 255.0) as u8
        } else {
            0
        };
        self.pwm.borrow_mut().set_duty(duty);
    }
}

/// Dimmer role.
pub struct Dimmer {
    state: Rc<State>,
}

impl Dimmer {
    /// Off, at full brightness.
    pub fn new(pwm: impl PwmChannel + 'static) -> Self {
        Self {
            state: Rc::new(State {
                pwm: RefCell::new(Box::new(pwm)),
                power: Cell::new(false),
                brightness: Cell::new(100),
            }),
        }
    }

    /// Whether the output is switched on.
    pub fn power(&self) -> bool {
        self.state.power.get()
    }

    /// Brightness percent.
    pub fn brightness(&self) -> u8 {
        self.state.brightness.get()
    }
}

impl Role for Dimmer {
    fn blueprint(&self) -> &str {
        "vlx_led"
    }

    fn input_handlers(&self) -> Vec<Handler> {
        let power = Rc::clone(&self.state);
        let brightness = Rc::clone(&self.state);
        vec![
            Rc::new(move |s: &str| {
                power.power.set(parse_bool(s));
                power.update();
            }),
            Rc::new(move |s: &str| {
                brightness.brightness.set(parse_int(s).clamp(0, 100) as u8);
                brightness.update();
            }),
        ]
    }

    fn setup(&self) {
        self.state.update();
    }
}
