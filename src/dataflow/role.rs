//! # Role: the device-specific half of the dataflow engine.
//!
//! A role declares, by position, which parameters and inputs it accepts and
//! what each does. The engine binds document entries to these lists in order:
//! the first `params` entry gets the first parameter handler, and so on.
//!
//! Handlers share role state through `Rc`s captured at construction; the
//! engine asks for fresh handler lists on every applied document.

use crate::dataflow::engine::Engine;
use crate::pubsub::Handler;

/// Device behaviour plugged into the [`Engine`].
pub trait Role {
    /// Identifier advertised in credential discovery (e.g. `vlx_led`).
    fn blueprint(&self) -> &str;

    /// Ordered parameter handlers.
    fn param_handlers(&self) -> Vec<Handler> {
        Vec::new()
    }

    /// Ordered input handlers.
    fn input_handlers(&self) -> Vec<Handler> {
        Vec::new()
    }

    /// One-time hardware initialisation, before any network activity.
    fn setup(&self) {}

    /// Starts the role's own tasks once a config is installed.
    fn setup_listeners(&self, _engine: &Engine) {}

    /// Tears down role tasks; called when the node's dataflow state is reset.
    fn reset(&self) {}
}
