//! # Dataflow engine: configuration documents to live routes.
//!
//! The [`Engine`] turns a pushed configuration document into bound handlers
//! and topic routes, and keeps that wiring consistent as inputs are
//! retargeted at runtime.
//!
//! ## Applying a document
//! ```text
//! apply_config(doc)
//!   ├─ parse, check counts and ids ─► Err: ConfigRejected, state untouched
//!   ├─ unwind routes of the previous config
//!   ├─ params[i]  ─► handler_i(value), route param/<id>
//!   ├─ inputs[i]  ─► handler_i(value), route pin/<id>, pin/<src>, pin/<id>/src
//!   ├─ outputs    ─► kept verbatim
//!   └─ install, publish ConfigApplied
//! ```
//!
//! ## Retargeting (`pin/<id>/src` = `{"id": B, "value": v}`)
//! ```text
//! B == current ─► no-op
//! otherwise    ─► unroute pin/<current>     (if any)
//!                 handler(v), route pin/B   (if B != 0)
//!                 source = B
//! ```
//! The whole retarget runs inside one dispatch, so no message is handled
//! between the unroute and the route, and a message on the old source
//! arriving afterwards reaches no handler of this input.
//!
//! ## Reset
//! Unroutes every topic of the current config, drops it and resets the role
//! so role-owned dependent tasks cancel themselves.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

use crate::core::Scheduler;
use crate::dataflow::document::{ConfigDocument, InputWire, ParamWire, SourceUpdate};
use crate::dataflow::node::{Input, NodeConfig};
use crate::dataflow::role::Role;
use crate::dataflow::topics;
use crate::error::{ConfigError, OutputError};
use crate::events::{Event, EventKind};
use crate::pubsub::{Handler, Owner, PubSub};

struct Inner {
    scheduler: Scheduler,
    pubsub: PubSub,
    role: Rc<dyn Role>,
    config: RefCell<Option<NodeConfig>>,
}

/// Handle to the node's dataflow engine. Clones share the same state.
#[derive(Clone)]
pub struct Engine {
    inner: Rc<Inner>,
}

struct Bound {
    id: u32,
    params: Vec<(ParamWire, Handler)>,
    inputs: Vec<(InputWire, Handler)>,
    outputs: Vec<u32>,
}

impl Engine {
    /// Creates an engine without config.
    pub fn new(scheduler: Scheduler, pubsub: PubSub, role: Rc<dyn Role>) -> Self {
        Self {
            inner: Rc::new(Inner {
                scheduler,
                pubsub,
                role,
                config: RefCell::new(None),
            }),
        }
    }

    /// Scheduler driving this node.
    pub fn scheduler(&self) -> &Scheduler {
        &self.inner.scheduler
    }

    /// Router the engine subscribes through.
    pub fn pubsub(&self) -> &PubSub {
        &self.inner.pubsub
    }

    /// Blueprint of the bound role.
    pub fn blueprint(&self) -> &str {
        self.inner.role.blueprint()
    }

    /// Runs the role's hardware setup.
    pub fn setup(&self) {
        self.inner.role.setup();
    }

    /// Starts the role's tasks. Called once a config exists.
    pub fn setup_listeners(&self) {
        self.inner.role.setup_listeners(self);
    }

    /// Whether a config is installed.
    pub fn has_config(&self) -> bool {
        self.inner.config.borrow().is_some()
    }

    /// Runs `f` against the installed config.
    pub fn with_config<R>(&self, f: impl FnOnce(&NodeConfig) -> R) -> Option<R> {
        self.inner.config.borrow().as_ref().map(f)
    }

    /// Current source of input `id`; `None` if unknown or unset.
    pub fn source_of(&self, id: u32) -> Option<u32> {
        self.with_config(|cfg| cfg.input(id).and_then(Input::source))
            .flatten()
    }

    /// Installs `document` as the node's whole dataflow state.
    ///
    /// The document is parsed and checked against the role's handler lists
    /// before anything changes; a rejected document is reported and leaves the
    /// current config in place.
    pub fn apply_config(&self, document: &str) -> Result<(), ConfigError> {
        let bound = match ConfigDocument::parse(document).and_then(|doc| self.bind(doc)) {
            Ok(bound) => bound,
            Err(e) => {
                self.publish(Event::new(EventKind::ConfigRejected).with_reason(e.as_message()));
                return Err(e);
            }
        };

        self.unwind();

        let mut params = BTreeMap::new();
        for (wire, handler) in bound.params {
            handler(&wire.value);
            self.inner.pubsub.subscribe(
                &topics::param(wire.id),
                Owner::Param(wire.id),
                Rc::clone(&handler),
            );
            params.insert(wire.id, handler);
        }

        let mut inputs = BTreeMap::new();
        for (wire, handler) in bound.inputs {
            let input = Input {
                id: wire.id,
                source: wire.src,
                handler,
            };
            self.set_input(&input, &wire.value);
            inputs.insert(input.id, input);
        }

        *self.inner.config.borrow_mut() = Some(NodeConfig {
            id: bound.id,
            params,
            inputs,
            outputs: bound.outputs,
        });
        self.publish(Event::new(EventKind::ConfigApplied).with_pin(bound.id));
        Ok(())
    }

    /// Points input `id` at a new upstream pin (`None` clears it).
    ///
    /// When a new source is set, the input's handler first receives `value`.
    /// Unknown inputs and unchanged sources are ignored.
    pub fn retarget(&self, id: u32, source: Option<u32>, value: &str) {
        let (current, handler) = {
            let config = self.inner.config.borrow();
            match config.as_ref().and_then(|cfg| cfg.input(id)) {
                Some(input) => (input.source, Rc::clone(&input.handler)),
                None => return,
            }
        };
        if current == source {
            return;
        }

        if let Some(old) = current {
            self.inner.pubsub.unsubscribe(&topics::pin(old), Owner::Input(id));
        }
        if let Some(new) = source {
            handler(value);
            self.inner
                .pubsub
                .subscribe(&topics::pin(new), Owner::Input(id), handler);
        }

        if let Some(input) = self
            .inner
            .config
            .borrow_mut()
            .as_mut()
            .and_then(|cfg| cfg.inputs.get_mut(&id))
        {
            input.source = source;
        }

        let mut ev = Event::new(EventKind::SourceRetargeted).with_topic(topics::pin_source(id));
        if let Some(new) = source {
            ev = ev.with_pin(new);
        }
        self.publish(ev);
    }

    /// Publishes `payload` on the pin at `outputs[index]`.
    pub fn publish_output(&self, index: usize, payload: &str) -> Result<(), OutputError> {
        let topic = {
            let config = self.inner.config.borrow();
            let cfg = config.as_ref().ok_or(OutputError::NoConfig)?;
            let pin = cfg
                .outputs
                .get(index)
                .copied()
                .ok_or(OutputError::NoOutput { index })?;
            topics::pin(pin)
        };
        self.inner.pubsub.publish(&topic, payload);
        Ok(())
    }

    /// Drops the config with all of its routes and resets the role.
    pub fn reset(&self) {
        self.unwind();
        self.inner.role.reset();
        self.publish(Event::new(EventKind::NodeReset));
    }

    fn bind(&self, doc: ConfigDocument) -> Result<Bound, ConfigError> {
        let param_handlers = self.inner.role.param_handlers();
        let input_handlers = self.inner.role.input_handlers();
        check_count("param", param_handlers.len(), doc.params.len())?;
        check_count("input", input_handlers.len(), doc.inputs.len())?;
        check_unique("param", doc.params.iter().map(|p| p.id))?;
        check_unique("input", doc.inputs.iter().map(|i| i.id))?;
        if doc.inputs.iter().any(|i| i.id == 0) {
            return Err(ConfigError::ZeroId { kind: "input" });
        }

        Ok(Bound {
            id: doc.id,
            params: doc.params.into_iter().zip(param_handlers).collect(),
            inputs: doc.inputs.into_iter().zip(input_handlers).collect(),
            outputs: doc.outputs,
        })
    }

    fn set_input(&self, input: &Input, value: &str) {
        let pubsub = &self.inner.pubsub;
        (input.handler)(value);
        pubsub.subscribe(
            &topics::pin(input.id),
            Owner::Input(input.id),
            Rc::clone(&input.handler),
        );
        if let Some(src) = input.source {
            pubsub.subscribe(
                &topics::pin(src),
                Owner::Input(input.id),
                Rc::clone(&input.handler),
            );
        }

        let id = input.id;
        let engine = Rc::downgrade(&self.inner);
        pubsub.subscribe(
            &topics::pin_source(id),
            Owner::Control(id),
            Rc::new(move |payload: &str| {
                if let Some(inner) = engine.upgrade() {
                    Engine { inner }.on_source_update(id, payload);
                }
            }),
        );
    }

    fn on_source_update(&self, id: u32, payload: &str) {
        match SourceUpdate::parse(payload) {
            Ok(update) => self.retarget(id, update.id, &update.value),
            Err(e) => self.publish(
                Event::new(EventKind::ControlRejected)
                    .with_topic(topics::pin_source(id))
                    .with_reason(e.as_message()),
            ),
        }
    }

    /// Removes the current config and every route it owns.
    fn unwind(&self) {
        let Some(old) = self.inner.config.borrow_mut().take() else {
            return;
        };
        let pubsub = &self.inner.pubsub;
        for id in old.params.keys() {
            pubsub.unsubscribe_owner(Owner::Param(*id));
        }
        for id in old.inputs.keys() {
            pubsub.unsubscribe_owner(Owner::Input(*id));
            pubsub.unsubscribe_owner(Owner::Control(*id));
        }
    }

    fn publish(&self, ev: Event) {
        self.inner.scheduler.bus().publish(ev);
    }
}

fn check_count(kind: &'static str, expected: usize, got: usize) -> Result<(), ConfigError> {
    if expected == got {
        Ok(())
    } else {
        Err(ConfigError::HandlerMismatch {
            kind,
            expected,
            got,
        })
    }
}

fn check_unique(
    kind: &'static str,
    ids: impl IntoIterator<Item = u32>,
) -> Result<(), ConfigError> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ConfigError::DuplicateId { kind, id });
        }
    }
    Ok(())
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("blueprint", &self.blueprint())
            .field("config", &*self.inner.config.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;
    use crate::pubsub::Message;
    use crate::pubsub::testing::RecordingTransport;
    use crate::ManualClock;

    /// Role storing every value its handlers see.
    #[derive(Default)]
    struct Recorder {
        params: usize,
        inputs: usize,
        seen: Rc<RefCell<Vec<String>>>,
        stored: Rc<Cell<bool>>,
        resets: Rc<Cell<u32>>,
    }

    impl Recorder {
        fn new(params: usize, inputs: usize) -> Rc<Self> {
            Rc::new(Self {
                params,
                inputs,
                ..Self::default()
            })
        }
    }

    impl Role for Recorder {
        fn blueprint(&self) -> &str {
            "recorder"
        }

        fn param_handlers(&self) -> Vec<Handler> {
            (0..self.params)
                .map(|i| {
                    let seen = self.seen.clone();
                    Rc::new(move |s: &str| seen.borrow_mut().push(format!("p{i}={s}"))) as Handler
                })
                .collect()
        }

        fn input_handlers(&self) -> Vec<Handler> {
            (0..self.inputs)
                .map(|i| {
                    let seen = self.seen.clone();
                    let stored = self.stored.clone();
                    Rc::new(move |s: &str| {
                        stored.set(crate::dataflow::payload::parse_bool(s));
                        seen.borrow_mut().push(format!("i{i}={s}"));
                    }) as Handler
                })
                .collect()
        }

        fn reset(&self) {
            self.resets.set(self.resets.get() + 1);
        }
    }

    struct Fixture {
        engine: Engine,
        transport: Rc<RecordingTransport>,
        role: Rc<Recorder>,
    }

    fn fixture(params: usize, inputs: usize) -> Fixture {
        let sched = Scheduler::new(ManualClock::new());
        let transport = Rc::new(RecordingTransport::default());
        let pubsub = PubSub::new(transport.clone(), sched.bus().clone());
        let role = Recorder::new(params, inputs);
        let engine = Engine::new(sched, pubsub, role.clone());
        Fixture {
            engine,
            transport,
            role,
        }
    }

    impl Fixture {
        fn deliver(&self, topic: &str, payload: &str) -> usize {
            self.engine
                .pubsub()
                .dispatch(&Message::new(topic, payload))
        }

        /// Subscribed value topics (`pin/<id>`), without control channels.
        fn pins(&self) -> Vec<String> {
            self.transport
                .topics()
                .into_iter()
                .filter(|t| t.starts_with("pin/") && !t.ends_with("/src"))
                .collect()
        }

        fn seen(&self) -> Vec<String> {
            self.role.seen.borrow().clone()
        }
    }

    const SCENARIO: &str =
        r#"{"id":1,"params":[],"inputs":[{"id":10,"src":0,"value":"false"}],"outputs":[20]}"#;

    #[test]
    fn test_apply_then_retarget_scenario() {
        let fx = fixture(0, 1);
        fx.role.stored.set(true);

        fx.engine.apply_config(SCENARIO).unwrap();
        assert_eq!(fx.pins(), vec!["pin/10"]);
        assert!(fx.transport.topics().contains(&"pin/10/src".to_string()));
        assert!(!fx.role.stored.get());
        assert!(fx.engine.has_config());

        assert_eq!(fx.deliver("pin/10/src", r#"{"id":5}"#), 1);
        assert_eq!(fx.pins(), vec!["pin/10", "pin/5"]);
        assert_eq!(fx.engine.source_of(10), Some(5));
    }

    #[test]
    fn test_retarget_drops_old_source() {
        let fx = fixture(0, 1);
        fx.engine
            .apply_config(r#"{"id":1,"inputs":[{"id":10,"src":3,"value":"false"}]}"#)
            .unwrap();
        assert_eq!(fx.pins(), vec!["pin/10", "pin/3"]);

        fx.deliver("pin/10/src", r#"{"id":7,"value":"true"}"#);
        assert_eq!(fx.pins(), vec!["pin/10", "pin/7"]);
        assert!(fx.role.stored.get(), "new source value handed to the input");

        let before = fx.seen().len();
        assert_eq!(fx.deliver("pin/3", "false"), 0);
        assert_eq!(fx.seen().len(), before);

        fx.deliver("pin/7", "false");
        assert!(!fx.role.stored.get());
    }

    #[test]
    fn test_retarget_to_same_source_is_noop() {
        let fx = fixture(0, 1);
        fx.engine
            .apply_config(r#"{"id":1,"inputs":[{"id":10,"src":3,"value":"x"}]}"#)
            .unwrap();
        let calls = fx.transport.calls.borrow().len();

        fx.deliver("pin/10/src", r#"{"id":3,"value":"y"}"#);
        assert_eq!(fx.transport.calls.borrow().len(), calls);
        assert_eq!(fx.seen(), vec!["i0=x"]);
    }

    #[test]
    fn test_retarget_to_zero_clears_source() {
        let fx = fixture(0, 1);
        fx.engine
            .apply_config(r#"{"id":1,"inputs":[{"id":10,"src":3,"value":"x"}]}"#)
            .unwrap();

        fx.deliver("pin/10/src", r#"{"id":0,"value":"y"}"#);
        assert_eq!(fx.pins(), vec!["pin/10"]);
        assert_eq!(fx.engine.source_of(10), None);
        assert_eq!(fx.seen(), vec!["i0=x"], "clearing does not invoke the handler");
    }

    #[test]
    fn test_source_equal_to_own_pin_delivers_once() {
        let fx = fixture(0, 1);
        fx.engine
            .apply_config(r#"{"id":1,"inputs":[{"id":10,"src":10,"value":"a"}]}"#)
            .unwrap();
        assert_eq!(fx.deliver("pin/10", "b"), 1);

        fx.deliver("pin/10/src", r#"{"id":4}"#);
        assert_eq!(fx.pins(), vec!["pin/10", "pin/4"]);
    }

    #[test]
    fn test_params_are_applied_and_writable() {
        let fx = fixture(2, 0);
        fx.engine
            .apply_config(r#"{"id":1,"params":[{"id":3,"value":true},{"id":4,"value":250}]}"#)
            .unwrap();
        assert_eq!(fx.seen(), vec!["p0=true", "p1=250"]);
        assert_eq!(fx.transport.topics(), vec!["param/3", "param/4"]);

        fx.deliver("param/4", "1000");
        assert_eq!(fx.seen().last().map(String::as_str), Some("p1=1000"));
    }

    #[test]
    fn test_second_config_supersedes_first() {
        let fx = fixture(1, 1);
        fx.engine
            .apply_config(
                r#"{"id":1,"params":[{"id":1,"value":"a"}],"inputs":[{"id":10,"src":3}],"outputs":[20]}"#,
            )
            .unwrap();
        fx.engine
            .apply_config(
                r#"{"id":2,"params":[{"id":2,"value":"b"}],"inputs":[{"id":11,"src":4}],"outputs":[21]}"#,
            )
            .unwrap();

        assert_eq!(
            fx.transport.topics(),
            vec!["param/2", "pin/11", "pin/11/src", "pin/4"]
        );
        assert_eq!(fx.engine.with_config(|c| c.id()), Some(2));
        assert_eq!(fx.engine.with_config(|c| c.outputs().to_vec()), Some(vec![21]));
    }

    #[test]
    fn test_malformed_document_keeps_state() {
        let fx = fixture(0, 1);
        let mut rx = fx.engine.scheduler().bus().subscribe();
        fx.engine.apply_config(SCENARIO).unwrap();

        let err = fx.engine.apply_config("{not json").unwrap_err();
        assert_eq!(err.as_label(), "config_malformed");
        assert_eq!(fx.engine.with_config(|c| c.id()), Some(1));
        assert_eq!(fx.pins(), vec!["pin/10"]);

        let kinds: Vec<EventKind> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|e| e.kind)
            .collect();
        assert_eq!(kinds.last(), Some(&EventKind::ConfigRejected));
    }

    #[test]
    fn test_handler_count_mismatch_is_rejected() {
        let fx = fixture(0, 2);
        let err = fx.engine.apply_config(SCENARIO).unwrap_err();
        assert_eq!(
            err,
            ConfigError::HandlerMismatch {
                kind: "input",
                expected: 2,
                got: 1
            }
        );
        assert!(!fx.engine.has_config());
        assert!(fx.seen().is_empty(), "no handler runs for a rejected document");
        assert!(fx.transport.topics().is_empty());
    }

    #[test]
    fn test_duplicate_ids_are_rejected_before_any_handler() {
        let fx = fixture(2, 2);
        fx.engine
            .apply_config(
                r#"{"id":1,"params":[{"id":1,"value":"a"},{"id":2,"value":"b"}],
                    "inputs":[{"id":10,"src":3,"value":"x"},{"id":11,"value":"y"}]}"#,
            )
            .unwrap();
        let seen = fx.seen();
        let topics = fx.transport.topics();

        let err = fx
            .engine
            .apply_config(
                r#"{"id":2,"params":[{"id":5},{"id":6}],
                    "inputs":[{"id":10,"src":3,"value":"STALE"},{"id":10,"src":4}]}"#,
            )
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateId { kind: "input", id: 10 });

        let err = fx
            .engine
            .apply_config(
                r#"{"id":2,"params":[{"id":3},{"id":3,"value":"W"}],
                    "inputs":[{"id":12},{"id":13}]}"#,
            )
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateId { kind: "param", id: 3 });

        assert_eq!(fx.seen(), seen, "no handler runs for a rejected document");
        assert_eq!(fx.transport.topics(), topics);
        assert_eq!(fx.engine.with_config(|c| c.id()), Some(1));

        // the surviving config still retargets cleanly
        fx.engine.retarget(10, Some(7), "z");
        assert_eq!(fx.pins(), vec!["pin/10", "pin/11", "pin/7"]);
        assert_eq!(fx.deliver("pin/3", "late"), 0);
    }

    #[test]
    fn test_input_id_zero_is_rejected() {
        let fx = fixture(0, 1);
        let err = fx
            .engine
            .apply_config(r#"{"id":1,"inputs":[{"id":0,"value":"x"}]}"#)
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroId { kind: "input" });
        assert!(!fx.engine.has_config());
        assert!(fx.transport.topics().is_empty());
    }

    #[test]
    fn test_malformed_control_payload_is_dropped() {
        let fx = fixture(0, 1);
        fx.engine
            .apply_config(r#"{"id":1,"inputs":[{"id":10,"src":3}]}"#)
            .unwrap();
        let mut rx = fx.engine.scheduler().bus().subscribe();

        fx.deliver("pin/10/src", "five");
        assert_eq!(fx.engine.source_of(10), Some(3));
        let ev = rx.try_recv().unwrap();
        assert_eq!(ev.kind, EventKind::ControlRejected);
        assert_eq!(ev.topic.as_deref(), Some("pin/10/src"));
    }

    #[test]
    fn test_reset_unroutes_everything() {
        let fx = fixture(1, 1);
        fx.engine
            .apply_config(
                r#"{"id":1,"params":[{"id":1}],"inputs":[{"id":10,"src":3}],"outputs":[20]}"#,
            )
            .unwrap();
        fx.engine.reset();

        assert!(!fx.engine.has_config());
        assert!(fx.transport.topics().is_empty());
        assert!(fx.engine.pubsub().topics().is_empty());
        assert_eq!(fx.role.resets.get(), 1);
        assert_eq!(fx.deliver("pin/10", "true"), 0);
    }

    #[test]
    fn test_publish_output() {
        let fx = fixture(0, 1);
        assert_eq!(
            fx.engine.publish_output(0, "1"),
            Err(OutputError::NoConfig)
        );

        fx.engine.apply_config(SCENARIO).unwrap();
        fx.engine.publish_output(0, "true").unwrap();
        assert_eq!(
            fx.engine.publish_output(1, "x"),
            Err(OutputError::NoOutput { index: 1 })
        );
        assert_eq!(
            *fx.transport.published.borrow(),
            vec![Message::new("pin/20", "true")]
        );
    }
}
