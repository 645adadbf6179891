//! # Node: provisioning and reconnect glue around the dataflow engine.
//!
//! ```text
//! start()
//!   ├─ role hardware setup
//!   ├─ interval: broadcast <prefix><blueprint>          every credentials_request_interval
//!   └─ task: wait for credentials ─► clear interval, wireless.connect()
//!
//! on_wireless_connect()
//!   └─ Dependent[wifi] Timed: resolve broker_host       every resolve_interval
//!        └─ found ─► broker.set_address(), broker.connect()
//!
//! on_broker_connect()
//!   ├─ route <node address> ─► Engine::apply_config
//!   ├─ Dependent[wifi, broker] Timed: publish address to config_request_topic
//!   │    └─ until has_config() ─► Engine::setup_listeners
//!   └─ Dependent[wifi, broker]: dispatch one inbox message per cycle
//!
//! on_*_disconnect()
//!   ├─ link down: session flag revoked, dependents abort on next poll
//!   ├─ Engine::reset(), all routes dropped (broker: queued messages too)
//!   └─ timeout retry.next(attempt) ─► reconnect
//! ```
//!
//! All callbacks must be invoked on the scheduler thread.

use std::cell::RefCell;
use std::fmt;
use std::net::SocketAddr;
use std::rc::{Rc, Weak};

use crate::core::{Runtime, RuntimeConfig, Scheduler};
use crate::dataflow::Engine;
use crate::error::CredentialsError;
use crate::events::{Event, EventKind};
use crate::net::builder::NodeBuilder;
use crate::net::collab::{BrokerLink, Discovery, Wireless};
use crate::net::credentials::{Credentials, discovery_message};
use crate::net::link::Link;
use crate::pubsub::{Inbox, InboxSender, Owner};
use crate::tasks::{DependentTask, TaskFn, TimedTask};

struct Inner {
    cfg: RuntimeConfig,
    scheduler: Scheduler,
    engine: Engine,
    inbox: Inbox,
    wireless: Rc<dyn Wireless>,
    broker: Rc<dyn BrokerLink>,
    discovery: Rc<dyn Discovery>,
    credentials: RefCell<Option<Credentials>>,
    wifi: RefCell<Link>,
    mqtt: RefCell<Link>,
}

/// One field device: engine, links and provisioning state.
#[derive(Clone)]
pub struct Node {
    inner: Rc<Inner>,
}

impl Node {
    /// Starts building a node driven by `runtime`.
    pub fn builder(runtime: &Runtime) -> NodeBuilder {
        NodeBuilder::new(runtime)
    }

    pub(crate) fn assemble(
        cfg: RuntimeConfig,
        scheduler: Scheduler,
        engine: Engine,
        wireless: Rc<dyn Wireless>,
        broker: Rc<dyn BrokerLink>,
        discovery: Rc<dyn Discovery>,
    ) -> Self {
        let inbox = Inbox::new(cfg.inbox_capacity_clamped(), scheduler.bus().clone());
        Self {
            inner: Rc::new(Inner {
                cfg,
                scheduler,
                engine,
                inbox,
                wireless,
                broker,
                discovery,
                credentials: RefCell::new(None),
                wifi: RefCell::new(Link::new("wireless")),
                mqtt: RefCell::new(Link::new("broker")),
            }),
        }
    }

    /// The dataflow engine.
    pub fn engine(&self) -> &Engine {
        &self.inner.engine
    }

    /// Handle the broker client pushes received messages into.
    pub fn inbox_sender(&self) -> InboxSender {
        self.inner.inbox.sender()
    }

    /// Credentials received so far.
    pub fn credentials(&self) -> Option<Credentials> {
        self.inner.credentials.borrow().clone()
    }

    /// Whether the wireless link is up.
    pub fn is_wireless_up(&self) -> bool {
        self.inner.wifi.borrow().is_up()
    }

    /// Whether the broker link is up.
    pub fn is_broker_up(&self) -> bool {
        self.inner.mqtt.borrow().is_up()
    }

    /// Sets up the role and starts asking for credentials.
    pub fn start(&self) {
        let inner = &self.inner;
        inner.engine.setup();

        let discovery = Rc::clone(&inner.discovery);
        let message = discovery_message(&inner.cfg.discovery_prefix, inner.engine.blueprint());
        let interval = inner.scheduler.set_interval(
            move |_| discovery.broadcast(&message),
            inner.cfg.credentials_request_interval,
            true,
        );

        let (waiting, ready) = (self.weak(), self.weak());
        inner.scheduler.queue(
            TaskFn::new("await-credentials")
                .on_check(move |_| {
                    upgrade(&waiting).is_none_or(|node| node.credentials().is_some())
                })
                .on_finish(move |ctx| {
                    ctx.scheduler().clear_interval(interval);
                    if let Some(node) = upgrade(&ready) {
                        node.wireless_try_connect();
                    }
                }),
        );
    }

    /// Handles a provisioning reply (`<ssid>|<password>`).
    ///
    /// Malformed replies are reported and ignored.
    pub fn on_credentials(&self, payload: &str) -> Result<(), CredentialsError> {
        match Credentials::parse(payload) {
            Ok(credentials) => {
                self.set_credentials(credentials);
                Ok(())
            }
            Err(e) => {
                self.publish(
                    Event::new(EventKind::CredentialsRejected).with_reason(e.as_message()),
                );
                Err(e)
            }
        }
    }

    /// Installs credentials obtained another way (e.g. persisted storage).
    pub fn set_credentials(&self, credentials: Credentials) {
        *self.inner.credentials.borrow_mut() = Some(credentials);
        self.publish(Event::new(EventKind::CredentialsReceived));
    }

    /// The wireless network was joined.
    pub fn on_wireless_connect(&self) {
        let inner = &self.inner;
        let dep = {
            let mut wifi = inner.wifi.borrow_mut();
            wifi.up();
            wifi.dependency()
        };
        self.publish(Event::new(EventKind::LinkUp).with_task("wireless"));

        let (resolve, connect) = (self.weak(), self.weak());
        let host = inner.cfg.broker_host.clone();
        let port = inner.cfg.broker_port;
        inner.scheduler.queue(DependentTask::new(
            [dep],
            TimedTask::new(
                "resolve-broker",
                move |_| {
                    let Some(node) = upgrade(&resolve) else {
                        return true;
                    };
                    match node.inner.wireless.resolve(&host) {
                        Some(ip) => {
                            node.inner.broker.set_address(SocketAddr::new(ip, port));
                            true
                        }
                        None => false,
                    }
                },
                move |_| {
                    if let Some(node) = upgrade(&connect) {
                        node.inner.broker.connect();
                    }
                },
                inner.cfg.resolve_interval,
            ),
        ));
    }

    /// The wireless network was lost (or a join attempt failed).
    pub fn on_wireless_disconnect(&self) {
        let was_up = self.inner.wifi.borrow_mut().down();
        if was_up {
            self.publish(Event::new(EventKind::LinkDown).with_task("wireless"));
        }
        self.teardown();

        let weak = self.weak();
        self.schedule_reconnect(&self.inner.wifi, move || {
            if let Some(node) = upgrade(&weak) {
                node.wireless_try_connect();
            }
        });
    }

    /// The broker session is established.
    pub fn on_broker_connect(&self) {
        let inner = &self.inner;
        let deps = {
            let mut mqtt = inner.mqtt.borrow_mut();
            mqtt.up();
            [inner.wifi.borrow().dependency(), mqtt.dependency()]
        };
        self.publish(Event::new(EventKind::LinkUp).with_task("broker"));

        let address = inner.wireless.address();
        let apply = self.weak();
        inner.engine.pubsub().subscribe(
            &address,
            Owner::Provisioning,
            Rc::new(move |document: &str| {
                if let Some(node) = upgrade(&apply) {
                    let _ = node.inner.engine.apply_config(document);
                }
            }),
        );

        let (request, listen) = (self.weak(), self.weak());
        let topic = inner.cfg.config_request_topic.clone();
        inner.scheduler.queue(DependentTask::new(
            deps.clone(),
            TimedTask::new(
                "request-config",
                move |_| {
                    let Some(node) = upgrade(&request) else {
                        return true;
                    };
                    let engine = &node.inner.engine;
                    if engine.has_config() {
                        return true;
                    }
                    engine.pubsub().publish(&topic, &address);
                    false
                },
                move |_| {
                    if let Some(node) = upgrade(&listen) {
                        node.inner.engine.setup_listeners();
                    }
                },
                inner.cfg.config_request_interval,
            ),
        ));

        let pump = self.weak();
        inner.scheduler.queue(DependentTask::new(
            deps,
            TaskFn::new("inbox").on_check(move |_| {
                let Some(node) = upgrade(&pump) else {
                    return true;
                };
                if let Some(msg) = node.inner.inbox.next() {
                    node.inner.engine.pubsub().dispatch(&msg);
                }
                false
            }),
        ));
    }

    /// The broker session was lost (or a connect attempt failed).
    pub fn on_broker_disconnect(&self) {
        let was_up = self.inner.mqtt.borrow_mut().down();
        if was_up {
            self.publish(Event::new(EventKind::LinkDown).with_task("broker"));
        }
        self.inner.inbox.clear();
        self.teardown();

        let weak = self.weak();
        self.schedule_reconnect(&self.inner.mqtt, move || {
            if let Some(node) = upgrade(&weak) {
                node.broker_try_connect();
            }
        });
    }

    fn wireless_try_connect(&self) {
        // released before calling out: the collaborator may report back synchronously
        let credentials = self.credentials();
        if let Some(credentials) = credentials {
            self.inner.wireless.connect(&credentials);
        }
    }

    fn broker_try_connect(&self) {
        // without wireless, the resolve task reconnects once the network is back
        if self.inner.wireless.is_connected() {
            self.inner.broker.connect();
        }
    }

    fn teardown(&self) {
        self.inner.engine.reset();
        self.inner.engine.pubsub().clear();
    }

    fn schedule_reconnect(&self, link: &RefCell<Link>, reconnect: impl Fn() + 'static) {
        let (name, attempt) = {
            let mut link = link.borrow_mut();
            (link.name(), link.next_attempt())
        };
        let delay = self.inner.cfg.retry.next(attempt);
        self.publish(
            Event::new(EventKind::ReconnectScheduled)
                .with_task(name)
                .with_delay(delay)
                .with_attempt(u64::from(attempt) + 1),
        );
        self.inner.scheduler.set_timeout(move |_| reconnect(), delay);
    }

    fn weak(&self) -> Weak<Inner> {
        Rc::downgrade(&self.inner)
    }

    fn publish(&self, ev: Event) {
        self.inner.scheduler.bus().publish(ev);
    }
}

fn upgrade(weak: &Weak<Inner>) -> Option<Node> {
    weak.upgrade().map(|inner| Node { inner })
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("blueprint", &self.inner.engine.blueprint())
            .field("wireless_up", &self.is_wireless_up())
            .field("broker_up", &self.is_broker_up())
            .field("configured", &self.inner.engine.has_config())
            .finish()
    }
}
