//! # Topic router with owner-scoped, reference-counted routes.
//!
//! [`PubSub`] sits between the dataflow engine and the broker [`Transport`]:
//!
//! ```text
//! subscribe(topic, owner, handler)
//!   ├─ route (topic, owner) exists ─► refs += 1
//!   ├─ otherwise                   ─► add route
//!   └─ first route of topic        ─► transport.subscribe(topic)
//!
//! unsubscribe(topic, owner)
//!   ├─ refs -= 1, drop route at 0
//!   └─ last route of topic gone    ─► transport.unsubscribe(topic)
//!
//! dispatch(msg) ─► every route of msg.topic, once per owner
//! ```
//!
//! A topic subscribed twice by the same owner (an input whose source is its
//! own pin) delivers once; two owners on one topic each get the message.
//! Transport refusals are reported as `TransportFailed` and never undo local
//! routing state.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::error::TransportError;
use crate::events::{Bus, Event, EventKind};
use crate::pubsub::transport::{Message, Transport};

/// Callback invoked with the textual payload of a routed message.
pub type Handler = Rc<dyn Fn(&str)>;

/// Who a route belongs to; routes are unwound per owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Owner {
    /// Provisioning glue (the node-address configuration topic).
    Provisioning,
    /// A bound parameter (`param/<id>`).
    Param(u32),
    /// A bound input (`pin/<id>` and `pin/<src>`).
    Input(u32),
    /// The retarget channel of an input (`pin/<id>/src`).
    Control(u32),
}

struct Route {
    owner: Owner,
    refs: usize,
    handler: Handler,
}

struct Inner {
    transport: Rc<dyn Transport>,
    bus: Bus,
    routes: RefCell<BTreeMap<String, Vec<Route>>>,
}

/// Handle to the topic router. Clones share the same routes.
#[derive(Clone)]
pub struct PubSub {
    inner: Rc<Inner>,
}

impl PubSub {
    /// Creates a router over `transport`, reporting on `bus`.
    pub fn new(transport: Rc<dyn Transport>, bus: Bus) -> Self {
        Self {
            inner: Rc::new(Inner {
                transport,
                bus,
                routes: RefCell::new(BTreeMap::new()),
            }),
        }
    }

    /// Routes `topic` to `handler` on behalf of `owner`.
    ///
    /// If `owner` already routes `topic`, only its reference count grows and
    /// the handler registered first is kept.
    pub fn subscribe(&self, topic: &str, owner: Owner, handler: Handler) {
        let first = {
            let mut routes = self.inner.routes.borrow_mut();
            let entry = routes.entry(topic.to_string()).or_default();
            let first = entry.is_empty();
            match entry.iter_mut().find(|r| r.owner == owner) {
                Some(route) => route.refs += 1,
                None => entry.push(Route {
                    owner,
                    refs: 1,
                    handler,
                }),
            }
            first
        };
        if first {
            let res = self.inner.transport.subscribe(topic);
            self.report(EventKind::Subscribed, topic, res);
        }
    }

    /// Drops one reference of `owner` on `topic`. Unknown routes are ignored.
    pub fn unsubscribe(&self, topic: &str, owner: Owner) {
        let last = {
            let mut routes = self.inner.routes.borrow_mut();
            let Some(entry) = routes.get_mut(topic) else {
                return;
            };
            let Some(pos) = entry.iter().position(|r| r.owner == owner) else {
                return;
            };
            entry[pos].refs -= 1;
            if entry[pos].refs == 0 {
                entry.remove(pos);
            }
            let last = entry.is_empty();
            if last {
                routes.remove(topic);
            }
            last
        };
        if last {
            self.release(topic);
        }
    }

    /// Drops every route of `owner`, whatever its reference count.
    pub fn unsubscribe_owner(&self, owner: Owner) {
        let emptied: Vec<String> = {
            let mut routes = self.inner.routes.borrow_mut();
            let mut emptied = Vec::new();
            routes.retain(|topic, entry| {
                entry.retain(|r| r.owner != owner);
                if entry.is_empty() {
                    emptied.push(topic.clone());
                    false
                } else {
                    true
                }
            });
            emptied
        };
        for topic in &emptied {
            self.release(topic);
        }
    }

    /// Drops every route and unsubscribes every topic.
    pub fn clear(&self) {
        let topics: Vec<String> = {
            let mut routes = self.inner.routes.borrow_mut();
            std::mem::take(&mut *routes).into_keys().collect()
        };
        for topic in &topics {
            self.release(topic);
        }
    }

    /// Publishes on the transport; failures are reported and dropped.
    pub fn publish(&self, topic: &str, payload: &str) {
        if let Err(e) = self.inner.transport.publish(topic, payload) {
            self.inner.bus.publish(
                Event::new(EventKind::TransportFailed)
                    .with_topic(topic)
                    .with_reason(e.as_message()),
            );
        }
    }

    /// Delivers `msg` to every route of its topic; returns how many handlers ran.
    ///
    /// Handlers run with no router borrow held, so they may subscribe or
    /// unsubscribe (including their own route).
    pub fn dispatch(&self, msg: &Message) -> usize {
        let handlers: Vec<Handler> = {
            let routes = self.inner.routes.borrow();
            match routes.get(&msg.topic) {
                Some(entry) => entry.iter().map(|r| Rc::clone(&r.handler)).collect(),
                None => Vec::new(),
            }
        };
        if handlers.is_empty() {
            self.inner
                .bus
                .publish(Event::new(EventKind::MessageUnrouted).with_topic(msg.topic.as_str()));
        }
        for handler in &handlers {
            handler(&msg.payload);
        }
        handlers.len()
    }

    /// Topics with at least one route, sorted.
    pub fn topics(&self) -> Vec<String> {
        self.inner.routes.borrow().keys().cloned().collect()
    }

    /// Whether `topic` has at least one route.
    pub fn is_routed(&self, topic: &str) -> bool {
        self.inner.routes.borrow().contains_key(topic)
    }

    /// The event bus this router reports on.
    pub fn bus(&self) -> &Bus {
        &self.inner.bus
    }

    fn release(&self, topic: &str) {
        let res = self.inner.transport.unsubscribe(topic);
        self.report(EventKind::Unsubscribed, topic, res);
    }

    fn report(&self, ok: EventKind, topic: &str, res: Result<(), TransportError>) {
        let ev = match res {
            Ok(()) => Event::new(ok).with_topic(topic),
            Err(e) => Event::new(EventKind::TransportFailed)
                .with_topic(topic)
                .with_reason(e.as_message()),
        };
        self.inner.bus.publish(ev);
    }
}

impl fmt::Debug for PubSub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PubSub")
            .field("topics", &self.topics())
            .finish()
    }
}
