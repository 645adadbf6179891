use std::rc::Rc;

use crate::core::{Runtime, RuntimeConfig, Scheduler};
use crate::dataflow::{Engine, Role};
use crate::error::RuntimeError;
use crate::net::collab::{BrokerLink, Discovery, Wireless};
use crate::net::node::Node;
use crate::pubsub::{PubSub, Transport};

/// Builder for a [`Node`]; every collaborator is required.
pub struct NodeBuilder {
    cfg: RuntimeConfig,
    scheduler: Scheduler,
    role: Option<Rc<dyn Role>>,
    transport: Option<Rc<dyn Transport>>,
    wireless: Option<Rc<dyn Wireless>>,
    broker: Option<Rc<dyn BrokerLink>>,
    discovery: Option<Rc<dyn Discovery>>,
}

impl NodeBuilder {
    /// Starts a builder driven by `runtime`'s scheduler and configuration.
    pub fn new(runtime: &Runtime) -> Self {
        Self {
            cfg: runtime.config().clone(),
            scheduler: runtime.scheduler().clone(),
            role: None,
            transport: None,
            wireless: None,
            broker: None,
            discovery: None,
        }
    }

    /// Sets the device role.
    pub fn with_role(mut self, role: Rc<dyn Role>) -> Self {
        self.role = Some(role);
        self
    }

    /// Sets the broker transport used for subscribe/unsubscribe/publish.
    pub fn with_transport(mut self, transport: Rc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the wireless connection manager.
    pub fn with_wireless(mut self, wireless: Rc<dyn Wireless>) -> Self {
        self.wireless = Some(wireless);
        self
    }

    /// Sets the broker connection lifecycle.
    pub fn with_broker(mut self, broker: Rc<dyn BrokerLink>) -> Self {
        self.broker = Some(broker);
        self
    }

    /// Sets the credential discovery broadcast.
    pub fn with_discovery(mut self, discovery: Rc<dyn Discovery>) -> Self {
        self.discovery = Some(discovery);
        self
    }

    /// Assembles the node.
    ///
    /// Fails with [`RuntimeError::MissingCollaborator`] naming the first unset slot.
    pub fn build(self) -> Result<Node, RuntimeError> {
        let role = required(self.role, "role")?;
        let transport = required(self.transport, "transport")?;
        let wireless = required(self.wireless, "wireless")?;
        let broker = required(self.broker, "broker")?;
        let discovery = required(self.discovery, "discovery")?;

        let pubsub = PubSub::new(transport, self.scheduler.bus().clone());
        let engine = Engine::new(self.scheduler.clone(), pubsub, role);
        Ok(Node::assemble(
            self.cfg,
            self.scheduler,
            engine,
            wireless,
            broker,
            discovery,
        ))
    }
}

fn required<T>(slot: Option<T>, name: &'static str) -> Result<T, RuntimeError> {
    slot.ok_or(RuntimeError::MissingCollaborator { name })
}
