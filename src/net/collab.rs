//! External collaborators the node drives during provisioning.
//!
//! Each one reports back asynchronously by calling the matching `Node::on_*`
//! method (`on_credentials`, `on_wireless_connect`, `on_broker_disconnect`, ...)
//! from the scheduler thread.

use std::net::{IpAddr, SocketAddr};

use crate::net::credentials::Credentials;

/// Wireless connection manager.
pub trait Wireless {
    /// Starts joining a network; completion is reported via `Node::on_wireless_connect`.
    fn connect(&self, credentials: &Credentials);

    /// Whether the network is currently joined.
    fn is_connected(&self) -> bool;

    /// Resolves a host name on the joined network.
    fn resolve(&self, host: &str) -> Option<IpAddr>;

    /// This node's network address; configuration is pushed to it as a topic.
    fn address(&self) -> String;
}

/// Broker connection lifecycle.
pub trait BrokerLink {
    /// Where the next `connect` goes.
    fn set_address(&self, addr: SocketAddr);

    /// Starts connecting; completion is reported via `Node::on_broker_connect`.
    fn connect(&self);
}

/// Local broadcast used to request credentials.
pub trait Discovery {
    /// Sends one broadcast.
    fn broadcast(&self, message: &str);
}
