//! Provisioning and connectivity around the dataflow engine.
//!
//! - [`Credentials`]: provisioning reply and the discovery broadcast format;
//! - [`Link`]: up/down lifecycle producing dependency flags;
//! - [`Wireless`], [`BrokerLink`], [`Discovery`]: external collaborators;
//! - [`Node`] / [`NodeBuilder`]: wires everything to the scheduler.

mod builder;
mod collab;
mod credentials;
mod link;
mod node;

pub use builder::NodeBuilder;
pub use collab::{BrokerLink, Discovery, Wireless};
pub use credentials::{Credentials, discovery_message};
pub use link::Link;
pub use node::Node;
