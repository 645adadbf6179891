//! The dynamic dataflow engine and the pieces roles build on.
//!
//! - [`topics`]: wire names of pins, parameters and retarget channels;
//! - [`document`]: configuration document and control payload records;
//! - [`payload`]: forgiving parsing of literal values;
//! - [`Role`]: positional handler lists supplied by the device role;
//! - [`Engine`]: applies documents, retargets inputs, resets;
//! - [`PublishPolicy`]: change-triggered vs periodic output publishing.

pub mod document;
pub mod payload;
pub mod topics;

mod engine;
mod node;
mod output;
mod role;

pub use engine::Engine;
pub use node::{Input, NodeConfig};
pub use output::PublishPolicy;
pub use role::Role;
