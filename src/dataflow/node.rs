//! Bound dataflow state of a configured node.

use std::collections::BTreeMap;
use std::fmt;

use crate::pubsub::Handler;

/// An input pin bound to a role handler.
///
/// While installed, it is routed from `pin/<id>` and, when a source is set,
/// from `pin/<source>`.
#[derive(Clone)]
pub struct Input {
    pub(crate) id: u32,
    pub(crate) source: Option<u32>,
    pub(crate) handler: Handler,
}

impl Input {
    /// Input pin id.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Current upstream pin, if any.
    pub fn source(&self) -> Option<u32> {
        self.source
    }
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Input")
            .field("id", &self.id)
            .field("source", &self.source)
            .finish()
    }
}

/// The node description installed by the last applied document.
pub struct NodeConfig {
    pub(crate) id: u32,
    pub(crate) params: BTreeMap<u32, Handler>,
    pub(crate) inputs: BTreeMap<u32, Input>,
    pub(crate) outputs: Vec<u32>,
}

impl NodeConfig {
    /// Node id from the document.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Bound parameter ids.
    pub fn param_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.params.keys().copied()
    }

    /// Bound input by pin id.
    pub fn input(&self, id: u32) -> Option<&Input> {
        self.inputs.get(&id)
    }

    /// Bound inputs, by pin id.
    pub fn inputs(&self) -> impl Iterator<Item = &Input> {
        self.inputs.values()
    }

    /// Pins this node may publish to, in document order.
    pub fn outputs(&self) -> &[u32] {
        &self.outputs
    }
}

impl fmt::Debug for NodeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeConfig")
            .field("id", &self.id)
            .field("params", &self.params.keys().collect::<Vec<_>>())
            .field("inputs", &self.inputs.values().collect::<Vec<_>>())
            .field("outputs", &self.outputs)
            .finish()
    }
}
