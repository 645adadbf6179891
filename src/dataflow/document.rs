//! # Wire records of the configuration document and control payloads.
//!
//! ```json
//! {"id": 1,
//!  "params":  [{"id": 3, "value": "true"}],
//!  "inputs":  [{"id": 10, "src": 0, "value": "false"}],
//!  "outputs": [20]}
//! ```
//!
//! Literal values accept any JSON scalar and are kept as text (`5000` and
//! `"5000"` are the same value); `null` or a missing value is the empty string.
//! A source of `0`, `null` or absent means "no source".
//!
//! These records are transient: the engine consumes them while applying a
//! document and keeps only the bound result.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::ConfigError;

/// Whole configuration pushed to a node.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ConfigDocument {
    /// Node identifier.
    pub id: u32,
    /// Parameters, bound positionally to the role's parameter handlers.
    #[serde(default)]
    pub params: Vec<ParamWire>,
    /// Inputs, bound positionally to the role's input handlers.
    #[serde(default)]
    pub inputs: Vec<InputWire>,
    /// Pins this node may publish to.
    #[serde(default)]
    pub outputs: Vec<u32>,
}

/// One parameter entry.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ParamWire {
    /// Parameter id, addressed as `param/<id>`.
    pub id: u32,
    /// Initial value.
    #[serde(default, deserialize_with = "scalar_text")]
    pub value: String,
}

/// One input entry.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct InputWire {
    /// Input pin id, addressed as `pin/<id>`.
    pub id: u32,
    /// Upstream source pin.
    #[serde(default, deserialize_with = "source_id")]
    pub src: Option<u32>,
    /// Initial value.
    #[serde(default, deserialize_with = "scalar_text")]
    pub value: String,
}

/// Payload of `pin/<id>/src`: `{"id": <source>, "value": <literal>}`.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct SourceUpdate {
    /// New source pin; `None` clears the source.
    #[serde(default, deserialize_with = "source_id")]
    pub id: Option<u32>,
    /// Value handed to the input when a new source is set.
    #[serde(default, deserialize_with = "scalar_text")]
    pub value: String,
}

impl ConfigDocument {
    /// Parses a document.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }
}

impl SourceUpdate {
    /// Parses a retarget payload.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }
}

fn scalar_text<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

fn source_id<'de, D: Deserializer<'de>>(de: D) -> Result<Option<u32>, D::Error> {
    Ok(Option::<u32>::deserialize(de)?.filter(|&id| id != 0))
}
