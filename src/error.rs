//! Error types used by the pinwire runtime, the dataflow engine and its collaborators.
//!
//! - [`ConfigError`]: a configuration document or control payload could not be applied.
//! - [`OutputError`]: a role tried to publish to an output the current config does not declare.
//! - [`TransportError`]: the broker transport refused a subscribe/unsubscribe/publish.
//! - [`CredentialsError`]: a provisioning reply could not be parsed.
//! - [`RuntimeError`]: the node could not be assembled.
//!
//! None of these are fatal inside the core: the caller reports them on the
//! event bus and keeps the current state. Every enum provides `as_label` for
//! logs and `as_message` for humans.

use thiserror::Error;

/// # Errors produced while applying a configuration document.
///
/// A rejected document leaves the node's current dataflow state untouched.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The document (or control payload) is not valid JSON of the expected shape.
    #[error("malformed document: {reason}")]
    Malformed {
        /// Parser diagnostic.
        reason: String,
    },

    /// The document binds a different number of entries than the role declares handlers for.
    #[error("role declares {expected} {kind} handlers, document has {got}")]
    HandlerMismatch {
        /// `"param"` or `"input"`.
        kind: &'static str,
        /// Number of handlers the role declares.
        expected: usize,
        /// Number of entries in the document.
        got: usize,
    },

    /// Two entries of the same kind share an id.
    #[error("duplicate {kind} id {id}")]
    DuplicateId {
        /// `"param"` or `"input"`.
        kind: &'static str,
        /// The repeated id.
        id: u32,
    },

    /// An input uses id `0`, which means "no pin".
    #[error("{kind} id 0 is reserved")]
    ZeroId {
        /// `"input"`.
        kind: &'static str,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use pinwire::ConfigError;
    ///
    /// let err = ConfigError::HandlerMismatch { kind: "input", expected: 2, got: 1 };
    /// assert_eq!(err.as_label(), "config_handler_mismatch");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::Malformed { .. } => "config_malformed",
            ConfigError::HandlerMismatch { .. } => "config_handler_mismatch",
            ConfigError::DuplicateId { .. } => "config_duplicate_id",
            ConfigError::ZeroId { .. } => "config_zero_id",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ConfigError::Malformed { reason } => format!("malformed: {reason}"),
            ConfigError::HandlerMismatch {
                kind,
                expected,
                got,
            } => format!("{kind} count mismatch: expected={expected} got={got}"),
            ConfigError::DuplicateId { kind, id } => format!("duplicate {kind} id={id}"),
            ConfigError::ZeroId { kind } => format!("{kind} id=0 reserved"),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Malformed {
            reason: err.to_string(),
        }
    }
}

/// # Errors produced when a role publishes an output value.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputError {
    /// No configuration has been applied yet (or it was reset).
    #[error("no configuration applied")]
    NoConfig,

    /// The current configuration declares fewer outputs than requested.
    #[error("no output at index {index}")]
    NoOutput {
        /// Requested output index.
        index: usize,
    },
}

impl OutputError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            OutputError::NoConfig => "output_no_config",
            OutputError::NoOutput { .. } => "output_missing",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            OutputError::NoConfig => "no config".to_string(),
            OutputError::NoOutput { index } => format!("no output index={index}"),
        }
    }
}

/// # Errors reported by a [`Transport`](crate::Transport) implementation.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The broker connection is down.
    #[error("transport disconnected")]
    Disconnected,

    /// The broker or client refused the request.
    #[error("transport rejected request: {reason}")]
    Rejected {
        /// Client-specific reason.
        reason: String,
    },
}

impl TransportError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            TransportError::Disconnected => "transport_disconnected",
            TransportError::Rejected { .. } => "transport_rejected",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TransportError::Disconnected => "disconnected".to_string(),
            TransportError::Rejected { reason } => format!("rejected: {reason}"),
        }
    }
}

/// # Errors produced while parsing a provisioning reply.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialsError {
    /// The reply is not of the form `<ssid>|<password>`.
    #[error("wrong credentials format: {payload:?}")]
    Malformed {
        /// The raw reply.
        payload: String,
    },
}

impl CredentialsError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            CredentialsError::Malformed { .. } => "credentials_malformed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            CredentialsError::Malformed { .. } => "expected <ssid>|<password>".to_string(),
        }
    }
}

/// # Errors produced while assembling a node.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// A required external collaborator was not supplied to the builder.
    #[error("missing collaborator: {name}")]
    MissingCollaborator {
        /// Builder slot name (`"transport"`, `"broker"`, ...).
        name: &'static str,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::MissingCollaborator { .. } => "runtime_missing_collaborator",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::MissingCollaborator { name } => format!("missing collaborator={name}"),
        }
    }
}
