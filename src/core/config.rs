//! # Node runtime configuration.
//!
//! Provides [`RuntimeConfig`], the settings shared by the async driver and the
//! provisioning/reconnect glue.
//!
//! Config is used in two ways:
//! 1. **Driver creation**: `Runtime::new(config, clock, subscribers)`
//! 2. **Node assembly**: `Node::builder(&runtime)` copies the retry policy,
//!    intervals and wire names.
//!
//! ## Sentinel values
//! - `tick = 0s` → clamped to 1 ms by [`RuntimeConfig::tick_clamped`]
//! - `bus_capacity = 0` → clamped to 1 by [`RuntimeConfig::bus_capacity_clamped`]
//! - `inbox_capacity = 0` → clamped to 1 by [`RuntimeConfig::inbox_capacity_clamped`]

use std::time::Duration;

use crate::policies::BackoffPolicy;

/// Global configuration for a node.
///
/// ## Field semantics
/// - `tick`: poll period of the async driver
/// - `bus_capacity`: event bus ring buffer size (min 1)
/// - `inbox_capacity`: received messages waiting for dispatch (min 1); extra ones are dropped
/// - `retry`: reconnect delay after a wireless or broker disconnect (unbounded attempts)
/// - `resolve_interval`, `config_request_interval`, `credentials_request_interval`:
///   spacing of the provisioning retry loops
/// - `broker_host`, `broker_port`: where the broker is looked up once wireless is up
/// - `config_request_topic`: where the node announces its address until it is configured
/// - `discovery_prefix`: prepended to the role blueprint in credential requests
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Period between two scheduler polls.
    pub tick: Duration,

    /// Capacity of the event bus broadcast channel.
    ///
    /// Receivers lagging more than this many events skip the oldest ones.
    pub bus_capacity: usize,

    /// Capacity of the node's inbox of received messages.
    pub inbox_capacity: usize,

    /// Delay policy for reconnect attempts.
    pub retry: BackoffPolicy,

    /// Spacing of broker host resolution attempts.
    pub resolve_interval: Duration,

    /// Spacing of configuration requests while the node has no config.
    pub config_request_interval: Duration,

    /// Spacing of credential requests while unprovisioned.
    pub credentials_request_interval: Duration,

    /// Host name resolved to find the broker.
    pub broker_host: String,

    /// Broker port.
    pub broker_port: u16,

    /// Topic the node publishes its own address to until configured.
    pub config_request_topic: String,

    /// Prefix of the credential discovery broadcast.
    pub discovery_prefix: String,
}

impl RuntimeConfig {
    /// Returns the poll period clamped to at least one millisecond.
    #[inline]
    pub fn tick_clamped(&self) -> Duration {
        self.tick.max(Duration::from_millis(1))
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns an inbox capacity clamped to a minimum of 1.
    #[inline]
    pub fn inbox_capacity_clamped(&self) -> usize {
        self.inbox_capacity.max(1)
    }
}

impl Default for RuntimeConfig {
    /// Default configuration:
    ///
    /// - `tick = 1ms`, `bus_capacity = 1024`, `inbox_capacity = 64`
    /// - `retry = fixed 2s`
    /// - all provisioning intervals `2s`
    /// - broker `volex.local:1883`, config requests on `config/request`
    /// - discovery prefix `[volex-conn]`
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(1),
            bus_capacity: 1024,
            inbox_capacity: 64,
            retry: BackoffPolicy::fixed(Duration::from_secs(2)),
            resolve_interval: Duration::from_secs(2),
            config_request_interval: Duration::from_secs(2),
            credentials_request_interval: Duration::from_secs(2),
            broker_host: "volex.local".to_string(),
            broker_port: 1883,
            config_request_topic: "config/request".to_string(),
            discovery_prefix: "[volex-conn]".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.retry.next(0), Duration::from_secs(2));
        assert_eq!(cfg.retry.next(50), Duration::from_secs(2));
        assert_eq!(cfg.broker_port, 1883);
        assert_eq!(cfg.config_request_topic, "config/request");
    }

    #[test]
    fn test_clamps() {
        let cfg = RuntimeConfig {
            tick: Duration::ZERO,
            bus_capacity: 0,
            inbox_capacity: 0,
            ..RuntimeConfig::default()
        };
        assert_eq!(cfg.tick_clamped(), Duration::from_millis(1));
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(cfg.inbox_capacity_clamped(), 1);
    }
}
