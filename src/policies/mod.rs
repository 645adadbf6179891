//! Reconnect delay policies.
//!
//! Losing the wireless or broker link is not an error in the core: the node
//! resets its dataflow state and schedules another connection attempt. These
//! knobs decide **how long** to wait before each attempt.
//!
//! - [`BackoffPolicy`] how the delay evolves over consecutive attempts (first / factor / max + jitter)
//! - [`JitterPolicy`]  randomization so a fleet of nodes does not reconnect in lockstep
//!
//! ## Defaults
//! `BackoffPolicy::default()` → first=2s, factor=1.0 (constant), max=30s, jitter=None:
//! a fixed two-second retry, repeated without limit.

mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
