//! Runtime core: the cooperative scheduler and its async driver.
//!
//! - [`scheduler`]: live task set, poll cycle, timeout/interval helpers;
//! - [`config`]: node-wide settings;
//! - [`runtime`]: tick loop, event fan-out and shutdown.

mod config;
mod runtime;
mod scheduler;

pub use config::RuntimeConfig;
pub use runtime::Runtime;
pub use scheduler::Scheduler;
