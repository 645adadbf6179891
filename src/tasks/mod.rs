//! # Polled tasks and their decorators.
//!
//! A task is deferred work with three phases, driven by the
//! [`Scheduler`](crate::Scheduler): a one-time `setup`, a repeated `check`
//! that reports whether the task is done, and a one-time `finish`.
//!
//! - [`Task`] - the three-phase capability every task implements
//! - [`TaskFn`] - closure-backed task
//! - [`TimedTask`] - gates a unit of work behind a minimum interval
//! - [`CompositeTask`] - forwards all three phases to an inner task
//! - [`DependentTask`] - composite that aborts when a [`Dependency`] dies
//! - [`Liveness`] / [`Dependency`] - producer and consumer side of a session flag
//!
//! Decorators nest freely:
//! ```text
//! DependentTask([wifi, broker])
//!   └─ CompositeTask
//!        └─ TimedTask(work, callback, 2s)
//! ```

mod composite;
mod dependency;
mod dependent;
mod task;
mod task_fn;
mod timed;

pub use composite::CompositeTask;
pub use dependency::{Dependency, Liveness};
pub use dependent::DependentTask;
pub use task::{Context, Task, TaskRef};
pub use task_fn::TaskFn;
pub use timed::TimedTask;
