//! # LogWriter: simple event printer
//!
//! Prints one line per [`Event`] to stdout. Meant for bring-up on a serial
//! console or a host simulation, not for structured logging.
//!
//! ## Example output
//! ```text
//! [task-started] task="timed" ref=3
//! [subscribed] topic="pin/10"
//! [config-applied] node=1
//! [retargeted] topic="pin/10/src" src=Some(5)
//! [link-down] link="broker"
//! [reconnect] link="broker" delay_ms=2000 attempt=1
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let task = e.task.as_deref().unwrap_or("-");
        let topic = e.topic.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::TaskStarted => {
                println!("[task-started] task={task:?} ref={:?}", e.attempt);
            }
            EventKind::TaskFinished => {
                println!("[task-finished] task={task:?} ref={:?}", e.attempt);
            }
            EventKind::TaskAborted => println!("[task-aborted] task={task:?}"),
            EventKind::IntervalCleared => println!("[interval-cleared] ref={:?}", e.attempt),
            EventKind::Subscribed => println!("[subscribed] topic={topic:?}"),
            EventKind::Unsubscribed => println!("[unsubscribed] topic={topic:?}"),
            EventKind::MessageUnrouted => println!("[unrouted] topic={topic:?}"),
            EventKind::InboxOverflow => {
                println!("[inbox-overflow] topic={topic:?} reason={reason:?}");
            }
            EventKind::TransportFailed => {
                println!("[transport-failed] topic={topic:?} err={reason:?}");
            }
            EventKind::ConfigApplied => println!("[config-applied] node={:?}", e.pin),
            EventKind::ConfigRejected => println!("[config-rejected] err={reason:?}"),
            EventKind::ControlRejected => {
                println!("[control-rejected] topic={topic:?} err={reason:?}");
            }
            EventKind::SourceRetargeted => {
                println!("[retargeted] topic={topic:?} src={:?}", e.pin);
            }
            EventKind::OutputRejected => {
                println!("[output-rejected] task={task:?} err={reason:?}");
            }
            EventKind::NodeReset => println!("[node-reset]"),
            EventKind::LinkUp => println!("[link-up] link={task:?}"),
            EventKind::LinkDown => println!("[link-down] link={task:?}"),
            EventKind::ReconnectScheduled => {
                println!(
                    "[reconnect] link={task:?} delay_ms={:?} attempt={:?}",
                    e.delay_ms, e.attempt
                );
            }
            EventKind::CredentialsReceived => println!("[credentials-received]"),
            EventKind::CredentialsRejected => println!("[credentials-rejected] err={reason:?}"),
            EventKind::SubscriberOverflow => {
                println!("[subscriber-overflow] subscriber={task:?} reason={reason:?}");
            }
            EventKind::SubscriberPanicked => {
                println!("[subscriber-panicked] subscriber={task} info={reason}");
            }
            EventKind::ShutdownRequested => println!("[shutdown-requested]"),
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
