//! Connection lifecycle of one link (wireless, broker).
//!
//! A [`Link`] owns the [`Liveness`] its dependent tasks watch and counts
//! reconnect attempts since it was last up.

use crate::tasks::{Dependency, Liveness};

/// Up/down state, session flag and reconnect counter of a link.
#[derive(Debug)]
pub struct Link {
    name: &'static str,
    liveness: Liveness,
    up: bool,
    attempts: u32,
}

impl Link {
    /// A link that is down.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            liveness: Liveness::new(),
            up: false,
            attempts: 0,
        }
    }

    /// Link name used in events.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the link is up.
    pub fn is_up(&self) -> bool {
        self.up
    }

    /// Dependency on the current session.
    pub fn dependency(&self) -> Dependency {
        self.liveness.dependency()
    }

    /// Marks the link up and resets the attempt counter.
    pub fn up(&mut self) {
        self.up = true;
        self.attempts = 0;
    }

    /// Marks the link down and revokes its session.
    ///
    /// Returns `false` (and revokes nothing) if it was already down.
    pub fn down(&mut self) -> bool {
        if !self.up {
            return false;
        }
        self.up = false;
        self.liveness.revoke();
        true
    }

    /// Index of the next reconnect attempt (0-based), then counts it.
    pub fn next_attempt(&mut self) -> u32 {
        let n = self.attempts;
        self.attempts = self.attempts.saturating_add(1);
        n
    }
}
