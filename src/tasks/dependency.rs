//! # Session liveness flags.
//!
//! A connection lifecycle (wireless link, broker session, a role's listener
//! set) owns a [`Liveness`]. Work that only makes sense while that session
//! lasts holds a read-only [`Dependency`] on it.
//!
//! Ending a session clears the current flag and swaps in a fresh one:
//! ```text
//! session 1:  flag A = true   ── revoke() ──► A = false (forever)
//! session 2:  flag B = true                   dependents of A stay dead
//! ```
//! A dependent created in session 1 therefore observes the disconnect
//! exactly once and can never be revived by session 2.

use std::cell::Cell;
use std::rc::Rc;

/// Read-only view of a session flag.
#[derive(Clone, Debug)]
pub struct Dependency {
    flag: Rc<Cell<bool>>,
}

impl Dependency {
    /// `true` while the owning session is still the one this dependency was taken from.
    pub fn is_alive(&self) -> bool {
        self.flag.get()
    }
}

/// Producer side: owns the flag of the current session.
#[derive(Debug)]
pub struct Liveness {
    current: Rc<Cell<bool>>,
}

impl Liveness {
    /// Starts with a live session.
    pub fn new() -> Self {
        Self {
            current: Rc::new(Cell::new(true)),
        }
    }

    /// A dependency on the current session.
    pub fn dependency(&self) -> Dependency {
        Dependency {
            flag: Rc::clone(&self.current),
        }
    }

    /// Ends the current session and begins a fresh one.
    pub fn revoke(&mut self) {
        self.current.set(false);
        self.current = Rc::new(Cell::new(true));
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}
