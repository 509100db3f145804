//! Cooperative cancellation for result iteration.
//!
//! A consumer stops an iteration early by calling `block()` on the node
//! context it receives. Matching engines back that call with a
//! [`BlockToken`] and check it before visiting the next element.
//!
//! ## Overshoot
//!
//! An engine that produces matches in batches may only notice the flag at
//! the next batch boundary. At most one extra element may then reach the
//! consumer after `block()`; consumers that need an exact count (such as
//! `ResultSet::first`) truncate on their side.

use std::cell::Cell;
use std::rc::Rc;

/// A shared, single-threaded "stop iterating" flag.
///
/// Clones observe the same flag, so an engine can hand one clone to each
/// node context and keep one for its own loop.
#[derive(Clone, Debug, Default)]
pub struct BlockToken {
    blocked: Rc<Cell<bool>>,
}

impl BlockToken {
    /// Creates a token that is not blocked.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals that no further elements should be visited.
    #[inline]
    pub fn block(&self) {
        self.blocked.set(true);
    }

    /// Returns true once `block()` was called on any clone.
    #[inline]
    pub fn is_blocked(&self) -> bool {
        self.blocked.get()
    }

    /// Checks if iteration may continue.
    ///
    /// Returns `Some(())` if still active, `None` if blocked.
    /// This enables use with the `?` operator for early returns.
    #[inline]
    pub fn is_active(&self) -> Option<()> {
        if self.blocked.get() {
            None
        } else {
            Some(())
        }
    }
}
