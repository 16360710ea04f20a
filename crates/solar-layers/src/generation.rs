//! Generation counter for discarding stale layer results.
//!
//! Layer requests run independently. A caller that only wants to show the
//! most recent one takes a [`Generation`] before starting a request and
//! checks it when the result arrives.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct RequestGenerations {
    current: AtomicU64,
}

impl RequestGenerations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding every earlier one.
    pub fn begin(&self) -> Generation {
        Generation(self.current.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn current(&self) -> Generation {
        Generation(self.current.load(Ordering::Acquire))
    }

    /// Whether no newer request has started since `generation`.
    pub fn is_current(&self, generation: Generation) -> bool {
        self.current() == generation
    }
}
