//! Subscription id allocation.
//!
//! Ids are decimal counters, one sequence per subscription kind, starting at
//! zero. They are never reused within a process but are not persisted: a
//! restart starts every sequence again from zero.

use std::sync::atomic::{AtomicU64, Ordering};
use udr_types::{SubscriptionId, SubscriptionKind};

/// Produces fresh subscription ids.
pub trait IdGenerator: Send + Sync {
    /// Returns the next id for `kind`. Never returns the same id twice for
    /// one kind.
    fn next_id(&self, kind: SubscriptionKind) -> SubscriptionId;
}

/// Process-local generator backed by one atomic counter per kind.
#[derive(Debug, Default)]
pub struct CounterIdGenerator {
    counters: [AtomicU64; SubscriptionKind::ALL.len()],
}

impl CounterIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the sequence of `kind` at `next`, e.g. after restoring state.
    pub fn starting_at(self, kind: SubscriptionKind, next: u64) -> Self {
        self.counters[kind.index()].store(next, Ordering::Relaxed);
        self
    }
}

impl IdGenerator for CounterIdGenerator {
    fn next_id(&self, kind: SubscriptionKind) -> SubscriptionId {
        let n = self.counters[kind.index()].fetch_add(1, Ordering::Relaxed);
        SubscriptionId::from_counter(n)
    }
}
